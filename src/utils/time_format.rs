use std::time::Duration;

/// 格式化耗时 (例如: "850ms"、"12.34s"、"2m 5.0s")
pub fn format_elapsed(elapsed: Duration) -> String {
    let millis = elapsed.as_millis();
    let seconds = elapsed.as_secs_f64();

    match millis {
        0 => format!("{}µs", elapsed.as_micros()),
        1..=999 => format!("{millis}ms"),
        1000..=59_999 => format!("{seconds:.2}s"),
        _ => {
            let minutes = elapsed.as_secs() / 60;
            format!("{}m {:.1}s", minutes, seconds - (minutes * 60) as f64)
        }
    }
}
