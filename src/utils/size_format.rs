/// 字节数格式化（SI 单位，1 kB = 1000 B）
///
/// 小于 10 的值保留一位小数，其余取整，例如 `1024 -> "1.0 kB"`、`15000 -> "15 kB"`。
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 7] = ["B", "kB", "MB", "GB", "TB", "PB", "EB"];

    if bytes < 10 {
        return format!("{bytes} B");
    }

    let mut exp = 0usize;
    let mut scale = 1u64;
    while exp + 1 < UNITS.len() && bytes / scale >= 1000 {
        scale *= 1000;
        exp += 1;
    }

    let value = ((bytes as f64 / scale as f64) * 10.0 + 0.5).floor() / 10.0;
    if value < 10.0 {
        format!("{value:.1} {}", UNITS[exp])
    } else {
        format!("{value:.0} {}", UNITS[exp])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_small_values() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(9), "9 B");
        assert_eq!(format_bytes(10), "10 B");
        assert_eq!(format_bytes(999), "999 B");
    }

    #[test]
    fn test_format_kilobytes() {
        assert_eq!(format_bytes(1000), "1.0 kB");
        assert_eq!(format_bytes(1024), "1.0 kB");
        assert_eq!(format_bytes(2048), "2.0 kB");
        assert_eq!(format_bytes(15_000), "15 kB");
    }

    #[test]
    fn test_format_larger_units() {
        assert_eq!(format_bytes(1_000_000), "1.0 MB");
        assert_eq!(format_bytes(1_500_000), "1.5 MB");
        assert_eq!(format_bytes(82_854_982), "83 MB");
        assert_eq!(format_bytes(3_000_000_000), "3.0 GB");
        assert_eq!(format_bytes(u64::MAX), "18 EB");
    }
}
