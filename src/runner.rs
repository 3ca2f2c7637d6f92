use std::path::Path;
use anyhow::{Context, Result};

use crate::config::Config;
use crate::models::ScanReport;
use crate::report::ReportWriter;
use crate::scanner::{AggregationEngine, ScanEvent};

/// 扫描根目录并写入报告
///
/// 扫描失败时直接返回错误，不会创建或覆盖报告文件。
pub async fn run_scan<F>(root: &Path, config: &Config, progress: F) -> Result<ScanReport>
where
    F: Fn(ScanEvent),
{
    let engine = AggregationEngine::new(config);
    let report = engine
        .scan_with_progress(root, progress)
        .await
        .with_context(|| format!("扫描 {} 失败", root.display()))?;

    ReportWriter::from_config(&config.report).write(&report)?;
    Ok(report)
}
