use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{OutputFormat, ReportConfig};
use crate::models::{AggregatedUsage, ScanIssue, ScanReport};
use crate::utils::format_bytes;

/// 报告写入器 - 把扫描结果写入报告文件（每次运行都会覆盖旧文件）
pub struct ReportWriter {
    output: PathBuf,
    format: OutputFormat,
}

impl ReportWriter {
    pub fn new(output: impl Into<PathBuf>, format: OutputFormat) -> Self {
        Self {
            output: output.into(),
            format,
        }
    }

    pub fn from_config(config: &ReportConfig) -> Self {
        Self::new(config.output.clone(), config.format)
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    /// 渲染报告内容
    pub fn render(&self, report: &ScanReport) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(render_text(report)),
            OutputFormat::Json => render_json(report),
        }
    }

    /// 写入报告文件
    pub fn write(&self, report: &ScanReport) -> Result<()> {
        let content = self.render(report)?;

        let file = File::create(&self.output)
            .with_context(|| format!("无法创建报告文件 {}", self.output.display()))?;
        let mut writer = BufWriter::new(file);
        writer
            .write_all(content.as_bytes())
            .and_then(|_| writer.flush())
            .with_context(|| format!("无法写入报告文件 {}", self.output.display()))?;

        tracing::info!("报告已写入 {}", self.output.display());
        Ok(())
    }
}

/// 报告中的一行：`name@version: count (repSize -> totalSize)`
pub fn format_usage_line(usage: &AggregatedUsage) -> String {
    format!(
        "{}@{}: {} ({} -> {})",
        usage.name,
        usage.version,
        usage.instance_count(),
        format_bytes(usage.size),
        format_bytes(usage.total_size())
    )
}

/// 文本格式：每个 (包名, 版本) 一行
pub fn render_text(report: &ScanReport) -> String {
    report
        .usages
        .iter()
        .map(|usage| format_usage_line(usage) + "\n")
        .collect()
}

#[derive(Serialize)]
struct JsonReport<'a> {
    root: &'a Path,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    stats: JsonStats,
    packages: Vec<JsonPackage<'a>>,
    issues: &'a [ScanIssue],
}

#[derive(Serialize)]
struct JsonStats {
    candidate_projects: usize,
    eligible_projects: usize,
    entries_processed: usize,
    elapsed_ms: Option<u64>,
    total_size: u64,
    total_size_human: String,
}

#[derive(Serialize)]
struct JsonPackage<'a> {
    name: &'a str,
    version: &'a str,
    instances: usize,
    size: u64,
    total_size: u64,
    locations: Vec<&'a Path>,
}

/// JSON 格式：包含统计信息、每个包的安装位置和错误列表
pub fn render_json(report: &ScanReport) -> Result<String> {
    let json = JsonReport {
        root: &report.root,
        started_at: report.scan_start_time,
        finished_at: report.scan_end_time,
        stats: JsonStats {
            candidate_projects: report.stats.candidate_projects,
            eligible_projects: report.stats.eligible_projects,
            entries_processed: report.stats.entries_processed,
            elapsed_ms: report.stats.scan_duration.map(|d| d.as_millis() as u64),
            total_size: report.stats.total_size,
            total_size_human: format_bytes(report.stats.total_size),
        },
        packages: report
            .usages
            .iter()
            .map(|usage| JsonPackage {
                name: &usage.name,
                version: &usage.version,
                instances: usage.instance_count(),
                size: usage.size,
                total_size: usage.total_size(),
                locations: usage.records.iter().map(|r| r.location.as_path()).collect(),
            })
            .collect(),
        issues: &report.issues,
    };

    Ok(serde_json::to_string_pretty(&json)?)
}
