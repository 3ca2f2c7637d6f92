use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::models::AggregatedUsage;

/// 一次完整扫描的结果
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    /// 扫描的根路径
    pub root: PathBuf,

    /// 按包名排序的汇总行
    pub usages: Vec<AggregatedUsage>,

    /// 扫描统计信息
    pub stats: ScanStats,

    /// 被隔离记录下来的错误（仅在 isolate 策略下出现）
    pub issues: Vec<ScanIssue>,

    /// 扫描开始时间
    pub scan_start_time: DateTime<Utc>,

    /// 扫描结束时间
    pub scan_end_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStats {
    /// 根目录下的候选项目数量
    pub candidate_projects: usize,

    /// 同时具备标记文件和依赖目录的项目数量
    pub eligible_projects: usize,

    /// 已检查的依赖目录条目总数
    pub entries_processed: usize,

    /// 扫描耗时
    pub scan_duration: Option<Duration>,

    /// 所有包的总占用（实例数 × 代表大小 之和）
    pub total_size: u64,
}

/// 错误发生的范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueScope {
    Package,
    Project,
}

/// 扫描过程中被跳过的失败
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanIssue {
    pub scope: IssueScope,
    pub path: PathBuf,
    pub message: String,
}

impl ScanIssue {
    pub fn package(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self {
            scope: IssueScope::Package,
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub fn project(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self {
            scope: IssueScope::Project,
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl ScanReport {
    /// 创建新的扫描结果
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            usages: Vec::new(),
            stats: ScanStats::default(),
            issues: Vec::new(),
            scan_start_time: Utc::now(),
            scan_end_time: None,
        }
    }

    /// 完成扫描：写入汇总行并更新统计
    pub fn finish_scan(&mut self, usages: Vec<AggregatedUsage>, elapsed: Duration) {
        self.usages = usages;
        self.scan_end_time = Some(Utc::now());
        self.stats.scan_duration = Some(elapsed);
        self.stats.total_size = self
            .usages
            .iter()
            .fold(0u64, |total, u| total.saturating_add(u.total_size()));
    }

    /// 不同 (包名, 版本) 的数量
    pub fn unique_packages(&self) -> usize {
        self.usages.len()
    }

    /// 所有安装实例的数量
    pub fn total_instances(&self) -> usize {
        self.usages.iter().map(|u| u.instance_count()).sum()
    }

    /// 重复安装浪费的空间（除去每个包保留一份之外的部分）
    pub fn duplicated_size(&self) -> u64 {
        self.usages
            .iter()
            .map(|u| u.total_size().saturating_sub(u.size))
            .fold(0u64, u64::saturating_add)
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}
