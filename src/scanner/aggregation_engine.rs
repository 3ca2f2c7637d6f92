use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use futures::stream::{self, StreamExt};

use crate::config::{Config, ErrorPolicy, LayoutConfig};
use crate::models::{PackageTable, Project, ScanIssue, ScanReport};
use crate::scanner::error::{Result, ScanError};
use crate::scanner::listing::read_dir_sorted;
use crate::scanner::PackageTraverser;

/// 聚合引擎 - 遍历根目录下的所有项目并按 (包名, 版本) 汇总磁盘占用
pub struct AggregationEngine {
    layout: Arc<LayoutConfig>,
    traverser: Arc<PackageTraverser>,
    error_policy: ErrorPolicy,
    concurrent_scans: usize,
}

/// 扫描进度事件
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// 根目录列举完成
    ProjectsFound { total: usize },

    /// 一个项目处理完成（无论是否符合条件）
    ProjectFinished {
        project: Project,
        eligible: bool,
        entries: usize,
    },
}

/// 单个项目的处理结果
#[derive(Debug)]
struct ProjectOutcome {
    project: Project,
    eligible: bool,
    entries: usize,
    table: PackageTable,
    issues: Vec<ScanIssue>,
}

impl AggregationEngine {
    pub fn new(config: &Config) -> Self {
        Self {
            layout: Arc::new(config.layout.clone()),
            traverser: Arc::new(PackageTraverser::from_config(config)),
            error_policy: config.scan.error_policy,
            concurrent_scans: config.scan.concurrent_scans.max(1),
        }
    }

    /// 扫描根目录，不报告进度
    pub async fn scan(&self, root: &Path) -> Result<ScanReport> {
        self.scan_with_progress(root, |_| {}).await
    }

    /// 扫描根目录并通过回调报告进度
    ///
    /// 项目可以并发处理，但结果总是按项目顺序合并，
    /// 因此每个包的“第一个实例”与顺序扫描时一致。
    pub async fn scan_with_progress<F>(&self, root: &Path, progress: F) -> Result<ScanReport>
    where
        F: Fn(ScanEvent),
    {
        let start = Instant::now();
        let mut report = ScanReport::new(root.to_path_buf());

        let projects = self.discover_projects(root).await?;
        report.stats.candidate_projects = projects.len();
        progress(ScanEvent::ProjectsFound { total: projects.len() });
        tracing::info!("在 {} 下发现 {} 个候选项目", root.display(), projects.len());

        let mut table = PackageTable::new();
        let mut outcomes = stream::iter(projects)
            .map(|project| {
                let layout = Arc::clone(&self.layout);
                let traverser = Arc::clone(&self.traverser);
                let error_policy = self.error_policy;
                tokio::task::spawn_blocking(move || {
                    scan_project(&layout, &traverser, error_policy, project)
                })
            })
            .buffered(self.concurrent_scans);

        while let Some(joined) = outcomes.next().await {
            let outcome = joined??;

            if outcome.eligible {
                report.stats.eligible_projects += 1;
                report.stats.entries_processed += outcome.entries;
            }
            table.merge(outcome.table);
            report.issues.extend(outcome.issues);

            progress(ScanEvent::ProjectFinished {
                project: outcome.project,
                eligible: outcome.eligible,
                entries: outcome.entries,
            });
        }

        tracing::info!(
            "处理了 {} 个条目，共 {} 个不同的包",
            report.stats.entries_processed,
            table.len()
        );

        report.finish_scan(table.into_sorted_usages(), start.elapsed());
        Ok(report)
    }

    /// 列出根目录下的直接子目录作为候选项目（按名称排序）
    async fn discover_projects(&self, root: &Path) -> Result<Vec<Project>> {
        let mut entries = tokio::fs::read_dir(root)
            .await
            .map_err(|err| ScanError::read_dir(root, err))?;

        let mut projects = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|err| ScanError::read_dir(root, err))?
        {
            let file_type = entry
                .file_type()
                .await
                .map_err(|err| ScanError::read_dir(entry.path(), err))?;

            if file_type.is_dir() {
                projects.push(Project::from_path(entry.path()));
            }
        }

        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }
}

/// 检查项目是否同时具备标记文件和依赖目录，返回依赖目录路径
fn eligible_dependency_dir(project: &Project, layout: &LayoutConfig) -> Result<Option<PathBuf>> {
    let entries = read_dir_sorted(&project.path)?;

    let has_marker = entries.iter().any(|e| e.name == layout.project_marker);
    let Some(entry) = entries.iter().find(|e| e.name == layout.dependency_dir) else {
        return Ok(None);
    };
    if !has_marker {
        return Ok(None);
    }

    // 跟随符号链接检查依赖目录；同名的普通文件视为不符合条件，其他 I/O 错误向上传播
    match std::fs::metadata(&entry.path) {
        Ok(metadata) if metadata.is_dir() => Ok(Some(entry.path.clone())),
        Ok(_) => Ok(None),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(ScanError::read_dir(&entry.path, err)),
    }
}

/// 处理单个项目（在阻塞线程池中运行）
fn scan_project(
    layout: &LayoutConfig,
    traverser: &PackageTraverser,
    error_policy: ErrorPolicy,
    project: Project,
) -> Result<ProjectOutcome> {
    let mut outcome = ProjectOutcome {
        project,
        eligible: false,
        entries: 0,
        table: PackageTable::new(),
        issues: Vec::new(),
    };

    let traversal = eligible_dependency_dir(&outcome.project, layout).and_then(|dir| match dir {
        Some(dir) => traverser.traverse(&dir, &mut outcome.table).map(Some),
        None => Ok(None),
    });

    match traversal {
        Ok(Some(traversal)) => {
            outcome.eligible = true;
            outcome.entries = traversal.entries;
            outcome.issues.extend(traversal.issues);
        }
        Ok(None) => {
            tracing::debug!("跳过不符合条件的项目: {}", outcome.project.path.display());
        }
        Err(err) => match error_policy {
            ErrorPolicy::FailFast => return Err(err),
            ErrorPolicy::Isolate => {
                tracing::warn!("跳过出错的项目 {}: {}", outcome.project.path.display(), err);
                outcome
                    .issues
                    .push(ScanIssue::project(outcome.project.path.clone(), &err));
            }
        },
    }

    Ok(outcome)
}
