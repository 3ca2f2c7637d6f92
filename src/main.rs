mod cli;

use std::path::Path;
use anyhow::Result;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use cli::{Cli, Commands, ConfigAction};
use deps_footprint::config::Config;
use deps_footprint::models::{IssueScope, ScanReport};
use deps_footprint::utils::{format_bytes, format_elapsed};
use deps_footprint::{run_scan, ScanEvent};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 日志输出到 stderr，默认只显示警告
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_writer(std::io::stderr)
        .init();

    if let Some(Commands::Config { action }) = &cli.command {
        let config = load_config(&cli)?;
        return run_config_command(action, &config);
    }

    // 在访问文件系统之前检查必需的参数
    let root = cli.scan_root()?;

    let config = load_config(&cli)?;
    scan(root, &config).await
}

/// 加载配置文件并应用命令行覆盖
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    Ok(config)
}

/// 执行扫描并写入报告
async fn scan(root: &Path, config: &Config) -> Result<()> {
    let progress = create_progress_bar();

    let result = run_scan(root, config, |event| match event {
        ScanEvent::ProjectsFound { total } => {
            progress.suspend(|| println!("发现 {} 个待检查项目", total));
            progress.set_length(total as u64);
        }
        ScanEvent::ProjectFinished { project, .. } => {
            progress.set_message(project.name);
            progress.inc(1);
        }
    })
    .await;
    progress.finish_and_clear();

    let report = result?;

    if let Some(elapsed) = report.stats.scan_duration {
        println!(
            "处理了 {} 个条目，耗时 {}",
            report.stats.entries_processed,
            format_elapsed(elapsed)
        );
    }

    println!(
        "报告已写入 {}（{} 个不同的包，{} 个安装实例）",
        config.report.output.display(),
        report.unique_packages(),
        report.total_instances()
    );

    print_issue_summary(&report);

    println!("其中重复安装占用: {}", format_bytes(report.duplicated_size()));
    println!("总占用空间: {}", format_bytes(report.stats.total_size));
    Ok(())
}

/// 输出被跳过的错误摘要
fn print_issue_summary(report: &ScanReport) {
    if !report.has_issues() {
        return;
    }

    let projects = report
        .issues
        .iter()
        .filter(|issue| issue.scope == IssueScope::Project)
        .count();
    eprintln!(
        "扫描时跳过了 {} 个出错的条目（项目 {} 个，包 {} 个）:",
        report.issues.len(),
        projects,
        report.issues.len() - projects
    );
    for issue in &report.issues {
        eprintln!("  - {}: {}", issue.path.display(), issue.message);
    }
}

fn run_config_command(action: &ConfigAction, config: &Config) -> Result<()> {
    match action {
        ConfigAction::Show => {
            print!("{}", config.to_toml()?);
        }
        ConfigAction::Init { force } => {
            let path = Config::default_config_path()?;
            if path.exists() && !force {
                anyhow::bail!("配置文件已存在: {}（使用 --force 覆盖）", path.display());
            }
            Config::default().save_to_file(&path)?;
            println!("已写入默认配置: {}", path.display());
        }
    }
    Ok(())
}

/// 创建进度条
fn create_progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}
