use clap::{Parser, Subcommand};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use deps_footprint::config::{Config, ErrorPolicy, OutputFormat};

#[derive(Parser)]
#[command(name = "deps-footprint")]
#[command(about = "统计多个项目中重复安装的依赖包所占用的磁盘空间")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    
    /// 要扫描的根目录（其直接子目录视为独立项目）
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
    
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    
    /// 报告输出路径（默认 results.txt）
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    
    /// 报告格式
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,
    
    /// 并发扫描的项目数
    #[arg(short, long)]
    pub jobs: Option<usize>,
    
    /// 遇到损坏的包或项目时记录错误并继续扫描
    #[arg(long)]
    pub keep_going: bool,
    
    /// 展开 @scope 目录下的包
    #[arg(long)]
    pub include_scoped: bool,
    
    /// 详细输出
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 管理配置
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// 显示当前生效的配置
    Show,
    
    /// 在默认位置写入默认配置文件
    Init {
        /// 覆盖已存在的配置文件
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    /// 要扫描的根目录，未指定时返回用法错误
    pub fn scan_root(&self) -> Result<&Path> {
        self.dir
            .as_deref()
            .context("未指定要扫描的目录，请使用 --dir <DIR>")
    }

    /// 用命令行参数覆盖配置文件中的值
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(output) = &self.output {
            config.report.output = output.clone();
        }
        if let Some(format) = self.format {
            config.report.format = format;
        }
        if let Some(jobs) = self.jobs {
            config.scan.concurrent_scans = jobs.max(1);
        }
        if self.keep_going {
            config.scan.error_policy = ErrorPolicy::Isolate;
        }
        if self.include_scoped {
            config.scan.include_scoped = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides() {
        let cli = Cli::parse_from([
            "deps-footprint", "--dir", "/work", "-j", "0", "--keep-going", "-f", "json",
        ]);
        let mut config = Config::default();
        cli.apply_overrides(&mut config);
        
        assert_eq!(cli.dir, Some(PathBuf::from("/work")));
        assert_eq!(config.scan.concurrent_scans, 1);
        assert_eq!(config.scan.error_policy, ErrorPolicy::Isolate);
        assert_eq!(config.report.format, OutputFormat::Json);
        assert_eq!(config.report.output, PathBuf::from("results.txt"));
    }

    #[test]
    fn test_config_subcommand() {
        let cli = Cli::parse_from(["deps-footprint", "config", "init", "--force"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Config { action: ConfigAction::Init { force: true } })
        ));
        assert!(cli.dir.is_none());
    }

    #[test]
    fn test_missing_dir_is_usage_error() {
        let cli = Cli::parse_from(["deps-footprint", "-j", "2"]);
        let err = cli.scan_root().unwrap_err();
        assert!(err.to_string().contains("--dir"));

        let cli = Cli::parse_from(["deps-footprint", "-d", "/work"]);
        assert_eq!(cli.scan_root().unwrap(), Path::new("/work"));
    }
}
