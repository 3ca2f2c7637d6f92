use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

use crate::config::defaults::DefaultConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 项目与依赖目录的约定名称
    pub layout: LayoutConfig,

    /// 扫描配置
    pub scan: ScanConfig,

    /// 报告配置
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// 项目顶层的标记文件名
    pub project_marker: String,

    /// 项目顶层的依赖目录名
    pub dependency_dir: String,

    /// 包目录中的清单文件名
    pub package_manifest: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// 并发扫描的项目数（1 表示严格顺序执行）
    pub concurrent_scans: usize,

    /// 遇到错误时的处理策略
    pub error_policy: ErrorPolicy,

    /// 是否展开 @scope 目录下的包
    pub include_scoped: bool,

    /// 计算包大小时是否跟随符号链接
    pub follow_symlinks: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// 报告输出路径
    pub output: PathBuf,

    /// 报告格式
    pub format: OutputFormat,
}

/// 错误处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorPolicy {
    /// 第一个错误即终止整个扫描
    #[default]
    FailFast,

    /// 记录单个包或项目的错误并继续扫描
    Isolate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// 每行一个包的文本格式
    #[default]
    Text,
    /// JSON 格式
    Json,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            project_marker: DefaultConfig::project_marker(),
            dependency_dir: DefaultConfig::dependency_dir(),
            package_manifest: DefaultConfig::package_manifest(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrent_scans: DefaultConfig::concurrent_scans(),
            error_policy: ErrorPolicy::default(),
            include_scoped: false,
            follow_symlinks: false,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: DefaultConfig::report_path(),
            format: OutputFormat::default(),
        }
    }
}

impl Config {
    /// 从文件加载配置
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("无法读取配置文件 {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("配置文件格式错误 {}", path.display()))?;
        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let content = self.to_toml()?;

        // 确保目录存在
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("无法写入配置文件 {}", path.display()))?;
        Ok(())
    }

    /// 序列化为 TOML 文本
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 获取默认配置文件路径
    pub fn default_config_path() -> Result<PathBuf> {
        let mut path = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("无法找到配置目录"))?;
        path.push("deps-footprint");
        path.push("config.toml");
        Ok(path)
    }

    /// 加载配置：显式路径优先，其次默认路径，都没有则使用内置默认值
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_file(path);
        }

        match Self::default_config_path() {
            Ok(path) if path.exists() => Self::load_from_file(&path),
            _ => Ok(Self::default()),
        }
    }
}
