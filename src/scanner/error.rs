use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// 扫描引擎的结果类型
pub type Result<T> = std::result::Result<T, ScanError>;

/// 扫描过程中可能出现的错误
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("无法读取目录 {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("无法读取清单文件 {}: {source}", .path.display())]
    ReadManifest {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("清单文件无效 {}: {reason}", .path.display())]
    InvalidManifest { path: PathBuf, reason: String },

    #[error("计算目录大小时出错 {}: {source}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("扫描任务异常终止: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl ScanError {
    pub fn read_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ReadDir {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_manifest(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidManifest {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
