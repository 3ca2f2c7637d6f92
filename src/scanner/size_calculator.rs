use std::path::Path;
use walkdir::WalkDir;

use crate::scanner::error::{Result, ScanError};

/// 大小计算器 - 递归统计目录下所有文件的字节数
#[derive(Debug, Clone, Default)]
pub struct SizeCalculator {
    /// 是否跟随符号链接
    follow_links: bool,
}

impl SizeCalculator {
    /// 创建新的大小计算器（不跟随符号链接）
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否跟随符号链接统计链接目标的大小
    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }
    
    /// 计算目录的总大小
    ///
    /// 目录本身不计入大小。默认不跟随符号链接，链接按其本身的大小计算。
    /// 遍历中的任何 I/O 错误都会直接返回，不会给出部分结果。
    pub fn calculate_directory_size(&self, dir_path: &Path) -> Result<u64> {
        let mut total_size = 0u64;
        
        for entry in WalkDir::new(dir_path).follow_links(self.follow_links) {
            let entry = entry.map_err(|source| ScanError::Walk {
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| dir_path.to_path_buf()),
                source,
            })?;
            
            if entry.file_type().is_dir() {
                continue;
            }
            
            let metadata = entry.metadata().map_err(|source| ScanError::Walk {
                path: entry.path().to_path_buf(),
                source,
            })?;
            total_size += metadata.len();
        }
        
        Ok(total_size)
    }
}
