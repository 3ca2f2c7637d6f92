use std::fs;
use std::path::{Path, PathBuf};

use crate::scanner::error::{Result, ScanError};

/// 目录中的一个条目
#[derive(Debug, Clone)]
pub struct ListedEntry {
    pub name: String,
    pub path: PathBuf,
    /// 条目本身是否是目录（不跟随符号链接）
    pub is_dir: bool,
}

/// 列出目录的直接子条目，按文件名排序
pub fn read_dir_sorted(dir: &Path) -> Result<Vec<ListedEntry>> {
    let read_dir = fs::read_dir(dir).map_err(|err| ScanError::read_dir(dir, err))?;

    let mut entries = Vec::new();
    for entry in read_dir {
        let entry = entry.map_err(|err| ScanError::read_dir(dir, err))?;
        let file_type = entry
            .file_type()
            .map_err(|err| ScanError::read_dir(entry.path(), err))?;

        entries.push(ListedEntry {
            name: entry.file_name().to_string_lossy().to_string(),
            path: entry.path(),
            is_dir: file_type.is_dir(),
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(entries)
}
