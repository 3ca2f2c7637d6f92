use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 根目录下的一个候选项目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// 项目名称（目录名）
    pub name: String,
    
    /// 项目路径
    pub path: PathBuf,
}

impl Project {
    /// 由目录路径创建项目，名称取自最后一级目录名
    pub fn from_path(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        
        Self { name, path }
    }
}

/// 已安装包的清单信息（从 package.json 读取）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// 声明的包名
    pub name: String,
    
    /// 声明的版本号
    pub version: String,
}
