use std::path::PathBuf;

pub struct DefaultConfig;

impl DefaultConfig {
    /// 项目根目录下用于判断资格的标记文件
    pub fn project_marker() -> String {
        "package.json".to_string()
    }
    
    /// 项目根目录下存放已安装包的依赖目录
    pub fn dependency_dir() -> String {
        "node_modules".to_string()
    }
    
    /// 每个已安装包目录中的清单文件
    pub fn package_manifest() -> String {
        "package.json".to_string()
    }
    
    /// 默认报告文件（相对于当前工作目录）
    pub fn report_path() -> PathBuf {
        PathBuf::from("results.txt")
    }
    
    /// 默认并发扫描的项目数
    pub fn concurrent_scans() -> usize {
        num_cpus::get().clamp(1, 8)
    }
}
