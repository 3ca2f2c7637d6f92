pub mod config;
pub mod models;
pub mod report;
pub mod runner;
pub mod scanner;
pub mod utils;

// 重新导出常用模块
pub use config::Config;
pub use models::{AggregatedUsage, Identity, ScanReport, UsageRecord};
pub use report::ReportWriter;
pub use runner::run_scan;
pub use scanner::{AggregationEngine, ScanError, ScanEvent};
