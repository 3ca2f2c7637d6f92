pub mod defaults;
pub mod settings;

pub use settings::{Config, ErrorPolicy, LayoutConfig, OutputFormat, ReportConfig, ScanConfig};
