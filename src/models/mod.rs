pub mod project;
pub mod scan_result;
pub mod usage;

pub use project::{PackageManifest, Project};
pub use scan_result::{IssueScope, ScanIssue, ScanReport, ScanStats};
pub use usage::{AggregatedUsage, Identity, PackageTable, UsageRecord};
