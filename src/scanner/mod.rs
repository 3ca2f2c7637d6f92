pub mod aggregation_engine;
pub mod error;
pub mod listing;
pub mod manifest_reader;
pub mod package_traverser;
pub mod size_calculator;

pub use aggregation_engine::{AggregationEngine, ScanEvent};
pub use error::ScanError;
pub use manifest_reader::ManifestReader;
pub use package_traverser::{PackageTraverser, TraversalOutcome};
pub use size_calculator::SizeCalculator;
