pub mod size_format;
pub mod time_format;

pub use size_format::format_bytes;
pub use time_format::format_elapsed;
