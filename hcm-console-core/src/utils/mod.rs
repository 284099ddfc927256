//! 工具函数

pub mod flatten;
pub mod log_sanitizer;
pub mod property_path;

pub use flatten::flatten_record;
pub use log_sanitizer::{payload_for_log, truncate_for_log};
pub use property_path::{get_path, set_path};
