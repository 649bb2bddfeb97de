//! Utility modules for kk

pub mod errors;
pub mod logger;
pub mod prereqs;
pub mod text;

// Re-export commonly used items
pub use errors::{KkError, enhance_error};
pub use logger::{log_debug, log_error, log_info, log_warn};
pub use prereqs::{CommonPrereqs, Prerequisite};
pub use text::{age, human_duration, keys_string, trim_quote_and_space};
