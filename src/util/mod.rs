//! Utility modules for scanbox

pub mod logging;

pub use logging::{init_from_env, init_logging, parse_level, LogFormat, LoggingConfig};
