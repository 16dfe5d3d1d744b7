//! Progress reporting for scan operations

mod handler;
mod logging;

pub use handler::{NoOpHandler, ProgressHandler, ScanEvent};
pub use logging::LoggingHandler;
