//! scanbox - upload-and-scan service for static security analysis
//!
//! A user uploads a ZIP archive of source code; scanbox unpacks it into a
//! private workspace, runs the Bandit static analyser over it and reports the
//! findings tallied by severity, either as an HTML page, as JSON, or on the
//! command line.
//!
//! # Example Usage
//!
//! ```no_run
//! use scanbox::{ScanService, ScanboxConfig};
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ScanboxConfig::default();
//! let service = ScanService::from_config(&config);
//!
//! let outcome = service.scan_archive(Path::new("project.zip")).await?;
//! println!("{}", serde_json::to_string_pretty(&outcome.report)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`scan`]: archive extraction, scanner execution and report parsing
//! - [`server`]: axum routes, page templates and request tracing
//! - [`cli`]: command-line entry points and output formatting
//! - [`config`]: environment-driven configuration

pub mod cli;
pub mod config;
pub mod progress;
pub mod scan;
pub mod server;
pub mod util;

pub use config::{ConfigError, ScanboxConfig};
pub use progress::{LoggingHandler, NoOpHandler, ProgressHandler, ScanEvent};
pub use scan::{
    BanditScanner, ScanOutcome, ScanReport, ScanService, Scanner, ScannerError, ServiceError,
    SeverityCounts,
};
pub use server::{build_router, serve, AppState, Templates};
pub use util::{init_from_env, init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
