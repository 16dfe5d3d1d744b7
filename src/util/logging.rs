//! Structured logging setup for scanbox
//!
//! Wraps `tracing-subscriber` so the server and the CLI initialise logging the
//! same way. `RUST_LOG` always wins; otherwise the crate logs at the configured
//! level and noisy HTTP dependencies are held at `warn`.
//!
//! # Example
//!
//! ```no_run
//! use scanbox::util::logging;
//! use tracing::info;
//!
//! logging::init_from_env();
//! info!(scan_id = "3f2a", "Scan started");
//! ```

use std::env;
use std::str::FromStr;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

const QUIET_TARGETS: &[&str] = &["hyper", "tower_http", "axum::rejection"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// How the global subscriber is set up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Minimum level for `scanbox` targets
    pub level: Level,
    pub format: LogFormat,
    /// Attach file and line to every event
    pub show_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Text,
            show_location: false,
        }
    }
}

impl LoggingConfig {
    /// Reads `SCANBOX_LOG_LEVEL` and `SCANBOX_LOG_JSON`.
    ///
    /// JSON output also turns on source locations, which is what the
    /// container log pipeline expects.
    pub fn from_env() -> Self {
        let level = env::var("SCANBOX_LOG_LEVEL")
            .map(|v| parse_level(&v))
            .unwrap_or(Level::INFO);

        let json = env::var("SCANBOX_LOG_JSON")
            .ok()
            .and_then(|v| v.trim().parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            format: if json { LogFormat::Json } else { LogFormat::Text },
            show_location: json,
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }
}

/// Parses a log level, falling back to `INFO` with a warning on stderr
///
/// ```
/// use scanbox::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("WARN"), Level::WARN);
/// assert_eq!(parse_level("loud"), Level::INFO);
/// ```
pub fn parse_level(value: &str) -> Level {
    Level::from_str(value.trim()).unwrap_or_else(|_| {
        eprintln!(
            "Unknown log level '{}', using info (expected trace, debug, info, warn or error)",
            value
        );
        Level::INFO
    })
}

fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    let directives = std::iter::once(format!("scanbox={}", level))
        .chain(QUIET_TARGETS.iter().map(|target| format!("{}=warn", target)))
        .collect::<Vec<_>>()
        .join(",");

    EnvFilter::new(directives)
}

/// Installs the global subscriber on stderr; only the first call has effect
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let (json, text) = match config.format {
            LogFormat::Json => (
                Some(
                    fmt::layer()
                        .json()
                        .with_file(config.show_location)
                        .with_line_number(config.show_location)
                        .with_writer(std::io::stderr),
                ),
                None,
            ),
            LogFormat::Text => (
                None,
                Some(
                    fmt::layer()
                        .with_file(config.show_location)
                        .with_line_number(config.show_location)
                        .with_writer(std::io::stderr),
                ),
            ),
        };

        tracing_subscriber::registry()
            .with(build_filter(config.level))
            .with(json)
            .with(text)
            .init();
    });
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}
