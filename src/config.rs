//! Configuration management for scanbox
//!
//! Settings are loaded from environment variables with defaults that match the
//! container image: listen on `0.0.0.0:8000`, keep uploads under `/tmp/uploads`
//! and run `bandit` from `PATH`.
//!
//! # Environment Variables
//!
//! - `SCANBOX_BIND`: listen address - default: "0.0.0.0"
//! - `SCANBOX_PORT`: listen port - default: "8000"
//! - `SCANBOX_UPLOAD_DIR`: root directory for scan workspaces - default: "/tmp/uploads"
//! - `SCANBOX_TEMPLATE_DIR`: directory containing an `index.html` override - default: unset
//! - `SCANBOX_STATIC_DIR`: directory served under `/static` - default: "static"
//! - `SCANBOX_SCANNER_BIN`: scanner executable - default: "bandit"
//! - `SCANBOX_SCAN_TIMEOUT`: scanner timeout in seconds - default: "300"
//! - `SCANBOX_MAX_UPLOAD_SIZE`: request body cap in bytes - default: "52428800" (50MB)
//! - `SCANBOX_MAX_EXTRACTED_SIZE`: uncompressed archive cap in bytes - default: "524288000" (500MB)
//! - `SCANBOX_MAX_ENTRIES`: archive entry cap - default: "20000"
//! - `SCANBOX_RETAIN_UPLOADS`: keep scan workspaces after scanning - default: "true"
//! - `SCANBOX_LOG_LEVEL`: logging level - default: "info"
//! - `SCANBOX_LOG_JSON`: JSON log lines - default: "false"; read by
//!   [`crate::util::logging::LoggingConfig::from_env`], not stored here
//!
//! # Example
//!
//! ```no_run
//! use scanbox::ScanboxConfig;
//!
//! let config = ScanboxConfig::default();
//! config.validate().expect("Invalid configuration");
//! println!("listening on {}", config.bind_addr());
//! ```

use std::collections::HashMap;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BIND: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_UPLOAD_DIR: &str = "/tmp/uploads";
const DEFAULT_STATIC_DIR: &str = "static";
const DEFAULT_SCANNER_BIN: &str = "bandit";
const DEFAULT_SCAN_TIMEOUT_SECS: u64 = 300;
const DEFAULT_MAX_UPLOAD_SIZE: usize = 52_428_800; // 50MB
const DEFAULT_MAX_EXTRACTED_SIZE: u64 = 524_288_000; // 500MB
const DEFAULT_MAX_ENTRIES: usize = 20_000;
const DEFAULT_RETAIN_UPLOADS: bool = true;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },
}

/// Runtime configuration for the scan service and CLI
#[derive(Debug, Clone)]
pub struct ScanboxConfig {
    pub bind: String,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub template_dir: Option<PathBuf>,
    pub static_dir: PathBuf,
    pub scanner_bin: String,
    pub scan_timeout_secs: u64,
    pub max_upload_size: usize,
    pub max_extracted_size: u64,
    pub max_entries: usize,
    pub retain_uploads: bool,
    pub log_level: String,
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

impl Default for ScanboxConfig {
    fn default() -> Self {
        let bind = env::var("SCANBOX_BIND").unwrap_or_else(|_| DEFAULT_BIND.to_string());

        let upload_dir = env::var("SCANBOX_UPLOAD_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));

        let template_dir = env::var("SCANBOX_TEMPLATE_DIR").ok().map(PathBuf::from);

        let static_dir = env::var("SCANBOX_STATIC_DIR")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        let scanner_bin =
            env::var("SCANBOX_SCANNER_BIN").unwrap_or_else(|_| DEFAULT_SCANNER_BIN.to_string());

        let log_level = env::var("SCANBOX_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            bind,
            port: env_parsed("SCANBOX_PORT", DEFAULT_PORT),
            upload_dir,
            template_dir,
            static_dir,
            scanner_bin,
            scan_timeout_secs: env_parsed("SCANBOX_SCAN_TIMEOUT", DEFAULT_SCAN_TIMEOUT_SECS),
            max_upload_size: env_parsed("SCANBOX_MAX_UPLOAD_SIZE", DEFAULT_MAX_UPLOAD_SIZE),
            max_extracted_size: env_parsed(
                "SCANBOX_MAX_EXTRACTED_SIZE",
                DEFAULT_MAX_EXTRACTED_SIZE,
            ),
            max_entries: env_parsed("SCANBOX_MAX_ENTRIES", DEFAULT_MAX_ENTRIES),
            retain_uploads: env_parsed("SCANBOX_RETAIN_UPLOADS", DEFAULT_RETAIN_UPLOADS),
            log_level,
        }
    }
}

impl ScanboxConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Bind address must not be empty".to_string(),
            ));
        }

        if self.scanner_bin.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Scanner binary must not be empty".to_string(),
            ));
        }

        if self.scan_timeout_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Scan timeout must be at least 1 second".to_string(),
            ));
        }
        if self.scan_timeout_secs > 3600 {
            return Err(ConfigError::ValidationFailed(
                "Scan timeout cannot exceed 1 hour".to_string(),
            ));
        }

        if self.max_upload_size < 1024 {
            return Err(ConfigError::ValidationFailed(
                "Max upload size must be at least 1KB".to_string(),
            ));
        }
        if self.max_upload_size > 1_073_741_824 {
            return Err(ConfigError::ValidationFailed(
                "Max upload size cannot exceed 1GB".to_string(),
            ));
        }

        if self.max_extracted_size < self.max_upload_size as u64 {
            return Err(ConfigError::ValidationFailed(
                "Max extracted size must be at least the max upload size".to_string(),
            ));
        }

        if self.max_entries == 0 {
            return Err(ConfigError::ValidationFailed(
                "Max archive entries must be at least 1".to_string(),
            ));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    self.log_level
                )))
            }
        }

        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_secs)
    }

    pub fn to_display_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("bind".to_string(), self.bind.clone());
        map.insert("port".to_string(), self.port.to_string());
        map.insert(
            "upload_dir".to_string(),
            self.upload_dir.display().to_string(),
        );
        if let Some(ref dir) = self.template_dir {
            map.insert("template_dir".to_string(), dir.display().to_string());
        }
        map.insert(
            "static_dir".to_string(),
            self.static_dir.display().to_string(),
        );
        map.insert("scanner_bin".to_string(), self.scanner_bin.clone());
        map.insert(
            "scan_timeout_secs".to_string(),
            self.scan_timeout_secs.to_string(),
        );
        map.insert(
            "max_upload_size".to_string(),
            self.max_upload_size.to_string(),
        );
        map.insert(
            "max_extracted_size".to_string(),
            self.max_extracted_size.to_string(),
        );
        map.insert("max_entries".to_string(), self.max_entries.to_string());
        map.insert(
            "retain_uploads".to_string(),
            self.retain_uploads.to_string(),
        );
        map.insert("log_level".to_string(), self.log_level.clone());

        map
    }
}

impl fmt::Display for ScanboxConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scanbox Configuration:")?;
        writeln!(f, "  Listen: {}", self.bind_addr())?;
        writeln!(f, "  Upload Dir: {}", self.upload_dir.display())?;
        if let Some(ref dir) = self.template_dir {
            writeln!(f, "  Template Dir: {}", dir.display())?;
        }
        writeln!(f, "  Static Dir: {}", self.static_dir.display())?;
        writeln!(f, "  Scanner: {}", self.scanner_bin)?;
        writeln!(f, "  Scan Timeout: {}s", self.scan_timeout_secs)?;
        writeln!(f, "  Max Upload Size: {} bytes", self.max_upload_size)?;
        writeln!(f, "  Max Extracted Size: {} bytes", self.max_extracted_size)?;
        writeln!(f, "  Max Entries: {}", self.max_entries)?;
        writeln!(f, "  Retain Uploads: {}", self.retain_uploads)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
