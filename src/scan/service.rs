//! Scan orchestration
//!
//! `ScanService` owns the lifecycle of one scan:
//! 1. Creates a fresh workspace named by a UUID under the upload root
//! 2. Saves the archive there as `code.zip`
//! 3. Extracts it on the blocking pool
//! 4. Runs the scanner over the workspace
//! 5. Parses the scanner output into a [`ScanReport`]
//!
//! An upload that is not a ZIP archive is a normal outcome: the report carries
//! the `Invalid ZIP file` error and the scanner is not run.
//!
//! # Example
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
//! if let Some(counts) = outcome.report.summary() {
//!     println!("HIGH: {}", counts.high);
//! }
//! # Ok(())
//! # }
//! ```

use super::archive::{extract_zip, ArchiveError, ExtractLimits, ExtractSummary};
use super::report::{build_report, ScanReport};
use super::scanner::{BanditScanner, Scanner, ScannerError};
use crate::config::ScanboxConfig;
use crate::progress::{LoggingHandler, ProgressHandler, ScanEvent};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

const ARCHIVE_FILE_NAME: &str = "code.zip";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Failed to prepare scan workspace {path}: {source}")]
    Workspace {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Archive not found: {0}")]
    ArchiveNotFound(PathBuf),

    #[error("Archive rejected: {0}")]
    ArchiveRejected(String),

    #[error("Archive uses an unsupported ZIP feature: {0}")]
    ArchiveUnsupported(String),

    #[error("Scanner error: {0}")]
    Scanner(#[from] ScannerError),

    #[error("Extraction task failed: {0}")]
    Task(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ServiceError {
    /// Returns a user-facing message with troubleshooting hints
    pub fn help_message(&self) -> String {
        match self {
            ServiceError::Workspace { path, source } => format!(
                "Error: Cannot create scan workspace\nPath: {}\n\n\
                Help: Check that SCANBOX_UPLOAD_DIR points to a writable directory.\n\n\
                Details: {}",
                path.display(),
                source
            ),
            ServiceError::ArchiveNotFound(path) => format!(
                "Error: Archive not found\nPath: {}\n\n\
                Help: Pass the path to an existing .zip file.",
                path.display()
            ),
            ServiceError::ArchiveRejected(msg) => format!(
                "Error: Archive rejected\n\n\
                Help: The archive exceeds the configured limits. Try:\n\
                - Removing vendored dependencies and build output before zipping\n\
                - Raising SCANBOX_MAX_EXTRACTED_SIZE or SCANBOX_MAX_ENTRIES\n\n\
                Details: {}",
                msg
            ),
            ServiceError::ArchiveUnsupported(msg) => format!(
                "Error: Archive cannot be read\n\n\
                Help: Re-create the archive without a password, using deflate, bzip2 or \
                LZMA compression.\n\n\
                Details: {}",
                msg
            ),
            ServiceError::Scanner(ScannerError::NotFound(bin)) => format!(
                "Error: Scanner not installed\n\n\
                Help: '{}' was not found on PATH. Try:\n\
                - pip install bandit\n\
                - Set SCANBOX_SCANNER_BIN to the scanner's full path",
                bin
            ),
            ServiceError::Scanner(ScannerError::Timeout { seconds }) => format!(
                "Error: Scan timed out after {} seconds\n\n\
                Help: Increase SCANBOX_SCAN_TIMEOUT or upload a smaller tree.",
                seconds
            ),
            other => format!("Error: {}", other),
        }
    }
}

/// Result of one scan
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    pub scan_id: Uuid,
    pub workspace: PathBuf,
    pub report: ScanReport,
    pub extracted: Option<ExtractSummary>,
    pub started_at: DateTime<Utc>,
    pub duration: Duration,
}

pub struct ScanService {
    upload_root: PathBuf,
    limits: ExtractLimits,
    retain_uploads: bool,
    scanner: Arc<dyn Scanner>,
    progress: Arc<dyn ProgressHandler>,
}

impl ScanService {
    pub fn new(config: &ScanboxConfig, scanner: Arc<dyn Scanner>) -> Self {
        Self {
            upload_root: config.upload_dir.clone(),
            limits: ExtractLimits {
                max_entries: config.max_entries,
                max_bytes: config.max_extracted_size,
            },
            retain_uploads: config.retain_uploads,
            scanner,
            progress: Arc::new(LoggingHandler),
        }
    }

    /// Builds a service backed by [`BanditScanner`].
    pub fn from_config(config: &ScanboxConfig) -> Self {
        let scanner = BanditScanner::new(config.scanner_bin.clone(), config.scan_timeout());
        Self::new(config, Arc::new(scanner))
    }

    pub fn with_progress(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress = handler;
        self
    }

    pub fn scanner(&self) -> &Arc<dyn Scanner> {
        &self.scanner
    }

    pub fn upload_root(&self) -> &Path {
        &self.upload_root
    }

    /// Scans an uploaded archive held in memory.
    pub async fn scan_upload(&self, data: Bytes) -> Result<ScanOutcome, ServiceError> {
        let (scan_id, workspace) = self.create_workspace().await?;
        let archive = workspace.join(ARCHIVE_FILE_NAME);

        if let Err(e) = tokio::fs::write(&archive, &data).await {
            self.cleanup(&workspace).await;
            return Err(e.into());
        }
        self.progress.on_progress(&ScanEvent::UploadSaved {
            scan_id: scan_id.to_string(),
            bytes: data.len() as u64,
        });

        self.finish(scan_id, workspace).await
    }

    /// Copies a local archive into a fresh workspace and scans it.
    pub async fn scan_archive(&self, path: &Path) -> Result<ScanOutcome, ServiceError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ServiceError::ArchiveNotFound(path.to_path_buf()));
        }

        let (scan_id, workspace) = self.create_workspace().await?;
        let archive = workspace.join(ARCHIVE_FILE_NAME);

        match tokio::fs::copy(path, &archive).await {
            Ok(bytes) => self.progress.on_progress(&ScanEvent::UploadSaved {
                scan_id: scan_id.to_string(),
                bytes,
            }),
            Err(e) => {
                self.cleanup(&workspace).await;
                return Err(e.into());
            }
        }

        self.finish(scan_id, workspace).await
    }

    async fn create_workspace(&self) -> Result<(Uuid, PathBuf), ServiceError> {
        tokio::fs::create_dir_all(&self.upload_root)
            .await
            .map_err(|source| ServiceError::Workspace {
                path: self.upload_root.clone(),
                source,
            })?;

        let scan_id = Uuid::new_v4();
        let workspace = self.upload_root.join(scan_id.to_string());
        tokio::fs::create_dir(&workspace)
            .await
            .map_err(|source| ServiceError::Workspace {
                path: workspace.clone(),
                source,
            })?;

        self.progress.on_progress(&ScanEvent::Started {
            scan_id: scan_id.to_string(),
        });

        Ok((scan_id, workspace))
    }

    async fn finish(&self, scan_id: Uuid, workspace: PathBuf) -> Result<ScanOutcome, ServiceError> {
        let result = self.run(scan_id, &workspace).await;

        if let Err(ref e) = result {
            self.progress.on_progress(&ScanEvent::Failed {
                scan_id: scan_id.to_string(),
                error: e.to_string(),
            });
        }

        self.cleanup(&workspace).await;
        result
    }

    async fn run(&self, scan_id: Uuid, workspace: &Path) -> Result<ScanOutcome, ServiceError> {
        let started = Instant::now();
        let started_at = Utc::now();
        let id = scan_id.to_string();

        let archive = workspace.join(ARCHIVE_FILE_NAME);
        let dest = workspace.to_path_buf();
        let limits = self.limits;
        let extraction = tokio::task::spawn_blocking(move || extract_zip(&archive, &dest, limits))
            .await
            .map_err(|e| ServiceError::Task(e.to_string()))?;

        let summary = match extraction {
            Ok(summary) => summary,
            Err(ArchiveError::InvalidArchive(reason)) => {
                self.progress.on_progress(&ScanEvent::InvalidArchive {
                    scan_id: id,
                    reason,
                });
                return Ok(ScanOutcome {
                    scan_id,
                    workspace: workspace.to_path_buf(),
                    report: ScanReport::invalid_archive(),
                    extracted: None,
                    started_at,
                    duration: started.elapsed(),
                });
            }
            Err(e @ ArchiveError::TooLarge { .. }) => {
                return Err(ServiceError::ArchiveRejected(e.to_string()))
            }
            Err(ArchiveError::Unsupported(reason)) => {
                return Err(ServiceError::ArchiveUnsupported(reason))
            }
            Err(ArchiveError::Io { source, .. }) => return Err(ServiceError::Io(source)),
        };

        self.progress.on_progress(&ScanEvent::Extracted {
            scan_id: id.clone(),
            files: summary.files,
            skipped: summary.skipped,
            duration: started.elapsed(),
        });

        self.progress.on_progress(&ScanEvent::ScannerStarted {
            scan_id: id.clone(),
            scanner: self.scanner.name().to_string(),
        });
        let output = self.scanner.scan(workspace).await?;
        if !output.stderr.trim().is_empty() {
            debug!(scan_id = %id, stderr = %output.stderr.trim(), "Scanner stderr");
        }

        let report = build_report(&output.stdout);
        let counts = report.summary().unwrap_or_default();

        self.progress.on_progress(&ScanEvent::Completed {
            scan_id: id,
            findings: counts.total(),
            high: counts.high,
            duration: started.elapsed(),
        });

        Ok(ScanOutcome {
            scan_id,
            workspace: workspace.to_path_buf(),
            report,
            extracted: Some(summary),
            started_at,
            duration: started.elapsed(),
        })
    }

    async fn cleanup(&self, workspace: &Path) {
        if self.retain_uploads {
            return;
        }
        if let Err(e) = tokio::fs::remove_dir_all(workspace).await {
            warn!(workspace = %workspace.display(), error = %e, "Failed to remove scan workspace");
        }
    }
}
