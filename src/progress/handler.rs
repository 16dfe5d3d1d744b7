//! Progress handler trait and scan events

use std::time::Duration;

/// Events emitted while a scan moves through its stages
#[derive(Debug, Clone)]
pub enum ScanEvent {
    /// Workspace created for a new scan
    Started { scan_id: String },

    /// Upload written to `code.zip`
    UploadSaved { scan_id: String, bytes: u64 },

    /// Archive unpacked into the workspace
    Extracted {
        scan_id: String,
        files: usize,
        skipped: usize,
        duration: Duration,
    },

    /// Upload could not be read as a ZIP archive
    InvalidArchive { scan_id: String, reason: String },

    /// Scanner process started
    ScannerStarted { scan_id: String, scanner: String },

    /// Scanner finished and its report was parsed
    Completed {
        scan_id: String,
        findings: usize,
        high: usize,
        duration: Duration,
    },

    /// Scan aborted
    Failed { scan_id: String, error: String },
}

/// Receives scan events
pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ScanEvent);
}

/// Handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ScanEvent) {}
}
