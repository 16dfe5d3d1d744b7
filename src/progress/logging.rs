//! Logging-based progress handler

use super::{ProgressHandler, ScanEvent};
use tracing::{debug, info, warn};

/// Handler that logs scan events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ScanEvent) {
        match event {
            ScanEvent::Started { scan_id } => {
                info!(scan_id = %scan_id, "Starting scan");
            }
            ScanEvent::UploadSaved { scan_id, bytes } => {
                debug!(scan_id = %scan_id, bytes, "Upload saved");
            }
            ScanEvent::Extracted {
                scan_id,
                files,
                skipped,
                duration,
            } => {
                if *skipped > 0 {
                    warn!(
                        scan_id = %scan_id,
                        files,
                        skipped,
                        duration_ms = duration.as_millis(),
                        "Archive extracted with unsafe entries skipped"
                    );
                } else {
                    info!(
                        scan_id = %scan_id,
                        files,
                        duration_ms = duration.as_millis(),
                        "Archive extracted"
                    );
                }
            }
            ScanEvent::InvalidArchive { scan_id, reason } => {
                warn!(scan_id = %scan_id, reason = %reason, "Upload is not a valid ZIP archive");
            }
            ScanEvent::ScannerStarted { scan_id, scanner } => {
                debug!(scan_id = %scan_id, scanner = %scanner, "Scanner started");
            }
            ScanEvent::Completed {
                scan_id,
                findings,
                high,
                duration,
            } => {
                info!(
                    scan_id = %scan_id,
                    findings,
                    high,
                    duration_ms = duration.as_millis(),
                    "Scan complete"
                );
            }
            ScanEvent::Failed { scan_id, error } => {
                warn!(scan_id = %scan_id, error = %error, "Scan failed");
            }
        }
    }
}
