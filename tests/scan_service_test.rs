//! Scan pipeline tests against the public `ScanService` API

mod support;

use scanbox::{NoOpHandler, ProgressHandler, ScanEvent, ScanService, ScanboxConfig, ServiceError};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use support::{python_project, test_config, zip_bytes, FakeScanner, BANDIT_REPORT};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingHandler {
    events: Mutex<Vec<String>>,
}

impl RecordingHandler {
    fn names(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl ProgressHandler for RecordingHandler {
    fn on_progress(&self, event: &ScanEvent) {
        let name = match event {
            ScanEvent::Started { .. } => "started",
            ScanEvent::UploadSaved { .. } => "upload_saved",
            ScanEvent::Extracted { .. } => "extracted",
            ScanEvent::InvalidArchive { .. } => "invalid_archive",
            ScanEvent::ScannerStarted { .. } => "scanner_started",
            ScanEvent::Completed { .. } => "completed",
            ScanEvent::Failed { .. } => "failed",
        };
        self.events.lock().unwrap().push(name.to_string());
    }
}

fn service(config: &ScanboxConfig, scanner: Arc<FakeScanner>) -> (ScanService, Arc<RecordingHandler>) {
    let handler = Arc::new(RecordingHandler::default());
    let service = ScanService::new(config, scanner).with_progress(handler.clone());
    (service, handler)
}

#[tokio::test]
async fn test_successful_scan_emits_every_stage() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let (service, handler) = service(&config, Arc::new(FakeScanner::with_output(BANDIT_REPORT)));

    let outcome = service.scan_upload(python_project()).await.unwrap();

    assert_eq!(
        handler.names(),
        vec!["started", "upload_saved", "extracted", "scanner_started", "completed"]
    );
    assert_eq!(outcome.extracted.unwrap().files, 2);
    assert_eq!(outcome.report.summary().unwrap().total(), 3);
    assert_eq!(
        outcome.workspace,
        temp.path().join(outcome.scan_id.to_string())
    );
}

#[tokio::test]
async fn test_invalid_archive_emits_invalid_event() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let scanner = Arc::new(FakeScanner::with_output(BANDIT_REPORT));
    let (service, handler) = service(&config, scanner.clone());

    let outcome = service
        .scan_upload(bytes::Bytes::from_static(b"not a zip"))
        .await
        .unwrap();

    assert!(outcome.report.is_invalid_archive());
    assert!(outcome.extracted.is_none());
    assert_eq!(
        handler.names(),
        vec!["started", "upload_saved", "invalid_archive"]
    );
    assert_eq!(scanner.scan_count(), 0);
}

#[tokio::test]
async fn test_scanner_failure_emits_failed_event() {
    let temp = TempDir::new().unwrap();
    let config = ScanboxConfig {
        retain_uploads: false,
        ..test_config(temp.path())
    };
    let (service, handler) = service(
        &config,
        Arc::new(FakeScanner::failing(|| {
            scanbox::ScannerError::Timeout { seconds: 1 }
        })),
    );

    let err = service.scan_upload(python_project()).await.unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Scanner(scanbox::ScannerError::Timeout { seconds: 1 })
    ));
    assert_eq!(handler.names().last().map(String::as_str), Some("failed"));
    assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_concurrent_scans_use_separate_workspaces() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let scanner = Arc::new(FakeScanner::with_output(BANDIT_REPORT));
    let service =
        Arc::new(ScanService::new(&config, scanner.clone()).with_progress(Arc::new(NoOpHandler)));

    let mut tasks = Vec::new();
    for i in 0..4 {
        let service = service.clone();
        let archive = zip_bytes(&[(&format!("module_{i}.py"), "print('hi')\n")]);
        tasks.push(tokio::spawn(async move {
            service.scan_upload(archive).await.unwrap()
        }));
    }

    let mut ids = HashSet::new();
    for task in tasks {
        let outcome = task.await.unwrap();
        ids.insert(outcome.scan_id);
    }

    assert_eq!(ids.len(), 4);
    assert_eq!(scanner.scan_count(), 4);
    for id in &ids {
        assert!(temp.path().join(id.to_string()).join("code.zip").exists());
    }
}

#[tokio::test]
async fn test_scan_archive_from_disk() {
    let temp = TempDir::new().unwrap();
    let uploads = temp.path().join("uploads");
    let config = test_config(&uploads);
    let (service, _) = service(&config, Arc::new(FakeScanner::with_output(BANDIT_REPORT)));

    let archive = temp.path().join("project.zip");
    std::fs::write(&archive, python_project()).unwrap();

    let outcome = service.scan_archive(&archive).await.unwrap();

    assert!(outcome.workspace.starts_with(&uploads));
    assert!(outcome.workspace.join("db.py").exists());
    assert_eq!(outcome.report.summary().unwrap().high, 1);
}

#[tokio::test]
async fn test_unsafe_entries_stay_inside_workspace() {
    let temp = TempDir::new().unwrap();
    let uploads = temp.path().join("uploads");
    let config = test_config(&uploads);
    let (service, _) = service(&config, Arc::new(FakeScanner::with_output(BANDIT_REPORT)));

    let absolute = temp.path().join("absolute.py");
    let absolute_name = absolute.to_string_lossy().into_owned();
    let archive = zip_bytes(&[
        ("../climb.py", "print('up')"),
        (absolute_name.as_str(), "print('abs')"),
        ("code.zip", "not the upload"),
        ("app.py", "print('ok')"),
    ]);

    let outcome = service.scan_upload(archive).await.unwrap();

    let extracted = outcome.extracted.unwrap();
    assert_eq!(extracted.files, 1);
    assert_eq!(extracted.skipped, 3);
    assert!(outcome.workspace.join("app.py").exists());
    assert!(!uploads.join("climb.py").exists());
    assert!(!absolute.exists());

    // The upload root holds nothing but this scan's workspace.
    let entries: Vec<_> = std::fs::read_dir(&uploads)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries, vec![outcome.workspace.clone()]);
    assert!(outcome.report.summary().is_some());
}

#[tokio::test]
async fn test_unsupported_compression_is_not_reported_as_invalid() {
    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let scanner = Arc::new(FakeScanner::with_output(BANDIT_REPORT));
    let (service, _) = service(&config, scanner.clone());

    // Compression method 97 has no decoder.
    let mut raw = zip_bytes(&[("app.py", "print('x')")]).to_vec();
    raw[8..10].copy_from_slice(&97u16.to_le_bytes());
    let central = raw
        .windows(4)
        .position(|w| w == [0x50, 0x4b, 0x01, 0x02])
        .unwrap();
    raw[central + 10..central + 12].copy_from_slice(&97u16.to_le_bytes());

    let err = service
        .scan_upload(bytes::Bytes::from(raw))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::ArchiveUnsupported(_)), "{err:?}");
    assert!(err.help_message().contains("bzip2"));
    assert_eq!(scanner.scan_count(), 0);
}

#[tokio::test]
async fn test_bzip2_upload_is_scanned() {
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    let temp = TempDir::new().unwrap();
    let config = test_config(temp.path());
    let scanner = Arc::new(FakeScanner::with_output(BANDIT_REPORT));
    let (service, _) = service(&config, scanner.clone());

    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    writer
        .start_file(
            "app.py",
            SimpleFileOptions::default().compression_method(CompressionMethod::Bzip2),
        )
        .unwrap();
    writer.write_all(b"import os\n").unwrap();
    let archive = writer.finish().unwrap().into_inner();

    let outcome = service
        .scan_upload(bytes::Bytes::from(archive))
        .await
        .unwrap();

    assert!(!outcome.report.is_invalid_archive());
    assert_eq!(outcome.report.summary().unwrap().high, 1);
    assert!(outcome.workspace.join("app.py").exists());
    assert_eq!(scanner.scan_count(), 1);
}
