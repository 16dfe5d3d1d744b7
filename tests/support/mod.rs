#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use scanbox::scan::ScannerOutput;
use scanbox::{ScanboxConfig, Scanner, ScannerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub const BANDIT_REPORT: &str = r#"{
  "errors": [],
  "generated_at": "2024-05-01T10:00:00Z",
  "metrics": {"_totals": {"loc": 9, "SEVERITY.HIGH": 1}},
  "results": [
    {"filename": "app.py", "line_number": 5, "test_id": "B602",
     "test_name": "subprocess_popen_with_shell_equals_true",
     "issue_severity": "HIGH", "issue_confidence": "HIGH",
     "issue_text": "subprocess call with shell=True identified, security issue."},
    {"filename": "app.py", "line_number": 1, "test_id": "B404",
     "test_name": "blacklist", "issue_severity": "LOW", "issue_confidence": "HIGH",
     "issue_text": "Consider possible security implications associated with the subprocess module."},
    {"filename": "db.py", "line_number": 12, "test_id": "B608",
     "test_name": "hardcoded_sql_expressions", "issue_severity": "MEDIUM",
     "issue_confidence": "LOW", "issue_text": "Possible SQL injection vector."}
  ]
}"#;

pub fn get_scanbox_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop();
    if path.ends_with("deps") {
        path.pop();
    }
    path.join("scanbox")
}

pub fn zip_bytes(entries: &[(&str, &str)]) -> Bytes {
    let mut writer = ZipWriter::new(std::io::Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    Bytes::from(writer.finish().unwrap().into_inner())
}

pub fn python_project() -> Bytes {
    zip_bytes(&[
        (
            "app.py",
            "import subprocess\nsubprocess.call('ls', shell=True)\n",
        ),
        ("db.py", "query = 'SELECT * FROM t WHERE id = %s' % user_id\n"),
    ])
}

pub fn test_config(upload_dir: &Path) -> ScanboxConfig {
    ScanboxConfig {
        bind: "127.0.0.1".to_string(),
        port: 0,
        upload_dir: upload_dir.to_path_buf(),
        template_dir: None,
        static_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"),
        scanner_bin: "bandit".to_string(),
        scan_timeout_secs: 30,
        max_upload_size: 1_048_576,
        max_extracted_size: 10_485_760,
        max_entries: 1000,
        retain_uploads: true,
        log_level: "info".to_string(),
    }
}

/// Scanner returning canned output and recording the paths it was pointed at
pub struct FakeScanner {
    stdout: String,
    failure: Option<fn() -> ScannerError>,
    pub scanned: Mutex<Vec<PathBuf>>,
}

impl FakeScanner {
    pub fn with_output(stdout: &str) -> Self {
        Self {
            stdout: stdout.to_string(),
            failure: None,
            scanned: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: fn() -> ScannerError) -> Self {
        Self {
            stdout: String::new(),
            failure: Some(failure),
            scanned: Mutex::new(Vec::new()),
        }
    }

    pub fn scan_count(&self) -> usize {
        self.scanned.lock().unwrap().len()
    }
}

#[async_trait]
impl Scanner for FakeScanner {
    fn name(&self) -> &str {
        "fake-bandit"
    }

    async fn scan(&self, path: &Path) -> Result<ScannerOutput, ScannerError> {
        self.scanned.lock().unwrap().push(path.to_path_buf());
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        Ok(ScannerOutput {
            stdout: self.stdout.clone(),
            stderr: String::new(),
            exit_code: Some(1),
            duration: Duration::from_millis(5),
        })
    }

    async fn version(&self) -> Result<String, ScannerError> {
        match self.failure {
            Some(failure) => Err(failure()),
            None => Ok("fake-bandit 1.7.9".to_string()),
        }
    }
}
