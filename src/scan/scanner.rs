use async_trait::async_trait;
use std::io;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ScannerError {
    #[error("Scanner binary not found: {0}")]
    NotFound(String),

    #[error("Scanner timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Failed to run scanner: {0}")]
    Spawn(#[source] io::Error),

    #[error("Scanner reported an error: {0}")]
    Failed(String),
}

/// Captured result of one scanner run
#[derive(Debug, Clone)]
pub struct ScannerOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub duration: Duration,
}

#[async_trait]
pub trait Scanner: Send + Sync {
    fn name(&self) -> &str;

    /// Runs the scanner recursively over `path`.
    async fn scan(&self, path: &Path) -> Result<ScannerOutput, ScannerError>;

    async fn version(&self) -> Result<String, ScannerError>;
}

/// Runs Bandit as a child process in quiet JSON mode
#[derive(Debug, Clone)]
pub struct BanditScanner {
    program: String,
    timeout: Duration,
}

impl BanditScanner {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn scan_args(path: &Path) -> Vec<String> {
        vec![
            "-r".to_string(),
            path.display().to_string(),
            "-f".to_string(),
            "json".to_string(),
            "--quiet".to_string(),
        ]
    }

    async fn run(&self, args: &[String]) -> Result<ScannerOutput, ScannerError> {
        let started = Instant::now();

        let child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => ScannerError::NotFound(self.program.clone()),
                _ => ScannerError::Spawn(e),
            })?;

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ScannerError::Timeout {
                seconds: self.timeout.as_secs(),
            })?
            .map_err(ScannerError::Spawn)?;

        Ok(ScannerOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
            duration: started.elapsed(),
        })
    }
}

#[async_trait]
impl Scanner for BanditScanner {
    fn name(&self) -> &str {
        "bandit"
    }

    async fn scan(&self, path: &Path) -> Result<ScannerOutput, ScannerError> {
        info!(program = %self.program, path = %path.display(), "Running scanner");

        let output = self.run(&Self::scan_args(path)).await?;

        // Bandit exits 1 when it finds issues, so the status alone is not a failure.
        debug!(
            exit_code = ?output.exit_code,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            duration_ms = output.duration.as_millis(),
            "Scanner finished"
        );

        Ok(output)
    }

    async fn version(&self) -> Result<String, ScannerError> {
        let output = self.run(&["--version".to_string()]).await?;

        if output.exit_code != Some(0) {
            return Err(ScannerError::Failed(output.stderr.trim().to_string()));
        }

        let first_line = output
            .stdout
            .lines()
            .chain(output.stderr.lines())
            .find(|line| !line.trim().is_empty())
            .unwrap_or_default();

        Ok(first_line.trim().to_string())
    }
}
