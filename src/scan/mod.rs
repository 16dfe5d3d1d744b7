//! Upload scanning: archive extraction, scanner execution and report parsing

pub mod archive;
pub mod report;
pub mod scanner;
pub mod service;

pub use archive::{extract_zip, ArchiveError, ExtractLimits, ExtractSummary};
pub use report::{build_report, clean_output, severity_counts, Finding, ScanReport, SeverityCounts};
pub use scanner::{BanditScanner, Scanner, ScannerError, ScannerOutput};
pub use service::{ScanOutcome, ScanService, ServiceError};
