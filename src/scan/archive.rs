//! ZIP extraction into a scan workspace
//!
//! Entries are resolved with [`zip::read::ZipFile::enclosed_name`], so names that
//! are absolute or climb out with `..` never reach the filesystem. They are
//! skipped and counted instead of failing the whole upload. So is any entry
//! that would land on the archive itself.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use zip::result::ZipError;
use zip::ZipArchive;

#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The upload is not a readable ZIP archive
    #[error("Invalid ZIP file: {0}")]
    InvalidArchive(String),

    /// A well-formed archive using a feature we cannot read, e.g. encryption
    #[error("Unsupported ZIP file: {0}")]
    Unsupported(String),

    #[error("Archive exceeds {limit}: {detail}")]
    TooLarge { limit: &'static str, detail: String },

    #[error("I/O error while extracting {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl ArchiveError {
    fn from_zip(archive: &Path, err: ZipError) -> Self {
        match err {
            ZipError::Io(source) => ArchiveError::io(archive, source),
            ZipError::UnsupportedArchive(reason) => ArchiveError::Unsupported(reason.to_string()),
            other => ArchiveError::InvalidArchive(other.to_string()),
        }
    }

    fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ArchiveError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Bounds applied while unpacking an upload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractLimits {
    pub max_entries: usize,
    pub max_bytes: u64,
}

impl Default for ExtractLimits {
    fn default() -> Self {
        Self {
            max_entries: 20_000,
            max_bytes: 524_288_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractSummary {
    pub files: usize,
    pub directories: usize,
    pub skipped: usize,
    pub bytes: u64,
}

/// Unpacks `archive` into `dest`, which must already exist.
pub fn extract_zip(
    archive: &Path,
    dest: &Path,
    limits: ExtractLimits,
) -> Result<ExtractSummary, ArchiveError> {
    let file = File::open(archive).map_err(|e| ArchiveError::io(archive, e))?;
    let mut zip = ZipArchive::new(file).map_err(|e| ArchiveError::from_zip(archive, e))?;

    if zip.len() > limits.max_entries {
        return Err(ArchiveError::TooLarge {
            limit: "entry limit",
            detail: format!("{} entries, limit is {}", zip.len(), limits.max_entries),
        });
    }

    let mut summary = ExtractSummary::default();

    for index in 0..zip.len() {
        let mut entry = zip
            .by_index(index)
            .map_err(|e| ArchiveError::from_zip(archive, e))?;

        let Some(relative) = entry.enclosed_name() else {
            warn!(entry = entry.name(), "Skipping archive entry outside workspace");
            summary.skipped += 1;
            continue;
        };
        let target = dest.join(relative);

        if target.starts_with(archive) {
            warn!(entry = entry.name(), "Skipping archive entry that shadows the upload");
            summary.skipped += 1;
            continue;
        }

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|e| ArchiveError::io(&target, e))?;
            summary.directories += 1;
            continue;
        }

        let declared = entry.size();
        if summary.bytes.saturating_add(declared) > limits.max_bytes {
            return Err(ArchiveError::TooLarge {
                limit: "size limit",
                detail: format!("more than {} uncompressed bytes", limits.max_bytes),
            });
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| ArchiveError::io(parent, e))?;
        }

        let mut out = File::create(&target).map_err(|e| ArchiveError::io(&target, e))?;
        let remaining = limits.max_bytes - summary.bytes;
        let written = io::copy(&mut io::Read::take(&mut entry, remaining + 1), &mut out)
            .map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData => ArchiveError::InvalidArchive(e.to_string()),
                _ => ArchiveError::io(&target, e),
            })?;

        // Declared sizes can lie; the take() above bounds what actually lands on disk.
        if written > remaining {
            return Err(ArchiveError::TooLarge {
                limit: "size limit",
                detail: format!("more than {} uncompressed bytes", limits.max_bytes),
            });
        }

        summary.bytes += written;
        summary.files += 1;
    }

    debug!(
        files = summary.files,
        directories = summary.directories,
        skipped = summary.skipped,
        bytes = summary.bytes,
        "Archive extracted"
    );

    Ok(summary)
}
