use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AmberError {
    /// Source directory missing or not a directory. Aborts the build.
    #[error("source not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// Per-file compression or self-validation failure. The builder skips
    /// the file and records the reason unless strict mode is on.
    #[error("compression failed for {path}: {reason}")]
    Compression { path: PathBuf, reason: String },

    /// Archive envelope could not be written.
    #[error("archive write error: {0}")]
    ArchiveWrite(String),

    /// Post-build validation failure. The archive must not be trusted.
    #[error("validation error: {0}")]
    Validation(String),

    /// Extraction failure: unresolved duplicate, hash mismatch, unsafe path.
    #[error("extraction failed for {path}: {reason}")]
    Extraction { path: String, reason: String },

    /// Envelope decompression or deserialization failure.
    #[error("archive format error: {0}")]
    Format(String),

    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
