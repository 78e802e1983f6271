use std::fmt;
use std::io;
use std::path::Path;

use crate::archive::ARCHIVE_EXT;
use crate::error::AmberError;

#[derive(Debug)]
pub struct CliError {
    pub msg: String,
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.msg.fmt(f)
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

/// Format a user friendly I/O error message with suggestions.
pub fn format_io_error(operation: &str, path: &Path, err: &io::Error) -> String {
    use io::ErrorKind::*;
    let suggestion = match err.kind() {
        NotFound => "Check that the file exists and the path is correct.",
        PermissionDenied => "Check permissions or run as a different user.",
        UnexpectedEof => "File appears truncated or corrupted.",
        WriteZero => "Disk may be full. Free up space and try again.",
        Other if err.raw_os_error() == Some(28) => "Disk may be full. Free up space and try again.",
        _ => "Check permissions or free up disk space.",
    };
    format!(
        "Error {} '{}': {}. {}",
        operation,
        path.display(),
        err,
        suggestion
    )
}

/// Convert an I/O error into a CLI error with context.
pub fn io_cli_error(operation: &str, path: &Path, err: io::Error) -> CliError {
    CliError {
        msg: format_io_error(operation, path, &err),
        source: Some(Box::new(err)),
    }
}

/// Invalid file extension error.
pub fn extension_error(path: &Path) -> CliError {
    CliError {
        msg: format!(
            "Invalid file extension for '{}'. Expected .{}. Check the input file.",
            path.display(),
            ARCHIVE_EXT
        ),
        source: None,
    }
}

/// Convert a library error into a CLI error with a hint.
pub fn amber_cli_error(context: &str, err: AmberError) -> CliError {
    CliError {
        msg: format!("{}: {}", context, cli_hint(&err)),
        source: Some(Box::new(err)),
    }
}

/// Return an actionable hint for a library error variant.
pub fn cli_hint(err: &AmberError) -> String {
    use AmberError::*;
    match err {
        SourceNotFound { path } => format!(
            "source directory '{}' does not exist. Check the path.",
            path.display()
        ),
        Compression { path, reason } => format!(
            "could not compress '{}': {reason}. The file may be unreadable.",
            path.display()
        ),
        ArchiveWrite(msg) => format!("{msg}. Check the output directory and disk space."),
        Validation(msg) => format!("{msg}. The archive must not be trusted."),
        Extraction { path, reason } => {
            format!("could not extract '{path}': {reason}. Verify the file is intact.")
        }
        Format(msg) => format!("{msg}. Verify the file is intact."),
        Io(io) => format!("{io}"),
    }
}
