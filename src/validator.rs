use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::Archive;
use crate::error::AmberError;
use crate::hashing::{self, ContentHash};
use crate::normalize;

/// Relative label of `abs` under `root`, forward slashes.
pub fn relative_label(abs: &Path, root: &Path) -> Option<String> {
    let rel = abs.strip_prefix(root).ok()?;
    Some(
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

/// Post-build integrity check. The archive must hold exactly one record per
/// original file, and each record's stored hash must match the on-disk
/// content (re-normalized first when the record was built in lossy mode).
/// Every failure is fatal: the archive must be treated as untrusted.
pub fn validate_archive(
    archive_path: &Path,
    original_files: &[PathBuf],
    source_root: &Path,
) -> Result<(), AmberError> {
    let archive = Archive::read_from(archive_path)?;

    if archive.files.len() != original_files.len() {
        return Err(AmberError::Validation(format!(
            "record count mismatch: archive has {}, expected {}",
            archive.files.len(),
            original_files.len()
        )));
    }

    for abs in original_files {
        let label = relative_label(abs, source_root).ok_or_else(|| {
            AmberError::Validation(format!(
                "{} is outside the source root",
                abs.display()
            ))
        })?;
        let record = archive
            .files
            .get(&label)
            .ok_or_else(|| AmberError::Validation(format!("missing record for {label}")))?;

        let actual = if record.normalized() {
            let raw = fs::read(abs).map_err(|e| {
                AmberError::Validation(format!("could not re-read {label}: {e}"))
            })?;
            match String::from_utf8(raw) {
                Ok(text) => ContentHash::of(normalize::normalize_text(&text).as_bytes()),
                Err(e) => ContentHash::of(&e.into_bytes()),
            }
        } else {
            hashing::hash_file(abs)
                .map_err(|e| AmberError::Validation(format!("could not re-read {label}: {e}")))?
                .0
        };

        if actual != record.original_hash() {
            return Err(AmberError::Validation(format!(
                "hash mismatch for {label}: source file does not match the archived content"
            )));
        }
    }
    Ok(())
}
