use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::codec;
use crate::error::AmberError;
use crate::record::FileRecord;

/// Extension of archive files produced by the builder.
pub const ARCHIVE_EXT: &str = "ambr";

/// Bumped whenever the envelope layout changes incompatibly.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct ArchiveMetadata {
    pub created_at: DateTime<Utc>,
    pub source_root: String,
    pub file_count: u64,
    /// Sum of original sizes over all records, duplicates included.
    pub total_original_size: u64,
    /// Sum of stored payload sizes. Duplicates contribute 0.
    pub total_compressed_size: u64,
    pub format_version: u32,
}

impl ArchiveMetadata {
    pub fn compute(
        source_root: String,
        created_at: DateTime<Utc>,
        files: &BTreeMap<String, FileRecord>,
    ) -> Self {
        ArchiveMetadata {
            created_at,
            source_root,
            file_count: files.len() as u64,
            total_original_size: files.values().map(|r| r.original_size()).sum(),
            total_compressed_size: files.values().map(|r| r.compressed_size()).sum(),
            format_version: FORMAT_VERSION,
        }
    }
}

/// The whole archive document: metadata plus records keyed by relative
/// path (forward slashes). A BTreeMap keeps serialization deterministic.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Archive {
    pub metadata: ArchiveMetadata,
    pub files: BTreeMap<String, FileRecord>,
}

impl Archive {
    /// Serialize and gzip the envelope at the given level. Per-file payloads
    /// are already compressed, so the outer pass mostly squeezes metadata.
    pub fn to_bytes(&self, level: u32) -> Result<Vec<u8>, AmberError> {
        let plain = bincode::serialize(self)
            .map_err(|e| AmberError::ArchiveWrite(format!("serialization failed: {e}")))?;
        codec::compress_bytes(&plain, level)
            .map_err(|e| AmberError::ArchiveWrite(format!("envelope compression failed: {e}")))
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, AmberError> {
        let plain = codec::decompress_bytes(data)
            .map_err(|e| AmberError::Format(format!("envelope decompression failed: {e}")))?;
        let archive: Archive = bincode::deserialize(&plain)
            .map_err(|e| AmberError::Format(format!("envelope deserialization failed: {e}")))?;
        if archive.metadata.format_version != FORMAT_VERSION {
            return Err(AmberError::Format(format!(
                "unsupported format version {} (expected {})",
                archive.metadata.format_version, FORMAT_VERSION
            )));
        }
        Ok(archive)
    }

    /// Write the envelope through a staging file in the target directory so
    /// a failed build never leaves a half-written archive behind.
    pub fn write_to(&self, path: &Path, level: u32) -> Result<(), AmberError> {
        let bytes = self.to_bytes(level)?;
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let staged = match dir {
            Some(d) => NamedTempFile::new_in(d),
            None => NamedTempFile::new(),
        }
        .map_err(|e| AmberError::ArchiveWrite(format!("staging file creation failed: {e}")))?;
        fs::write(staged.path(), &bytes)
            .map_err(|e| AmberError::ArchiveWrite(format!("staging write failed: {e}")))?;
        staged
            .persist(path)
            .map_err(|e| AmberError::ArchiveWrite(format!("could not persist archive: {e}")))?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, AmberError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }
}

/// ISO-8601 UTC timestamp with `:` and `.` replaced so the result is a
/// filesystem-safe file name component, e.g. `2024-01-15T10-30-45-123Z`.
pub fn timestamp_slug(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-")
}

/// `<base>_<timestamp>.ambr`
pub fn archive_file_name(base: &str, at: DateTime<Utc>) -> String {
    format!("{base}_{}.{ARCHIVE_EXT}", timestamp_slug(at))
}
