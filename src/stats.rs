//! `BuildReport` tracks what one build did without any logging of its own.
//! Binaries decide whether and how to print it.

use std::path::PathBuf;

use serde::Serialize;

use crate::record::FileRecord;

#[derive(Debug, Default, Serialize)]
pub struct BuildReport {
    pub files_archived: u64,
    pub duplicates: u64,
    pub dictionary_hits: u64,
    pub streamed_files: u64,
    pub total_original_bytes: u64,
    pub total_compressed_bytes: u64,
    /// Per-file failures that were skipped: (relative path, reason).
    pub skipped: Vec<(String, String)>,
    pub warnings: Vec<String>,
    pub elapsed_ms: u64,
}

impl BuildReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick_record(&mut self, record: &FileRecord, streamed: bool) {
        self.files_archived += 1;
        self.total_original_bytes += record.original_size();
        self.total_compressed_bytes += record.compressed_size();
        match record {
            FileRecord::Duplicate { .. } => self.duplicates += 1,
            FileRecord::Dictionary { .. } => self.dictionary_hits += 1,
            FileRecord::Standard { .. } => {}
        }
        if streamed {
            self.streamed_files += 1;
        }
    }

    pub fn skip(&mut self, rel_path: &str, reason: String) {
        self.skipped.push((rel_path.to_string(), reason));
    }

    pub fn warn(&mut self, message: String) {
        self.warnings.push(message);
    }

    /// Compressed size as a fraction of original size. 1.0 for an empty build.
    pub fn ratio(&self) -> f64 {
        if self.total_original_bytes == 0 {
            1.0
        } else {
            self.total_compressed_bytes as f64 / self.total_original_bytes as f64
        }
    }

    pub fn report(&self) {
        eprintln!(
            "Archived {} files ({} duplicates, {} dictionary, {} streamed): {} -> {} bytes ({:.1}%) in {} ms",
            self.files_archived,
            self.duplicates,
            self.dictionary_hits,
            self.streamed_files,
            self.total_original_bytes,
            self.total_compressed_bytes,
            self.ratio() * 100.0,
            self.elapsed_ms
        );
        for (path, reason) in &self.skipped {
            eprintln!("skipped {path}: {reason}");
        }
        for warning in &self.warnings {
            eprintln!("warning: {warning}");
        }
    }
}

/// What a build hands back: where the archive landed plus the report.
#[derive(Debug, Serialize)]
pub struct BuildOutcome {
    pub archive_path: PathBuf,
    pub report: BuildReport,
}
