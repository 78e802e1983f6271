use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Utc;
use walkdir::WalkDir;

use crate::archive::{self, Archive, ArchiveMetadata};
use crate::compressor::{compress_file, CompressContext};
use crate::config::ArchiveOptions;
use crate::error::AmberError;
use crate::record::FileRecord;
use crate::stats::{BuildOutcome, BuildReport};
use crate::validator;

/// Stable enumeration of every file under a root: absolute path plus its
/// forward-slash relative label, sorted by label. The sort is what makes
/// duplicate references always point at an already-processed entry.
pub fn collect_files(source_root: &Path) -> Result<Vec<(PathBuf, String)>, AmberError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(source_root).follow_links(false) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(source_root)
            .map_err(|e| AmberError::ArchiveWrite(format!("path outside source root: {e}")))?;
        let label = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        files.push((entry.into_path(), label));
    }
    files.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(files)
}

fn source_label(source_root: &Path) -> String {
    let canonical = source_root
        .canonicalize()
        .unwrap_or_else(|_| source_root.to_path_buf());
    canonical
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| "archive".to_string())
}

/// Build an archive from a directory tree. Returns the archive path plus a
/// report of what happened; `on_file` is called with each relative path
/// before it is compressed (progress hook, no-op for library callers).
pub fn compress_directory_with_report<F>(
    source_root: &Path,
    output_dir: &Path,
    opts: &ArchiveOptions,
    mut on_file: F,
) -> Result<BuildOutcome, AmberError>
where
    F: FnMut(&str),
{
    let start = Instant::now();
    if !source_root.is_dir() {
        return Err(AmberError::SourceNotFound {
            path: source_root.to_path_buf(),
        });
    }
    fs::create_dir_all(output_dir).map_err(|e| {
        AmberError::ArchiveWrite(format!(
            "could not create output directory {}: {e}",
            output_dir.display()
        ))
    })?;

    let files = collect_files(source_root)?;
    let mut report = BuildReport::new();
    if files.is_empty() {
        report.warn(format!(
            "source directory {} contains no files",
            source_root.display()
        ));
    }

    let mut ctx = CompressContext::new();
    let mut records = BTreeMap::new();
    for (abs, rel) in &files {
        on_file(rel);
        match compress_file(abs, &mut ctx, opts) {
            Ok(outcome) => {
                // Only records the archive keeps may be referenced by
                // later duplicates.
                if opts.dedup && !matches!(outcome.record, FileRecord::Duplicate { .. }) {
                    ctx.dedup.register(outcome.record.original_hash(), rel);
                }
                report.tick_record(&outcome.record, outcome.streamed);
                records.insert(rel.clone(), outcome.record);
            }
            Err(e) if opts.strict => return Err(e),
            Err(e) => report.skip(rel, e.to_string()),
        }
    }

    let created_at = Utc::now();
    let label = source_label(source_root);
    let metadata = ArchiveMetadata::compute(label.clone(), created_at, &records);
    let archive = Archive {
        metadata,
        files: records,
    };

    let archive_path = output_dir.join(archive::archive_file_name(&label, created_at));
    archive.write_to(&archive_path, opts.level)?;

    if opts.validate {
        // Skipped files are not in the archive; validate what was archived.
        let archived: Vec<PathBuf> = files
            .iter()
            .filter(|(_, rel)| archive.files.contains_key(rel))
            .map(|(abs, _)| abs.clone())
            .collect();
        validator::validate_archive(&archive_path, &archived, source_root)?;
    }

    report.elapsed_ms = start.elapsed().as_millis() as u64;
    Ok(BuildOutcome {
        archive_path,
        report,
    })
}

/// Build an archive with default progress handling, returning its path.
pub fn compress_directory(
    source_root: &Path,
    output_dir: &Path,
    opts: &ArchiveOptions,
) -> Result<PathBuf, AmberError> {
    compress_directory_with_report(source_root, output_dir, opts, |_| {})
        .map(|outcome| outcome.archive_path)
}
