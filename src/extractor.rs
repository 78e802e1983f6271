use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};

use crate::archive::Archive;
use crate::codec;
use crate::compressor::strip_dictionary;
use crate::error::AmberError;
use crate::hashing::{ContentHash, HashingWriter};
use crate::record::FileRecord;

fn fail(path: &str, reason: String) -> AmberError {
    AmberError::Extraction {
        path: path.to_string(),
        reason,
    }
}

/// Join an archive label onto the output directory, rejecting absolute
/// paths and non-normal components so a corrupt or hostile archive cannot
/// write outside it.
fn safe_join(output_dir: &Path, label: &str) -> Result<PathBuf, AmberError> {
    let rel = Path::new(label);
    if rel.is_absolute() {
        return Err(fail(label, "absolute path in archive".to_string()));
    }
    for comp in rel.components() {
        match comp {
            Component::Normal(_) => {}
            _ => {
                return Err(fail(
                    label,
                    "unsafe path component in archive".to_string(),
                ))
            }
        }
    }
    Ok(output_dir.join(rel))
}

fn prepare_target(output_dir: &Path, label: &str) -> Result<PathBuf, AmberError> {
    let target = safe_join(output_dir, label)?;
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| fail(label, format!("could not create parent directory: {e}")))?;
    }
    Ok(target)
}

/// Reconstruct the original tree under `output_dir`. Records owning a
/// payload are materialized first, then duplicates are copied from their
/// already-extracted references, so a reference is always satisfiable by
/// the time it is needed. Every written file is verified against the
/// record's stored hash.
pub fn decompress_archive(archive_path: &Path, output_dir: &Path) -> Result<PathBuf, AmberError> {
    let archive = Archive::read_from(archive_path)?;
    fs::create_dir_all(output_dir)?;

    for (label, record) in &archive.files {
        match record {
            FileRecord::Standard {
                payload,
                original_hash,
                ..
            } => {
                let target = prepare_target(output_dir, label)?;
                let file = File::create(&target)
                    .map_err(|e| fail(label, format!("could not create file: {e}")))?;
                let mut sink = HashingWriter::new(file);
                codec::decompress_to_writer(payload, &mut sink)
                    .map_err(|e| fail(label, format!("payload decompression failed: {e}")))?;
                sink.flush()
                    .map_err(|e| fail(label, format!("write failed: {e}")))?;
                let (_, hash, _) = sink.finish();
                if hash != *original_hash {
                    return Err(fail(label, "hash mismatch after extraction".to_string()));
                }
            }
            FileRecord::Dictionary {
                payload,
                dictionary,
                original_hash,
                ..
            } => {
                let plain = codec::decompress_bytes(payload)
                    .map_err(|e| fail(label, format!("payload decompression failed: {e}")))?;
                let content = strip_dictionary(&plain, dictionary)
                    .ok_or_else(|| fail(label, "dictionary prefix missing".to_string()))?;
                if ContentHash::of(content) != *original_hash {
                    return Err(fail(label, "hash mismatch after extraction".to_string()));
                }
                let target = prepare_target(output_dir, label)?;
                fs::write(&target, content)
                    .map_err(|e| fail(label, format!("write failed: {e}")))?;
            }
            FileRecord::Duplicate { .. } => {}
        }
    }

    for (label, record) in &archive.files {
        if let FileRecord::Duplicate {
            reference,
            original_hash,
            ..
        } = record
        {
            let referenced = archive.files.get(reference).ok_or_else(|| {
                fail(
                    label,
                    format!("duplicate reference {reference} is not in the archive"),
                )
            })?;
            if matches!(referenced, FileRecord::Duplicate { .. }) {
                return Err(fail(
                    label,
                    format!("duplicate reference {reference} is itself a duplicate"),
                ));
            }

            let source = safe_join(output_dir, reference)?;
            let target = prepare_target(output_dir, label)?;
            let mut reader = File::open(&source)
                .map_err(|e| fail(label, format!("referenced file was not extracted: {e}")))?;
            let file = File::create(&target)
                .map_err(|e| fail(label, format!("could not create file: {e}")))?;
            let mut sink = HashingWriter::new(file);
            io::copy(&mut reader, &mut sink)
                .map_err(|e| fail(label, format!("copy from {reference} failed: {e}")))?;
            sink.flush()
                .map_err(|e| fail(label, format!("write failed: {e}")))?;
            let (_, hash, _) = sink.finish();
            if hash != *original_hash {
                return Err(fail(label, "hash mismatch after extraction".to_string()));
            }
        }
    }

    Ok(output_dir.to_path_buf())
}
