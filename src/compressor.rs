use std::collections::HashMap;
use std::fs::{self, File};
use std::path::Path;

use crate::codec;
use crate::config::ArchiveOptions;
use crate::dictionary::{self, ExtensionGroups};
use crate::error::AmberError;
use crate::hashing::{self, ContentHash};
use crate::normalize;
use crate::record::FileRecord;

/// Build-scoped dedup index: content hash to the first relative path that
/// produced it. The build loop registers a hash only once its record is in
/// the archive, and never for duplicates, so references always resolve and
/// never chain.
#[derive(Default)]
pub struct DedupIndex {
    by_hash: HashMap<ContentHash, String>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, hash: &ContentHash) -> Option<&str> {
        self.by_hash.get(hash).map(String::as_str)
    }

    pub fn register(&mut self, hash: ContentHash, rel_path: &str) {
        self.by_hash
            .entry(hash)
            .or_insert_with(|| rel_path.to_string());
    }

    pub fn len(&self) -> usize {
        self.by_hash.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_hash.is_empty()
    }
}

/// Shared mutable state threaded through one build: the dedup index and the
/// per-extension dictionary groups. Dropped when the build ends.
#[derive(Default)]
pub struct CompressContext {
    pub dedup: DedupIndex,
    pub groups: ExtensionGroups,
}

impl CompressContext {
    pub fn new() -> Self {
        Self::default()
    }
}

/// One compressed file plus what the report wants to know about how it
/// was handled.
#[derive(Debug)]
pub struct FileOutcome {
    pub record: FileRecord,
    pub streamed: bool,
}

fn fail(path: &Path, reason: String) -> AmberError {
    AmberError::Compression {
        path: path.to_path_buf(),
        reason,
    }
}

/// Compress one file into a record. Failures come back as
/// [`AmberError::Compression`]; the builder decides skip versus abort.
/// Consults the dedup index but never writes it, so a failed call leaves
/// nothing behind for later duplicates to reference.
pub fn compress_file(
    abs_path: &Path,
    ctx: &mut CompressContext,
    opts: &ArchiveOptions,
) -> Result<FileOutcome, AmberError> {
    let meta =
        fs::metadata(abs_path).map_err(|e| fail(abs_path, format!("stat failed: {e}")))?;
    if meta.len() > opts.streaming_threshold {
        return compress_streaming(abs_path, ctx, opts);
    }

    let raw = fs::read(abs_path).map_err(|e| fail(abs_path, format!("read failed: {e}")))?;

    let ext = normalize::file_extension(abs_path);
    let is_text = ext.as_deref().is_some_and(normalize::is_text_extension);

    // Lossy mode rewrites text before hashing, so the stored hash is the
    // hash of what extraction reproduces. Non-UTF-8 content under a text
    // extension falls back to the binary path.
    let (content, normalized) = if is_text && opts.normalize_text {
        match String::from_utf8(raw) {
            Ok(text) => (normalize::normalize_text(&text).into_bytes(), true),
            Err(e) => (e.into_bytes(), false),
        }
    } else {
        (raw, false)
    };

    let original_size = content.len() as u64;
    let original_hash = ContentHash::of(&content);

    if opts.dedup {
        if let Some(reference) = ctx.dedup.find(&original_hash) {
            return Ok(FileOutcome {
                record: FileRecord::Duplicate {
                    reference: reference.to_string(),
                    original_hash,
                    original_size,
                    normalized,
                },
                streamed: false,
            });
        }
    }

    let payload = codec::compress_bytes(&content, opts.level)
        .map_err(|e| fail(abs_path, format!("compression failed: {e}")))?;
    let compressed_size = payload.len() as u64;
    let mut record = FileRecord::Standard {
        payload,
        original_hash,
        original_size,
        compressed_size,
        normalized,
    };

    // Dictionary attempt, kept only when strictly smaller than the plain
    // result. Any failure in here means no benefit, never a lost file.
    if is_text && opts.delta {
        if let (Some(ext), Ok(text)) = (ext.as_deref(), std::str::from_utf8(&content)) {
            ctx.groups.push(ext, text);
            if let Some(dict) = ctx.groups.dictionary_for(ext) {
                if let Some(dict_payload) = dictionary::try_dictionary(&dict, &content, opts.level)
                {
                    if (dict_payload.len() as u64) < record.compressed_size() {
                        let compressed_size = dict_payload.len() as u64;
                        record = FileRecord::Dictionary {
                            payload: dict_payload,
                            dictionary: dict,
                            original_hash,
                            original_size,
                            compressed_size,
                            normalized,
                        };
                    }
                }
            }
        }
    }

    self_validate(&record, abs_path)?;
    Ok(FileOutcome {
        record,
        streamed: false,
    })
}

/// Large-file path: two bounded passes (hash for dedup, then compress) and
/// a streaming self-validation. Never holds the file in memory.
fn compress_streaming(
    abs_path: &Path,
    ctx: &mut CompressContext,
    opts: &ArchiveOptions,
) -> Result<FileOutcome, AmberError> {
    let (original_hash, original_size) =
        hashing::hash_file(abs_path).map_err(|e| fail(abs_path, format!("read failed: {e}")))?;

    if opts.dedup {
        if let Some(reference) = ctx.dedup.find(&original_hash) {
            return Ok(FileOutcome {
                record: FileRecord::Duplicate {
                    reference: reference.to_string(),
                    original_hash,
                    original_size,
                    normalized: false,
                },
                streamed: true,
            });
        }
    }

    let file = File::open(abs_path).map_err(|e| fail(abs_path, format!("open failed: {e}")))?;
    let (payload, rehash, resize) = codec::compress_reader(file, opts.level)
        .map_err(|e| fail(abs_path, format!("compression failed: {e}")))?;
    // The second pass re-hashes what it reads; disagreement means the file
    // changed under us.
    if rehash != original_hash || resize != original_size {
        return Err(fail(
            abs_path,
            "file changed during compression".to_string(),
        ));
    }

    let compressed_size = payload.len() as u64;
    let record = FileRecord::Standard {
        payload,
        original_hash,
        original_size,
        compressed_size,
        normalized: false,
    };

    self_validate(&record, abs_path)?;
    Ok(FileOutcome {
        record,
        streamed: true,
    })
}

/// Round-trip check before a record is accepted: decompress the payload,
/// strip the dictionary prefix if present, compare the digest against the
/// stored hash. Standard payloads are verified through a hashing sink so
/// streamed files are never materialized.
pub fn self_validate(record: &FileRecord, abs_path: &Path) -> Result<(), AmberError> {
    match record {
        FileRecord::Standard {
            payload,
            original_hash,
            original_size,
            ..
        } => {
            let (hash, size) = codec::decompress_to_hash(payload)
                .map_err(|e| fail(abs_path, format!("round-trip decompression failed: {e}")))?;
            if hash != *original_hash || size != *original_size {
                return Err(fail(
                    abs_path,
                    "round-trip hash mismatch".to_string(),
                ));
            }
        }
        FileRecord::Dictionary {
            payload,
            dictionary,
            original_hash,
            ..
        } => {
            let plain = codec::decompress_bytes(payload)
                .map_err(|e| fail(abs_path, format!("round-trip decompression failed: {e}")))?;
            let content = strip_dictionary(&plain, dictionary)
                .ok_or_else(|| fail(abs_path, "dictionary prefix missing".to_string()))?;
            if ContentHash::of(content) != *original_hash {
                return Err(fail(
                    abs_path,
                    "round-trip hash mismatch".to_string(),
                ));
            }
        }
        FileRecord::Duplicate { .. } => {}
    }
    Ok(())
}

/// The bytes after `dictionary + "\n"`, or None if the prefix is absent.
pub fn strip_dictionary<'a>(plain: &'a [u8], dictionary: &[u8]) -> Option<&'a [u8]> {
    if plain.len() <= dictionary.len() || !plain.starts_with(dictionary) {
        return None;
    }
    if plain[dictionary.len()] != b'\n' {
        return None;
    }
    Some(&plain[dictionary.len() + 1..])
}
