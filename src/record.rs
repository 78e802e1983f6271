use serde::{Deserialize, Serialize};

use crate::hashing::ContentHash;

/// One archived file. The variant is the record kind: a `Standard` record
/// owns a compressed payload, a `Duplicate` points at the first path seen
/// with the same content hash, a `Dictionary` record's payload decompresses
/// to `dictionary + "\n" + content`.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub enum FileRecord {
    Standard {
        payload: Vec<u8>,
        original_hash: ContentHash,
        original_size: u64,
        compressed_size: u64,
        normalized: bool,
    },
    Duplicate {
        /// Relative path of the referenced record. Never another Duplicate.
        reference: String,
        original_hash: ContentHash,
        original_size: u64,
        normalized: bool,
    },
    Dictionary {
        payload: Vec<u8>,
        /// Dictionary bytes baked into the record; also prepended (with a
        /// separating newline) to the content before compression.
        dictionary: Vec<u8>,
        original_hash: ContentHash,
        original_size: u64,
        compressed_size: u64,
        normalized: bool,
    },
}

impl FileRecord {
    pub fn original_hash(&self) -> ContentHash {
        match self {
            FileRecord::Standard { original_hash, .. }
            | FileRecord::Duplicate { original_hash, .. }
            | FileRecord::Dictionary { original_hash, .. } => *original_hash,
        }
    }

    pub fn original_size(&self) -> u64 {
        match self {
            FileRecord::Standard { original_size, .. }
            | FileRecord::Duplicate { original_size, .. }
            | FileRecord::Dictionary { original_size, .. } => *original_size,
        }
    }

    /// Bytes this record contributes to the archive body. Duplicates store
    /// no payload and contribute 0.
    pub fn compressed_size(&self) -> u64 {
        match self {
            FileRecord::Standard {
                compressed_size, ..
            }
            | FileRecord::Dictionary {
                compressed_size, ..
            } => *compressed_size,
            FileRecord::Duplicate { .. } => 0,
        }
    }

    pub fn normalized(&self) -> bool {
        match self {
            FileRecord::Standard { normalized, .. }
            | FileRecord::Duplicate { normalized, .. }
            | FileRecord::Dictionary { normalized, .. } => *normalized,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            FileRecord::Standard { .. } => "standard",
            FileRecord::Duplicate { .. } => "duplicate",
            FileRecord::Dictionary { .. } => "dictionary",
        }
    }
}
