//! Core logic for the amber artifact archiving system.
//!
//! A build walks a directory tree, deduplicates identical file content by
//! hash, compresses each file independently (streaming for large files),
//! self-validates every record by round-trip, and writes one compressed
//! `.ambr` envelope. [`decompress_archive`] reconstructs the exact tree.

pub mod archive;
pub mod builder;
pub mod codec;
pub mod compressor;
pub mod config;
pub mod dictionary;
pub mod error;
pub mod extractor;
pub mod hashing;
pub mod io_utils;
pub mod normalize;
pub mod record;
pub mod stats;
pub mod validator;

pub use archive::{Archive, ArchiveMetadata, ARCHIVE_EXT, FORMAT_VERSION};
pub use builder::{collect_files, compress_directory, compress_directory_with_report};
pub use config::ArchiveOptions;
pub use error::AmberError;
pub use extractor::decompress_archive;
pub use hashing::ContentHash;
pub use record::FileRecord;
pub use stats::{BuildOutcome, BuildReport};
pub use validator::validate_archive;
