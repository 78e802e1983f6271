/// Files above this size take the bounded streaming path.
pub const DEFAULT_STREAMING_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Build configuration. Every knob has an explicit default; callers
/// construct with struct-update syntax over `Default`.
#[derive(Clone, Debug)]
pub struct ArchiveOptions {
    /// Gzip level, clamped to 1..=9.
    pub level: u32,
    /// Content-hash deduplication of identical files.
    pub dedup: bool,
    /// Dictionary compression attempts for grouped text files.
    pub delta: bool,
    /// Lossy text normalization. Off by default: extraction reproduces the
    /// exact original bytes. When on, text files are normalized before
    /// hashing and compression, and extraction reproduces the normalized
    /// form instead.
    pub normalize_text: bool,
    /// Re-validate the archive against the source tree after writing.
    pub validate: bool,
    /// Abort the build on the first per-file failure instead of skipping.
    pub strict: bool,
    pub streaming_threshold: u64,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        ArchiveOptions {
            level: 6,
            dedup: true,
            delta: true,
            normalize_text: false,
            validate: true,
            strict: false,
            streaming_threshold: DEFAULT_STREAMING_THRESHOLD,
        }
    }
}
