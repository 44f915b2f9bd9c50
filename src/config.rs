//! Instance-level defaults and pack-time knobs, threaded explicitly
//! rather than kept as mutable process globals. Passing a `Config`
//! explicitly to `Multiset::empty`/`Multiset::pack` keeps construction
//! and serialization re-entrant and testable without shared state.

/// Schema version this crate reads and writes.
pub const OUTPUT_VERSION: u8 = 1;

/// Upper bound, in bytes, on the payload of any live multiset: the
/// explicit list or the compressed register array.
pub const MS_MAXDATA: usize = 128 * 1024;

/// Construction and serialization defaults for a single multiset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Schema version written into the header on `pack`. `pack` rejects
    /// any value other than [`OUTPUT_VERSION`] with `HllError::BadParameter`,
    /// since `unpack` only understands schema version 1.
    pub output_version: u8,
    pub default_log2m: u32,
    pub default_regwidth: u32,
    pub default_expthresh: i64,
    pub default_sparseon: bool,
    /// Overrides the SPARSE-vs-COMPRESSED choice at pack time: `-1` means
    /// "auto" (pick whichever encoding is smaller); otherwise SPARSE is
    /// chosen whenever the number of filled registers is at or below this
    /// value.
    pub max_sparse: i64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            output_version: OUTPUT_VERSION,
            default_log2m: 11,
            default_regwidth: 5,
            default_expthresh: -1,
            default_sparseon: true,
            max_sparse: -1,
        }
    }
}
