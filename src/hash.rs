//! Convenience wrapper around MurmurHash3-x64-128, used to turn
//! arbitrary byte strings into the 64-bit hashed elements that `add`
//! expects. The hash itself is an external collaborator; this module
//! only adapts its output to the low 64 bits callers need and
//! validates the seed.

use std::io::Cursor;

use crate::HllError;

/// Hashes `bytes` with MurmurHash3-x64-128 and returns the low 64 bits
/// of the digest. `seed` must be non-negative.
pub fn hash_bytes(bytes: &[u8], seed: i64) -> Result<u64, HllError> {
    if seed < 0 {
        return Err(HllError::BadHashSeed(format!(
            "hash seed must be non-negative, got {seed}"
        )));
    }

    let digest = murmur3::murmur3_x64_128(&mut Cursor::new(bytes), seed as u32)
        .map_err(|e| HllError::Internal(e.to_string()))?;

    Ok(digest as u64)
}

pub fn hash_u32(value: u32, seed: i64) -> Result<u64, HllError> {
    hash_bytes(&value.to_le_bytes(), seed)
}

pub fn hash_u64(value: u64, seed: i64) -> Result<u64, HllError> {
    hash_bytes(&value.to_le_bytes(), seed)
}

pub fn hash_str(value: &str, seed: i64) -> Result<u64, HllError> {
    hash_bytes(value.as_bytes(), seed)
}
