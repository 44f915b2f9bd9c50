//! The EXPLICIT representation: a small, exact set of distinct hashed
//! 64-bit elements, kept sorted in ascending **signed** int64 order on
//! the wire. A `BTreeSet<i64>` gives us that ordering for free —
//! comparing the raw bit patterns as `i64` rather than `u64` matters
//! whenever the high bit is set, where unsigned comparison would order
//! elements differently.

use std::collections::BTreeSet;

use crate::HllError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExplicitStorage {
    elems: BTreeSet<i64>,
}

impl ExplicitStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value`. Returns `true` if the set grew (the value was
    /// not already present).
    pub fn insert(&mut self, value: u64) -> bool {
        self.elems.insert(value as i64)
    }

    pub fn contains(&self, value: u64) -> bool {
        self.elems.contains(&(value as i64))
    }

    pub fn len(&self) -> usize {
        self.elems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.elems.iter().map(|v| *v as u64)
    }

    /// Merges `other` into `self` when the result is to stay EXPLICIT.
    pub fn union_explicit(&mut self, other: &Self) {
        self.elems.extend(other.elems.iter());
    }

    pub fn bytes_size(&self) -> usize {
        self.elems.len() * 8
    }

    pub fn to_bytes(&self, buf: &mut [u8]) {
        for (i, value) in self.elems.iter().enumerate() {
            let idx = i * 8;
            buf[idx..idx + 8].copy_from_slice(&value.to_be_bytes());
        }
    }

    /// Decodes a run of big-endian i64 elements, validating strict
    /// ascending order (no duplicates, no descending pairs) as required
    /// by the wire format.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, HllError> {
        if buf.len() % 8 != 0 {
            return Err(HllError::BadEncoding(
                "explicit payload length is not a multiple of 8".into(),
            ));
        }

        let mut elems = Vec::with_capacity(buf.len() / 8);
        for chunk in buf.chunks_exact(8) {
            elems.push(i64::from_be_bytes(chunk.try_into().unwrap()));
        }

        for pair in elems.windows(2) {
            if pair[0] >= pair[1] {
                return Err(HllError::BadEncoding(
                    "explicit elements must be strictly ascending with no duplicates".into(),
                ));
            }
        }

        Ok(Self {
            elems: elems.into_iter().collect(),
        })
    }
}
