//! A HyperLogLog multiset sketch compatible, bit-for-bit, with the
//! `postgresql-hll` storage format (schema version 1).
//!
//! A [`Multiset`] starts out EMPTY, promotes to EXPLICIT (an exact list
//! of hashed elements) as elements are added, and promotes again to
//! COMPRESSED (a dense HyperLogLog register array) once the explicit
//! list would no longer be cheaper to store. SPARSE is a wire-only
//! encoding of COMPRESSED chosen automatically at [`Multiset::pack`]
//! time; it never exists as a live variant.

use thiserror::Error;

use compressed::CompressedRegisters;
use config::Config;
use explicit::ExplicitStorage;
use settings::Params;

pub mod bitstream;
pub mod cardinality;
pub mod compressed;
pub mod config;
mod debug;
pub mod explicit;
pub mod hash;
pub mod serialize;
pub mod settings;
pub mod sparse;
#[cfg(test)]
mod scenarios_test;

pub(crate) const TYPE_UNDEFINED: u8 = 0;
pub(crate) const TYPE_EMPTY: u8 = 1;
pub(crate) const TYPE_EXPLICIT: u8 = 2;
pub(crate) const TYPE_SPARSE: u8 = 3;
pub(crate) const TYPE_COMPRESSED: u8 = 4;

#[derive(Debug, Clone, Error)]
pub enum HllError {
    #[error("bad parameter: {0}")]
    BadParameter(String),
    #[error("bad encoding: {0}")]
    BadEncoding(String),
    #[error("incompatible multisets: {0}")]
    Incompatible(String),
    #[error("bad size: {0}")]
    BadSize(String),
    #[error("bad hash seed: {0}")]
    BadHashSeed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// A multiset sketch in one of four states: EMPTY, EXPLICIT,
/// COMPRESSED, or the poisoned UNDEFINED state.
#[derive(Debug, Clone, PartialEq)]
pub enum Multiset {
    Undefined(Params),
    Empty(Params),
    Explicit(Params, ExplicitStorage),
    Compressed(Params, CompressedRegisters),
}

impl Multiset {
    /// Constructs a new EMPTY multiset with explicit parameters.
    ///
    /// `regwidth` is the number of bits per compressed register
    /// (`[1,8]`); `expthresh` is the raw explicit-list threshold
    /// (`-1` = auto, `0` = never explicit, otherwise a power of two);
    /// `sparseon` enables SPARSE consideration at pack time.
    pub fn empty4(log2m: u32, regwidth: u32, expthresh: i64, sparseon: bool) -> Result<Self, HllError> {
        let params = Params::new(log2m, regwidth, expthresh, sparseon)?;
        Ok(Multiset::Empty(params))
    }

    /// Constructs a new EMPTY multiset using `config`'s defaults.
    pub fn empty(config: &Config) -> Result<Self, HllError> {
        Multiset::empty4(
            config.default_log2m,
            config.default_regwidth,
            config.default_expthresh,
            config.default_sparseon,
        )
    }

    pub fn params(&self) -> Params {
        match self {
            Multiset::Undefined(params)
            | Multiset::Empty(params)
            | Multiset::Explicit(params, _)
            | Multiset::Compressed(params, _) => *params,
        }
    }

    pub fn type_code(&self) -> u8 {
        match self {
            Multiset::Undefined(_) => TYPE_UNDEFINED,
            Multiset::Empty(_) => TYPE_EMPTY,
            Multiset::Explicit(_, _) => TYPE_EXPLICIT,
            Multiset::Compressed(_, _) => TYPE_COMPRESSED,
        }
    }

    /// Adds one already-hashed element. A no-op on UNDEFINED.
    pub fn add(&mut self, element: u64) {
        match self {
            Multiset::Undefined(_) => {}

            Multiset::Empty(params) => {
                let params = *params;
                if params.effective_expthresh() == 0 {
                    let mut regs = CompressedRegisters::zeroed(params.nregs);
                    regs.add(element, &params);
                    log::debug!("promoting empty multiset directly to compressed (expthresh=0)");
                    *self = Multiset::Compressed(params, regs);
                } else {
                    let mut storage = ExplicitStorage::new();
                    storage.insert(element);
                    *self = Multiset::Explicit(params, storage);
                }
            }

            Multiset::Explicit(params, storage) => {
                if storage.contains(element) {
                    return;
                }

                let expval = params.effective_expthresh();
                if storage.len() as u32 == expval {
                    let mut regs = CompressedRegisters::zeroed(params.nregs);
                    for e in storage.iter() {
                        regs.add(e, params);
                    }
                    regs.add(element, params);
                    log::debug!("promoting explicit multiset to compressed at {expval} elements");
                    *self = Multiset::Compressed(*params, regs);
                } else {
                    storage.insert(element);
                }
            }

            Multiset::Compressed(params, regs) => {
                regs.add(element, params);
            }
        }
    }

    /// Merges `src` into `self` in place. `src` is never mutated.
    pub fn union(&mut self, src: &Self) -> Result<(), HllError> {
        if matches!(self, Multiset::Undefined(_)) || matches!(src, Multiset::Undefined(_)) {
            let params = self.params();
            *self = Multiset::Undefined(params);
            return Ok(());
        }

        if matches!(src, Multiset::Empty(_)) {
            return Ok(());
        }

        if matches!(self, Multiset::Empty(_)) {
            *self = src.clone();
            return Ok(());
        }

        self.params().compatible(&src.params())?;

        match self {
            Multiset::Explicit(params, dst) => match src {
                Multiset::Explicit(_, src_storage) => {
                    let params = *params;
                    let expval = params.effective_expthresh();
                    let mut promoted: Option<CompressedRegisters> = None;

                    for elem in src_storage.iter() {
                        if let Some(regs) = promoted.as_mut() {
                            regs.add(elem, &params);
                            continue;
                        }
                        if dst.contains(elem) {
                            continue;
                        }
                        if dst.len() as u32 == expval {
                            let mut regs = CompressedRegisters::zeroed(params.nregs);
                            for e in dst.iter() {
                                regs.add(e, &params);
                            }
                            regs.add(elem, &params);
                            log::debug!("promoting explicit multiset to compressed during union");
                            promoted = Some(regs);
                        } else {
                            dst.insert(elem);
                        }
                    }

                    if let Some(regs) = promoted {
                        *self = Multiset::Compressed(params, regs);
                    }
                }

                Multiset::Compressed(_, src_regs) => {
                    let params = *params;
                    let mut regs = src_regs.clone();
                    for e in dst.iter() {
                        regs.add(e, &params);
                    }
                    log::debug!("folding explicit multiset into compressed during union");
                    *self = Multiset::Compressed(params, regs);
                }

                _ => unreachable!("Empty/Undefined already handled above"),
            },

            Multiset::Compressed(params, dst_regs) => match src {
                Multiset::Explicit(_, src_storage) => {
                    for e in src_storage.iter() {
                        dst_regs.add(e, params);
                    }
                }

                Multiset::Compressed(_, src_regs) => {
                    dst_regs.union_dense(src_regs)?;
                }

                _ => unreachable!("Empty/Undefined already handled above"),
            },

            _ => unreachable!("Empty/Undefined already handled above"),
        }

        Ok(())
    }

    /// Estimated distinct-element count. `-1.0` means UNDEFINED.
    pub fn cardinality(&self) -> Result<f64, HllError> {
        match self {
            Multiset::Undefined(_) => Ok(-1.0),
            Multiset::Empty(_) => Ok(0.0),
            Multiset::Explicit(_, storage) => Ok(storage.len() as f64),
            Multiset::Compressed(params, regs) => cardinality::estimate(regs, params),
        }
    }

    pub fn pack(&self, config: &Config) -> Result<Vec<u8>, HllError> {
        serialize::pack(self, config)
    }

    pub fn packed_size(&self, config: &Config) -> usize {
        serialize::packed_size(self, config)
    }

    pub fn unpack(bytes: &[u8]) -> Result<Self, HllError> {
        serialize::unpack(bytes)
    }
}
