//! Per-instance metadata (`Params`) and the header fields that are
//! derived from it. SPARSE is wire-only in this design and has no
//! threshold of its own — the SPARSE-vs-COMPRESSED choice is made at
//! pack time via [`crate::config::Config`].

use crate::HllError;
use crate::config::MS_MAXDATA;

const MINIMUM_LOG2M: u32 = 0;
const MAXIMUM_LOG2M: u32 = 31;

const MINIMUM_NBITS: u32 = 1;
const MAXIMUM_NBITS: u32 = 8;

const MINIMUM_EXPTHRESH: i64 = -1;
const MAXIMUM_EXPTHRESH: i64 = 1 << 32;

/// -1 signals "auto select the explicit threshold from nbits/nregs".
pub(crate) const AUTO_EXPTHRESH: i64 = -1;

/// Per-instance parameters. Immutable after construction and carried
/// unchanged across EMPTY -> EXPLICIT -> COMPRESSED promotions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Params {
    /// Width, in bits, of a single compressed register. In `[1, 8]`.
    pub nbits: u32,
    /// log2 of the register count. In `[0, 31]`.
    pub log2nregs: u32,
    /// `1 << log2nregs`.
    pub nregs: u32,
    /// Maximum EXPLICIT list length before promotion to COMPRESSED.
    /// `-1` means "auto", `0` means "never use explicit".
    pub expthresh_raw: i64,
    /// Whether SPARSE may be considered at pack time.
    pub sparseon: bool,

    pub(crate) pw_max_mask: u64,
    pub(crate) m_bits_mask: u64,
    pub(crate) alpha_msquared: f64,
    pub(crate) small_estimator_cutoff: f64,
    pub(crate) large_estimator_cutoff: f64,
    pub(crate) two_to_l: f64,
}

impl Params {
    pub fn new(
        log2nregs: u32,
        nbits: u32,
        expthresh_raw: i64,
        sparseon: bool,
    ) -> Result<Self, HllError> {
        Self::validate(log2nregs, nbits, expthresh_raw)?;

        let nregs = 1u32 << log2nregs;

        if nregs as usize > MS_MAXDATA {
            return Err(HllError::BadSize(format!(
                "nregs ({nregs}) would exceed MS_MAXDATA ({MS_MAXDATA} bytes)"
            )));
        }

        Ok(Params {
            nbits,
            log2nregs,
            nregs,
            expthresh_raw,
            sparseon,
            pw_max_mask: Self::pw_max_mask(nbits),
            m_bits_mask: (nregs as u64) - 1,
            alpha_msquared: Self::alpha_m_squared(nregs),
            small_estimator_cutoff: Self::small_estimator_cutoff(nregs),
            large_estimator_cutoff: Self::large_estimator_cutoff(Self::two_to_l(log2nregs, nbits)),
            two_to_l: Self::two_to_l(log2nregs, nbits),
        })
    }

    fn validate(log2nregs: u32, nbits: u32, expthresh_raw: i64) -> Result<(), HllError> {
        if !(MINIMUM_LOG2M..=MAXIMUM_LOG2M).contains(&log2nregs) {
            return Err(HllError::BadParameter(format!(
                "log2m must be between {MINIMUM_LOG2M} and {MAXIMUM_LOG2M}, got {log2nregs}"
            )));
        }

        if !(MINIMUM_NBITS..=MAXIMUM_NBITS).contains(&nbits) {
            return Err(HllError::BadParameter(format!(
                "regwidth must be between {MINIMUM_NBITS} and {MAXIMUM_NBITS}, got {nbits}"
            )));
        }

        if !(MINIMUM_EXPTHRESH..=MAXIMUM_EXPTHRESH).contains(&expthresh_raw) {
            return Err(HllError::BadParameter(format!(
                "expthresh must be between {MINIMUM_EXPTHRESH} and {MAXIMUM_EXPTHRESH}, got {expthresh_raw}"
            )));
        }

        if expthresh_raw > 0 && !expthresh_raw.is_power_of_two() {
            return Err(HllError::BadParameter(format!(
                "expthresh must be a power of two, -1, or 0, got {expthresh_raw}"
            )));
        }

        Ok(())
    }

    /// `nbits`/`nregs`/`expthresh_raw`/`sparseon` must agree for a
    /// mixed-representation union.
    pub(crate) fn compatible(&self, other: &Self) -> Result<(), HllError> {
        if self.nbits == other.nbits
            && self.nregs == other.nregs
            && self.expthresh_raw == other.expthresh_raw
            && self.sparseon == other.sparseon
        {
            return Ok(());
        }

        Err(HllError::Incompatible(
            "nbits, nregs, expthresh, and sparseon must match to union multisets".into(),
        ))
    }

    /// Effective explicit threshold: when `expthresh_raw == -1`, the
    /// largest explicit list that fits in the space the compressed form
    /// would occupy; otherwise the raw value (0 disables EXPLICIT
    /// entirely).
    pub fn effective_expthresh(&self) -> u32 {
        if self.expthresh_raw != AUTO_EXPTHRESH {
            return self.expthresh_raw as u32;
        }

        let total_bits = self.nbits as u64 * self.nregs as u64;
        let compressed_bytes = (total_bits + 7) >> 3;
        (compressed_bytes / 8) as u32
    }

    pub(crate) fn pw_max_mask(nbits: u32) -> u64 {
        let shift = (((1u64 << nbits) - 1) - 1) % (u64::BITS as u64);
        !((1u64 << shift) - 1)
    }

    pub(crate) fn alpha_m_squared(nregs: u32) -> f64 {
        let m = nregs as f64;

        match nregs {
            16 => 0.673 * m * m,
            32 => 0.697 * m * m,
            64 => 0.709 * m * m,
            _ => (0.7213 / (1.0 + 1.079 / m)) * m * m,
        }
    }

    pub(crate) fn small_estimator_cutoff(nregs: u32) -> f64 {
        (nregs as f64 * 5.0) / 2.0
    }

    pub(crate) fn large_estimator_cutoff(two_to_l: f64) -> f64 {
        two_to_l / 30.0
    }

    pub(crate) fn two_to_l(log2nregs: u32, nbits: u32) -> f64 {
        let max_register_value = (1u64 << nbits) - 1;
        let pw_bits = max_register_value - 1;
        let total_bits = pw_bits + log2nregs as u64;

        2_f64.powf(total_bits as f64)
    }

    /// Encodes the 6-bit expthresh field of header byte 2: `-1 -> 63`,
    /// `0 -> 0`, else `floor(log2(expthresh)) + 1`.
    pub(crate) fn encode_expthresh(expthresh_raw: i64) -> u8 {
        if expthresh_raw == -1 {
            63
        } else if expthresh_raw == 0 {
            0
        } else {
            (63 - expthresh_raw.leading_zeros() as i64 + 1) as u8
        }
    }

    /// Inverts [`Params::encode_expthresh`].
    pub(crate) fn decode_expthresh(code: u8) -> i64 {
        match code {
            63 => -1,
            0 => 0,
            n => 1i64 << (n - 1),
        }
    }

    /// Packs header byte 1: `((nbits - 1) << 5) | log2nregs`.
    pub(crate) fn pack_byte1(&self) -> u8 {
        (((self.nbits - 1) << 5) | self.log2nregs) as u8
    }

    /// Packs header byte 2: `(sparseon << 6) | encode_expthresh(expthresh_raw)`.
    pub(crate) fn pack_byte2(&self) -> u8 {
        let sparse_bit = if self.sparseon { 1u8 << 6 } else { 0 };
        sparse_bit | Self::encode_expthresh(self.expthresh_raw)
    }

    /// Decodes header bytes 1 and 2 (byte 0's version/type nibble is
    /// handled by the caller) into a validated `Params`.
    pub(crate) fn unpack_header(byte1: u8, byte2: u8) -> Result<Self, HllError> {
        let nbits = ((byte1 >> 5) + 1) as u32;
        let log2nregs = (byte1 & 0x1f) as u32;
        let sparseon = (byte2 >> 6) & 0x1 == 1;
        let expthresh_raw = Self::decode_expthresh(byte2 & 0x3f);

        Params::new(log2nregs, nbits, expthresh_raw, sparseon)
    }
}
