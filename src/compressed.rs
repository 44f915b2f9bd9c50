//! The COMPRESSED representation: a dense array of `nregs` registers,
//! one byte each regardless of `nbits`, holding the maximum
//! position-of-first-set-bit observed for every bucket.

use crate::HllError;
use crate::bitstream::{calc_position, divide_by_8_round_up, read_bits, write_bits};
use crate::settings::Params;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedRegisters {
    regs: Vec<u8>,
}

impl CompressedRegisters {
    pub fn zeroed(nregs: u32) -> Self {
        Self {
            regs: vec![0u8; nregs as usize],
        }
    }

    pub fn get(&self, ndx: usize) -> u8 {
        self.regs[ndx]
    }

    pub fn set_if_greater(&mut self, ndx: usize, value: u8) {
        if value > self.regs[ndx] {
            self.regs[ndx] = value;
        }
    }

    /// Unconditional overwrite, used by the SPARSE decoder where a
    /// repeated index must take the last field's value, not the max.
    pub fn set(&mut self, ndx: usize, value: u8) {
        self.regs[ndx] = value;
    }

    pub fn len(&self) -> usize {
        self.regs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.regs.iter().copied()
    }

    pub fn nfilled(&self) -> usize {
        self.regs.iter().filter(|&&r| r != 0).count()
    }

    /// Folds one hashed element into this register array: the low
    /// `log2nregs` bits select the bucket, the remaining bits give the
    /// position of the first set bit. `pw_max_mask` has its lowest set
    /// bit at `maxregval - 1`, so OR-ing it in before counting trailing
    /// zeros bounds the result without a separate clamp.
    pub fn add(&mut self, element: u64, params: &Params) {
        let substream_value = element >> params.log2nregs;
        if substream_value == 0 {
            return;
        }

        let p_w = (1 + (substream_value | params.pw_max_mask).trailing_zeros()) as u8;
        let ndx = (element & params.m_bits_mask) as usize;

        self.set_if_greater(ndx, p_w);
    }

    /// Per-register maximum with another register array of the same size.
    pub fn union_dense(&mut self, other: &Self) -> Result<(), HllError> {
        if self.regs.len() != other.regs.len() {
            return Err(HllError::Incompatible(
                "compressed register arrays must be the same length to union".into(),
            ));
        }

        for (dst, src) in self.regs.iter_mut().zip(other.regs.iter()) {
            if *src > *dst {
                *dst = *src;
            }
        }

        Ok(())
    }

    /// Packs the full dense array: `nregs` fields of `nbits` bits each,
    /// in register order.
    pub fn encode(&self, params: &Params) -> Result<Vec<u8>, HllError> {
        let total_bits = params.nregs * params.nbits;
        let mut buf = vec![0u8; divide_by_8_round_up(total_bits) as usize];

        for (ndx, value) in self.regs.iter().enumerate() {
            let (idx, pos) = calc_position(ndx as u32, params.nbits as u8);
            write_bits(&mut buf, idx, pos, *value as u32, params.nbits as u8)?;
        }

        Ok(buf)
    }

    pub fn decode(buf: &[u8], params: &Params) -> Result<Self, HllError> {
        let mut regs = Self::zeroed(params.nregs);

        for ndx in 0..params.nregs as usize {
            let (idx, pos) = calc_position(ndx as u32, params.nbits as u8);
            regs.regs[ndx] = read_bits(buf, idx, pos, params.nbits as u8)? as u8;
        }

        Ok(regs)
    }
}
