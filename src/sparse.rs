//! SPARSE is a wire-only encoding of a COMPRESSED register array: only
//! the nonzero registers are written, each as one `(index, value)`
//! field. There is no live SPARSE type — loading SPARSE bytes produces
//! a COMPRESSED multiset directly.

use crate::HllError;
use crate::bitstream::{calc_position, divide_by_8_round_up, read_bits, write_bits};
use crate::compressed::CompressedRegisters;
use crate::settings::Params;

fn chunk_width(params: &Params) -> u8 {
    (params.log2nregs + params.nbits) as u8
}

pub fn encoded_bits(regs: &CompressedRegisters, params: &Params) -> usize {
    regs.nfilled() * chunk_width(params) as usize
}

pub fn encoded_bytes(regs: &CompressedRegisters, params: &Params) -> usize {
    divide_by_8_round_up(encoded_bits(regs, params) as u32) as usize
}

/// Writes every nonzero register as one `ndx<<nbits | val` field, in
/// ascending index order, MSB-first.
pub fn encode(regs: &CompressedRegisters, params: &Params) -> Result<Vec<u8>, HllError> {
    let chunk = chunk_width(params);
    let mut buf = vec![0u8; encoded_bytes(regs, params)];

    let mut field_no = 0u32;
    for (ndx, val) in regs.iter().enumerate().filter(|(_, v)| *v != 0) {
        let (idx, pos) = calc_position(field_no, chunk);
        let field = ((ndx as u32) << params.nbits) | val as u32;
        write_bits(&mut buf, idx, pos, field, chunk)?;
        field_no += 1;
    }

    Ok(buf)
}

/// Decodes a SPARSE payload (header already stripped by the caller)
/// into a freshly zeroed COMPRESSED register array. A repeated index
/// overwrites rather than merges — the last field for a given index
/// wins, matching the reference decoder's plain assignment.
pub fn decode(buf: &[u8], params: &Params) -> Result<CompressedRegisters, HllError> {
    let chunk = chunk_width(params);
    if chunk == 0 {
        return Err(HllError::BadEncoding("sparse chunk width is zero".into()));
    }

    let nfilled = (buf.len() as u64 * 8) / chunk as u64;
    let mut regs = CompressedRegisters::zeroed(params.nregs);

    for field_no in 0..nfilled as u32 {
        let (idx, pos) = calc_position(field_no, chunk);
        let field = read_bits(buf, idx, pos, chunk)?;

        let ndx = (field >> params.nbits) as usize;
        let val = (field & ((1u32 << params.nbits) - 1)) as u8;

        if ndx >= regs.len() {
            return Err(HllError::BadEncoding(
                "sparse register index out of range".into(),
            ));
        }

        regs.set(ndx, val);
    }

    Ok(regs)
}

#[cfg(test)]
mod sparse_test {
    use super::*;

    #[test]
    fn round_trips_a_single_filled_register() {
        let params = Params::new(11, 5, -1, true).unwrap();
        let mut regs = CompressedRegisters::zeroed(params.nregs);
        regs.set_if_greater(7, 3);

        let encoded = encode(&regs, &params).unwrap();
        assert_eq!(5, encoded.len() + 3); // header(3) + payload == scenario-4 length

        let decoded = decode(&encoded, &params).unwrap();
        assert_eq!(3, decoded.get(7));
        assert_eq!(0, decoded.get(0));
    }

    #[test]
    fn round_trips_several_filled_registers() {
        let params = Params::new(6, 5, -1, true).unwrap();
        let mut regs = CompressedRegisters::zeroed(params.nregs);
        for (ndx, val) in [(0usize, 1u8), (3, 5), (10, 31), (63, 2)] {
            regs.set_if_greater(ndx, val);
        }

        let encoded = encode(&regs, &params).unwrap();
        let decoded = decode(&encoded, &params).unwrap();

        for i in 0..params.nregs as usize {
            assert_eq!(regs.get(i), decoded.get(i), "register {i}");
        }
    }

    #[test]
    fn empty_register_array_encodes_to_zero_bytes() {
        let params = Params::new(4, 5, -1, true).unwrap();
        let regs = CompressedRegisters::zeroed(params.nregs);
        assert_eq!(0, encode(&regs, &params).unwrap().len());
    }

    #[test]
    fn round_trips_random_register_fills() {
        use rand::prelude::*;
        use rand::rngs::StdRng;

        let params = Params::new(6, 5, -1, true).unwrap(); // nregs = 64
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..50 {
            let mut regs = CompressedRegisters::zeroed(params.nregs);
            for _ in 0..20 {
                let ndx = rng.gen_range(0..params.nregs as usize);
                let value: u8 = rng.gen_range(1..=31);
                regs.set_if_greater(ndx, value);
            }

            let encoded = encode(&regs, &params).unwrap();
            let decoded = decode(&encoded, &params).unwrap();
            assert_eq!(regs, decoded);
        }
    }

    #[test]
    fn decode_rejects_out_of_range_index() {
        let params = Params::new(2, 5, -1, true).unwrap(); // nregs = 4
        // field = ndx<<nbits | val, with ndx=10 (out of range) and val=1
        let field: u32 = (10 << 5) | 1;
        let chunk = chunk_width(&params);
        let mut buf = vec![0u8; divide_by_8_round_up(chunk as u32) as usize];
        write_bits(&mut buf, 0, 0, field, chunk).unwrap();

        assert!(decode(&buf, &params).is_err());
    }

    #[test]
    fn decode_overwrites_rather_than_merges_a_repeated_index() {
        let params = Params::new(2, 5, -1, true).unwrap(); // nregs = 4
        let chunk = chunk_width(&params);
        let mut buf = vec![0u8; divide_by_8_round_up(2 * chunk as u32) as usize];

        // two fields for the same index: first val=20, then a smaller val=3.
        let field_a: u32 = (1 << params.nbits) | 20;
        let field_b: u32 = (1 << params.nbits) | 3;
        let (idx_a, pos_a) = calc_position(0, chunk);
        let (idx_b, pos_b) = calc_position(1, chunk);
        write_bits(&mut buf, idx_a, pos_a, field_a, chunk).unwrap();
        write_bits(&mut buf, idx_b, pos_b, field_b, chunk).unwrap();

        let decoded = decode(&buf, &params).unwrap();
        assert_eq!(3, decoded.get(1));
    }
}
