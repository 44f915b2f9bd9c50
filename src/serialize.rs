//! Top-level pack/unpack: the 3-byte header plus the variant payload,
//! and the SPARSE-vs-COMPRESSED auto-selection at pack time.

use crate::HllError;
use crate::bitstream::divide_by_8_round_up;
use crate::compressed::CompressedRegisters;
use crate::config::{Config, MS_MAXDATA, OUTPUT_VERSION};
use crate::explicit::ExplicitStorage;
use crate::settings::Params;
use crate::sparse;
use crate::{Multiset, TYPE_COMPRESSED, TYPE_EMPTY, TYPE_EXPLICIT, TYPE_SPARSE, TYPE_UNDEFINED};

fn header(params: &Params, type_code: u8, output_version: u8) -> Vec<u8> {
    vec![(output_version << 4) | type_code, params.pack_byte1(), params.pack_byte2()]
}

/// Chooses SPARSE or COMPRESSED for a dense register array and reports
/// both the chosen type code and the payload length that choice
/// produces. `pack` and `packed_size` both call this so they can never
/// disagree.
fn select_compressed_encoding(regs: &CompressedRegisters, params: &Params, config: &Config) -> (u8, usize) {
    let nfilled = regs.nfilled();
    let sparse_bits = sparse::encoded_bits(regs, params);
    let dense_bits = (params.nregs * params.nbits) as usize;

    let use_sparse = params.sparseon
        && ((config.max_sparse != -1 && nfilled as i64 <= config.max_sparse)
            || (config.max_sparse == -1 && sparse_bits < dense_bits));

    if use_sparse {
        (TYPE_SPARSE, divide_by_8_round_up(sparse_bits as u32) as usize)
    } else {
        (TYPE_COMPRESSED, divide_by_8_round_up(dense_bits as u32) as usize)
    }
}

pub fn packed_size(ms: &Multiset, config: &Config) -> usize {
    match ms {
        Multiset::Empty(_) | Multiset::Undefined(_) => 3,
        Multiset::Explicit(_, storage) => 3 + storage.bytes_size(),
        Multiset::Compressed(params, regs) => {
            let (_, payload_len) = select_compressed_encoding(regs, params, config);
            3 + payload_len
        }
    }
}

pub fn pack(ms: &Multiset, config: &Config) -> Result<Vec<u8>, HllError> {
    if config.output_version != OUTPUT_VERSION {
        return Err(HllError::BadParameter(format!(
            "output_version must be {OUTPUT_VERSION}, got {}",
            config.output_version
        )));
    }

    let mut buf = match ms {
        Multiset::Empty(params) => header(params, TYPE_EMPTY, config.output_version),
        Multiset::Undefined(params) => header(params, TYPE_UNDEFINED, config.output_version),
        Multiset::Explicit(params, storage) => {
            let mut buf = header(params, TYPE_EXPLICIT, config.output_version);
            let mut payload = vec![0u8; storage.bytes_size()];
            storage.to_bytes(&mut payload);
            buf.extend_from_slice(&payload);
            buf
        }
        Multiset::Compressed(params, regs) => {
            let (type_code, _) = select_compressed_encoding(regs, params, config);
            let mut buf = header(params, type_code, config.output_version);
            let payload = if type_code == TYPE_SPARSE {
                sparse::encode(regs, params)?
            } else {
                regs.encode(params)?
            };
            buf.extend_from_slice(&payload);
            buf
        }
    };

    debug_assert_eq!(buf.len(), packed_size(ms, config));
    buf.shrink_to_fit();
    Ok(buf)
}

pub fn unpack(bytes: &[u8]) -> Result<Multiset, HllError> {
    if bytes.len() < 3 {
        return Err(HllError::BadEncoding("buffer shorter than the 3-byte header".into()));
    }

    let version = bytes[0] >> 4;
    if version != OUTPUT_VERSION {
        return Err(HllError::BadEncoding(format!("unsupported schema version {version}")));
    }

    let type_code = bytes[0] & 0x0F;
    let params = Params::unpack_header(bytes[1], bytes[2])?;
    let payload = &bytes[3..];

    match type_code {
        TYPE_UNDEFINED => {
            reject_nonempty_payload(payload, "UNDEFINED")?;
            Ok(Multiset::Undefined(params))
        }
        TYPE_EMPTY => {
            reject_nonempty_payload(payload, "EMPTY")?;
            Ok(Multiset::Empty(params))
        }
        TYPE_EXPLICIT => {
            if payload.len() > MS_MAXDATA {
                return Err(HllError::BadSize(format!(
                    "explicit payload of {} bytes exceeds MS_MAXDATA",
                    payload.len()
                )));
            }
            let storage = ExplicitStorage::from_bytes(payload)?;
            Ok(Multiset::Explicit(params, storage))
        }
        TYPE_SPARSE => {
            let regs = sparse::decode(payload, &params)?;
            Ok(Multiset::Compressed(params, regs))
        }
        TYPE_COMPRESSED => {
            let expected_len = divide_by_8_round_up(params.nbits * params.nregs) as usize;
            if payload.len() != expected_len {
                return Err(HllError::BadEncoding(format!(
                    "compressed payload length {} does not match expected {expected_len}",
                    payload.len()
                )));
            }
            if params.nregs as usize > MS_MAXDATA {
                return Err(HllError::BadSize(
                    "compressed register array exceeds MS_MAXDATA".into(),
                ));
            }
            let regs = CompressedRegisters::decode(payload, &params)?;
            Ok(Multiset::Compressed(params, regs))
        }
        other => Err(HllError::BadEncoding(format!("unknown type code {other}"))),
    }
}

fn reject_nonempty_payload(payload: &[u8], type_name: &str) -> Result<(), HllError> {
    if payload.is_empty() {
        Ok(())
    } else {
        Err(HllError::BadEncoding(format!(
            "{type_name} multisets carry no payload, got {} extra bytes",
            payload.len()
        )))
    }
}
