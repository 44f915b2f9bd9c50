//! The HyperLogLog cardinality estimator: a raw harmonic-mean estimate
//! with small-range (linear counting) and large-range corrections.

use crate::HllError;
use crate::compressed::CompressedRegisters;
use crate::settings::Params;

/// Estimates the number of distinct elements folded into `regs`.
///
/// `nregs <= 8` is too small for the asymptotic corrections below to
/// be meaningful and is rejected outright.
pub fn estimate(regs: &CompressedRegisters, params: &Params) -> Result<f64, HllError> {
    let m = params.nregs;
    if m <= 8 {
        return Err(HllError::BadSize(format!(
            "nregs must be greater than 8 for estimation, got {m}"
        )));
    }

    let mut sum = 0.0f64;
    let mut zeros = 0u32;
    for r in regs.iter() {
        sum += 2f64.powi(-(r as i32));
        if r == 0 {
            zeros += 1;
        }
    }

    let raw = params.alpha_msquared / sum;

    if zeros > 0 && raw < params.small_estimator_cutoff {
        return Ok(m as f64 * (m as f64 / zeros as f64).ln());
    }

    if raw <= params.large_estimator_cutoff {
        return Ok(raw);
    }

    Ok(-params.two_to_l * (1.0 - raw / params.two_to_l).ln())
}

#[cfg(test)]
mod cardinality_test {
    use super::*;

    #[test]
    fn rejects_too_few_registers() {
        let params = Params::new(3, 5, -1, true).unwrap(); // nregs = 8
        let regs = CompressedRegisters::zeroed(params.nregs);
        assert!(estimate(&regs, &params).is_err());
    }

    #[test]
    fn all_zero_registers_trigger_linear_counting() {
        let params = Params::new(4, 5, -1, true).unwrap(); // nregs = 16
        let regs = CompressedRegisters::zeroed(params.nregs);
        // all registers empty -> linear counting with zeros == m -> ln(1) == 0
        assert_eq!(0.0, estimate(&regs, &params).unwrap());
    }

    #[test]
    fn a_single_filled_register_gives_a_small_positive_estimate() {
        let params = Params::new(4, 5, -1, true).unwrap();
        let mut regs = CompressedRegisters::zeroed(params.nregs);
        regs.set_if_greater(0, 1);

        let card = estimate(&regs, &params).unwrap();
        assert!(card > 0.0 && card < params.nregs as f64 * 2.0);
    }
}
