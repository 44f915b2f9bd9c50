//! Human-readable dump of a multiset, intended for test oracles and
//! diagnostics rather than any wire format.

use std::fmt;

use crate::Multiset;
use crate::settings::Params;

fn common_fields(params: &Params) -> String {
    format!(
        "nregs={}, nbits={}, expthresh={}, sparseon={}",
        params.nregs, params.nbits, params.expthresh_raw, params.sparseon
    )
}

impl fmt::Display for Multiset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Multiset::Undefined(params) => {
                write!(f, "UNDEFINED({})", common_fields(params))
            }
            Multiset::Empty(params) => {
                write!(f, "EMPTY({})", common_fields(params))
            }
            Multiset::Explicit(params, storage) => {
                write!(f, "EXPLICIT({}, nelem={})", common_fields(params), storage.len())
            }
            Multiset::Compressed(params, regs) => {
                write!(
                    f,
                    "COMPRESSED({}, nfilled={}/{})",
                    common_fields(params),
                    regs.nfilled(),
                    regs.len()
                )
            }
        }
    }
}

#[cfg(test)]
mod debug_test {
    use crate::Multiset;
    use crate::config::Config;

    #[test]
    fn empty_prints_its_parameters() {
        let config = Config::default();
        let ms = Multiset::empty(&config).unwrap();
        assert_eq!(
            "EMPTY(nregs=2048, nbits=5, expthresh=-1, sparseon=true)",
            ms.to_string()
        );
    }

    #[test]
    fn explicit_reports_element_count() {
        let config = Config::default();
        let mut ms = Multiset::empty(&config).unwrap();
        ms.add(1);
        ms.add(2);
        assert_eq!(
            "EXPLICIT(nregs=2048, nbits=5, expthresh=-1, sparseon=true, nelem=2)",
            ms.to_string()
        );
    }
}
