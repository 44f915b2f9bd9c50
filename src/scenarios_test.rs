use crate::config::Config;
use crate::{Multiset, TYPE_COMPRESSED, TYPE_EXPLICIT};

#[test]
fn empty_defaults_serialize_to_three_bytes() {
    let config = Config::default();
    let ms = Multiset::empty(&config).unwrap();
    let bytes = ms.pack(&config).unwrap();

    assert_eq!(vec![0x11, 0x8B, 0x7F], bytes);
}

#[test]
fn explicit_single_add_serializes_to_eleven_bytes() {
    let config = Config::default();
    let mut ms = Multiset::empty(&config).unwrap();
    ms.add(0xDEADBEEFCAFEBABE);

    let bytes = ms.pack(&config).unwrap();
    assert_eq!(11, bytes.len());

    let element = i64::from_be_bytes(bytes[3..11].try_into().unwrap()) as u64;
    assert_eq!(0xDEADBEEFCAFEBABE, element);
}

#[test]
fn promotion_threshold_forces_compressed_after_two_adds() {
    // log2m=4, regwidth=5, expthresh=-1 -> expval = floor(ceil(5*16/8)/8) = 1
    let mut ms = Multiset::empty4(4, 5, -1, true).unwrap();
    assert_eq!(0.0, ms.cardinality().unwrap());

    ms.add(1);
    assert_eq!(TYPE_EXPLICIT, ms.type_code());

    ms.add(2);
    assert_eq!(TYPE_COMPRESSED, ms.type_code());
}

#[test]
fn single_filled_register_packs_as_sparse() {
    let mut ms = Multiset::empty4(11, 5, 0, true).unwrap();
    ms.add(1); // falls into whichever register it hashes to

    let config = Config::default();
    let bytes = ms.pack(&config).unwrap();
    assert_eq!(5, bytes.len());
    assert_eq!(3, bytes[0] & 0x0F); // TYPE_SPARSE
}

#[test]
fn cardinality_on_empty_explicit_and_undefined() {
    let config = Config::default();

    let empty = Multiset::empty(&config).unwrap();
    assert_eq!(0.0, empty.cardinality().unwrap());

    let mut explicit = Multiset::empty(&config).unwrap();
    explicit.add(1);
    explicit.add(2);
    explicit.add(3);
    assert_eq!(3.0, explicit.cardinality().unwrap());

    let undefined = Multiset::Undefined(explicit.params());
    assert_eq!(-1.0, undefined.cardinality().unwrap());
}

#[test]
fn union_of_two_explicit_sets_with_overlap_merges_distinct_elements() {
    let config = Config::default();

    let mut a = Multiset::empty(&config).unwrap();
    a.add(10);
    a.add(20);

    let mut b = Multiset::empty(&config).unwrap();
    b.add(20);
    b.add(30);

    a.union(&b).unwrap();

    assert_eq!(TYPE_EXPLICIT, a.type_code());
    assert_eq!(3.0, a.cardinality().unwrap());
}
