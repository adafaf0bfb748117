use proptest::prelude::*;
use strum::IntoEnumIterator;
use test_case::test_case;

use crate::dlc::AddressSpace;

#[test_case(0, "SMEM"; "smem")]
#[test_case(1, "HBM"; "hbm")]
#[test_case(2, "VMEM"; "vmem")]
#[test_case(3, "CMEM"; "cmem")]
#[test_case(4, "IMEM"; "imem")]
#[test_case(5, "SEMAPHORE"; "semaphore")]
fn test_known_codes(code: i64, name: &str) {
    let space = AddressSpace::from_code(code).expect("known code");
    assert_eq!(space.name(), name);
    assert_eq!(space.code(), code);
    assert_eq!(AddressSpace::render_code(code), name);
}

#[test]
fn test_codes_are_dense() {
    let codes: Vec<i64> = AddressSpace::iter().map(AddressSpace::code).collect();
    assert_eq!(codes, (0..6).collect::<Vec<_>>());
}

proptest! {
    #[test]
    fn unknown_codes_print_as_literals(code in any::<i64>().prop_filter("unknown", |c| !(0..=5).contains(c))) {
        prop_assert!(AddressSpace::from_code(code).is_none());
        prop_assert_eq!(AddressSpace::render_code(code), code.to_string());
    }
}
