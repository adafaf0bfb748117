use proptest::prelude::*;
use strum::{EnumCount, IntoEnumIterator};
use test_case::test_case;

use crate::builtins::{Builtin, CallEffect, OpFamily, registry};
use crate::error::Error;

#[test_case(Builtin::Add, 5)]
#[test_case(Builtin::AddScalar, 5)]
#[test_case(Builtin::SubScalar, 5)]
#[test_case(Builtin::Mul, 5)]
#[test_case(Builtin::DivScalar, 5)]
#[test_case(Builtin::Abs, 4)]
#[test_case(Builtin::Exp, 3)]
#[test_case(Builtin::Relu, 3)]
#[test_case(Builtin::Fill, 3)]
#[test_case(Builtin::Copy, 3)]
#[test_case(Builtin::Dma, 9)]
#[test_case(Builtin::Sync, 1)]
#[test_case(Builtin::SyncDone, 1)]
#[test_case(Builtin::SyncGte, 2)]
#[test_case(Builtin::SyncClear, 1)]
#[test_case(Builtin::Barrier, 0)]
fn test_declared_arity(op: Builtin, arity: usize) {
    assert_eq!(op.arity(), arity);
    assert_eq!(registry().info(op).arity, arity);
}

#[test]
fn test_registry_covers_every_builtin() {
    assert_eq!(registry().len(), Builtin::COUNT);
    for op in Builtin::iter() {
        let info = registry().get(op.name()).expect("builtin missing from registry");
        assert_eq!(info.op, op);
    }
}

#[test]
fn test_all_builtins_opaque() {
    assert!(registry().iter().all(|info| info.effect == CallEffect::Opaque));
}

#[test_case("tl.dlc_dma", Builtin::Dma)]
#[test_case("tl.dlc_sync_gte", Builtin::SyncGte)]
#[test_case("tl.dlc_mul_scalar", Builtin::MulScalar)]
fn test_lookup_by_name(name: &str, expected: Builtin) {
    assert_eq!(Builtin::from_name(name).unwrap(), expected);
    assert_eq!(expected.name(), name);
}

#[test]
fn test_unknown_name() {
    let err = Builtin::from_name("tl.dlc_matmul").unwrap_err();
    assert_eq!(err, Error::UnknownBuiltin { name: "tl.dlc_matmul".to_string() });
}

#[test]
fn test_families() {
    assert_eq!(Builtin::Add.family(), OpFamily::Binary);
    assert_eq!(Builtin::AddScalar.family(), OpFamily::Scalar);
    assert_eq!(Builtin::Abs.family(), OpFamily::Unary);
    assert_eq!(Builtin::Copy.family(), OpFamily::Memory);
    assert_eq!(Builtin::Dma.family(), OpFamily::Dma);
    assert_eq!(Builtin::Barrier.family(), OpFamily::Sync);
}

fn any_builtin() -> impl Strategy<Value = Builtin> {
    let all: Vec<Builtin> = Builtin::iter().collect();
    proptest::sample::select(all)
}

proptest! {
    /// Matching arity never fails; any other count always does.
    #[test]
    fn arity_check_exact(op in any_builtin(), actual in 0usize..16) {
        let result = registry().check_arity(op, actual);
        if actual == op.arity() {
            prop_assert!(result.is_ok());
        } else {
            let is_arity_mismatch = matches!(result, Err(Error::ArityMismatch { .. }));
            prop_assert!(is_arity_mismatch);
        }
    }
}
