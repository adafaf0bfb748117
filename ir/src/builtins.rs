//! Catalog of DLC device operations.
//!
//! Every operation the IR may call on the device is listed here with its fixed
//! argument count and effect kind. The table is immutable and built once on
//! first use; nothing registers itself at load time.
//!
//! | family              | operations                                        | arity |
//! |---------------------|---------------------------------------------------|-------|
//! | binary / scalar     | add, sub, mul, div (+ `_scalar`)                  | 5     |
//! | unary               | abs                                               | 4     |
//! | unary               | exp, log, sqrt, rsqrt, relu                       | 3     |
//! | memory              | fill, copy                                        | 3     |
//! | DMA                 | dma                                               | 9     |
//! | synchronization     | sync, sync_done, sync_clear                       | 1     |
//! | synchronization     | sync_gte                                          | 2     |
//! | synchronization     | barrier                                           | 0     |

use std::collections::HashMap;
use std::str::FromStr;

use once_cell::sync::Lazy;
use snafu::ensure;
use strum::IntoEnumIterator;

use crate::error::{ArityMismatchSnafu, Result, UnknownBuiltinSnafu};

/// How a call interacts with state the optimizer cannot see. Every device
/// operation touches memory or synchronization state, so the catalog only
/// needs the opaque kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallEffect {
    /// Unmodeled side effects: never reorder, deduplicate or eliminate.
    Opaque,
}

/// Operation family; the lowering engine dispatches on it to pick an
/// emission strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpFamily {
    Binary,
    Scalar,
    Unary,
    Memory,
    Dma,
    Sync,
}

/// A DLC builtin operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(strum::EnumIter, strum::EnumString, strum::IntoStaticStr, strum::Display, strum::EnumCount)]
pub enum Builtin {
    #[strum(serialize = "tl.dlc_add")]
    Add,
    #[strum(serialize = "tl.dlc_add_scalar")]
    AddScalar,
    #[strum(serialize = "tl.dlc_sub")]
    Sub,
    #[strum(serialize = "tl.dlc_sub_scalar")]
    SubScalar,
    #[strum(serialize = "tl.dlc_mul")]
    Mul,
    #[strum(serialize = "tl.dlc_mul_scalar")]
    MulScalar,
    #[strum(serialize = "tl.dlc_div")]
    Div,
    #[strum(serialize = "tl.dlc_div_scalar")]
    DivScalar,

    #[strum(serialize = "tl.dlc_abs")]
    Abs,
    #[strum(serialize = "tl.dlc_exp")]
    Exp,
    #[strum(serialize = "tl.dlc_log")]
    Log,
    #[strum(serialize = "tl.dlc_sqrt")]
    Sqrt,
    #[strum(serialize = "tl.dlc_rsqrt")]
    Rsqrt,
    #[strum(serialize = "tl.dlc_relu")]
    Relu,

    #[strum(serialize = "tl.dlc_fill")]
    Fill,
    #[strum(serialize = "tl.dlc_copy")]
    Copy,

    #[strum(serialize = "tl.dlc_dma")]
    Dma,

    #[strum(serialize = "tl.dlc_sync")]
    Sync,
    #[strum(serialize = "tl.dlc_sync_done")]
    SyncDone,
    #[strum(serialize = "tl.dlc_sync_gte")]
    SyncGte,
    #[strum(serialize = "tl.dlc_sync_clear")]
    SyncClear,
    #[strum(serialize = "tl.dlc_barrier")]
    Barrier,
}

impl Builtin {
    /// Required number of call arguments.
    pub const fn arity(self) -> usize {
        match self {
            Self::Add
            | Self::AddScalar
            | Self::Sub
            | Self::SubScalar
            | Self::Mul
            | Self::MulScalar
            | Self::Div
            | Self::DivScalar => 5,
            Self::Abs => 4,
            Self::Exp | Self::Log | Self::Sqrt | Self::Rsqrt | Self::Relu => 3,
            Self::Fill | Self::Copy => 3,
            Self::Dma => 9,
            Self::Sync | Self::SyncDone | Self::SyncClear => 1,
            Self::SyncGte => 2,
            Self::Barrier => 0,
        }
    }

    pub const fn family(self) -> OpFamily {
        match self {
            Self::Add | Self::Sub | Self::Mul | Self::Div => OpFamily::Binary,
            Self::AddScalar | Self::SubScalar | Self::MulScalar | Self::DivScalar => OpFamily::Scalar,
            Self::Abs | Self::Exp | Self::Log | Self::Sqrt | Self::Rsqrt | Self::Relu => OpFamily::Unary,
            Self::Fill | Self::Copy => OpFamily::Memory,
            Self::Dma => OpFamily::Dma,
            Self::Sync | Self::SyncDone | Self::SyncGte | Self::SyncClear | Self::Barrier => OpFamily::Sync,
        }
    }

    /// All device operations are opaque to the optimizer.
    pub const fn effect(self) -> CallEffect {
        CallEffect::Opaque
    }

    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Look up an operation by its canonical `tl.dlc_*` name.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| UnknownBuiltinSnafu { name }.build())
    }
}

/// Catalog entry for one builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpInfo {
    pub op: Builtin,
    pub name: &'static str,
    pub arity: usize,
    pub effect: CallEffect,
}

/// Immutable name -> operation table.
#[derive(Debug)]
pub struct OpRegistry {
    by_name: HashMap<&'static str, OpInfo>,
}

impl OpRegistry {
    fn build() -> Self {
        let by_name = Builtin::iter()
            .map(|op| {
                let info = OpInfo { op, name: op.name(), arity: op.arity(), effect: op.effect() };
                (info.name, info)
            })
            .collect();
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&OpInfo> {
        self.by_name.get(name)
    }

    pub fn info(&self, op: Builtin) -> &OpInfo {
        &self.by_name[op.name()]
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OpInfo> {
        self.by_name.values()
    }

    /// Fails when `actual` differs from the declared arity of `op`.
    pub fn check_arity(&self, op: Builtin, actual: usize) -> Result<()> {
        let info = self.info(op);
        ensure!(info.arity == actual, ArityMismatchSnafu { op: info.name, expected: info.arity, actual });
        Ok(())
    }
}

static REGISTRY: Lazy<OpRegistry> = Lazy::new(OpRegistry::build);

/// The process-wide builtin catalog.
pub fn registry() -> &'static OpRegistry {
    &REGISTRY
}
