//! Error types for code generation.
//!
//! Every variant is fatal: lowering stops at the first error and no partial
//! source is produced.

use dlc_dtype::DType;
use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Builtin call whose argument count breaks the catalog contract.
    #[snafu(display("Invalid call to {op}: {source}"))]
    InvalidCall { op: &'static str, source: dlc_ir::Error },

    /// Allocation extents are not all integer literals.
    #[snafu(display("Allocation of '{buffer}' has a non-constant size; only constant size stack allocation is supported"))]
    NonConstantAllocation { buffer: String },

    /// Allocation with an extent of zero or less.
    #[snafu(display("Allocation of '{buffer}' must have positive extents, got {size}"))]
    NonPositiveAllocation { buffer: String, size: i64 },

    /// Element count of a constant allocation does not fit in `i64`.
    #[snafu(display("Allocation of '{buffer}' overflows: the product of its extents exceeds i64"))]
    AllocationOverflow { buffer: String },

    /// Allocation guarded by a literal false condition.
    #[snafu(display("Allocation of '{buffer}' is guarded by a constant false condition"))]
    FalseAllocationCondition { buffer: String },

    /// Expression the generic printer cannot represent for this target.
    #[snafu(display("Unsupported operation: {op}"))]
    UnsupportedOp { op: String },

    /// Statement kind that reached a printer which does not handle it.
    #[snafu(display("Unsupported statement: {kind}"))]
    UnsupportedStmt { kind: &'static str },

    /// Data type without a C spelling on this target.
    #[snafu(display("Unsupported type: {dtype}"))]
    UnsupportedType { dtype: DType },

    /// Module entry that is not a kernel function.
    #[snafu(display("DLC codegen can only take PrimFunc, '{name}' is not one"))]
    NotPrimFunc { name: String },

    /// Target descriptor of another backend.
    #[snafu(display("Unsupported target '{kind}', expected 'dlc'"))]
    UnsupportedTarget { kind: String },

    /// Native compile callback failed.
    #[snafu(display("Native compilation failed: {source}"))]
    Compile { source: Box<dyn std::error::Error + Send + Sync> },
}
