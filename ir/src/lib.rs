//! Kernel IR consumed by the DLC source backend.
//!
//! The IR is a tree: a [`PrimFunc`] owns a [`Stmt`] body, statements own their
//! children, expressions own their operands. Variables are shared by identity
//! through [`Arc<Var>`](std::sync::Arc).
//!
//! # Module Organization
//!
//! - [`var`] - Variables, iteration variables and pointer annotations
//! - [`expr`] - Expression nodes
//! - [`stmt`] - Statement nodes and attribute keys
//! - [`function`] - Kernel functions and modules
//! - [`builtins`] - The fixed catalog of DLC device operations
//! - [`scope`] - Storage scope side table
//! - [`error`] - Error types and result handling

pub mod builtins;
pub mod error;
pub mod expr;
pub mod function;
pub mod prelude;
pub mod scope;
pub mod stmt;
pub mod var;


pub use builtins::{Builtin, CallEffect, OpFamily, OpInfo, OpRegistry, registry};
pub use error::{Error, Result};
pub use expr::{BinaryOp, CallOp, Expr};
pub use function::{BaseFunc, FuncAttrs, IRModule, PrimFunc};
pub use scope::ScopeTable;
pub use stmt::{AttrKey, AttrNode, ForKind, Stmt};
pub use var::{IterVar, PointerType, Var, VarId};

pub use dlc_dtype::{DType, ScalarDType};
