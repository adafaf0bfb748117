//! Common imports for building kernel IR.
//!
//! ```rust,ignore
//! use dlc_ir::prelude::*;
//! ```

pub use crate::builtins::{Builtin, CallEffect, OpFamily, registry};
pub use crate::expr::{BinaryOp, CallOp, Expr};
pub use crate::function::{BaseFunc, FuncAttrs, IRModule, PrimFunc};
pub use crate::scope::ScopeTable;
pub use crate::stmt::{AttrKey, AttrNode, ForKind, Stmt};
pub use crate::var::{IterVar, PointerType, Var};

pub use dlc_dtype::{DType, ScalarDType};
