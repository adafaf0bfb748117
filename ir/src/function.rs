//! Kernel functions and modules.

use std::sync::Arc;

use dlc_dtype::DType;
use snafu::ensure;

use crate::error::{DuplicateFunctionSnafu, Result};
use crate::stmt::Stmt;
use crate::var::Var;

/// Function-level attributes.
#[derive(Debug, Clone, Default)]
pub struct FuncAttrs {
    /// Exported symbol name overriding the module-level name.
    pub global_symbol: Option<String>,
    /// Handle parameters do not alias each other.
    pub no_alias: bool,
    /// Parameters exempt from `no_alias`.
    pub non_restrict_params: Vec<Arc<Var>>,
}

/// A device kernel.
#[derive(Debug, Clone)]
pub struct PrimFunc {
    pub params: Vec<Arc<Var>>,
    pub body: Stmt,
    pub ret_type: DType,
    pub attrs: FuncAttrs,
}

impl PrimFunc {
    pub fn new(params: Vec<Arc<Var>>, body: Stmt) -> Self {
        Self { params, body, ret_type: DType::void_(), attrs: FuncAttrs::default() }
    }

    pub fn with_global_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.attrs.global_symbol = Some(symbol.into());
        self
    }

    pub fn with_no_alias(mut self, no_alias: bool) -> Self {
        self.attrs.no_alias = no_alias;
        self
    }

    pub fn with_non_restrict(mut self, params: Vec<Arc<Var>>) -> Self {
        self.attrs.non_restrict_params = params;
        self
    }

    pub fn is_restrict_exempt(&self, var: &Var) -> bool {
        self.attrs.non_restrict_params.iter().any(|p| p.id == var.id)
    }
}

/// Any function a module can hold.
#[derive(Debug, Clone)]
pub enum BaseFunc {
    Prim(PrimFunc),
    /// Externally provided function; only a symbol is known.
    Extern { symbol: String },
}

/// Ordered collection of named functions.
#[derive(Debug, Clone, Default)]
pub struct IRModule {
    functions: Vec<(String, BaseFunc)>,
}

impl IRModule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a function. Names must be unique.
    pub fn add(&mut self, name: impl Into<String>, func: BaseFunc) -> Result<()> {
        let name = name.into();
        ensure!(!self.functions.iter().any(|(n, _)| *n == name), DuplicateFunctionSnafu { name });
        self.functions.push((name, func));
        Ok(())
    }

    pub fn add_prim(&mut self, name: impl Into<String>, func: PrimFunc) -> Result<()> {
        self.add(name, BaseFunc::Prim(func))
    }

    /// Functions in insertion order.
    pub fn functions(&self) -> impl Iterator<Item = (&str, &BaseFunc)> {
        self.functions.iter().map(|(n, f)| (n.as_str(), f))
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
