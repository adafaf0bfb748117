//! Statement nodes.

use std::sync::Arc;

use dlc_dtype::DType;

use crate::expr::Expr;
use crate::var::{IterVar, Var};

/// Key of an attribute statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AttrKey {
    /// Launch extent of a thread-bound iteration variable.
    ThreadExtent,
    StorageScope,
    ComputeScope,
    ResourceScope,
    Other(String),
}

impl AttrKey {
    pub fn parse(key: &str) -> Self {
        match key {
            "thread_extent" => Self::ThreadExtent,
            "storage_scope" => Self::StorageScope,
            "compute_scope" => Self::ComputeScope,
            "resource_scope" => Self::ResourceScope,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::ThreadExtent => "thread_extent",
            Self::StorageScope => "storage_scope",
            Self::ComputeScope => "compute_scope",
            Self::ResourceScope => "resource_scope",
            Self::Other(key) => key,
        }
    }
}

/// Object an attribute statement is attached to.
#[derive(Debug, Clone)]
pub enum AttrNode {
    IterVar(IterVar),
    Var(Arc<Var>),
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForKind {
    #[default]
    Serial,
    Unrolled,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Attr {
        key: AttrKey,
        node: AttrNode,
        value: Expr,
        body: Box<Stmt>,
    },
    Allocate {
        buffer: Arc<Var>,
        dtype: DType,
        extents: Vec<Expr>,
        condition: Expr,
        body: Box<Stmt>,
    },
    Seq(Vec<Stmt>),
    Evaluate(Expr),
    For {
        var: Arc<Var>,
        min: Expr,
        extent: Expr,
        kind: ForKind,
        body: Box<Stmt>,
    },
    IfThenElse {
        condition: Expr,
        then_case: Box<Stmt>,
        else_case: Option<Box<Stmt>>,
    },
    LetStmt {
        var: Arc<Var>,
        value: Expr,
        body: Box<Stmt>,
    },
    BufferStore {
        buffer: Arc<Var>,
        value: Expr,
        index: Expr,
    },
}

impl Stmt {
    pub fn attr(key: AttrKey, node: AttrNode, value: Expr, body: Stmt) -> Self {
        Self::Attr { key, node, value, body: Box::new(body) }
    }

    /// Thread-extent marker binding `iter_var` with the given extent.
    pub fn thread_extent(iter_var: IterVar, extent: Expr, body: Stmt) -> Self {
        Self::attr(AttrKey::ThreadExtent, AttrNode::IterVar(iter_var), extent, body)
    }

    /// Unconditional allocation of `extents` elements of `dtype`.
    pub fn allocate(buffer: &Arc<Var>, dtype: DType, extents: Vec<Expr>, body: Stmt) -> Self {
        Self::Allocate { buffer: Arc::clone(buffer), dtype, extents, condition: Expr::bool_(true), body: Box::new(body) }
    }

    pub fn seq(stmts: impl IntoIterator<Item = Stmt>) -> Self {
        Self::Seq(stmts.into_iter().collect())
    }

    pub fn evaluate(expr: Expr) -> Self {
        Self::Evaluate(expr)
    }

    pub fn serial_for(var: &Arc<Var>, min: Expr, extent: Expr, body: Stmt) -> Self {
        Self::For { var: Arc::clone(var), min, extent, kind: ForKind::Serial, body: Box::new(body) }
    }

    pub fn if_then_else(condition: Expr, then_case: Stmt, else_case: Option<Stmt>) -> Self {
        Self::IfThenElse { condition, then_case: Box::new(then_case), else_case: else_case.map(Box::new) }
    }

    pub fn let_stmt(var: &Arc<Var>, value: Expr, body: Stmt) -> Self {
        Self::LetStmt { var: Arc::clone(var), value, body: Box::new(body) }
    }

    pub fn store(buffer: &Arc<Var>, value: Expr, index: Expr) -> Self {
        Self::BufferStore { buffer: Arc::clone(buffer), value, index }
    }

    /// Literal extent values, or `None` when any extent is symbolic.
    pub fn constant_extents(extents: &[Expr]) -> Option<Vec<i64>> {
        extents.iter().map(Expr::as_int).collect()
    }

    /// Number of elements when every extent is a positive integer literal and
    /// the product fits in `i64`.
    pub fn constant_allocation_size(extents: &[Expr]) -> Option<i64> {
        Self::constant_extents(extents)?.into_iter().try_fold(1i64, |acc, v| if v > 0 { acc.checked_mul(v) } else { None })
    }

    /// Short node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Attr { .. } => "Attr",
            Self::Allocate { .. } => "Allocate",
            Self::Seq(_) => "Seq",
            Self::Evaluate(_) => "Evaluate",
            Self::For { .. } => "For",
            Self::IfThenElse { .. } => "IfThenElse",
            Self::LetStmt { .. } => "LetStmt",
            Self::BufferStore { .. } => "BufferStore",
        }
    }
}
