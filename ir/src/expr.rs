//! Expression nodes.

use std::sync::Arc;

use dlc_dtype::DType;
use smallvec::SmallVec;

use crate::builtins::Builtin;
use crate::var::Var;

/// Binary operators, arithmetic through logical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(strum::AsRefStr, strum::EnumIter)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    FloorDiv,
    FloorMod,
    Min,
    Max,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub const fn is_comparison(self) -> bool {
        matches!(self, Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge)
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

/// Callee of a call node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOp {
    /// Operation from the DLC builtin catalog.
    Builtin(Builtin),
    /// Plain extern function, printed as `name(args...)`.
    Extern(String),
}

/// Call arguments, shared the way tree nodes share their sources.
pub type CallArgs = SmallVec<[Arc<Expr>; 4]>;

#[derive(Debug, Clone)]
pub enum Expr {
    IntImm {
        value: i64,
        dtype: DType,
    },
    FloatImm {
        value: f64,
        dtype: DType,
    },
    StringImm(String),
    Var(Arc<Var>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Cast {
        dtype: DType,
        value: Box<Expr>,
    },
    Select {
        condition: Box<Expr>,
        true_value: Box<Expr>,
        false_value: Box<Expr>,
    },
    BufferLoad {
        buffer: Arc<Var>,
        dtype: DType,
        index: Box<Expr>,
    },
    /// Address of `buffer[offset]`.
    AccessPtr {
        buffer: Arc<Var>,
        dtype: DType,
        offset: Box<Expr>,
    },
    Call {
        op: CallOp,
        args: CallArgs,
        dtype: DType,
    },
}

impl Expr {
    // =========================================================================
    // Literals
    // =========================================================================

    /// 32-bit integer literal.
    pub fn int(value: i64) -> Self {
        Self::IntImm { value, dtype: DType::int32() }
    }

    pub fn int_of(value: i64, dtype: DType) -> Self {
        Self::IntImm { value, dtype }
    }

    /// 32-bit float literal.
    pub fn float(value: f64) -> Self {
        Self::FloatImm { value, dtype: DType::float32() }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::StringImm(value.into())
    }

    pub fn bool_(value: bool) -> Self {
        Self::IntImm { value: value as i64, dtype: DType::bool_() }
    }

    pub fn var(var: &Arc<Var>) -> Self {
        Self::Var(Arc::clone(var))
    }

    // =========================================================================
    // Compound expressions
    // =========================================================================

    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Self::Binary(op, Box::new(lhs), Box::new(rhs))
    }

    pub fn cast(dtype: DType, value: Expr) -> Self {
        Self::Cast { dtype, value: Box::new(value) }
    }

    pub fn select(condition: Expr, true_value: Expr, false_value: Expr) -> Self {
        Self::Select { condition: Box::new(condition), true_value: Box::new(true_value), false_value: Box::new(false_value) }
    }

    pub fn load(buffer: &Arc<Var>, dtype: DType, index: Expr) -> Self {
        Self::BufferLoad { buffer: Arc::clone(buffer), dtype, index: Box::new(index) }
    }

    pub fn access_ptr(buffer: &Arc<Var>, dtype: DType, offset: Expr) -> Self {
        Self::AccessPtr { buffer: Arc::clone(buffer), dtype, offset: Box::new(offset) }
    }

    /// Call a catalog builtin. Arity is checked at lowering time, not here.
    pub fn builtin(op: Builtin, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::Call { op: CallOp::Builtin(op), args: args.into_iter().map(Arc::new).collect(), dtype: DType::handle() }
    }

    pub fn call_extern(name: impl Into<String>, dtype: DType, args: impl IntoIterator<Item = Expr>) -> Self {
        Self::Call { op: CallOp::Extern(name.into()), args: args.into_iter().map(Arc::new).collect(), dtype }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn dtype(&self) -> DType {
        match self {
            Self::IntImm { dtype, .. }
            | Self::FloatImm { dtype, .. }
            | Self::Cast { dtype, .. }
            | Self::BufferLoad { dtype, .. }
            | Self::Call { dtype, .. } => *dtype,
            Self::AccessPtr { .. } | Self::StringImm(_) => DType::handle(),
            Self::Var(v) => v.dtype,
            Self::Binary(op, lhs, _) => {
                if op.is_comparison() || op.is_logical() {
                    DType::bool_().with_lanes(lhs.dtype().lanes())
                } else {
                    lhs.dtype()
                }
            }
            Self::Not(inner) => inner.dtype(),
            Self::Select { true_value, .. } => true_value.dtype(),
        }
    }

    /// Integer literal value, if this is one.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::IntImm { value, .. } => Some(*value),
            _ => None,
        }
    }

    /// Literal zero (integer, boolean false or float 0.0).
    pub fn is_zero(&self) -> bool {
        match self {
            Self::IntImm { value, .. } => *value == 0,
            Self::FloatImm { value, .. } => *value == 0.0,
            _ => false,
        }
    }

    /// Short node kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::IntImm { .. } => "IntImm",
            Self::FloatImm { .. } => "FloatImm",
            Self::StringImm(_) => "StringImm",
            Self::Var(_) => "Var",
            Self::Binary(..) => "Binary",
            Self::Not(_) => "Not",
            Self::Cast { .. } => "Cast",
            Self::Select { .. } => "Select",
            Self::BufferLoad { .. } => "BufferLoad",
            Self::AccessPtr { .. } => "AccessPtr",
            Self::Call { .. } => "Call",
        }
    }
}

impl From<i64> for Expr {
    fn from(value: i64) -> Self {
        Self::int(value)
    }
}

impl From<&Arc<Var>> for Expr {
    fn from(var: &Arc<Var>) -> Self {
        Self::var(var)
    }
}
