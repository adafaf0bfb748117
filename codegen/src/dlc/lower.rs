//! DLC lowering rules.
//!
//! The engine owns thread-extent and scope attributes, allocations, every
//! catalog builtin and type printing. Any other node goes to the fallback
//! printer, which routes its children back here.

use std::sync::Arc;

use dlc_dtype::DType;
use dlc_ir::scope::{LOCAL, SEMAPHORE, VMEM};
use dlc_ir::{AttrKey, AttrNode, Builtin, CallOp, Expr, OpFamily, Stmt, Var, registry};
use snafu::{OptionExt, ResultExt, ensure};

use super::CodeGenDlc;
use super::address_space::AddressSpace;
use super::vector::{self, BinaryOperands, ScalarOperands, UnaryOperands};
use crate::error::{
    AllocationOverflowSnafu, FalseAllocationConditionSnafu, InvalidCallSnafu, NonConstantAllocationSnafu,
    NonPositiveAllocationSnafu, Result,
};
use crate::traits::{Emitter, Fallback};

/// Printed in place of a zero semaphore flag.
pub const NULL_SEMAPHORE: &str = "NULL_SEMAPHORE";

/// Trailing arguments every `dlc_dma_new` call carries.
pub const DMA_FIXED_ARGS: &str = "128, 2";

/// Memory qualifier placed between the type and the name of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryQualifier {
    Vmem,
    Semaphore,
}

impl MemoryQualifier {
    /// Qualifier for a storage scope; scopes without one print bare.
    pub fn for_scope(scope: &str) -> Option<Self> {
        match scope {
            LOCAL | VMEM => Some(Self::Vmem),
            SEMAPHORE => Some(Self::Semaphore),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Vmem => "VMEM_SPACE",
            Self::Semaphore => "SEMAPHORE_SPACE",
        }
    }
}

/// Allocations whose identifier mentions `sync` or `flag` hold semaphores.
pub fn is_semaphore_name(name: &str) -> bool {
    name.contains("sync") || name.contains("flag")
}

/// DLC spelling of `dtype`.
pub fn print_type(fallback: &dyn Fallback, dtype: DType) -> Result<String> {
    if dtype.is_handle() {
        return Ok("void*".to_string());
    }
    if dtype.is_void() {
        return Ok("void".to_string());
    }
    if dtype == DType::int32() {
        return Ok("int".to_string());
    }
    if dtype.is_vector() {
        return Ok(format!("{}{}", fallback.print_type(dtype.with_lanes(1))?, dtype.lanes()));
    }
    fallback.print_type(dtype)
}

/// Device function implementing `op`. Vector families share the `_b`
/// primitive between their tensor and scalar forms.
pub const fn device_symbol(op: Builtin) -> &'static str {
    match op {
        Builtin::Add | Builtin::AddScalar => "v_f32_add_b",
        Builtin::Sub | Builtin::SubScalar => "v_f32_sub_b",
        Builtin::Mul | Builtin::MulScalar => "v_f32_mul_b",
        Builtin::Div | Builtin::DivScalar => "v_f32_div_b",
        Builtin::Abs => "v_f32_abs",
        Builtin::Exp => "v_f32_exp",
        Builtin::Log => "v_f32_log",
        Builtin::Sqrt => "v_f32_sqrt",
        Builtin::Rsqrt => "v_f32_rsqrt",
        Builtin::Relu => "v_f32_relu",
        Builtin::Copy => "vmem_copy",
        Builtin::Fill => "vmem_fill",
        Builtin::Dma => "dlc_dma_new",
        Builtin::Sync => "dlc_sync_new",
        Builtin::SyncDone => "dlc_sync_done_new",
        Builtin::SyncGte => "dlc_sync_gte_new",
        Builtin::SyncClear => "dlc_sync_clear_new",
        Builtin::Barrier => "barrier",
    }
}

/// Storage-scope prefix for declarations. DLC places memory qualifiers on
/// allocations instead, so every scope prints empty.
pub fn print_storage_scope(_scope: &str) -> &'static str {
    ""
}

impl CodeGenDlc {
    pub(crate) fn lower_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        tracing::trace!(kind = stmt.kind(), "dlc codegen: stmt");
        match stmt {
            Stmt::Attr { key, node, value, body } => match key {
                AttrKey::ThreadExtent => self.lower_thread_extent(node, value, body),
                AttrKey::StorageScope | AttrKey::ComputeScope | AttrKey::ResourceScope => self.print_stmt(body),
                AttrKey::Other(_) => self.fallback().print_stmt(self, stmt),
            },
            Stmt::Allocate { buffer, dtype, extents, condition, body } => {
                self.lower_allocate(buffer, *dtype, extents, condition, body)
            }
            _ => self.fallback().print_stmt(self, stmt),
        }
    }

    pub(crate) fn lower_expr(&mut self, expr: &Expr) -> Result<String> {
        match expr {
            Expr::Call { op: CallOp::Builtin(op), args, .. } => self.lower_builtin(*op, args),
            _ => self.fallback().print_expr(self, expr),
        }
    }

    /// Bound thread variables become plain locals pinned to zero; the device
    /// runs one compute instance per kernel.
    fn lower_thread_extent(&mut self, node: &AttrNode, extent: &Expr, body: &Stmt) -> Result<()> {
        if let AttrNode::IterVar(iv) = node
            && !iv.thread_tag.is_empty()
        {
            let ty = self.print_type(iv.var.dtype)?;
            let vid = self.var_id(&iv.var);
            let extent = self.print_expr(extent)?;
            self.emit_line(&format!("{ty} {vid} = 0;  // Thread variable (extent: {extent})"));
        }
        self.print_stmt(body)
    }

    fn lower_allocate(
        &mut self,
        buffer: &Var,
        dtype: DType,
        extents: &[Expr],
        condition: &Expr,
        body: &Stmt,
    ) -> Result<()> {
        let vid = self.var_id(buffer);
        ensure!(!condition.is_zero(), FalseAllocationConditionSnafu { buffer: vid.clone() });

        let scope = self.scope_of(buffer).or(buffer.annotated_scope()).unwrap_or(LOCAL).to_string();
        let mut qualifier = MemoryQualifier::for_scope(&scope);
        if is_semaphore_name(&vid) {
            if qualifier != Some(MemoryQualifier::Semaphore) {
                tracing::warn!(buffer = %vid, scope = %scope, "dlc codegen: allocation name implies semaphore memory");
            }
            qualifier = Some(MemoryQualifier::Semaphore);
        }

        let dims = Stmt::constant_extents(extents).context(NonConstantAllocationSnafu { buffer: vid.clone() })?;
        if let Some(&size) = dims.iter().find(|&&d| d <= 0) {
            return NonPositiveAllocationSnafu { buffer: vid, size }.fail();
        }
        let size = dims
            .iter()
            .try_fold(1i64, |acc, &d| acc.checked_mul(d))
            .context(AllocationOverflowSnafu { buffer: vid.clone() })?;

        let ty = self.print_type(dtype)?;
        let decl = match qualifier {
            Some(q) => format!("{ty} {} {vid}[{size}];", q.as_str()),
            None => format!("{ty} {vid}[{size}];"),
        };
        self.emit_line(&decl);
        self.register_handle_type(buffer, dtype);
        self.print_stmt(body)
    }

    fn lower_builtin(&mut self, op: Builtin, args: &[Arc<Expr>]) -> Result<String> {
        registry().check_arity(op, args.len()).context(InvalidCallSnafu { op: op.name() })?;
        tracing::trace!(op = op.name(), "dlc codegen: builtin");

        let symbol = device_symbol(op);
        match op.family() {
            OpFamily::Binary => self.lower_binary(symbol, args),
            OpFamily::Scalar => self.lower_scalar(symbol, args),
            // Operands are the trailing (dst, src, size); abs carries a
            // leading template marker.
            OpFamily::Unary => self.lower_unary(symbol, &args[args.len() - 3..]),
            OpFamily::Dma => self.lower_dma(args),
            OpFamily::Memory | OpFamily::Sync => self.lower_plain_call(symbol, args),
        }
    }

    fn render_args(&mut self, args: &[Arc<Expr>]) -> Result<Vec<String>> {
        args.iter().map(|a| self.print_expr(a)).collect()
    }

    fn lower_plain_call(&mut self, name: &str, args: &[Arc<Expr>]) -> Result<String> {
        Ok(format!("{name}({})", self.render_args(args)?.join(", ")))
    }

    /// `(marker, dst, lhs, rhs, size)`
    fn lower_binary(&mut self, primitive: &str, args: &[Arc<Expr>]) -> Result<String> {
        let a = self.render_args(&args[1..])?;
        let prefix = self.fresh_vector_prefix();
        let tiles = literal_size(&args[4]).map(|s| vector::tiles(s).count());
        tracing::debug!(primitive, prefix = %prefix, tiles, "dlc codegen: binary vector op");
        let operands = BinaryOperands { dst: &a[0], lhs: &a[1], rhs: &a[2], size: &a[3] };
        Ok(vector::emit_binary(primitive, &prefix, &self.indent(), operands))
    }

    /// `(marker, dst, src, scalar, size)`
    fn lower_scalar(&mut self, primitive: &str, args: &[Arc<Expr>]) -> Result<String> {
        let a = self.render_args(&args[1..])?;
        let prefix = self.fresh_vector_prefix();
        let tiles = literal_size(&args[4]).map(|s| vector::tiles(s).count());
        tracing::debug!(primitive, prefix = %prefix, tiles, "dlc codegen: scalar vector op");
        let operands = ScalarOperands { dst: &a[0], src: &a[1], scalar: &a[2], size: &a[3] };
        Ok(vector::emit_scalar(primitive, &prefix, &self.indent(), operands))
    }

    /// `(dst, src, size)`
    fn lower_unary(&mut self, primitive: &str, args: &[Arc<Expr>]) -> Result<String> {
        let a = self.render_args(args)?;
        let prefix = self.fresh_vector_prefix();
        let iterations = literal_size(&args[2]).map(vector::unary_iterations);
        tracing::debug!(primitive, prefix = %prefix, iterations, "dlc codegen: unary vector op");
        let operands = UnaryOperands { dst: &a[0], src: &a[1], size: &a[2] };
        let unroll = self.options().unary_unroll;
        Ok(vector::emit_unary(primitive, &prefix, &self.indent(), unroll, operands))
    }

    /// `(src, src_space, dst, dst_space, len, src_stride, dst_stride, flag0, flag1)`
    fn lower_dma(&mut self, args: &[Arc<Expr>]) -> Result<String> {
        let src = self.print_expr(&args[0])?;
        let src_space = self.print_address_space(&args[1])?;
        let dst = self.print_expr(&args[2])?;
        let dst_space = self.print_address_space(&args[3])?;
        let len = self.print_expr(&args[4])?;
        let src_stride = self.print_expr(&args[5])?;
        let dst_stride = self.print_expr(&args[6])?;
        let flag0 = self.print_flag(&args[7])?;
        let flag1 = self.print_flag(&args[8])?;
        Ok(format!(
            "{}({src}, {src_space}, {dst}, {dst_space}, {len}, {src_stride}, {dst_stride}, {flag0}, {flag1}, {DMA_FIXED_ARGS})",
            device_symbol(Builtin::Dma)
        ))
    }

    /// Integer literals map through the address-space table; anything else
    /// is printed as an expression.
    fn print_address_space(&mut self, expr: &Expr) -> Result<String> {
        match expr.as_int() {
            Some(code) => Ok(AddressSpace::render_code(code)),
            None => self.print_expr(expr),
        }
    }

    fn print_flag(&mut self, expr: &Expr) -> Result<String> {
        match expr.as_int() {
            Some(0) => Ok(NULL_SEMAPHORE.to_string()),
            _ => self.print_expr(expr),
        }
    }
}

fn literal_size(expr: &Expr) -> Option<usize> {
    expr.as_int().and_then(|v| usize::try_from(v).ok())
}
