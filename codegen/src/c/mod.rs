//! Generic C printer.
//!
//! [`CFallback`] prints every statement and expression kind that carries no
//! target-specific meaning: control flow, scalar arithmetic, buffer access,
//! literals and plain extern calls. All children are printed back through the
//! [`Emitter`], so a target engine sees nested nodes first.

pub mod ops;
pub mod types;

use dlc_dtype::DType;
use dlc_ir::{CallOp, Expr, ForKind, Stmt};
use snafu::OptionExt;

use crate::error::{Result, UnsupportedOpSnafu, UnsupportedStmtSnafu, UnsupportedTypeSnafu};
use crate::traits::{Emitter, Fallback};

use self::ops::{render_binary, render_call, render_condition};
use self::types::{c_float, c_int, c_scalar, c_string};

/// Default [`Fallback`] producing portable C.
#[derive(Debug, Clone, Copy, Default)]
pub struct CFallback;

impl CFallback {
    pub fn new() -> Self {
        Self
    }
}

impl Fallback for CFallback {
    fn print_stmt(&self, e: &mut dyn Emitter, stmt: &Stmt) -> Result<()> {
        match stmt {
            Stmt::Seq(stmts) => {
                for s in stmts {
                    e.print_stmt(s)?;
                }
            }

            Stmt::Evaluate(value) => {
                // Bare literals are no-ops.
                if value.as_int().is_some() {
                    return Ok(());
                }
                let text = e.print_expr(value)?;
                if !text.is_empty() {
                    e.emit_line(&format!("{text};"));
                }
            }

            Stmt::For { var, min, extent, kind, body } => {
                let ty = e.print_type(var.dtype)?;
                let vid = e.var_id(var);
                let start = e.print_expr(min)?;
                let end = if min.is_zero() {
                    e.print_expr(extent)?
                } else {
                    format!("({start} + {})", e.print_expr(extent)?)
                };
                if *kind == ForKind::Unrolled {
                    e.emit_line("#pragma unroll");
                }
                e.emit_line(&format!("for ({ty} {vid} = {start}; {vid} < {end}; ++{vid}) {{"));
                e.begin_scope();
                e.print_stmt(body)?;
                e.end_scope();
                e.emit_line("}");
            }

            Stmt::IfThenElse { condition, then_case, else_case } => {
                let cond = e.print_expr(condition)?;
                e.emit_line(&format!("if {} {{", render_condition(&cond)));
                e.begin_scope();
                e.print_stmt(then_case)?;
                e.end_scope();
                if let Some(else_case) = else_case {
                    e.emit_line("} else {");
                    e.begin_scope();
                    e.print_stmt(else_case)?;
                    e.end_scope();
                }
                e.emit_line("}");
            }

            Stmt::LetStmt { var, value, body } => {
                let rhs = e.print_expr(value)?;
                let ty = e.print_type(var.dtype)?;
                let vid = e.var_id(var);
                e.emit_line(&format!("{ty} {vid} = {rhs};"));
                e.print_stmt(body)?;
            }

            Stmt::BufferStore { buffer, value, index } => {
                let rhs = e.print_expr(value)?;
                let target = buffer_ref(e, buffer, value.dtype(), index)?;
                e.emit_line(&format!("{target} = {rhs};"));
            }

            // Attributes without a target meaning are transparent.
            Stmt::Attr { body, .. } => e.print_stmt(body)?,

            Stmt::Allocate { .. } => return UnsupportedStmtSnafu { kind: stmt.kind() }.fail(),
        }
        Ok(())
    }

    fn print_expr(&self, e: &mut dyn Emitter, expr: &Expr) -> Result<String> {
        let text = match expr {
            Expr::IntImm { value, dtype } => c_int(*value, *dtype, &e.print_type(*dtype)?),
            Expr::FloatImm { value, dtype } => c_float(*value, *dtype),
            Expr::StringImm(s) => c_string(s),
            Expr::Var(var) => e.var_id(var),
            Expr::Binary(op, lhs, rhs) => {
                let l = e.print_expr(lhs)?;
                let r = e.print_expr(rhs)?;
                render_binary(*op, &l, &r, lhs.dtype())
            }
            Expr::Not(inner) => format!("(!{})", e.print_expr(inner)?),
            Expr::Cast { dtype, value } => {
                let inner = e.print_expr(value)?;
                if value.dtype() == *dtype { inner } else { format!("(({}){inner})", e.print_type(*dtype)?) }
            }
            Expr::Select { condition, true_value, false_value } => {
                let c = e.print_expr(condition)?;
                let t = e.print_expr(true_value)?;
                let f = e.print_expr(false_value)?;
                format!("({c} ? {t} : {f})")
            }
            Expr::BufferLoad { buffer, dtype, index } => buffer_ref(e, buffer, *dtype, index)?,
            Expr::AccessPtr { buffer, dtype, offset } => {
                format!("(&({}))", buffer_ref(e, buffer, *dtype, offset)?)
            }
            Expr::Call { op: CallOp::Extern(name), args, .. } => {
                let args = args.iter().map(|a| e.print_expr(a)).collect::<Result<Vec<_>>>()?;
                render_call(name, &args)
            }
            Expr::Call { op: CallOp::Builtin(op), .. } => {
                return UnsupportedOpSnafu { op: op.name() }.fail();
            }
        };
        Ok(text)
    }

    fn print_type(&self, dtype: DType) -> Result<String> {
        if dtype.is_vector() {
            return UnsupportedTypeSnafu { dtype }.fail();
        }
        c_scalar(dtype.base()).map(str::to_string).context(UnsupportedTypeSnafu { dtype })
    }
}

/// `buf[index]`, cast through a typed pointer when the access type differs
/// from the element type registered for the buffer.
fn buffer_ref(e: &mut dyn Emitter, buffer: &dlc_ir::Var, dtype: DType, index: &Expr) -> Result<String> {
    let vid = e.var_id(buffer);
    let idx = e.print_expr(index)?;
    match e.handle_type(buffer) {
        Some(elem) if elem != dtype && !dtype.is_handle() => {
            Ok(format!("(({}*){vid})[{idx}]", e.print_type(dtype)?))
        }
        _ => Ok(format!("{vid}[{idx}]")),
    }
}
