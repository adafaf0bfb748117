//! Seams between the DLC lowering engine, the generic C printer and the
//! native toolchain.

use dlc_dtype::DType;
use dlc_ir::{Expr, Stmt, Var};

use crate::error::Result;
use crate::types::{PassConfig, Target};

/// The lowering engine as seen by a [`Fallback`].
///
/// Child nodes printed through an `Emitter` are routed back through the
/// engine, so target-specific handling applies at every depth.
pub trait Emitter {
    /// Lower a statement into the body stream.
    fn print_stmt(&mut self, stmt: &Stmt) -> Result<()>;

    /// Render an expression to C text.
    fn print_expr(&mut self, expr: &Expr) -> Result<String>;

    /// C spelling of `dtype`.
    fn print_type(&self, dtype: DType) -> Result<String>;

    /// Identifier of `var`, allocated from the function's name supply on
    /// first encounter.
    fn var_id(&mut self, var: &Var) -> String;

    /// Element type registered for a handle variable.
    fn handle_type(&self, var: &Var) -> Option<DType>;

    /// Current indentation prefix.
    fn indent(&self) -> String;

    /// Append `line` at the current indentation, followed by a newline.
    fn emit_line(&mut self, line: &str);

    fn begin_scope(&mut self);

    fn end_scope(&mut self);
}

/// Generic printer for nodes the DLC engine does not own.
pub trait Fallback: Send + Sync {
    fn print_stmt(&self, emitter: &mut dyn Emitter, stmt: &Stmt) -> Result<()>;

    fn print_expr(&self, emitter: &mut dyn Emitter, expr: &Expr) -> Result<String>;

    /// C spelling of a scalar (or otherwise target-neutral) type.
    fn print_type(&self, dtype: DType) -> Result<String>;
}

/// Native compiler hook invoked by [`crate::build`] after source generation.
pub trait CompileCallback {
    /// Compile `code` and return the produced artifact.
    fn compile(
        &self,
        code: &str,
        target: &Target,
        config: &PassConfig,
    ) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>>;
}
