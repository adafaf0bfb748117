//! DLC source generator.
//!
//! [`CodeGenDlc`] owns the two output streams of a translation unit (the
//! preamble and the function bodies) and the per-function naming state. The
//! DLC-specific lowering lives in [`lower`]; everything else is delegated to
//! a [`Fallback`].
//!
//! # Output shape
//!
//! ```c
//! // DLC Target - Generated C source for DLC toolchain
//! // ...includes...
//!
//! void kernel(float* restrict A, float* restrict B, int n) {
//!   ...
//! }
//!
//! ```

pub mod address_space;
pub mod lower;
pub mod vector;

use std::collections::HashMap;
use std::sync::Arc;

use dlc_dtype::DType;
use dlc_ir::scope::GRID_CONSTANT;
use dlc_ir::{PrimFunc, ScopeTable, Stmt, Var, VarId};

use crate::c::CFallback;
use crate::error::Result;
use crate::name_supply::NameSupply;
use crate::options::CodegenOptions;
use crate::traits::{Emitter, Fallback};

pub use self::address_space::AddressSpace;

/// Preamble written once per translation unit.
pub const PREAMBLE: &str = "\
// DLC Target - Generated C source for DLC toolchain
// Compile with: clang -target dlc -c <file>.c

#include \"typehint.h\"
#include \"ldst.h\"
#include \"kernel_arg_types.h\"

";

/// Lowers kernel functions into one C translation unit.
pub struct CodeGenDlc {
    options: CodegenOptions,
    scopes: ScopeTable,
    fallback: Arc<dyn Fallback>,

    /// Preamble and declarations.
    decl_stream: String,
    /// Function definitions in add order.
    stream: String,
    function_names: Vec<String>,

    // Per-function state.
    names: NameSupply,
    var_ids: HashMap<VarId, String>,
    handle_types: HashMap<VarId, DType>,
    depth: usize,

    /// Counter behind fresh vector prefixes; never reset.
    vector_counter: usize,
}

impl CodeGenDlc {
    pub fn new(options: CodegenOptions, scopes: ScopeTable) -> Self {
        Self {
            options,
            scopes,
            fallback: Arc::new(CFallback::new()),
            decl_stream: String::new(),
            stream: String::new(),
            function_names: Vec::new(),
            names: NameSupply::new(),
            var_ids: HashMap::new(),
            handle_types: HashMap::new(),
            depth: 0,
            vector_counter: 0,
        }
    }

    /// Replace the generic printer.
    pub fn with_fallback(mut self, fallback: Arc<dyn Fallback>) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn options(&self) -> &CodegenOptions {
        &self.options
    }

    /// Start a translation unit: write the preamble.
    pub fn init(&mut self) {
        if self.options.emit_header {
            self.decl_stream.push_str(PREAMBLE);
        }
    }

    /// Lower `func` and append its definition. `name` is used when the
    /// function carries no `global_symbol`.
    pub fn add_function(&mut self, name: &str, func: &PrimFunc) -> Result<()> {
        self.reset_function_state();

        let symbol = func.attrs.global_symbol.clone().unwrap_or_else(|| name.to_string());
        tracing::debug!(function = %symbol, params = func.params.len(), "dlc codegen: lowering function");

        let ret = self.print_type(func.ret_type)?;
        let params = func.params.iter().map(|p| self.print_param(func, p)).collect::<Result<Vec<_>>>()?;

        self.stream.push_str(&format!("{ret} {symbol}({}) {{\n", params.join(", ")));
        self.begin_scope();
        self.print_stmt(&func.body)?;
        self.end_scope();
        self.stream.push_str("}\n\n");

        self.function_names.push(symbol);
        Ok(())
    }

    /// Exported names in add order.
    pub fn function_names(&self) -> &[String] {
        &self.function_names
    }

    /// Preamble followed by every function definition.
    pub fn finish(self) -> String {
        let mut code = self.decl_stream;
        code.push_str(&self.stream);
        code
    }

    fn reset_function_state(&mut self) {
        self.names = NameSupply::new();
        self.var_ids.clear();
        self.handle_types.clear();
        self.depth = 0;
    }

    /// One entry of the parameter list.
    fn print_param(&mut self, func: &PrimFunc, param: &Arc<Var>) -> Result<String> {
        let vid = self.var_id(param);
        if !param.is_handle() {
            return Ok(format!("{} {vid}", self.print_type(param.dtype)?));
        }

        if param.annotated_scope() == Some(GRID_CONSTANT)
            && let Some(elem) = param.element_type()
        {
            return Ok(format!("const {}* {vid}", self.print_type(elem)?));
        }

        let prefix = self.scopes.get(param).map(lower::print_storage_scope).unwrap_or_default();
        let ty = match param.element_type() {
            Some(elem) => {
                self.handle_types.insert(param.id, elem);
                format!("{}*", self.print_type(elem)?)
            }
            None => "void*".to_string(),
        };
        let restrict = if func.attrs.no_alias && !func.is_restrict_exempt(param) {
            format!(" {}", self.options.restrict_keyword)
        } else {
            String::new()
        };
        Ok(format!("{prefix}{ty}{restrict} {vid}"))
    }

    /// Fresh identifier prefix for one vector block. The prefix and every
    /// register derived from it are reserved in the function's name supply;
    /// counter values whose names are already taken are skipped.
    pub(crate) fn fresh_vector_prefix(&mut self) -> String {
        loop {
            let prefix = format!("_dlc_vec{}", self.vector_counter);
            self.vector_counter += 1;
            if self.names.reserve_family(&prefix, vector::REGISTER_SUFFIXES) {
                return prefix;
            }
        }
    }

    pub(crate) fn scope_of(&self, var: &Var) -> Option<&str> {
        self.scopes.get(var)
    }

    pub(crate) fn register_handle_type(&mut self, var: &Var, dtype: DType) {
        self.handle_types.insert(var.id, dtype);
    }

    pub(crate) fn fallback(&self) -> Arc<dyn Fallback> {
        Arc::clone(&self.fallback)
    }
}

impl Emitter for CodeGenDlc {
    fn print_stmt(&mut self, stmt: &Stmt) -> Result<()> {
        self.lower_stmt(stmt)
    }

    fn print_expr(&mut self, expr: &dlc_ir::Expr) -> Result<String> {
        self.lower_expr(expr)
    }

    fn print_type(&self, dtype: DType) -> Result<String> {
        lower::print_type(self.fallback.as_ref(), dtype)
    }

    fn var_id(&mut self, var: &Var) -> String {
        if let Some(vid) = self.var_ids.get(&var.id) {
            return vid.clone();
        }
        let vid = self.names.fresh(&var.name);
        self.var_ids.insert(var.id, vid.clone());
        vid
    }

    fn handle_type(&self, var: &Var) -> Option<DType> {
        self.handle_types.get(&var.id).copied()
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }

    fn emit_line(&mut self, line: &str) {
        let indent = self.indent();
        self.stream.push_str(&indent);
        self.stream.push_str(line);
        self.stream.push('\n');
    }

    fn begin_scope(&mut self) {
        self.depth += 1;
    }

    fn end_scope(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
