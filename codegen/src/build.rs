//! Module entry points.

use std::sync::Arc;

use dlc_ir::{BaseFunc, IRModule, ScopeTable};
use snafu::{ResultExt, ensure};

use crate::dlc::CodeGenDlc;
use crate::error::{CompileSnafu, NotPrimFuncSnafu, Result, UnsupportedTargetSnafu};
use crate::options::CodegenOptions;
use crate::traits::{CompileCallback, Fallback};
use crate::types::{BuiltModule, PassConfig, SourceModule, Target};

/// Generate the C translation unit for every function of `module`, in order.
///
/// Each call runs a fresh generator, so repeated builds of the same module
/// produce identical text.
pub fn build_dlc(module: &IRModule, target: &Target, scopes: &ScopeTable) -> Result<SourceModule> {
    build_dlc_with(module, target, scopes, CodegenOptions::default())
}

/// [`build_dlc`] with explicit generator options.
pub fn build_dlc_with(
    module: &IRModule,
    target: &Target,
    scopes: &ScopeTable,
    options: CodegenOptions,
) -> Result<SourceModule> {
    generate(module, target, CodeGenDlc::new(options, scopes.clone()))
}

/// [`build_dlc_with`] printing the node kinds the DLC engine does not own
/// through `fallback` instead of the built-in C printer.
pub fn build_dlc_with_fallback(
    module: &IRModule,
    target: &Target,
    scopes: &ScopeTable,
    options: CodegenOptions,
    fallback: Arc<dyn Fallback>,
) -> Result<SourceModule> {
    generate(module, target, CodeGenDlc::new(options, scopes.clone()).with_fallback(fallback))
}

fn generate(module: &IRModule, target: &Target, mut cg: CodeGenDlc) -> Result<SourceModule> {
    ensure!(target.is_dlc(), UnsupportedTargetSnafu { kind: target.kind.clone() });

    cg.init();
    for (name, func) in module.functions() {
        let BaseFunc::Prim(func) = func else {
            return NotPrimFuncSnafu { name }.fail();
        };
        cg.add_function(name, func)?;
    }

    let function_names = cg.function_names().to_vec();
    let code = cg.finish();
    tracing::debug!(functions = function_names.len(), bytes = code.len(), "dlc codegen: module generated");
    Ok(SourceModule::new(code, function_names))
}

/// Generate the module and, when `callback` is present, compile it natively.
pub fn build(
    module: &IRModule,
    target: &Target,
    scopes: &ScopeTable,
    config: &PassConfig,
    callback: Option<&dyn CompileCallback>,
) -> Result<BuiltModule> {
    let source = build_dlc(module, target, scopes)?;
    let artifact = match callback {
        Some(cb) => {
            let bytes = cb.compile(&source.code, target, config).context(CompileSnafu)?;
            tracing::debug!(bytes = bytes.len(), "dlc codegen: native compile finished");
            Some(bytes)
        }
        None => None,
    };
    Ok(BuiltModule { source, artifact })
}
