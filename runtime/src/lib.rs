//! Native compilation of generated DLC sources.
//!
//! [`DlcClang`] locates a clang built with the DLC backend and compiles the C
//! translation units produced by `dlc-codegen`. It implements
//! [`dlc_codegen::CompileCallback`], so it plugs straight into
//! [`dlc_codegen::build`]:
//!
//! ```ignore
//! use dlc_runtime::DlcClang;
//!
//! let clang = DlcClang::from_env()?;
//! let built = dlc_codegen::build(&module, &Target::dlc(), &scopes, &config, Some(&clang))?;
//! ```

pub mod clang;
pub mod config;
pub mod error;


pub use clang::{DlcClang, default_compile_options, find_dlc_clang, split_words, supports_dlc_target};
pub use config::{ClangOptions, OutputFormat, ToolchainEnv};
pub use error::*;

use dlc_codegen::{BuiltModule, PassConfig, Target};
use dlc_ir::{IRModule, ScopeTable};
use snafu::ResultExt;

/// Generate and compile `module` with `clang` in one step.
pub fn build_module(
    module: &IRModule,
    scopes: &ScopeTable,
    config: &PassConfig,
    clang: &DlcClang,
) -> Result<BuiltModule> {
    dlc_codegen::build(module, &Target::dlc(), scopes, config, Some(clang)).context(CodegenSnafu)
}
