//! C source generation for the DLC accelerator.
//!
//! This crate lowers a [`dlc_ir::IRModule`] of kernel functions into a single C
//! translation unit for the DLC clang toolchain.
//!
//! # Architecture
//!
//! - **Traits**: [`Emitter`] (the lowering engine as seen by a fallback) and
//!   [`Fallback`] (generic printer for node kinds the DLC engine does not own)
//! - **C**: [`c::CFallback`], the generic statement/expression/type printer
//! - **DLC**: [`dlc::CodeGenDlc`], the lowering engine and module assembler
//! - **Build**: [`build_dlc`] / [`build`], the module entry points;
//!   [`build_dlc_with_fallback`] swaps in another generic printer
//!
//! # Usage
//!
//! ```ignore
//! use dlc_codegen::{Target, build_dlc};
//!
//! let source = build_dlc(&module, &Target::dlc(), &scopes)?;
//! println!("{}", source.code);
//! ```

pub mod build;
pub mod c;
pub mod dlc;
pub mod error;
pub mod name_supply;
pub mod options;
pub mod traits;
pub mod types;


pub use build::{build, build_dlc, build_dlc_with, build_dlc_with_fallback};
pub use error::*;
pub use options::CodegenOptions;
pub use traits::*;
pub use types::*;
