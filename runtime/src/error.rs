//! Error types for the DLC toolchain driver.

use std::path::PathBuf;

use snafu::Snafu;

/// Result type for toolchain operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Source generation failed before compilation.
    #[snafu(display("Codegen error: {source}"))]
    Codegen { source: dlc_codegen::Error },

    #[snafu(display(
        "DLC clang compiler not found. Set LLVM_PATH, DLC_HOME or LLVM_HOME, or make sure clang is on PATH"
    ))]
    ClangNotFound,

    #[snafu(display(
        "Clang at {} does not support the DLC target; check with `{} -print-targets | grep dlc`",
        clang.display(),
        clang.display()
    ))]
    TargetUnsupported { clang: PathBuf },

    /// `DLC_CUSTOM_KERNEL_PATH` points at a tree without `dlc_kernels`.
    #[snafu(display("DLC_CUSTOM_KERNEL_PATH is set to '{}' but '{}' does not exist", root.display(), include.display()))]
    KernelIncludeMissing { root: PathBuf, include: PathBuf },

    #[snafu(display(
        "DLC_Custom_Kernel/dlc_kernels directory not found; set DLC_CUSTOM_KERNEL_PATH. Searched: {}",
        searched.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
    ))]
    KernelIncludeNotFound { searched: Vec<PathBuf> },

    /// Compile flag with an unbalanced quote.
    #[snafu(display("Unterminated quote in compile flag: {flag}"))]
    UnterminatedQuote { flag: String },

    #[snafu(display("Unknown output format '{format}', expected one of o, s, ll, bc"))]
    UnknownFormat { format: String },

    #[snafu(display("Failed to {action}: {source}"))]
    Io { action: String, source: std::io::Error },

    #[snafu(display("Failed to run {}: {source}", clang.display()))]
    Spawn { clang: PathBuf, source: std::io::Error },

    #[snafu(display(
        "{c_source}\nCompilation error (exit {}):\n{output}\nCommand: {command}",
        status.map_or_else(|| "signal".to_string(), |s| s.to_string())
    ))]
    CompilationFailed { c_source: String, output: String, command: String, status: Option<i32> },

    #[snafu(display("Compilation error: empty result at {}", path.display()))]
    EmptyOutput { path: PathBuf },
}
