//! Toolchain configuration.
//!
//! [`ClangOptions`] is built with bon or read from the environment; pass
//! configuration entries (`dlc.*`) layer on top. [`ToolchainEnv`] snapshots
//! the process environment the compiler search depends on.

use std::path::PathBuf;
use std::str::FromStr;

use bon::bon;
use dlc_codegen::PassConfig;

use crate::error::{Error, UnknownFormatSnafu};

/// Pass-config key: extra compile flags (string or list of strings).
pub const KEY_COMPILE_FLAGS: &str = "dlc.compile_flags";
/// Pass-config key: log compiler output.
pub const KEY_VERBOSE: &str = "dlc.verbose";
/// Pass-config key: keep source and output in this directory.
pub const KEY_KERNELS_OUTPUT_DIR: &str = "dlc.kernels_output_dir";

/// Artifact produced by the compiler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[derive(strum::EnumIter, strum::IntoStaticStr)]
pub enum OutputFormat {
    /// Object file (`-c`).
    #[default]
    #[strum(serialize = "o")]
    Object,
    /// Assembly (`-S`).
    #[strum(serialize = "s")]
    Assembly,
    /// Textual LLVM IR (`-S -emit-llvm`).
    #[strum(serialize = "ll")]
    LlvmIr,
    /// LLVM bitcode (`-c -emit-llvm`).
    #[strum(serialize = "bc")]
    Bitcode,
}

impl OutputFormat {
    /// File extension of the artifact.
    pub fn extension(self) -> &'static str {
        self.into()
    }

    /// Compiler flags selecting this format.
    pub fn flags(self) -> &'static [&'static str] {
        match self {
            Self::Object => &["-c"],
            Self::Assembly => &["-S"],
            Self::LlvmIr => &["-S", "-emit-llvm"],
            Self::Bitcode => &["-c", "-emit-llvm"],
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "o" => Ok(Self::Object),
            "s" => Ok(Self::Assembly),
            "ll" => Ok(Self::LlvmIr),
            "bc" => Ok(Self::Bitcode),
            other => UnknownFormatSnafu { format: other }.fail(),
        }
    }
}

/// Options of one compiler invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClangOptions {
    /// Explicit compiler; skips discovery when set.
    pub clang_path: Option<PathBuf>,
    pub format: OutputFormat,
    /// Log the compiler output at info level.
    pub verbose: bool,
    /// Keep `dlc_kernel.c` and the artifact here instead of a temp dir.
    pub kernels_output_dir: Option<PathBuf>,
    /// Extra flags, each split with shell word rules.
    pub compile_flags: Vec<String>,
}

#[bon]
impl ClangOptions {
    /// Create clang options with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(into)] clang_path: Option<PathBuf>,
        #[builder(default)] format: OutputFormat,
        #[builder(default = false)] verbose: bool,
        #[builder(into)] kernels_output_dir: Option<PathBuf>,
        #[builder(default)] compile_flags: Vec<String>,
    ) -> Self {
        Self { clang_path, format, verbose, kernels_output_dir, compile_flags }
    }

    /// Create options from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `DLC_CLANG` - compiler path, bypassing discovery
    /// * `DLC_OUTPUT_FORMAT` - one of `o`, `s`, `ll`, `bc` (default `o`)
    /// * `DLC_VERBOSE=1` - log compiler output
    /// * `DLC_KERNELS_OUTPUT_DIR` - keep sources and artifacts there
    /// * `DLC_COMPILE_FLAGS` - extra flags
    pub fn from_env() -> Self {
        let clang_path = std::env::var_os("DLC_CLANG").map(PathBuf::from);
        let format = std::env::var("DLC_OUTPUT_FORMAT").ok().and_then(|s| s.parse().ok()).unwrap_or_default();
        let verbose = std::env::var("DLC_VERBOSE").is_ok_and(|v| v != "0");
        let kernels_output_dir = std::env::var_os("DLC_KERNELS_OUTPUT_DIR").map(PathBuf::from);
        let compile_flags = std::env::var("DLC_COMPILE_FLAGS").map(|f| vec![f]).unwrap_or_default();

        Self { clang_path, format, verbose, kernels_output_dir, compile_flags }
    }

    /// Layer `dlc.*` pass-config entries on top of these options.
    pub fn with_pass_config(mut self, config: &PassConfig) -> Self {
        if let Some(flags) = config.get_list(KEY_COMPILE_FLAGS) {
            self.compile_flags.extend(flags);
        }
        if let Some(verbose) = config.get_bool(KEY_VERBOSE) {
            self.verbose = verbose;
        }
        if let Some(dir) = config.get_str(KEY_KERNELS_OUTPUT_DIR) {
            self.kernels_output_dir = Some(PathBuf::from(dir));
        }
        self
    }
}

/// Installation paths searched after the environment-derived ones.
pub const SYSTEM_CLANG_PATHS: &[&str] = &["/usr/local/llvm/bin/clang", "/opt/llvm/bin/clang", "/usr/bin/clang"];

/// Vendor header tree added to the include path when present.
pub const SYNAPSE_INCLUDE: &str = "/usr/local/chipltech/synapse/include/external_includes";

/// Snapshot of everything compiler and header discovery reads.
#[derive(Debug, Clone, Default)]
pub struct ToolchainEnv {
    pub llvm_path: Option<PathBuf>,
    pub dlc_home: Option<PathBuf>,
    pub llvm_home: Option<PathBuf>,
    /// Directories of `$PATH`, in order.
    pub path: Vec<PathBuf>,
    pub system_paths: Vec<PathBuf>,
    pub synapse_include: Option<PathBuf>,
    pub custom_kernel_path: Option<PathBuf>,
    pub cwd: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl ToolchainEnv {
    /// Read the current process environment.
    pub fn from_process() -> Self {
        let var = |name: &str| std::env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from);
        Self {
            llvm_path: var("LLVM_PATH"),
            dlc_home: var("DLC_HOME"),
            llvm_home: var("LLVM_HOME"),
            path: std::env::var_os("PATH").map(|p| std::env::split_paths(&p).collect()).unwrap_or_default(),
            system_paths: SYSTEM_CLANG_PATHS.iter().map(PathBuf::from).collect(),
            synapse_include: Some(PathBuf::from(SYNAPSE_INCLUDE)),
            custom_kernel_path: var("DLC_CUSTOM_KERNEL_PATH"),
            cwd: std::env::current_dir().ok(),
            home: home::home_dir(),
        }
    }
}
