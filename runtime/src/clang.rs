//! DLC clang driver.
//!
//! Finds a clang built with the DLC backend, assembles the default include
//! and flag set, and compiles generated C source via
//! `clang -target dlc -O2 <format flags> <options> -o <out> <in.c>`.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use dlc_codegen::{CompileCallback, PassConfig, Target};
use snafu::{OptionExt, ResultExt, ensure};

use crate::config::{ClangOptions, OutputFormat, ToolchainEnv};
use crate::error::{
    ClangNotFoundSnafu, CompilationFailedSnafu, EmptyOutputSnafu, IoSnafu, KernelIncludeMissingSnafu,
    KernelIncludeNotFoundSnafu, Result, SpawnSnafu, TargetUnsupportedSnafu, UnterminatedQuoteSnafu,
};

/// Stem of the files written for each compilation.
pub const KERNEL_FILE_STEM: &str = "dlc_kernel";

/// Language standard passed to every compilation.
pub const C_STANDARD: &str = "-std=dc99";

/// Locate a clang binary: `$LLVM_PATH/build/bin`, `$LLVM_PATH/bin`,
/// `$DLC_HOME/bin` (or `$LLVM_HOME/bin`), `$PATH`, then system locations.
pub fn find_dlc_clang(env: &ToolchainEnv) -> Option<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(llvm) = &env.llvm_path {
        candidates.push(llvm.join("build").join("bin").join("clang"));
        candidates.push(llvm.join("bin").join("clang"));
    }
    if let Some(home) = env.dlc_home.as_ref().or(env.llvm_home.as_ref()) {
        candidates.push(home.join("bin").join("clang"));
    }
    candidates.extend(env.path.iter().map(|dir| dir.join("clang")));
    candidates.extend(env.system_paths.iter().cloned());

    candidates.into_iter().find(|p| p.is_file())
}

/// Whether `clang -print-targets` mentions the DLC backend.
pub fn supports_dlc_target(clang: &Path) -> bool {
    match Command::new(clang).arg("-print-targets").output() {
        Ok(out) => String::from_utf8_lossy(&out.stdout).to_lowercase().contains("dlc"),
        Err(e) => {
            tracing::debug!(clang = %clang.display(), error = %e, "dlc clang: -print-targets failed");
            false
        }
    }
}

/// Split a flag string with POSIX shell word rules: whitespace separates
/// words, single quotes are literal, double quotes allow `\` escapes.
pub fn split_words(flag: &str) -> Result<Vec<String>> {
    #[derive(PartialEq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote = Quote::None;
    let mut chars = flag.chars();

    while let Some(c) = chars.next() {
        match quote {
            Quote::Single => match c {
                '\'' => quote = Quote::None,
                c => current.push(c),
            },
            Quote::Double => match c {
                '"' => quote = Quote::None,
                '\\' => match chars.next() {
                    Some(n @ ('"' | '\\' | '$' | '`')) => current.push(n),
                    Some(n) => {
                        current.push('\\');
                        current.push(n);
                    }
                    None => return UnterminatedQuoteSnafu { flag }.fail(),
                },
                c => current.push(c),
            },
            Quote::None => match c {
                '\'' => {
                    quote = Quote::Single;
                    in_word = true;
                }
                '"' => {
                    quote = Quote::Double;
                    in_word = true;
                }
                '\\' => {
                    if let Some(n) = chars.next() {
                        current.push(n);
                    }
                    in_word = true;
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                c => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }

    ensure!(quote == Quote::None, UnterminatedQuoteSnafu { flag });
    if in_word {
        words.push(current);
    }
    Ok(words)
}

/// Default option set: language standard, vendor headers, kernel headers and
/// the user flags.
pub fn default_compile_options(env: &ToolchainEnv, compile_flags: &[String]) -> Result<Vec<String>> {
    let mut options = vec![C_STANDARD.to_string()];

    if let Some(synapse) = &env.synapse_include
        && synapse.exists()
    {
        options.push(format!("-I{}", synapse.display()));
    }

    options.push(format!("-I{}", kernel_include_dir(env)?.display()));

    for flag in compile_flags {
        options.extend(split_words(flag)?);
    }
    Ok(options)
}

/// `dlc_kernels` header directory.
fn kernel_include_dir(env: &ToolchainEnv) -> Result<PathBuf> {
    if let Some(root) = &env.custom_kernel_path {
        let include = root.join("dlc_kernels");
        ensure!(include.exists(), KernelIncludeMissingSnafu { root: root.clone(), include });
        return Ok(include);
    }

    let tail = Path::new("DLC_Custom_Kernel").join("dlc_kernels");
    let mut searched = Vec::new();
    if let Some(cwd) = &env.cwd {
        searched.push(cwd.join(&tail));
        if let Some(parent) = cwd.parent() {
            searched.push(parent.join(&tail));
        }
    }
    if let Some(home) = &env.home {
        searched.push(home.join("lanhu").join(&tail));
    }

    match searched.iter().find(|p| p.exists()) {
        Some(found) => Ok(found.clone()),
        None => KernelIncludeNotFoundSnafu { searched }.fail(),
    }
}

/// A clang with DLC support plus the options it runs with.
#[derive(Debug, Clone)]
pub struct DlcClang {
    clang: PathBuf,
    env: ToolchainEnv,
    options: ClangOptions,
}

impl DlcClang {
    /// Find and verify a DLC-capable clang.
    pub fn locate(env: ToolchainEnv, options: ClangOptions) -> Result<Self> {
        let clang = match &options.clang_path {
            Some(path) => path.clone(),
            None => find_dlc_clang(&env).context(ClangNotFoundSnafu)?,
        };
        ensure!(supports_dlc_target(&clang), TargetUnsupportedSnafu { clang });
        tracing::debug!(clang = %clang.display(), "dlc clang: located compiler");
        Ok(Self { clang, env, options })
    }

    /// [`DlcClang::locate`] using the process environment.
    pub fn from_env() -> Result<Self> {
        Self::locate(ToolchainEnv::from_process(), ClangOptions::from_env())
    }

    /// Use `clang` as-is, without the target check.
    pub fn with_path(clang: impl Into<PathBuf>, env: ToolchainEnv, options: ClangOptions) -> Self {
        Self { clang: clang.into(), env, options }
    }

    pub fn clang(&self) -> &Path {
        &self.clang
    }

    pub fn options(&self) -> &ClangOptions {
        &self.options
    }

    /// Argument vector after the compiler path.
    pub fn command_args(format: OutputFormat, options: &[String], output: &Path, input: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-target", "dlc", "-O2"].into_iter().map(OsString::from).collect();
        args.extend(format.flags().iter().map(OsString::from));
        args.extend(options.iter().map(OsString::from));
        args.push("-o".into());
        args.push(output.into());
        args.push(input.into());
        args
    }

    /// Compile `code` with the default options plus the configured flags.
    pub fn compile_source(&self, code: &str) -> Result<Vec<u8>> {
        let options = default_compile_options(&self.env, &self.options.compile_flags)?;
        self.compile_with(code, self.options.format, &options)
    }

    /// Compile `code` with exactly `options` and return the artifact bytes.
    pub fn compile_with(&self, code: &str, format: OutputFormat, options: &[String]) -> Result<Vec<u8>> {
        // Dropping the temp dir removes the files, so it lives until return.
        let tmp;
        let dir = match &self.options.kernels_output_dir {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .context(IoSnafu { action: format!("create output directory {}", dir.display()) })?;
                dir.clone()
            }
            None => {
                tmp = tempfile::tempdir().context(IoSnafu { action: "create temp directory" })?;
                tmp.path().to_path_buf()
            }
        };

        let src_path = dir.join(format!("{KERNEL_FILE_STEM}.c"));
        let out_path = dir.join(format!("{KERNEL_FILE_STEM}.{}", format.extension()));
        std::fs::write(&src_path, code).context(IoSnafu { action: format!("write {}", src_path.display()) })?;

        let args = Self::command_args(format, options, &out_path, &src_path);
        let command = std::iter::once(self.clang.as_os_str())
            .chain(args.iter().map(OsString::as_os_str))
            .map(|a| a.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ");
        tracing::debug!(command = %command, "dlc clang: compiling");

        let output = Command::new(&self.clang).args(&args).output().context(SpawnSnafu { clang: self.clang.clone() })?;
        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        log.push_str(&String::from_utf8_lossy(&output.stderr));

        if self.options.verbose {
            tracing::info!(output = %log, "dlc clang: compiler output");
        }

        ensure!(
            output.status.success(),
            CompilationFailedSnafu { c_source: code, output: log, command, status: output.status.code() }
        );

        let bytes = std::fs::read(&out_path).context(IoSnafu { action: format!("read {}", out_path.display()) })?;
        ensure!(!bytes.is_empty(), EmptyOutputSnafu { path: out_path });

        tracing::debug!(bytes = bytes.len(), format = format.extension(), "dlc clang: compiled");
        Ok(bytes)
    }
}

impl CompileCallback for DlcClang {
    /// Compile to an object file, honoring `dlc.compile_flags`, `dlc.verbose`
    /// and `dlc.kernels_output_dir`.
    fn compile(
        &self,
        code: &str,
        target: &Target,
        config: &PassConfig,
    ) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
        tracing::debug!(target = %target.kind, "dlc clang: compile callback");
        let options = self.options.clone().with_pass_config(config);
        let flags = default_compile_options(&self.env, &options.compile_flags)?;
        let driver = Self { clang: self.clang.clone(), env: self.env.clone(), options };
        Ok(driver.compile_with(code, OutputFormat::Object, &flags)?)
    }
}
