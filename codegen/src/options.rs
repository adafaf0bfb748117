//! Code generation options.
//!
//! Typed configuration with bon builders and environment variable fallbacks.

use bon::bon;

/// Knobs of the DLC source generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Keyword printed after non-aliasing pointer parameters.
    pub restrict_keyword: String,

    /// Partial unroll factor requested for unary vector loops.
    pub unary_unroll: usize,

    /// Emit the banner and `#include` block at the top of the module.
    pub emit_header: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self { restrict_keyword: "restrict".to_string(), unary_unroll: 2, emit_header: true }
    }
}

#[bon]
impl CodegenOptions {
    /// Create codegen options with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(default = "restrict".to_string(), into)] restrict_keyword: String,
        #[builder(default = 2)] unary_unroll: usize,
        #[builder(default = true)] emit_header: bool,
    ) -> Self {
        Self { restrict_keyword, unary_unroll, emit_header }
    }

    /// Create options from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `DLC_RESTRICT_KEYWORD` - restrict spelling (default `restrict`)
    /// * `DLC_UNARY_UNROLL=N` - unroll factor of unary loops (default 2)
    /// * `DLC_NO_HEADER=1` - omit the banner and includes
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let restrict_keyword = std::env::var("DLC_RESTRICT_KEYWORD").unwrap_or(defaults.restrict_keyword);
        let unary_unroll = std::env::var("DLC_UNARY_UNROLL")
            .ok()
            .and_then(|s| s.parse().ok())
            .filter(|n: &usize| *n > 0)
            .unwrap_or(defaults.unary_unroll);
        let emit_header = std::env::var("DLC_NO_HEADER").is_err();

        Self { restrict_keyword, unary_unroll, emit_header }
    }
}
