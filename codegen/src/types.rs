//! Types for code generation.

use std::collections::BTreeMap;

/// Source format tag of generated modules.
pub const SOURCE_FORMAT_C: &str = "c";

/// Backend kind handled by this crate.
pub const TARGET_KIND_DLC: &str = "dlc";

/// Generated C translation unit plus the functions it exports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceModule {
    /// The generated C source.
    pub code: String,

    /// Source format tag, always [`SOURCE_FORMAT_C`].
    pub format: String,

    /// Exported function names in module order.
    pub function_names: Vec<String>,
}

impl SourceModule {
    pub fn new(code: String, function_names: Vec<String>) -> Self {
        Self { code, format: SOURCE_FORMAT_C.to_string(), function_names }
    }
}

/// Source module plus the artifact of the native compile hook, if one ran.
#[derive(Debug, Clone)]
pub struct BuiltModule {
    pub source: SourceModule,
    pub artifact: Option<Vec<u8>>,
}

/// Backend selector with free-form attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: String,
    pub attrs: BTreeMap<String, String>,
}

impl Target {
    pub fn new(kind: impl Into<String>) -> Self {
        Self { kind: kind.into(), attrs: BTreeMap::new() }
    }

    pub fn dlc() -> Self {
        Self::new(TARGET_KIND_DLC)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn is_dlc(&self) -> bool {
        self.kind == TARGET_KIND_DLC
    }
}

/// A single pass-configuration value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    Bool(bool),
    Int(i64),
    Str(String),
    List(Vec<String>),
}

/// Pass configuration handed to the compile hook, keyed by dotted names such
/// as `dlc.compile_flags`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassConfig {
    values: BTreeMap<String, ConfigValue>,
}

impl PassConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: ConfigValue) -> &mut Self {
        self.values.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    /// Boolean view; integers are truthy when non-zero.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.get(key)? {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::Int(i) => Some(*i != 0),
            ConfigValue::Str(s) => match s.as_str() {
                "1" | "true" | "True" => Some(true),
                "0" | "false" | "False" => Some(false),
                _ => None,
            },
            ConfigValue::List(_) => None,
        }
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        match self.get(key)? {
            ConfigValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// List view; a single string is returned as one entry.
    pub fn get_list(&self, key: &str) -> Option<Vec<String>> {
        match self.get(key)? {
            ConfigValue::List(items) => Some(items.clone()),
            ConfigValue::Str(s) => Some(vec![s.clone()]),
            _ => None,
        }
    }
}
