//! Collision-free C identifiers.

use std::collections::HashMap;

/// C keywords and identifiers the generated source must not shadow.
const RESERVED: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else", "enum", "extern", "float",
    "for", "goto", "if", "inline", "int", "long", "register", "restrict", "return", "short", "signed", "sizeof",
    "static", "struct", "switch", "typedef", "union", "unsigned", "void", "volatile", "while", "bool", "min", "max",
    "barrier",
];

/// Hands out unique identifiers derived from name hints.
///
/// The first request for a hint returns the (sanitized) hint itself; later
/// requests get `hint_1`, `hint_2`, ...
#[derive(Debug, Clone)]
pub struct NameSupply {
    counts: HashMap<String, usize>,
}

impl Default for NameSupply {
    fn default() -> Self {
        Self::new()
    }
}

impl NameSupply {
    pub fn new() -> Self {
        let counts = RESERVED.iter().map(|k| (k.to_string(), 0)).collect();
        Self { counts }
    }

    /// Unique identifier for `hint`.
    pub fn fresh(&mut self, hint: &str) -> String {
        let base = sanitize(hint);
        if !self.counts.contains_key(&base) {
            self.counts.insert(base.clone(), 0);
            return base;
        }
        loop {
            let count = self.counts.get_mut(&base).map(|c| {
                *c += 1;
                *c
            });
            let candidate = format!("{base}_{}", count.unwrap_or(1));
            if !self.counts.contains_key(&candidate) {
                self.counts.insert(candidate.clone(), 0);
                return candidate;
            }
        }
    }

    /// Reserve `prefix` together with every `prefix_<suffix>`. Fails without
    /// reserving anything when any of them is already taken.
    pub fn reserve_family(&mut self, prefix: &str, suffixes: &[&str]) -> bool {
        let derived: Vec<String> = suffixes.iter().map(|s| format!("{prefix}_{s}")).collect();
        if self.contains(prefix) || derived.iter().any(|d| self.contains(d)) {
            return false;
        }
        self.counts.insert(prefix.to_string(), 0);
        self.counts.extend(derived.into_iter().map(|d| (d, 0)));
        true
    }

    pub fn contains(&self, name: &str) -> bool {
        self.counts.contains_key(name)
    }
}

/// Replace characters that are not valid in a C identifier.
fn sanitize(hint: &str) -> String {
    let mut out: String = hint.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect();
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}
