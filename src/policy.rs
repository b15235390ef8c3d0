//! Naming convention for data members (and, when enabled, free functions).

pub const DEFAULT_PREFIX: &str = "m_";
pub const DEFAULT_FUNCTION_SUFFIX: &str = "_renamed";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingPolicy {
    prefix: String,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}

impl NamingPolicy {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_compliant(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }

    /// Corrected name for a field.
    ///
    /// `_foo` becomes `m_foo` and `foo` becomes `m_foo`. Compliant names are
    /// returned unchanged.
    pub fn correct(&self, name: &str) -> String {
        if self.is_compliant(name) {
            return name.to_string();
        }
        let stem = name.strip_prefix('_').unwrap_or(name);
        format!("{}{}", self.prefix, stem)
    }

    /// `Some(corrected)` when the name needs to change. Unnamed members
    /// (padding bit-fields, anonymous unions) have nothing to rename.
    pub fn rename(&self, name: &str) -> Option<String> {
        if name.is_empty() {
            return None;
        }
        let corrected = self.correct(name);
        (corrected != name).then_some(corrected)
    }
}

/// Free-function renaming. Off unless configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionPolicy {
    pub enabled: bool,
    pub suffix: String,
}

impl Default for FunctionPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            suffix: DEFAULT_FUNCTION_SUFFIX.to_string(),
        }
    }
}

impl FunctionPolicy {
    pub fn rename(&self, name: &str) -> Option<String> {
        if !self.enabled || name.is_empty() || self.suffix.is_empty() || name.ends_with(&self.suffix) {
            return None;
        }
        Some(format!("{name}{}", self.suffix))
    }
}
