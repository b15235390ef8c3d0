use crate::policy::{FunctionPolicy, NamingPolicy, DEFAULT_FUNCTION_SUFFIX, DEFAULT_PREFIX};
use crate::source::LocationMode;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

/// Root used when neither the config file nor the command line names one.
pub const DEFAULT_ROOT_DIR: &str = "src";
pub const DEFAULT_OUTPUT_DIR: &str = "prefix-renamed";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RenameConfig {
    /// Substring matched against the directory of each file.
    pub root_dir: String,
    pub prefix: String,
    pub output_dir: PathBuf,
    pub location_mode: LocationMode,
    /// Base for relative paths of files the front end did not embed.
    pub source_dir: PathBuf,
    pub functions: FunctionsConfig,
}

impl Default for RenameConfig {
    fn default() -> Self {
        Self {
            root_dir: DEFAULT_ROOT_DIR.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            location_mode: LocationMode::default(),
            source_dir: PathBuf::from("."),
            functions: FunctionsConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FunctionsConfig {
    pub rename: bool,
    pub suffix: String,
}

impl Default for FunctionsConfig {
    fn default() -> Self {
        Self {
            rename: false,
            suffix: DEFAULT_FUNCTION_SUFFIX.to_string(),
        }
    }
}

impl RenameConfig {
    pub fn naming_policy(&self) -> NamingPolicy {
        NamingPolicy::new(self.prefix.clone())
    }

    pub fn function_policy(&self) -> FunctionPolicy {
        FunctionPolicy {
            enabled: self.functions.rename,
            suffix: self.functions.suffix.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.root_dir.is_empty() {
            issues.push(ValidationIssue::MissingField { field: "root_dir" });
        }

        if self.prefix.is_empty() {
            issues.push(ValidationIssue::MissingField { field: "prefix" });
        } else if !is_identifier_fragment(&self.prefix)
            || self.prefix.starts_with(|c: char| c.is_ascii_digit())
        {
            issues.push(ValidationIssue::InvalidIdentifier {
                field: "prefix",
                value: self.prefix.clone(),
            });
        }

        if self.functions.rename {
            if self.functions.suffix.is_empty() {
                issues.push(ValidationIssue::MissingField {
                    field: "functions.suffix",
                });
            } else if !is_identifier_fragment(&self.functions.suffix) {
                issues.push(ValidationIssue::InvalidIdentifier {
                    field: "functions.suffix",
                    value: self.functions.suffix.clone(),
                });
            }
        }

        if self.output_dir.as_os_str().is_empty() {
            issues.push(ValidationIssue::MissingField {
                field: "output_dir",
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

fn is_identifier_fragment(s: &str) -> bool {
    s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    MissingField { field: &'static str },
    InvalidIdentifier { field: &'static str, value: String },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::MissingField { field } => {
                write!(f, "config field '{field}' must not be empty")
            }
            ValidationIssue::InvalidIdentifier { field, value } => write!(
                f,
                "config field '{field}' = {value:?} cannot be part of a C++ identifier"
            ),
        }
    }
}
