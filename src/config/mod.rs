pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, ConfigError};
pub use schema::{
    FunctionsConfig, RenameConfig, ValidationError, ValidationIssue, DEFAULT_OUTPUT_DIR,
    DEFAULT_ROOT_DIR,
};
