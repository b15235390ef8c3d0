//! Tree-sitter integration for checking rewritten C++ sources.
//!
//! Renaming only swaps identifiers, so a rewrite should never introduce a
//! parse error. This module re-parses original and rewritten text with the
//! C++ grammar and reports ERROR nodes that only the rewrite has.

pub mod errors;
pub mod parser;
pub mod validator;

pub use errors::TreeSitterError;
pub use parser::{CppParser, CppSource, ErrorNode};
pub use validator::{validate_rewrite, validate_syntax};
