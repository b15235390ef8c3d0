//! Prefix Renamer: bring C++ data-member names in line with a prefix convention
//!
//! Takes a fully resolved syntax tree from a compiler front end, finds data
//! members whose names lack the required prefix (`m_` by default), and
//! rewrites the declaration together with every reference to it.
//!
//! # Architecture
//!
//! - [`scope`] decides which locations belong to the project.
//! - [`identity`] collapses the per-instantiation copies of a template's
//!   fields onto the generic definition.
//! - [`engine`] walks the tree once, memoizes a [`engine::Decision`] per
//!   canonical identity, and schedules an [`Edit`] at every site.
//! - [`rewrite`] keeps one buffer per file and materializes the rewritten
//!   text for files that received edits.
//!
//! Edits are always made at the *spelling* location of a token, so names
//! written inside macro bodies are edited where they are written.
//!
//! # Example
//!
//! ```no_run
//! use prefix_renamer::{ast, config::RenameConfig, engine::rename_unit, output::OutputWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let tu = ast::load_from_path("main.ast.json")?;
//! let config = RenameConfig::default();
//! let report = rename_unit(tu, &config)?;
//!
//! for diagnostic in report.diagnostics.iter() {
//!     eprintln!("{diagnostic}");
//! }
//! OutputWriter::new(&config.output_dir).write_all(&report.outcomes)?;
//! # Ok(())
//! # }
//! ```

pub mod ast;
pub mod config;
pub mod diagnostic;
pub mod edit;
pub mod engine;
pub mod identity;
pub mod output;
pub mod policy;
pub mod rewrite;
pub mod scope;
pub mod source;
pub mod ts;

// Re-exports
pub use config::{load_from_path, load_from_str, ConfigError, RenameConfig};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use edit::{Edit, EditError, EditResult};
pub use engine::{rename_unit, Decision, RenameError, RenameReport};
pub use identity::{CanonicalId, IdentityResolver};
pub use output::{OutputError, OutputWriter, WriteReport};
pub use policy::NamingPolicy;
pub use rewrite::{FileChange, FileOutcome, RewriteBuffer, Rewriter};
pub use scope::ScopeFilter;
pub use source::{FileId, FileLoc, LocationMode, SourceLocation, SourceManager};
