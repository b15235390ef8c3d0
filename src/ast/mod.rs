//! Resolved syntax tree handed over by the compiler front end.
//!
//! The tree is already name-resolved: every member access names the
//! declaration it refers to, and class templates carry their implicit
//! instantiations. Nothing here parses source text.

pub mod index;
pub mod visit;

use crate::source::{FileEntry, FileId, SourceLocation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use index::{DeclIndex, IndexedField};
pub use visit::Visitor;

/// Identity of a declaration node, unique within one translation unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeclId(pub u32);

impl fmt::Display for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "decl#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub main_file: FileId,
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub decls: Vec<Decl>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Decl {
    Record(RecordDecl),
    ClassTemplate(ClassTemplateDecl),
    Function(FunctionDecl),
    FunctionTemplate(FunctionTemplateDecl),
    Namespace(NamespaceDecl),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceDecl {
    pub id: DeclId,
    pub name: String,
    #[serde(default)]
    pub decls: Vec<Decl>,
}

/// A struct, class or union, including template specializations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDecl {
    pub id: DeclId,
    pub name: String,
    pub location: SourceLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specialization: Option<Specialization>,
    #[serde(default)]
    pub fields: Vec<FieldDecl>,
    #[serde(default)]
    pub methods: Vec<FunctionDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialization {
    /// The class template this record specializes.
    pub template: DeclId,
    pub kind: SpecializationKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecializationKind {
    ImplicitInstantiation,
    ExplicitSpecialization,
    ExplicitInstantiationDeclaration,
    ExplicitInstantiationDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub id: DeclId,
    pub name: String,
    /// Location of the declarator name.
    pub location: SourceLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassTemplateDecl {
    pub id: DeclId,
    pub name: String,
    pub location: SourceLocation,
    /// The generic, uninstantiated definition.
    pub templated: RecordDecl,
    #[serde(default)]
    pub specializations: Vec<RecordDecl>,
    /// Carried for completeness; never traversed.
    #[serde(default)]
    pub partial_specializations: Vec<RecordDecl>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    #[default]
    Free,
    Method,
    Constructor,
    Destructor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionDecl {
    pub id: DeclId,
    pub name: String,
    /// Location of the function name.
    pub location: SourceLocation,
    #[serde(default)]
    pub kind: FunctionKind,
    #[serde(default)]
    pub is_main: bool,
    #[serde(default)]
    pub is_virtual: bool,
    /// Compiler-generated (implicit special members and the like).
    #[serde(default)]
    pub implicit: bool,
    /// Generic function template this one was instantiated from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instantiated_from: Option<DeclId>,
    #[serde(default)]
    pub initializers: Vec<CtorInitializer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Vec<Expr>>,
}

impl FunctionDecl {
    pub fn is_method(&self) -> bool {
        self.kind != FunctionKind::Free
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionTemplateDecl {
    pub id: DeclId,
    pub name: String,
    pub location: SourceLocation,
    pub templated: FunctionDecl,
    #[serde(default)]
    pub specializations: Vec<FunctionDecl>,
}

/// One entry of a constructor's member-initializer list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtorInitializer {
    pub target: InitTarget,
    /// False for entries the compiler synthesized.
    pub written: bool,
    pub member_loc: SourceLocation,
    #[serde(default)]
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InitTarget {
    Member { field: DeclId },
    Base,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// `base.member` or `base->member`; an implicit `this->member` has no base.
    Member {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        base: Option<Box<Expr>>,
        member: DeclId,
        member_loc: SourceLocation,
    },
    Call {
        /// Set only when the callee resolves to a single function.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        callee: Option<DeclId>,
        callee_loc: SourceLocation,
        #[serde(default)]
        args: Vec<Expr>,
    },
    /// Any node the renamer does not inspect.
    Other {
        #[serde(default)]
        children: Vec<Expr>,
    },
}

#[derive(Error, Debug)]
pub enum AstError {
    #[error("failed to read syntax tree from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse syntax tree JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0} is declared more than once")]
    DuplicateDecl(DeclId),
}

pub fn load_from_str(input: &str) -> Result<TranslationUnit, AstError> {
    Ok(serde_json::from_str(input)?)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<TranslationUnit, AstError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| AstError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}
