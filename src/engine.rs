//! Single-pass rename engine.
//!
//! One walk over the tree decides every rename and schedules every edit;
//! the rewriter is flushed only after the walk completes. Decisions are
//! memoized per [`CanonicalId`], so a declaration gets the same new name at
//! every site regardless of the order in which sites are reached.

use crate::ast::visit::{self, Visitor};
use crate::ast::{
    AstError, ClassTemplateDecl, CtorInitializer, DeclId, DeclIndex, FieldDecl, FunctionDecl,
    IndexedField, InitTarget, TranslationUnit,
};
use crate::config::RenameConfig;
use crate::diagnostic::Diagnostics;
use crate::edit::{Edit, EditError, EditResult};
use crate::identity::{CanonicalId, IdentityResolver, ResolveError};
use crate::policy::{FunctionPolicy, NamingPolicy};
use crate::rewrite::{FileOutcome, Rewriter};
use crate::scope::ScopeFilter;
use crate::source::{FileLoc, SourceError, SourceLocation, SourceManager};
use std::collections::HashMap;
use thiserror::Error;

pub const FIELD_MESSAGE: &str = "wrong name for field";
pub const FUNCTION_MESSAGE: &str = "wrong name for function";

#[derive(Error, Debug)]
pub enum RenameError {
    #[error(transparent)]
    Ast(#[from] AstError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("internal consistency failure: {0}")]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Edit(#[from] EditError),
}

/// Memoized outcome for one canonical identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Keep,
    Rename(String),
}

impl Decision {
    pub fn new_name(&self) -> Option<&str> {
        match self {
            Decision::Keep => None,
            Decision::Rename(name) => Some(name),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RenameStats {
    /// Identities that received a new name.
    pub renamed: usize,
    /// Distinct edits recorded across all buffers.
    pub edits: usize,
    /// Edits that duplicated an already recorded one.
    pub duplicate_edits: usize,
}

#[derive(Debug)]
pub struct RenameReport {
    pub outcomes: Vec<FileOutcome>,
    pub diagnostics: Diagnostics,
    pub decisions: HashMap<CanonicalId, Decision>,
    pub stats: RenameStats,
}

/// Run the engine over one translation unit.
pub fn rename_unit(tu: TranslationUnit, config: &RenameConfig) -> Result<RenameReport, RenameError> {
    let TranslationUnit {
        main_file,
        files,
        decls,
    } = tu;
    let sources = SourceManager::new(files, main_file, &config.source_dir)?;
    let index = DeclIndex::build(&decls)?;

    let mut engine = RenameEngine::new(&sources, &index, config);
    for decl in &decls {
        engine.visit_decl(decl)?;
    }
    engine.finish()
}

pub struct RenameEngine<'a, 'ast> {
    sources: &'a SourceManager,
    index: &'a DeclIndex<'ast>,
    resolver: IdentityResolver<'a, 'ast>,
    scope: ScopeFilter,
    policy: NamingPolicy,
    functions: FunctionPolicy,
    decisions: HashMap<CanonicalId, Decision>,
    rewriter: Rewriter<'a>,
    diagnostics: Diagnostics,
    stats: RenameStats,
}

impl<'a, 'ast> RenameEngine<'a, 'ast> {
    pub fn new(sources: &'a SourceManager, index: &'a DeclIndex<'ast>, config: &RenameConfig) -> Self {
        Self {
            sources,
            index,
            resolver: IdentityResolver::new(index),
            scope: ScopeFilter::new(config.root_dir.clone(), config.location_mode),
            policy: config.naming_policy(),
            functions: config.function_policy(),
            decisions: HashMap::new(),
            rewriter: Rewriter::new(sources),
            diagnostics: Diagnostics::new(),
            stats: RenameStats::default(),
        }
    }

    pub fn decision(&self, id: CanonicalId) -> Option<&Decision> {
        self.decisions.get(&id)
    }

    /// Flush every buffer against the set of touched files.
    pub fn finish(self) -> Result<RenameReport, RenameError> {
        let touched = self.scope.into_touched();
        let outcomes = self.rewriter.flush(&touched)?;
        for outcome in &outcomes {
            tracing::info!(
                path = %outcome.path.display(),
                rewritten = outcome.is_rewritten(),
                "flushed"
            );
        }
        Ok(RenameReport {
            outcomes,
            diagnostics: self.diagnostics,
            decisions: self.decisions,
            stats: self.stats,
        })
    }

    /// Look up or compute the decision for a field's canonical identity.
    ///
    /// The decision is computed from the canonical declaration, so the
    /// answer does not depend on whether a reference or the declaration is
    /// reached first. A declaration outside the project is never renamed.
    fn decide_field(&mut self, canonical: IndexedField<'ast>) -> Result<Decision, RenameError> {
        let id = canonical.canonical_id();
        if let Some(decision) = self.decisions.get(&id) {
            return Ok(decision.clone());
        }

        let field = canonical.field;
        let decision = match self.scope.in_scope(self.sources, &field.location)? {
            None => Decision::Keep,
            Some(decl_loc) => match self.policy.rename(&field.name) {
                None => Decision::Keep,
                Some(new_name) => {
                    self.diagnostics.warn(
                        self.sources,
                        decl_loc,
                        FIELD_MESSAGE,
                        &field.name,
                        Some(new_name.clone()),
                    )?;
                    self.stats.renamed += 1;
                    Decision::Rename(new_name)
                }
            },
        };

        tracing::debug!(%id, name = %field.name, ?decision, "field decision");
        self.decisions.insert(id, decision.clone());
        Ok(decision)
    }

    fn decide_function(&mut self, id: CanonicalId) -> Result<Decision, RenameError> {
        if let Some(decision) = self.decisions.get(&id) {
            return Ok(decision.clone());
        }

        let function = self
            .index
            .function(id.0)
            .ok_or(ResolveError::UnknownDecl(id.0))?;

        let renamable =
            !function.is_method() && !function.is_virtual && !function.is_main && !function.implicit;
        let in_scope = if renamable {
            self.scope.in_scope(self.sources, &function.location)?
        } else {
            None
        };

        let decision = match in_scope.zip(self.functions.rename(&function.name)) {
            None => Decision::Keep,
            Some((decl_loc, new_name)) => {
                self.diagnostics.warn(
                    self.sources,
                    decl_loc,
                    FUNCTION_MESSAGE,
                    &function.name,
                    Some(new_name.clone()),
                )?;
                self.stats.renamed += 1;
                Decision::Rename(new_name)
            }
        };

        tracing::debug!(%id, name = %function.name, ?decision, "function decision");
        self.decisions.insert(id, decision.clone());
        Ok(decision)
    }

    fn schedule(&mut self, loc: FileLoc, old_name: &str, decision: &Decision) -> Result<(), RenameError> {
        let Some(new_name) = decision.new_name() else {
            return Ok(());
        };
        match self.rewriter.schedule(Edit::rename(loc, old_name, new_name))? {
            EditResult::Scheduled => self.stats.edits += 1,
            EditResult::AlreadyScheduled => self.stats.duplicate_edits += 1,
        }
        Ok(())
    }

    /// Shared by member expressions and member initializers.
    fn rename_field_reference(
        &mut self,
        field: DeclId,
        loc: &SourceLocation,
    ) -> Result<(), RenameError> {
        let Some(site) = self.scope.accept(self.sources, loc)? else {
            return Ok(());
        };
        let referenced = self
            .index
            .field(field)
            .ok_or(ResolveError::NotAMember(field))?;
        let canonical = self.resolver.resolve_field(referenced)?;
        let decision = self.decide_field(canonical)?;
        self.schedule(site, &referenced.field.name, &decision)
    }
}

impl<'a, 'ast> Visitor<'ast> for RenameEngine<'a, 'ast> {
    type Error = RenameError;

    fn visit_field(&mut self, field: &'ast FieldDecl) -> Result<(), RenameError> {
        let Some(site) = self.scope.accept(self.sources, &field.location)? else {
            return Ok(());
        };
        let indexed = self
            .index
            .field(field.id)
            .ok_or(ResolveError::UnknownDecl(field.id))?;
        let canonical = self.resolver.resolve_field(indexed)?;
        let decision = self.decide_field(canonical)?;
        self.schedule(site, &field.name, &decision)
    }

    fn visit_class_template(&mut self, template: &'ast ClassTemplateDecl) -> Result<(), RenameError> {
        if !template.partial_specializations.is_empty() {
            tracing::debug!(
                template = %template.name,
                count = template.partial_specializations.len(),
                "partial specializations are not renamed"
            );
        }
        visit::walk_class_template(self, template)
    }

    fn visit_function(&mut self, function: &'ast FunctionDecl) -> Result<(), RenameError> {
        if self.functions.enabled && !function.is_method() {
            if let Some(site) = self.scope.accept(self.sources, &function.location)? {
                let canonical = self.resolver.resolve_function(function.id)?;
                let decision = self.decide_function(canonical)?;
                self.schedule(site, &function.name, &decision)?;
            }
        }
        visit::walk_function(self, function)
    }

    fn visit_ctor_initializer(&mut self, init: &'ast CtorInitializer) -> Result<(), RenameError> {
        match init.target {
            InitTarget::Base => {}
            // synthesized entries have no written name to edit
            InitTarget::Member { .. } if !init.written => {}
            InitTarget::Member { field } => self.rename_field_reference(field, &init.member_loc)?,
        }
        visit::walk_ctor_initializer(self, init)
    }

    fn visit_member_expr(
        &mut self,
        member: DeclId,
        member_loc: &'ast SourceLocation,
    ) -> Result<(), RenameError> {
        // TODO: rename method references once method declarations are renamed
        if self.index.function(member).is_some() {
            self.scope.accept(self.sources, member_loc)?;
            return Ok(());
        }
        self.rename_field_reference(member, member_loc)
    }

    fn visit_call_expr(
        &mut self,
        callee: Option<DeclId>,
        callee_loc: &'ast SourceLocation,
    ) -> Result<(), RenameError> {
        let Some(callee) = callee.filter(|_| self.functions.enabled) else {
            return Ok(());
        };
        let Some(site) = self.scope.accept(self.sources, callee_loc)? else {
            return Ok(());
        };
        let canonical = self.resolver.resolve_function(callee)?;
        let decision = self.decide_function(canonical)?;
        let name = &self
            .index
            .function(callee)
            .ok_or(ResolveError::UnknownDecl(callee))?
            .name;
        self.schedule(site, name, &decision)
    }
}
