//! Canonical identity of renamable declarations.
//!
//! Every implicit instantiation of a class template gets its own copy of
//! each field. All those copies collapse onto the field of the generic
//! definition, so one decision covers every instantiation.

use crate::ast::{DeclId, DeclIndex, IndexedField, SpecializationKind};
use std::fmt;
use thiserror::Error;

/// Key of the rename decision map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalId(pub DeclId);

impl fmt::Display for CanonicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "canonical {}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("{0} is referenced but not declared in the unit")]
    UnknownDecl(DeclId),

    #[error("{record} instantiates unknown class template {template}")]
    UnknownTemplate { record: DeclId, template: DeclId },

    #[error("no field named '{name}' in the generic definition of template {template}")]
    NoGenericField { template: DeclId, name: String },

    #[error("{0} is referenced as a member but is neither a field nor a method")]
    NotAMember(DeclId),
}

pub struct IdentityResolver<'a, 'ast> {
    index: &'a DeclIndex<'ast>,
}

impl<'a, 'ast> IdentityResolver<'a, 'ast> {
    pub fn new(index: &'a DeclIndex<'ast>) -> Self {
        Self { index }
    }

    /// Map a field to the field that stands for it in every instantiation.
    ///
    /// Fields of ordinary records and of explicit specializations are their
    /// own identity. Fields of implicit instantiations resolve to the
    /// same-named field of the generic definition.
    pub fn resolve_field(
        &self,
        field: IndexedField<'ast>,
    ) -> Result<IndexedField<'ast>, ResolveError> {
        let Some(spec) = field.parent.specialization else {
            return Ok(field);
        };
        if spec.kind != SpecializationKind::ImplicitInstantiation {
            return Ok(field);
        }

        let template =
            self.index
                .class_template(spec.template)
                .ok_or(ResolveError::UnknownTemplate {
                    record: field.parent.id,
                    template: spec.template,
                })?;

        let generic = &template.templated;
        generic
            .fields
            .iter()
            .find(|f| f.name == field.field.name)
            .map(|f| IndexedField {
                field: f,
                parent: generic,
            })
            .ok_or_else(|| ResolveError::NoGenericField {
                template: template.id,
                name: field.field.name.clone(),
            })
    }

    pub fn resolve_field_id(&self, id: DeclId) -> Result<IndexedField<'ast>, ResolveError> {
        let field = self.index.field(id).ok_or(ResolveError::UnknownDecl(id))?;
        self.resolve_field(field)
    }

    /// Functions instantiated from a function template share the template's
    /// identity.
    pub fn resolve_function(&self, id: DeclId) -> Result<CanonicalId, ResolveError> {
        let function = self
            .index
            .function(id)
            .ok_or(ResolveError::UnknownDecl(id))?;
        Ok(CanonicalId(function.instantiated_from.unwrap_or(function.id)))
    }
}

impl IndexedField<'_> {
    pub fn canonical_id(&self) -> CanonicalId {
        CanonicalId(self.field.id)
    }
}
