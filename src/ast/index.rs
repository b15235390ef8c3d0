use super::{AstError, ClassTemplateDecl, Decl, DeclId, FieldDecl, FunctionDecl, RecordDecl};
use std::collections::HashMap;

/// A field together with the record that declares it.
#[derive(Debug, Clone, Copy)]
pub struct IndexedField<'ast> {
    pub field: &'ast FieldDecl,
    pub parent: &'ast RecordDecl,
}

/// Lookup tables from declaration ids to the nodes of one translation unit.
///
/// Built once before traversal; the tree is never mutated afterwards.
#[derive(Debug, Default)]
pub struct DeclIndex<'ast> {
    fields: HashMap<DeclId, IndexedField<'ast>>,
    records: HashMap<DeclId, &'ast RecordDecl>,
    class_templates: HashMap<DeclId, &'ast ClassTemplateDecl>,
    functions: HashMap<DeclId, &'ast FunctionDecl>,
}

impl<'ast> DeclIndex<'ast> {
    pub fn build(decls: &'ast [Decl]) -> Result<Self, AstError> {
        let mut index = DeclIndex::default();
        for decl in decls {
            index.add_decl(decl)?;
        }
        Ok(index)
    }

    pub fn field(&self, id: DeclId) -> Option<IndexedField<'ast>> {
        self.fields.get(&id).copied()
    }

    pub fn record(&self, id: DeclId) -> Option<&'ast RecordDecl> {
        self.records.get(&id).copied()
    }

    pub fn class_template(&self, id: DeclId) -> Option<&'ast ClassTemplateDecl> {
        self.class_templates.get(&id).copied()
    }

    pub fn function(&self, id: DeclId) -> Option<&'ast FunctionDecl> {
        self.functions.get(&id).copied()
    }

    fn add_decl(&mut self, decl: &'ast Decl) -> Result<(), AstError> {
        match decl {
            Decl::Record(record) => self.add_record(record),
            Decl::ClassTemplate(template) => {
                insert_unique(&mut self.class_templates, template.id, template)?;
                self.add_record(&template.templated)?;
                for spec in template
                    .specializations
                    .iter()
                    .chain(&template.partial_specializations)
                {
                    self.add_record(spec)?;
                }
                Ok(())
            }
            Decl::Function(function) => self.add_function(function),
            Decl::FunctionTemplate(template) => {
                self.add_function(&template.templated)?;
                for spec in &template.specializations {
                    self.add_function(spec)?;
                }
                Ok(())
            }
            Decl::Namespace(ns) => {
                for decl in &ns.decls {
                    self.add_decl(decl)?;
                }
                Ok(())
            }
        }
    }

    fn add_record(&mut self, record: &'ast RecordDecl) -> Result<(), AstError> {
        insert_unique(&mut self.records, record.id, record)?;
        for field in &record.fields {
            insert_unique(
                &mut self.fields,
                field.id,
                IndexedField {
                    field,
                    parent: record,
                },
            )?;
        }
        for method in &record.methods {
            self.add_function(method)?;
        }
        Ok(())
    }

    fn add_function(&mut self, function: &'ast FunctionDecl) -> Result<(), AstError> {
        insert_unique(&mut self.functions, function.id, function)
    }
}

fn insert_unique<V>(map: &mut HashMap<DeclId, V>, id: DeclId, value: V) -> Result<(), AstError> {
    if map.insert(id, value).is_some() {
        return Err(AstError::DuplicateDecl(id));
    }
    Ok(())
}
