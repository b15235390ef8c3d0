//! Fallible visitor over the resolved tree.
//!
//! Each `visit_*` method defaults to the matching `walk_*` function, which
//! recurses into children. Overriding a method and calling the `walk_*`
//! function keeps the recursion going; not calling it prunes the subtree.

use super::{
    ClassTemplateDecl, CtorInitializer, Decl, DeclId, Expr, FieldDecl, FunctionDecl,
    FunctionTemplateDecl, NamespaceDecl, RecordDecl, TranslationUnit,
};
use crate::source::SourceLocation;

pub trait Visitor<'ast> {
    type Error;

    fn visit_translation_unit(&mut self, tu: &'ast TranslationUnit) -> Result<(), Self::Error> {
        walk_translation_unit(self, tu)
    }

    fn visit_decl(&mut self, decl: &'ast Decl) -> Result<(), Self::Error> {
        walk_decl(self, decl)
    }

    fn visit_namespace(&mut self, ns: &'ast NamespaceDecl) -> Result<(), Self::Error> {
        walk_namespace(self, ns)
    }

    fn visit_record(&mut self, record: &'ast RecordDecl) -> Result<(), Self::Error> {
        walk_record(self, record)
    }

    fn visit_field(&mut self, _field: &'ast FieldDecl) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_class_template(
        &mut self,
        template: &'ast ClassTemplateDecl,
    ) -> Result<(), Self::Error> {
        walk_class_template(self, template)
    }

    fn visit_function(&mut self, function: &'ast FunctionDecl) -> Result<(), Self::Error> {
        walk_function(self, function)
    }

    fn visit_function_template(
        &mut self,
        template: &'ast FunctionTemplateDecl,
    ) -> Result<(), Self::Error> {
        walk_function_template(self, template)
    }

    fn visit_ctor_initializer(
        &mut self,
        init: &'ast CtorInitializer,
    ) -> Result<(), Self::Error> {
        walk_ctor_initializer(self, init)
    }

    fn visit_expr(&mut self, expr: &'ast Expr) -> Result<(), Self::Error> {
        walk_expr(self, expr)
    }

    fn visit_member_expr(
        &mut self,
        _member: DeclId,
        _member_loc: &'ast SourceLocation,
    ) -> Result<(), Self::Error> {
        Ok(())
    }

    fn visit_call_expr(
        &mut self,
        _callee: Option<DeclId>,
        _callee_loc: &'ast SourceLocation,
    ) -> Result<(), Self::Error> {
        Ok(())
    }
}

pub fn walk_translation_unit<'ast, V>(v: &mut V, tu: &'ast TranslationUnit) -> Result<(), V::Error>
where
    V: Visitor<'ast> + ?Sized,
{
    for decl in &tu.decls {
        v.visit_decl(decl)?;
    }
    Ok(())
}

pub fn walk_decl<'ast, V>(v: &mut V, decl: &'ast Decl) -> Result<(), V::Error>
where
    V: Visitor<'ast> + ?Sized,
{
    match decl {
        Decl::Record(record) => v.visit_record(record),
        Decl::ClassTemplate(template) => v.visit_class_template(template),
        Decl::Function(function) => v.visit_function(function),
        Decl::FunctionTemplate(template) => v.visit_function_template(template),
        Decl::Namespace(ns) => v.visit_namespace(ns),
    }
}

pub fn walk_namespace<'ast, V>(v: &mut V, ns: &'ast NamespaceDecl) -> Result<(), V::Error>
where
    V: Visitor<'ast> + ?Sized,
{
    for decl in &ns.decls {
        v.visit_decl(decl)?;
    }
    Ok(())
}

/// Visits fields, then every user-provided method. Compiler-generated
/// methods are not entered.
pub fn walk_record<'ast, V>(v: &mut V, record: &'ast RecordDecl) -> Result<(), V::Error>
where
    V: Visitor<'ast> + ?Sized,
{
    for field in &record.fields {
        v.visit_field(field)?;
    }
    for method in record.methods.iter().filter(|m| !m.implicit) {
        v.visit_function(method)?;
    }
    Ok(())
}

/// Visits the generic definition, then every written or instantiated
/// specialization so that their fields and method bodies are reached.
/// Partial specializations are skipped.
pub fn walk_class_template<'ast, V>(
    v: &mut V,
    template: &'ast ClassTemplateDecl,
) -> Result<(), V::Error>
where
    V: Visitor<'ast> + ?Sized,
{
    v.visit_record(&template.templated)?;
    for spec in &template.specializations {
        v.visit_record(spec)?;
    }
    Ok(())
}

pub fn walk_function<'ast, V>(v: &mut V, function: &'ast FunctionDecl) -> Result<(), V::Error>
where
    V: Visitor<'ast> + ?Sized,
{
    for init in &function.initializers {
        v.visit_ctor_initializer(init)?;
    }
    if let Some(body) = &function.body {
        for expr in body {
            v.visit_expr(expr)?;
        }
    }
    Ok(())
}

pub fn walk_function_template<'ast, V>(
    v: &mut V,
    template: &'ast FunctionTemplateDecl,
) -> Result<(), V::Error>
where
    V: Visitor<'ast> + ?Sized,
{
    v.visit_function(&template.templated)?;
    for spec in template.specializations.iter().filter(|s| !s.implicit) {
        v.visit_function(spec)?;
    }
    Ok(())
}

pub fn walk_ctor_initializer<'ast, V>(
    v: &mut V,
    init: &'ast CtorInitializer,
) -> Result<(), V::Error>
where
    V: Visitor<'ast> + ?Sized,
{
    for arg in &init.args {
        v.visit_expr(arg)?;
    }
    Ok(())
}

pub fn walk_expr<'ast, V>(v: &mut V, expr: &'ast Expr) -> Result<(), V::Error>
where
    V: Visitor<'ast> + ?Sized,
{
    match expr {
        Expr::Member {
            base,
            member,
            member_loc,
        } => {
            if let Some(base) = base {
                v.visit_expr(base)?;
            }
            v.visit_member_expr(*member, member_loc)
        }
        Expr::Call {
            callee,
            callee_loc,
            args,
        } => {
            v.visit_call_expr(*callee, callee_loc)?;
            for arg in args {
                v.visit_expr(arg)?;
            }
            Ok(())
        }
        Expr::Other { children } => {
            for child in children {
                v.visit_expr(child)?;
            }
            Ok(())
        }
    }
}
