//! End-to-end rename scenarios driven through `rename_unit`.
//!
//! Each test builds a translation unit the way the front end would emit it:
//! file table with embedded contents, declarations, and byte offsets into
//! those contents.

use pretty_assertions::assert_eq;
use prefix_renamer::ast::{DeclId, TranslationUnit};
use prefix_renamer::config::RenameConfig;
use prefix_renamer::edit::EditError;
use prefix_renamer::engine::{FIELD_MESSAGE, FUNCTION_MESSAGE};
use prefix_renamer::identity::ResolveError;
use prefix_renamer::rewrite::FileChange;
use prefix_renamer::source::{FileId, LocationMode};
use prefix_renamer::{rename_unit, CanonicalId, Decision, RenameError, RenameReport};
use serde_json::{json, Value};
use std::path::Path;

/// Offset of `needle` inside the first occurrence of `context` in `src`.
fn at(src: &str, context: &str, needle: &str) -> usize {
    let base = src
        .find(context)
        .unwrap_or_else(|| panic!("context {context:?} not in source"));
    let inner = context
        .find(needle)
        .unwrap_or_else(|| panic!("needle {needle:?} not in context"));
    base + inner
}

fn loc(file: u32, offset: usize) -> Value {
    json!({ "file": { "file": file, "offset": offset } })
}

fn macro_loc(spelling: Value, expansion: Value) -> Value {
    json!({ "macro": { "spelling": spelling, "expansion": expansion } })
}

fn member(field: u32, member_loc: Value) -> Value {
    json!({ "kind": "member", "base": { "kind": "other" }, "member": field, "member_loc": member_loc })
}

fn run(tu: Value, config: &RenameConfig) -> Result<RenameReport, RenameError> {
    let tu: TranslationUnit = serde_json::from_value(tu).unwrap();
    rename_unit(tu, config)
}

fn rewritten<'r>(report: &'r RenameReport, path: &str) -> Option<&'r str> {
    report
        .outcomes
        .iter()
        .find(|o| o.path == Path::new(path))
        .and_then(|o| match &o.change {
            FileChange::Rewritten { content, .. } => Some(content.as_str()),
            FileChange::Unchanged => None,
        })
}

/// `struct S { int <name>; };` with two accesses in `main`.
fn field_unit(name: &str) -> (String, Value) {
    let src = format!(
        "struct S {{ int {name}; }};\nint main() {{ S s; s.{name} = 1; return s.{name}; }}\n"
    );
    let decl = format!("int {name};");
    let write = format!("s.{name} = 1");
    let read = format!("return s.{name}");

    let tu = json!({
        "main_file": 0,
        "files": [{ "id": 0, "path": "src/main.cpp", "content": src }],
        "decls": [
            {
                "kind": "record", "id": 1, "name": "S",
                "location": loc(0, at(&src, "struct S", "S")),
                "fields": [{ "id": 2, "name": name, "location": loc(0, at(&src, &decl, name)) }]
            },
            {
                "kind": "function", "id": 3, "name": "main", "is_main": true,
                "location": loc(0, at(&src, "int main", "main")),
                "body": [
                    { "kind": "other", "children": [member(2, loc(0, at(&src, &write, name)))] },
                    member(2, loc(0, at(&src, &read, name)))
                ]
            }
        ]
    });
    (src, tu)
}

#[test]
fn unprefixed_field_is_renamed_everywhere() {
    let (_, tu) = field_unit("bar");
    let report = run(tu, &RenameConfig::default()).unwrap();

    assert_eq!(
        rewritten(&report, "src/main.cpp"),
        Some("struct S { int m_bar; };\nint main() { S s; s.m_bar = 1; return s.m_bar; }\n")
    );
    assert_eq!(report.diagnostics.len(), 1);
    let diagnostic = report.diagnostics.iter().next().unwrap();
    assert_eq!(diagnostic.message, FIELD_MESSAGE);
    assert_eq!(diagnostic.name, "bar");
    assert_eq!(diagnostic.suggestion.as_deref(), Some("m_bar"));
    assert_eq!((diagnostic.line, diagnostic.column), (1, 16));
    assert_eq!(report.stats.edits, 3);
    assert_eq!(
        report.decisions.get(&CanonicalId(DeclId(2))),
        Some(&Decision::Rename("m_bar".to_string()))
    );
}

#[test]
fn leading_underscore_is_replaced_by_prefix() {
    let (_, tu) = field_unit("_bar");
    let report = run(tu, &RenameConfig::default()).unwrap();

    let content = rewritten(&report, "src/main.cpp").unwrap();
    assert!(content.contains("int m_bar;"));
    assert!(!content.contains("m__bar"));
    assert_eq!(report.diagnostics.len(), 1);
}

#[test]
fn compliant_field_is_left_alone() {
    let (_, tu) = field_unit("m_bar");
    let report = run(tu, &RenameConfig::default()).unwrap();

    assert!(report.diagnostics.is_empty());
    assert_eq!(report.stats.edits, 0);
    assert_eq!(report.outcomes.len(), 1);
    assert!(!report.outcomes[0].is_rewritten());
    assert_eq!(
        report.decisions.get(&CanonicalId(DeclId(2))),
        Some(&Decision::Keep)
    );
}

#[test]
fn second_run_on_output_is_a_no_op() {
    let (_, tu) = field_unit("bar");
    let first = run(tu, &RenameConfig::default()).unwrap();
    let output = rewritten(&first, "src/main.cpp").unwrap().to_string();

    let (src, tu) = field_unit("m_bar");
    assert_eq!(src, output);
    let second = run(tu, &RenameConfig::default()).unwrap();
    assert_eq!(second.stats.edits, 0);
    assert!(second.outcomes.iter().all(|o| !o.is_rewritten()));
}

#[test]
fn written_initializers_are_renamed_and_synthesized_ones_skipped() {
    let src = "struct S {\n  int _bar;\n  int baz;\n  S() : _bar(0) {}\n};\n";
    let tu = json!({
        "main_file": 0,
        "files": [{ "id": 0, "path": "src/s.cpp", "content": src }],
        "decls": [{
            "kind": "record", "id": 1, "name": "S",
            "location": loc(0, at(src, "struct S", "S")),
            "fields": [
                { "id": 2, "name": "_bar", "location": loc(0, at(src, "int _bar", "_bar")) },
                { "id": 3, "name": "baz", "location": loc(0, at(src, "int baz", "baz")) }
            ],
            "methods": [{
                "id": 4, "name": "S", "kind": "constructor",
                "location": loc(0, at(src, "S() :", "S")),
                "initializers": [
                    { "target": { "kind": "member", "field": 2 }, "written": true,
                      "member_loc": loc(0, at(src, "_bar(0)", "_bar")) },
                    // default member initialization points at the constructor name
                    { "target": { "kind": "member", "field": 3 }, "written": false,
                      "member_loc": loc(0, at(src, "S() :", "S")) },
                    { "target": { "kind": "base" }, "written": true, "member_loc": "invalid" }
                ],
                "body": []
            }]
        }]
    });

    let report = run(tu, &RenameConfig::default()).unwrap();
    assert_eq!(
        rewritten(&report, "src/s.cpp"),
        Some("struct S {\n  int m_bar;\n  int m_baz;\n  S() : m_bar(0) {}\n};\n")
    );
    assert_eq!(report.diagnostics.len(), 2);
    assert_eq!(report.stats.edits, 3);
}

#[test]
fn template_instantiations_share_one_decision() {
    let src = "template <typename T> struct Box { T val; T get() const { return val; } };\n\
               int main() { Box<int> a; Box<double> b; return a.val + int(b.val); }\n";
    let val_decl = loc(0, at(src, "T val;", "val"));
    let val_in_get = loc(0, at(src, "return val;", "val"));

    let instantiation = |id: u32| {
        json!({
            "id": id, "name": "Box",
            "location": loc(0, at(src, "struct Box", "Box")),
            "specialization": { "template": 10, "kind": "implicit_instantiation" },
            "fields": [{ "id": id + 1, "name": "val", "location": val_decl }],
            "methods": [
                { "id": id + 2, "name": "get", "kind": "method",
                  "location": loc(0, at(src, "get()", "get")),
                  "body": [member(id + 1, val_in_get.clone())] },
                { "id": id + 3, "name": "Box", "kind": "constructor", "implicit": true,
                  "location": "invalid" }
            ]
        })
    };

    let tu = json!({
        "main_file": 0,
        "files": [{ "id": 0, "path": "src/box.cpp", "content": src }],
        "decls": [
            {
                "kind": "class_template", "id": 10, "name": "Box",
                "location": loc(0, at(src, "struct Box", "Box")),
                "templated": {
                    "id": 11, "name": "Box",
                    "location": loc(0, at(src, "struct Box", "Box")),
                    "fields": [{ "id": 12, "name": "val", "location": val_decl }],
                    "methods": [{ "id": 13, "name": "get", "kind": "method",
                                  "location": loc(0, at(src, "get()", "get")),
                                  "body": [member(12, val_in_get.clone())] }]
                },
                "specializations": [instantiation(20), instantiation(30)]
            },
            {
                "kind": "function", "id": 40, "name": "main", "is_main": true,
                "location": loc(0, at(src, "int main", "main")),
                "body": [
                    member(21, loc(0, at(src, "a.val", "val"))),
                    member(31, loc(0, at(src, "b.val", "val")))
                ]
            }
        ]
    });

    let report = run(tu, &RenameConfig::default()).unwrap();
    assert_eq!(
        rewritten(&report, "src/box.cpp"),
        Some(
            "template <typename T> struct Box { T m_val; T get() const { return m_val; } };\n\
             int main() { Box<int> a; Box<double> b; return a.m_val + int(b.m_val); }\n"
        )
    );
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.stats.edits, 4);
    assert_eq!(report.stats.duplicate_edits, 4);
    assert_eq!(report.decisions.len(), 1);
    assert_eq!(
        report.decisions.get(&CanonicalId(DeclId(12))),
        Some(&Decision::Rename("m_val".to_string()))
    );
}

#[test]
fn instantiation_without_generic_field_is_fatal() {
    let src = "template <typename T> struct Box { T val; };\n";
    let tu = json!({
        "main_file": 0,
        "files": [{ "id": 0, "path": "src/box.h", "content": src }],
        "decls": [{
            "kind": "class_template", "id": 10, "name": "Box",
            "location": loc(0, at(src, "struct Box", "Box")),
            "templated": {
                "id": 11, "name": "Box", "location": loc(0, at(src, "struct Box", "Box")),
                "fields": [{ "id": 12, "name": "val", "location": loc(0, at(src, "T val", "val")) }]
            },
            "specializations": [{
                "id": 20, "name": "Box", "location": loc(0, at(src, "struct Box", "Box")),
                "specialization": { "template": 10, "kind": "implicit_instantiation" },
                "fields": [{ "id": 21, "name": "value", "location": loc(0, at(src, "T val", "val")) }]
            }]
        }]
    });

    let err = run(tu, &RenameConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        RenameError::Resolve(ResolveError::NoGenericField { ref name, .. }) if name == "value"
    ));
}

/// Main file plus a header that spells the member inside a macro body.
fn macro_unit(header_path: &str) -> Value {
    let main = "#include \"get.h\"\nstruct S { int bar; };\nint main() { S s; return GET(s); }\n";
    let header = "#define GET(x) x.bar\n";

    json!({
        "main_file": 0,
        "files": [
            { "id": 0, "path": "src/main.cpp", "content": main },
            { "id": 1, "path": header_path, "content": header }
        ],
        "decls": [
            {
                "kind": "record", "id": 1, "name": "S",
                "location": loc(0, at(main, "struct S", "S")),
                "fields": [{ "id": 2, "name": "bar", "location": loc(0, at(main, "int bar", "bar")) }]
            },
            {
                "kind": "function", "id": 3, "name": "main", "is_main": true,
                "location": loc(0, at(main, "int main", "main")),
                "body": [member(2, macro_loc(
                    loc(1, at(header, "x.bar", "bar")),
                    loc(0, at(main, "GET(s)", "GET"))
                ))]
            }
        ]
    })
}

#[test]
fn macro_reference_is_edited_at_its_spelling() {
    let report = run(macro_unit("src/include/get.h"), &RenameConfig::default()).unwrap();

    assert_eq!(
        rewritten(&report, "src/include/get.h"),
        Some("#define GET(x) x.m_bar\n")
    );
    let main = rewritten(&report, "src/main.cpp").unwrap();
    assert!(main.contains("int m_bar;"));
    assert!(main.contains("return GET(s);"));
}

#[test]
fn macro_spelled_out_of_scope_is_not_edited() {
    let report = run(macro_unit("/opt/vendor/get.h"), &RenameConfig::default()).unwrap();

    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].file, FileId(0));
    assert_eq!(report.stats.edits, 1);
}

#[test]
fn expansion_mode_rejects_edits_that_miss_the_name() {
    let config = RenameConfig {
        location_mode: LocationMode::Expansion,
        ..RenameConfig::default()
    };

    let err = run(macro_unit("src/include/get.h"), &config).unwrap_err();
    assert!(matches!(
        err,
        RenameError::Edit(EditError::BeforeTextMismatch { ref found, .. }) if found == "GET"
    ));
}

#[test]
fn references_before_the_declaration_get_the_same_name() {
    let src = "struct S;\nint peek(S& s) { return s.bar; }\nstruct S { int bar; };\n";
    let tu = json!({
        "main_file": 0,
        "files": [{ "id": 0, "path": "src/main.cpp", "content": src }],
        "decls": [
            {
                "kind": "function", "id": 5, "name": "peek",
                "location": loc(0, at(src, "int peek", "peek")),
                "body": [member(2, loc(0, at(src, "s.bar", "bar")))]
            },
            {
                "kind": "record", "id": 1, "name": "S",
                "location": loc(0, at(src, "struct S {", "S")),
                "fields": [{ "id": 2, "name": "bar", "location": loc(0, at(src, "int bar", "bar")) }]
            }
        ]
    });

    let report = run(tu, &RenameConfig::default()).unwrap();
    assert_eq!(
        rewritten(&report, "src/main.cpp"),
        Some("struct S;\nint peek(S& s) { return s.m_bar; }\nstruct S { int m_bar; };\n")
    );
    assert_eq!(report.diagnostics.len(), 1);
}

#[test]
fn members_declared_in_system_headers_are_never_renamed() {
    let main = "#include <utility>\nint main() { std::pair<int, int> p; return p.first; }\n";
    let utility = "struct pair { int first; int second; };\n";
    let tu = json!({
        "main_file": 0,
        "files": [
            { "id": 0, "path": "src/main.cpp", "content": main },
            { "id": 1, "path": "/usr/include/c++/utility", "system": true, "content": utility }
        ],
        "decls": [
            {
                "kind": "record", "id": 1, "name": "pair",
                "location": loc(1, at(utility, "struct pair", "pair")),
                "fields": [
                    { "id": 2, "name": "first", "location": loc(1, at(utility, "int first", "first")) },
                    { "id": 3, "name": "second", "location": loc(1, at(utility, "int second", "second")) }
                ]
            },
            {
                "kind": "function", "id": 4, "name": "main", "is_main": true,
                "location": loc(0, at(main, "int main", "main")),
                "body": [member(2, loc(0, at(main, "p.first", "first")))]
            }
        ]
    });

    let report = run(tu, &RenameConfig::default()).unwrap();
    assert!(report.diagnostics.is_empty());
    assert_eq!(report.stats.edits, 0);
    // main was scanned, the system header never was
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].file, FileId(0));
    assert!(!report.outcomes[0].is_rewritten());
}

fn function_unit() -> Value {
    let src = "void helper() {}\nint main() { helper(); return 0; }\n";
    json!({
        "main_file": 0,
        "files": [{ "id": 0, "path": "src/main.cpp", "content": src }],
        "decls": [
            { "kind": "function", "id": 1, "name": "helper",
              "location": loc(0, at(src, "void helper", "helper")), "body": [] },
            { "kind": "function", "id": 2, "name": "main", "is_main": true,
              "location": loc(0, at(src, "int main", "main")),
              "body": [{ "kind": "call", "callee": 1, "callee_loc": loc(0, at(src, "helper();", "helper")) }] }
        ]
    })
}

#[test]
fn functions_are_kept_by_default() {
    let report = run(function_unit(), &RenameConfig::default()).unwrap();
    assert!(report.diagnostics.is_empty());
    assert!(report.outcomes.iter().all(|o| !o.is_rewritten()));
}

#[test]
fn function_renaming_can_be_enabled() {
    let mut config = RenameConfig::default();
    config.functions.rename = true;

    let report = run(function_unit(), &config).unwrap();
    assert_eq!(
        rewritten(&report, "src/main.cpp"),
        Some("void helper_renamed() {}\nint main() { helper_renamed(); return 0; }\n")
    );
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(
        report.diagnostics.iter().next().unwrap().message,
        FUNCTION_MESSAGE
    );
}

#[test]
fn explicit_specialization_fields_are_renamed_at_declaration_and_use() {
    let src = "template <typename T> struct Box { T m_val; };\n\
               template <> struct Box<char> { char val; };\n\
               int main() { Box<char> c; return c.val; }\n";
    let tu = json!({
        "main_file": 0,
        "files": [{ "id": 0, "path": "src/box.cpp", "content": src }],
        "decls": [
            {
                "kind": "class_template", "id": 10, "name": "Box",
                "location": loc(0, at(src, "struct Box", "Box")),
                "templated": {
                    "id": 11, "name": "Box", "location": loc(0, at(src, "struct Box", "Box")),
                    "fields": [{ "id": 12, "name": "m_val", "location": loc(0, at(src, "T m_val", "m_val")) }]
                },
                "specializations": [{
                    "id": 20, "name": "Box", "location": loc(0, at(src, "struct Box<char>", "Box")),
                    "specialization": { "template": 10, "kind": "explicit_specialization" },
                    "fields": [{ "id": 21, "name": "val", "location": loc(0, at(src, "char val", "val")) }]
                }]
            },
            {
                "kind": "function", "id": 30, "name": "main", "is_main": true,
                "location": loc(0, at(src, "int main", "main")),
                "body": [member(21, loc(0, at(src, "c.val", "val")))]
            }
        ]
    });

    let report = run(tu, &RenameConfig::default()).unwrap();
    assert_eq!(
        rewritten(&report, "src/box.cpp"),
        Some(
            "template <typename T> struct Box { T m_val; };\n\
             template <> struct Box<char> { char m_val; };\n\
             int main() { Box<char> c; return c.m_val; }\n"
        )
    );
    assert_eq!(report.stats.edits, 2);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(
        report.decisions.get(&CanonicalId(DeclId(21))),
        Some(&Decision::Rename("m_val".to_string()))
    );
}

#[test]
fn unnamed_bit_fields_are_left_alone() {
    let src = "struct S { int : 4; int x; };\nint main() { S s; return s.x; }\n";
    let tu = json!({
        "main_file": 0,
        "files": [{ "id": 0, "path": "src/main.cpp", "content": src }],
        "decls": [
            {
                "kind": "record", "id": 1, "name": "S",
                "location": loc(0, at(src, "struct S", "S")),
                "fields": [
                    { "id": 2, "name": "", "location": loc(0, at(src, "int : 4", ":")) },
                    { "id": 3, "name": "x", "location": loc(0, at(src, "int x", "x")) }
                ]
            },
            {
                "kind": "function", "id": 4, "name": "main", "is_main": true,
                "location": loc(0, at(src, "int main", "main")),
                "body": [member(3, loc(0, at(src, "s.x", "x")))]
            }
        ]
    });

    let report = run(tu, &RenameConfig::default()).unwrap();
    assert_eq!(
        rewritten(&report, "src/main.cpp"),
        Some("struct S { int : 4; int m_x; };\nint main() { S s; return s.m_x; }\n")
    );
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.diagnostics.iter().next().unwrap().name, "x");
    assert_eq!(
        report.decisions.get(&CanonicalId(DeclId(2))),
        Some(&Decision::Keep)
    );
}

#[test]
fn function_template_instantiations_reach_the_generic_field() {
    let src = "template <typename T> struct Foo { T t_bar; };\n\
               template <typename T> T processFoo(Foo<T>& t_foo) { return t_foo.t_bar; }\n\
               int main() { Foo<int> f; return processFoo(f); }\n";
    let t_bar = loc(0, at(src, "T t_bar", "t_bar"));
    let process = loc(0, at(src, "T processFoo", "processFoo"));

    let tu = json!({
        "main_file": 0,
        "files": [{ "id": 0, "path": "src/foo.cpp", "content": src }],
        "decls": [
            {
                "kind": "class_template", "id": 10, "name": "Foo",
                "location": loc(0, at(src, "struct Foo", "Foo")),
                "templated": {
                    "id": 11, "name": "Foo", "location": loc(0, at(src, "struct Foo", "Foo")),
                    "fields": [{ "id": 12, "name": "t_bar", "location": t_bar }]
                },
                "specializations": [{
                    "id": 20, "name": "Foo", "location": loc(0, at(src, "struct Foo", "Foo")),
                    "specialization": { "template": 10, "kind": "implicit_instantiation" },
                    "fields": [{ "id": 21, "name": "t_bar", "location": t_bar }]
                }]
            },
            {
                "kind": "function_template", "id": 30, "name": "processFoo", "location": process,
                // the generic body only holds a dependent member access
                "templated": {
                    "id": 31, "name": "processFoo", "location": process,
                    "body": [{ "kind": "other" }]
                },
                "specializations": [{
                    "id": 32, "name": "processFoo", "location": process, "instantiated_from": 31,
                    "body": [member(21, loc(0, at(src, "t_foo.t_bar", "t_bar")))]
                }]
            },
            {
                "kind": "function", "id": 40, "name": "main", "is_main": true,
                "location": loc(0, at(src, "int main", "main")),
                "body": [{ "kind": "call", "callee": 32,
                           "callee_loc": loc(0, at(src, "processFoo(f)", "processFoo")) }]
            }
        ]
    });

    let report = run(tu, &RenameConfig::default()).unwrap();
    assert_eq!(
        rewritten(&report, "src/foo.cpp"),
        Some(
            "template <typename T> struct Foo { T m_t_bar; };\n\
             template <typename T> T processFoo(Foo<T>& t_foo) { return t_foo.m_t_bar; }\n\
             int main() { Foo<int> f; return processFoo(f); }\n"
        )
    );
    assert_eq!(report.stats.edits, 2);
    assert_eq!(report.stats.duplicate_edits, 1);
    assert_eq!(report.diagnostics.len(), 1);
    assert_eq!(report.decisions.len(), 1);
    assert!(report.decisions.contains_key(&CanonicalId(DeclId(12))));
}
