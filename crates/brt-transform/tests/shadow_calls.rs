//! Call shadowing tests.
//!
//! Programs are built from JSON documents so that each test reads like the
//! Fortran it stands for.

use brt_transform::{rewrite_calls, ShadowConfig, TransformError};
use brt_xnode::{attr, NodeId, NodeKind, Program, Span, Tree};
use serde_json::{json, Value};

fn program(root_children: Value) -> Program {
    let doc = json!({ "root": { "kind": "XcodeProgram", "children": root_children } });
    Program::from_json(&doc.to_string()).expect("fixture should load")
}

fn call(callee: &str, args: Value) -> Value {
    json!({
        "kind": "functionCall",
        "children": [
            { "kind": "name", "value": callee },
            { "kind": "arguments", "children": args }
        ]
    })
}

fn var(name: &str) -> Value {
    json!({ "kind": "Var", "value": name })
}

fn assign(target: &str, expr: Value) -> Value {
    json!({ "kind": "FassignStatement", "children": [var(target), expr] })
}

fn module(name: &str, decls: Value, body: Value) -> Value {
    json!({
        "kind": "FmoduleDefinition",
        "attrs": { "name": name },
        "children": [
            { "kind": "declarations", "children": decls },
            { "kind": "body", "children": body }
        ]
    })
}

fn function(name: &str, decls: Value, body: Value) -> Value {
    json!({
        "kind": "FfunctionDefinition",
        "attrs": { "name": name },
        "children": [
            { "kind": "name", "value": name },
            { "kind": "declarations", "children": decls },
            { "kind": "body", "children": body }
        ]
    })
}

fn callee_names(tree: &Tree) -> Vec<String> {
    tree.match_all(NodeKind::FunctionCall)
        .into_iter()
        .map(|c| {
            let name = tree.first_child(c, NodeKind::Name).unwrap();
            tree.value(name).unwrap().to_string()
        })
        .collect()
}

fn uses_in(tree: &Tree, scope: NodeId) -> Vec<String> {
    let decls = tree.first_child(scope, NodeKind::Declarations).unwrap();
    tree.children(decls)
        .iter()
        .filter(|&&d| tree.kind(d) == NodeKind::UseDecl)
        .map(|&d| tree.attr(d, attr::NAME).unwrap().to_string())
        .collect()
}

fn scopes(tree: &Tree, kind: NodeKind) -> Vec<NodeId> {
    tree.match_all(kind)
}

// =============================================================================
// Renaming
// =============================================================================

#[test]
fn test_module_call_renamed_and_imported() {
    // module M; y = sin(x)
    let mut program = program(json!([module(
        "M",
        json!([]),
        json!([assign("y", call("sin", json!([var("x")])))])
    )]));
    let config = ShadowConfig::new("shadow_", ["sin"], ["mo_br"]);

    let report = rewrite_calls(&mut program, &config).unwrap();

    let tree = &program.tree;
    assert_eq!(callee_names(tree), vec!["shadow_sin"]);
    let m = scopes(tree, NodeKind::ModuleDefinition)[0];
    assert_eq!(uses_in(tree, m), vec!["mo_br"]);
    assert_eq!(report.renamed.len(), 1);
    assert_eq!(report.renamed[0].original, "sin");
    assert_eq!(report.renamed[0].renamed, "shadow_sin");
}

#[test]
fn test_case_preserved_after_prefix() {
    let mut program = program(json!([module(
        "m",
        json!([]),
        json!([
            assign("a", call("EXP", json!([var("x")]))),
            assign("b", call("Log", json!([var("x")])))
        ])
    )]));
    let config = ShadowConfig::new("br_", ["exp", "LOG"], ["mo_br_transcendentals"]);

    rewrite_calls(&mut program, &config).unwrap();

    assert_eq!(callee_names(&program.tree), vec!["br_EXP", "br_Log"]);
}

#[test]
fn test_empty_prefix_imports_without_renaming() {
    let mut program = program(json!([module(
        "m",
        json!([]),
        json!([assign("a", call("Exp", json!([var("x")])))])
    )]));
    let config = ShadowConfig::new("", ["exp"], ["mo_br_transcendentals"]);

    let report = rewrite_calls(&mut program, &config).unwrap();

    let tree = &program.tree;
    assert_eq!(callee_names(tree), vec!["Exp"]);
    let m = scopes(tree, NodeKind::ModuleDefinition)[0];
    assert_eq!(uses_in(tree, m), vec!["mo_br_transcendentals"]);
    assert_eq!(report.renamed.len(), 1);
    assert_eq!(report.renamed[0].renamed, "Exp");
}

#[test]
fn test_non_target_calls_untouched() {
    let mut program = program(json!([module(
        "m",
        json!([]),
        json!([
            assign("a", call("sqrt", json!([var("x")]))),
            assign("b", call("my_exp", json!([var("x")])))
        ])
    )]));
    let config = ShadowConfig::new("br_", ["exp"], ["mo_br"]);

    let report = rewrite_calls(&mut program, &config).unwrap();

    let tree = &program.tree;
    assert_eq!(callee_names(tree), vec!["sqrt", "my_exp"]);
    assert!(report.renamed.is_empty());
    let m = scopes(tree, NodeKind::ModuleDefinition)[0];
    assert!(uses_in(tree, m).is_empty());
}

#[test]
fn test_call_in_declarations_is_renamed() {
    // real, parameter :: c = exp(1.0)
    let decl = json!({
        "kind": "varDecl",
        "children": [
            { "kind": "name", "value": "c" },
            call("exp", json!([{ "kind": "FrealConstant", "value": "1.0" }]))
        ]
    });
    let mut program = program(json!([module("m", json!([decl]), json!([]))]));
    let config = ShadowConfig::new("br_", ["exp"], ["mo_br"]);

    rewrite_calls(&mut program, &config).unwrap();

    let tree = &program.tree;
    assert_eq!(callee_names(tree), vec!["br_exp"]);
    let m = scopes(tree, NodeKind::ModuleDefinition)[0];
    assert_eq!(uses_in(tree, m), vec!["mo_br"]);
}

// =============================================================================
// Import injection
// =============================================================================

#[test]
fn test_one_use_per_module_per_scope() {
    let existing = json!({ "kind": "FuseDecl", "attrs": { "name": "iso_fortran_env" } });
    let mut program = program(json!([module(
        "m",
        json!([existing]),
        json!([
            assign("a", call("exp", json!([var("x")]))),
            assign("b", call("exp", json!([call("log", json!([var("y")]))]))),
            assign("c", call("cos", json!([var("z")])))
        ])
    )]));
    let config = ShadowConfig::new("br_", ["exp", "log", "cos"], ["mo_br_a", "mo_br_b"]);

    let report = rewrite_calls(&mut program, &config).unwrap();

    let tree = &program.tree;
    assert_eq!(report.renamed.len(), 4);
    assert_eq!(report.imports.len(), 2);
    let m = scopes(tree, NodeKind::ModuleDefinition)[0];
    assert_eq!(uses_in(tree, m), vec!["iso_fortran_env", "mo_br_a", "mo_br_b"]);
}

#[test]
fn test_each_scope_gets_its_own_use() {
    let mut program = program(json!([
        function("f", json!([]), json!([assign("f", call("exp", json!([var("x")])))])),
        function("g", json!([]), json!([assign("g", call("exp", json!([var("x")])))])),
        function("h", json!([]), json!([assign("h", call("abs", json!([var("x")])))]))
    ]));
    let config = ShadowConfig::new("br_", ["exp"], ["mo_br"]);

    rewrite_calls(&mut program, &config).unwrap();

    let tree = &program.tree;
    let funcs = scopes(tree, NodeKind::FunctionDefinition);
    assert_eq!(uses_in(tree, funcs[0]), vec!["mo_br"]);
    assert_eq!(uses_in(tree, funcs[1]), vec!["mo_br"]);
    assert!(uses_in(tree, funcs[2]).is_empty());
}

#[test]
fn test_contained_procedure_imports_into_module() {
    let contained = function("f", json!([]), json!([assign("f", call("exp", json!([var("x")])))]));
    let module_doc = json!({
        "kind": "FmoduleDefinition",
        "attrs": { "name": "m" },
        "children": [
            { "kind": "declarations" },
            { "kind": "FcontainsStatement", "children": [contained] }
        ]
    });
    let mut program = program(json!([module_doc]));
    let config = ShadowConfig::new("br_", ["exp"], ["mo_br"]);

    rewrite_calls(&mut program, &config).unwrap();

    let tree = &program.tree;
    let m = scopes(tree, NodeKind::ModuleDefinition)[0];
    let f = scopes(tree, NodeKind::FunctionDefinition)[0];
    assert_eq!(uses_in(tree, m), vec!["mo_br"]);
    assert!(uses_in(tree, f).is_empty());
}

#[test]
fn test_second_pass_renames_nothing() {
    let mut program = program(json!([module(
        "m",
        json!([]),
        json!([assign("a", call("exp", json!([var("x")])))])
    )]));
    let config = ShadowConfig::new("br_", ["exp"], ["mo_br"]);

    rewrite_calls(&mut program, &config).unwrap();
    let report = rewrite_calls(&mut program, &config).unwrap();

    let tree = &program.tree;
    assert!(report.renamed.is_empty());
    assert!(report.imports.is_empty());
    assert_eq!(callee_names(tree), vec!["br_exp"]);
    let m = scopes(tree, NodeKind::ModuleDefinition)[0];
    assert_eq!(uses_in(tree, m), vec!["mo_br"]);
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn test_call_outside_any_scope_fails_without_changes() {
    let mut doc = call("exp", json!([var("x")]));
    doc["span"] = json!({ "line": 3 });
    let mut program = program(json!([
        module("m", json!([]), json!([assign("a", call("exp", json!([var("x")])))])),
        { "kind": "globalDeclarations", "children": [doc] }
    ]));
    let config = ShadowConfig::new("br_", ["exp"], ["mo_br"]);

    let err = rewrite_calls(&mut program, &config).unwrap_err();

    assert!(matches!(
        err,
        TransformError::ScopeResolution {
            kind: NodeKind::FunctionCall,
            ..
        }
    ));
    assert_eq!(err.span(), Some(Span::line(3)));
    let tree = &program.tree;
    assert_eq!(callee_names(tree), vec!["exp", "exp"]);
    let m = scopes(tree, NodeKind::ModuleDefinition)[0];
    assert!(uses_in(tree, m).is_empty());
}

#[test]
fn test_scope_without_declarations_fails() {
    let mut program = program(json!([{
        "kind": "FfunctionDefinition",
        "children": [
            { "kind": "body", "children": [assign("a", call("exp", json!([var("x")])))] }
        ]
    }]));
    let config = ShadowConfig::new("br_", ["exp"], ["mo_br"]);

    let err = rewrite_calls(&mut program, &config).unwrap_err();

    assert!(matches!(err, TransformError::TreeInvariant { .. }));
    assert_eq!(callee_names(&program.tree), vec!["exp"]);
}
