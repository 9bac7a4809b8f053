//! Class registry and module verification tests.

use om_eval::{ClassRegistry, EvalError};
use om_parser::parse_str;
use om_types::ir::Module;
use om_types::{Diagnostics, ErrorCode, SourceFile};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

const TEST_MLIR: &str = include_str!("fixtures/test.mlir");

fn load(source: &str) -> Module {
    parse_str("test.mlir", source).unwrap_or_else(|errors| panic!("parse errors:\n{errors}"))
}

fn build_ok(source: &str) -> ClassRegistry {
    ClassRegistry::build(&load(source)).unwrap_or_else(|errors| panic!("verify errors:\n{errors}"))
}

fn build_err(source: &str) -> Diagnostics {
    match ClassRegistry::build(&load(source)) {
        Ok(_) => panic!("expected verification errors"),
        Err(errors) => errors,
    }
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    build_err(source).errors.iter().map(|e| e.code).collect()
}

fn error_messages(source: &str) -> Vec<String> {
    build_err(source)
        .errors
        .into_iter()
        .map(|e| e.message)
        .collect()
}

// ─────────────────────────────────────────────────────────────────────
// Registration
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_registers_classes_in_order() {
    let registry = build_ok(TEST_MLIR);
    assert_eq!(registry.len(), 3);
    let names: Vec<&str> = registry.classes().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Test", "Child", "Nest"]);
    assert_eq!(registry.file(), "test.mlir");
}

#[test]
fn test_lookup() {
    let registry = build_ok(TEST_MLIR);
    let test = registry.lookup("Test").unwrap();
    assert_eq!(test.signature(), "om.class @Test(%param: !om.integer)");
    assert_eq!(test.params().len(), 1);
    assert_eq!(test.fields().len(), 8);
    assert_eq!(test.field("nest").unwrap().value, "2");
    assert!(test.defining_op("list_child").is_some());
    assert!(test.defining_op("param").is_none());
    assert_eq!(test.location().to_string(), "test.mlir:4:3");
}

#[test]
fn test_lookup_missing_class() {
    let registry = build_ok(TEST_MLIR);
    assert!(matches!(
        registry.lookup("Nope"),
        Err(EvalError::ClassNotFound { name, .. }) if name == "Nope"
    ));
    assert!(registry.get("Nope").is_none());
}

#[test]
fn test_instantiated_classes() {
    let registry = build_ok(TEST_MLIR);
    let targets: Vec<&str> = registry.get("Test").unwrap().instantiated_classes().collect();
    assert_eq!(targets, vec!["Child", "Child", "Nest"]);
}

#[test]
fn test_module_values_and_symbols() {
    let registry = build_ok(TEST_MLIR);
    assert!(registry.module_value("sym").is_some());
    assert!(registry.module_value("param").is_none());
    assert_eq!(registry.symbols().module_count(), 1);
}

#[test]
fn test_empty_module() {
    let registry = build_ok("module {\n}\n");
    assert!(registry.is_empty());
}

// ─────────────────────────────────────────────────────────────────────
// Symbols
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_duplicate_class() {
    let errors = build_err("om.class @A() {\n}\nom.class @A() {\n}\n");
    assert_eq!(errors.errors.len(), 1);
    let err = &errors.errors[0];
    assert_eq!(err.code, ErrorCode::DUPLICATE_SYMBOL);
    assert_eq!(err.message, "redefinition of symbol @A");
    assert_eq!(err.span.start_line, 3);
    assert_eq!(err.suggestion.as_deref(), Some("previous definition at 1:10"));
}

#[test]
fn test_class_collides_with_hw_module() {
    let codes = error_codes("hw.module @A() {\n}\nom.class @A() {\n}\n");
    assert_eq!(codes, vec![ErrorCode::DUPLICATE_SYMBOL]);
}

// ─────────────────────────────────────────────────────────────────────
// Values and fields
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_duplicate_field() {
    let source = "om.class @A(%x: !om.integer) {\n  om.class.field @f, %x : !om.integer\n  om.class.field @f, %x : !om.integer\n}\n";
    assert_eq!(
        error_messages(source),
        vec!["field @f is declared more than once in class @A".to_string()]
    );
}

#[test]
fn test_duplicate_value() {
    let source = "om.class @A() {\n  %c = om.constant 1 : !om.integer\n  %c = om.constant 2 : !om.integer\n}\n";
    assert_eq!(error_codes(source), vec![ErrorCode::DUPLICATE_VALUE]);
}

#[test]
fn test_duplicate_parameter() {
    let source = "om.class @A(%x: !om.integer, %x: !om.string) {\n}\n";
    assert_eq!(
        error_messages(source),
        vec!["redefinition of value '%x' in class @A".to_string()]
    );
}

#[test]
fn test_undefined_value() {
    let errors = build_err("om.class @A() {\n  om.class.field @f, %missing : !om.integer\n}\n");
    let err = &errors.errors[0];
    assert_eq!(err.code, ErrorCode::UNDEFINED_VALUE);
    assert_eq!(err.message, "use of undefined value '%missing'");
    assert_eq!(
        err.suggestion.as_deref(),
        Some("define '%missing' before it is used")
    );
}

#[test]
fn test_use_before_definition() {
    let source = "om.class @A() {\n  om.class.field @f, %c : !om.integer\n  %c = om.constant 1 : !om.integer\n}\n";
    assert_eq!(error_codes(source), vec![ErrorCode::UNDEFINED_VALUE]);
}

#[test]
fn test_class_values_are_not_visible_in_other_classes() {
    let source = "om.class @A() {\n  %c = om.constant 1 : !om.integer\n}\nom.class @B() {\n  om.class.field @f, %c : !om.integer\n}\n";
    assert_eq!(error_codes(source), vec![ErrorCode::UNDEFINED_VALUE]);
}

#[test]
fn test_module_values_are_visible_in_classes() {
    let source = "%g = om.constant 1 : !om.integer\nom.class @A() {\n  om.class.field @f, %g : !om.integer\n}\n";
    build_ok(source);
}

#[test]
fn test_module_level_object_is_rejected() {
    let source = "om.class @A() {\n}\n%o = om.object @A() : () -> !om.class.type<@A>\n";
    assert_eq!(
        error_messages(source),
        vec!["'om.object' is only allowed inside an 'om.class' body".to_string()]
    );
}

// ─────────────────────────────────────────────────────────────────────
// Objects
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_class_target() {
    let source = "om.class @A() {\n  %o = om.object @Ghost() : () -> !om.class.type<@Ghost>\n}\n";
    assert_eq!(
        error_messages(source),
        vec!["'om.object' refers to undefined class @Ghost".to_string()]
    );
}

#[test]
fn test_object_arity_mismatch() {
    let source = "om.class @Leaf(%v: !om.integer) {\n}\nom.class @A() {\n  %o = om.object @Leaf() : () -> !om.class.type<@Leaf>\n}\n";
    let errors = build_err(source);
    assert_eq!(errors.errors[0].code, ErrorCode::OBJECT_ARITY_MISMATCH);
    assert_eq!(
        errors.errors[0].message,
        "'om.object' passes 0 actual parameter(s) to @Leaf, which declares 1"
    );
}

#[test]
fn test_instantiation_cycle() {
    let source = "om.class @A() {\n  %b = om.object @B() : () -> !om.class.type<@B>\n}\n\
                  om.class @B() {\n  %a = om.object @A() : () -> !om.class.type<@A>\n}\n";
    let errors = build_err(source);
    assert_eq!(errors.errors.len(), 1);
    assert_eq!(errors.errors[0].code, ErrorCode::CYCLIC_CLASS);
    assert_eq!(
        errors.errors[0].message,
        "class @A instantiates itself: @A -> @B -> @A"
    );
}

#[test]
fn test_self_instantiation() {
    let source = "om.class @A() {\n  %a = om.object @A() : () -> !om.class.type<@A>\n}\n";
    assert_eq!(
        error_messages(source),
        vec!["class @A instantiates itself: @A -> @A".to_string()]
    );
}

#[test]
fn test_diamond_is_not_a_cycle() {
    let source = "om.class @Leaf() {\n}\n\
                  om.class @L() {\n  %x = om.object @Leaf() : () -> !om.class.type<@Leaf>\n}\n\
                  om.class @R() {\n  %x = om.object @Leaf() : () -> !om.class.type<@Leaf>\n}\n\
                  om.class @Top() {\n  %l = om.object @L() : () -> !om.class.type<@L>\n  %r = om.object @R() : () -> !om.class.type<@R>\n}\n";
    build_ok(source);
}

// ─────────────────────────────────────────────────────────────────────
// Diagnostics
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_errors_are_collected() {
    let source = "om.class @A() {\n  om.class.field @f, %x : !om.integer\n  om.class.field @g, %y : !om.integer\n  %o = om.object @Ghost() : () -> !om.class.type<@Ghost>\n}\n";
    assert_eq!(build_err(source).total_errors, 3);
}

#[test]
fn test_build_with_source_attaches_line() {
    let text = "om.class @A() {\n  om.class.field @f, %x : !om.integer\n}\n";
    let source = SourceFile::new("test.mlir", text);
    let errors = ClassRegistry::build_with_source(&load(text), &source).unwrap_err();
    assert_eq!(
        errors.errors[0].source_line,
        "  om.class.field @f, %x : !om.integer"
    );
}

#[test]
fn test_diagnostics_serialize_to_json() {
    let errors = build_err("om.class @A() {\n  om.class.field @f, %x : !om.integer\n}\n");
    let json = serde_json::to_value(&errors).unwrap();
    assert_eq!(json["total_errors"], 1);
    assert_eq!(json["errors"][0]["code"], 203);
    assert_eq!(json["errors"][0]["category"], "symbol");
    assert_eq!(json["errors"][0]["severity"], "error");
    assert_eq!(json["errors"][0]["line"], 2);
    assert_eq!(json["errors"][0]["file"], "test.mlir");
}
