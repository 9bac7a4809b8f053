//! Parser tests for the textual OM IR.
//!
//! Covers:
//! 1. A complete module with classes, module-level constants and `hw.module`
//! 2. Every operation and attribute form
//! 3. Type syntax
//! 4. Error codes, recovery and the error cap

use om_lexer::Lexer;
use om_parser::{parse_str, ParseResult, Parser};
use om_types::ir::*;
use om_types::{ErrorCode, OmType, SourceFile, MAX_ERRORS};

// ─────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────

const TEST_MODULE: &str = r#"module {
  %sym = om.constant #om.ref<<@Root::@x>> : !om.ref

  om.class @Test(%param: !om.integer) {
    om.class.field @field, %param : !om.integer

    %c_14 = om.constant #om.integer<14> : !om.integer
    %0 = om.object @Child(%c_14) : (!om.integer) -> !om.class.type<@Child>
    om.class.field @child, %0 : !om.class.type<@Child>

    om.class.field @reference, %sym : !om.ref

    %list = om.constant #om.list<!om.string, ["X" : !om.string, "Y" : !om.string]> : !om.list<!om.string>
    om.class.field @list, %list : !om.list<!om.string>

    %tuple = om.tuple_create %list, %c_14: !om.list<!om.string>, !om.integer
    om.class.field @tuple, %tuple : tuple<!om.list<!om.string>, !om.integer>

    %c_15 = om.constant #om.integer<15> : !om.integer
    %1 = om.object @Child(%c_15) : (!om.integer) -> !om.class.type<@Child>
    %list_child = om.list_create %0, %1: !om.class.type<@Child>
    %2 = om.object @Nest(%list_child) : (!om.list<!om.class.type<@Child>>) -> !om.class.type<@Nest>
    om.class.field @nest, %2 : !om.class.type<@Nest>

    %3 = om.constant #om.map<!om.integer, {a = #om.integer<42>, b = #om.integer<32>}> : !om.map<!om.string, !om.integer>
    om.class.field @map, %3 : !om.map<!om.string, !om.integer>

    %x = om.constant "X" : !om.string
    %y = om.constant "Y" : !om.string
    %entry1 = om.tuple_create %x, %c_14: !om.string, !om.integer
    %entry2 = om.tuple_create %y, %c_15: !om.string, !om.integer

    %map = om.map_create %entry1, %entry2: !om.string, !om.integer
    om.class.field @map_create, %map : !om.map<!om.string, !om.integer>
  }

  om.class @Child(%0: !om.integer) {
    om.class.field @foo, %0 : !om.integer
  }

  om.class @Nest(%0: !om.list<!om.class.type<@Child>>) {
    om.class.field @list_child, %0 : !om.list<!om.class.type<@Child>>
  }

  hw.module @Root(%clock: i1) -> () {
    %0 = sv.wire sym @x : !hw.inout<i1>
  }
}
"#;

/// Parse source and return the result (module + errors).
fn parse(source: &str) -> ParseResult {
    let sf = SourceFile::new("test.mlir", source);
    let lex = Lexer::new(&sf).lex();
    Parser::new(lex.tokens, &sf).parse()
}

/// Parse source and return the module, panicking if there are errors.
fn parse_ok(source: &str) -> Module {
    let result = parse(source);
    if result.errors.has_errors() {
        for e in &result.errors.errors {
            eprintln!("  ERROR: {} ({})", e.message, e.code);
        }
        panic!("unexpected parse errors (see above)");
    }
    result.module.expect("no module returned")
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    parse(source).errors.errors.iter().map(|e| e.code).collect()
}

fn error_messages(source: &str) -> Vec<String> {
    parse(source)
        .errors
        .errors
        .into_iter()
        .map(|e| e.message)
        .collect()
}

/// Wrap operation lines in a single-class module.
fn in_class(body: &str) -> String {
    format!("om.class @C(%a: !om.integer) {{\n{body}\n}}\n")
}

/// The body operations of the only class in `source`.
fn class_body(source: &str) -> Vec<Operation> {
    let module = parse_ok(source);
    let class = module.classes().next().expect("no class parsed");
    class.body.clone()
}

fn first_op_kind(body: &str) -> OpKind {
    class_body(&in_class(body))
        .into_iter()
        .next()
        .expect("empty class body")
        .kind
}

// ─────────────────────────────────────────────────────────────────────
// Complete module
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_module_classes_in_order() {
    let module = parse_ok(TEST_MODULE);
    let names: Vec<&str> = module.classes().map(|c| c.name.name.as_str()).collect();
    assert_eq!(names, vec!["Test", "Child", "Nest"]);
}

#[test]
fn test_module_file_name() {
    let module = parse_ok(TEST_MODULE);
    assert_eq!(module.file, "test.mlir");
}

#[test]
fn test_test_class_params() {
    let module = parse_ok(TEST_MODULE);
    let test = module.classes().next().unwrap();
    assert_eq!(test.params.len(), 1);
    assert_eq!(test.params[0].name.name, "param");
    assert_eq!(test.params[0].ty, OmType::Integer);
    assert_eq!(test.signature(), "om.class @Test(%param: !om.integer)");
}

#[test]
fn test_test_class_field_order() {
    let module = parse_ok(TEST_MODULE);
    let test = module.classes().next().unwrap();
    let fields: Vec<&str> = test.fields().map(|f| f.name.name.as_str()).collect();
    assert_eq!(
        fields,
        vec!["field", "child", "reference", "list", "tuple", "nest", "map", "map_create"]
    );
}

#[test]
fn test_module_level_constant() {
    let module = parse_ok(TEST_MODULE);
    let ops: Vec<&Operation> = module.module_ops().collect();
    assert_eq!(ops.len(), 1);
    assert_eq!(ops[0].result.as_ref().unwrap().name, "sym");
    assert_eq!(
        ops[0].kind,
        OpKind::Constant {
            value: Attribute::Ref(SymbolPath::new(["Root", "x"])),
            ty: OmType::Ref,
        }
    );
}

#[test]
fn test_hw_module_inner_symbols() {
    let module = parse_ok(TEST_MODULE);
    let hw: Vec<&HwModuleOp> = module.hw_modules().collect();
    assert_eq!(hw.len(), 1);
    assert_eq!(hw[0].name.name, "Root");
    let symbols: Vec<&str> = hw[0].inner_symbols.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(symbols, vec!["x"]);
}

#[test]
fn test_class_span_points_at_keyword() {
    let module = parse_ok(TEST_MODULE);
    let test = module.classes().next().unwrap();
    assert_eq!(test.span.start_line, 4);
    assert_eq!(test.span.start_col, 3);
}

#[test]
fn test_module_without_wrapper() {
    let module = parse_ok("om.class @A() {\n}\nom.class @B() {\n}\n");
    assert_eq!(module.classes().count(), 2);
}

#[test]
fn test_empty_module() {
    let module = parse_ok("module {\n}\n");
    assert!(module.ops.is_empty());
}

#[test]
fn test_parse_str_reports_errors() {
    let err = parse_str("bad.mlir", "om.class @A( {\n}\n").unwrap_err();
    assert!(err.has_errors());
    assert_eq!(err.errors[0].file, "bad.mlir");
}

// ─────────────────────────────────────────────────────────────────────
// Operations
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_integer_constant_forms() {
    assert_eq!(
        first_op_kind("%c = om.constant #om.integer<14> : !om.integer"),
        OpKind::Constant {
            value: Attribute::Integer(14),
            ty: OmType::Integer,
        }
    );
    assert_eq!(
        first_op_kind("%c = om.constant -3 : i64"),
        OpKind::Constant {
            value: Attribute::Integer(-3),
            ty: OmType::Int(64),
        }
    );
}

#[test]
fn test_string_constant() {
    assert_eq!(
        first_op_kind(r#"%s = om.constant "X" : !om.string"#),
        OpKind::Constant {
            value: Attribute::String("X".into()),
            ty: OmType::String,
        }
    );
}

#[test]
fn test_list_constant() {
    let kind = first_op_kind(
        r#"%l = om.constant #om.list<!om.string, ["X" : !om.string, "Y" : !om.string]> : !om.list<!om.string>"#,
    );
    assert_eq!(
        kind,
        OpKind::Constant {
            value: Attribute::List {
                element_ty: OmType::String,
                elements: vec![Attribute::String("X".into()), Attribute::String("Y".into())],
            },
            ty: OmType::list(OmType::String),
        }
    );
}

#[test]
fn test_empty_list_constant() {
    let kind = first_op_kind("%l = om.constant #om.list<!om.integer, []> : !om.list<!om.integer>");
    match kind {
        OpKind::Constant {
            value: Attribute::List { elements, .. },
            ..
        } => assert!(elements.is_empty()),
        other => panic!("expected list constant, got {other:?}"),
    }
}

#[test]
fn test_map_constant_keeps_textual_order() {
    let kind = first_op_kind(
        "%m = om.constant #om.map<!om.integer, {b = #om.integer<32>, a = #om.integer<42>}> : !om.map<!om.string, !om.integer>",
    );
    match kind {
        OpKind::Constant {
            value: Attribute::Map { value_ty, entries },
            ty,
        } => {
            assert_eq!(value_ty, OmType::Integer);
            assert_eq!(ty, OmType::map(OmType::String, OmType::Integer));
            let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
            assert_eq!(keys, vec!["b", "a"]);
            assert_eq!(entries[1].1, Attribute::Integer(42));
        }
        other => panic!("expected map constant, got {other:?}"),
    }
}

#[test]
fn test_object_op() {
    let module = parse_ok(
        "om.class @Child(%v: !om.integer) {\n}\n\
         om.class @C(%a: !om.integer) {\n  %o = om.object @Child(%a) : (!om.integer) -> !om.class.type<@Child>\n}\n",
    );
    let class = module.classes().nth(1).unwrap();
    match &class.body[0].kind {
        OpKind::Object {
            class,
            actuals,
            operand_types,
            ty,
        } => {
            assert_eq!(class.name, "Child");
            assert_eq!(actuals.len(), 1);
            assert_eq!(actuals[0].name, "a");
            assert_eq!(operand_types, &vec![OmType::Integer]);
            assert_eq!(ty, &OmType::Class("Child".into()));
        }
        other => panic!("expected om.object, got {other:?}"),
    }
}

#[test]
fn test_object_without_actuals() {
    let module = parse_ok(
        "om.class @Leaf() {\n}\n\
         om.class @C() {\n  %o = om.object @Leaf() : () -> !om.class.type<@Leaf>\n}\n",
    );
    let class = module.classes().nth(1).unwrap();
    assert!(matches!(
        &class.body[0].kind,
        OpKind::Object { actuals, operand_types, .. } if actuals.is_empty() && operand_types.is_empty()
    ));
}

#[test]
fn test_list_create() {
    match first_op_kind("%l = om.list_create %a, %a : !om.integer") {
        OpKind::ListCreate {
            elements,
            element_ty,
        } => {
            let names: Vec<&str> = elements.iter().map(|e| e.name.as_str()).collect();
            assert_eq!(names, vec!["a", "a"]);
            assert_eq!(element_ty, OmType::Integer);
        }
        other => panic!("expected list_create, got {other:?}"),
    }
}

#[test]
fn test_tuple_create() {
    match first_op_kind("%t = om.tuple_create %a, %a: !om.integer, i1") {
        OpKind::TupleCreate {
            elements,
            element_tys,
        } => {
            assert_eq!(elements.len(), 2);
            assert_eq!(element_tys, vec![OmType::Integer, OmType::Int(1)]);
        }
        other => panic!("expected tuple_create, got {other:?}"),
    }
}

#[test]
fn test_map_create() {
    match first_op_kind("%m = om.map_create %a, %a: !om.string, !om.integer") {
        OpKind::MapCreate {
            entries,
            key_ty,
            value_ty,
        } => {
            assert_eq!(entries.len(), 2);
            assert_eq!(key_ty, OmType::String);
            assert_eq!(value_ty, OmType::Integer);
        }
        other => panic!("expected map_create, got {other:?}"),
    }
}

#[test]
fn test_class_field() {
    match first_op_kind("om.class.field @out, %a : !om.integer") {
        OpKind::ClassField { name, value, ty } => {
            assert_eq!(name.name, "out");
            assert_eq!(value.name, "a");
            assert_eq!(ty, OmType::Integer);
        }
        other => panic!("expected class field, got {other:?}"),
    }
}

#[test]
fn test_operation_span_covers_line() {
    let body = class_body(&in_class("  %c = om.constant 1 : !om.integer"));
    assert_eq!(body[0].span.start_line, 2);
    assert_eq!(body[0].span.start_col, 3);
}

// ─────────────────────────────────────────────────────────────────────
// Types
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_nested_types() {
    let module = parse_ok(
        "om.class @C(%a: !om.map<!om.string, !om.list<!om.class.type<@C>>>, %b: tuple<i1, !om.any>, %c: !om.ref) {\n}\n",
    );
    let params: Vec<OmType> = module.classes().next().unwrap().params.iter().map(|p| p.ty.clone()).collect();
    assert_eq!(
        params,
        vec![
            OmType::map(OmType::String, OmType::list(OmType::Class("C".into()))),
            OmType::Tuple(vec![OmType::Int(1), OmType::Any]),
            OmType::Ref,
        ]
    );
}

#[test]
fn test_unknown_type() {
    let codes = error_codes("om.class @C(%a: !om.float) {\n}\n");
    assert_eq!(codes[0], ErrorCode::UNKNOWN_TYPE);
}

// ─────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_unknown_operation_has_suggestion() {
    let result = parse(&in_class("  %c = om.frobnicate %a : !om.integer"));
    let err = &result.errors.errors[0];
    assert_eq!(err.code, ErrorCode::UNKNOWN_OPERATION);
    assert_eq!(err.message, "unknown operation 'om.frobnicate'");
    assert!(err.suggestion.as_deref().unwrap().contains("om.constant"));
}

#[test]
fn test_field_outside_class() {
    let messages = error_messages("om.class.field @x, %a : !om.integer\n");
    assert_eq!(
        messages,
        vec!["'om.class.field' must appear inside an 'om.class' body".to_string()]
    );
}

#[test]
fn test_field_with_result_is_rejected() {
    let messages = error_messages(&in_class("  %r = om.class.field @x, %a : !om.integer"));
    assert_eq!(
        messages,
        vec!["'om.class.field' does not produce a result".to_string()]
    );
}

#[test]
fn test_operation_without_result_is_rejected() {
    let messages = error_messages(&in_class("  om.constant 1 : !om.integer"));
    assert_eq!(
        messages,
        vec!["'om.constant' must define a result value".to_string()]
    );
}

#[test]
fn test_tuple_type_count_mismatch() {
    let messages = error_messages(&in_class("  %t = om.tuple_create %a, %a: !om.integer"));
    assert_eq!(
        messages,
        vec!["om.tuple_create has 2 element(s) but 1 type(s)".to_string()]
    );
}

#[test]
fn test_unknown_attribute() {
    let codes = error_codes(&in_class("  %c = om.constant #om.float<1> : !om.integer"));
    assert_eq!(codes, vec![ErrorCode::INVALID_ATTRIBUTE]);
}

#[test]
fn test_recovery_reports_each_bad_line() {
    let source = in_class(
        "  %c = om.frobnicate\n  %d = om.constant 1 : !om.integer\n  %e = om.wibble\n",
    );
    let result = parse(&source);
    assert_eq!(result.errors.total_errors, 2);
}

#[test]
fn test_recovery_keeps_good_operations() {
    let result = parse(&in_class(
        "  %c = om.frobnicate\n  %d = om.constant 1 : !om.integer",
    ));
    let module = result.module.expect("module should still be produced");
    let class = module.classes().next().expect("class should survive recovery");
    assert_eq!(class.body.len(), 1);
}

#[test]
fn test_unclosed_class_body() {
    let messages = error_messages("om.class @C() {\n  %c = om.constant 1 : !om.integer\n");
    assert!(messages.iter().any(|m| m.contains("unclosed body of class @C")));
}

#[test]
fn test_error_cap() {
    let body: String = (0..40).map(|i| format!("  %v{i} = om.bogus\n")).collect();
    let result = parse(&in_class(&body));
    assert!(result.errors.total_errors >= MAX_ERRORS);
    assert!(result.errors.errors.len() <= MAX_ERRORS);
}

// ─────────────────────────────────────────────────────────────────────
// Determinism
// ─────────────────────────────────────────────────────────────────────

#[test]
fn test_determinism_100_iterations() {
    let first = parse_ok(TEST_MODULE);
    for _ in 0..100 {
        assert_eq!(parse_ok(TEST_MODULE), first);
    }
}
