//! Build and validate phases, end to end.

use pan_compiler::{build, compile_object, validate, ObjectTemplate, Statement};
use pan_eval::{
    BaseType, ChoiceType, Element, EvalConfig, FullType, Operation, Primitive, RecordField,
};
use pan_types::{ErrorCategory, ErrorCode, Path, Range, SourceRange};
use std::sync::Arc;

// ══════════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════════

fn r() -> SourceRange {
    SourceRange::point(1, 1)
}

fn path(text: &str) -> Path {
    Path::parse(text).unwrap()
}

fn lit(value: impl Into<Element>) -> Operation {
    Operation::literal(value, r())
}

fn long_range(min: i64, max: i64) -> FullType {
    FullType::new(BaseType::primitive(Primitive::Long).with_range(Range::between(min, max).unwrap()))
}

/// `SELF = nlist(); "alpha" = 5;`
fn alpha_template() -> ObjectTemplate {
    let make_dict = Operation::assign(
        "SELF",
        vec![],
        Operation::function("nlist", vec![], r()).unwrap(),
        r(),
    );
    ObjectTemplate::new("node")
        .statement(Statement::dml(make_dict))
        .statement(Statement::assign(path("alpha"), lit(5i64), r()))
}

fn alpha_with_binding(min: i64, max: i64) -> ObjectTemplate {
    alpha_template()
        .statement(Statement::bind(path("/alpha"), long_range(min, max), r()).unwrap())
}

// ══════════════════════════════════════════════════════════════════════════════
// Build
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn build_produces_dict() {
    let result = build(&alpha_template(), Arc::new(EvalConfig::default())).unwrap();
    let dict = result.root.as_hash().unwrap();
    assert_eq!(dict.len(), 1);
    assert_eq!(dict.get("alpha"), Some(&Element::Long(5)));
    assert_eq!(result.object_name(), "node");
}

#[test]
fn build_error_names_the_object() {
    let template = ObjectTemplate::new("broken").statement(Statement::assign(
        path("/x"),
        Operation::variable("missing", vec![], r()),
        r(),
    ));
    let err = build(&template, Arc::new(EvalConfig::default())).unwrap_err();
    assert_eq!(err.code, ErrorCode::UNDEFINED_VARIABLE);
    assert_eq!(err.object.as_deref(), Some("broken"));
}

#[test]
fn user_error_aborts_build() {
    let template = ObjectTemplate::new("node")
        .statement(Statement::assign(path("/a"), lit(1i64), r()))
        .statement(Statement::dml(
            Operation::function("error", vec![lit("stop here")], r()).unwrap(),
        ));
    let err = compile_object(&template).unwrap_err();
    assert_eq!(err.code, ErrorCode::USER_ERROR);
    assert_eq!(err.message, "stop here");
}

#[test]
fn huge_list_index_is_an_error_not_a_crash() {
    let op = Operation::assign("x", vec![lit("18446744073709551615")], lit(1i64), r());
    let template = ObjectTemplate::new("node").statement(Statement::dml(op));
    let err = compile_object(&template).unwrap_err();
    assert_eq!(err.code, ErrorCode::INDEX_TOO_FAR);
    assert_eq!(err.category, ErrorCategory::Evaluation);
    assert_eq!(err.object.as_deref(), Some("node"));

    let far = Operation::assign("x", vec![lit(1_000_000_000_000i64)], lit(1i64), r());
    let template = ObjectTemplate::new("node").statement(Statement::dml(far));
    assert_eq!(compile_object(&template).unwrap_err().code, ErrorCode::INDEX_TOO_FAR);
}

#[test]
fn dml_statement_sees_earlier_assignments() {
    let check = Operation::if_else(
        Operation::function("exists", vec![lit("/a")], r()).unwrap(),
        Operation::assign("SELF", vec![lit("b")], lit(2i64), r()),
        Some(Operation::function("error", vec![lit("/a is missing")], r()).unwrap()),
        r(),
    );
    let template = ObjectTemplate::new("node")
        .statement(Statement::assign(path("/a"), lit(1i64), r()))
        .statement(Statement::dml(check));
    let profile = compile_object(&template).unwrap();
    let json: serde_json::Value = serde_json::from_str(&profile.to_json().unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({"a": 1, "b": 2}));
}

#[test]
fn null_assignment_removes_the_child() {
    let template = ObjectTemplate::new("node")
        .statement(Statement::assign(path("/a"), lit(1i64), r()))
        .statement(Statement::assign(path("/b"), lit(2i64), r()))
        .statement(Statement::assign(path("/a"), Operation::literal(Element::Null, r()), r()));
    let profile = compile_object(&template).unwrap();
    assert_eq!(profile.to_json().unwrap(), "{\n  \"b\": 2\n}");
}

// ══════════════════════════════════════════════════════════════════════════════
// Validate
// ══════════════════════════════════════════════════════════════════════════════

#[test]
fn range_binding_passes() {
    let profile = compile_object(&alpha_with_binding(0, 10)).unwrap();
    assert_eq!(profile.object, "node");
    assert_eq!(
        profile.root.as_hash().unwrap().get("alpha"),
        Some(&Element::Long(5))
    );
}

#[test]
fn range_binding_fails_with_path() {
    let err = compile_object(&alpha_with_binding(6, 10)).unwrap_err();
    assert_eq!(err.code, ErrorCode::RANGE_MISMATCH);
    assert_eq!(err.category, ErrorCategory::Validation);
    assert_eq!(err.path.as_deref(), Some("/alpha"));
    assert_eq!(err.object.as_deref(), Some("node"));
}

#[test]
fn defaults_are_filled_before_validation() {
    let mode = FullType::new(BaseType::Choice(ChoiceType::new(["a", "b"])))
        .with_default(lit("a"));
    let template = ObjectTemplate::new("node")
        .statement(Statement::type_def("mode", mode, r()))
        .statement(Statement::bind_name(path("/mode"), "mode", r()).unwrap());
    // bound path with no value at all
    let profile = compile_object(&template).unwrap();
    assert_eq!(
        profile.root.as_hash().unwrap().get("mode"),
        Some(&Element::from("a"))
    );

    let bad = template
        .clone()
        .statement(Statement::assign(path("/mode"), lit("c"), r()));
    let err = compile_object(&bad).unwrap_err();
    assert_eq!(err.code, ErrorCode::INVALID_CHOICE);
    assert_eq!(err.path.as_deref(), Some("/mode"));
}

#[test]
fn record_defaults_fill_nested_fields() {
    let service = FullType::new(BaseType::record(
        vec![
            RecordField::required("name", BaseType::primitive(Primitive::String).into()),
            RecordField::optional(
                "port",
                long_range(1, 65535).with_default(lit(22i64)),
            ),
        ],
        false,
    ));
    let template = ObjectTemplate::new("node")
        .statement(Statement::type_def("service", service, r()))
        .statement(Statement::assign(path("/ssh/name"), lit("sshd"), r()))
        .statement(Statement::bind_name(path("/ssh"), "service", r()).unwrap());

    let profile = compile_object(&template).unwrap();
    let json: serde_json::Value = serde_json::from_str(&profile.to_json().unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({"ssh": {"name": "sshd", "port": 22}}));
}

#[test]
fn every_default_is_filled_before_constraints_run() {
    let has_x = Operation::function(
        "exists",
        vec![Operation::variable("SELF", vec![lit("x")], r())],
        r(),
    )
    .unwrap();
    let needs_x = FullType::new(BaseType::primitive(Primitive::Dict)).with_validation(has_x);
    let x_default = FullType::new(BaseType::primitive(Primitive::Long)).with_default(lit(5i64));
    let template = ObjectTemplate::new("node")
        .statement(Statement::assign(path("/a/y"), lit(1i64), r()))
        .statement(Statement::bind(path("/a"), needs_x, r()).unwrap())
        .statement(Statement::bind(path("/a/x"), x_default, r()).unwrap());

    let profile = compile_object(&template).unwrap();
    let json: serde_json::Value = serde_json::from_str(&profile.to_json().unwrap()).unwrap();
    assert_eq!(json, serde_json::json!({"a": {"y": 1, "x": 5}}));
}

#[test]
fn leftover_undef_is_an_error() {
    let template = ObjectTemplate::new("node")
        .statement(Statement::assign(path("/list/2"), lit("x"), r()));
    let err = compile_object(&template).unwrap_err();
    assert_eq!(err.code, ErrorCode::UNDEFINED_ELEMENT);
    assert_eq!(err.path.as_deref(), Some("/list/0"));
}

#[test]
fn validation_expression_runs_with_final_self() {
    let mutate = Operation::block(
        vec![
            Operation::assign("SELF", vec![], lit(0i64), r()),
            lit(true),
        ],
        r(),
    );
    let checked = FullType::new(BaseType::primitive(Primitive::Long)).with_validation(mutate);
    let template = alpha_template()
        .statement(Statement::bind(path("/alpha"), checked, r()).unwrap());

    let err = compile_object(&template).unwrap_err();
    assert_eq!(err.code, ErrorCode::SELF_IS_FINAL);
    assert_eq!(err.path.as_deref(), Some("/alpha"));
}

#[test]
fn validate_accepts_a_build_result_directly() {
    let built = build(&alpha_with_binding(0, 10), Arc::new(EvalConfig::default())).unwrap();
    assert_eq!(built.context.bindings().len(), 1);
    let profile = validate(built).unwrap();
    assert_eq!(profile.to_json().unwrap(), "{\n  \"alpha\": 5\n}");
}

#[test]
fn duplicate_type_is_rejected() {
    let template = ObjectTemplate::new("node")
        .statement(Statement::type_def("port", long_range(0, 10), r()))
        .statement(Statement::type_def("port", long_range(0, 20), r()));
    let err = compile_object(&template).unwrap_err();
    assert_eq!(err.code, ErrorCode::DUPLICATE_TYPE_DEFINITION);
}
