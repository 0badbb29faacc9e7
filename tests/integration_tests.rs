// tests/integration_tests.rs

use std::collections::BTreeSet;

use formula_lang::compile::{CompiledFormula, FormulaCompiler};
use formula_lang::config::{ConfigError, Limits};
use formula_lang::dependencies::{DependencySet, FieldDependency};
use formula_lang::error::FormulaError;
use formula_lang::schema::StaticSchema;
use formula_lang::types::FormulaType;
use pretty_assertions::assert_eq;
use serde_json::json;

fn schema() -> StaticSchema {
    StaticSchema::new()
        .with_field("price", FormulaType::number(2))
        .with_field("quantity", FormulaType::number(0))
        .with_field("name", FormulaType::Text)
        .with_field("due", FormulaType::date())
        .with_link(
            "orders",
            [("total", FormulaType::number(2)), ("paid", FormulaType::Boolean)],
        )
}

fn compile(source: &str) -> Result<CompiledFormula, FormulaError> {
    FormulaCompiler::default().compile(source, &schema())
}

// ============================================================================
// Full pipeline
// ============================================================================

#[test]
fn test_invoice_total() {
    let compiled = compile("field('price') * field('quantity') + 0.5").unwrap();

    assert_eq!(compiled.formula_type, FormulaType::number(2));
    assert_eq!(
        compiled.dependencies,
        DependencySet::from([
            FieldDependency::field("price"),
            FieldDependency::field("quantity"),
        ])
    );
    assert_eq!(
        compiled.functions_used,
        BTreeSet::from(["add".to_string(), "multiply".to_string()])
    );
    assert!(!compiled.needs_periodic_update);
}

#[test]
fn test_overdue_flag() {
    let compiled = compile(
        "if(field('due') < today() && not(every(lookup('orders', 'paid'))), 'overdue', 'ok')",
    )
    .unwrap();

    assert_eq!(compiled.formula_type, FormulaType::Text);
    assert!(compiled.needs_periodic_update);
    assert!(compiled.dependencies.contains(&FieldDependency::lookup("orders", "paid")));
}

#[test]
fn test_comments_and_whitespace() {
    let compiled = compile(
        "/* order value */\n  sum(lookup('orders', 'total')) // all orders\n  - 1",
    )
    .unwrap();
    assert_eq!(compiled.formula_type, FormulaType::number(2));
}

#[test]
fn test_first_error_wins() {
    // A syntax error is reported before the unknown function inside it.
    assert!(matches!(
        compile("nope(1").unwrap_err(),
        FormulaError::Syntax { .. }
    ));
    // An unknown function is reported before any type error.
    assert!(matches!(
        compile("upper(1) + nope()").unwrap_err(),
        FormulaError::UnknownFunction { .. }
    ));
}

#[test]
fn test_error_codes() {
    let cases = [
        ("1 +", "syntax_error"),
        ("nope()", "unknown_function"),
        ("upper()", "invalid_argument_count"),
        ("upper(1)", "invalid_argument_type"),
        ("1 % 2", "unknown_operator"),
        ("field_by_id(1)", "deprecated_feature"),
    ];
    for (source, code) in cases {
        assert_eq!(compile(source).unwrap_err().code(), code, "source: {}", source);
    }
}

#[test]
fn test_compile_with_custom_limits() {
    let compiler = FormulaCompiler::default().with_limits(Limits {
        max_depth: 3,
        ..Limits::default()
    });
    assert!(compiler.compile("upper(upper('a'))", &schema()).is_ok());
    assert_eq!(
        compiler
            .compile("upper(upper(upper(upper(upper('a')))))", &schema())
            .unwrap_err(),
        FormulaError::FormulaTooLarge
    );
}

// ============================================================================
// Serialized form
// ============================================================================

#[test]
fn test_compiled_formula_json() {
    let compiled = compile("upper(field('name'))").unwrap();
    let value = serde_json::to_value(&compiled).unwrap();

    assert_eq!(
        value,
        json!({
            "expression": {
                "kind": "function_call",
                "function": "upper",
                "args": [{
                    "kind": "field_reference",
                    "field_name": "name",
                    "via_field_name": null,
                    "formula_type": { "type": "text" }
                }],
                "formula_type": { "type": "text" }
            },
            "formula_type": { "type": "text" },
            "dependencies": [{ "field_name": "name", "via_field_name": null }],
            "functions_used": ["upper"],
            "needs_periodic_update": false
        })
    );
}

#[test]
fn test_formula_type_json() {
    assert_eq!(
        serde_json::to_value(FormulaType::lookup(FormulaType::number(2))).unwrap(),
        json!({ "type": "lookup", "element": { "type": "number", "decimal_places": 2 } })
    );
    let parsed: FormulaType =
        serde_json::from_value(json!({ "type": "date", "include_time": true })).unwrap();
    assert_eq!(parsed, FormulaType::date_time());
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_limits_from_json() {
    let limits = Limits::from_json_str(r#"{ "max_string_literal_length": 20 }"#).unwrap();
    assert_eq!(limits.max_depth, 100);
    assert_eq!(limits.max_string_literal_length, 20);
}

#[test]
fn test_limits_reject_unknown_keys() {
    assert!(matches!(
        Limits::from_json_str(r#"{ "depth": 3 }"#),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn test_limits_missing_file() {
    let err = Limits::load("/nonexistent/formula-limits.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
    assert!(err.to_string().contains("formula-limits.json"));
}
