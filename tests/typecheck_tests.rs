// tests/typecheck_tests.rs

use formula_lang::ast::{Expr, TypedExpr};
use formula_lang::checker::TypeChecker;
use formula_lang::compile::FormulaCompiler;
use formula_lang::error::FormulaError;
use formula_lang::functions::standard_registry;
use formula_lang::registry::{ArgCount, ArgRule, FunctionDefinition, FunctionRegistry, ReturnRule};
use formula_lang::schema::StaticSchema;
use formula_lang::types::{ExpectedType, FormulaType, TypeKind};
use pretty_assertions::assert_eq;

fn schema() -> StaticSchema {
    StaticSchema::new()
        .with_field("price", FormulaType::number(2))
        .with_field("name", FormulaType::Text)
        .with_field("done", FormulaType::Boolean)
        .with_field("due", FormulaType::date())
        .with_field("pending", FormulaType::Untyped)
        .with_link(
            "orders",
            [
                ("total", FormulaType::number(2)),
                ("label", FormulaType::Text),
                ("paid", FormulaType::Boolean),
            ],
        )
}

fn compile(source: &str) -> Result<TypedExpr, FormulaError> {
    FormulaCompiler::default()
        .compile(source, &schema())
        .map(|compiled| compiled.expression)
}

fn type_of(source: &str) -> FormulaType {
    compile(source).unwrap().formula_type().clone()
}

fn type_error(source: &str) -> String {
    let err = compile(source).unwrap_err();
    assert!(
        matches!(err, FormulaError::InvalidArgumentType { .. }),
        "unexpected error {:?}",
        err
    );
    err.to_string()
}

fn error_message(source: &str) -> String {
    match type_of(source) {
        FormulaType::Error { message } => message,
        other => panic!("Expected an error type, got {:?}", other),
    }
}

// ============================================================================
// Literals and arithmetic
// ============================================================================

#[test]
fn test_literal_types() {
    assert_eq!(type_of("'a'"), FormulaType::Text);
    assert_eq!(type_of("7"), FormulaType::number(0));
    assert_eq!(type_of("7.125"), FormulaType::number(3));
    assert_eq!(type_of("true"), FormulaType::Boolean);
}

#[test]
fn test_number_precision_widens() {
    assert_eq!(type_of("1 + 1.25"), FormulaType::number(2));
    assert_eq!(type_of("field('price') * 3"), FormulaType::number(2));
    assert_eq!(type_of("field('price') - 0.001"), FormulaType::number(3));
}

#[test]
fn test_division_is_precise() {
    assert_eq!(type_of("10 / 3"), FormulaType::number(10));
}

#[test]
fn test_text_addition() {
    assert_eq!(type_of("'a' + field('name')"), FormulaType::Text);
}

#[test]
fn test_date_arithmetic() {
    assert_eq!(
        type_of("field('due') + date_interval('1 day')"),
        FormulaType::date()
    );
    assert_eq!(type_of("field('due') - today()"), FormulaType::Duration);
    assert_eq!(type_of("now()"), FormulaType::date_time());
}

#[test]
fn test_comparisons_are_boolean() {
    assert_eq!(type_of("1 = 'a'"), FormulaType::Boolean);
    assert_eq!(type_of("field('due') >= today()"), FormulaType::Boolean);
    assert_eq!(type_of("field('done') && 1 < 2"), FormulaType::Boolean);
}

// ============================================================================
// Conditionals and untyped values
// ============================================================================

#[test]
fn test_if_branch_types() {
    assert_eq!(type_of("if(field('done'), 1, 2.5)"), FormulaType::number(1));
    assert_eq!(type_of("if(true, field('due'), today())"), FormulaType::date());
    assert_eq!(type_of("if(field('done'), 'a', 1)"), FormulaType::Text);
}

#[test]
fn test_untyped_passes_rules() {
    assert_eq!(type_of("upper(field('pending'))"), FormulaType::Text);
    assert_eq!(type_of("field('pending') + 1"), FormulaType::Untyped);
}

// ============================================================================
// Lookups and aggregates
// ============================================================================

#[test]
fn test_link_field_type() {
    assert_eq!(
        type_of("field('orders')"),
        FormulaType::array(FormulaType::Link)
    );
}

#[test]
fn test_lookup_type() {
    assert_eq!(
        type_of("lookup('orders', 'total')"),
        FormulaType::lookup(FormulaType::number(2))
    );
}

#[test]
fn test_aggregates() {
    assert_eq!(type_of("sum(lookup('orders', 'total'))"), FormulaType::number(2));
    assert_eq!(type_of("count(lookup('orders', 'label'))"), FormulaType::number(0));
    assert_eq!(type_of("join(lookup('orders', 'label'), ', ')"), FormulaType::Text);
    assert_eq!(
        type_of("array_agg(lookup('orders', 'label'))"),
        FormulaType::array(FormulaType::Text)
    );
}

#[test]
fn test_filter_keeps_the_lookup() {
    assert_eq!(
        type_of("sum(filter(lookup('orders', 'total'), lookup('orders', 'paid')))"),
        FormulaType::number(2)
    );
}

#[test]
fn test_lookup_must_be_aggregated() {
    assert_eq!(
        type_error("lookup('orders', 'total') + 1"),
        "argument number 1 given to add was of type lookup of number but the only usable types for this argument are text,number,date,duration"
    );
    assert_eq!(
        type_error("totext(lookup('orders', 'total'))"),
        "argument number 1 given to totext was of type lookup of number but only a single value can be used here, wrap lookups in an aggregate function such as sum"
    );
}

#[test]
fn test_aggregate_needs_a_lookup() {
    assert_eq!(
        type_error("sum(field('price'))"),
        "argument number 1 given to sum was of type number but this argument must be a lookup of number,duration"
    );
    assert_eq!(
        type_error("sum(lookup('orders', 'label'))"),
        "argument number 1 given to sum was of type lookup of text but this argument must be a lookup of number,duration"
    );
}

// ============================================================================
// Argument type errors
// ============================================================================

#[test]
fn test_argument_type_error_fields() {
    assert_eq!(
        compile("'a' + 1").unwrap_err(),
        FormulaError::InvalidArgumentType {
            function: "add".to_string(),
            argument_index: 1,
            expected: ExpectedType::OneOf(vec![TypeKind::Text]),
            actual: FormulaType::number(0),
        }
    );
}

#[test]
fn test_argument_type_messages() {
    assert_eq!(
        type_error("upper(1)"),
        "argument number 1 given to upper was of type number but the only usable types for this argument are text"
    );
    assert_eq!(
        type_error("field('price') > 'x'"),
        "argument number 2 given to greater_than was of type text but the only usable types for this argument are number"
    );
    assert_eq!(
        type_error("true > false"),
        "argument number 1 given to greater_than was of type boolean but the only usable types for this argument are text,number,date,duration,link"
    );
    assert_eq!(
        type_error("if(1, 'a', 'b')"),
        "argument number 1 given to if was of type number but the only usable types for this argument are boolean"
    );
}

// ============================================================================
// Unknown fields
// ============================================================================

#[test]
fn test_unknown_field_is_an_error_type() {
    assert_eq!(
        error_message("field('gone')"),
        "references the deleted or unknown field gone"
    );
}

#[test]
fn test_error_type_is_absorbed() {
    assert_eq!(
        error_message("upper(field('gone'))"),
        "references the deleted or unknown field gone"
    );
    assert_eq!(
        error_message("concat(field('gone'), 1) + 'x'"),
        "references the deleted or unknown field gone"
    );
    assert!(type_of("sum(lookup('orders', 'gone'))").is_error());
}

#[test]
fn test_lookup_errors() {
    assert_eq!(
        error_message("lookup('orders', 'gone')"),
        "references the deleted or unknown field gone through orders"
    );
    assert_eq!(
        error_message("lookup('missing', 'total')"),
        "references the deleted or unknown field total through missing"
    );
    assert_eq!(
        error_message("lookup('name', 'total')"),
        "first lookup function argument must be a link row field"
    );
}

#[test]
fn test_type_mismatch_wins_over_unknown_field() {
    let err = compile("concat(field('gone'), upper(1))").unwrap_err();
    assert!(matches!(
        err,
        FormulaError::InvalidArgumentType { ref function, .. } if function == "upper"
    ));
}

// ============================================================================
// Typed trees
// ============================================================================

#[test]
fn test_every_node_is_annotated() {
    match compile("upper(field('name'))").unwrap() {
        Expr::FunctionCall {
            function,
            args,
            formula_type,
        } => {
            assert_eq!(function, "upper");
            assert_eq!(formula_type, FormulaType::Text);
            assert_eq!(args[0].formula_type(), &FormulaType::Text);
        }
        other => panic!("Expected a call, got {:?}", other),
    }
}

#[test]
fn test_checking_a_typed_tree_again() {
    let schema = schema();
    let checker = TypeChecker::new(standard_registry(), &schema);
    let typed = compile("if(field('done'), field('price'), 1)").unwrap();
    assert_eq!(checker.check(&typed).unwrap(), typed);
    assert_eq!(typed.to_untyped().children().len(), 3);
}

// ============================================================================
// Custom registries
// ============================================================================

#[test]
fn test_custom_registry() {
    let registry = FunctionRegistry::new([FunctionDefinition::new(
        "double",
        ArgCount::Exactly(1),
        ReturnRule::SameAsArg(0),
    )
    .args(&[ArgRule::OneOf(&[TypeKind::Number])])]);
    let compiler = FormulaCompiler::new(&registry);
    let schema = StaticSchema::new();

    assert_eq!(
        compiler.compile("DOUBLE(1.5)", &schema).unwrap().formula_type,
        FormulaType::number(1)
    );
    assert_eq!(
        compiler.compile("upper('a')", &schema).unwrap_err(),
        FormulaError::UnknownFunction {
            name: "upper".to_string()
        }
    );
    // Operators resolve through the registry too.
    assert_eq!(
        compiler.compile("1 + 1", &schema).unwrap_err(),
        FormulaError::UnknownFunction {
            name: "add".to_string()
        }
    );
}
