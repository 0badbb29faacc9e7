// tests/transform_tests.rs

use std::collections::{BTreeSet, HashMap};

use formula_lang::ast::Expr;
use formula_lang::compile::FormulaCompiler;
use formula_lang::error::FormulaError;
use formula_lang::dependencies::{
    DependencySet, FieldDependency, extract, extract_from_formula, referenced_field_names,
};
use formula_lang::functions::standard_registry;
use formula_lang::output::{to_formula, to_formula_pretty};
use formula_lang::schema::StaticSchema;
use formula_lang::transform::{
    functions_used, needs_periodic_update, rename_field_references,
    rename_field_references_in_formula,
};
use formula_lang::types::FormulaType;
use pretty_assertions::assert_eq;

fn build(source: &str) -> Expr {
    FormulaCompiler::default().to_untyped(source).unwrap()
}

fn renames(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

// ============================================================================
// Dependencies
// ============================================================================

#[test]
fn test_dependencies_of_mixed_formula() {
    let deps =
        extract_from_formula("concat(field('a'), field('a'), lookup('orders', 'total'), 'b')")
            .unwrap();
    assert_eq!(
        deps,
        DependencySet::from([
            FieldDependency::field("a"),
            FieldDependency::lookup("orders", "total"),
        ])
    );
}

#[test]
fn test_same_name_direct_and_through_link_are_distinct() {
    let deps = extract_from_formula("concat(field('total'), lookup('orders', 'total'))").unwrap();
    assert_eq!(deps.len(), 2);
}

#[test]
fn test_literal_formula_has_no_dependencies() {
    assert!(extract_from_formula("1 + 2 * 3").unwrap().is_empty());
}

#[test]
fn test_dependencies_include_unknown_fields() {
    let compiled = FormulaCompiler::default()
        .compile("upper(field('gone'))", &StaticSchema::new())
        .unwrap();
    assert!(compiled.formula_type.is_error());
    assert_eq!(
        compiled.dependencies,
        DependencySet::from([FieldDependency::field("gone")])
    );
}

#[test]
fn test_typed_and_untyped_trees_agree() {
    let source = "field('price') * sum(lookup('orders', 'total'))";
    let schema = StaticSchema::new()
        .with_field("price", FormulaType::number(2))
        .with_link("orders", [("total", FormulaType::number(2))]);
    let compiled = FormulaCompiler::default().compile(source, &schema).unwrap();
    assert_eq!(compiled.dependencies, extract(&build(source)));
}

#[test]
fn test_referenced_field_names() {
    let deps = extract_from_formula("field('a') + sum(lookup('orders', 'total'))").unwrap();
    assert_eq!(
        referenced_field_names(&deps),
        BTreeSet::from(["a".to_string(), "orders".to_string()])
    );
}

#[test]
fn test_extraction_handles_deep_trees() {
    let mut expr = Expr::field("leaf");
    for _ in 0..2000 {
        expr = Expr::call("upper", vec![expr]);
    }
    assert_eq!(
        extract(&expr),
        DependencySet::from([FieldDependency::field("leaf")])
    );
    assert_eq!(functions_used(&expr), BTreeSet::from(["upper".to_string()]));
}

// ============================================================================
// Renaming
// ============================================================================

#[test]
fn test_rename_plain_references() {
    assert_eq!(
        rename_field_references_in_formula(
            "field('a') + field('b')",
            &renames(&[("a", "x")]),
            None
        )
        .unwrap(),
        "add(field('x'),field('b'))"
    );
}

#[test]
fn test_rename_link_field_used_by_lookup() {
    assert_eq!(
        rename_field_references_in_formula(
            "concat(field('a'), lookup('a', 'a'))",
            &renames(&[("a", "b")]),
            None
        )
        .unwrap(),
        "concat(field('b'),lookup('b','a'))"
    );
}

#[test]
fn test_rename_lookup_targets_through_link() {
    let source = "concat(field('a'), lookup('orders', 'a'), lookup('other', 'a'))";
    assert_eq!(
        rename_field_references_in_formula(source, &renames(&[("a", "b")]), Some("orders"))
            .unwrap(),
        "concat(field('a'),lookup('orders','b'),lookup('other','a'))"
    );
}

#[test]
fn test_rename_keeps_annotations() {
    let schema = StaticSchema::new().with_field("a", FormulaType::Text);
    let typed = FormulaCompiler::default()
        .compile("upper(field('a'))", &schema)
        .unwrap()
        .expression;
    let renamed = rename_field_references(&typed, &renames(&[("a", "b")]), None);

    assert_eq!(renamed.formula_type(), &FormulaType::Text);
    assert_eq!(to_formula(&renamed).unwrap(), "upper(field('b'))");
}

#[test]
fn test_rename_with_no_match_is_identity() {
    let expr = build("field('a') + lookup('l', 't')");
    assert_eq!(rename_field_references(&expr, &renames(&[("zzz", "y")]), None), expr);
}

// ============================================================================
// Function walks
// ============================================================================

#[test]
fn test_functions_used_includes_operators() {
    assert_eq!(
        functions_used(&build("upper(field('a')) + 'b'")),
        BTreeSet::from(["add".to_string(), "upper".to_string()])
    );
}

#[test]
fn test_periodic_functions() {
    let registry = standard_registry();
    assert!(needs_periodic_update(&build("year(today())"), registry));
    assert!(needs_periodic_update(&build("datetime_format(now(), 'YYYY')"), registry));
    assert!(!needs_periodic_update(&build("year(todate('2020', 'YYYY'))"), registry));
}

// ============================================================================
// Printing
// ============================================================================

#[test]
fn test_printed_formula_parses_back() {
    let sources = [
        "1 + 2 * -3",
        "if(field('done'), 'yes', \"it's\")",
        "concat(lookup('orders', 'label'), -1.50, true)",
        "-field('a') / 2.0",
        r"'quote \' inside'",
        r#""x\'y""#,
        r#"concat("a\'b", 'c\\d', "say \"hi\"")"#,
    ];

    for source in sources {
        let expr = build(source);
        let compact = to_formula(&expr).unwrap();
        let pretty = to_formula_pretty(&expr).unwrap();
        assert_eq!(build(&compact), expr, "compact: {}", source);
        assert_eq!(build(&pretty), expr, "pretty: {}", source);
    }
}

#[test]
fn test_backslash_quote_value_prints_double_quoted() {
    let expr = build(r#""x\'y""#);
    assert_eq!(expr, Expr::string(r"x\'y"));
    assert_eq!(to_formula(&expr).unwrap(), r#""x\'y""#);
}

#[test]
fn test_unprintable_string_is_an_error() {
    // Holds both `\'` and `\"`, so neither quote style reads it back.
    let both = Expr::string(r#"\'\""#);
    assert_eq!(
        to_formula(&both).unwrap_err(),
        FormulaError::UnprintableString {
            value: r#"\'\""#.to_string()
        }
    );

    // A lone trailing backslash would swallow the closing quote.
    let trailing = Expr::string(r"a\");
    assert_eq!(to_formula(&trailing).unwrap_err().code(), "unprintable_string");
    assert!(to_formula_pretty(&Expr::call("upper", vec![trailing])).is_err());

    // A doubled one reads back as written.
    let doubled = build(r"'a\\'");
    assert_eq!(doubled, Expr::string(r"a\\"));
    assert_eq!(to_formula(&doubled).unwrap(), r"'a\\'");
}

#[test]
fn test_rename_output_parses_back() {
    let renamed = rename_field_references_in_formula(
        r#"concat(field('a'), "x\'y")"#,
        &renames(&[("a", "b")]),
        None,
    )
    .unwrap();
    assert_eq!(renamed, r#"concat(field('b'),"x\'y")"#);
    assert_eq!(
        build(&renamed),
        Expr::call("concat", vec![Expr::field("b"), Expr::string(r"x\'y")])
    );
}

#[test]
fn test_pretty_layout() {
    assert_eq!(
        to_formula_pretty(&build("if(field('done'), upper('a'), 'b')")).unwrap(),
        "if(\n  field('done'),\n  upper('a'),\n  'b'\n)"
    );
}

#[test]
fn test_operators_print_as_calls() {
    assert_eq!(to_formula(&build("1 >= 2")).unwrap(), "greater_than_or_equal(1,2)");
}
