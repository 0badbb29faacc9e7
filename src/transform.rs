//! Rewrites and walks over expressions.

use std::collections::{BTreeSet, HashMap};

use crate::{
    ast::Expr, builder::AstBuilder, error::Result, functions::standard_registry, output,
    parser, registry::FunctionRegistry,
};

/// Returns a copy of `expr` with field references renamed.
///
/// With `via_field` unset, `renames` applies to fields of the formula's own
/// table: plain references and the link fields that lookups go through.
/// With `via_field` set, it applies to the target fields of lookups through
/// that link field, which live in the linked table.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use formula_lang::{Expr, transform::rename_field_references};
///
/// let renames = HashMap::from([("orders".to_string(), "purchases".to_string())]);
/// let expr = Expr::lookup("orders", "total");
///
/// assert_eq!(
///     rename_field_references(&expr, &renames, None),
///     Expr::lookup("purchases", "total")
/// );
/// ```
pub fn rename_field_references<A: Clone>(
    expr: &Expr<A>,
    renames: &HashMap<String, String>,
    via_field: Option<&str>,
) -> Expr<A> {
    let rename = |name: &String| renames.get(name).unwrap_or(name).clone();

    match expr {
        Expr::FieldReference {
            field_name,
            via_field_name,
            formula_type,
        } => {
            let (field_name, via_field_name) = match (via_field_name, via_field) {
                (None, None) => (rename(field_name), None),
                (Some(via), None) => (field_name.clone(), Some(rename(via))),
                (Some(via), Some(target_via)) if via == target_via => {
                    (rename(field_name), Some(via.clone()))
                }
                (via, _) => (field_name.clone(), via.clone()),
            };
            Expr::FieldReference {
                field_name,
                via_field_name,
                formula_type: formula_type.clone(),
            }
        }
        Expr::FunctionCall {
            function,
            args,
            formula_type,
        } => Expr::FunctionCall {
            function: function.clone(),
            args: args
                .iter()
                .map(|arg| rename_field_references(arg, renames, via_field))
                .collect(),
            formula_type: formula_type.clone(),
        },
        literal => literal.clone(),
    }
}

/// Renames field references inside formula source and prints the result in
/// canonical form. Whitespace and comments of the input are not kept.
pub fn rename_field_references_in_formula(
    source: &str,
    renames: &HashMap<String, String>,
    via_field: Option<&str>,
) -> Result<String> {
    let tree = parser::parse(source)?;
    let expr = AstBuilder::new(standard_registry()).build(&tree)?;
    output::to_formula(&rename_field_references(&expr, renames, via_field))
}

/// Names of every function called in `expr`, operators included.
pub fn functions_used<A>(expr: &Expr<A>) -> BTreeSet<String> {
    let mut used = BTreeSet::new();
    let mut pending = vec![expr];

    while let Some(node) = pending.pop() {
        if let Expr::FunctionCall { function, args, .. } = node {
            used.insert(function.clone());
            pending.extend(args.iter());
        }
    }
    used
}

/// Whether any function in `expr` changes its result over time.
pub fn needs_periodic_update<A>(expr: &Expr<A>, registry: &FunctionRegistry) -> bool {
    functions_used(expr).iter().any(|name| {
        registry
            .get(name)
            .is_some_and(|definition| definition.needs_periodic_update)
    })
}
