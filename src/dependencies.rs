//! Field dependency extraction.

use std::{collections::BTreeSet, fmt};

use serde::Serialize;

use crate::{
    ast::Expr, builder::AstBuilder, error::Result, functions::standard_registry, parser,
};

/// A field a formula reads, possibly through a link field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct FieldDependency {
    pub field_name: String,
    pub via_field_name: Option<String>,
}

impl FieldDependency {
    pub fn field(name: impl Into<String>) -> Self {
        FieldDependency {
            field_name: name.into(),
            via_field_name: None,
        }
    }

    pub fn lookup(via: impl Into<String>, target: impl Into<String>) -> Self {
        FieldDependency {
            field_name: target.into(),
            via_field_name: Some(via.into()),
        }
    }
}

impl fmt::Display for FieldDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.via_field_name {
            Some(via) => write!(f, "{} -> {}", via, self.field_name),
            None => write!(f, "{}", self.field_name),
        }
    }
}

pub type DependencySet = BTreeSet<FieldDependency>;

/// Every field referenced anywhere in `expr`.
///
/// Works on typed and untyped trees. The walk uses an explicit stack, so it
/// handles trees of any depth.
pub fn extract<A>(expr: &Expr<A>) -> DependencySet {
    let mut dependencies = DependencySet::new();
    let mut pending = vec![expr];

    while let Some(node) = pending.pop() {
        match node {
            Expr::FieldReference {
                field_name,
                via_field_name,
                ..
            } => {
                dependencies.insert(FieldDependency {
                    field_name: field_name.clone(),
                    via_field_name: via_field_name.clone(),
                });
            }
            Expr::FunctionCall { args, .. } => pending.extend(args.iter()),
            _ => {}
        }
    }
    dependencies
}

/// Parses `source` against the built-in functions and extracts its
/// dependencies.
pub fn extract_from_formula(source: &str) -> Result<DependencySet> {
    let tree = parser::parse(source)?;
    let expr = AstBuilder::new(standard_registry()).build(&tree)?;
    Ok(extract(&expr))
}

/// Names of fields in the formula's own table: plain references plus the
/// link fields lookups go through.
pub fn referenced_field_names(dependencies: &DependencySet) -> BTreeSet<String> {
    dependencies
        .iter()
        .map(|dep| dep.via_field_name.as_ref().unwrap_or(&dep.field_name).clone())
        .collect()
}
