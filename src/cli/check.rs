//! Compile formulas from the command line

use std::collections::HashMap;

use serde::Serialize;

use super::{CliError, load_schema};
use crate::{
    compile::{CompiledFormula, FormulaCompiler},
    config::Limits,
    dependencies::{self, DependencySet},
    output::{to_formula, to_formula_pretty},
    schema::StaticSchema,
    transform::rename_field_references,
};

/// Options for the check command
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The formula to compile
    pub formula: String,
    /// Schema JSON; without one every field reference is unknown
    pub schema: Option<String>,
    pub limits: Limits,
    /// Only parse and build, don't type check
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckResult {
    /// Syntax validation passed; holds the canonical formula
    SyntaxValid { formula: String },
    /// Formula compiled against the schema
    Compiled(CompiledFormula),
}

/// Execute a check operation
pub fn execute_check(options: &CheckOptions) -> Result<CheckResult, CliError> {
    let compiler = FormulaCompiler::default().with_limits(options.limits);

    if options.syntax_only {
        let expr = compiler.to_untyped(&options.formula)?;
        return Ok(CheckResult::SyntaxValid {
            formula: to_formula(&expr)?,
        });
    }

    let schema = match &options.schema {
        Some(json) => load_schema(json)?,
        None => StaticSchema::new(),
    };
    Ok(CheckResult::Compiled(
        compiler.compile(&options.formula, &schema)?,
    ))
}

/// Fields a formula depends on, without type checking.
pub fn execute_deps(formula: &str, limits: Limits) -> Result<DependencySet, CliError> {
    let expr = FormulaCompiler::default()
        .with_limits(limits)
        .to_untyped(formula)?;
    Ok(dependencies::extract(&expr))
}

/// Canonical formula text.
pub fn execute_fmt(formula: &str, pretty: bool, limits: Limits) -> Result<String, CliError> {
    let expr = FormulaCompiler::default()
        .with_limits(limits)
        .to_untyped(formula)?;
    let text = if pretty {
        to_formula_pretty(&expr)?
    } else {
        to_formula(&expr)?
    };
    Ok(text)
}

/// Renames one field and prints the rewritten formula.
pub fn execute_rename(
    formula: &str,
    from: &str,
    to: &str,
    via: Option<&str>,
    limits: Limits,
) -> Result<String, CliError> {
    let expr = FormulaCompiler::default()
        .with_limits(limits)
        .to_untyped(formula)?;
    let renames = HashMap::from([(from.to_string(), to.to_string())]);
    Ok(to_formula(&rename_field_references(&expr, &renames, via))?)
}
