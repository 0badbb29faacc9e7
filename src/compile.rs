//! The full pipeline from formula source to a typed expression.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::{
    ast::{Expr, ParseTree, TypedExpr},
    builder::AstBuilder,
    checker::TypeChecker,
    config::Limits,
    dependencies::{self, DependencySet},
    error::Result,
    functions::standard_registry,
    lexer::Lexer,
    parser::Parser,
    registry::FunctionRegistry,
    schema::FieldSchema,
    transform,
    types::FormulaType,
};

/// Everything known about a formula after a successful compile.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledFormula {
    pub expression: TypedExpr,
    pub formula_type: FormulaType,
    pub dependencies: DependencySet,
    pub functions_used: BTreeSet<String>,
    pub needs_periodic_update: bool,
}

/// Runs the parser, builder and type checker with one registry and one set
/// of limits.
#[derive(Debug, Clone, Copy)]
pub struct FormulaCompiler<'r> {
    registry: &'r FunctionRegistry,
    limits: Limits,
}

impl Default for FormulaCompiler<'static> {
    fn default() -> Self {
        FormulaCompiler::new(standard_registry())
    }
}

impl<'r> FormulaCompiler<'r> {
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        FormulaCompiler {
            registry,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn registry(&self) -> &'r FunctionRegistry {
        self.registry
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn parse(&self, source: &str) -> Result<ParseTree> {
        Parser::new(Lexer::new(source))?
            .with_limits(self.limits)
            .parse()
    }

    pub fn build(&self, tree: &ParseTree) -> Result<Expr> {
        AstBuilder::new(self.registry)
            .with_limits(self.limits)
            .build(tree)
    }

    /// Parses and builds `source` without type checking.
    pub fn to_untyped(&self, source: &str) -> Result<Expr> {
        let tree = self.parse(source)?;
        self.build(&tree)
    }

    pub fn check<A>(&self, expr: &Expr<A>, schema: &dyn FieldSchema) -> Result<TypedExpr> {
        TypeChecker::new(self.registry, schema)
            .with_limits(self.limits)
            .check(expr)
    }

    /// Compiles `source` against `schema`.
    pub fn compile(&self, source: &str, schema: &dyn FieldSchema) -> Result<CompiledFormula> {
        let compiled = self.to_untyped(source).and_then(|expr| {
            let expression = self.check(&expr, schema)?;
            Ok(CompiledFormula {
                formula_type: expression.formula_type().clone(),
                dependencies: dependencies::extract(&expression),
                functions_used: transform::functions_used(&expression),
                needs_periodic_update: transform::needs_periodic_update(
                    &expression,
                    self.registry,
                ),
                expression,
            })
        });

        match &compiled {
            Ok(formula) => debug!(
                formula_type = %formula.formula_type,
                dependencies = formula.dependencies.len(),
                "compiled formula"
            ),
            Err(err) => debug!(code = err.code(), error = %err, "rejected formula"),
        }
        compiled
    }
}
