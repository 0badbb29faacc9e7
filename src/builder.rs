//! Turns a [`ParseTree`] into an untyped [`Expr`].
//!
//! Operators become calls of their canonical function, string literals are
//! unescaped, numeric literals are validated, and every function call is
//! checked against the registry for existence and arity before its
//! arguments are built.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::{debug, trace};

use crate::{
    ast::{Expr, ParseTree, QuotedString},
    config::Limits,
    error::{FormulaError, Result},
    lexer::Position,
    registry::FunctionRegistry,
};

static INTEGER_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+$").expect("integer literal pattern"));
static DECIMAL_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]+\.[0-9]+$").expect("decimal literal pattern"));

pub struct AstBuilder<'r> {
    registry: &'r FunctionRegistry,
    limits: Limits,
}

impl<'r> AstBuilder<'r> {
    pub fn new(registry: &'r FunctionRegistry) -> Self {
        AstBuilder {
            registry,
            limits: Limits::default(),
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(&self, tree: &ParseTree) -> Result<Expr> {
        let expr = self.visit(tree, 0)?;
        debug!("built formula expression");
        Ok(expr)
    }

    fn visit(&self, tree: &ParseTree, depth: usize) -> Result<Expr> {
        if depth > self.limits.max_depth {
            return Err(FormulaError::FormulaTooLarge);
        }

        match tree {
            ParseTree::StringLiteral { literal, .. } => Ok(Expr::string(self.string(literal)?)),
            ParseTree::IntegerLiteral { text, position } => integer(text, *position),
            ParseTree::DecimalLiteral { text, position } => decimal(text, *position),
            ParseTree::BooleanLiteral { value, .. } => Ok(Expr::boolean(*value)),

            ParseTree::Brackets { inner, .. } => self.visit(inner, depth + 1),

            // -x is minus(0, x)
            ParseTree::UnaryMinus { operand, .. } => {
                let function = self.resolve("minus", 2)?;
                let operand = self.visit(operand, depth + 1)?;
                Ok(Expr::call(function, vec![Expr::integer(0), operand]))
            }

            ParseTree::BinaryOp {
                op, left, right, ..
            } => {
                let name = op.function_name().ok_or_else(|| FormulaError::UnknownOperator {
                    text: op.lexeme().to_string(),
                })?;
                let function = self.resolve(name, 2)?;
                let left = self.visit(left, depth + 1)?;
                let right = self.visit(right, depth + 1)?;
                Ok(Expr::call(function, vec![left, right]))
            }

            ParseTree::FunctionCall { name, args, .. } => {
                let function = self.resolve(name, args.len())?;
                let args = args
                    .iter()
                    .map(|arg| self.visit(arg, depth + 1))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Expr::call(function, args))
            }

            ParseTree::FieldReference { name, .. } => Ok(Expr::field(self.string(name)?)),

            ParseTree::LookupFieldReference {
                via,
                target,
                position,
            } => {
                let via = self.string(via)?;
                let target = self.string(target)?;
                if via.is_empty() || target.is_empty() {
                    return Err(FormulaError::syntax(
                        "lookup field names must not be empty",
                        *position,
                    ));
                }
                Ok(Expr::lookup(via, target))
            }

            ParseTree::FieldByIdReference { id, .. } => {
                trace!(id = %id, "rejected field_by_id reference");
                Err(FormulaError::DeprecatedFeature)
            }
        }
    }

    /// Canonical name of `name` after checking it exists and accepts
    /// `arg_count` arguments.
    fn resolve(&self, name: &str, arg_count: usize) -> Result<String> {
        let definition =
            self.registry
                .get(name)
                .ok_or_else(|| FormulaError::UnknownFunction {
                    name: name.to_lowercase(),
                })?;

        if !definition.arg_count.accepts(arg_count) {
            return Err(FormulaError::InvalidArgumentCount {
                function: definition.name.clone(),
                expected: definition.arg_count,
                actual: arg_count,
            });
        }
        Ok(definition.name.clone())
    }

    fn string(&self, literal: &QuotedString) -> Result<String> {
        let value = unescape(literal);
        let max = self.limits.max_string_literal_length;
        if value.chars().count() > max {
            return Err(FormulaError::StringLiteralTooLong { max });
        }
        Ok(value)
    }
}

/// Removes the backslash from escaped occurrences of the literal's own quote.
/// Every other backslash is kept.
pub fn unescape(literal: &QuotedString) -> String {
    let quote = literal.quote.char();
    literal.raw.replace(&format!("\\{}", quote), &quote.to_string())
}

fn integer(text: &str, position: Position) -> Result<Expr> {
    if !INTEGER_LITERAL.is_match(text) {
        return Err(FormulaError::syntax(
            format!("invalid number literal '{}'", text),
            position,
        ));
    }
    text.parse::<i64>().map(Expr::integer).map_err(|_| {
        FormulaError::syntax(format!("number literal '{}' is out of range", text), position)
    })
}

fn decimal(text: &str, position: Position) -> Result<Expr> {
    if !DECIMAL_LITERAL.is_match(text) {
        return Err(FormulaError::syntax(
            format!("invalid number literal '{}'", text),
            position,
        ));
    }
    Decimal::from_str(text).map(Expr::decimal).map_err(|_| {
        FormulaError::syntax(format!("number literal '{}' is out of range", text), position)
    })
}

/// Builds `tree` with default limits.
pub fn build(tree: &ParseTree, registry: &FunctionRegistry) -> Result<Expr> {
    AstBuilder::new(registry).build(tree)
}

pub fn build_with_limits(
    tree: &ParseTree,
    registry: &FunctionRegistry,
    limits: Limits,
) -> Result<Expr> {
    AstBuilder::new(registry).with_limits(limits).build(tree)
}
