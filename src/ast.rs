//! # Formula Language - Syntax Trees
//!
//! This module defines the token, parse tree and expression types for the
//! formula language, a small expression language used to define computed
//! fields of a table.
//!
//! ## Architecture Overview
//!
//! The module is organized into focused submodules:
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[parse_tree]** - Concrete syntax produced by the parser, one variant per
//!   grammar alternative
//! - **[operators]** - Infix operators and the table mapping them onto
//!   function names
//! - **[expressions]** - The expression AST, either untyped or annotated with
//!   [`FormulaType`](crate::types::FormulaType)s
//!
//! ## Quick Start
//!
//! ```text
//! field('price') * field('quantity')
//! ```
//!
//! This formula multiplies two fields of the same row. The parser produces a
//! [`ParseTree::BinaryOp`], which the builder turns into the expression
//! `multiply(field('price'), field('quantity'))`.
//!
//! ## Core Concepts
//!
//! ### Field References
//!
//! - `field('name')` reads a field of the current row.
//! - `lookup('link field', 'target field')` follows a link field and reads a
//!   field of every linked row. The result is a lookup that must be
//!   aggregated, e.g. `sum(lookup('orders', 'total'))`.
//!
//! ### Operators Are Functions
//!
//! Every infix operator is sugar for a registered function:
//!
//! ```text
//! 1 + 2          add(1, 2)
//! 'a' = 'b'      equal('a', 'b')
//! -field('x')    minus(0, field('x'))
//! ```
//!
//! ### Typed And Untyped Trees
//!
//! [`Expr`] is generic over its annotation. The builder yields
//! `Expr<Untyped>`; the type checker yields `Expr<FormulaType>`
//! ([`TypedExpr`]). The two never mix in one tree.
pub mod expressions;
pub mod operators;
pub mod parse_tree;
pub mod tokens;

pub use expressions::{Expr, TypedExpr, Untyped};
pub use operators::{BinOp, function_for_operator};
pub use parse_tree::{ParseTree, QuotedString};
pub use tokens::{QuoteStyle, Token, TokenKind};
