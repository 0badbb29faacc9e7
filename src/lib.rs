pub mod ast;
pub mod builder;
pub mod checker;
#[cfg(feature = "cli")]
pub mod cli;
pub mod compile;
pub mod config;
pub mod dependencies;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod registry;
pub mod schema;
pub mod transform;
pub mod types;

pub use ast::{BinOp, Expr, ParseTree, Token, TypedExpr, Untyped};
pub use builder::{AstBuilder, build};
pub use checker::TypeChecker;
pub use compile::{CompiledFormula, FormulaCompiler};
pub use config::Limits;
pub use dependencies::{DependencySet, FieldDependency, extract};
pub use error::{FormulaError, Result};
pub use lexer::{Lexer, Position};
pub use output::{to_formula, to_formula_pretty};
pub use parser::{Parser, parse};
pub use registry::{FunctionDefinition, FunctionRegistry};
pub use schema::{FieldResolution, FieldSchema, StaticSchema};
pub use types::FormulaType;
