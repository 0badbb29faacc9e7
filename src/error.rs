use serde::Serialize;
use thiserror::Error;

use crate::{
    lexer::Position,
    registry::ArgCount,
    types::{ExpectedType, FormulaType},
};

/// Everything that can reject a formula.
///
/// Each failing operation reports exactly one of these, at the point of first
/// detection. The serialized form is tagged with [`FormulaError::code`].
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[serde(tag = "code", rename_all = "snake_case")]
pub enum FormulaError {
    /// Malformed source. Columns are 0-based, lines 1-based.
    #[error("Invalid syntax at line {line}, col {column}: {message}")]
    #[serde(rename = "syntax_error")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{name} is not a valid function")]
    UnknownFunction { name: String },

    #[error(
        "{actual} {} given to the function {function}, it must instead be given {expected}",
        were_given(.actual)
    )]
    InvalidArgumentCount {
        function: String,
        expected: ArgCount,
        actual: usize,
    },

    /// `argument_index` is 0-based; the message counts from 1.
    #[error(
        "argument number {} given to {function} was of type {actual} but {expected}",
        .argument_index + 1
    )]
    InvalidArgumentType {
        function: String,
        argument_index: usize,
        expected: ExpectedType,
        actual: FormulaType,
    },

    #[error("the operator {text} is not supported")]
    UnknownOperator { text: String },

    #[error("field_by_id references are no longer supported, use field('name') instead")]
    DeprecatedFeature,

    #[error("it exceeded the maximum formula size")]
    FormulaTooLarge,

    #[error("an embedded string in the formula over the maximum length of {max}")]
    StringLiteralTooLong { max: usize },

    /// Raised when printing a string no quote style can hold.
    #[error("the text {value:?} cannot be written as a formula string")]
    UnprintableString { value: String },
}

fn were_given(count: &usize) -> &'static str {
    if *count == 1 {
        "argument was"
    } else {
        "arguments were"
    }
}

impl FormulaError {
    pub fn syntax(message: impl Into<String>, position: Position) -> Self {
        FormulaError::Syntax {
            message: message.into(),
            line: position.line,
            column: position.column,
        }
    }

    /// Stable identifier for mapping errors to user-facing messages.
    pub fn code(&self) -> &'static str {
        match self {
            FormulaError::Syntax { .. } => "syntax_error",
            FormulaError::UnknownFunction { .. } => "unknown_function",
            FormulaError::InvalidArgumentCount { .. } => "invalid_argument_count",
            FormulaError::InvalidArgumentType { .. } => "invalid_argument_type",
            FormulaError::UnknownOperator { .. } => "unknown_operator",
            FormulaError::DeprecatedFeature => "deprecated_feature",
            FormulaError::FormulaTooLarge => "formula_too_large",
            FormulaError::StringLiteralTooLong { .. } => "string_literal_too_long",
            FormulaError::UnprintableString { .. } => "unprintable_string",
        }
    }
}

pub type Result<T> = std::result::Result<T, FormulaError>;
