use crate::{
    ast::{BinOp, QuoteStyle},
    lexer::Position,
};

/// Text of a string literal as written, escapes intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotedString {
    pub raw: String,
    pub quote: QuoteStyle,
}

/// Concrete syntax of a formula, one variant per grammar alternative.
///
/// Produced by the [`Parser`](crate::parser::Parser) and consumed by the
/// [builder](crate::builder). Literal text is kept verbatim; the builder
/// validates and converts it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    /// `'text'` or `"text"`
    StringLiteral {
        literal: QuotedString,
        position: Position,
    },

    /// `42`, `-7`
    IntegerLiteral { text: String, position: Position },

    /// `3.14`, `-0.50`
    DecimalLiteral { text: String, position: Position },

    /// `true`, `FALSE`
    BooleanLiteral { value: bool, position: Position },

    /// `( expr )`
    Brackets {
        inner: Box<ParseTree>,
        position: Position,
    },

    /// `-expr` where `expr` is not a numeric literal
    UnaryMinus {
        operand: Box<ParseTree>,
        position: Position,
    },

    /// `left op right`; `position` is that of the operator
    BinaryOp {
        op: BinOp,
        left: Box<ParseTree>,
        right: Box<ParseTree>,
        position: Position,
    },

    /// `name(arg, ...)`
    FunctionCall {
        name: String,
        args: Vec<ParseTree>,
        position: Position,
    },

    /// `field('name')`
    FieldReference {
        name: QuotedString,
        position: Position,
    },

    /// `lookup('via', 'target')`
    LookupFieldReference {
        via: QuotedString,
        target: QuotedString,
        position: Position,
    },

    /// `field_by_id(42)`
    FieldByIdReference { id: String, position: Position },
}

impl ParseTree {
    /// Position of the node's first token (the operator for binary nodes).
    pub fn position(&self) -> Position {
        match self {
            ParseTree::StringLiteral { position, .. }
            | ParseTree::IntegerLiteral { position, .. }
            | ParseTree::DecimalLiteral { position, .. }
            | ParseTree::BooleanLiteral { position, .. }
            | ParseTree::Brackets { position, .. }
            | ParseTree::UnaryMinus { position, .. }
            | ParseTree::BinaryOp { position, .. }
            | ParseTree::FunctionCall { position, .. }
            | ParseTree::FieldReference { position, .. }
            | ParseTree::LookupFieldReference { position, .. }
            | ParseTree::FieldByIdReference { position, .. } => *position,
        }
    }
}
