use crate::ast::Token;

/// Infix operators the grammar accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    // Logical
    /// Logical AND (`&&`)
    And,
    /// Logical OR (`||`)
    Or,

    // Equality
    /// Equal (`=`)
    Equal,
    /// Not equal (`!=`)
    NotEqual,

    // Comparison
    /// Greater than (`>`)
    GreaterThan,
    /// Less than (`<`)
    LessThan,
    /// Greater than or equal (`>=`)
    GreaterEqual,
    /// Less than or equal (`<=`)
    LessEqual,

    // Arithmetic
    /// Addition or text concatenation (`+`)
    Add,
    /// Subtraction (`-`)
    Subtract,
    /// Multiplication (`*`)
    Multiply,
    /// Division (`/`)
    Divide,
    /// Modulo (`%`). Parsed, but no function backs it.
    Modulo,
}

/// Operator lexeme to canonical function name.
const OPERATOR_FUNCTIONS: &[(&str, &str)] = &[
    ("+", "add"),
    ("-", "minus"),
    ("*", "multiply"),
    ("/", "divide"),
    ("=", "equal"),
    ("!=", "not_equal"),
    (">", "greater_than"),
    ("<", "less_than"),
    (">=", "greater_than_or_equal"),
    ("<=", "less_than_or_equal"),
    ("&&", "and"),
    ("||", "or"),
];

/// Canonical function name for an operator lexeme.
pub fn function_for_operator(lexeme: &str) -> Option<&'static str> {
    OPERATOR_FUNCTIONS
        .iter()
        .find(|(op, _)| *op == lexeme)
        .map(|(_, name)| *name)
}

impl BinOp {
    pub fn from_token(token: &Token) -> Option<BinOp> {
        Some(match token {
            Token::AndAnd => BinOp::And,
            Token::OrOr => BinOp::Or,
            Token::Equal => BinOp::Equal,
            Token::NotEq => BinOp::NotEqual,
            Token::Gt => BinOp::GreaterThan,
            Token::Lt => BinOp::LessThan,
            Token::GtEq => BinOp::GreaterEqual,
            Token::LtEq => BinOp::LessEqual,
            Token::Plus => BinOp::Add,
            Token::Minus => BinOp::Subtract,
            Token::Star => BinOp::Multiply,
            Token::Slash => BinOp::Divide,
            Token::Percent => BinOp::Modulo,
            _ => return None,
        })
    }

    pub fn lexeme(self) -> &'static str {
        match self {
            BinOp::And => "&&",
            BinOp::Or => "||",
            BinOp::Equal => "=",
            BinOp::NotEqual => "!=",
            BinOp::GreaterThan => ">",
            BinOp::LessThan => "<",
            BinOp::GreaterEqual => ">=",
            BinOp::LessEqual => "<=",
            BinOp::Add => "+",
            BinOp::Subtract => "-",
            BinOp::Multiply => "*",
            BinOp::Divide => "/",
            BinOp::Modulo => "%",
        }
    }

    /// Binding strength; higher binds tighter. All levels are left-associative.
    pub fn precedence(self) -> u8 {
        match self {
            BinOp::And | BinOp::Or => 1,
            BinOp::Equal | BinOp::NotEqual => 2,
            BinOp::GreaterThan | BinOp::LessThan | BinOp::GreaterEqual | BinOp::LessEqual => 3,
            BinOp::Add | BinOp::Subtract => 4,
            BinOp::Multiply | BinOp::Divide | BinOp::Modulo => 5,
        }
    }

    pub fn function_name(self) -> Option<&'static str> {
        function_for_operator(self.lexeme())
    }
}
