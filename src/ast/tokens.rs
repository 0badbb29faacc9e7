use serde::Serialize;

/// Which quote character delimits a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStyle {
    Single,
    Double,
}

impl QuoteStyle {
    pub fn char(self) -> char {
        match self {
            QuoteStyle::Single => '\'',
            QuoteStyle::Double => '"',
        }
    }
}

/// Broad classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Literal,
    Identifier,
    Keyword,
    Operator,
    Punctuation,
    EndOfInput,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// String literal in single or double quotes. `raw` is the text between
    /// the quotes with escapes left intact.
    ///
    /// # Examples
    /// ```text
    /// 'hello'
    /// "it's"
    /// 'it\'s'
    /// ```
    String { raw: String, quote: QuoteStyle },

    /// Whole number, kept as written
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 007
    /// ```
    Integer(String),

    /// Number with a fractional part, kept as written so its scale survives
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1.50
    /// ```
    Decimal(String),

    /// `true` or `false`, in any case
    Boolean(bool),

    // Identifiers and keywords
    /// Function name
    ///
    /// Starts with a letter or underscore, followed by letters, digits, or
    /// underscores. Unicode letters are allowed.
    ///
    /// # Examples
    /// ```text
    /// upper
    /// date_diff
    /// ```
    Identifier(String),

    /// `field`
    Field,
    /// `lookup`
    Lookup,
    /// `field_by_id`, only kept to reject it with a clear error
    FieldById,

    // Operators
    /// `+`
    Plus,
    /// `-`
    Minus,
    /// `*`
    Star,
    /// `/`
    Slash,
    /// `%`
    Percent,
    /// `=`
    Equal,
    /// `!=`
    NotEq,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    GtEq,
    /// `<=`
    LtEq,
    /// `&&`
    AndAnd,
    /// `||`
    OrOr,

    // Punctuation
    LParen,
    RParen,
    Comma,

    Eof,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::String { .. } | Token::Integer(_) | Token::Decimal(_) | Token::Boolean(_) => {
                TokenKind::Literal
            }
            Token::Identifier(_) => TokenKind::Identifier,
            Token::Field | Token::Lookup | Token::FieldById => TokenKind::Keyword,
            Token::LParen | Token::RParen | Token::Comma => TokenKind::Punctuation,
            Token::Eof => TokenKind::EndOfInput,
            _ => TokenKind::Operator,
        }
    }
}
