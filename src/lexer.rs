use serde::Serialize;

use crate::{
    ast::{QuoteStyle, Token},
    error::{FormulaError, Result},
};

/// Location in the source. Lines count from 1, columns from 0, both in
/// characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Position { line: 1, column: 0 }
    }
}

/// A token with the source text it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub lexeme: String,
    pub position: Position,
}

impl SpannedToken {
    /// How the token is quoted in syntax error messages.
    pub fn describe(&self) -> &str {
        match self.token {
            Token::Eof => "the end of the formula",
            _ => &self.lexeme,
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            line: 1,
            column: 0,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if self.current_char() == Some('\n') {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        self.position += 1;
    }

    fn location(&self) -> Position {
        Position {
            line: self.line,
            column: self.column,
        }
    }

    /// Skips whitespace, `// line` comments and `/* block */` comments.
    fn skip_trivia(&mut self) -> Result<()> {
        loop {
            match (self.current_char(), self.peek_char(1)) {
                (Some(ch), _) if ch.is_whitespace() => self.advance(),
                (Some('/'), Some('/')) => {
                    while self.current_char().is_some_and(|c| c != '\n') {
                        self.advance();
                    }
                }
                (Some('/'), Some('*')) => {
                    let start = self.location();
                    self.advance();
                    self.advance();
                    loop {
                        match (self.current_char(), self.peek_char(1)) {
                            (Some('*'), Some('/')) => {
                                self.advance();
                                self.advance();
                                break;
                            }
                            (Some(_), _) => self.advance(),
                            (None, _) => {
                                return Err(FormulaError::syntax("unterminated comment", start));
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads a quoted string, leaving escapes in place. A backslash always
    /// takes the next character with it, so `\'` does not close a
    /// single-quoted string.
    fn read_string(&mut self, quote: QuoteStyle) -> Result<Token> {
        let start = self.location();
        let mut raw = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote.char() => {
                    self.advance();
                    return Ok(Token::String { raw, quote });
                }
                '\\' => {
                    raw.push(ch);
                    self.advance();
                    if let Some(escaped) = self.current_char() {
                        raw.push(escaped);
                        self.advance();
                    }
                }
                _ => {
                    raw.push(ch);
                    self.advance();
                }
            }
        }

        Err(FormulaError::syntax("unterminated string literal", start))
    }

    fn read_number(&mut self) -> Token {
        let mut number = String::new();
        let mut is_decimal = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_decimal
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_decimal = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        if is_decimal {
            Token::Decimal(number)
        } else {
            Token::Integer(number)
        }
    }

    fn single(&mut self, token: Token) -> Token {
        self.advance();
        token
    }

    fn pair(&mut self, token: Token) -> Token {
        self.advance();
        self.advance();
        token
    }

    pub fn next_spanned(&mut self) -> Result<SpannedToken> {
        self.skip_trivia()?;

        let start = self.position;
        let position = self.location();

        let token = match self.current_char() {
            None => Token::Eof,
            Some('(') => self.single(Token::LParen),
            Some(')') => self.single(Token::RParen),
            Some(',') => self.single(Token::Comma),
            Some('+') => self.single(Token::Plus),
            Some('-') => self.single(Token::Minus),
            Some('*') => self.single(Token::Star),
            Some('/') => self.single(Token::Slash),
            Some('%') => self.single(Token::Percent),
            Some('=') => self.single(Token::Equal),
            Some('>') if self.peek_char(1) == Some('=') => self.pair(Token::GtEq),
            Some('>') => self.single(Token::Gt),
            Some('<') if self.peek_char(1) == Some('=') => self.pair(Token::LtEq),
            Some('<') => self.single(Token::Lt),
            Some('!') if self.peek_char(1) == Some('=') => self.pair(Token::NotEq),
            Some('&') if self.peek_char(1) == Some('&') => self.pair(Token::AndAnd),
            Some('|') if self.peek_char(1) == Some('|') => self.pair(Token::OrOr),
            Some('\'') => self.read_string(QuoteStyle::Single)?,
            Some('"') => self.read_string(QuoteStyle::Double)?,
            Some(ch) if ch.is_ascii_digit() => self.read_number(),
            Some(ch) if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.to_lowercase().as_str() {
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "field" => Token::Field,
                    "lookup" => Token::Lookup,
                    "field_by_id" => Token::FieldById,
                    _ => Token::Identifier(ident),
                }
            }
            Some(ch) => {
                return Err(FormulaError::syntax(
                    format!("token recognition error at: '{}'", ch),
                    position,
                ));
            }
        };

        let lexeme = self.input[start..self.position].iter().collect();
        Ok(SpannedToken {
            token,
            lexeme,
            position,
        })
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.next_spanned().map(|spanned| spanned.token)
    }
}

/// Every token of `source`, ending with [`Token::Eof`].
pub fn tokenize(source: &str) -> Result<Vec<SpannedToken>> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let spanned = lexer.next_spanned()?;
        let done = spanned.token == Token::Eof;
        tokens.push(spanned);
        if done {
            return Ok(tokens);
        }
    }
}

#[test]
fn test_keywords_ignore_case() {
    let mut lexer = Lexer::new("TRUE false Field LOOKUP field_by_id");
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(true));
    assert_eq!(lexer.next_token().unwrap(), Token::Boolean(false));
    assert_eq!(lexer.next_token().unwrap(), Token::Field);
    assert_eq!(lexer.next_token().unwrap(), Token::Lookup);
    assert_eq!(lexer.next_token().unwrap(), Token::FieldById);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_positions_track_lines() {
    let tokens = tokenize("1 +\n  field('a')").unwrap();
    assert_eq!(tokens[0].position, Position { line: 1, column: 0 });
    assert_eq!(tokens[1].position, Position { line: 1, column: 2 });
    assert_eq!(tokens[2].position, Position { line: 2, column: 2 });
    assert_eq!(tokens[2].lexeme, "field");
}

#[test]
fn test_escaped_quote_stays_raw() {
    let mut lexer = Lexer::new(r"'it\'s'");
    assert_eq!(
        lexer.next_token().unwrap(),
        Token::String {
            raw: r"it\'s".to_string(),
            quote: QuoteStyle::Single
        }
    );
}
