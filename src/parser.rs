use std::mem;

use tracing::trace;

use crate::{
    ast::{BinOp, ParseTree, QuotedString, Token},
    config::Limits,
    error::{FormulaError, Result},
    lexer::{Lexer, Position, SpannedToken},
};

pub struct Parser {
    lexer: Lexer,
    current: SpannedToken,
    limits: Limits,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self> {
        let current = lexer.next_spanned()?;
        Ok(Parser {
            lexer,
            current,
            limits: Limits::default(),
        })
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    fn advance(&mut self) -> Result<SpannedToken> {
        let next = self.lexer.next_spanned()?;
        Ok(mem::replace(&mut self.current, next))
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current.token) == mem::discriminant(token)
    }

    fn mismatch(&self, expecting: &str) -> FormulaError {
        FormulaError::syntax(
            format!(
                "mismatched input '{}' expecting {}",
                self.current.describe(),
                expecting
            ),
            self.current.position,
        )
    }

    fn expect(&mut self, expected: Token, display: &str) -> Result<()> {
        if !self.check(&expected) {
            return Err(self.mismatch(display));
        }
        self.advance()?;
        Ok(())
    }

    fn enter(&self, depth: usize) -> Result<()> {
        if depth > self.limits.max_depth {
            return Err(FormulaError::FormulaTooLarge);
        }
        Ok(())
    }

    fn expect_string(&mut self) -> Result<QuotedString> {
        if !matches!(self.current.token, Token::String { .. }) {
            return Err(self.mismatch("a quoted string"));
        }
        match self.advance()?.token {
            Token::String { raw, quote } => Ok(QuotedString { raw, quote }),
            _ => Err(self.mismatch("a quoted string")),
        }
    }

    /// Parse primary expressions: literals, brackets, references and calls.
    ///
    /// Each alternative lives in its own function so the frame kept alive
    /// across nested calls stays small.
    fn parse_primary(&mut self, depth: usize) -> Result<ParseTree> {
        let position = self.current.position;

        match self.current.token {
            Token::String { .. } | Token::Integer(_) | Token::Decimal(_) | Token::Boolean(_) => {
                self.parse_literal(position)
            }
            Token::LParen => self.parse_brackets(position, depth),
            Token::Field => self.parse_field(position),
            Token::Lookup => self.parse_lookup(position),
            Token::FieldById => self.parse_field_by_id(position),
            Token::Identifier(_) => self.parse_call(position, depth),
            _ => Err(self.mismatch("an expression")),
        }
    }

    fn parse_literal(&mut self, position: Position) -> Result<ParseTree> {
        Ok(match self.advance()?.token {
            Token::String { raw, quote } => ParseTree::StringLiteral {
                literal: QuotedString { raw, quote },
                position,
            },
            Token::Integer(text) => ParseTree::IntegerLiteral { text, position },
            Token::Decimal(text) => ParseTree::DecimalLiteral { text, position },
            Token::Boolean(value) => ParseTree::BooleanLiteral { value, position },
            _ => return Err(self.mismatch("a literal")),
        })
    }

    fn parse_brackets(&mut self, position: Position, depth: usize) -> Result<ParseTree> {
        self.advance()?;
        let inner = self.parse_expression(depth + 1)?;
        self.expect(Token::RParen, "')'")?;
        Ok(ParseTree::Brackets {
            inner: Box::new(inner),
            position,
        })
    }

    fn parse_field(&mut self, position: Position) -> Result<ParseTree> {
        self.advance()?;
        self.expect(Token::LParen, "'('")?;
        let name = self.expect_string()?;
        self.expect(Token::RParen, "')'")?;
        Ok(ParseTree::FieldReference { name, position })
    }

    fn parse_lookup(&mut self, position: Position) -> Result<ParseTree> {
        self.advance()?;
        self.expect(Token::LParen, "'('")?;
        let via = self.expect_string()?;
        self.expect(Token::Comma, "','")?;
        let target = self.expect_string()?;
        self.expect(Token::RParen, "')'")?;
        Ok(ParseTree::LookupFieldReference {
            via,
            target,
            position,
        })
    }

    fn parse_field_by_id(&mut self, position: Position) -> Result<ParseTree> {
        self.advance()?;
        self.expect(Token::LParen, "'('")?;
        if !matches!(self.current.token, Token::Integer(_)) {
            return Err(self.mismatch("an integer"));
        }
        let id = match self.advance()?.token {
            Token::Integer(id) => id,
            _ => return Err(self.mismatch("an integer")),
        };
        self.expect(Token::RParen, "')'")?;
        Ok(ParseTree::FieldByIdReference { id, position })
    }

    fn parse_call(&mut self, position: Position, depth: usize) -> Result<ParseTree> {
        let name = match self.advance()?.token {
            Token::Identifier(name) => name,
            _ => return Err(self.mismatch("a function name")),
        };
        self.expect(Token::LParen, "'('")?;
        let args = self.parse_arguments(depth + 1)?;
        Ok(ParseTree::FunctionCall {
            name,
            args,
            position,
        })
    }

    /// Comma separated arguments up to and including the closing bracket.
    fn parse_arguments(&mut self, depth: usize) -> Result<Vec<ParseTree>> {
        let mut args = vec![];

        if self.check(&Token::RParen) {
            self.advance()?;
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression(depth)?);
            match self.current.token {
                Token::Comma => {
                    self.advance()?;
                }
                Token::RParen => {
                    self.advance()?;
                    return Ok(args);
                }
                _ => return Err(self.mismatch("',' or ')'")),
            }
        }
    }

    /// Unary minus. Applied directly to a numeric literal it becomes part of
    /// the literal.
    fn parse_unary(&mut self, depth: usize) -> Result<ParseTree> {
        self.enter(depth)?;

        if !self.check(&Token::Minus) {
            return self.parse_primary(depth);
        }

        let position = self.advance()?.position;
        match &self.current.token {
            Token::Integer(text) => {
                let text = format!("-{}", text);
                self.advance()?;
                Ok(ParseTree::IntegerLiteral { text, position })
            }
            Token::Decimal(text) => {
                let text = format!("-{}", text);
                self.advance()?;
                Ok(ParseTree::DecimalLiteral { text, position })
            }
            _ => {
                let operand = self.parse_unary(depth + 1)?;
                Ok(ParseTree::UnaryMinus {
                    operand: Box::new(operand),
                    position,
                })
            }
        }
    }

    /// Precedence climbing over [`BinOp::precedence`]. Each operator folded
    /// into a left-deep chain counts as one level of depth.
    fn parse_binary(&mut self, min_precedence: u8, depth: usize) -> Result<ParseTree> {
        let mut left = self.parse_unary(depth)?;
        let mut chain = depth;

        while let Some(op) = BinOp::from_token(&self.current.token) {
            let precedence = op.precedence();
            if precedence < min_precedence {
                break;
            }

            let position: Position = self.advance()?.position;
            chain += 1;
            self.enter(chain)?;

            let right = self.parse_binary(precedence + 1, depth + 1)?;
            left = ParseTree::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
                position,
            };
        }
        Ok(left)
    }

    pub fn parse_expression(&mut self, depth: usize) -> Result<ParseTree> {
        self.enter(depth)?;
        self.parse_binary(0, depth)
    }

    /// Parses the whole input as a single expression.
    pub fn parse(&mut self) -> Result<ParseTree> {
        let tree = self.parse_expression(0)?;
        if !self.check(&Token::Eof) {
            return Err(self.mismatch("the end of the formula"));
        }
        trace!(?tree, "parsed formula");
        Ok(tree)
    }
}

/// Parses `source` with default limits.
pub fn parse(source: &str) -> Result<ParseTree> {
    parse_with_limits(source, Limits::default())
}

pub fn parse_with_limits(source: &str, limits: Limits) -> Result<ParseTree> {
    Parser::new(Lexer::new(source))?.with_limits(limits).parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_call_bracket_reports_end_of_formula() {
        let err = parse("test").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid syntax at line 1, col 4: mismatched input 'the end of the formula' expecting '('"
        );
    }

    #[test]
    fn test_negative_literal_is_folded() {
        assert!(matches!(
            parse("-1.5").unwrap(),
            ParseTree::DecimalLiteral { ref text, .. } if text == "-1.5"
        ));
    }

    #[test]
    fn test_deep_brackets_are_rejected() {
        let limits = Limits {
            max_depth: 10,
            ..Limits::default()
        };
        let source = format!("{}1{}", "(".repeat(20), ")".repeat(20));
        assert_eq!(
            parse_with_limits(&source, limits).unwrap_err(),
            FormulaError::FormulaTooLarge
        );
    }
}
