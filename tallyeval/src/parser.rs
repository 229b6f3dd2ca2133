use thiserror::Error;

use crate::span::{Span, Spand};
use crate::token::{Token, TokenKind};

#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ParseErrorKind {
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("expected a value, found '{0}'")]
    ExpectedValue(TokenKind),
    #[error("missing closing parenthesis")]
    UnclosedParen,
    #[error("unexpected token '{0}' after expression")]
    Trailing(TokenKind),
}

pub type ParseError = Spand<ParseErrorKind>;
pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive descent over the token sequence, lowest precedence first:
///
/// ```text
/// expr    := term ( ('+' | '-') term )*
/// term    := postfix ( ('*' | '/') postfix )*
/// postfix := prefix ('%')?
/// prefix  := ('-' | '+') prefix | primary
/// primary := number | '(' expr ')'
/// ```
///
/// Each production folds into its value as it is parsed; no tree is built.
/// The postfix `%` divides by 100. Division is plain IEEE division, so a
/// zero divisor flows out of here as an infinity or NaN.
pub struct Parser {
    tokens:  Vec<Token>,
    current: usize,
}

impl Parser {
    #[must_use]
    pub const fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, current: 0 }
    }

    fn last_span(&self) -> Span {
        self.tokens
            .get(self.current)
            .or_else(|| self.tokens.last())
            .map(|tk| tk.span)
            .unwrap_or_default()
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.current).copied()
    }

    const fn eat(&mut self) {
        self.current += 1;
    }

    fn next(&mut self) -> ParseResult<Token> {
        let tk = self
            .peek()
            .ok_or_else(|| ParseError::new(ParseErrorKind::UnexpectedEnd, self.last_span()))?;
        self.current += 1;
        Ok(tk)
    }

    fn next_if_kind(&mut self, tk: TokenKind) -> Option<Span> {
        match self.peek() {
            Some(Token { kind, span }) if kind == tk => {
                self.eat();
                Some(span)
            }
            _ => None,
        }
    }

    /// Parses the whole token sequence as one expression. Anything left
    /// over after the top-level production is an error.
    pub fn parse_all(&mut self) -> ParseResult<f64> {
        let value = self.parse_expr()?;
        match self.peek() {
            Some(Token { kind, span }) => {
                Err(ParseError::new(ParseErrorKind::Trailing(kind), span))
            }
            None => Ok(value),
        }
    }

    pub fn parse_expr(&mut self) -> ParseResult<f64> {
        let mut value = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token {
                    kind: TokenKind::Plus,
                    ..
                }) => {
                    self.eat();
                    value += self.parse_term()?;
                }
                Some(Token {
                    kind: TokenKind::Minus,
                    ..
                }) => {
                    self.eat();
                    value -= self.parse_term()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_term(&mut self) -> ParseResult<f64> {
        let mut value = self.parse_postfix()?;
        loop {
            match self.peek() {
                Some(Token {
                    kind: TokenKind::Star,
                    ..
                }) => {
                    self.eat();
                    value *= self.parse_postfix()?;
                }
                Some(Token {
                    kind: TokenKind::Slash,
                    ..
                }) => {
                    self.eat();
                    value /= self.parse_postfix()?;
                }
                _ => break,
            }
        }
        Ok(value)
    }

    fn parse_postfix(&mut self) -> ParseResult<f64> {
        let value = self.parse_prefix()?;
        if self.next_if_kind(TokenKind::Percent).is_some() {
            Ok(value / 100.0)
        } else {
            Ok(value)
        }
    }

    fn parse_prefix(&mut self) -> ParseResult<f64> {
        match self.peek() {
            Some(Token {
                kind: TokenKind::Minus,
                ..
            }) => {
                self.eat();
                Ok(-self.parse_prefix()?)
            }
            Some(Token {
                kind: TokenKind::Plus,
                ..
            }) => {
                self.eat();
                self.parse_prefix()
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> ParseResult<f64> {
        let Token { kind, span } = self.next()?;

        match kind {
            TokenKind::Number(value) => Ok(value),
            TokenKind::LParen => {
                let value = self.parse_expr()?;
                self.next_if_kind(TokenKind::RParen)
                    .ok_or_else(|| {
                        ParseError::new(ParseErrorKind::UnclosedParen, self.last_span())
                    })?;
                Ok(value)
            }
            _ => Err(ParseError::new(ParseErrorKind::ExpectedValue(kind), span)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::lexer::Lexer;

    fn parse(input: &str) -> ParseResult<f64> {
        let tokens = Lexer::new(input).lex_all().unwrap();
        Parser::new(tokens).parse_all()
    }

    #[test]
    fn left_associative_sub() {
        assert_eq!(parse("10 - 4 - 3").unwrap(), 3.0);
    }

    #[test]
    fn left_associative_div() {
        assert_eq!(parse("24 / 4 / 2").unwrap(), 3.0);
    }

    #[test]
    fn percent_binds_tighter_than_mul() {
        assert_eq!(parse("100 * 50%").unwrap(), 50.0);
    }

    #[test]
    fn percent_of_parenthesized() {
        assert_eq!(parse("(20 + 30)%").unwrap(), 0.5);
    }

    #[test]
    fn sign_chains() {
        assert_eq!(parse("--5").unwrap(), 5.0);
        assert_eq!(parse("+-+3").unwrap(), -3.0);
    }

    #[test]
    fn nested_parens() {
        assert_eq!(parse("((2 + 3) * (4 - 1))").unwrap(), 15.0);
    }

    #[test]
    fn empty_input() {
        let err = parse("").unwrap_err();
        assert_eq!(*err.kind(), ParseErrorKind::UnexpectedEnd);
    }

    #[test]
    fn dangling_operator() {
        let err = parse("2 +").unwrap_err();
        assert_eq!(*err.kind(), ParseErrorKind::UnexpectedEnd);
    }

    #[test]
    fn missing_closing_paren() {
        let err = parse("(2 + 3").unwrap_err();
        assert_eq!(*err.kind(), ParseErrorKind::UnclosedParen);
    }

    #[test]
    fn stray_closing_paren() {
        let err = parse("2 + 3)").unwrap_err();
        assert_eq!(*err.kind(), ParseErrorKind::Trailing(TokenKind::RParen));
    }

    #[test]
    fn double_percent() {
        let err = parse("50%%").unwrap_err();
        assert_eq!(*err.kind(), ParseErrorKind::Trailing(TokenKind::Percent));
    }

    #[test]
    fn operator_in_primary_position() {
        let err = parse("2 + * 3").unwrap_err();
        assert_eq!(*err.kind(), ParseErrorKind::ExpectedValue(TokenKind::Star));
    }

    #[test]
    fn division_by_zero_is_not_a_parse_error() {
        assert!(parse("5 / 0").unwrap().is_infinite());
    }
}
