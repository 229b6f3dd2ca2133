use std::str::Chars;

use thiserror::Error;

use crate::span::{Span, Spand};
use crate::token::{Token, TokenKind};

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("invalid character '{0}'")]
    InvalidChar(char),
    #[error("malformed number")]
    MalformedNumber,
}

pub type LexError = Spand<LexErrorKind>;
pub type LexResult<T> = Result<T, LexError>;

pub struct Lexer<'a> {
    input: &'a str,
    chars: Chars<'a>,

    /// start byte position of current token
    byte_start: u32,

    /// byte position of cursor
    byte: u32,
}

const EOF: char = '\0';

impl<'a> Lexer<'a> {
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        assert!(u32::try_from(input.len()).is_ok());

        Self {
            input,
            chars: input.chars(),
            byte_start: 0,
            byte: 0,
        }
    }

    pub fn lex_all(self) -> Result<Vec<Token>, Vec<LexError>> {
        let mut tokens = Vec::new();
        let mut errors = Vec::new();

        for item in self {
            match item {
                Ok(ok) => tokens.push(ok),
                Err(err) => errors.push(err),
            }
        }

        if errors.is_empty() {
            Ok(tokens)
        } else {
            Err(errors)
        }
    }

    fn first(&self) -> char {
        self.chars.clone().next().unwrap_or(EOF)
    }

    fn is_eof(&self) -> bool {
        self.chars.as_str().is_empty()
    }

    fn bump(&mut self) -> Option<char> {
        #[allow(clippy::cast_possible_truncation)]
        self.chars
            .next()
            .inspect(|c| self.byte += c.len_utf8() as u32)
    }

    fn eat_while(&mut self, pred: impl Fn(char) -> bool) {
        while !self.is_eof() && pred(self.first()) {
            self.bump();
        }
    }

    const fn make_span(&self) -> Span {
        Span::new(self.byte_start, self.byte)
    }

    fn skip_whitespace(&mut self) {
        self.eat_while(char::is_whitespace);
    }

    fn view(&self) -> &'a str {
        &self.input[self.byte_start as usize..self.byte as usize]
    }

    /// Lexes a maximal run of digits and dots. Runs that do not form a
    /// numeric literal (`1.2.3`, `1..2`) are an error, not a number.
    fn number(&mut self) -> LexResult<Token> {
        self.eat_while(|c| c.is_ascii_digit() || c == '.');

        let span = self.make_span();
        self.view()
            .parse()
            .map(|value| Token::new(TokenKind::Number(value), span))
            .map_err(|_| LexError::new(LexErrorKind::MalformedNumber, span))
    }

    pub fn next_token(&mut self) -> Option<LexResult<Token>> {
        macro_rules! token {
            ($name:ident) => {
                Some(Ok(Token::new(TokenKind::$name, self.make_span())))
            };
        }

        self.skip_whitespace();

        self.byte_start = self.byte;
        let c = self.bump()?;

        match c {
            '(' => token!(LParen),
            ')' => token!(RParen),
            '+' => token!(Plus),
            '-' => token!(Minus),
            '*' => token!(Star),
            '/' => token!(Slash),
            '%' => token!(Percent),

            '0'..='9' => Some(self.number()),

            _ => Some(Err(LexError::new(
                LexErrorKind::InvalidChar(c),
                self.make_span(),
            ))),
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = LexResult<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_token()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Lexer::new(input)
            .lex_all()
            .unwrap()
            .into_iter()
            .map(|tk| tk.kind)
            .collect()
    }

    #[test]
    fn operators_and_parens() {
        assert_eq!(
            kinds("(1 + 2) * 3 / 4 - 5 %"),
            vec![
                TokenKind::LParen,
                TokenKind::Number(1.0),
                TokenKind::Plus,
                TokenKind::Number(2.0),
                TokenKind::RParen,
                TokenKind::Star,
                TokenKind::Number(3.0),
                TokenKind::Slash,
                TokenKind::Number(4.0),
                TokenKind::Minus,
                TokenKind::Number(5.0),
                TokenKind::Percent,
            ]
        );
    }

    #[test]
    fn decimal_number() {
        assert_eq!(kinds("12.75"), vec![TokenKind::Number(12.75)]);
    }

    #[test]
    fn trailing_dot_number() {
        assert_eq!(kinds("5."), vec![TokenKind::Number(5.0)]);
    }

    #[test]
    fn whitespace_only() {
        assert_eq!(kinds(" \t\n "), vec![]);
    }

    #[test]
    fn number_span() {
        let tokens = Lexer::new("  3.5 ").lex_all().unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].span, Span::new(2, 5));
    }

    #[test]
    fn multi_dot_run() {
        let errors = Lexer::new("1.2.3").lex_all().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(*errors[0].kind(), LexErrorKind::MalformedNumber);
        assert_eq!(errors[0].span, Span::new(0, 5));
    }

    #[test]
    fn invalid_chars() {
        let errors = Lexer::new("1 + a + b").lex_all().unwrap_err();
        let kinds: Vec<_> = errors.iter().map(|e| *e.kind()).collect();
        assert_eq!(
            kinds,
            vec![
                LexErrorKind::InvalidChar('a'),
                LexErrorKind::InvalidChar('b'),
            ]
        );
    }

    #[test]
    fn standalone_dot() {
        let errors = Lexer::new(".5").lex_all().unwrap_err();
        assert_eq!(*errors[0].kind(), LexErrorKind::InvalidChar('.'));
    }

    #[test]
    fn tokens_display_like_source() {
        let rendered: Vec<_> = Lexer::new("(2 + 3.5) % ")
            .lex_all()
            .unwrap()
            .into_iter()
            .map(|tk| tk.kind.to_string())
            .collect();
        assert_eq!(rendered, vec!["(", "2", "+", "3.5", ")", "%"]);
    }
}
