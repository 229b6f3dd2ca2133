use thiserror::Error;

use crate::lexer::{LexError, Lexer};
use crate::parser::{ParseError, Parser};
use crate::span::{Span, Spand};

pub mod lexer;
pub mod parser;
pub mod span;
pub mod token;

/// Longest accepted expression, in characters, after trimming.
pub const MAX_EXPR_LEN: usize = 200;

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardErrorKind {
    #[error("empty expression")]
    Empty,
    #[error("expression longer than {MAX_EXPR_LEN} characters")]
    TooLong,
    #[error("character '{0}' is not allowed")]
    DisallowedChar(char),
    #[error("result is not a finite number")]
    NonFinite,
}

pub type GuardError = Spand<GuardErrorKind>;

#[derive(Debug, Clone)]
pub enum EvalError {
    Guard(GuardError),
    Lex(Vec<LexError>),
    Parse(ParseError),
}

impl From<GuardError> for EvalError {
    fn from(value: GuardError) -> Self {
        Self::Guard(value)
    }
}

impl From<Vec<LexError>> for EvalError {
    fn from(value: Vec<LexError>) -> Self {
        Self::Lex(value)
    }
}

impl From<ParseError> for EvalError {
    fn from(value: ParseError) -> Self {
        Self::Parse(value)
    }
}

fn admissible(c: char) -> bool {
    c.is_ascii_digit()
        || c.is_whitespace()
        || matches!(c, '.' | '+' | '-' | '*' | '/' | '%' | '(' | ')')
}

fn check(expr: &str) -> Result<(), GuardError> {
    if expr.is_empty() {
        return Err(GuardError::new(GuardErrorKind::Empty, Span::default()));
    }

    if expr.chars().count() > MAX_EXPR_LEN {
        let span = Span::new(0, u32::try_from(expr.len()).unwrap_or(u32::MAX));
        return Err(GuardError::new(GuardErrorKind::TooLong, span));
    }

    if let Some((at, c)) = expr.char_indices().find(|&(_, c)| !admissible(c)) {
        #[allow(clippy::cast_possible_truncation)]
        let span = Span::new(at as u32, (at + c.len_utf8()) as u32);
        return Err(GuardError::new(GuardErrorKind::DisallowedChar(c), span));
    }

    Ok(())
}

/// Evaluates `input`, keeping the failure stages apart. Spans in the
/// returned error index into the trimmed input.
pub fn try_evaluate(input: &str) -> Result<f64, EvalError> {
    let expr = input.trim();
    check(expr)?;

    let tokens = Lexer::new(expr).lex_all()?;
    let value = Parser::new(tokens).parse_all()?;

    if value.is_finite() {
        Ok(value)
    } else {
        let span = Span::new(0, u32::try_from(expr.len()).unwrap_or(u32::MAX));
        Err(GuardError::new(GuardErrorKind::NonFinite, span).into())
    }
}

/// The two-way boundary the caller sees: a finite number, or nothing.
#[must_use]
pub fn evaluate(input: &str) -> Option<f64> {
    try_evaluate(input).ok()
}
