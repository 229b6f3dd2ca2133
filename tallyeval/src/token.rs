use std::fmt::Display;

use crate::span::Spand;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TokenKind {
    /// Numeric literal, already parsed by the lexer.
    Number(f64),

    Plus,
    Minus,
    Star,
    Slash,
    Percent,

    LParen,
    RParen,
}

pub type Token = Spand<TokenKind>;

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(x) => write!(f, "{x}"),

            Self::Plus => write!(f, "+"),
            Self::Minus => write!(f, "-"),
            Self::Star => write!(f, "*"),
            Self::Slash => write!(f, "/"),
            Self::Percent => write!(f, "%"),

            Self::LParen => write!(f, "("),
            Self::RParen => write!(f, ")"),
        }
    }
}
