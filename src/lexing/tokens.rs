//! Raw token definitions for the expression sub-language
//!
//! The character classes are total: every non-whitespace character belongs to exactly one
//! of them, so scanning never has to give up on an input.
use logos::Logos;

/// Scanner-level tokens, before identifier classification
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"\s+")]
pub enum RawToken {
    #[token("(")]
    OpenParen,
    #[token(")")]
    CloseParen,
    #[token(",")]
    Comma,

    // Starts with a letter or underscore; digits and periods extend it
    #[regex(r"[\p{Alphabetic}_][\p{Alphabetic}\p{N}_.]*")]
    Word,

    #[regex(r"[0-9.]+")]
    Number,

    // Catch-all: runs of operator characters such as `+`, `<=` or `&&`
    #[regex(r"[^\s\p{Alphabetic}0-9_.(),]+")]
    Symbol,
}

impl RawToken {
    /// Check if this token is one of the single-character control tokens
    pub fn is_control(&self) -> bool {
        matches!(
            self,
            RawToken::OpenParen | RawToken::CloseParen | RawToken::Comma
        )
    }
}
