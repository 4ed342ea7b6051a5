//! Token classification
//!
//! Turns the raw logos stream into [`Token`]s. Control characters become Control tokens,
//! anything whose text is a known identifier representation becomes an Identifier, and
//! everything else is a Literal left for the scalar type to interpret.

use logos::Logos;
use std::collections::HashSet;
use std::fmt;
use std::ops::Range;

use super::tokens::RawToken;

/// Errors that can occur during lexing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    /// The scanner could not classify the text at `span`
    Unscannable { span: Range<usize>, text: String },
    /// A token with no text would have been emitted
    EmptyToken { position: usize },
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::Unscannable { span, text } => {
                write!(f, "Cannot tokenize '{}' at {}..{}", text, span.start, span.end)
            }
            LexError::EmptyToken { position } => {
                write!(f, "Empty token at position {}", position)
            }
        }
    }
}

impl std::error::Error for LexError {}

/// Classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// One of `(`, `)` or `,`
    Control,
    /// Text registered as an operator, function or variable
    Identifier,
    /// Anything else, e.g. explicit number values
    Literal,
}

/// A classified token together with its byte span in the scanned input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Range<usize>,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Range<usize>) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Check if this token is the control character `c`
    pub fn is_control(&self, c: char) -> bool {
        self.kind == TokenKind::Control && self.text.len() == 1 && self.text.starts_with(c)
    }

    pub fn is_open(&self) -> bool {
        self.is_control('(')
    }

    pub fn is_close(&self) -> bool {
        self.is_control(')')
    }

    pub fn is_comma(&self) -> bool {
        self.is_control(',')
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Split `input` into classified tokens.
///
/// `known_identifiers` holds every representation registered with the caller; a word or
/// symbol run is an Identifier exactly when its whole text is in that set.
pub fn tokenize(input: &str, known_identifiers: &HashSet<String>) -> Result<Vec<Token>, LexError> {
    let mut lexer = RawToken::lexer(input);
    let mut tokens = Vec::new();

    while let Some(raw) = lexer.next() {
        let span = lexer.span();
        let text = lexer.slice();
        let raw = raw.map_err(|_| LexError::Unscannable {
            span: span.clone(),
            text: text.to_string(),
        })?;

        if text.is_empty() {
            return Err(LexError::EmptyToken {
                position: span.start,
            });
        }

        let kind = if raw.is_control() {
            TokenKind::Control
        } else if known_identifiers.contains(text) {
            TokenKind::Identifier
        } else {
            TokenKind::Literal
        };
        tokens.push(Token::new(kind, text, span));
    }

    Ok(tokens)
}
