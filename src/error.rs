//! Crate-level error
//!
//! Compiling a system goes through several stages, each with its own error type.
//! [`LsysError`] wraps all of them so callers can use one `?` chain from text to
//! generator, and [`LsysError::AtLine`] adds the input line the failure came from.

use std::fmt;

use crate::expression::{EvalError, IdentifierError, LiteralError, ParseError};
use crate::grammar::GrammarError;
use crate::lexing::LexError;

#[derive(Debug, Clone, PartialEq)]
pub enum LsysError {
    Lex(LexError),
    Identifier(IdentifierError),
    Parse(ParseError),
    Literal(LiteralError),
    Grammar(GrammarError),
    Evaluation(EvalError),
    /// Failure while compiling the given 1-based input line
    AtLine { line: usize, source: Box<LsysError> },
}

impl LsysError {
    pub fn at_line(self, line: usize) -> Self {
        match self {
            already @ LsysError::AtLine { .. } => already,
            other => LsysError::AtLine {
                line,
                source: Box::new(other),
            },
        }
    }

    /// Line number, if the error was raised for a specific input line
    pub fn line(&self) -> Option<usize> {
        match self {
            LsysError::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// The stage error without line decoration
    pub fn root(&self) -> &LsysError {
        match self {
            LsysError::AtLine { source, .. } => source.root(),
            other => other,
        }
    }
}

impl fmt::Display for LsysError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LsysError::Lex(err) => write!(f, "{}", err),
            LsysError::Identifier(err) => write!(f, "{}", err),
            LsysError::Parse(err) => write!(f, "{}", err),
            LsysError::Literal(err) => write!(f, "Invalid literal: {}", err),
            LsysError::Grammar(err) => write!(f, "{}", err),
            LsysError::Evaluation(err) => write!(f, "{}", err),
            LsysError::AtLine { line, source } => write!(f, "Line {}: {}", line, source),
        }
    }
}

impl std::error::Error for LsysError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LsysError::Lex(err) => Some(err),
            LsysError::Identifier(err) => Some(err),
            LsysError::Parse(err) => Some(err),
            LsysError::Literal(err) => Some(err),
            LsysError::Grammar(err) => Some(err),
            LsysError::Evaluation(err) => Some(err),
            LsysError::AtLine { source, .. } => Some(source.as_ref()),
        }
    }
}

impl From<LexError> for LsysError {
    fn from(err: LexError) -> Self {
        LsysError::Lex(err)
    }
}

impl From<IdentifierError> for LsysError {
    fn from(err: IdentifierError) -> Self {
        LsysError::Identifier(err)
    }
}

impl From<ParseError> for LsysError {
    fn from(err: ParseError) -> Self {
        LsysError::Parse(err)
    }
}

impl From<LiteralError> for LsysError {
    fn from(err: LiteralError) -> Self {
        LsysError::Literal(err)
    }
}

impl From<GrammarError> for LsysError {
    fn from(err: GrammarError) -> Self {
        LsysError::Grammar(err)
    }
}

impl From<EvalError> for LsysError {
    fn from(err: EvalError) -> Self {
        LsysError::Evaluation(err)
    }
}
