//! Module occurrence splitting
//!
//! An occurrence is a module name optionally followed by one bracket group whose content is
//! kept verbatim: `ModuleModule(details)` reads as `Module` then `Module(details)`. Nested
//! brackets inside a group belong to the group, so `F(sqrt(x))` is a single occurrence.

use chumsky::prelude::*;
use chumsky::primitive::filter;
use std::ops::Range;

use super::GrammarError;

/// One `Name(parameters)` in a module sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occurrence {
    pub name: String,
    /// Text between the brackets, `None` when there is no bracket group
    pub parameters: Option<String>,
}

impl Occurrence {
    pub fn new(name: impl Into<String>, parameters: Option<&str>) -> Self {
        Self {
            name: name.into(),
            parameters: parameters.map(str::to_string),
        }
    }

    /// Bracket content split on top-level commas; `A` and `A()` both have none
    pub fn parameter_pieces(&self) -> Vec<&str> {
        match self.parameters.as_deref() {
            None | Some("") => Vec::new(),
            Some(text) => split_top_level(text, ','),
        }
    }
}

fn name_start(c: &char) -> bool {
    c.is_uppercase()
}

fn name_continue(c: &char) -> bool {
    c.is_lowercase() || c.is_numeric() || *c == '_'
}

/// Parser for a whole module sequence
fn sequence() -> impl Parser<char, Vec<Occurrence>, Error = Simple<char>> {
    let name = filter(name_start)
        .chain(filter(name_continue).repeated())
        .collect::<String>()
        .labelled("module name");

    let group = recursive(|group| {
        group
            .map(|inner: String| format!("({})", inner))
            .or(none_of("()").map(|c: char| c.to_string()))
            .repeated()
            .map(|parts: Vec<String>| parts.concat())
            .delimited_by(just('('), just(')'))
    });

    name.then(group.or_not())
        .map(|(name, parameters)| Occurrence { name, parameters })
        .repeated()
        .then_ignore(end())
}

/// Split `text` into module occurrences
pub fn separate(text: &str) -> Result<Vec<Occurrence>, GrammarError> {
    check_brackets(text)?;

    sequence().parse(text).map_err(|errors| {
        let (position, reason) = match errors.first() {
            Some(error) => (char_to_byte(text, error.span()), describe(error)),
            None => (0, "cannot be parsed".to_string()),
        };
        GrammarError::InvalidModuleSequence {
            text: text.to_string(),
            position,
            reason,
        }
    })
}

fn describe(error: &Simple<char>) -> String {
    match error.found() {
        Some('(') => "a bracket group must follow a module name".to_string(),
        Some(c) => format!("'{}' cannot start a module name", c),
        None => "unexpected end of text".to_string(),
    }
}

/// chumsky reports spans in characters
fn char_to_byte(text: &str, span: Range<usize>) -> usize {
    text.char_indices()
        .nth(span.start)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn check_brackets(text: &str) -> Result<(), GrammarError> {
    let mut open = Vec::new();
    for (i, c) in text.char_indices() {
        match c {
            '(' => open.push(i),
            ')' => {
                if open.pop().is_none() {
                    return Err(GrammarError::UnterminatedBracket {
                        text: text.to_string(),
                        position: i,
                    });
                }
            }
            _ => {}
        }
    }
    match open.first() {
        Some(&position) => Err(GrammarError::UnterminatedBracket {
            text: text.to_string(),
            position,
        }),
        None => Ok(()),
    }
}

/// Byte offsets of every occurrence of `pattern` outside brackets
pub fn find_top_level(text: &str, pattern: &str) -> Vec<usize> {
    let mut depth = 0i32;
    let mut found = Vec::new();
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            _ if depth == 0 && text[i..].starts_with(pattern) => found.push(i),
            _ => {}
        }
    }
    found
}

/// Split on `separator` outside brackets
pub fn split_top_level(text: &str, separator: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for i in find_top_level(text, separator.encode_utf8(&mut [0; 4])) {
        pieces.push(&text[start..i]);
        start = i + separator.len_utf8();
    }
    pieces.push(&text[start..]);
    pieces
}

/// Remove whitespace from rule or module text
///
/// Inside brackets and in guards (after a top-level `:`) whitespace still separates
/// expression tokens: a run between two word characters or two symbol characters becomes
/// one space, so `x - -1` reads as `x- -1` and not as `x--1`.
pub fn strip_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0i32;
    let mut guard = false;
    let mut pending = false;
    for c in text.chars() {
        if c.is_whitespace() {
            pending = true;
            continue;
        }
        if pending && (depth > 0 || guard) {
            if let Some(previous) = out.chars().next_back() {
                if joins(previous, c) {
                    out.push(' ');
                }
            }
        }
        pending = false;
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            ':' if depth == 0 => guard = true,
            '>' if depth == 0 && out.ends_with('-') => guard = false,
            _ => {}
        }
        out.push(c);
    }
    out
}

fn is_word_char(c: char) -> bool {
    c.is_alphabetic() || c.is_numeric() || c == '_' || c == '.'
}

fn is_symbol_char(c: char) -> bool {
    !c.is_whitespace() && !is_word_char(c) && !matches!(c, '(' | ')' | ',' | ':')
}

/// Check if `left` and `right` would scan as one token when written together
fn joins(left: char, right: char) -> bool {
    (is_word_char(left) && is_word_char(right)) || (is_symbol_char(left) && is_symbol_char(right))
}
