//! Module and rule grammar
//!
//!     A system description is line oriented. The first line is the axiom, every other
//!     non-blank line is one rule:
//!
//!         F(200)
//!         F(l)->F(l*0.5)F(l*0.5)
//!         A<X(y)>B:y<1->C
//!
//!     Parsing happens in layers:
//!         - occurrences: splits `Name(args)Name...` into names and raw bracket text
//!         - names: the registry interning module names into dense integer ids
//!         - modules: turns occurrences into literal modules or module factories
//!         - rules: cuts a rule line into its five sections and compiles a [`Rule`]
//!         - system: reads a whole description into a [`Generator`]
//!
//!     Whitespace carries no meaning anywhere in this grammar and is removed before a line
//!     is parsed.
//!
//! Markers
//!
//!     The structural markers of a rule are `<`, `>`, `:` and `->`. Comparators inside a
//!     guard reuse `<` and `>`, so once `:` has been read only the arrow is structural; the
//!     guard text is then split by the comparator-aware guard parser. Contexts must be bare
//!     module names and can therefore never contain a comparator.
//!
//! [`Rule`]: crate::engine::Rule
//! [`Generator`]: crate::engine::Generator

use std::fmt;

pub mod modules;
pub mod names;
pub mod occurrences;
pub mod rules;
pub mod system;

pub use modules::ModuleParser;
pub use names::ModuleNames;
pub use occurrences::Occurrence;
pub use rules::{RuleParser, RuleSections};
pub use system::SystemParser;

/// Malformed module or rule text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrammarError {
    /// Text that does not split into `Name(args)` occurrences
    InvalidModuleSequence {
        text: String,
        position: usize,
        reason: String,
    },
    /// A `(` without its `)`, or a `)` without its `(`
    UnterminatedBracket { text: String, position: usize },
    InvalidModuleName { name: String },
    MissingArrow { text: String },
    MissingSource { text: String },
    MissingProduction { text: String },
    /// A structural marker repeated or out of place
    UnexpectedMarker {
        text: String,
        marker: char,
        position: usize,
    },
    /// A context module written with a parameter bracket
    ContextParameters { module: String },
    InvalidSource { text: String, reason: &'static str },
    InvalidParameterName { name: String },
    InvalidCondition {
        condition: String,
        reason: &'static str,
    },
}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrammarError::InvalidModuleSequence {
                text,
                position,
                reason,
            } => write!(
                f,
                "Invalid module sequence '{}' at position {}: {}",
                text, position, reason
            ),
            GrammarError::UnterminatedBracket { text, position } => write!(
                f,
                "Unterminated bracket in '{}' at position {}",
                text, position
            ),
            GrammarError::InvalidModuleName { name } => write!(
                f,
                "Invalid module name '{}': names start with an uppercase letter followed by lowercase letters, digits or '_'",
                name
            ),
            GrammarError::MissingArrow { text } => write!(f, "Rule '{}' has no '->'", text),
            GrammarError::MissingSource { text } => {
                write!(f, "Rule '{}' has no source module", text)
            }
            GrammarError::MissingProduction { text } => {
                write!(f, "Rule '{}' has no production", text)
            }
            GrammarError::UnexpectedMarker {
                text,
                marker,
                position,
            } => write!(
                f,
                "Unexpected '{}' in rule '{}' at position {}",
                marker, text, position
            ),
            GrammarError::ContextParameters { module } => write!(
                f,
                "Parameters not allowed in context (module '{}')",
                module
            ),
            GrammarError::InvalidSource { text, reason } => {
                write!(f, "Invalid rule source '{}': {}", text, reason)
            }
            GrammarError::InvalidParameterName { name } => {
                write!(f, "Invalid parameter name '{}'", name)
            }
            GrammarError::InvalidCondition { condition, reason } => {
                write!(f, "Invalid condition '{}': {}", condition, reason)
            }
        }
    }
}

impl std::error::Error for GrammarError {}
