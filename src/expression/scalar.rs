//! Scalar value types
//!
//! A [`Scalar`] is the value type an expression evaluates to and the element type of a
//! module's parameter vector. It knows how to read its own literals and how to order two
//! values, which is all that guards need.

use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// Failure to read a literal as a scalar value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiteralError {
    pub literal: String,
    pub expected: &'static str,
}

impl LiteralError {
    pub fn new(literal: impl Into<String>, expected: &'static str) -> Self {
        Self {
            literal: literal.into(),
            expected,
        }
    }
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' is not {}", self.literal, self.expected)
    }
}

impl std::error::Error for LiteralError {}

/// Value type of expressions and module parameters
pub trait Scalar:
    Copy + PartialEq + fmt::Debug + fmt::Display + Serialize + Send + Sync + 'static
{
    /// Read a literal token
    fn parse_literal(text: &str) -> Result<Self, LiteralError>;

    /// Total order used by guard comparisons
    fn compare(&self, other: &Self) -> Ordering;
}

impl Scalar for i64 {
    fn parse_literal(text: &str) -> Result<Self, LiteralError> {
        text.parse::<i64>()
            .map_err(|_| LiteralError::new(text, "an integer"))
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl Scalar for f64 {
    fn parse_literal(text: &str) -> Result<Self, LiteralError> {
        // Finite values only; `inf` and `nan` spellings read as names
        text.parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| LiteralError::new(text, "a finite number"))
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl Scalar for bool {
    fn parse_literal(text: &str) -> Result<Self, LiteralError> {
        if text.eq_ignore_ascii_case("true") {
            Ok(true)
        } else if text.eq_ignore_ascii_case("false") {
            Ok(false)
        } else {
            Err(LiteralError::new(text, "a boolean value"))
        }
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

/// Comparison operators accepted in rule guards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    LessOrEqual,
    GreaterOrEqual,
    NotEqual,
    Less,
    Greater,
    Equal,
}

impl Comparator {
    /// All comparators, longest representations first so that `<=` is never read as `<`
    pub const PRECEDENCE: [Comparator; 6] = [
        Comparator::LessOrEqual,
        Comparator::GreaterOrEqual,
        Comparator::NotEqual,
        Comparator::Less,
        Comparator::Greater,
        Comparator::Equal,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            Comparator::LessOrEqual => "<=",
            Comparator::GreaterOrEqual => ">=",
            Comparator::NotEqual => "!=",
            Comparator::Less => "<",
            Comparator::Greater => ">",
            Comparator::Equal => "=",
        }
    }

    /// Compare two values with `T`'s total order
    pub fn holds<T: Scalar>(&self, left: &T, right: &T) -> bool {
        let ordering = left.compare(right);
        match self {
            Comparator::LessOrEqual => ordering != Ordering::Greater,
            Comparator::GreaterOrEqual => ordering != Ordering::Less,
            Comparator::NotEqual => ordering != Ordering::Equal,
            Comparator::Less => ordering == Ordering::Less,
            Comparator::Greater => ordering == Ordering::Greater,
            Comparator::Equal => ordering == Ordering::Equal,
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}
