//! Identifiers recognized by the expression parser
//!
//! Unary operators, binary operators, functions and variables are all identified by a
//! representation string. Operators and functions carry a value-level handler; variables
//! carry the index of the parameter they read.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use super::tree::EvalError;
use crate::lexing::tokenize;

/// Handler of a unary operator
pub type UnaryHandler<T> = Arc<dyn Fn(T) -> Result<T, EvalError> + Send + Sync>;
/// Handler of a binary operator, called with the left and right operand
pub type BinaryHandler<T> = Arc<dyn Fn(T, T) -> Result<T, EvalError> + Send + Sync>;
/// Handler of a function, called with its evaluated arguments in order
pub type FunctionHandler<T> = Arc<dyn Fn(&[T]) -> Result<T, EvalError> + Send + Sync>;

/// Identifier construction errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The representation is empty, contains a forbidden character or is not one token
    InvalidRepresentation {
        representation: String,
        reason: &'static str,
    },
    /// Two identifiers registered with one compiler share a representation
    DuplicateIdentifier { representation: String },
}

impl fmt::Display for IdentifierError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierError::InvalidRepresentation {
                representation,
                reason,
            } => write!(f, "Invalid identifier '{}': {}", representation, reason),
            IdentifierError::DuplicateIdentifier { representation } => {
                write!(f, "Duplicate definition of identifier '{}'", representation)
            }
        }
    }
}

impl std::error::Error for IdentifierError {}

/// Check the rules every representation has to follow
pub(crate) fn validate_representation(representation: &str) -> Result<(), IdentifierError> {
    let invalid = |reason| IdentifierError::InvalidRepresentation {
        representation: representation.to_string(),
        reason,
    };

    if representation.is_empty() {
        return Err(invalid("representation cannot be empty"));
    }
    if representation.chars().any(char::is_whitespace) {
        return Err(invalid("representation cannot contain whitespace"));
    }
    if representation
        .chars()
        .any(|c| matches!(c, ',' | '.' | '(' | ')'))
    {
        return Err(invalid("representation cannot contain comma, point or bracket"));
    }

    // An identifier the tokenizer would split can never be recognized
    let known: HashSet<String> = HashSet::from([representation.to_string()]);
    match tokenize(representation, &known) {
        Ok(tokens) if tokens.len() == 1 => Ok(()),
        _ => Err(invalid("representation must form a single token")),
    }
}

/// Operator written directly in front of its single operand, e.g. `-x`
#[derive(Clone)]
pub struct UnaryOperator<T> {
    representation: String,
    handler: UnaryHandler<T>,
}

impl<T> UnaryOperator<T> {
    pub fn new<F>(representation: impl Into<String>, handler: F) -> Result<Self, IdentifierError>
    where
        F: Fn(T) -> Result<T, EvalError> + Send + Sync + 'static,
    {
        let representation = representation.into();
        validate_representation(&representation)?;
        Ok(Self {
            representation,
            handler: Arc::new(handler),
        })
    }

    /// Constructor for representations known to be valid
    pub(crate) fn builtin<F>(representation: &'static str, handler: F) -> Self
    where
        F: Fn(T) -> Result<T, EvalError> + Send + Sync + 'static,
    {
        Self {
            representation: representation.to_string(),
            handler: Arc::new(handler),
        }
    }

    pub fn representation(&self) -> &str {
        &self.representation
    }

    pub fn apply(&self, operand: T) -> Result<T, EvalError> {
        (self.handler)(operand)
    }
}

impl<T> fmt::Debug for UnaryOperator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UnaryOperator")
            .field(&self.representation)
            .finish()
    }
}

/// Recommended priority of additive operators
pub const PRIORITY_LOW: i32 = 0;
/// Recommended priority of multiplicative operators
pub const PRIORITY_HIGH: i32 = 1;

/// Operator written between its two operands, e.g. `x+y`
///
/// Operators with a lower priority bind looser and are therefore evaluated last.
#[derive(Clone)]
pub struct BinaryOperator<T> {
    representation: String,
    priority: i32,
    handler: BinaryHandler<T>,
}

impl<T> BinaryOperator<T> {
    pub fn new<F>(
        representation: impl Into<String>,
        priority: i32,
        handler: F,
    ) -> Result<Self, IdentifierError>
    where
        F: Fn(T, T) -> Result<T, EvalError> + Send + Sync + 'static,
    {
        let representation = representation.into();
        validate_representation(&representation)?;
        Ok(Self {
            representation,
            priority,
            handler: Arc::new(handler),
        })
    }

    pub(crate) fn builtin<F>(representation: &'static str, priority: i32, handler: F) -> Self
    where
        F: Fn(T, T) -> Result<T, EvalError> + Send + Sync + 'static,
    {
        Self {
            representation: representation.to_string(),
            priority,
            handler: Arc::new(handler),
        }
    }

    pub fn representation(&self) -> &str {
        &self.representation
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn apply(&self, left: T, right: T) -> Result<T, EvalError> {
        (self.handler)(left, right)
    }
}

impl<T> fmt::Debug for BinaryOperator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BinaryOperator")
            .field("representation", &self.representation)
            .field("priority", &self.priority)
            .finish()
    }
}

/// Function whose comma separated arguments follow its name in brackets, e.g. `sqrt(x)`
///
/// Functions are variadic unless an arity is declared, in which case calls with a
/// different number of arguments are rejected at parse time.
#[derive(Clone)]
pub struct Function<T> {
    representation: String,
    arity: Option<usize>,
    handler: FunctionHandler<T>,
}

impl<T> Function<T> {
    pub fn new<F>(representation: impl Into<String>, handler: F) -> Result<Self, IdentifierError>
    where
        F: Fn(&[T]) -> Result<T, EvalError> + Send + Sync + 'static,
    {
        let representation = representation.into();
        validate_representation(&representation)?;
        Ok(Self {
            representation,
            arity: None,
            handler: Arc::new(handler),
        })
    }

    pub(crate) fn builtin<F>(representation: &'static str, handler: F) -> Self
    where
        F: Fn(&[T]) -> Result<T, EvalError> + Send + Sync + 'static,
    {
        Self {
            representation: representation.to_string(),
            arity: None,
            handler: Arc::new(handler),
        }
    }

    pub fn with_arity(mut self, arity: usize) -> Self {
        self.arity = Some(arity);
        self
    }

    pub fn representation(&self) -> &str {
        &self.representation
    }

    pub fn arity(&self) -> Option<usize> {
        self.arity
    }

    pub fn apply(&self, arguments: &[T]) -> Result<T, EvalError> {
        (self.handler)(arguments)
    }
}

impl<T> fmt::Debug for Function<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("representation", &self.representation)
            .field("arity", &self.arity)
            .finish()
    }
}

/// Named slot of the parameter vector an expression is evaluated over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    representation: String,
    index: usize,
}

impl Variable {
    pub fn new(representation: impl Into<String>, index: usize) -> Result<Self, IdentifierError> {
        let representation = representation.into();
        validate_representation(&representation)?;
        Ok(Self {
            representation,
            index,
        })
    }

    /// Variables bound to indices `0..names.len()` in order
    pub fn sequence<S: AsRef<str>>(names: &[S]) -> Result<Vec<Variable>, IdentifierError> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| Variable::new(name.as_ref(), index))
            .collect()
    }

    pub fn representation(&self) -> &str {
        &self.representation
    }

    pub fn index(&self) -> usize {
        self.index
    }
}
