//! Compiled expressions
//!
//! An [`Expression`] is a small tree evaluated over a parameter vector. Operator and
//! function nodes share their identifier with the compiler that produced them, so cloning
//! an expression is cheap and expressions can be evaluated from any thread.

use std::fmt;
use std::sync::Arc;

use super::identifiers::{BinaryOperator, Function, UnaryOperator};
use super::scalar::Scalar;

/// Runtime failures of expression evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EvalError {
    DivisionByZero,
    Overflow { operation: &'static str },
    /// A variable refers past the end of the parameter vector
    MissingParameter { index: usize, available: usize },
    /// A handler rejected its arguments
    Domain(String),
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalError::DivisionByZero => write!(f, "Division by zero"),
            EvalError::Overflow { operation } => write!(f, "Integer overflow in {}", operation),
            EvalError::MissingParameter { index, available } => write!(
                f,
                "Parameter {} requested but the module has only {}",
                index, available
            ),
            EvalError::Domain(msg) => write!(f, "Evaluation error: {}", msg),
        }
    }
}

impl std::error::Error for EvalError {}

/// Pure function from a parameter vector to a value
#[derive(Clone)]
pub enum Expression<T> {
    Literal(T),
    /// Reads the parameter at this index
    Variable(usize),
    Unary(Arc<UnaryOperator<T>>, Box<Expression<T>>),
    Binary(Arc<BinaryOperator<T>>, Box<Expression<T>>, Box<Expression<T>>),
    Call(Arc<Function<T>>, Vec<Expression<T>>),
}

impl<T: Scalar> Expression<T> {
    pub fn evaluate(&self, parameters: &[T]) -> Result<T, EvalError> {
        match self {
            Expression::Literal(value) => Ok(*value),
            Expression::Variable(index) => {
                parameters
                    .get(*index)
                    .copied()
                    .ok_or(EvalError::MissingParameter {
                        index: *index,
                        available: parameters.len(),
                    })
            }
            Expression::Unary(op, operand) => op.apply(operand.evaluate(parameters)?),
            Expression::Binary(op, left, right) => {
                let left = left.evaluate(parameters)?;
                let right = right.evaluate(parameters)?;
                op.apply(left, right)
            }
            Expression::Call(function, arguments) => {
                let values = arguments
                    .iter()
                    .map(|argument| argument.evaluate(parameters))
                    .collect::<Result<Vec<T>, EvalError>>()?;
                function.apply(&values)
            }
        }
    }

    /// Check if the expression reads no parameters
    pub fn is_constant(&self) -> bool {
        match self {
            Expression::Literal(_) => true,
            Expression::Variable(_) => false,
            Expression::Unary(_, operand) => operand.is_constant(),
            Expression::Binary(_, left, right) => left.is_constant() && right.is_constant(),
            Expression::Call(_, arguments) => arguments.iter().all(Expression::is_constant),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Expression::Variable(index) => f.debug_tuple("Variable").field(index).finish(),
            Expression::Unary(op, operand) => f
                .debug_tuple("Unary")
                .field(&op.representation())
                .field(operand)
                .finish(),
            Expression::Binary(op, left, right) => f
                .debug_tuple("Binary")
                .field(&op.representation())
                .field(left)
                .field(right)
                .finish(),
            Expression::Call(function, arguments) => f
                .debug_tuple("Call")
                .field(&function.representation())
                .field(arguments)
                .finish(),
        }
    }
}
