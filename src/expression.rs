//! Expression sub-language
//!
//!     Module parameters in productions and both sides of every guard comparison are
//!     expressions over the source module's parameter vector: `l*0.5`, `x-1`, `sqrt(x*x+y*y)`.
//!     This module compiles such text into [`Expression`] trees.
//!
//! Identifiers
//!
//!     The language has no built-in operators. Everything beyond literals is an identifier
//!     registered with an [`ExpressionCompiler`]:
//!         - unary operators, written in front of their operand
//!         - binary operators, each with an integer priority (lower binds looser)
//!         - functions, called as `name(arg, ...)`
//!         - variables, each bound to one index of the parameter vector
//!     [`Operators`] bundles the first three for a scalar type and ships presets for
//!     integers, reals and booleans.
//!
//! Evaluation
//!
//!     A compiled expression is a pure function of the parameter vector. Evaluation can only
//!     fail through handlers (integer division by zero, overflow) or by reading a parameter
//!     the module does not have; both surface as [`EvalError`].

pub mod compiler;
pub mod identifiers;
pub mod presets;
pub mod scalar;
pub mod tree;

pub use compiler::{ExpressionCompiler, ParseError};
pub use identifiers::{
    BinaryOperator, Function, IdentifierError, UnaryOperator, Variable, PRIORITY_HIGH,
    PRIORITY_LOW,
};
pub use presets::Operators;
pub use scalar::{Comparator, LiteralError, Scalar};
pub use tree::{EvalError, Expression};
