//! # lsys
//!
//! A parametric, context-sensitive L-system rewriting engine.
//!
//! File Layout
//!
//! The crate follows the path a system description takes from text to generations:
//! src/
//!   ├── lexing       Tokenizer for the expression sub-language
//!   ├── expression   Identifier tables, expression trees and the precedence parser
//!   ├── grammar      Module occurrences, the name registry, rule lines and whole systems
//!   ├── engine       Modules, generations, compiled rules and the generator
//!   └── export       Serializable snapshots handed to renderers
//!
//! A typical session compiles a system and advances it:
//!
//!     let mut generator = SystemParser::new(Operators::real()).parse("F(200)\nF(l)->F(l*0.5)F(l*0.5)")?;
//!     generator.advance_n(3)?;
//!     let snapshot = GenerationSnapshot::capture(generator.current(), generator.names());
//!
//! Every compile-time failure is a [`LsysError`]; once compiled, only expression
//! evaluation can fail, and it fails the whole advance.

pub mod engine;
pub mod error;
pub mod export;
pub mod expression;
pub mod grammar;
pub mod lexing;

pub use crate::engine::{
    AdvanceConfig, AdvanceError, ContextCondition, Generation, GenerationIndex, Generator, Module,
    ModuleFactory, ModuleId, ParamCondition, Rule, DEFAULT_PARALLEL_THRESHOLD,
};
pub use crate::error::LsysError;
pub use crate::export::{ExportError, ExportFormat, GenerationSnapshot, ModuleSnapshot};
pub use crate::expression::{
    BinaryOperator, Comparator, EvalError, Expression, ExpressionCompiler, Function,
    IdentifierError, LiteralError, Operators, ParseError, Scalar, UnaryOperator, Variable,
};
pub use crate::grammar::{GrammarError, ModuleNames, ModuleParser, RuleParser, SystemParser};
pub use crate::lexing::{tokenize, LexError, Token, TokenKind};
