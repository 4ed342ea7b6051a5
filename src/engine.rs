//! Rewriting engine
//!
//!     Compiled systems run here. A [`Generator`] holds the current [`Generation`] and an
//!     ordered list of [`Rule`]s; every advance builds a fresh generation and swaps it in once
//!     it is complete, so a generation is never observed half built.
//!
//!     Rules are tried in declaration order and the first one that applies to a position
//!     rewrites it. Positions no rule applies to are copied unchanged.

pub mod generation;
pub mod generator;
pub mod module;
pub mod rule;

pub use generation::{Generation, GenerationIndex};
pub use generator::{AdvanceConfig, AdvanceError, Generator, DEFAULT_PARALLEL_THRESHOLD};
pub use module::{Module, ModuleFactory, ModuleId};
pub use rule::{ContextCondition, ParamCondition, Rule};
