//! Generation advancing
//!
//! Each position of the current generation is rewritten by the first rule that applies to
//! it, or copied unchanged when none does. Positions are independent of each other's
//! output, so large generations are cut into contiguous slices rewritten in parallel:
//!
//! ```text
//! positions  [0 1 2 3 | 4 5 6 7 | 8 9 10]
//!             slice 0   slice 1   slice 2
//!                ↓         ↓         ↓
//!             rayon     rayon     rayon
//!                └─────────┼─────────┘
//!                          ↓
//!              concatenated in slice order
//! ```
//!
//! The parallel path always produces the same sequence as the sequential one.

use rayon::prelude::*;
use std::fmt;
use std::ops::Range;
use tracing::{debug, warn};

use super::generation::{Generation, GenerationIndex};
use super::module::Module;
use super::rule::Rule;
use crate::expression::{EvalError, Scalar};
use crate::grammar::ModuleNames;

/// Generations with at least this many modules advance in parallel by default
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 10_000;

/// Strategy knobs for [`Generator::advance`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceConfig {
    pub parallel_threshold: usize,
    /// Number of slices for the parallel path, 0 picks one from the available parallelism
    pub workers: usize,
}

impl Default for AdvanceConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            workers: 0,
        }
    }
}

impl AdvanceConfig {
    /// Always take the sequential path
    pub fn sequential() -> Self {
        Self {
            parallel_threshold: usize::MAX,
            workers: 1,
        }
    }

    pub fn worker_count(&self) -> usize {
        if self.workers > 0 {
            return self.workers;
        }
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
            .saturating_sub(1)
            .max(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdvanceError {
    Evaluation(EvalError),
    /// A produced generation outgrew the limit and was discarded
    LimitExceeded {
        age: usize,
        modules: usize,
        limit: usize,
    },
}

impl fmt::Display for AdvanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AdvanceError::Evaluation(err) => write!(f, "{}", err),
            AdvanceError::LimitExceeded {
                age,
                modules,
                limit,
            } => write!(
                f,
                "Generation {} has {} modules, more than the limit of {}",
                age, modules, limit
            ),
        }
    }
}

impl std::error::Error for AdvanceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AdvanceError::Evaluation(err) => Some(err),
            AdvanceError::LimitExceeded { .. } => None,
        }
    }
}

impl From<EvalError> for AdvanceError {
    fn from(err: EvalError) -> Self {
        AdvanceError::Evaluation(err)
    }
}

/// Owns the current generation and the rules that rewrite it
#[derive(Debug, Clone)]
pub struct Generator<T> {
    current: Generation<T>,
    rules: Vec<Rule<T>>,
    names: ModuleNames,
    config: AdvanceConfig,
}

impl<T: Scalar> Generator<T> {
    pub fn new(axiom: Generation<T>, rules: Vec<Rule<T>>) -> Self {
        Self {
            current: axiom,
            rules,
            names: ModuleNames::new(),
            config: AdvanceConfig::default(),
        }
    }

    pub fn with_names(mut self, names: ModuleNames) -> Self {
        self.names = names;
        self
    }

    pub fn with_config(mut self, config: AdvanceConfig) -> Self {
        self.config = config;
        self
    }

    pub fn current(&self) -> &Generation<T> {
        &self.current
    }

    pub fn rules(&self) -> &[Rule<T>] {
        &self.rules
    }

    pub fn names(&self) -> &ModuleNames {
        &self.names
    }

    pub fn config(&self) -> &AdvanceConfig {
        &self.config
    }

    pub fn age(&self) -> usize {
        self.current.age()
    }

    /// Replace the current generation with the next one
    ///
    /// On error the current generation is left as it was.
    pub fn advance(&mut self) -> Result<&Generation<T>, EvalError> {
        self.current = self.next_generation()?;
        Ok(&self.current)
    }

    /// Advance `n` times; `n == 0` leaves the generation unchanged
    pub fn advance_n(&mut self, n: usize) -> Result<&Generation<T>, EvalError> {
        for _ in 0..n {
            self.current = self.next_generation()?;
        }
        Ok(&self.current)
    }

    /// Advance up to `n` times, stopping when a generation exceeds `max_modules`
    ///
    /// The oversize generation is discarded; the last one within the limit stays current.
    pub fn advance_bounded(
        &mut self,
        n: usize,
        max_modules: usize,
    ) -> Result<&Generation<T>, AdvanceError> {
        for _ in 0..n {
            let next = self.next_generation()?;
            if next.len() > max_modules {
                warn!(
                    age = next.age(),
                    modules = next.len(),
                    limit = max_modules,
                    "generation exceeds module limit"
                );
                return Err(AdvanceError::LimitExceeded {
                    age: next.age(),
                    modules: next.len(),
                    limit: max_modules,
                });
            }
            self.current = next;
        }
        Ok(&self.current)
    }

    /// Compute the generation following the current one without replacing it
    pub fn next_generation(&self) -> Result<Generation<T>, EvalError> {
        let generation = &self.current;
        let len = generation.len();

        let (modules, strategy, workers) = if len < self.config.parallel_threshold {
            (self.rewrite(generation, 0..len)?, "sequential", 1)
        } else {
            let workers = self.config.worker_count();
            let parts = partition(len, workers)
                .into_par_iter()
                .map(|range| self.rewrite(generation, range))
                .collect::<Result<Vec<_>, _>>()?;
            (parts.concat(), "parallel", workers)
        };

        debug!(
            age = generation.age() + 1,
            modules_in = len,
            modules_out = modules.len(),
            strategy,
            workers,
            "advanced generation"
        );

        Ok(Generation::new(modules, generation.age() + 1))
    }

    fn rewrite(
        &self,
        generation: &Generation<T>,
        range: Range<usize>,
    ) -> Result<Vec<Module<T>>, EvalError> {
        let mut out = Vec::with_capacity(range.len());
        for index in generation.positions(range) {
            match self.first_match(&index)? {
                Some(rule) => rule.apply_into(index.module(), &mut out)?,
                None => out.push(index.module().clone()),
            }
        }
        Ok(out)
    }

    fn first_match(&self, index: &GenerationIndex<'_, T>) -> Result<Option<&Rule<T>>, EvalError> {
        for rule in &self.rules {
            if rule.can_apply(index)? {
                return Ok(Some(rule));
            }
        }
        Ok(None)
    }
}

/// Cut `0..len` into `parts` contiguous slices whose sizes differ by at most one
fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    let parts = parts.clamp(1, len.max(1));
    let base = len / parts;
    let extra = len % parts;

    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let size = base + usize::from(i < extra);
        ranges.push(start..start + size);
        start += size;
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{ContextCondition, ModuleFactory, ModuleId};
    use crate::expression::Operators;

    const A: ModuleId = 0;
    const B: ModuleId = 1;

    fn bare(ids: &[ModuleId]) -> Vec<Module<i64>> {
        ids.iter().map(|&id| Module::bare(id)).collect()
    }

    /// `B -> B B`
    fn doubling() -> Rule<i64> {
        Rule::new(
            B,
            vec![],
            vec![],
            vec![ModuleFactory::new(B, vec![]), ModuleFactory::new(B, vec![])],
        )
    }

    #[test]
    fn test_partition_is_balanced_and_contiguous() {
        assert_eq!(partition(10, 3), vec![0..4, 4..7, 7..10]);
        assert_eq!(partition(2, 4), vec![0..1, 1..2]);
        assert_eq!(partition(0, 4), vec![0..0]);
        assert_eq!(partition(5, 0), vec![0..5]);
    }

    #[test]
    fn test_unmatched_modules_are_copied() {
        let mut generator = Generator::new(Generation::axiom(bare(&[A, B])), vec![doubling()]);
        let next = generator.advance().unwrap();
        assert_eq!(next.modules(), bare(&[A, B, B]).as_slice());
        assert_eq!(next.age(), 1);
    }

    #[test]
    fn test_first_matching_rule_wins() {
        let to_a = Rule::new(B, vec![], vec![], vec![ModuleFactory::new(A, vec![])]);
        let mut generator =
            Generator::new(Generation::axiom(bare(&[B])), vec![to_a, doubling()]);
        assert_eq!(generator.advance().unwrap().modules(), bare(&[A]).as_slice());
    }

    #[test]
    fn test_empty_production_removes_module() {
        let erase = Rule::new(A, vec![], vec![], vec![]);
        let mut generator = Generator::new(Generation::axiom(bare(&[A, B, A])), vec![erase]);
        assert_eq!(generator.advance().unwrap().modules(), bare(&[B]).as_slice());
    }

    #[test]
    fn test_advance_n_zero_is_noop() {
        let mut generator = Generator::new(Generation::axiom(bare(&[B])), vec![doubling()]);
        assert_eq!(generator.advance_n(0).unwrap().age(), 0);
        assert_eq!(generator.advance_n(3).unwrap().len(), 8);
        assert_eq!(generator.age(), 3);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let context = Rule::new(
            A,
            vec![ContextCondition::new(A, vec![B], vec![])],
            vec![],
            vec![ModuleFactory::new(B, vec![])],
        );
        let axiom = Generation::axiom(bare(&[A, B, A, A, B, B, A, B, A, A, A, B]));
        let rules = vec![context, doubling()];

        let mut sequential =
            Generator::new(axiom.clone(), rules.clone()).with_config(AdvanceConfig::sequential());
        let mut parallel = Generator::new(axiom, rules).with_config(AdvanceConfig {
            parallel_threshold: 0,
            workers: 5,
        });

        for _ in 0..4 {
            assert_eq!(sequential.advance().unwrap(), parallel.advance().unwrap());
        }
    }

    #[test]
    fn test_failed_advance_keeps_generation() {
        let compiler = Operators::integer().compiler(&["x"]).unwrap();
        let divide = Rule::new(
            A,
            vec![],
            vec![],
            vec![ModuleFactory::new(A, vec![compiler.parse("1/x").unwrap()])],
        );
        let axiom = Generation::axiom(vec![Module::new(A, vec![0])]);
        let mut generator = Generator::new(axiom.clone(), vec![divide]);

        assert_eq!(generator.advance(), Err(EvalError::DivisionByZero));
        assert_eq!(generator.current(), &axiom);
    }

    #[test]
    fn test_advance_bounded_discards_oversize_generation() {
        let mut generator = Generator::new(Generation::axiom(bare(&[B])), vec![doubling()]);
        let err = generator.advance_bounded(10, 5).unwrap_err();
        assert_eq!(
            err,
            AdvanceError::LimitExceeded {
                age: 3,
                modules: 8,
                limit: 5
            }
        );
        assert_eq!(generator.age(), 2);
        assert_eq!(generator.current().len(), 4);
    }

    #[test]
    fn test_worker_count() {
        assert_eq!(
            AdvanceConfig {
                parallel_threshold: 0,
                workers: 3
            }
            .worker_count(),
            3
        );
        assert!(AdvanceConfig::default().worker_count() >= 1);
    }
}
