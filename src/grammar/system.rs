//! Whole system descriptions
//!
//! The first line is the axiom, the remaining non-blank lines are rules. All of them share
//! one [`ModuleNames`] registry, which ends up owned by the produced [`Generator`].

use tracing::{debug, trace};

use super::modules::ModuleParser;
use super::names::ModuleNames;
use super::rules::RuleParser;
use crate::engine::{AdvanceConfig, Generation, Generator};
use crate::error::LsysError;
use crate::expression::{Operators, Scalar};

pub struct SystemParser<T> {
    operators: Operators<T>,
    names: ModuleNames,
    config: AdvanceConfig,
}

impl<T: Scalar> SystemParser<T> {
    pub fn new(operators: Operators<T>) -> Self {
        Self {
            operators,
            names: ModuleNames::new(),
            config: AdvanceConfig::default(),
        }
    }

    /// Start from a seeded registry so known names keep their ids
    pub fn with_names(mut self, names: ModuleNames) -> Self {
        self.names = names;
        self
    }

    /// Advance strategy handed to the produced generator
    pub fn with_config(mut self, config: AdvanceConfig) -> Self {
        self.config = config;
        self
    }

    /// Compile `text` into a generator positioned at the axiom
    ///
    /// Any failing line fails the whole system; the error carries its 1-based line number.
    pub fn parse(mut self, text: &str) -> Result<Generator<T>, LsysError> {
        let mut lines = text.lines().enumerate();

        let axiom = match lines.next() {
            Some((_, line)) => ModuleParser::new(&mut self.names)
                .parse_literal_modules(line)
                .map_err(|err| err.at_line(1))?,
            None => Vec::new(),
        };

        let mut rules = Vec::new();
        let mut parser = RuleParser::new(&self.operators, &mut self.names);
        for (index, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let rule = parser.parse(line).map_err(|err| err.at_line(index + 1))?;
            trace!(line = index + 1, source_id = rule.source_id(), "compiled rule");
            rules.push(rule);
        }

        debug!(
            rules = rules.len(),
            names = self.names.len(),
            axiom_modules = axiom.len(),
            "compiled system"
        );

        Ok(Generator::new(Generation::axiom(axiom), rules)
            .with_names(self.names)
            .with_config(self.config))
    }
}
