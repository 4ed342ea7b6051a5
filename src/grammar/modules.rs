//! Module sequences
//!
//! Two readings of the same occurrence syntax: axioms carry literal parameters and become
//! [`Module`]s directly, productions carry expressions and become [`ModuleFactory`]s.

use super::names::ModuleNames;
use super::occurrences::{self, Occurrence};
use super::GrammarError;
use crate::engine::{Module, ModuleFactory};
use crate::error::LsysError;
use crate::expression::{ExpressionCompiler, Scalar};

/// Parses module sequences, resolving names through a shared registry
pub struct ModuleParser<'a> {
    names: &'a mut ModuleNames,
}

impl<'a> ModuleParser<'a> {
    pub fn new(names: &'a mut ModuleNames) -> Self {
        Self { names }
    }

    /// Split `text` into `(name, bracket content)` occurrences
    pub fn separate(text: &str) -> Result<Vec<Occurrence>, GrammarError> {
        occurrences::separate(&occurrences::strip_whitespace(text))
    }

    /// Factories whose parameters are expressions compiled by `compiler`
    pub fn parse_module_factories<T: Scalar>(
        &mut self,
        text: &str,
        compiler: &ExpressionCompiler<T>,
    ) -> Result<Vec<ModuleFactory<T>>, LsysError> {
        Self::separate(text)?
            .iter()
            .map(|occurrence| -> Result<ModuleFactory<T>, LsysError> {
                let id = self.names.resolve(&occurrence.name)?;
                let expressions = occurrence
                    .parameter_pieces()
                    .into_iter()
                    .map(|piece| compiler.parse(piece))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ModuleFactory::new(id, expressions))
            })
            .collect()
    }

    /// Modules whose parameters are literals of `T`
    pub fn parse_literal_modules<T: Scalar>(
        &mut self,
        text: &str,
    ) -> Result<Vec<Module<T>>, LsysError> {
        Self::separate(text)?
            .iter()
            .map(|occurrence| -> Result<Module<T>, LsysError> {
                let id = self.names.resolve(&occurrence.name)?;
                let parameters = occurrence
                    .parameter_pieces()
                    .into_iter()
                    .map(T::parse_literal)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Module::new(id, parameters))
            })
            .collect()
    }
}
