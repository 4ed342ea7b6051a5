//! Compiled rules
//!
//! A rule matches a position when the module there has the source id, its neighbours
//! satisfy every context condition and its parameters satisfy every guard. Checks run
//! in that order and stop at the first failure.

use super::generation::GenerationIndex;
use super::module::{Module, ModuleFactory, ModuleId};
use crate::expression::{Comparator, EvalError, Expression, Scalar};

/// Required left and right neighbours of the source module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextCondition {
    source_id: ModuleId,
    left: Vec<ModuleId>,
    right: Vec<ModuleId>,
}

impl ContextCondition {
    /// `left` is written in text order, so its last id is the immediate left neighbour
    pub fn new(source_id: ModuleId, left: Vec<ModuleId>, right: Vec<ModuleId>) -> Self {
        Self {
            source_id,
            left,
            right,
        }
    }

    pub fn left(&self) -> &[ModuleId] {
        &self.left
    }

    pub fn right(&self) -> &[ModuleId] {
        &self.right
    }

    pub fn holds<T>(&self, index: &GenerationIndex<'_, T>) -> bool {
        if index.module().id != self.source_id {
            return false;
        }

        let preceding = index.preceding();
        let following = index.following();
        if preceding.len() < self.left.len() || following.len() < self.right.len() {
            return false;
        }

        let left_start = preceding.len() - self.left.len();
        let left_matches = preceding[left_start..]
            .iter()
            .zip(&self.left)
            .all(|(module, id)| module.id == *id);

        left_matches
            && following
                .iter()
                .zip(&self.right)
                .all(|(module, id)| module.id == *id)
    }
}

/// Guard comparing two expressions over the source module's parameters
#[derive(Debug, Clone)]
pub struct ParamCondition<T> {
    left: Expression<T>,
    comparator: Comparator,
    right: Expression<T>,
}

impl<T: Scalar> ParamCondition<T> {
    pub fn new(left: Expression<T>, comparator: Comparator, right: Expression<T>) -> Self {
        Self {
            left,
            comparator,
            right,
        }
    }

    pub fn comparator(&self) -> Comparator {
        self.comparator
    }

    pub fn holds(&self, parameters: &[T]) -> Result<bool, EvalError> {
        let left = self.left.evaluate(parameters)?;
        let right = self.right.evaluate(parameters)?;
        Ok(self.comparator.holds(&left, &right))
    }
}

#[derive(Debug, Clone)]
pub struct Rule<T> {
    source_id: ModuleId,
    context: Vec<ContextCondition>,
    conditions: Vec<ParamCondition<T>>,
    productions: Vec<ModuleFactory<T>>,
}

impl<T: Scalar> Rule<T> {
    pub fn new(
        source_id: ModuleId,
        context: Vec<ContextCondition>,
        conditions: Vec<ParamCondition<T>>,
        productions: Vec<ModuleFactory<T>>,
    ) -> Self {
        Self {
            source_id,
            context,
            conditions,
            productions,
        }
    }

    pub fn source_id(&self) -> ModuleId {
        self.source_id
    }

    pub fn context(&self) -> &[ContextCondition] {
        &self.context
    }

    pub fn conditions(&self) -> &[ParamCondition<T>] {
        &self.conditions
    }

    pub fn productions(&self) -> &[ModuleFactory<T>] {
        &self.productions
    }

    /// Check if this rule rewrites the module at `index`
    ///
    /// Only guard evaluation can fail.
    pub fn can_apply(&self, index: &GenerationIndex<'_, T>) -> Result<bool, EvalError> {
        let module = index.module();
        if module.id != self.source_id {
            return Ok(false);
        }
        if !self.context.iter().all(|condition| condition.holds(index)) {
            return Ok(false);
        }
        for condition in &self.conditions {
            if !condition.holds(&module.parameters)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Produce the replacement of `module`; assumes [`Rule::can_apply`] held for it
    pub fn apply(&self, module: &Module<T>) -> Result<Vec<Module<T>>, EvalError> {
        let mut produced = Vec::with_capacity(self.productions.len());
        self.apply_into(module, &mut produced)?;
        Ok(produced)
    }

    /// Like [`Rule::apply`], appending to `out`
    pub fn apply_into(&self, module: &Module<T>, out: &mut Vec<Module<T>>) -> Result<(), EvalError> {
        for factory in &self.productions {
            out.push(factory.create(&module.parameters)?);
        }
        Ok(())
    }
}
