//! Generations

use serde::Serialize;
use std::ops::{Index, Range};

use super::module::Module;

/// Ordered, immutable sequence of modules produced by one rewriting step
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Generation<T> {
    age: usize,
    modules: Vec<Module<T>>,
}

impl<T> Generation<T> {
    pub fn new(modules: Vec<Module<T>>, age: usize) -> Self {
        Self { age, modules }
    }

    /// Age 0 generation
    pub fn axiom(modules: Vec<Module<T>>) -> Self {
        Self::new(modules, 0)
    }

    pub fn age(&self) -> usize {
        self.age
    }

    pub fn modules(&self) -> &[Module<T>] {
        &self.modules
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Module<T>> {
        self.modules.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Module<T>> {
        self.modules.iter()
    }

    /// Positions of `range`, in order; the range must lie within the generation
    pub fn positions(&self, range: Range<usize>) -> impl Iterator<Item = GenerationIndex<'_, T>> {
        let start = range.start;
        self.modules[range]
            .iter()
            .enumerate()
            .map(move |(offset, _)| GenerationIndex {
                generation: self,
                index: start + offset,
            })
    }

    pub fn into_modules(self) -> Vec<Module<T>> {
        self.modules
    }
}

impl<T> Index<usize> for Generation<T> {
    type Output = Module<T>;

    fn index(&self, index: usize) -> &Module<T> {
        &self.modules[index]
    }
}

impl<'a, T> IntoIterator for &'a Generation<T> {
    type Item = &'a Module<T>;
    type IntoIter = std::slice::Iter<'a, Module<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.modules.iter()
    }
}

/// A position inside a generation, valid by construction
#[derive(Debug)]
pub struct GenerationIndex<'a, T> {
    generation: &'a Generation<T>,
    index: usize,
}

impl<T> Clone for GenerationIndex<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for GenerationIndex<'_, T> {}

impl<'a, T> GenerationIndex<'a, T> {
    /// Returns `None` when `index` is out of range
    pub fn new(generation: &'a Generation<T>, index: usize) -> Option<Self> {
        (index < generation.len()).then_some(Self { generation, index })
    }

    pub fn generation(&self) -> &'a Generation<T> {
        self.generation
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn module(&self) -> &'a Module<T> {
        &self.generation.modules[self.index]
    }

    /// Modules before this position, closest last
    pub fn preceding(&self) -> &'a [Module<T>] {
        &self.generation.modules[..self.index]
    }

    /// Modules after this position, closest first
    pub fn following(&self) -> &'a [Module<T>] {
        &self.generation.modules[self.index + 1..]
    }
}
