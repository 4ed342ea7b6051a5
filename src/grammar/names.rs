//! Module name registry
//!
//! Names are interned into dense ids in first-seen order, starting at 0. One registry is
//! shared by every parser of a compilation session so that `F` in the axiom and `F` in a
//! production are the same module.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use super::GrammarError;
use crate::engine::ModuleId;

/// An uppercase letter followed by lowercase letters, digits or underscores
static MODULE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\p{Uppercase}[\p{Lowercase}\p{N}_]*$").unwrap());

/// Check if `name` is a valid module name
pub fn is_module_name(name: &str) -> bool {
    MODULE_NAME.is_match(name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModuleNames {
    names: Vec<String>,
    ids: HashMap<String, ModuleId>,
}

impl ModuleNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry seeded with `names` in order
    pub fn from_names<I, S>(names: I) -> Result<Self, GrammarError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.resolve(name.as_ref())?;
        }
        Ok(registry)
    }

    /// Id of `name`, assigning the next free one if it is new
    pub fn resolve(&mut self, name: &str) -> Result<ModuleId, GrammarError> {
        if let Some(&id) = self.ids.get(name) {
            return Ok(id);
        }
        if !is_module_name(name) {
            return Err(GrammarError::InvalidModuleName {
                name: name.to_string(),
            });
        }

        let id = self.names.len();
        self.names.push(name.to_string());
        self.ids.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn id_of(&self, name: &str) -> Option<ModuleId> {
        self.ids.get(name).copied()
    }

    pub fn name_of(&self, id: ModuleId) -> Option<&str> {
        self.names.get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// `(id, name)` pairs in id order
    pub fn iter(&self) -> impl Iterator<Item = (ModuleId, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(id, name)| (id, name.as_str()))
    }
}

// Serialized as the list of names; a name's position is its id
impl Serialize for ModuleNames {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.names)
    }
}
