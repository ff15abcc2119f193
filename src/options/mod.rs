//! Named option-set registry.
//!
//! Selection fields may reference a shared list (`globalOptionSet: countries`)
//! instead of declaring their own options. The registry is a read-only
//! service handed to the engine at construction; its lifetime is owned by
//! the caller.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::FieldOption;

pub mod builtin;

/// Read-only lookup of named option lists
pub trait OptionSetProvider: Send + Sync {
    /// Options registered under `key`, or `None` when the key is unknown
    fn resolve(&self, key: &str) -> Option<Vec<FieldOption>>;

    /// Names of every registered set
    fn names(&self) -> Vec<String>;
}

/// A named option list as stored in option-set files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSetConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub options: Vec<FieldOption>,
}

/// Option sets held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryOptionSets {
    sets: HashMap<String, Vec<FieldOption>>,
}

impl InMemoryOptionSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the built-in sets
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        for set in builtin::builtin_option_sets() {
            registry.insert(set);
        }
        registry
    }

    /// Register a set, replacing any set with the same name
    pub fn insert(&mut self, set: OptionSetConfig) {
        if self.sets.insert(set.name.clone(), set.options).is_some() {
            tracing::debug!("Option set '{}' replaced", set.name);
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl OptionSetProvider for InMemoryOptionSets {
    fn resolve(&self, key: &str) -> Option<Vec<FieldOption>> {
        self.sets.get(key).cloned()
    }

    fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sets.keys().cloned().collect();
        names.sort();
        names
    }
}
