//! Symbols that completion never lists.

use std::collections::HashSet;

/// Case-insensitive set of hidden symbol names.
#[derive(Debug, Clone, Default)]
pub struct HiddenSymbols(HashSet<String>);

impl HiddenSymbols {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(names.into_iter().map(|name| name.as_ref().to_lowercase()).collect())
    }

    pub fn insert(&mut self, name: &str) {
        self.0.insert(name.to_lowercase());
    }

    pub fn contains(&self, name: &str) -> bool {
        !self.0.is_empty() && self.0.contains(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
