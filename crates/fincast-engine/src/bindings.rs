//! Ordered symbol-to-value bindings.
//!
//! Pretext (values known before evaluation), posttext (overrides supplied at
//! evaluation time), resolved arguments, and plain results are all the same
//! shape: an insertion-ordered mapping of symbol names to numbers. Iteration
//! order is observable (it drives scope construction and merged result
//! order), so the backing store is an [`IndexMap`], never a hash map.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An insertion-ordered mapping of symbol names to numeric values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bindings(IndexMap<String, f64>);

impl Bindings {
    /// Creates an empty set of bindings.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Builds bindings from `(symbol, value)` pairs, in order.
    ///
    /// Later duplicates overwrite earlier values without changing the
    /// symbol's position.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    /// Returns the value bound to `key`, if any.
    pub fn get(&self, key: &str) -> Option<f64> {
        self.0.get(key).copied()
    }

    /// Returns `true` if `key` is bound.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Binds `key` to `value`, returning the previous value if present.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) -> Option<f64> {
        self.0.insert(key.into(), value)
    }

    /// Copies every binding from `other` into `self`, in `other`'s order.
    pub fn extend_from(&mut self, other: &Bindings) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), *value);
        }
    }

    /// Iterates bindings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &f64)> {
        self.0.iter()
    }

    /// Iterates bound symbol names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no symbols are bound.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<IndexMap<String, f64>> for Bindings {
    fn from(map: IndexMap<String, f64>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, f64)> for Bindings {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Bindings {
    type Item = (&'a String, &'a f64);
    type IntoIter = indexmap::map::Iter<'a, String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
