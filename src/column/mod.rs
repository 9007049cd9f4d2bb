//! Index columns
//!
//! An index row is a sorted map of column names to optional values. The
//! column name is the index entry: a reference to a row key in the main data
//! row, possibly composed with sorting information. Set algebra only ever
//! looks at names.

use serde::{Deserialize, Serialize};

/// An index entry: opaque, totally ordered, immutable once created.
///
/// Two entries are equal iff their ordered keys are equal.
pub trait IndexEntry: Ord + Clone {}

impl<T: Ord + Clone> IndexEntry for T {}

/// A materialized index column: an entry name plus optional denormalized data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Column<K, V = ()> {
    name: K,
    value: Option<V>,
}

impl<K, V> Column<K, V> {
    /// Creates a column carrying a value
    pub fn new(name: K, value: Option<V>) -> Self {
        Self { name, value }
    }

    /// Creates a column with no value
    pub fn name_only(name: K) -> Self {
        Self { name, value: None }
    }

    /// Returns the column name
    pub fn name(&self) -> &K {
        &self.name
    }

    /// Returns the denormalized value, if any
    pub fn value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    /// Consumes the column returning its name
    pub fn into_name(self) -> K {
        self.name
    }

    /// Consumes the column returning name and value
    pub fn into_parts(self) -> (K, Option<V>) {
        (self.name, self.value)
    }
}
