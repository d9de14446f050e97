//! Core types for the key-value store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Returned by `GET` for a key that has no value.
pub const NULL: &str = "NULL";

/// A successful change to the store, as announced to its sink and observers.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Mutation {
    /// A key was written. `previous` is `None` when the key was new.
    Set {
        key: String,
        previous: Option<String>,
        value: String,
    },
    /// A key holding `value` was removed.
    Unset { key: String, value: String },
}

impl Mutation {
    /// The key this mutation touched.
    pub fn key(&self) -> &str {
        match self {
            Mutation::Set { key, .. } | Mutation::Unset { key, .. } => key,
        }
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Set {
                key,
                previous: Some(previous),
                value,
            } => write!(f, "Set({key}: {previous} -> {value})"),
            Mutation::Set {
                key,
                previous: None,
                value,
            } => write!(f, "Set({key}: - -> {value})"),
            Mutation::Unset { key, value } => write!(f, "Unset({key}: {value})"),
        }
    }
}

/// Point-in-time copy of the store contents.
///
/// Both maps are ordered, and values with a zero count are never included,
/// so two snapshots compare equal exactly when the stores hold the same data.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub values: BTreeMap<String, String>,
    pub frequency: BTreeMap<String, usize>,
}

/// Store statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    /// Number of keys currently set.
    pub key_count: usize,
    /// Number of distinct values with a non-zero count.
    pub distinct_values: usize,
    /// Total successful `set`/`unset` calls since creation.
    pub mutations: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_key() {
        let set = Mutation::Set {
            key: "a".to_string(),
            previous: None,
            value: "1".to_string(),
        };
        let unset = Mutation::Unset {
            key: "b".to_string(),
            value: "2".to_string(),
        };
        assert_eq!(set.key(), "a");
        assert_eq!(unset.key(), "b");
    }

    #[test]
    fn test_mutation_debug() {
        let set = Mutation::Set {
            key: "x".to_string(),
            previous: Some("10".to_string()),
            value: "20".to_string(),
        };
        assert_eq!(format!("{:?}", set), "Set(x: 10 -> 20)");
    }
}
