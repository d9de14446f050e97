//! Undo operations and the per-level transaction log.

use crate::store::Store;
use crate::types::Mutation;
use serde::{Deserialize, Serialize};

/// Reverts exactly one prior mutation when applied to the store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum UndoOp {
    /// Put `key` back to `value`.
    Restore { key: String, value: String },
    /// Remove `key`, which did not exist before the mutation.
    Delete { key: String },
}

impl UndoOp {
    /// The operation that reverts `mutation`.
    pub fn for_mutation(mutation: &Mutation) -> Self {
        match mutation {
            Mutation::Set {
                key,
                previous: Some(previous),
                ..
            } => UndoOp::Restore {
                key: key.clone(),
                value: previous.clone(),
            },
            Mutation::Set {
                key,
                previous: None,
                ..
            } => UndoOp::Delete { key: key.clone() },
            Mutation::Unset { key, value } => UndoOp::Restore {
                key: key.clone(),
                value: value.clone(),
            },
        }
    }

    pub fn apply(&self, store: &Store) {
        match self {
            UndoOp::Restore { key, value } => store.set(key, value),
            UndoOp::Delete { key } => store.unset(key),
        }
    }

    pub fn key(&self) -> &str {
        match self {
            UndoOp::Restore { key, .. } | UndoOp::Delete { key } => key,
        }
    }
}

/// An open transaction: the undo log of one nesting level, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    ops: Vec<UndoOp>,
}

impl Transaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, op: UndoOp) {
        self.ops.push(op);
    }

    /// Recorded operations in the order they were captured.
    pub fn ops(&self) -> &[UndoOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}
