//! Nested transactions over the store.
//!
//! A [`TransactionManager`] keeps a stack of open [`Transaction`]s. Each is a
//! log of [`UndoOp`]s built from the mutations the store announces while that
//! transaction is innermost. `commit` discards the innermost log; `rollback`
//! replays it newest first and then discards it.

mod manager;
mod types;

pub use manager::TransactionManager;
pub use types::{Transaction, UndoOp};
