//! # nestkv
//!
//! An in-memory key-value store with nested, rollback-capable transactions.
//!
//! ## Core Concepts
//!
//! - **Store**: string keys mapped to string values, plus an index counting
//!   how many keys hold each value
//! - **Mutation sink**: the store announces every successful `set`/`unset`
//!   to one sink, synchronously and after the change is applied
//! - **Transactions**: the [`TransactionManager`] is that sink; each open
//!   transaction is a log of undo ops, replayed newest first on rollback
//! - **REPL**: a line-oriented front end (`GET`, `SET`, `UNSET`,
//!   `NUMEQUALTO`, `BEGIN`, `COMMIT`, `ROLLBACK`, `END`)
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use nestkv::{Store, TransactionManager};
//!
//! let store = Arc::new(Store::new());
//! let transactions = TransactionManager::attach(Arc::clone(&store));
//!
//! store.set("x", "10");
//! transactions.begin();
//! store.set("x", "20");
//! transactions.rollback().unwrap();
//!
//! assert_eq!(store.get("x"), "10");
//! assert_eq!(store.num_equal_to("10"), 1);
//! ```

pub mod error;
pub mod repl;
pub mod store;
pub mod subscriptions;
pub mod transactions;
pub mod types;

// Re-exports
pub use error::{Result, StoreError};
pub use repl::{Command, Outcome, Repl, ReplConfig, Session, SessionConfig};
pub use store::{MutationSink, Store, StoreConfig};
pub use subscriptions::{
    DropReason, StoreEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId, SubscriptionManager,
};
pub use transactions::{Transaction, TransactionManager, UndoOp};
pub use types::*;
