//! Transaction stack management.

use crate::error::{Result, StoreError};
use crate::store::{MutationSink, Store};
use crate::types::Mutation;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace, warn};

use super::types::{Transaction, UndoOp};

/// Maintains the stack of open transactions for one store.
///
/// The manager is the store's mutation sink. While at least one transaction
/// is open, every mutation the store announces becomes an [`UndoOp`] in the
/// innermost transaction. Lower levels are never touched until they are
/// on top again.
///
/// Stack changes hold the store's operation lock (taken before the stack
/// lock), so no other thread's mutation can fall between its state change
/// and its capture, or land in a rollback replay.
pub struct TransactionManager {
    store: Arc<Store>,
    /// Open transactions, outermost first.
    stack: Mutex<Vec<Transaction>>,
    /// Set while a rollback replays undo ops through the store. Only the
    /// replaying thread can mutate then, so only its mutations are skipped.
    replaying: AtomicBool,
}

impl TransactionManager {
    /// Create a manager for `store` and install it as the store's sink.
    pub fn attach(store: Arc<Store>) -> Arc<Self> {
        let manager = Arc::new(Self {
            store: Arc::clone(&store),
            stack: Mutex::new(Vec::new()),
            replaying: AtomicBool::new(false),
        });

        let sink: Arc<dyn MutationSink> = manager.clone();
        store.attach_sink(Arc::downgrade(&sink));

        manager
    }

    /// Open a new, innermost transaction.
    pub fn begin(&self) {
        let _op = self.store.exclusive();
        let mut stack = self.stack.lock();
        stack.push(Transaction::new());
        debug!(depth = stack.len(), "begin");
    }

    /// Close the innermost transaction, keeping its changes.
    ///
    /// The changes stay covered by any enclosing transaction, whose own log
    /// is left as it was.
    pub fn commit(&self) -> Result<()> {
        let _op = self.store.exclusive();
        let mut stack = self.stack.lock();
        let Some(transaction) = stack.pop() else {
            warn!("commit with no open transaction");
            return Err(StoreError::NoActiveTransaction);
        };

        debug!(depth = stack.len(), discarded = transaction.len(), "commit");
        Ok(())
    }

    /// Undo every change made in the innermost transaction and close it.
    ///
    /// Undo ops are replayed newest first, so a key written several times
    /// ends up at the value it had before `begin`.
    pub fn rollback(&self) -> Result<()> {
        let _op = self.store.exclusive();
        let mut stack = self.stack.lock();
        let Some(transaction) = stack.last() else {
            warn!("rollback with no open transaction");
            return Err(StoreError::NoActiveTransaction);
        };

        {
            let _replay = ReplayGuard::enter(&self.replaying);
            for op in transaction.ops().iter().rev() {
                op.apply(&self.store);
            }
        }

        let replayed = transaction.len();
        stack.pop();
        debug!(depth = stack.len(), replayed, "rollback");
        Ok(())
    }

    /// Number of open transactions.
    pub fn depth(&self) -> usize {
        self.stack.lock().len()
    }

    pub fn is_active(&self) -> bool {
        !self.stack.lock().is_empty()
    }

    /// The innermost transaction's undo log, oldest first.
    pub fn pending(&self) -> Vec<UndoOp> {
        self.stack
            .lock()
            .last()
            .map(|t| t.ops().to_vec())
            .unwrap_or_default()
    }

    /// Log length of the transaction at `level` (0 = outermost).
    pub fn log_len(&self, level: usize) -> Option<usize> {
        self.stack.lock().get(level).map(Transaction::len)
    }
}

impl MutationSink for TransactionManager {
    fn record(&self, mutation: &Mutation) {
        if self.replaying.load(Ordering::Acquire) {
            return;
        }

        let mut stack = self.stack.lock();
        if let Some(top) = stack.last_mut() {
            let op = UndoOp::for_mutation(mutation);
            trace!(?mutation, ?op, "captured undo op");
            top.push(op);
        }
    }
}

/// Suspends undo capture until dropped.
struct ReplayGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> ReplayGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self { flag }
    }
}

impl Drop for ReplayGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (Arc<Store>, Arc<TransactionManager>) {
        let store = Arc::new(Store::new());
        let manager = TransactionManager::attach(Arc::clone(&store));
        (store, manager)
    }

    #[test]
    fn test_begin_pushes() {
        let (_store, manager) = setup();
        assert_eq!(manager.depth(), 0);
        manager.begin();
        assert_eq!(manager.depth(), 1);
        manager.begin();
        assert_eq!(manager.depth(), 2);
        assert!(manager.is_active());
    }

    #[test]
    fn test_commit_removes_top() {
        let (_store, manager) = setup();
        manager.begin();
        manager.commit().unwrap();
        assert_eq!(manager.depth(), 0);
    }

    #[test]
    fn test_commit_removes_only_top() {
        let (store, manager) = setup();
        manager.begin();
        store.set("x", "10");
        manager.begin();
        assert_eq!(manager.depth(), 2);

        manager.commit().unwrap();
        assert_eq!(manager.depth(), 1);
        assert_eq!(manager.log_len(0), Some(1));
    }

    #[test]
    fn test_commit_and_rollback_without_transaction() {
        let (_store, manager) = setup();
        assert!(matches!(
            manager.commit(),
            Err(StoreError::NoActiveTransaction)
        ));
        assert!(matches!(
            manager.rollback(),
            Err(StoreError::NoActiveTransaction)
        ));
        assert_eq!(manager.depth(), 0);
    }

    #[test]
    fn test_no_capture_outside_transaction() {
        let (store, manager) = setup();
        store.set("x", "1");
        manager.begin();
        assert!(manager.pending().is_empty());
    }

    #[test]
    fn test_rollback_one_set() {
        let (store, manager) = setup();
        store.set("x", "10");
        manager.begin();
        store.set("x", "20");
        assert_eq!(store.get("x"), "20");

        manager.rollback().unwrap();
        assert_eq!(store.get("x"), "10");
    }

    #[test]
    fn test_rollback_new_key_removes_it() {
        let (store, manager) = setup();
        manager.begin();
        store.set("x", "1");
        manager.rollback().unwrap();

        assert_eq!(store.get("x"), "NULL");
        assert_eq!(store.num_equal_to("1"), 0);
    }

    #[test]
    fn test_rollback_unsets() {
        let (store, manager) = setup();
        store.set("x", "10");
        store.set("y", "30");
        manager.begin();
        store.unset("x");
        store.unset("y");
        assert_eq!(store.get("x"), "NULL");

        manager.rollback().unwrap();
        assert_eq!(store.get("x"), "10");
        assert_eq!(store.get("y"), "30");
    }

    #[test]
    fn test_rollback_mixed() {
        let (store, manager) = setup();
        store.set("x", "10");
        store.set("y", "30");
        manager.begin();
        store.unset("x");
        store.set("y", "40");

        manager.rollback().unwrap();
        assert_eq!(store.get("x"), "10");
        assert_eq!(store.get("y"), "30");
    }

    #[test]
    fn test_rollback_is_lifo() {
        let (store, manager) = setup();
        store.set("x", "1");
        manager.begin();
        store.set("x", "2");
        store.set("x", "3");
        store.unset("x");
        store.set("x", "4");

        manager.rollback().unwrap();
        assert_eq!(store.get("x"), "1");
        assert_eq!(store.num_equal_to("1"), 1);
        assert_eq!(store.num_equal_to("2"), 0);
        assert_eq!(store.num_equal_to("3"), 0);
        assert_eq!(store.num_equal_to("4"), 0);
    }

    #[test]
    fn test_replay_is_not_captured() {
        let (store, manager) = setup();
        manager.begin();
        store.set("x", "1");
        manager.begin();
        store.set("x", "2");

        manager.rollback().unwrap();
        assert_eq!(store.get("x"), "1");
        // Only the outer level's original set, nothing from the replay.
        assert_eq!(manager.log_len(0), Some(1));
        assert_eq!(
            manager.pending(),
            vec![UndoOp::Delete {
                key: "x".to_string()
            }]
        );
    }

    #[test]
    fn test_nested_rollback_after_inner_commit() {
        let (store, manager) = setup();
        manager.begin();
        store.set("a", "10");
        manager.begin();
        store.set("a", "20");
        manager.commit().unwrap();
        assert_eq!(store.get("a"), "20");

        // The outer log still leads back to the pre-begin state, which
        // also undoes the committed inner change.
        manager.rollback().unwrap();
        assert_eq!(store.get("a"), "NULL");
    }

    #[test]
    fn test_dropping_manager_stops_capture() {
        let store = Arc::new(Store::new());
        let manager = TransactionManager::attach(Arc::clone(&store));
        manager.begin();
        drop(manager);

        store.set("x", "1");
        assert_eq!(store.get("x"), "1");
    }
}
