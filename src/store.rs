//! The value store and its value-frequency index.

use crate::subscriptions::{
    SubscriptionConfig, SubscriptionHandle, SubscriptionId, SubscriptionManager,
};
use crate::types::{Mutation, StoreSnapshot, StoreStats, NULL};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::collections::HashMap;
use std::sync::Weak;
use tracing::trace;

/// Receives every successful store mutation, synchronously and in order.
///
/// The store holds at most one sink. The transaction manager is the sink
/// in a normal session; it turns each mutation into an undo operation.
pub trait MutationSink: Send + Sync {
    fn record(&self, mutation: &Mutation);
}

/// Store configuration.
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Number of keys to preallocate room for.
    pub initial_capacity: usize,

    /// Remove a value from the frequency index once its count reaches zero.
    pub prune_zero_counts: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            prune_zero_counts: true,
        }
    }
}

/// Mutable contents, kept under one lock so `values` and `frequency`
/// are never observed out of step.
struct StoreState {
    values: HashMap<String, String>,
    frequency: HashMap<String, usize>,
    mutations: u64,
}

impl StoreState {
    fn increment(&mut self, value: &str) {
        match self.frequency.get_mut(value) {
            Some(count) => *count += 1,
            None => {
                self.frequency.insert(value.to_string(), 1);
            }
        }
    }

    fn decrement(&mut self, value: &str, prune: bool) {
        if let Some(count) = self.frequency.get_mut(value) {
            *count = count.saturating_sub(1);
            if *count == 0 && prune {
                self.frequency.remove(value);
            }
        }
    }
}

/// Held by [`Store::exclusive`] for a sequence of mutations.
pub type MutationGuard<'a> = ReentrantMutexGuard<'a, ()>;

/// In-memory key-value store.
///
/// All operations take `&self`; the store can be shared behind an `Arc`
/// between the caller and the transaction manager. Each mutation holds the
/// operation lock from the state change through its announcement, so the
/// sink sees mutations in the order they were applied.
pub struct Store {
    config: StoreConfig,
    /// Reentrant so a sink holding it can replay mutations on this thread.
    op_lock: ReentrantMutex<()>,
    state: RwLock<StoreState>,
    sink: RwLock<Option<Weak<dyn MutationSink>>>,
    subscriptions: SubscriptionManager,
}

impl Store {
    /// Create an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(config: StoreConfig) -> Self {
        let state = StoreState {
            values: HashMap::with_capacity(config.initial_capacity),
            frequency: HashMap::with_capacity(config.initial_capacity),
            mutations: 0,
        };

        Self {
            config,
            op_lock: ReentrantMutex::new(()),
            state: RwLock::new(state),
            sink: RwLock::new(None),
            subscriptions: SubscriptionManager::new(),
        }
    }

    // --- Reads ---

    /// Get the value for `key`, or `"NULL"` if it is unset.
    pub fn get(&self, key: &str) -> String {
        self.lookup(key).unwrap_or_else(|| NULL.to_string())
    }

    /// Get the value for `key`, if set.
    pub fn lookup(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        self.state.read().values.get(key).cloned()
    }

    /// Number of keys currently holding `value`.
    pub fn num_equal_to(&self, value: &str) -> usize {
        self.state.read().frequency.get(value).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.state.read().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().values.is_empty()
    }

    /// Copy the current contents out of the store.
    pub fn snapshot(&self) -> StoreSnapshot {
        let state = self.state.read();
        StoreSnapshot {
            values: state
                .values
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            frequency: state
                .frequency
                .iter()
                .filter(|(_, count)| **count > 0)
                .map(|(v, count)| (v.clone(), *count))
                .collect(),
        }
    }

    pub fn stats(&self) -> StoreStats {
        let state = self.state.read();
        StoreStats {
            key_count: state.values.len(),
            distinct_values: state.frequency.values().filter(|c| **c > 0).count(),
            mutations: state.mutations,
        }
    }

    // --- Writes ---

    /// Set `key` to `value`.
    ///
    /// Does nothing if either is empty. Otherwise the mutation is applied in
    /// full and then announced exactly once.
    pub fn set(&self, key: &str, value: &str) {
        if key.is_empty() || value.is_empty() {
            return;
        }

        let _op = self.op_lock.lock();
        let previous = {
            let mut state = self.state.write();
            let previous = state.values.insert(key.to_string(), value.to_string());
            if let Some(ref previous) = previous {
                state.decrement(previous, self.config.prune_zero_counts);
            }
            state.increment(value);
            state.mutations += 1;
            previous
        };

        trace!(key, ?previous, value, "set");

        self.announce(Mutation::Set {
            key: key.to_string(),
            previous,
            value: value.to_string(),
        });
    }

    /// Remove `key`. Does nothing, and announces nothing, if it is not set.
    pub fn unset(&self, key: &str) {
        if key.is_empty() {
            return;
        }

        let _op = self.op_lock.lock();
        let removed = {
            let mut state = self.state.write();
            let removed = state.values.remove(key);
            if let Some(ref value) = removed {
                state.decrement(value, self.config.prune_zero_counts);
                state.mutations += 1;
            }
            removed
        };

        let Some(value) = removed else {
            return;
        };

        trace!(key, value = %value, "unset");

        self.announce(Mutation::Unset {
            key: key.to_string(),
            value,
        });
    }

    // --- Sink and subscriptions ---

    /// Install the mutation sink, replacing any previous one.
    ///
    /// The store keeps only a weak reference; once the sink is dropped,
    /// mutations are no longer recorded.
    pub fn attach_sink(&self, sink: Weak<dyn MutationSink>) {
        *self.sink.write() = Some(sink);
    }

    /// Block mutations from other threads until the guard is dropped.
    ///
    /// The holding thread may keep mutating. Take this before any lock the
    /// sink acquires in [`MutationSink::record`].
    pub fn exclusive(&self) -> MutationGuard<'_> {
        self.op_lock.lock()
    }

    /// Observe mutations through a bounded channel.
    pub fn subscribe(&self, config: SubscriptionConfig) -> SubscriptionHandle {
        self.subscriptions.subscribe(config)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.subscriptions.unsubscribe(id);
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.subscription_count()
    }

    /// Runs after the state lock is released, so the sink may read the store.
    fn announce(&self, mutation: Mutation) {
        let sink = self.sink.read().as_ref().and_then(Weak::upgrade);
        if let Some(sink) = sink {
            sink.record(&mutation);
        }

        self.subscriptions.broadcast(&mutation);
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
