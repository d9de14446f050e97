//! Subscription types for observing store mutations.

use crate::types::Mutation;
use serde::{Deserialize, Serialize};

/// Configuration for a subscription.
#[derive(Clone, Debug)]
pub struct SubscriptionConfig {
    /// Max buffered events before dropping subscriber.
    /// Default: 1000
    pub buffer_size: usize,

    /// Filter criteria.
    pub filter: SubscriptionFilter,
}

impl Default for SubscriptionConfig {
    fn default() -> Self {
        Self {
            buffer_size: 1000,
            filter: SubscriptionFilter::default(),
        }
    }
}

/// Filter criteria for subscriptions.
#[derive(Clone, Debug, Default)]
pub struct SubscriptionFilter {
    /// Only report mutations of these keys (None = all keys).
    pub keys: Option<Vec<String>>,
}

impl SubscriptionFilter {
    /// Subscribe to mutations of specific keys.
    pub fn keys(keys: Vec<String>) -> Self {
        Self { keys: Some(keys) }
    }

    pub fn matches(&self, key: &str) -> bool {
        match self.keys {
            Some(ref keys) => keys.iter().any(|k| k == key),
            None => true,
        }
    }
}

/// Events emitted by subscriptions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// A key was written.
    Set {
        key: String,
        previous: Option<String>,
        value: String,
    },

    /// A key was removed.
    Unset { key: String, value: String },

    /// Subscription was dropped.
    Dropped { reason: DropReason },
}

impl From<&Mutation> for StoreEvent {
    fn from(mutation: &Mutation) -> Self {
        match mutation.clone() {
            Mutation::Set {
                key,
                previous,
                value,
            } => StoreEvent::Set {
                key,
                previous,
                value,
            },
            Mutation::Unset { key, value } => StoreEvent::Unset { key, value },
        }
    }
}

/// Why a subscription was dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropReason {
    /// Send buffer overflowed (slow consumer).
    BufferOverflow,
    /// Explicitly unsubscribed.
    Unsubscribed,
}

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

/// Handle to manage a subscription.
pub struct SubscriptionHandle {
    pub id: SubscriptionId,
    /// Channel to receive events.
    pub receiver: crossbeam_channel::Receiver<StoreEvent>,
}

impl SubscriptionHandle {
    /// Receive the next event (blocking).
    pub fn recv(&self) -> Result<StoreEvent, crossbeam_channel::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive an event (non-blocking).
    pub fn try_recv(&self) -> Result<StoreEvent, crossbeam_channel::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Receive with timeout.
    pub fn recv_timeout(
        &self,
        timeout: std::time::Duration,
    ) -> Result<StoreEvent, crossbeam_channel::RecvTimeoutError> {
        self.receiver.recv_timeout(timeout)
    }

    /// Drain everything currently buffered.
    pub fn drain(&self) -> Vec<StoreEvent> {
        self.receiver.try_iter().collect()
    }
}
