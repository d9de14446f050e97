//! Subscription system for observing store mutations.
//!
//! The store announces each `set`/`unset` to its single mutation sink (the
//! transaction manager). Any number of additional observers can follow the
//! same stream through bounded channels:
//! - Filtering by key
//! - Bounded buffers with slow-subscriber dropping
//!
//! # Example
//!
//! ```ignore
//! let handle = store.subscribe(SubscriptionConfig {
//!     filter: SubscriptionFilter::keys(vec!["x".to_string()]),
//!     ..Default::default()
//! });
//!
//! store.set("x", "10");
//!
//! match handle.recv() {
//!     Ok(StoreEvent::Set { key, value, .. }) => println!("{key} = {value}"),
//!     Ok(StoreEvent::Unset { key, .. }) => println!("{key} removed"),
//!     Ok(StoreEvent::Dropped { reason }) => println!("dropped: {reason:?}"),
//!     Err(_) => {}
//! }
//! ```

mod manager;
mod types;

pub use manager::SubscriptionManager;
pub use types::{
    DropReason, StoreEvent, SubscriptionConfig, SubscriptionFilter, SubscriptionHandle,
    SubscriptionId,
};
