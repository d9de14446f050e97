//! A store, its transaction manager, and command dispatch between them.

use crate::error::Result;
use crate::store::{Store, StoreConfig};
use crate::transactions::TransactionManager;
use crate::types::{StoreSnapshot, StoreStats};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::debug;

use super::command::Command;

/// Session configuration.
#[derive(Clone, Debug, Default)]
pub struct SessionConfig {
    pub store: StoreConfig,

    /// Match command names regardless of case.
    pub ignore_case: bool,
}

/// What a command produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// A line to write back to the caller.
    Output(String),
    /// The command succeeded with nothing to print.
    Silent,
    /// The caller asked to end the session.
    End,
}

/// Owns a store and the transaction manager observing it.
///
/// Commands are serialized behind one lock, so each runs to completion,
/// undo capture included, before the next one starts.
pub struct Session {
    config: SessionConfig,
    store: Arc<Store>,
    transactions: Arc<TransactionManager>,
    command_lock: Mutex<()>,
}

impl Session {
    pub fn new() -> Self {
        Self::with_config(SessionConfig::default())
    }

    pub fn with_config(config: SessionConfig) -> Self {
        let store = Arc::new(Store::with_config(config.store.clone()));
        let transactions = TransactionManager::attach(Arc::clone(&store));

        Self {
            config,
            store,
            transactions,
            command_lock: Mutex::new(()),
        }
    }

    /// Copy of the store contents between commands.
    pub fn snapshot(&self) -> StoreSnapshot {
        let _lock = self.command_lock.lock();
        self.store.snapshot()
    }

    pub fn stats(&self) -> StoreStats {
        let _lock = self.command_lock.lock();
        self.store.stats()
    }

    /// Number of open transactions.
    pub fn depth(&self) -> usize {
        let _lock = self.command_lock.lock();
        self.transactions.depth()
    }

    /// Parse and run one input line.
    pub fn execute(&self, line: &str) -> Result<Outcome> {
        match Command::parse(line, self.config.ignore_case)? {
            Some(command) => self.apply(command),
            None => Ok(Outcome::Silent),
        }
    }

    /// Run a parsed command.
    pub fn apply(&self, command: Command) -> Result<Outcome> {
        let _lock = self.command_lock.lock();
        debug!(?command, "execute");

        let outcome = match command {
            Command::Get { key } => Outcome::Output(self.store.get(&key)),
            Command::Set { key, value } => {
                self.store.set(&key, &value);
                Outcome::Silent
            }
            Command::Unset { key } => {
                self.store.unset(&key);
                Outcome::Silent
            }
            Command::NumEqualTo { value } => {
                Outcome::Output(self.store.num_equal_to(&value).to_string())
            }
            Command::Begin => {
                self.transactions.begin();
                Outcome::Silent
            }
            Command::Commit => {
                self.transactions.commit()?;
                Outcome::Silent
            }
            Command::Rollback => {
                self.transactions.rollback()?;
                Outcome::Silent
            }
            Command::End => Outcome::End,
        };

        Ok(outcome)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
