//! In-memory reference engine.
//!
//! Stores live in a `BTreeMap` forest guarded by a read-write lock.
//! Every transaction works on a private copy of the committed state:
//! writers publish their copy on commit, readers keep a stable snapshot
//! for their whole lifetime. A single mutex serialises writers, so a
//! write transaction observes the latest committed state when it
//! begins.
//!
//! This engine backs the test suites of the catalog and index layers
//! and doubles as the default engine for embedded, non-persistent use.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::lock_api::ArcMutexGuard;
use parking_lot::{Mutex, RawMutex, RwLock};
use tracing::debug;

use vellum_common::types::{Key, Value};
use vellum_common::{VellumError, VellumResult};

use crate::{Engine, Item, IteratorConfig, Store, StoreIterator, Transaction};

type Bucket = BTreeMap<Key, Value>;
type Buckets = BTreeMap<Key, Bucket>;

struct Shared {
    committed: RwLock<Buckets>,
    // Serialises write transactions. Guard is held by the transaction.
    writer: Arc<Mutex<()>>,
}

struct TxState {
    buckets: Buckets,
    closed: bool,
}

/// An in-memory [`Engine`].
///
/// Cloning is cheap and every clone operates on the same shared state.
#[derive(Clone)]
pub struct MemoryEngine {
    shared: Arc<Shared>,
}

impl MemoryEngine {
    /// Creates an empty in-memory engine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                committed: RwLock::new(Buckets::new()),
                writer: Arc::new(Mutex::new(())),
            }),
        }
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine for MemoryEngine {
    type Transaction = MemoryTransaction;

    fn begin(&self, writable: bool) -> VellumResult<Self::Transaction> {
        // Writers take the writer mutex first so the snapshot below is
        // taken from the latest committed state.
        let writer_guard = writable.then(|| self.shared.writer.lock_arc());

        let buckets = self.shared.committed.read().clone();

        Ok(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            state: Arc::new(RwLock::new(TxState {
                buckets,
                closed: false,
            })),
            writable,
            _writer_guard: writer_guard,
        })
    }
}

/// A transaction over a [`MemoryEngine`].
pub struct MemoryTransaction {
    shared: Arc<Shared>,
    state: Arc<RwLock<TxState>>,
    writable: bool,
    _writer_guard: Option<ArcMutexGuard<RawMutex, ()>>,
}

impl MemoryTransaction {
    fn check_writable(&self, operation: &'static str) -> VellumResult<()> {
        if self.writable {
            Ok(())
        } else {
            Err(VellumError::ReadOnly { operation })
        }
    }

    fn close(&self, publish: bool) -> VellumResult<()> {
        let mut state = self.state.write();
        if state.closed {
            return Err(VellumError::TransactionClosed);
        }
        state.closed = true;

        if publish {
            let buckets = std::mem::take(&mut state.buckets);
            *self.shared.committed.write() = buckets;
        }
        Ok(())
    }
}

impl Transaction for MemoryTransaction {
    type Store = MemoryStore;

    fn store(&self, name: &[u8]) -> VellumResult<Self::Store> {
        let state = self.state.read();
        if state.closed {
            return Err(VellumError::TransactionClosed);
        }
        if !state.buckets.contains_key(name) {
            return Err(VellumError::StoreNotFound);
        }

        Ok(MemoryStore {
            state: Arc::clone(&self.state),
            name: Key::from_bytes(name),
            writable: self.writable,
        })
    }

    fn create_store(&self, name: &[u8]) -> VellumResult<()> {
        self.check_writable("create store")?;

        let mut state = self.state.write();
        if state.closed {
            return Err(VellumError::TransactionClosed);
        }
        if state.buckets.contains_key(name) {
            return Err(VellumError::StoreAlreadyExists);
        }
        state.buckets.insert(Key::from_bytes(name), Bucket::new());
        Ok(())
    }

    fn drop_store(&self, name: &[u8]) -> VellumResult<()> {
        self.check_writable("drop store")?;

        let mut state = self.state.write();
        if state.closed {
            return Err(VellumError::TransactionClosed);
        }
        state
            .buckets
            .remove(name)
            .map(|_| ())
            .ok_or(VellumError::StoreNotFound)
    }

    fn list_stores(&self) -> VellumResult<Vec<Key>> {
        let state = self.state.read();
        if state.closed {
            return Err(VellumError::TransactionClosed);
        }
        Ok(state.buckets.keys().cloned().collect())
    }

    fn commit(self) -> VellumResult<()> {
        self.check_writable("commit")?;
        self.close(true)?;
        debug!("memory engine: transaction committed");
        Ok(())
    }

    fn rollback(self) -> VellumResult<()> {
        self.close(false)
    }
}

impl Drop for MemoryTransaction {
    fn drop(&mut self) {
        // An abandoned transaction behaves like a rollback.
        let mut state = self.state.write();
        state.closed = true;
    }
}

/// A handle to one named store inside a [`MemoryTransaction`].
///
/// The handle shares the transaction's state; once the transaction is
/// committed or rolled back every operation fails with
/// `TransactionClosed`.
pub struct MemoryStore {
    state: Arc<RwLock<TxState>>,
    name: Key,
    writable: bool,
}

impl MemoryStore {
    fn check_writable(&self, operation: &'static str) -> VellumResult<()> {
        if self.writable {
            Ok(())
        } else {
            Err(VellumError::ReadOnly { operation })
        }
    }
}

impl Store for MemoryStore {
    type Iter = MemoryIterator;

    fn get(&self, key: &[u8]) -> VellumResult<Value> {
        let state = self.state.read();
        if state.closed {
            return Err(VellumError::TransactionClosed);
        }
        let bucket = state
            .buckets
            .get(self.name.as_bytes())
            .ok_or(VellumError::StoreNotFound)?;
        bucket.get(key).cloned().ok_or(VellumError::KeyNotFound)
    }

    fn put(&self, key: Key, value: Value) -> VellumResult<()> {
        self.check_writable("put")?;

        let mut state = self.state.write();
        if state.closed {
            return Err(VellumError::TransactionClosed);
        }
        let bucket = state
            .buckets
            .get_mut(self.name.as_bytes())
            .ok_or(VellumError::StoreNotFound)?;
        bucket.insert(key, value);
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> VellumResult<()> {
        self.check_writable("delete")?;

        let mut state = self.state.write();
        if state.closed {
            return Err(VellumError::TransactionClosed);
        }
        let bucket = state
            .buckets
            .get_mut(self.name.as_bytes())
            .ok_or(VellumError::StoreNotFound)?;
        bucket
            .remove(key)
            .map(|_| ())
            .ok_or(VellumError::KeyNotFound)
    }

    fn iterator(&self, config: IteratorConfig) -> Self::Iter {
        // Iterators snapshot the bucket at creation time.
        let state = self.state.read();
        let entries = if state.closed {
            Vec::new()
        } else {
            state
                .buckets
                .get(self.name.as_bytes())
                .map(|bucket| {
                    bucket
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };

        MemoryIterator {
            entries,
            reverse: config.reverse,
            pos: None,
        }
    }
}

/// An iterator over a snapshot of one store.
pub struct MemoryIterator {
    entries: Vec<(Key, Value)>,
    reverse: bool,
    pos: Option<usize>,
}

impl StoreIterator for MemoryIterator {
    fn seek(&mut self, prefix: &[u8]) {
        self.pos = if self.reverse {
            if prefix.is_empty() {
                self.entries.len().checked_sub(1)
            } else {
                // Last key <= prefix.
                let count = self
                    .entries
                    .partition_point(|(k, _)| k.as_bytes() <= prefix);
                count.checked_sub(1)
            }
        } else {
            // First key >= prefix.
            let idx = self
                .entries
                .partition_point(|(k, _)| k.as_bytes() < prefix);
            (idx < self.entries.len()).then_some(idx)
        };
    }

    fn valid(&self) -> bool {
        self.pos.is_some()
    }

    fn next(&mut self) {
        self.pos = match self.pos {
            Some(i) if self.reverse => i.checked_sub(1),
            Some(i) => {
                let next = i + 1;
                (next < self.entries.len()).then_some(next)
            }
            None => None,
        };
    }

    fn item(&self) -> Option<Item> {
        self.pos.map(|i| {
            let (key, value) = &self.entries[i];
            Item {
                key: key.clone(),
                value: value.clone(),
            }
        })
    }
}
