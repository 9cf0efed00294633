//! # vellum-engine
//!
//! The ordered key-value contract Vellum's catalog and index layers are
//! built on, plus a reference in-memory engine.
//!
//! An [`Engine`] hands out transactions; a [`Transaction`] gives access
//! to named stores (buckets) and commits or rolls back as a unit; a
//! [`Store`] is an ordered map of opaque byte keys to byte values with
//! forward and reverse iteration.
//!
//! ## Example
//!
//! ```rust
//! use vellum_engine::{Engine, MemoryEngine, Store, Transaction};
//!
//! # fn main() -> vellum_common::VellumResult<()> {
//! let engine = MemoryEngine::new();
//!
//! let tx = engine.begin(true)?;
//! tx.create_store(b"data")?;
//! let store = tx.store(b"data")?;
//! store.put(b"hello".into(), b"world".into())?;
//! tx.commit()?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod memory;

pub use memory::{MemoryEngine, MemoryIterator, MemoryStore, MemoryTransaction};

use vellum_common::types::{Key, Value};
use vellum_common::VellumResult;

/// Configuration for a store iterator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IteratorConfig {
    /// Iterate in descending key order.
    ///
    /// For a forward iterator, `seek(p)` positions on the first key
    /// greater than or equal to `p`; an empty `p` means the first key.
    /// For a reverse iterator, `seek(p)` positions on the last key less
    /// than or equal to `p`; an empty `p` means the last key.
    pub reverse: bool,
}

/// A key-value pair yielded by an iterator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// The entry's key.
    pub key: Key,
    /// The entry's value.
    pub value: Value,
}

/// A database engine: the entry point for transactions.
pub trait Engine {
    /// The transaction type this engine produces.
    type Transaction: Transaction;

    /// Begins a transaction.
    ///
    /// A writable transaction excludes other writers until it commits
    /// or rolls back. Read-only transactions reject every write with
    /// [`VellumError::ReadOnly`](vellum_common::VellumError::ReadOnly).
    fn begin(&self, writable: bool) -> VellumResult<Self::Transaction>;
}

/// A transaction over the engine's named stores.
///
/// All mutations made through a transaction become visible to other
/// transactions only after [`commit`](Transaction::commit); rollback
/// discards them atomically. Store handles obtained from a transaction
/// are valid only for its lifetime.
pub trait Transaction {
    /// The store handle type.
    type Store: Store;

    /// Returns a handle to the named store.
    ///
    /// Fails with `StoreNotFound` if no store with that name exists.
    fn store(&self, name: &[u8]) -> VellumResult<Self::Store>;

    /// Creates a new named store.
    ///
    /// Fails with `StoreAlreadyExists` if the name is taken and
    /// `ReadOnly` in a read-only transaction.
    fn create_store(&self, name: &[u8]) -> VellumResult<()>;

    /// Removes a named store and all its contents.
    ///
    /// Fails with `StoreNotFound` if absent and `ReadOnly` in a
    /// read-only transaction.
    fn drop_store(&self, name: &[u8]) -> VellumResult<()>;

    /// Lists the names of all stores in ascending order.
    fn list_stores(&self) -> VellumResult<Vec<Key>>;

    /// Commits the transaction, publishing all writes.
    fn commit(self) -> VellumResult<()>;

    /// Rolls the transaction back, discarding all writes.
    fn rollback(self) -> VellumResult<()>;
}

/// An ordered map of byte keys to byte values.
pub trait Store {
    /// The iterator type over this store.
    type Iter: StoreIterator;

    /// Returns the value stored under `key`.
    ///
    /// Fails with `KeyNotFound` if absent.
    fn get(&self, key: &[u8]) -> VellumResult<Value>;

    /// Stores `value` under `key`, replacing any previous value.
    fn put(&self, key: Key, value: Value) -> VellumResult<()>;

    /// Removes the entry under `key`.
    ///
    /// Fails with `KeyNotFound` if absent.
    fn delete(&self, key: &[u8]) -> VellumResult<()>;

    /// Creates an iterator over the store's entries.
    fn iterator(&self, config: IteratorConfig) -> Self::Iter;
}

/// A positioned iterator over a store's entries in key order.
///
/// The iterator starts unpositioned; call [`seek`](StoreIterator::seek)
/// first. After the range is exhausted, [`valid`](StoreIterator::valid)
/// returns false and [`item`](StoreIterator::item) returns `None`.
pub trait StoreIterator {
    /// Positions the iterator relative to `prefix` according to the
    /// iterator's direction (see [`IteratorConfig`]).
    fn seek(&mut self, prefix: &[u8]);

    /// Returns true if the iterator is positioned on an entry.
    fn valid(&self) -> bool;

    /// Advances the iterator one entry in its direction.
    fn next(&mut self);

    /// Returns the current entry, or `None` if the iterator is not
    /// positioned on one.
    fn item(&self) -> Option<Item>;
}
