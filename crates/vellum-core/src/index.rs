//! Secondary indexes.
//!
//! An index stores `(value, rowid)` pairs in a dedicated store so that
//! a forward cursor yields them in ascending value order, ties broken
//! by ascending rowid.
//!
//! # Key encoding
//!
//! The composite key embeds both parts with an escape-based,
//! order-preserving scheme:
//!
//! ```text
//! key = escape(value) ‖ 0x00 0x00 ‖ rowid
//! escape: 0x00 → 0x00 0xFF, all other bytes verbatim
//! ```
//!
//! The terminator can never appear inside an escaped value, so the
//! split is unambiguous for arbitrary value and rowid bytes, and the
//! byte order of encoded keys equals the `(value, rowid)` lexicographic
//! order.

use bytes::Bytes;

use vellum_common::types::{Key, Value};
use vellum_common::{VellumError, VellumResult};

use vellum_engine::{IteratorConfig, Store, StoreIterator};

/// A `(value, rowid)` pair stored in an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// The indexed field value, as ordered bytes.
    pub value: Bytes,
    /// The identifier of the row holding the value.
    pub rowid: Bytes,
}

impl IndexEntry {
    /// Creates an entry.
    pub fn new(value: impl Into<Bytes>, rowid: impl Into<Bytes>) -> Self {
        Self {
            value: value.into(),
            rowid: rowid.into(),
        }
    }
}

/// Appends the escaped form of `value` to `buf`.
fn escape_into(value: &[u8], buf: &mut Vec<u8>) {
    for &byte in value {
        if byte == 0x00 {
            buf.extend_from_slice(&[0x00, 0xFF]);
        } else {
            buf.push(byte);
        }
    }
}

/// Encodes a value prefix for seeking: escaped, without terminator.
#[must_use]
pub fn encode_prefix(value: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(value.len() + 2);
    escape_into(value, &mut buf);
    buf
}

/// Encodes the complete composite key for `(value, rowid)`.
#[must_use]
pub fn encode_entry(value: &[u8], rowid: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(value.len() + rowid.len() + 4);
    escape_into(value, &mut buf);
    buf.extend_from_slice(&[0x00, 0x00]);
    buf.extend_from_slice(rowid);
    buf
}

/// Recovers `(value, rowid)` from a composite key.
pub fn decode_entry(key: &[u8]) -> VellumResult<IndexEntry> {
    let mut value = Vec::new();
    let mut i = 0;

    while i < key.len() {
        if key[i] != 0x00 {
            value.push(key[i]);
            i += 1;
            continue;
        }
        match key.get(i + 1) {
            Some(0xFF) => {
                value.push(0x00);
                i += 2;
            }
            Some(0x00) => {
                return Ok(IndexEntry {
                    value: Bytes::from(value),
                    rowid: Bytes::copy_from_slice(&key[i + 2..]),
                });
            }
            _ => break,
        }
    }

    Err(VellumError::encoding(
        "(index key)",
        "missing terminator in composite key",
    ))
}

/// A secondary index over one store.
pub struct Index<S: Store> {
    store: S,
    unique: bool,
}

impl<S: Store> Index<S> {
    /// Creates an index over `store`.
    ///
    /// When `unique` is true, [`set`](Index::set) rejects a second
    /// rowid for an already indexed value.
    pub fn new(store: S, unique: bool) -> Self {
        Self { store, unique }
    }

    /// Returns true if this index enforces value uniqueness.
    #[must_use]
    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Associates `rowid` with `value`.
    ///
    /// The value must be non-empty. In a unique index, indexing the
    /// same value under a different rowid fails with `DuplicateValue`;
    /// re-setting an existing pair is a no-op.
    pub fn set(&self, value: &[u8], rowid: &[u8]) -> VellumResult<()> {
        if value.is_empty() {
            return Err(VellumError::invalid_argument(
                "index value cannot be empty",
            ));
        }

        if self.unique {
            // The terminator cannot occur inside an escaped value, so a
            // shared prefix up to it means an exact value match.
            let mut prefix = encode_prefix(value);
            prefix.extend_from_slice(&[0x00, 0x00]);

            let mut it = self.store.iterator(IteratorConfig::default());
            it.seek(&prefix);
            if let Some(item) = it.item() {
                if item.key.starts_with(&prefix) && &item.key[prefix.len()..] != rowid {
                    return Err(VellumError::DuplicateValue);
                }
            }
        }

        self.store
            .put(Key::from_vec(encode_entry(value, rowid)), Value::from_bytes(rowid))
    }

    /// Removes the association of `rowid` with `value`.
    ///
    /// Fails with `KeyNotFound` if the pair is not indexed.
    pub fn delete(&self, value: &[u8], rowid: &[u8]) -> VellumResult<()> {
        self.store.delete(&encode_entry(value, rowid))
    }

    /// Creates an ordered cursor over the index.
    pub fn cursor(&self) -> BucketCursor<'_, S> {
        BucketCursor {
            store: &self.store,
            pos: Position::Start,
        }
    }
}

/// An ordered, bidirectional cursor over `(value, rowid)` pairs.
///
/// Every positioning call returns the entry landed on, or `None` at the
/// end of the range. The cursor parks once a range end is reached:
/// [`next`](IndexCursor::next) past the last entry stays at the end and
/// keeps returning `None`, and symmetrically for
/// [`prev`](IndexCursor::prev) before the first. From the parked end
/// position, `prev` yields the last entry again; from the parked start
/// position, `next` yields the first.
pub trait IndexCursor {
    /// Positions on the first entry.
    fn first(&mut self) -> VellumResult<Option<IndexEntry>>;

    /// Positions on the last entry.
    fn last(&mut self) -> VellumResult<Option<IndexEntry>>;

    /// Moves forward one entry.
    fn next(&mut self) -> VellumResult<Option<IndexEntry>>;

    /// Moves backward one entry.
    fn prev(&mut self) -> VellumResult<Option<IndexEntry>>;

    /// Positions on the first entry whose value is `>=` the given
    /// value prefix.
    fn seek(&mut self, prefix: &[u8]) -> VellumResult<Option<IndexEntry>>;
}

enum Position {
    Start,
    At(Key),
    End,
}

/// [`IndexCursor`] over a real index store.
pub struct BucketCursor<'a, S: Store> {
    store: &'a S,
    pos: Position,
}

impl<S: Store> BucketCursor<'_, S> {
    fn land(&mut self, item: Option<vellum_engine::Item>, at_end: Position) -> VellumResult<Option<IndexEntry>> {
        match item {
            Some(item) => {
                let entry = decode_entry(&item.key)?;
                self.pos = Position::At(item.key);
                Ok(Some(entry))
            }
            None => {
                self.pos = at_end;
                Ok(None)
            }
        }
    }
}

impl<S: Store> IndexCursor for BucketCursor<'_, S> {
    fn first(&mut self) -> VellumResult<Option<IndexEntry>> {
        let mut it = self.store.iterator(IteratorConfig::default());
        it.seek(b"");
        let item = it.item();
        self.land(item, Position::End)
    }

    fn last(&mut self) -> VellumResult<Option<IndexEntry>> {
        let mut it = self.store.iterator(IteratorConfig { reverse: true });
        it.seek(b"");
        let item = it.item();
        self.land(item, Position::Start)
    }

    fn next(&mut self) -> VellumResult<Option<IndexEntry>> {
        match &self.pos {
            Position::Start => self.first(),
            Position::End => Ok(None),
            Position::At(key) => {
                let mut it = self.store.iterator(IteratorConfig::default());
                it.seek(key.successor().as_bytes());
                let item = it.item();
                self.land(item, Position::End)
            }
        }
    }

    fn prev(&mut self) -> VellumResult<Option<IndexEntry>> {
        match &self.pos {
            Position::End => self.last(),
            Position::Start => Ok(None),
            Position::At(key) => {
                let mut it = self.store.iterator(IteratorConfig { reverse: true });
                it.seek(key.as_bytes());
                // A reverse seek lands on the current key when it still
                // exists; step over it to reach the predecessor.
                if it.item().is_some_and(|item| item.key == *key) {
                    it.next();
                }
                let item = it.item();
                self.land(item, Position::Start)
            }
        }
    }

    fn seek(&mut self, prefix: &[u8]) -> VellumResult<Option<IndexEntry>> {
        let mut it = self.store.iterator(IteratorConfig::default());
        it.seek(&encode_prefix(prefix));
        let item = it.item();
        self.land(item, Position::End)
    }
}

/// An in-memory list of index entries.
///
/// Implements the same cursor contract as a real index store; used as a
/// lightweight stand-in when testing code that consumes cursors.
#[derive(Debug, Clone, Default)]
pub struct RecordBuffer {
    entries: Vec<IndexEntry>,
}

impl RecordBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `(value, rowid)` pair.
    pub fn add(&mut self, value: impl Into<Bytes>, rowid: impl Into<Bytes>) {
        self.entries.push(IndexEntry::new(value, rowid));
    }

    /// Creates a cursor over the buffered entries.
    #[must_use]
    pub fn cursor(&self) -> RecordBufferCursor {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| {
            a.value
                .cmp(&b.value)
                .then_with(|| a.rowid.cmp(&b.rowid))
        });
        RecordBufferCursor {
            entries,
            pos: BufferPosition::Start,
        }
    }
}

enum BufferPosition {
    Start,
    At(usize),
    End,
}

/// [`IndexCursor`] over a [`RecordBuffer`].
pub struct RecordBufferCursor {
    entries: Vec<IndexEntry>,
    pos: BufferPosition,
}

impl RecordBufferCursor {
    fn land(&mut self, index: Option<usize>, at_end: BufferPosition) -> VellumResult<Option<IndexEntry>> {
        match index {
            Some(i) => {
                self.pos = BufferPosition::At(i);
                Ok(Some(self.entries[i].clone()))
            }
            None => {
                self.pos = at_end;
                Ok(None)
            }
        }
    }
}

impl IndexCursor for RecordBufferCursor {
    fn first(&mut self) -> VellumResult<Option<IndexEntry>> {
        let index = (!self.entries.is_empty()).then_some(0);
        self.land(index, BufferPosition::End)
    }

    fn last(&mut self) -> VellumResult<Option<IndexEntry>> {
        let index = self.entries.len().checked_sub(1);
        self.land(index, BufferPosition::Start)
    }

    fn next(&mut self) -> VellumResult<Option<IndexEntry>> {
        match self.pos {
            BufferPosition::Start => self.first(),
            BufferPosition::End => Ok(None),
            BufferPosition::At(i) => {
                let index = (i + 1 < self.entries.len()).then_some(i + 1);
                self.land(index, BufferPosition::End)
            }
        }
    }

    fn prev(&mut self) -> VellumResult<Option<IndexEntry>> {
        match self.pos {
            BufferPosition::End => self.last(),
            BufferPosition::Start => Ok(None),
            BufferPosition::At(i) => self.land(i.checked_sub(1), BufferPosition::Start),
        }
    }

    fn seek(&mut self, prefix: &[u8]) -> VellumResult<Option<IndexEntry>> {
        // Escaping preserves byte order, so raw value comparison
        // matches the encoded-key comparison of a real store.
        let index = self
            .entries
            .partition_point(|entry| entry.value.as_ref() < prefix);
        let index = (index < self.entries.len()).then_some(index);
        self.land(index, BufferPosition::End)
    }
}
