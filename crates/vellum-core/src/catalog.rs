//! Table and index catalog.
//!
//! The catalog persists its state in two dedicated stores: a table-info
//! store mapping table names to their store id and configuration, and
//! an index-info store mapping index names to their configuration. Both
//! serialise entries as documents with the codec from
//! [`document::encoding`](crate::document::encoding).
//!
//! Catalog handles borrow the caller's transaction: every operation,
//! including multi-step DDL such as creating a table together with its
//! indexes, happens inside that single transaction and disappears
//! entirely if it rolls back.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use vellum_common::types::{Key, Value as RawValue};
use vellum_common::{
    VellumError, VellumResult, INDEX_INFO_STORE_NAME, INDEX_STORE_PREFIX, STORE_ID_LEN,
    TABLE_INFO_STORE_NAME,
};

use vellum_engine::{IteratorConfig, Store, StoreIterator, Transaction};

use crate::document::encoding::{decode_document, encode_document};
use crate::document::{Document, Value, ValuePath, ValueType};
use crate::index::Index;

/// The 6-byte identifier naming a table's data store.
///
/// The first four bytes are the big-endian Unix seconds at creation,
/// the last two are random. Uniqueness across live tables is enforced
/// by the catalog, which retries generation on collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StoreId([u8; STORE_ID_LEN]);

impl StoreId {
    /// Generates a fresh identifier.
    #[must_use]
    pub fn generate() -> Self {
        let secs = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as u32;
        let suffix: [u8; 2] = rand::random();

        let mut id = [0u8; STORE_ID_LEN];
        id[..4].copy_from_slice(&secs.to_be_bytes());
        id[4..].copy_from_slice(&suffix);
        Self(id)
    }

    /// Returns the identifier bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl TryFrom<&[u8]> for StoreId {
    type Error = VellumError;

    fn try_from(bytes: &[u8]) -> VellumResult<Self> {
        let raw: [u8; STORE_ID_LEN] = bytes.try_into().map_err(|_| {
            VellumError::invalid_argument(format!(
                "store id must be {STORE_ID_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(raw))
    }
}

/// Constraints on one field of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldConstraint {
    /// The field the constraint applies to.
    pub path: ValuePath,
    /// The type values of the field must have.
    pub value_type: ValueType,
    /// True if this field is the table's primary key.
    pub is_primary_key: bool,
    /// True if the field must not be null. Implied by `is_primary_key`.
    pub is_not_null: bool,
}

impl FieldConstraint {
    fn to_document(&self) -> Document {
        let segments = self
            .path
            .segments()
            .iter()
            .map(|s| Value::text(s.clone()))
            .collect();

        Document::new()
            .add("path", Value::Array(segments))
            .add("type", Value::Int64(i64::from(self.value_type.as_u8())))
            .add("is_primary_key", Value::Bool(self.is_primary_key))
            .add("is_not_null", Value::Bool(self.is_not_null))
    }

    fn from_document(doc: &Document) -> VellumResult<Self> {
        let path = decode_path(doc.require("path")?)?;

        let tag = doc.require("type")?.as_i64()?;
        let value_type = u8::try_from(tag)
            .ok()
            .and_then(ValueType::from_u8)
            .ok_or_else(|| VellumError::encoding("type", format!("unknown value type {tag}")))?;

        Ok(Self {
            path,
            value_type,
            is_primary_key: doc.require("is_primary_key")?.as_bool()?,
            is_not_null: doc.require("is_not_null")?.as_bool()?,
        })
    }
}

/// The configuration of a table: its field constraints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableConfig {
    /// Constraints on the table's fields.
    pub field_constraints: Vec<FieldConstraint>,
}

impl TableConfig {
    /// Returns the primary-key constraint, if the table has one.
    #[must_use]
    pub fn primary_key(&self) -> Option<&FieldConstraint> {
        self.field_constraints.iter().find(|fc| fc.is_primary_key)
    }

    /// Checks structural invariants: at most one primary key.
    pub fn validate(&self) -> VellumResult<()> {
        let pk_count = self
            .field_constraints
            .iter()
            .filter(|fc| fc.is_primary_key)
            .count();
        if pk_count > 1 {
            return Err(VellumError::invalid_argument(
                "table config declares more than one primary key",
            ));
        }
        Ok(())
    }

    // A primary key is implicitly not-null.
    fn normalize(&mut self) {
        for fc in &mut self.field_constraints {
            if fc.is_primary_key {
                fc.is_not_null = true;
            }
        }
    }

    fn to_document(&self) -> Document {
        let constraints = self
            .field_constraints
            .iter()
            .map(|fc| Value::Document(fc.to_document()))
            .collect();
        Document::new().add("field_constraints", Value::Array(constraints))
    }

    fn from_document(doc: &Document) -> VellumResult<Self> {
        let constraints = doc.require("field_constraints")?.as_array()?;

        let field_constraints = constraints
            .iter()
            .map(|value| FieldConstraint::from_document(value.as_document()?))
            .collect::<VellumResult<Vec<_>>>()?;

        Ok(Self { field_constraints })
    }
}

/// A catalog entry describing one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Identifier of the table's data store.
    pub store_id: StoreId,
    /// The table's configuration.
    pub config: TableConfig,
}

impl TableInfo {
    fn to_document(&self) -> Document {
        Document::new()
            .add("storeID", Value::blob(self.store_id.as_bytes().to_vec()))
            .add("config", Value::Document(self.config.to_document()))
    }

    fn from_document(doc: &Document) -> VellumResult<Self> {
        let blob = doc.require("storeID")?.as_blob()?;
        let store_id = StoreId::try_from(blob.as_ref())
            .map_err(|e| VellumError::encoding("storeID", e.to_string()))?;

        let config = TableConfig::from_document(doc.require("config")?.as_document()?)?;

        Ok(Self { store_id, config })
    }
}

/// The configuration of a secondary index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Reject duplicate values when true.
    pub unique: bool,
    /// Globally unique index name.
    pub index_name: String,
    /// Name of the indexed table.
    pub table_name: String,
    /// Path of the indexed field.
    pub path: ValuePath,
}

impl IndexConfig {
    fn to_document(&self) -> Document {
        let segments = self
            .path
            .segments()
            .iter()
            .map(|s| Value::text(s.clone()))
            .collect();

        Document::new()
            .add("unique", Value::Bool(self.unique))
            .add("indexname", Value::text(self.index_name.clone()))
            .add("tablename", Value::text(self.table_name.clone()))
            .add("path", Value::Array(segments))
    }

    fn from_document(doc: &Document) -> VellumResult<Self> {
        Ok(Self {
            unique: doc.require("unique")?.as_bool()?,
            index_name: doc.require("indexname")?.as_text()?.to_owned(),
            table_name: doc.require("tablename")?.as_text()?.to_owned(),
            path: decode_path(doc.require("path")?)?,
        })
    }
}

fn decode_path(value: &Value) -> VellumResult<ValuePath> {
    value
        .as_array()?
        .iter()
        .map(|segment| segment.as_text().map(str::to_owned))
        .collect::<VellumResult<Vec<_>>>()
        .map(ValuePath::new)
}

/// The store of [`TableInfo`] entries, keyed by table name.
pub struct TableInfoStore<S: Store> {
    store: S,
}

impl<S: Store> TableInfoStore<S> {
    /// Wraps the dedicated table-info store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Inserts the configuration for a new table and returns its
    /// freshly generated [`TableInfo`].
    ///
    /// Fails with `TableAlreadyExists` if the name is taken. Store-id
    /// generation retries until the id collides with no existing table.
    pub fn insert(&self, table_name: &str, config: TableConfig) -> VellumResult<TableInfo> {
        config.validate()?;

        match self.store.get(table_name.as_bytes()) {
            Ok(_) => {
                return Err(VellumError::TableAlreadyExists {
                    table: table_name.to_owned(),
                })
            }
            Err(VellumError::KeyNotFound) => {}
            Err(e) => return Err(e),
        }

        let store_id = loop {
            let id = StoreId::generate();
            if !self.contains_store_id(&id)? {
                break id;
            }
        };

        let mut config = config;
        config.normalize();

        let info = TableInfo { store_id, config };
        self.store.put(
            Key::from(table_name),
            RawValue::from_vec(encode_document(&info.to_document())),
        )?;

        debug!(table = table_name, store_id = %info.store_id, "inserted table info");
        Ok(info)
    }

    /// Returns the info for `table_name`, freshly decoded.
    pub fn get(&self, table_name: &str) -> VellumResult<TableInfo> {
        let raw = match self.store.get(table_name.as_bytes()) {
            Ok(raw) => raw,
            Err(VellumError::KeyNotFound) => {
                return Err(VellumError::TableNotFound {
                    table: table_name.to_owned(),
                })
            }
            Err(e) => return Err(e),
        };

        TableInfo::from_document(&decode_document(&raw)?)
    }

    /// Replaces the configuration of an existing table, keeping its
    /// store id.
    pub fn replace(&self, table_name: &str, config: TableConfig) -> VellumResult<()> {
        config.validate()?;
        let mut info = self.get(table_name)?;

        let mut config = config;
        config.normalize();
        info.config = config;

        self.store.put(
            Key::from(table_name),
            RawValue::from_vec(encode_document(&info.to_document())),
        )
    }

    /// Removes the entry for `table_name`.
    pub fn delete(&self, table_name: &str) -> VellumResult<()> {
        match self.store.delete(table_name.as_bytes()) {
            Err(VellumError::KeyNotFound) => Err(VellumError::TableNotFound {
                table: table_name.to_owned(),
            }),
            other => other,
        }
    }

    /// Lists all table names in ascending lexicographic order.
    pub fn list_tables(&self) -> VellumResult<Vec<String>> {
        let mut it = self.store.iterator(IteratorConfig::default());
        let mut names = Vec::new();

        it.seek(b"");
        while it.valid() {
            if let Some(item) = it.item() {
                names.push(String::from_utf8_lossy(&item.key).into_owned());
            }
            it.next();
        }
        Ok(names)
    }

    fn contains_store_id(&self, id: &StoreId) -> VellumResult<bool> {
        let mut it = self.store.iterator(IteratorConfig::default());

        it.seek(b"");
        while it.valid() {
            if let Some(item) = it.item() {
                let info = TableInfo::from_document(&decode_document(&item.value)?)?;
                if info.store_id == *id {
                    return Ok(true);
                }
            }
            it.next();
        }
        Ok(false)
    }
}

/// The store of [`IndexConfig`] entries, keyed by index name.
pub struct IndexInfoStore<S: Store> {
    store: S,
}

impl<S: Store> IndexInfoStore<S> {
    /// Wraps the dedicated index-info store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Inserts a new index configuration.
    ///
    /// Fails with `IndexAlreadyExists` if the name is taken.
    pub fn insert(&self, config: &IndexConfig) -> VellumResult<()> {
        match self.store.get(config.index_name.as_bytes()) {
            Ok(_) => {
                return Err(VellumError::IndexAlreadyExists {
                    index: config.index_name.clone(),
                })
            }
            Err(VellumError::KeyNotFound) => {}
            Err(e) => return Err(e),
        }

        self.store.put(
            Key::from(config.index_name.as_str()),
            RawValue::from_vec(encode_document(&config.to_document())),
        )
    }

    /// Returns the configuration of `index_name`, freshly decoded.
    pub fn get(&self, index_name: &str) -> VellumResult<IndexConfig> {
        let raw = match self.store.get(index_name.as_bytes()) {
            Ok(raw) => raw,
            Err(VellumError::KeyNotFound) => {
                return Err(VellumError::IndexNotFound {
                    index: index_name.to_owned(),
                })
            }
            Err(e) => return Err(e),
        };

        IndexConfig::from_document(&decode_document(&raw)?)
    }

    /// Removes the entry for `index_name`.
    pub fn delete(&self, index_name: &str) -> VellumResult<()> {
        match self.store.delete(index_name.as_bytes()) {
            Err(VellumError::KeyNotFound) => Err(VellumError::IndexNotFound {
                index: index_name.to_owned(),
            }),
            other => other,
        }
    }

    /// Returns every index configuration, in index-name order.
    pub fn list_all(&self) -> VellumResult<Vec<IndexConfig>> {
        let mut it = self.store.iterator(IteratorConfig::default());
        let mut configs = Vec::new();

        it.seek(b"");
        while it.valid() {
            if let Some(item) = it.item() {
                configs.push(IndexConfig::from_document(&decode_document(&item.value)?)?);
            }
            it.next();
        }
        Ok(configs)
    }
}

/// Returns the name of the store backing the given index.
#[must_use]
pub fn index_store_name(index_name: &str) -> Vec<u8> {
    let mut name = Vec::with_capacity(INDEX_STORE_PREFIX.len() + index_name.len());
    name.extend_from_slice(INDEX_STORE_PREFIX);
    name.extend_from_slice(index_name.as_bytes());
    name
}

/// The catalog façade, bound to one transaction.
///
/// All DDL performed through a catalog handle shares the handle's
/// transaction: a rollback leaves no partial artifacts behind.
pub struct Catalog<'a, T: Transaction> {
    tx: &'a T,
    tables: TableInfoStore<T::Store>,
    indexes: IndexInfoStore<T::Store>,
}

impl<'a, T: Transaction> Catalog<'a, T> {
    /// Opens the catalog inside `tx`, creating its two stores on first
    /// use (which requires a writable transaction).
    pub fn new(tx: &'a T) -> VellumResult<Self> {
        let tables = TableInfoStore::new(open_or_create(tx, TABLE_INFO_STORE_NAME)?);
        let indexes = IndexInfoStore::new(open_or_create(tx, INDEX_INFO_STORE_NAME)?);
        Ok(Self {
            tx,
            tables,
            indexes,
        })
    }

    /// The table-info store.
    #[must_use]
    pub fn tables(&self) -> &TableInfoStore<T::Store> {
        &self.tables
    }

    /// The index-info store.
    #[must_use]
    pub fn indexes(&self) -> &IndexInfoStore<T::Store> {
        &self.indexes
    }

    /// Creates a table: registers its info and creates its data store.
    pub fn create_table(&self, name: &str, config: TableConfig) -> VellumResult<TableInfo> {
        let info = self.tables.insert(name, config)?;
        self.tx.create_store(info.store_id.as_bytes())?;

        debug!(table = name, "created table");
        Ok(info)
    }

    /// Drops a table, its data store, and every index on it.
    pub fn drop_table(&self, name: &str) -> VellumResult<()> {
        let info = self.tables.get(name)?;
        self.tables.delete(name)?;
        self.tx.drop_store(info.store_id.as_bytes())?;

        for index in self.table_indexes(name)? {
            self.indexes.delete(&index.index_name)?;
            self.tx.drop_store(&index_store_name(&index.index_name))?;
        }

        debug!(table = name, "dropped table");
        Ok(())
    }

    /// Creates a secondary index on an existing table.
    pub fn create_index(&self, config: IndexConfig) -> VellumResult<()> {
        // The table must exist before it can be indexed.
        self.tables.get(&config.table_name)?;

        self.indexes.insert(&config)?;
        self.tx.create_store(&index_store_name(&config.index_name))?;

        debug!(index = config.index_name.as_str(), table = config.table_name.as_str(), "created index");
        Ok(())
    }

    /// Drops a secondary index and its store.
    pub fn drop_index(&self, name: &str) -> VellumResult<()> {
        self.indexes.get(name)?;
        self.indexes.delete(name)?;
        self.tx.drop_store(&index_store_name(name))
    }

    /// Returns a handle to the named index.
    pub fn index(&self, name: &str) -> VellumResult<Index<T::Store>> {
        let config = self.indexes.get(name)?;
        let store = self.tx.store(&index_store_name(name))?;
        Ok(Index::new(store, config.unique))
    }

    /// Returns the configurations of all indexes on `table`.
    pub fn table_indexes(&self, table: &str) -> VellumResult<Vec<IndexConfig>> {
        Ok(self
            .indexes
            .list_all()?
            .into_iter()
            .filter(|config| config.table_name == table)
            .collect())
    }

    /// Returns the data store of the named table. Its contents are
    /// owned by the table layer, not the catalog.
    pub fn table_store(&self, name: &str) -> VellumResult<T::Store> {
        let info = self.tables.get(name)?;
        self.tx.store(info.store_id.as_bytes())
    }
}

fn open_or_create<T: Transaction>(tx: &T, name: &[u8]) -> VellumResult<T::Store> {
    match tx.store(name) {
        Ok(store) => Ok(store),
        Err(VellumError::StoreNotFound) => {
            tx.create_store(name)?;
            tx.store(name)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use vellum_engine::{Engine, MemoryEngine};

    fn sample_config() -> TableConfig {
        TableConfig {
            field_constraints: vec![
                FieldConstraint {
                    path: ValuePath::parse("id"),
                    value_type: ValueType::Int64,
                    is_primary_key: true,
                    is_not_null: false,
                },
                FieldConstraint {
                    path: ValuePath::parse("address.city"),
                    value_type: ValueType::Text,
                    is_primary_key: false,
                    is_not_null: true,
                },
            ],
        }
    }

    #[test]
    fn test_table_config_document_round_trip() {
        let config = sample_config();
        let doc = config.to_document();
        let decoded = TableConfig::from_document(&doc).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_index_config_document_round_trip() {
        let config = IndexConfig {
            unique: true,
            index_name: "idx_users_name".into(),
            table_name: "users".into(),
            path: ValuePath::parse("name"),
        };
        let decoded = IndexConfig::from_document(&config.to_document()).unwrap();
        assert_eq!(decoded, config);
    }

    #[test]
    fn test_config_rejects_two_primary_keys() {
        let mut config = sample_config();
        config.field_constraints[1].is_primary_key = true;
        assert!(matches!(
            config.validate(),
            Err(VellumError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_insert_and_get() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(&tx).unwrap();

        let info = catalog.tables().insert("users", sample_config()).unwrap();

        // A second insert under the same name is a conflict.
        let err = catalog
            .tables()
            .insert("users", sample_config())
            .unwrap_err();
        assert!(matches!(err, VellumError::TableAlreadyExists { .. }));

        // Get returns the same info the insert produced.
        let fetched = catalog.tables().get("users").unwrap();
        assert_eq!(fetched.store_id, info.store_id);

        // The primary key was normalised to not-null.
        assert!(fetched.config.primary_key().unwrap().is_not_null);
    }

    #[test]
    fn test_get_missing_table() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(&tx).unwrap();

        assert!(matches!(
            catalog.tables().get("nope"),
            Err(VellumError::TableNotFound { .. })
        ));
    }

    #[test]
    fn test_replace_keeps_store_id() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(&tx).unwrap();

        let info = catalog.tables().insert("users", sample_config()).unwrap();

        let new_config = TableConfig::default();
        catalog.tables().replace("users", new_config.clone()).unwrap();

        let fetched = catalog.tables().get("users").unwrap();
        assert_eq!(fetched.store_id, info.store_id);
        assert_eq!(fetched.config, new_config);

        assert!(matches!(
            catalog.tables().replace("ghost", TableConfig::default()),
            Err(VellumError::TableNotFound { .. })
        ));
    }

    #[test]
    fn test_delete_table_info() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(&tx).unwrap();

        catalog.tables().insert("users", sample_config()).unwrap();
        catalog.tables().delete("users").unwrap();

        assert!(matches!(
            catalog.tables().delete("users"),
            Err(VellumError::TableNotFound { .. })
        ));
    }

    #[test]
    fn test_list_tables_sorted() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(&tx).unwrap();

        for name in ["zebra", "apple", "mango"] {
            catalog.tables().insert(name, TableConfig::default()).unwrap();
        }

        let names = catalog.tables().list_tables().unwrap();
        assert_eq!(names, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_store_ids_are_unique() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(&tx).unwrap();

        let mut ids = Vec::new();
        for i in 0..16 {
            let info = catalog
                .tables()
                .insert(&format!("t{i}"), TableConfig::default())
                .unwrap();
            ids.push(info.store_id);
        }

        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_create_table_creates_data_store() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(&tx).unwrap();

        let info = catalog.create_table("users", sample_config()).unwrap();
        assert!(tx.store(info.store_id.as_bytes()).is_ok());
        assert!(catalog.table_store("users").is_ok());
    }

    #[test]
    fn test_create_index_requires_table() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(&tx).unwrap();

        let config = IndexConfig {
            unique: false,
            index_name: "idx_users_age".into(),
            table_name: "users".into(),
            path: ValuePath::parse("age"),
        };

        assert!(matches!(
            catalog.create_index(config.clone()),
            Err(VellumError::TableNotFound { .. })
        ));

        catalog.create_table("users", sample_config()).unwrap();
        catalog.create_index(config.clone()).unwrap();

        assert!(matches!(
            catalog.create_index(config),
            Err(VellumError::IndexAlreadyExists { .. })
        ));
    }

    #[test]
    fn test_index_handle_is_usable() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(&tx).unwrap();

        catalog.create_table("users", sample_config()).unwrap();
        catalog
            .create_index(IndexConfig {
                unique: true,
                index_name: "idx_users_name".into(),
                table_name: "users".into(),
                path: ValuePath::parse("name"),
            })
            .unwrap();

        let index = catalog.index("idx_users_name").unwrap();
        assert!(index.is_unique());
        index.set(b"alice", b"\x01").unwrap();
        assert!(matches!(
            index.set(b"alice", b"\x02"),
            Err(VellumError::DuplicateValue)
        ));
    }

    #[test]
    fn test_drop_table_removes_indexes() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(&tx).unwrap();

        catalog.create_table("users", sample_config()).unwrap();
        catalog
            .create_index(IndexConfig {
                unique: false,
                index_name: "idx_users_age".into(),
                table_name: "users".into(),
                path: ValuePath::parse("age"),
            })
            .unwrap();

        catalog.drop_table("users").unwrap();

        assert!(matches!(
            catalog.tables().get("users"),
            Err(VellumError::TableNotFound { .. })
        ));
        assert!(matches!(
            catalog.indexes().get("idx_users_age"),
            Err(VellumError::IndexNotFound { .. })
        ));
        assert!(tx.store(&index_store_name("idx_users_age")).is_err());
    }

    #[test]
    fn test_rollback_leaves_no_artifacts() {
        let engine = MemoryEngine::new();

        {
            let tx = engine.begin(true).unwrap();
            let catalog = Catalog::new(&tx).unwrap();
            catalog.create_table("users", sample_config()).unwrap();
            catalog
                .create_index(IndexConfig {
                    unique: false,
                    index_name: "idx_users_age".into(),
                    table_name: "users".into(),
                    path: ValuePath::parse("age"),
                })
                .unwrap();
            tx.rollback().unwrap();
        }

        // Nothing from the aborted transaction is visible, including
        // the catalog stores themselves.
        let tx = engine.begin(false).unwrap();
        assert!(matches!(
            Catalog::new(&tx),
            Err(VellumError::ReadOnly { .. })
        ));
    }

    #[test]
    fn test_committed_catalog_is_visible() {
        let engine = MemoryEngine::new();

        {
            let tx = engine.begin(true).unwrap();
            let catalog = Catalog::new(&tx).unwrap();
            catalog.create_table("users", sample_config()).unwrap();
            tx.commit().unwrap();
        }

        let tx = engine.begin(false).unwrap();
        let catalog = Catalog::new(&tx).unwrap();
        assert!(catalog.tables().get("users").is_ok());
        assert_eq!(catalog.tables().list_tables().unwrap(), vec!["users"]);
    }

    #[test]
    fn test_list_all_indexes() {
        let engine = MemoryEngine::new();
        let tx = engine.begin(true).unwrap();
        let catalog = Catalog::new(&tx).unwrap();

        catalog.create_table("users", sample_config()).unwrap();
        catalog.create_table("orders", TableConfig::default()).unwrap();

        for (name, table) in [
            ("idx_orders_total", "orders"),
            ("idx_users_age", "users"),
            ("idx_users_name", "users"),
        ] {
            catalog
                .create_index(IndexConfig {
                    unique: false,
                    index_name: name.into(),
                    table_name: table.into(),
                    path: ValuePath::parse("x"),
                })
                .unwrap();
        }

        let all = catalog.indexes().list_all().unwrap();
        assert_eq!(all.len(), 3);
        // Index-name order follows store iteration order.
        assert_eq!(all[0].index_name, "idx_orders_total");

        let users_indexes = catalog.table_indexes("users").unwrap();
        assert_eq!(users_indexes.len(), 2);
    }
}
