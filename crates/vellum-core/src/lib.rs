//! # vellum-core
//!
//! The heart of Vellum: the document model, the table-and-index
//! catalog, and the secondary-index layer, all materialised on top of
//! the ordered key-value contract from `vellum-engine`.
//!
//! - [`document`] — typed values, value paths, and the binary codec the
//!   catalog persists its own state with
//! - [`catalog`] — table and index metadata stores plus the DDL façade
//! - [`index`] — secondary indexes mapping field values to rowids, with
//!   ordered cursors

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod catalog;
pub mod document;
pub mod index;

pub use catalog::{
    Catalog, FieldConstraint, IndexConfig, IndexInfoStore, StoreId, TableConfig, TableInfo,
    TableInfoStore,
};
pub use document::{Document, Value, ValuePath, ValueType};
pub use index::{Index, IndexCursor, IndexEntry, RecordBuffer};
