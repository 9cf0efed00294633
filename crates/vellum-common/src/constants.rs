//! System-wide constants.

/// Name of the catalog bucket holding table information.
pub const TABLE_INFO_STORE_NAME: &[u8] = b"__vellum_tables";

/// Name of the catalog bucket holding index configurations.
pub const INDEX_INFO_STORE_NAME: &[u8] = b"__vellum_indexes";

/// Prefix of per-index bucket names, followed by the index name.
pub const INDEX_STORE_PREFIX: &[u8] = b"idx_";

/// Length in bytes of a table store identifier.
pub const STORE_ID_LEN: usize = 6;
