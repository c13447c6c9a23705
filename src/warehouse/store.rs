//! Table store capability used by the batch emitter.

use crate::error::WarehouseError;
use crate::models::NormalizedCityRow;

use super::TableSchema;

/// Fully qualified table name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub namespace: String,
    pub name: String,
}

impl TableRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.namespace, self.name)
    }
}

/// Catalog and storage operations a partitioned table store must provide.
///
/// The transformation never sees a store; the driver creates one and hands
/// it to [`super::BatchEmitter`].
pub trait TableStore {
    /// Create the namespace unless it already exists
    fn ensure_namespace(&mut self, namespace: &str) -> Result<(), WarehouseError>;

    /// Register the table unless it already exists with the same schema
    fn ensure_table(&mut self, table: &TableRef, schema: &TableSchema)
        -> Result<(), WarehouseError>;

    /// Write `rows` as the columnar partition `partition`, replacing any data
    /// already there. Returns the partition location.
    fn write_partition(
        &mut self,
        table: &TableRef,
        schema: &TableSchema,
        partition: &str,
        rows: &[NormalizedCityRow],
    ) -> Result<String, WarehouseError>;

    /// Point the table at `location`
    fn set_location(&mut self, table: &TableRef, location: &str) -> Result<(), WarehouseError>;
}
