//! Publishes a validated batch into a table store.

use tracing::info;

use super::{TableRef, TableSchema, TableStore};
use crate::error::WarehouseError;
use crate::models::NormalizedCityRow;

/// Outcome of a successful emission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitSummary {
    pub table: TableRef,
    pub rows: usize,
    pub location: String,
}

pub struct BatchEmitter<'s, S: TableStore> {
    store: &'s mut S,
    table: TableRef,
    schema: TableSchema,
}

impl<'s, S: TableStore> BatchEmitter<'s, S> {
    pub fn new(store: &'s mut S, table: TableRef, schema: TableSchema) -> Self {
        Self {
            store,
            table,
            schema,
        }
    }

    /// Emitter for the cities table with its embedded schema
    pub fn cities(store: &'s mut S, table: TableRef) -> Result<Self, WarehouseError> {
        Ok(Self::new(store, table, TableSchema::cities()?))
    }

    /// Register the table, write `rows` as `partition` and repoint the table
    /// at it. Stops at the first failing step.
    pub fn emit(
        &mut self,
        rows: &[NormalizedCityRow],
        partition: &str,
    ) -> Result<EmitSummary, WarehouseError> {
        self.store.ensure_namespace(&self.table.namespace)?;
        self.store.ensure_table(&self.table, &self.schema)?;

        let location = self
            .store
            .write_partition(&self.table, &self.schema, partition, rows)?;
        self.store.set_location(&self.table, &location)?;

        info!(
            "Published {} rows to {} at {}",
            rows.len(),
            self.table,
            location
        );
        Ok(EmitSummary {
            table: self.table.clone(),
            rows: rows.len(),
            location,
        })
    }
}
