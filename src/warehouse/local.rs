//! Directory-backed table store.
//!
//! Layout under the warehouse root:
//!
//! ```text
//! catalog.json
//! <namespace>.db/<table>/<partition>/part-00000.snappy.parquet
//! ```

use chrono::Utc;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::catalog::{Catalog, NamespaceEntry, TableEntry};
use super::partition::{write_parquet, PART_FILE};
use super::{TableRef, TableSchema, TableStore};
use crate::error::WarehouseError;
use crate::models::NormalizedCityRow;

pub const CATALOG_FILE: &str = "catalog.json";

#[derive(Debug)]
pub struct LocalWarehouse {
    root: PathBuf,
    catalog: Catalog,
}

impl LocalWarehouse {
    /// Open (creating if needed) a warehouse rooted at `root`
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, WarehouseError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            WarehouseError::io(format!("failed to create warehouse {}", root.display()), e)
        })?;
        let catalog = Catalog::load(&root.join(CATALOG_FILE))?;

        info!(
            "Opened warehouse at {} ({} namespaces)",
            root.display(),
            catalog.namespaces.len()
        );
        Ok(Self { root, catalog })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Location the table currently serves, if it has been loaded
    pub fn table_location(&self, table: &TableRef) -> Option<&str> {
        self.catalog.table(table).and_then(|t| t.location.as_deref())
    }

    pub fn partition_dir(&self, table: &TableRef, partition: &str) -> PathBuf {
        self.namespace_dir(&table.namespace)
            .join(&table.name)
            .join(partition)
    }

    fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.root.join(format!("{}.db", namespace))
    }

    /// Apply `change` to a copy of the catalog and persist it; the in-memory
    /// catalog is only replaced once the file is written.
    fn commit<F>(&mut self, change: F) -> Result<(), WarehouseError>
    where
        F: FnOnce(&mut Catalog) -> Result<(), WarehouseError>,
    {
        let mut next = self.catalog.clone();
        change(&mut next)?;
        next.save(&self.root.join(CATALOG_FILE))?;
        self.catalog = next;
        Ok(())
    }
}

impl TableStore for LocalWarehouse {
    fn ensure_namespace(&mut self, namespace: &str) -> Result<(), WarehouseError> {
        check_name(namespace)?;
        if self.catalog.namespace(namespace).is_some() {
            debug!("Namespace {} already exists", namespace);
            return Ok(());
        }

        let dir = self.namespace_dir(namespace);
        fs::create_dir_all(&dir)
            .map_err(|e| WarehouseError::io(format!("failed to create {}", dir.display()), e))?;

        info!("Creating namespace {}", namespace);
        let location = dir.display().to_string();
        self.commit(|catalog| {
            catalog.namespaces.insert(
                namespace.to_string(),
                NamespaceEntry {
                    location,
                    created_at: Utc::now(),
                    tables: BTreeMap::new(),
                },
            );
            Ok(())
        })
    }

    fn ensure_table(
        &mut self,
        table: &TableRef,
        schema: &TableSchema,
    ) -> Result<(), WarehouseError> {
        check_name(&table.name)?;
        if self.catalog.namespace(&table.namespace).is_none() {
            return Err(WarehouseError::UnknownNamespace(table.namespace.clone()));
        }

        if let Some(existing) = self.catalog.table(table) {
            if existing.schema != *schema {
                return Err(WarehouseError::SchemaMismatch {
                    table: table.to_string(),
                });
            }
            debug!("Table {} already exists", table);
            return Ok(());
        }

        info!("Creating table {} ({})", table, schema.describe());
        let now = Utc::now();
        let entry = TableEntry {
            schema: schema.clone(),
            format: "parquet".to_string(),
            location: None,
            created_at: now,
            updated_at: now,
        };
        self.commit(|catalog| {
            let ns = catalog
                .namespaces
                .get_mut(&table.namespace)
                .ok_or_else(|| WarehouseError::UnknownNamespace(table.namespace.clone()))?;
            ns.tables.insert(table.name.clone(), entry);
            Ok(())
        })
    }

    fn write_partition(
        &mut self,
        table: &TableRef,
        schema: &TableSchema,
        partition: &str,
        rows: &[NormalizedCityRow],
    ) -> Result<String, WarehouseError> {
        check_partition(partition)?;
        if self.catalog.table(table).is_none() {
            return Err(WarehouseError::UnknownTable(table.to_string()));
        }

        let dir = self.partition_dir(table, partition);
        if dir.exists() {
            info!("Overwriting existing partition {}", dir.display());
            fs::remove_dir_all(&dir).map_err(|e| {
                WarehouseError::io(format!("failed to clear {}", dir.display()), e)
            })?;
        }
        fs::create_dir_all(&dir)
            .map_err(|e| WarehouseError::io(format!("failed to create {}", dir.display()), e))?;

        let mut tmp = NamedTempFile::new_in(&dir).map_err(|e| {
            WarehouseError::io(format!("failed to stage data file in {}", dir.display()), e)
        })?;
        write_parquet(tmp.as_file_mut(), schema, rows)?;

        let target = dir.join(PART_FILE);
        tmp.persist(&target).map_err(|e| {
            WarehouseError::io(format!("failed to write {}", target.display()), e.error)
        })?;

        info!("Wrote {} rows to {}", rows.len(), target.display());
        Ok(dir.display().to_string())
    }

    fn set_location(&mut self, table: &TableRef, location: &str) -> Result<(), WarehouseError> {
        if self.catalog.table(table).is_none() {
            return Err(WarehouseError::UnknownTable(table.to_string()));
        }

        info!("Setting location of {} to {}", table, location);
        self.commit(|catalog| {
            let entry = catalog
                .table_mut(table)
                .ok_or_else(|| WarehouseError::UnknownTable(table.to_string()))?;
            entry.location = Some(location.to_string());
            entry.updated_at = Utc::now();
            Ok(())
        })
    }
}

/// A name must be usable as a single path component.
fn is_path_component(value: &str) -> bool {
    !value.is_empty() && value != "." && value != ".." && !value.contains(['/', '\\'])
}

fn check_name(name: &str) -> Result<(), WarehouseError> {
    if is_path_component(name) {
        Ok(())
    } else {
        Err(WarehouseError::InvalidName(name.to_string()))
    }
}

fn check_partition(partition: &str) -> Result<(), WarehouseError> {
    if is_path_component(partition) {
        Ok(())
    } else {
        Err(WarehouseError::InvalidPartition(partition.to_string()))
    }
}
