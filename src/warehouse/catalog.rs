//! JSON catalog describing namespaces, tables and their served locations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use super::{TableRef, TableSchema};
use crate::error::WarehouseError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub namespaces: BTreeMap<String, NamespaceEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceEntry {
    pub location: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub tables: BTreeMap<String, TableEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub schema: TableSchema,
    /// Storage format of the partitions (always "parquet")
    pub format: String,
    /// Partition currently served; unset until the first load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Catalog {
    /// Read the catalog; a missing file is an empty catalog.
    pub fn load(path: &Path) -> Result<Self, WarehouseError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            WarehouseError::io(format!("failed to read catalog {}", path.display()), e)
        })?;
        serde_json::from_str(&content).map_err(|source| WarehouseError::CatalogRead {
            path: path.display().to_string(),
            source,
        })
    }

    /// Replace the catalog file atomically: readers see either the old or the
    /// new version, never a partial write.
    pub fn save(&self, path: &Path) -> Result<(), WarehouseError> {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| {
            WarehouseError::io(format!("failed to stage catalog in {}", dir.display()), e)
        })?;

        serde_json::to_writer_pretty(&mut tmp, self).map_err(WarehouseError::CatalogWrite)?;
        tmp.flush()
            .map_err(|e| WarehouseError::io("failed to flush catalog", e))?;
        tmp.persist(path).map_err(|e| {
            WarehouseError::io(format!("failed to replace {}", path.display()), e.error)
        })?;
        Ok(())
    }

    pub fn namespace(&self, name: &str) -> Option<&NamespaceEntry> {
        self.namespaces.get(name)
    }

    pub fn table(&self, table: &TableRef) -> Option<&TableEntry> {
        self.namespaces
            .get(&table.namespace)
            .and_then(|ns| ns.tables.get(&table.name))
    }

    pub fn table_mut(&mut self, table: &TableRef) -> Option<&mut TableEntry> {
        self.namespaces
            .get_mut(&table.namespace)
            .and_then(|ns| ns.tables.get_mut(&table.name))
    }
}
