//! Table store: catalog registration and columnar partition writes.

mod catalog;
mod emitter;
mod local;
mod partition;
mod schema;
mod store;

pub use catalog::{Catalog, NamespaceEntry, TableEntry};
pub use emitter::{BatchEmitter, EmitSummary};
pub use local::{LocalWarehouse, CATALOG_FILE};
pub use partition::{record_batch, write_parquet, PART_FILE};
pub use schema::{ColumnSpec, ColumnType, TableSchema};
pub use store::{TableRef, TableStore};
