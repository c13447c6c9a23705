//! Columnar (Parquet) encoding of city rows.

use arrow::array::{ArrayRef, Float32Array, StringArray};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::io::Write;
use std::sync::Arc;
use tracing::debug;

use super::TableSchema;
use crate::error::WarehouseError;
use crate::models::NormalizedCityRow;

/// Data file name inside a partition directory
pub const PART_FILE: &str = "part-00000.snappy.parquet";

/// Build one record batch laid out as `schema`. Coordinates are narrowed to
/// `f32` to match the FLOAT columns.
pub fn record_batch(
    schema: &TableSchema,
    rows: &[NormalizedCityRow],
) -> Result<RecordBatch, WarehouseError> {
    let columns = schema
        .columns
        .iter()
        .map(|c| {
            column(&c.name, rows).ok_or_else(|| WarehouseError::UnknownColumn(c.name.clone()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RecordBatch::try_new(Arc::new(schema.to_arrow()), columns)?)
}

fn column(name: &str, rows: &[NormalizedCityRow]) -> Option<ArrayRef> {
    let array: ArrayRef = match name {
        "lat" => Arc::new(Float32Array::from_iter_values(rows.iter().map(|r| r.lat as f32))),
        "lon" => Arc::new(Float32Array::from_iter_values(rows.iter().map(|r| r.lon as f32))),
        "name" => Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.name))),
        "admin1" => Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.admin1))),
        "admin2" => Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.admin2))),
        "cc" => Arc::new(StringArray::from_iter_values(rows.iter().map(|r| &r.cc))),
        _ => return None,
    };
    Some(array)
}

/// Encode `rows` as a single-row-group Parquet file into `out`.
pub fn write_parquet<W: Write + Send>(
    out: W,
    schema: &TableSchema,
    rows: &[NormalizedCityRow],
) -> Result<(), WarehouseError> {
    let batch = record_batch(schema, rows)?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(out, batch.schema(), Some(props))?;

    debug!("Writing {} rows to parquet", batch.num_rows());
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
