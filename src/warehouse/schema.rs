//! Output table schema for the cities extract.

use arrow::datatypes::{DataType, Field, Schema};
use serde::{Deserialize, Serialize};

use crate::error::WarehouseError;

/// Schema JSON embedded at compile time
const CITIES_SCHEMA: &str = include_str!("../../schema/geonames_cities1000.json");

/// Column types supported by the table store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    /// 32-bit IEEE float
    Float,
    /// UTF-8 string
    String,
}

impl ColumnType {
    pub fn arrow_type(&self) -> DataType {
        match self {
            ColumnType::Float => DataType::Float32,
            ColumnType::String => DataType::Utf8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnSpec>,
}

impl TableSchema {
    /// Schema of the `geonames_cities1000` table
    pub fn cities() -> Result<Self, WarehouseError> {
        serde_json::from_str(CITIES_SCHEMA).map_err(WarehouseError::Schema)
    }

    pub fn to_arrow(&self) -> Schema {
        Schema::new(
            self.columns
                .iter()
                .map(|c| Field::new(c.name.as_str(), c.column_type.arrow_type(), false))
                .collect::<Vec<_>>(),
        )
    }

    /// `lat FLOAT, lon FLOAT, ...` form used in log lines
    pub fn describe(&self) -> String {
        self.columns
            .iter()
            .map(|c| {
                let ty = match c.column_type {
                    ColumnType::Float => "FLOAT",
                    ColumnType::String => "STRING",
                };
                format!("{} {}", c.name, ty)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
