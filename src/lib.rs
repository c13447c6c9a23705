//! geonames-cities - GeoNames administrative city extract
//!
//! This library provides the parsing, normalization and publishing stages
//! used by the `ingest` binary.

pub mod discord;
pub mod error;
pub mod geonames;
pub mod models;
pub mod pipeline;
pub mod report;
pub mod validate;
pub mod warehouse;

pub use error::{ParseError, RunError, ValidationError, WarehouseError};
pub use models::{AdminOverrideTable, FeatureCode, NormalizedCityRow, RawCityRecord};
pub use pipeline::{extract, run, RunOptions, RunSummary, Sources};
pub use report::{FailureKind, FailureReport};
