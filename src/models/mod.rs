//! Core data models for the GeoNames city extract.

pub mod admin;
pub mod city;

pub use admin::{AdminOverrideTable, FeatureCode};
pub use city::{NormalizedCityRow, RawCityRecord, CITY_COLUMNS};
