//! One full extract: load, normalize, validate, publish.

use std::path::PathBuf;
use tracing::info;

use crate::error::{ParseError, RunError};
use crate::geonames::{load_cities, CityScan, CountryReference};
use crate::validate::RowValidator;
use crate::warehouse::{BatchEmitter, EmitSummary, TableRef, TableStore};

/// Local copies of the GeoNames dumps, fetched and unpacked beforehand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sources {
    pub cities: PathBuf,
    pub countries: PathBuf,
}

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub table: TableRef,
    pub partition: String,
    pub min_rows: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub lines: u64,
    pub discarded: u64,
    pub emitted: EmitSummary,
}

/// Build the normalized row set from the two dumps. Touches no table store.
pub fn extract(sources: &Sources) -> Result<CityScan, ParseError> {
    let countries = CountryReference::from_path(&sources.countries)?;
    load_cities(&sources.cities, &countries)
}

/// Extract, check the row count and publish into `store`.
///
/// Nothing is written when extraction or validation fails.
pub fn run<S: TableStore>(
    sources: &Sources,
    store: &mut S,
    options: &RunOptions,
) -> Result<RunSummary, RunError> {
    info!(
        "Extracting {} for partition {}",
        options.table, options.partition
    );

    let scan = extract(sources)?;
    RowValidator::new(options.min_rows).check(&scan.rows)?;

    let emitted = BatchEmitter::cities(store, options.table.clone())?
        .emit(&scan.rows, &options.partition)?;

    Ok(RunSummary {
        lines: scan.lines,
        discarded: scan.discarded,
        emitted,
    })
}
