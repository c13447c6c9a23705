//! GeoNames dump parsing.
//!
//! Loads the country reference table and extracts normalized administrative
//! cities from the `cities1000` dump.

mod cities;
mod country;
mod reader;

pub use cities::{load_cities, CityNormalizer, CityScan};
pub use country::CountryReference;
