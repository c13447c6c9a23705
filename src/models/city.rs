//! City records: the raw GeoNames dump line and the normalized output row.

use serde::{Deserialize, Serialize};

/// Number of tab-separated columns in a GeoNames `cities1000.txt` line.
pub const CITY_COLUMNS: usize = 19;

/// One line of the GeoNames cities dump, borrowed from the parsed record.
///
/// Every field is kept as text exactly as received; numeric columns are
/// typed later during normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawCityRecord<'a> {
    pub geoname_id: &'a str,
    pub name: &'a str,
    pub ascii_name: &'a str,
    pub alternate_names: &'a str,
    pub latitude: &'a str,
    pub longitude: &'a str,
    pub feature_class: &'a str,
    pub feature_code: &'a str,
    pub country_code: &'a str,
    pub cc2: &'a str,
    pub admin1_code: &'a str,
    pub admin2_code: &'a str,
    pub admin3_code: &'a str,
    pub admin4_code: &'a str,
    pub population: &'a str,
    pub elevation: &'a str,
    pub dem: &'a str,
    pub timezone: &'a str,
    pub modification_date: &'a str,
}

impl<'a> RawCityRecord<'a> {
    /// Map split columns onto the fixed GeoNames layout.
    ///
    /// Returns `None` when the line has fewer than [`CITY_COLUMNS`] fields.
    /// Extra trailing fields are ignored.
    pub fn from_fields(fields: &[&'a str]) -> Option<Self> {
        let [
            geoname_id,
            name,
            ascii_name,
            alternate_names,
            latitude,
            longitude,
            feature_class,
            feature_code,
            country_code,
            cc2,
            admin1_code,
            admin2_code,
            admin3_code,
            admin4_code,
            population,
            elevation,
            dem,
            timezone,
            modification_date,
            ..
        ] = *fields
        else {
            return None;
        };

        Some(Self {
            geoname_id,
            name,
            ascii_name,
            alternate_names,
            latitude,
            longitude,
            feature_class,
            feature_code,
            country_code,
            cc2,
            admin1_code,
            admin2_code,
            admin3_code,
            admin4_code,
            population,
            elevation,
            dem,
            timezone,
            modification_date,
        })
    }

    /// `{cc}.{admin1}` key used for the admin1 override lookup
    pub fn admin1_key(&self) -> String {
        format!("{}.{}", self.country_code, self.admin1_code)
    }

    /// `{cc}.{admin1}.{admin2}` key. Never looked up; kept so the full
    /// administrative path of a record can be logged.
    pub fn admin2_key(&self) -> String {
        format!(
            "{}.{}.{}",
            self.country_code, self.admin1_code, self.admin2_code
        )
    }
}

/// One output row of the `geonames_cities1000` table.
///
/// `admin2` carries the country display name (or empty when the country is
/// unknown), matching what downstream consumers of the table expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedCityRow {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub admin1: String,
    pub admin2: String,
    pub cc: String,
}
