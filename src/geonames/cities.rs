//! Administrative city extraction from the GeoNames `cities1000` dump.

use indicatif::{ProgressBar, ProgressStyle};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::reader::{open_dump, TsvRecords};
use super::CountryReference;
use crate::error::{ParseError, RowError};
use crate::models::{
    AdminOverrideTable, FeatureCode, NormalizedCityRow, RawCityRecord, CITY_COLUMNS,
};

/// Rows kept from one pass over the cities dump
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CityScan {
    /// Normalized rows in source line order
    pub rows: Vec<NormalizedCityRow>,
    /// Records read from the dump
    pub lines: u64,
    /// Records dropped by the feature code filter
    pub discarded: u64,
}

/// Filters GeoNames city records to administrative seats and normalizes them.
pub struct CityNormalizer<'a> {
    countries: &'a CountryReference,
    overrides: &'static AdminOverrideTable,
}

impl<'a> CityNormalizer<'a> {
    pub fn new(countries: &'a CountryReference) -> Self {
        Self {
            countries,
            overrides: AdminOverrideTable::global(),
        }
    }

    /// Normalize one record. `Ok(None)` means the record is not an
    /// administrative city and is dropped.
    pub fn normalize(&self, raw: &RawCityRecord) -> Result<Option<NormalizedCityRow>, RowError> {
        if FeatureCode::from_code(raw.feature_code).is_none() {
            return Ok(None);
        }

        let cc = raw.country_code;
        let admin1 = self.overrides.resolve(cc, raw.admin1_code);
        if admin1 != raw.admin1_code {
            debug!(
                "{} ({}): admin1 override {} -> {}",
                raw.ascii_name,
                raw.admin2_key(),
                raw.admin1_key(),
                admin1
            );
        }
        // admin2 holds the country name, not a second-level division
        let admin2 = self.countries.get(cc).unwrap_or_default().to_string();

        let lat = parse_coordinate("latitude", raw.latitude, 90.0)?;
        let lon = parse_coordinate("longitude", raw.longitude, 180.0)?;

        if raw.ascii_name.is_empty() {
            return Err(RowError::EmptyField { field: "asciiName" });
        }
        if cc.is_empty() {
            return Err(RowError::EmptyField {
                field: "countryCode",
            });
        }

        Ok(Some(NormalizedCityRow {
            lat,
            lon,
            name: raw.ascii_name.to_string(),
            admin1,
            admin2,
            cc: cc.to_string(),
        }))
    }

    /// Scan a whole dump. The first malformed line aborts the scan.
    pub fn scan<R: Read>(&self, reader: R, file: &str) -> Result<CityScan, ParseError> {
        let mut records = TsvRecords::new(reader, file, CITY_COLUMNS, false);
        let mut scan = CityScan::default();

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} lines ({per_sec}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );

        while let Some((line, record)) = records.next_record()? {
            scan.lines += 1;
            pb.inc(1);

            let fields: Vec<&str> = record.iter().collect();
            let raw = RawCityRecord::from_fields(&fields).ok_or_else(|| {
                ParseError::row(
                    file,
                    line,
                    RowError::MissingColumns {
                        expected: CITY_COLUMNS,
                        found: fields.len(),
                    },
                )
            })?;

            match self
                .normalize(&raw)
                .map_err(|e| ParseError::row(file, line, e))?
            {
                Some(row) => scan.rows.push(row),
                None => scan.discarded += 1,
            }
        }

        pb.finish_and_clear();
        info!(
            "Scanned {} city records: kept {}, discarded {}",
            scan.lines,
            scan.rows.len(),
            scan.discarded
        );
        Ok(scan)
    }
}

/// Load and normalize the cities dump at `path`
pub fn load_cities(path: &Path, countries: &CountryReference) -> Result<CityScan, ParseError> {
    let reader = open_dump(path)?;
    CityNormalizer::new(countries).scan(reader, &path.display().to_string())
}

fn parse_coordinate(field: &'static str, value: &str, limit: f64) -> Result<f64, RowError> {
    let invalid = || RowError::InvalidCoordinate {
        field,
        value: value.to_string(),
    };
    let parsed: f64 = value.trim().parse().map_err(|_| invalid())?;
    if !parsed.is_finite() || parsed.abs() > limit {
        return Err(invalid());
    }
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn city_line(name: &str, lat: &str, lon: &str, code: &str, cc: &str, admin1: &str) -> String {
        [
            "1", name, name, "", lat, lon, "P", code, cc, "", admin1, "A2", "", "", "1000", "",
            "10", "Etc/UTC", "2024-01-01",
        ]
        .join("\t")
    }

    fn countries() -> CountryReference {
        [("US", "United States"), ("CA", "Canada"), ("AU", "Australia")]
            .into_iter()
            .collect()
    }

    fn scan(input: &str, countries: &CountryReference) -> Result<CityScan, ParseError> {
        CityNormalizer::new(countries).scan(input.as_bytes(), "cities1000.txt")
    }

    #[test]
    fn test_washington_example() {
        let input = city_line("Washington", "38.90", "-77.04", "PPLC", "US", "DC");
        let result = scan(&input, &countries()).unwrap();
        assert_eq!(
            result.rows,
            vec![NormalizedCityRow {
                lat: 38.90,
                lon: -77.04,
                name: "Washington".to_string(),
                admin1: "DC".to_string(),
                admin2: "United States".to_string(),
                cc: "US".to_string(),
            }]
        );
    }

    #[test]
    fn test_canadian_override_ignores_country_reference() {
        let input = city_line("Toronto", "43.70", "-79.42", "PPLA", "CA", "08");
        for reference in [countries(), CountryReference::default()] {
            let result = scan(&input, &reference).unwrap();
            assert_eq!(result.rows[0].admin1, "ON");
        }
    }

    #[test]
    fn test_unknown_country_leaves_admin2_empty() {
        let input = city_line("Paris", "48.85", "2.35", "PPLC", "FR", "11");
        let result = scan(&input, &countries()).unwrap();
        assert_eq!(result.rows[0].admin1, "11");
        assert_eq!(result.rows[0].admin2, "");
        assert_eq!(result.rows[0].cc, "FR");
    }

    #[test]
    fn test_feature_filter_and_order() {
        let lines = [
            city_line("Canberra", "-35.28", "149.13", "PPLC", "AU", "01"),
            city_line("Village", "10.0", "10.0", "PPL", "US", "NY"),
            city_line("Perth", "-31.95", "115.86", "PPLA", "AU", "08"),
            city_line("Ruins", "10.0", "10.0", "PPLH", "US", "NY"),
            city_line("Albany", "42.65", "-73.75", "PPLA", "US", "NY"),
            city_line("Seat", "1.0", "1.0", "PPLA5", "US", "NY"),
        ]
        .join("\n");
        let result = scan(&lines, &countries()).unwrap();

        let names: Vec<&str> = result.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["Canberra", "Perth", "Albany", "Seat"]);
        assert_eq!(result.lines, 6);
        assert_eq!(result.discarded, 2);
        assert_eq!(result.rows[0].admin1, "ACT");
        assert_eq!(result.rows[1].admin1, "WA");
        assert_eq!(result.rows[1].admin2, "Australia");
    }

    #[test]
    fn test_embedded_quotes_do_not_merge_fields() {
        let input = city_line("\"Old\" Town", "12.5", "-3.25", "PPLA2", "US", "TX");
        let result = scan(&input, &countries()).unwrap();
        assert_eq!(result.rows[0].name, "\"Old\" Town");
        assert_eq!(result.rows[0].admin1, "TX");
        assert_eq!(result.rows[0].lat, 12.5);
    }

    #[test]
    fn test_short_line_aborts_with_line_number() {
        let input = format!(
            "{}\n1\tShort\tShort\t\t1.0\t1.0\tP\tPPLC\n",
            city_line("Albany", "42.65", "-73.75", "PPLA", "US", "NY")
        );
        let err = scan(&input, &countries()).unwrap_err();
        match err {
            ParseError::Row { line, source, .. } => {
                assert_eq!(line, 2);
                assert_eq!(
                    source,
                    RowError::MissingColumns {
                        expected: CITY_COLUMNS,
                        found: 8
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_blank_line_aborts_with_line_number() {
        let input = format!(
            "{}\n\n{}\n",
            city_line("Ottawa", "45.41", "-75.70", "PPLC", "CA", "08"),
            city_line("Quebec", "46.81", "-71.21", "PPLA", "CA", "10")
        );
        let err = scan(&input, &countries()).unwrap_err();
        match err {
            ParseError::Row { line, source, .. } => {
                assert_eq!(line, 2);
                assert_eq!(
                    source,
                    RowError::MissingColumns {
                        expected: CITY_COLUMNS,
                        found: 0
                    }
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_bad_coordinate_is_fatal() {
        let input = city_line("Nowhere", "north", "1.0", "PPLC", "US", "DC");
        let err = scan(&input, &countries()).unwrap_err();
        assert!(matches!(
            err,
            ParseError::Row {
                source: RowError::InvalidCoordinate {
                    field: "latitude",
                    ..
                },
                ..
            }
        ));

        let input = city_line("Nowhere", "1.0", "181.0", "PPLC", "US", "DC");
        assert!(scan(&input, &countries()).is_err());
    }

    #[test]
    fn test_bad_coordinate_on_filtered_line_is_ignored() {
        let input = city_line("Hamlet", "n/a", "n/a", "PPL", "US", "DC");
        let result = scan(&input, &countries()).unwrap();
        assert!(result.rows.is_empty());
        assert_eq!(result.discarded, 1);
    }

    #[test]
    fn test_empty_name_is_fatal() {
        let input = city_line("", "1.0", "1.0", "PPLC", "US", "DC");
        assert!(scan(&input, &countries()).is_err());
    }

    #[test]
    fn test_scan_is_deterministic() {
        let lines = [
            city_line("Ottawa", "45.41", "-75.70", "PPLC", "CA", "08"),
            city_line("Quebec", "46.81", "-71.21", "PPLA", "CA", "10"),
        ]
        .join("\n");
        let first = scan(&lines, &countries()).unwrap();
        let second = scan(&lines, &countries()).unwrap();
        assert_eq!(
            serde_json::to_string(&first.rows).unwrap(),
            serde_json::to_string(&second.rows).unwrap()
        );
    }

    #[test]
    fn test_load_gzipped_dump() {
        let lines = [
            city_line("Ottawa", "45.41", "-75.70", "PPLC", "CA", "08"),
            city_line("Town", "45.0", "-75.0", "PPL", "CA", "08"),
        ]
        .join("\n");

        let dir = tempfile::tempdir().unwrap();
        let plain = dir.path().join("cities1000.txt");
        std::fs::write(&plain, &lines).unwrap();

        let gz = dir.path().join("cities1000.txt.gz");
        let file = std::fs::File::create(&gz).unwrap();
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(lines.as_bytes()).unwrap();
        encoder.finish().unwrap();

        let reference = countries();
        let from_plain = load_cities(&plain, &reference).unwrap();
        let from_gz = load_cities(&gz, &reference).unwrap();
        assert_eq!(from_plain, from_gz);
        assert_eq!(from_gz.rows.len(), 1);
        assert_eq!(from_gz.rows[0].admin1, "ON");
        assert_eq!(from_gz.rows[0].admin2, "Canada");
    }
}
