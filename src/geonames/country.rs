//! Country reference table loaded from GeoNames `countryInfo.txt`.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::info;

use super::reader::{open_dump, TsvRecords};
use crate::error::{ParseError, RowError};

const CODE_COLUMN: usize = 0;
const NAME_COLUMN: usize = 4;

/// ISO 3166 alpha-2 code -> country display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountryReference {
    names: HashMap<String, String>,
}

impl CountryReference {
    /// Load from a `countryInfo.txt` file on disk
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let reader = open_dump(path)?;
        let countries = Self::from_reader(reader, &path.display().to_string())?;
        info!("Loaded {} countries", countries.len());
        Ok(countries)
    }

    /// Parse country rows from any reader. `file` only labels errors.
    ///
    /// Lines whose first column starts with `#` are comments. Fields may be
    /// `"` quoted. A later duplicate code replaces the earlier name.
    pub fn from_reader<R: Read>(reader: R, file: &str) -> Result<Self, ParseError> {
        let mut records = TsvRecords::new(reader, file, NAME_COLUMN + 1, true);
        let mut names = HashMap::new();

        while let Some((line, record)) = records.next_record()? {
            let code = record.get(CODE_COLUMN).unwrap_or_default();
            match code.chars().next() {
                Some('#') => continue,
                Some(_) => {}
                None => {
                    return Err(ParseError::row(
                        file,
                        line,
                        RowError::EmptyField {
                            field: "country code",
                        },
                    ))
                }
            }

            let name = record.get(NAME_COLUMN).ok_or_else(|| {
                ParseError::row(
                    file,
                    line,
                    RowError::MissingColumns {
                        expected: NAME_COLUMN + 1,
                        found: record.len(),
                    },
                )
            })?;

            names.insert(code.to_string(), name.to_string());
        }

        Ok(Self { names })
    }

    /// Display name for a country code
    pub fn get(&self, cc: &str) -> Option<&str> {
        self.names.get(cc).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for CountryReference {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
