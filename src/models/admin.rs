//! Administrative classification rules for GeoNames cities.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::LazyLock;

/// GeoNames feature codes for capitals and seats of administrative divisions.
/// See: https://www.geonames.org/export/codes.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum FeatureCode {
    /// Capital of a political entity
    Pplc,
    /// Seat of a first-order administrative division
    Ppla,
    /// Seat of a second-order administrative division
    Ppla2,
    /// Seat of a third-order administrative division
    Ppla3,
    /// Seat of a fourth-order administrative division
    Ppla4,
    /// Seat of a fifth-order administrative division
    Ppla5,
}

impl FeatureCode {
    /// Parse a raw featureCode column. Anything outside the administrative
    /// seat classes yields `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "PPLC" => Some(FeatureCode::Pplc),
            "PPLA" => Some(FeatureCode::Ppla),
            "PPLA2" => Some(FeatureCode::Ppla2),
            "PPLA3" => Some(FeatureCode::Ppla3),
            "PPLA4" => Some(FeatureCode::Ppla4),
            "PPLA5" => Some(FeatureCode::Ppla5),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureCode::Pplc => "PPLC",
            FeatureCode::Ppla => "PPLA",
            FeatureCode::Ppla2 => "PPLA2",
            FeatureCode::Ppla3 => "PPLA3",
            FeatureCode::Ppla4 => "PPLA4",
            FeatureCode::Ppla5 => "PPLA5",
        }
    }

    /// All included feature codes, national capital first
    pub fn all() -> &'static [FeatureCode] {
        &[
            FeatureCode::Pplc,
            FeatureCode::Ppla,
            FeatureCode::Ppla2,
            FeatureCode::Ppla3,
            FeatureCode::Ppla4,
            FeatureCode::Ppla5,
        ]
    }
}

impl std::fmt::Display for FeatureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical postal abbreviations for Canadian provinces and Australian
/// states, keyed by `{countryCode}.{admin1Code}`.
const ADMIN1_OVERRIDES: &[(&str, &str)] = &[
    ("CA.01", "AB"),
    ("CA.02", "BC"),
    ("CA.03", "MB"),
    ("CA.04", "NB"),
    ("CA.05", "NL"),
    ("CA.07", "NS"),
    ("CA.08", "ON"),
    ("CA.09", "PE"),
    ("CA.10", "QC"),
    ("CA.11", "SK"),
    ("CA.12", "YT"),
    ("CA.13", "NT"),
    ("CA.14", "NU"),
    ("AU.01", "ACT"),
    ("AU.02", "NSW"),
    ("AU.03", "NT"),
    ("AU.04", "QLD"),
    ("AU.05", "SA"),
    ("AU.06", "TAS"),
    ("AU.07", "VIC"),
    ("AU.08", "WA"),
];

static OVERRIDES: LazyLock<AdminOverrideTable> = LazyLock::new(|| AdminOverrideTable {
    codes: ADMIN1_OVERRIDES.iter().copied().collect(),
});

/// Fixed admin1 remapping that takes precedence over the raw GeoNames code.
#[derive(Debug)]
pub struct AdminOverrideTable {
    codes: HashMap<&'static str, &'static str>,
}

impl AdminOverrideTable {
    /// The process-wide table
    pub fn global() -> &'static AdminOverrideTable {
        &OVERRIDES
    }

    /// Look up a `{cc}.{admin1}` key
    pub fn get(&self, key: &str) -> Option<&'static str> {
        self.codes.get(key).copied()
    }

    /// Resolve the admin1 value for a city: the override when one exists,
    /// otherwise the raw code unchanged.
    pub fn resolve(&self, cc: &str, admin1_code: &str) -> String {
        let key = format!("{}.{}", cc, admin1_code);
        match self.get(&key) {
            Some(code) => code.to_string(),
            None => admin1_code.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}
