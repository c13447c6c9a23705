//! Structured run failure report printed for the operator and scheduler.

use serde::Serialize;

use crate::error::{error_chain, RunError, ValidationError};

/// Failure category, serialized as the report's `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    /// Row count check failed
    #[serde(rename = "Geonames Data Error")]
    DataError,
    /// Parsing, table registration or writing failed
    #[serde(rename = "Error Loading Geonames")]
    LoadError,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::DataError => write!(f, "Geonames Data Error"),
            FailureKind::LoadError => write!(f, "Error Loading Geonames"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureReport {
    pub status: &'static str,
    #[serde(rename = "type")]
    pub kind: FailureKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rows: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FailureReport {
    pub fn data_error(rows: usize) -> Self {
        Self {
            status: "ERROR",
            kind: FailureKind::DataError,
            rows: Some(rows),
            error: None,
        }
    }

    pub fn load_error(detail: impl Into<String>) -> Self {
        Self {
            status: "ERROR",
            kind: FailureKind::LoadError,
            rows: None,
            error: Some(detail.into()),
        }
    }

    /// Single-line JSON form
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"status":"{}","type":"{}"}}"#, self.status, self.kind)
        })
    }
}

impl From<&RunError> for FailureReport {
    fn from(err: &RunError) -> Self {
        match err {
            RunError::Validation(ValidationError::TooFewRows { rows, .. }) => {
                FailureReport::data_error(*rows)
            }
            RunError::Parse(_) | RunError::Warehouse(_) => {
                FailureReport::load_error(error_chain(err))
            }
        }
    }
}
