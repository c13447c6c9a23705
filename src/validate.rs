//! Batch size check guarding the published table against truncated dumps.

use tracing::{info, warn};

use crate::error::ValidationError;
use crate::models::NormalizedCityRow;

/// Row count a healthy `cities1000` extract must exceed.
pub const DEFAULT_MIN_ROWS: usize = 30_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowValidator {
    min_rows: usize,
}

impl Default for RowValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_ROWS)
    }
}

impl RowValidator {
    pub fn new(min_rows: usize) -> Self {
        Self { min_rows }
    }

    pub fn min_rows(&self) -> usize {
        self.min_rows
    }

    /// Accept the batch only when it holds strictly more than `min_rows` rows.
    pub fn check(&self, rows: &[NormalizedCityRow]) -> Result<usize, ValidationError> {
        let count = rows.len();
        if count <= self.min_rows {
            warn!(
                "Rejecting batch: {} rows (threshold {})",
                count, self.min_rows
            );
            return Err(ValidationError::TooFewRows {
                rows: count,
                min_rows: self.min_rows,
            });
        }

        info!("Batch accepted with {} rows", count);
        Ok(count)
    }
}
