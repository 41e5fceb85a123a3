use cadence_domain::DomainError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Series not found: {0}")]
    SeriesNotFound(Uuid),
    #[error("Occurrence {index} not found in series {series_id}")]
    OccurrenceNotFound { series_id: Uuid, index: u32 },
    #[error("Series {0} does not recur; edit the series instead of one occurrence")]
    NotRecurring(Uuid),
    #[error("Occurrence index {index} is past the last occurrence (series has {total})")]
    IndexOutOfRange { index: u32, total: u32 },
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    #[error("Validation failed: {0}")]
    Validation(#[from] DomainError),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(String),
}

impl CoreError {
    /// True for lookups that failed because something does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::SeriesNotFound(_) | CoreError::OccurrenceNotFound { .. }
        )
    }

    /// True for requests rejected because of their arguments.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            CoreError::NotRecurring(_)
                | CoreError::IndexOutOfRange { .. }
                | CoreError::InvalidOperation(_)
                | CoreError::Validation(_)
        )
    }
}
