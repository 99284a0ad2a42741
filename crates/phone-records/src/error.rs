//! Error types for the phone-records crate.
//!
//! Every row that comes back from the record store goes through a single
//! parse step. When a row is missing a required field or carries a value of
//! the wrong shape, one of these variants describes what went wrong.

use thiserror::Error;

/// Errors raised while turning raw store rows into typed records.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The row was not a JSON object at all
    #[error("Expected a JSON object but found {found}")]
    NotAnObject { found: String },

    /// A required column was absent or null
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A column held a value of the wrong JSON type
    #[error("Field {field} has the wrong type, expected {expected}")]
    WrongType {
        field: String,
        expected: &'static str,
    },

    /// A column had the right type but an unacceptable value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// A row inside a batch failed to parse
    ///
    /// Carries the zero-based position of the row in the batch so the
    /// offending record can be located in the store.
    #[error("Row {index} rejected: {source}")]
    Row {
        index: usize,
        #[source]
        source: Box<RecordError>,
    },
}

impl RecordError {
    pub(crate) fn missing(field: &str) -> Self {
        RecordError::MissingField {
            field: field.to_string(),
        }
    }

    pub(crate) fn wrong_type(field: &str, expected: &'static str) -> Self {
        RecordError::WrongType {
            field: field.to_string(),
            expected,
        }
    }

    pub(crate) fn invalid(field: &str, value: impl ToString) -> Self {
        RecordError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    pub(crate) fn at_row(self, index: usize) -> Self {
        RecordError::Row {
            index,
            source: Box::new(self),
        }
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, RecordError>;
