//! Errors returned by record store implementations.

use phone_records::RecordError;
use thiserror::Error;

use crate::store::Table;

/// Errors that can occur when talking to the record store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store answered with a non-success status
    #[error("Record store returned {status}: {message}")]
    Http { status: u16, message: String },

    /// The request never completed (connection refused, timeout, TLS...)
    #[error("Failed to reach record store: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not the JSON we expected
    #[error("Invalid JSON from record store: {0}")]
    Decode(#[from] serde_json::Error),

    /// The response was well-formed JSON but not shaped as expected
    #[error("Unexpected response from record store: {0}")]
    Protocol(String),

    /// A row came back but failed record validation
    #[error("Invalid row from record store: {0}")]
    Record(#[from] RecordError),

    #[error("No row in {table} with id {id}")]
    NotFound { table: Table, id: String },

    #[error("Record store lock poisoned: {0}")]
    Lock(String),

    #[error("Invalid store configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
