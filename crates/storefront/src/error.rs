//! Storefront errors and the notices shown for them.

use phone_records::RecordError;
use record_store::{StoreError, Table};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorefrontError {
    /// A form field failed validation; carries the first violation only
    #[error("{field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("You don't have admin privileges.")]
    AccessDenied,

    #[error("No {table} row with id {id}")]
    NotFound { table: Table, id: String },

    /// The store accepted the delete but removed nothing, usually because
    /// row permissions hid the row from this user
    #[error("Item could not be deleted. You might not have permission.")]
    NothingDeleted { table: Table, id: String },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Record(#[from] RecordError),
}

impl StorefrontError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        StorefrontError::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// The advisory message a user sees for this error.
    pub fn notice(&self) -> Notice {
        match self {
            StorefrontError::Validation { reason, .. } => {
                Notice::error("Validation Error", reason.clone())
            }
            StorefrontError::NotAuthenticated => {
                Notice::error("Sign In Required", "Please sign in to continue.")
            }
            StorefrontError::AccessDenied => Notice::error("Access Denied", self.to_string()),
            StorefrontError::NothingDeleted { .. } => Notice::error("Delete Failed", self.to_string()),
            StorefrontError::NotFound { .. } => Notice::error("Not Found", self.to_string()),
            StorefrontError::Store(StoreError::Http { message, .. }) => {
                Notice::error("Error", message.clone())
            }
            StorefrontError::Store(_) | StorefrontError::Record(_) => {
                Notice::error("Error", "An unexpected error occurred")
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, StorefrontError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Severity {
    Success,
    Error,
}

/// A short message for the user about the outcome of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl Notice {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
