//! The record store seam: tables and the async trait every backend implements.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{Result, StoreError};
use crate::query::Query;

/// Tables the shop reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Phones,
    Inquiries,
    SpecificRequests,
    ContactSubmissions,
    UserRoles,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Phones,
        Table::Inquiries,
        Table::SpecificRequests,
        Table::ContactSubmissions,
        Table::UserRoles,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Table::Phones => "phones",
            Table::Inquiries => "inquiries",
            Table::SpecificRequests => "specific_requests",
            Table::ContactSubmissions => "contact_submissions",
            Table::UserRoles => "user_roles",
        }
    }

    pub fn from_name(name: &str) -> Option<Table> {
        Table::ALL.into_iter().find(|t| t.name() == name)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Table {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Table::from_name(s).ok_or_else(|| StoreError::Protocol(format!("unknown table {s:?}")))
    }
}

/// Row storage keyed by table.
///
/// Rows travel as raw JSON; callers parse them into typed records at the
/// boundary. Implementations must be safe to share across tasks.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows matching `query`, in the query's order.
    async fn list(&self, table: Table, query: &Query) -> Result<Vec<Value>>;

    async fn get_by_id(&self, table: Table, id: &str) -> Result<Option<Value>>;

    /// Insert a row and return it as stored (with `id` and `created_at`).
    async fn insert(&self, table: Table, row: Value) -> Result<Value>;

    /// Merge the fields of `patch` into the row with `id`.
    ///
    /// Fails with [`StoreError::NotFound`] when no row has that id.
    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<Value>;

    /// Delete the row with `id`, returning how many rows went away.
    ///
    /// Zero is not an error here: a store may silently refuse a delete the
    /// caller isn't allowed to make.
    async fn delete(&self, table: Table, id: &str) -> Result<u64>;

    async fn count(&self, table: Table) -> Result<u64>;
}
