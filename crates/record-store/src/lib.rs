//! # Record Store Crate
//!
//! Access to the shop's tables behind one async trait, so the storefront
//! never talks to a concrete backend.
//!
//! ## Main Components
//!
//! - **store**: `Table` and the `RecordStore` trait
//! - **query**: Equality predicates, ordering, limit and embedded lookups
//! - **memory**: `InMemoryStore` for tests and offline data files
//! - **rest**: `RestStore`, a reqwest client for a hosted PostgREST endpoint
//! - **auth**: Sessions and role checks for the admin gate
//! - **config**: `StoreConfig` loaded from the environment
//!
//! ## Example Usage
//!
//! ```ignore
//! use record_store::{Query, RecordStore, RestStore, StoreConfig, Table};
//!
//! let store = RestStore::new(StoreConfig::from_env()?)?;
//! let rows = store
//!     .list(Table::Phones, &Query::new().eq("is_sold", false).newest_first())
//!     .await?;
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod memory;
pub mod query;
pub mod rest;
pub mod store;

pub use auth::{
    RestSessionProvider, RoleChecker, Session, SessionProvider, SharedToken,
    StaticSessionProvider, StoreRoleChecker,
};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use query::{Direction, Embed, OrderBy, Query};
pub use rest::RestStore;
pub use store::{RecordStore, Table};
