//! Catalog filter engine for the storefront.
//!
//! This crate provides:
//! - FilterCriteria, the four catalog controls and their "all" defaults
//! - Filter trait and one implementation per control
//! - FilterPipeline for composing the active filters
//! - CatalogView, the memoized view model a catalog page renders from
//!
//! ## Semantics
//! A phone is visible when it passes every active control:
//! 1. Search text: case-insensitive substring of model or brand
//! 2. Brand: case-insensitive equality
//! 3. Condition: exact label equality
//! 4. Price: inclusive `min <= price <= max`
//!
//! The output is always an order-preserving subsequence of the input, and
//! the engine never fails: malformed criteria mean "no constraint".
//!
//! ## Example Usage
//! ```ignore
//! use catalog_filter::{apply_filters, FilterCriteria};
//!
//! let criteria = FilterCriteria::from_raw("galaxy", "all", "all", "20000-40000");
//! let visible = apply_filters(&phones, &criteria);
//! ```

pub mod criteria;
pub mod traits;
pub mod filters;
pub mod filter_pipeline;
pub mod view;

// Re-export main types
pub use criteria::{BrandFilter, ConditionFilter, FilterCriteria, PriceRange};
pub use traits::Filter;
pub use filter_pipeline::FilterPipeline;
pub use view::{CatalogView, FetchTicket, ListingState, Visible};

use phone_records::Phone;

/// Compute the visible subset of `products` for `criteria`.
///
/// Pure and total: the same inputs always give the same output, and the
/// input slice is left untouched.
pub fn apply_filters(products: &[Phone], criteria: &FilterCriteria) -> Vec<Phone> {
    FilterPipeline::for_criteria(criteria).apply(products.to_vec())
}
