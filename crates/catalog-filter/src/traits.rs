//! Core traits for the catalog filter pipeline.
//!
//! This module defines the Filter trait that lets each catalog control be
//! written as its own small predicate and composed in a FilterPipeline.

use phone_records::Phone;

/// A single catalog predicate.
///
/// ## Design Note
/// - `Send + Sync` allows pipelines to be shared across tasks
/// - Filters never mutate a phone; they only decide whether it stays
/// - `apply` takes ownership and keeps the survivors in their original order
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Whether `phone` passes this filter.
    fn matches(&self, phone: &Phone) -> bool;

    /// Keep the phones that pass, preserving their relative order.
    fn apply(&self, phones: Vec<Phone>) -> Vec<Phone> {
        phones.into_iter().filter(|phone| self.matches(phone)).collect()
    }
}
