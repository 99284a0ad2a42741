//! The FilterPipeline chains catalog filters.
//!
//! This module provides the FilterPipeline struct that composes filters with
//! the builder pattern, and a constructor that derives the pipeline from a
//! set of [`FilterCriteria`].

use crate::criteria::{BrandFilter, ConditionFilter, FilterCriteria, PriceRange};
use crate::filters::{BrandMatchFilter, ConditionMatchFilter, PriceRangeFilter, SearchTextFilter};
use crate::traits::Filter;
use phone_records::Phone;
use tracing::debug;

/// Chains multiple filters together into a processing pipeline.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(SearchTextFilter::new("galaxy"))
///     .add_filter(PriceRangeFilter::new(20000.0, 40000.0));
///
/// let visible = pipeline.apply(phones);
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Build the pipeline for a set of criteria.
    ///
    /// Only active criteria contribute a filter, in the order search, brand,
    /// condition, price. With every control at "all" the pipeline is empty
    /// and passes everything through.
    pub fn for_criteria(criteria: &FilterCriteria) -> Self {
        let mut pipeline = Self::new();

        if !criteria.search_text.is_empty() {
            pipeline = pipeline.add_filter(SearchTextFilter::new(&criteria.search_text));
        }
        if let BrandFilter::Only(brand) = &criteria.brand {
            pipeline = pipeline.add_filter(BrandMatchFilter::new(brand));
        }
        if let ConditionFilter::Only(label) = &criteria.condition {
            pipeline = pipeline.add_filter(ConditionMatchFilter::new(label));
        }
        // Bounds may arrive unchecked through the public variant or serde.
        if let PriceRange::Between { min, max } = criteria.price {
            if let PriceRange::Between { min, max } = PriceRange::between(min, max) {
                pipeline = pipeline.add_filter(PriceRangeFilter::new(min, max));
            }
        }
        pipeline
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Number of active filters.
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of the filters in application order.
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Apply all filters in sequence.
    ///
    /// Survivors keep their relative order from `phones`.
    pub fn apply(&self, phones: Vec<Phone>) -> Vec<Phone> {
        let mut current = phones;
        for filter in &self.filters {
            let before = current.len();
            current = filter.apply(current);
            debug!(
                "Applied filter: {} ({} -> {})",
                filter.name(),
                before,
                current.len()
            );
        }
        current
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
