//! Filter implementations for the catalog pipeline.
//!
//! One filter per catalog control. Each is only added to a pipeline when its
//! control is active, so none of them has to handle the "all" sentinel.

pub mod brand;
pub mod condition;
pub mod price_range;
pub mod search_text;

// Re-export for convenience
pub use brand::BrandMatchFilter;
pub use condition::ConditionMatchFilter;
pub use price_range::PriceRangeFilter;
pub use search_text::SearchTextFilter;
