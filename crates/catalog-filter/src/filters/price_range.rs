//! Price bucket filter.

use crate::traits::Filter;
use phone_records::Phone;

/// Keeps phones priced within `[min, max]`, both ends included.
pub struct PriceRangeFilter {
    min: f64,
    max: f64,
}

impl PriceRangeFilter {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl Filter for PriceRangeFilter {
    fn name(&self) -> &str {
        "PriceRangeFilter"
    }

    fn matches(&self, phone: &Phone) -> bool {
        phone.price >= self.min && phone.price <= self.max
    }
}
