//! Brand select box filter.

use crate::traits::Filter;
use phone_records::Phone;

/// Keeps phones of one brand.
///
/// Comparison ignores case, so a listing stored as `"apple"` still shows up
/// under the `"Apple"` option. Every catalog entry point goes through this
/// filter, so the policy is the same everywhere.
pub struct BrandMatchFilter {
    brand: String,
}

impl BrandMatchFilter {
    pub fn new(brand: &str) -> Self {
        Self {
            brand: brand.to_lowercase(),
        }
    }
}

impl Filter for BrandMatchFilter {
    fn name(&self) -> &str {
        "BrandMatchFilter"
    }

    fn matches(&self, phone: &Phone) -> bool {
        phone.brand.to_lowercase() == self.brand
    }
}
