//! Filter criteria controlled by the catalog page.
//!
//! Each criterion has a "no constraint" value. The UI encodes criteria as
//! plain strings (`"all"`, `"Apple"`, `"20000-40000"`); [`FilterCriteria::from_raw`]
//! decodes them and treats anything malformed as "no constraint" instead of
//! failing.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Sentinel the UI uses for an inactive select box.
pub const ALL: &str = "all";

/// Brand select box.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrandFilter {
    #[default]
    All,
    Only(String),
}

impl BrandFilter {
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() || raw == ALL {
            BrandFilter::All
        } else {
            BrandFilter::Only(raw.to_string())
        }
    }
}

/// Condition select box. Compared against the stored label as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionFilter {
    #[default]
    All,
    Only(String),
}

impl ConditionFilter {
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() || raw == ALL {
            ConditionFilter::All
        } else {
            ConditionFilter::Only(raw.to_string())
        }
    }
}

/// Price bucket, inclusive on both ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PriceRange {
    #[default]
    All,
    Between { min: f64, max: f64 },
}

impl PriceRange {
    /// Build a range, returning `All` when the bounds are unusable.
    pub fn between(min: f64, max: f64) -> Self {
        let usable = min.is_finite() && max.is_finite() && min >= 0.0 && min <= max;
        if usable {
            PriceRange::Between { min, max }
        } else {
            debug!("Ignoring unusable price bounds {}..{}", min, max);
            PriceRange::All
        }
    }

    /// Decode the `"min-max"` form used by the price select box.
    ///
    /// `"all"`, an empty string, or anything that is not two non-negative
    /// numbers with `min <= max` yields `All`.
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() || raw == ALL {
            return PriceRange::All;
        }
        let parsed = raw
            .split_once('-')
            .and_then(|(min, max)| Some((min.parse::<f64>().ok()?, max.parse::<f64>().ok()?)));
        match parsed {
            Some((min, max)) => PriceRange::between(min, max),
            None => {
                debug!("Ignoring malformed price range {:?}", raw);
                PriceRange::All
            }
        }
    }

    pub fn contains(&self, price: f64) -> bool {
        match self {
            PriceRange::All => true,
            PriceRange::Between { min, max } => price >= *min && price <= *max,
        }
    }
}

/// The four catalog controls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free text; empty means no constraint. Not trimmed.
    pub search_text: String,
    pub brand: BrandFilter,
    pub condition: ConditionFilter,
    pub price: PriceRange,
}

impl FilterCriteria {
    /// Criteria with every control at its "no constraint" value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode criteria from the raw select-box strings.
    pub fn from_raw(search_text: &str, brand: &str, condition: &str, price: &str) -> Self {
        Self {
            search_text: search_text.to_string(),
            brand: BrandFilter::from_raw(brand),
            condition: ConditionFilter::from_raw(condition),
            price: PriceRange::from_raw(price),
        }
    }

    pub fn with_search(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = BrandFilter::from_raw(&brand.into());
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = ConditionFilter::from_raw(&condition.into());
        self
    }

    pub fn with_price(mut self, price: PriceRange) -> Self {
        self.price = price;
        self
    }

    /// True when no control constrains the result.
    pub fn is_unconstrained(&self) -> bool {
        self.search_text.is_empty()
            && self.brand == BrandFilter::All
            && self.condition == ConditionFilter::All
            && self.price == PriceRange::All
    }
}
