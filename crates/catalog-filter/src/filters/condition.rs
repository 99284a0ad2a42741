//! Condition select box filter.

use crate::traits::Filter;
use phone_records::Phone;

/// Keeps phones whose condition label equals the selected one exactly.
pub struct ConditionMatchFilter {
    label: String,
}

impl ConditionMatchFilter {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
        }
    }
}

impl Filter for ConditionMatchFilter {
    fn name(&self) -> &str {
        "ConditionMatchFilter"
    }

    fn matches(&self, phone: &Phone) -> bool {
        phone.condition.label() == self.label
    }
}
