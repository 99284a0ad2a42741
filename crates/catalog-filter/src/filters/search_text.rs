//! Free-text search over brand and model.

use crate::traits::Filter;
use phone_records::Phone;

/// Keeps phones whose model or brand contains the query, ignoring case.
///
/// ## Algorithm
/// The query is lowercased once up front. A phone passes when either its
/// lowercased `model` or lowercased `brand` contains it as a substring.
/// The query is not trimmed, so `" "` is a literal search for a space.
pub struct SearchTextFilter {
    needle: String,
}

impl SearchTextFilter {
    pub fn new(query: &str) -> Self {
        Self {
            needle: query.to_lowercase(),
        }
    }
}

impl Filter for SearchTextFilter {
    fn name(&self) -> &str {
        "SearchTextFilter"
    }

    fn matches(&self, phone: &Phone) -> bool {
        phone.model.to_lowercase().contains(&self.needle)
            || phone.brand.to_lowercase().contains(&self.needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::phone;
    use phone_records::Condition;

    #[test]
    fn test_search_is_case_insensitive() {
        let filter = SearchTextFilter::new("iphone");
        assert!(filter.matches(&phone("Apple", "iPhone 13 Pro", 45000.0, Condition::Good)));
        assert!(!filter.matches(&phone("Samsung", "Galaxy S21", 30000.0, Condition::Good)));
    }

    #[test]
    fn test_search_matches_brand() {
        let filter = SearchTextFilter::new("SAMS");
        assert!(filter.matches(&phone("Samsung", "Galaxy S21", 30000.0, Condition::Good)));
    }

    #[test]
    fn test_whitespace_query_is_literal() {
        let filter = SearchTextFilter::new(" ");
        assert!(filter.matches(&phone("Apple", "iPhone 13", 45000.0, Condition::Good)));
        assert!(!filter.matches(&phone("Google", "Pixel", 20000.0, Condition::Good)));
    }
}
