//! Integration tests for the catalog filter engine.
//!
//! These tests check the laws the catalog relies on (identity, order,
//! idempotence) and the concrete scenarios the shop's controls produce.

use catalog_filter::{FilterCriteria, PriceRange, apply_filters};
use phone_records::{Condition, Phone};
use uuid::Uuid;

fn phone(brand: &str, model: &str, price: f64, condition: Condition) -> Phone {
    Phone {
        id: Uuid::new_v4(),
        brand: brand.to_string(),
        model: model.to_string(),
        model_number: None,
        price,
        storage: None,
        ram: None,
        condition,
        condition_rating: None,
        color: None,
        battery_health: None,
        description: None,
        delivery_info: None,
        images: vec![],
        is_negotiable: false,
        is_sold: false,
        created_at: None,
    }
}

fn two_phones() -> Vec<Phone> {
    vec![
        phone("Apple", "iPhone 13", 45000.0, Condition::Good),
        phone("Samsung", "Galaxy S21", 30000.0, Condition::Excellent),
    ]
}

fn shop_inventory() -> Vec<Phone> {
    vec![
        phone("Apple", "iPhone 13 Pro", 52000.0, Condition::LikeNew),
        phone("Samsung", "Galaxy S21", 30000.0, Condition::Excellent),
        phone("OnePlus", "Nord 2", 15000.0, Condition::Fair),
        phone("apple", "iPhone 11", 22000.0, Condition::Good),
        phone("Google", "Pixel 7", 28000.0, Condition::Good),
        phone("Xiaomi", "Redmi Note 12", 9999.0, Condition::Good),
        phone("Realme", "GT 2", 20000.0, Condition::Excellent),
        phone("Samsung", "Galaxy A54", 24000.0, Condition::Good),
    ]
}

fn criteria_grid() -> Vec<FilterCriteria> {
    vec![
        FilterCriteria::new(),
        FilterCriteria::from_raw("galaxy", "all", "all", "all"),
        FilterCriteria::from_raw("", "Samsung", "Good", "all"),
        FilterCriteria::from_raw("i", "apple", "all", "10000-30000"),
        FilterCriteria::from_raw(" ", "all", "all", "0-10000"),
        FilterCriteria::from_raw("", "all", "Excellent", "20000-30000"),
        FilterCriteria::from_raw("nothing", "Google", "Fair", "50000-999999"),
    ]
}

fn ids(phones: &[Phone]) -> Vec<Uuid> {
    phones.iter().map(|p| p.id).collect()
}

#[test]
fn test_no_active_filter_is_identity() {
    let phones = shop_inventory();
    assert_eq!(apply_filters(&phones, &FilterCriteria::new()), phones);
}

#[test]
fn test_output_is_order_preserving_subsequence() {
    let phones = shop_inventory();
    let input_ids = ids(&phones);

    for criteria in criteria_grid() {
        let output = apply_filters(&phones, &criteria);
        let mut cursor = input_ids.iter();
        for id in ids(&output) {
            assert!(
                cursor.any(|candidate| *candidate == id),
                "output not a subsequence for {:?}",
                criteria
            );
        }
    }
}

#[test]
fn test_filtering_is_idempotent_and_deterministic() {
    let phones = shop_inventory();
    for criteria in criteria_grid() {
        let once = apply_filters(&phones, &criteria);
        let twice = apply_filters(&once, &criteria);
        assert_eq!(once, twice);
        assert_eq!(once, apply_filters(&phones, &criteria));
    }
}

#[test]
fn test_input_is_not_mutated() {
    let phones = shop_inventory();
    let snapshot = phones.clone();
    let _ = apply_filters(&phones, &FilterCriteria::from_raw("pixel", "Google", "Good", "0-99999"));
    assert_eq!(phones, snapshot);
}

#[test]
fn test_empty_input_gives_empty_output() {
    for criteria in criteria_grid() {
        assert!(apply_filters(&[], &criteria).is_empty());
    }
}

#[test]
fn test_search_is_case_insensitive() {
    let phones = vec![phone("Apple", "iPhone 13 Pro", 45000.0, Condition::Good)];
    let criteria = FilterCriteria::new().with_search("iphone");
    assert_eq!(apply_filters(&phones, &criteria).len(), 1);
}

#[test]
fn test_price_boundaries_are_inclusive() {
    let criteria = FilterCriteria::new().with_price(PriceRange::between(20000.0, 40000.0));
    let phones = vec![
        phone("A", "at min", 20000.0, Condition::Good),
        phone("B", "at max", 40000.0, Condition::Good),
        phone("C", "below", 19999.0, Condition::Good),
        phone("D", "above", 40001.0, Condition::Good),
    ];

    let output = apply_filters(&phones, &criteria);
    let models: Vec<&str> = output.iter().map(|p| p.model.as_str()).collect();
    assert_eq!(models, vec!["at min", "at max"]);
}

#[test]
fn test_scenario_brand_apple() {
    let phones = two_phones();
    let output = apply_filters(&phones, &FilterCriteria::from_raw("", "Apple", "all", "all"));
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].model, "iPhone 13");
}

#[test]
fn test_scenario_search_galaxy() {
    let phones = two_phones();
    let output = apply_filters(&phones, &FilterCriteria::from_raw("galaxy", "all", "all", "all"));
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].model, "Galaxy S21");
}

#[test]
fn test_scenario_price_bucket() {
    let phones = two_phones();
    let output = apply_filters(
        &phones,
        &FilterCriteria::from_raw("", "all", "all", "20000-40000"),
    );
    assert_eq!(output.len(), 1);
    assert_eq!(output[0].model, "Galaxy S21");
}

#[test]
fn test_scenario_no_match_is_empty_not_error() {
    let phones = two_phones();
    let output = apply_filters(
        &phones,
        &FilterCriteria::from_raw("nonexistent", "all", "all", "all"),
    );
    assert!(output.is_empty());
}

#[test]
fn test_brand_policy_is_case_insensitive() {
    let phones = shop_inventory();
    let output = apply_filters(&phones, &FilterCriteria::from_raw("", "Apple", "all", "all"));
    let models: Vec<&str> = output.iter().map(|p| p.model.as_str()).collect();
    assert_eq!(models, vec!["iPhone 13 Pro", "iPhone 11"]);
}

#[test]
fn test_malformed_price_is_no_constraint() {
    let phones = shop_inventory();
    let output = apply_filters(&phones, &FilterCriteria::from_raw("", "all", "all", "under-10k"));
    assert_eq!(output, phones);
}

#[test]
fn test_unusable_typed_price_range_is_no_constraint() {
    let phones = two_phones();

    let inverted = FilterCriteria::new().with_price(PriceRange::Between {
        min: 40000.0,
        max: 20000.0,
    });
    assert_eq!(apply_filters(&phones, &inverted), phones);

    let nan = FilterCriteria::new().with_price(PriceRange::Between {
        min: f64::NAN,
        max: 50000.0,
    });
    assert_eq!(apply_filters(&phones, &nan), phones);
}

#[test]
fn test_deserialized_inverted_price_range_is_no_constraint() {
    let phones = two_phones();
    let price: PriceRange =
        serde_json::from_str(r#"{"Between":{"min":40000.0,"max":20000.0}}"#).unwrap();
    assert_eq!(price, PriceRange::Between { min: 40000.0, max: 20000.0 });

    let output = apply_filters(&phones, &FilterCriteria::new().with_price(price));
    assert_eq!(output, phones);
}
