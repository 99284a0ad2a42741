//! Boundary parsing for rows fetched from the record store.
//!
//! The store hands back loosely typed JSON objects. Each `parse_*` function
//! here is the one place those objects are checked and turned into the typed
//! records in [`crate::types`]:
//! - required columns must be present, non-null and of the right type
//! - optional columns may be absent or `null`
//! - numeric ranges (price, battery health, budget) are enforced
//!
//! Batch parsing validates rows in parallel with Rayon while keeping the
//! original row order.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::error::{RecordError, Result};
use crate::types::*;

/// Borrowed view over one JSON row with typed accessors.
struct Row<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Row<'a> {
    fn new(value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(RecordError::NotAnObject {
                found: json_kind(other).to_string(),
            }),
        }
    }

    /// Field value, treating `null` the same as absent.
    fn get(&self, field: &str) -> Option<&'a Value> {
        match self.fields.get(field) {
            None | Some(Value::Null) => None,
            Some(v) => Some(v),
        }
    }

    fn required(&self, field: &str) -> Result<&'a Value> {
        self.get(field).ok_or_else(|| RecordError::missing(field))
    }

    fn required_str(&self, field: &str) -> Result<&'a str> {
        self.required(field)?
            .as_str()
            .ok_or_else(|| RecordError::wrong_type(field, "string"))
    }

    fn optional_str(&self, field: &str) -> Result<Option<String>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(RecordError::wrong_type(field, "string")),
        }
    }

    fn required_bool(&self, field: &str) -> Result<bool> {
        self.required(field)?
            .as_bool()
            .ok_or_else(|| RecordError::wrong_type(field, "boolean"))
    }

    fn bool_or(&self, field: &str, default: bool) -> Result<bool> {
        match self.get(field) {
            None => Ok(default),
            Some(v) => v
                .as_bool()
                .ok_or_else(|| RecordError::wrong_type(field, "boolean")),
        }
    }

    /// Numeric column. Postgres `numeric` values may arrive as strings.
    fn optional_number(&self, field: &str) -> Result<Option<f64>> {
        let number = match self.get(field) {
            None => return Ok(None),
            Some(Value::Number(n)) => n
                .as_f64()
                .ok_or_else(|| RecordError::invalid(field, n))?,
            Some(Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| RecordError::invalid(field, s))?,
            Some(_) => return Err(RecordError::wrong_type(field, "number")),
        };
        if !number.is_finite() {
            return Err(RecordError::invalid(field, number));
        }
        Ok(Some(number))
    }

    fn required_number(&self, field: &str) -> Result<f64> {
        self.optional_number(field)?
            .ok_or_else(|| RecordError::missing(field))
    }

    fn required_uuid(&self, field: &str) -> Result<Uuid> {
        let raw = self.required_str(field)?;
        Uuid::parse_str(raw).map_err(|_| RecordError::invalid(field, raw))
    }

    fn optional_uuid(&self, field: &str) -> Result<Option<Uuid>> {
        match self.optional_str(field)? {
            None => Ok(None),
            Some(raw) => Uuid::parse_str(&raw)
                .map(Some)
                .map_err(|_| RecordError::invalid(field, raw)),
        }
    }

    fn optional_timestamp(&self, field: &str) -> Result<Option<DateTime<Utc>>> {
        match self.optional_str(field)? {
            None => Ok(None),
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|ts| Some(ts.with_timezone(&Utc)))
                .map_err(|_| RecordError::invalid(field, raw)),
        }
    }

    fn string_list(&self, field: &str) -> Result<Vec<String>> {
        match self.get(field) {
            None => Ok(Vec::new()),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| RecordError::wrong_type(field, "array of strings"))
                })
                .collect(),
            Some(_) => Err(RecordError::wrong_type(field, "array of strings")),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn non_negative(field: &str, value: f64) -> Result<f64> {
    if value < 0.0 {
        Err(RecordError::invalid(field, value))
    } else {
        Ok(value)
    }
}

// =============================================================================
// Phones
// =============================================================================

/// Parse one row of the `phones` table.
pub fn parse_phone(value: &Value) -> Result<Phone> {
    let row = Row::new(value)?;

    let battery_health = match row.optional_number("battery_health")? {
        None => None,
        Some(pct) if (0.0..=100.0).contains(&pct) && pct.fract() == 0.0 => Some(pct as u8),
        Some(pct) => return Err(RecordError::invalid("battery_health", pct)),
    };

    Ok(Phone {
        id: row.required_uuid("id")?,
        brand: row.required_str("brand")?.to_string(),
        model: row.required_str("model")?.to_string(),
        model_number: row.optional_str("model_number")?,
        price: non_negative("price", row.required_number("price")?)?,
        storage: row.optional_str("storage")?,
        ram: row.optional_str("ram")?,
        condition: row.required_str("condition")?.parse()?,
        condition_rating: row.optional_str("condition_rating")?,
        color: row.optional_str("color")?,
        battery_health,
        description: row.optional_str("description")?,
        delivery_info: row.optional_str("delivery_info")?,
        images: row.string_list("images")?,
        is_negotiable: row.bool_or("is_negotiable", false)?,
        is_sold: row.required_bool("is_sold")?,
        created_at: row.optional_timestamp("created_at")?,
    })
}

/// Parse a batch of phone rows, failing on the first bad row.
///
/// The returned phones keep the order of `rows`.
pub fn parse_phones(rows: &[Value]) -> Result<Vec<Phone>> {
    parse_batch(rows, parse_phone)
}

/// Parse a batch of phone rows, setting aside rows that fail validation.
///
/// Valid phones keep their relative order. Each rejected row is logged and
/// returned alongside so the caller can surface it.
pub fn parse_phones_lossy(rows: &[Value]) -> (Vec<Phone>, Vec<RecordError>) {
    let results: Vec<Result<Phone>> = rows
        .par_iter()
        .enumerate()
        .map(|(index, row)| parse_phone(row).map_err(|e| e.at_row(index)))
        .collect();

    let mut phones = Vec::with_capacity(results.len());
    let mut rejected = Vec::new();
    for result in results {
        match result {
            Ok(phone) => phones.push(phone),
            Err(e) => {
                warn!("Skipping invalid phone row: {}", e);
                rejected.push(e);
            }
        }
    }
    (phones, rejected)
}

// =============================================================================
// Submissions
// =============================================================================

/// Parse one row of the `inquiries` table.
///
/// When the row embeds its listing under `phones`, the brand and model are
/// kept as [`PhoneSummary`].
pub fn parse_inquiry(value: &Value) -> Result<Inquiry> {
    let row = Row::new(value)?;

    let listing = match row.get("phones") {
        None => None,
        Some(embedded) => {
            let embedded = Row::new(embedded)?;
            Some(PhoneSummary {
                brand: embedded.required_str("brand")?.to_string(),
                model: embedded.required_str("model")?.to_string(),
            })
        }
    };

    Ok(Inquiry {
        id: row.required_uuid("id")?,
        phone_id: row.optional_uuid("phone_id")?,
        name: row.required_str("name")?.to_string(),
        email: row.required_str("email")?.to_string(),
        phone: row.required_str("phone")?.to_string(),
        message: row.optional_str("message")?,
        created_at: row.optional_timestamp("created_at")?,
        listing,
    })
}

pub fn parse_inquiries(rows: &[Value]) -> Result<Vec<Inquiry>> {
    parse_batch(rows, parse_inquiry)
}

/// Parse one row of the `specific_requests` table.
pub fn parse_specific_request(value: &Value) -> Result<SpecificRequest> {
    let row = Row::new(value)?;

    let budget = match row.optional_number("budget")? {
        None => None,
        Some(b) => Some(non_negative("budget", b)?),
    };

    Ok(SpecificRequest {
        id: row.required_uuid("id")?,
        name: row.required_str("name")?.to_string(),
        email: row.required_str("email")?.to_string(),
        phone: row.required_str("phone")?.to_string(),
        model_requested: row.required_str("model_requested")?.to_string(),
        budget,
        message: row.optional_str("message")?,
        created_at: row.optional_timestamp("created_at")?,
    })
}

pub fn parse_specific_requests(rows: &[Value]) -> Result<Vec<SpecificRequest>> {
    parse_batch(rows, parse_specific_request)
}

/// Parse one row of the `contact_submissions` table.
pub fn parse_contact(value: &Value) -> Result<ContactSubmission> {
    let row = Row::new(value)?;

    Ok(ContactSubmission {
        id: row.required_uuid("id")?,
        name: row.required_str("name")?.to_string(),
        email: row.required_str("email")?.to_string(),
        phone: row.optional_str("phone")?,
        subject: row.optional_str("subject")?,
        message: row.required_str("message")?.to_string(),
        created_at: row.optional_timestamp("created_at")?,
    })
}

pub fn parse_contacts(rows: &[Value]) -> Result<Vec<ContactSubmission>> {
    parse_batch(rows, parse_contact)
}

/// Parse one row of the `user_roles` table.
pub fn parse_user_role(value: &Value) -> Result<UserRole> {
    let row = Row::new(value)?;

    Ok(UserRole {
        user_id: row.required_uuid("user_id")?,
        role: row.required_str("role")?.to_string(),
    })
}

fn parse_batch<T, F>(rows: &[Value], parse: F) -> Result<Vec<T>>
where
    T: Send,
    F: Fn(&Value) -> Result<T> + Sync,
{
    rows.par_iter()
        .enumerate()
        .map(|(index, row)| parse(row).map_err(|e| e.at_row(index)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn phone_row() -> Value {
        json!({
            "id": "6f1c1e1a-8d4e-4b59-9a57-1c7f0a1b2c3d",
            "brand": "Apple",
            "model": "iPhone 13 Pro",
            "model_number": null,
            "price": 45000,
            "storage": "128GB",
            "ram": "6GB",
            "condition": "Like New",
            "battery_health": 89,
            "images": ["https://cdn.example/a.webp"],
            "is_negotiable": true,
            "is_sold": false,
            "created_at": "2025-01-04T10:15:00+00:00"
        })
    }

    #[test]
    fn test_parse_phone() {
        let phone = parse_phone(&phone_row()).unwrap();
        assert_eq!(phone.brand, "Apple");
        assert_eq!(phone.condition, Condition::LikeNew);
        assert_eq!(phone.price, 45000.0);
        assert_eq!(phone.battery_health, Some(89));
        assert_eq!(phone.model_number, None);
        assert_eq!(phone.cover_image(), Some("https://cdn.example/a.webp"));
        assert!(phone.created_at.is_some());
    }

    #[test]
    fn test_parse_phone_accepts_numeric_string_price() {
        let mut row = phone_row();
        row["price"] = json!("30000.50");
        row["images"] = Value::Null;
        let phone = parse_phone(&row).unwrap();
        assert_eq!(phone.price, 30000.5);
        assert!(phone.images.is_empty());
    }

    #[test]
    fn test_parse_phone_missing_required_field() {
        let mut row = phone_row();
        row.as_object_mut().unwrap().remove("brand");
        let err = parse_phone(&row).unwrap_err();
        assert!(matches!(err, RecordError::MissingField { ref field } if field == "brand"));
    }

    #[test]
    fn test_parse_phone_rejects_bad_values() {
        let mut negative = phone_row();
        negative["price"] = json!(-1);
        assert!(matches!(
            parse_phone(&negative),
            Err(RecordError::InvalidValue { .. })
        ));

        let mut battery = phone_row();
        battery["battery_health"] = json!(140);
        assert!(parse_phone(&battery).is_err());

        let mut condition = phone_row();
        condition["condition"] = json!("excellent");
        assert!(parse_phone(&condition).is_err());

        let mut sold = phone_row();
        sold["is_sold"] = json!("no");
        assert!(matches!(
            parse_phone(&sold),
            Err(RecordError::WrongType { .. })
        ));
    }

    #[test]
    fn test_parse_phones_reports_row_index() {
        let rows = vec![phone_row(), json!("not a row"), phone_row()];
        match parse_phones(&rows) {
            Err(RecordError::Row { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected row error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_phones_lossy_keeps_order() {
        let mut second = phone_row();
        second["model"] = json!("iPhone 12");
        let rows = vec![phone_row(), json!({"id": "nope"}), second];

        let (phones, rejected) = parse_phones_lossy(&rows);
        assert_eq!(phones.len(), 2);
        assert_eq!(phones[0].model, "iPhone 13 Pro");
        assert_eq!(phones[1].model, "iPhone 12");
        assert_eq!(rejected.len(), 1);
    }

    #[test]
    fn test_parse_inquiry_with_embedded_listing() {
        let row = json!({
            "id": "0b3c2f8e-3a55-4d0c-8f3e-2a7d9e6b1c40",
            "phone_id": "6f1c1e1a-8d4e-4b59-9a57-1c7f0a1b2c3d",
            "name": "Ravi",
            "email": "ravi@example.com",
            "phone": "9876543210",
            "message": null,
            "created_at": "2025-02-01T08:00:00Z",
            "phones": { "brand": "Samsung", "model": "Galaxy S21" }
        });
        let inquiry = parse_inquiry(&row).unwrap();
        assert_eq!(inquiry.message, None);
        assert_eq!(
            inquiry.listing,
            Some(PhoneSummary {
                brand: "Samsung".to_string(),
                model: "Galaxy S21".to_string()
            })
        );
    }

    #[test]
    fn test_parse_specific_request_budget() {
        let row = json!({
            "id": "0b3c2f8e-3a55-4d0c-8f3e-2a7d9e6b1c41",
            "name": "Asha",
            "email": "asha@example.com",
            "phone": "9876543210",
            "model_requested": "Pixel 7",
            "budget": -5
        });
        assert!(parse_specific_request(&row).is_err());
    }
}
