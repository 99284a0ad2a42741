//! Core domain types for the storefront.
//!
//! These are the validated shapes of the rows kept in the hosted record
//! store. Anything that reaches the catalog filter or the admin back office
//! has already been through [`crate::parser`], so the fields here can be
//! trusted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::RecordError;

// =============================================================================
// Identifiers
// =============================================================================

/// Unique identifier of a phone listing
pub type PhoneId = Uuid;

/// Unique identifier of an authenticated user
pub type UserId = Uuid;

// =============================================================================
// Phone listing
// =============================================================================

/// Grading label attached to every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    Excellent,
    Good,
    Fair,
    #[serde(rename = "Like New")]
    LikeNew,
}

impl Condition {
    /// All grades, best first.
    pub const ALL: [Condition; 4] = [
        Condition::LikeNew,
        Condition::Excellent,
        Condition::Good,
        Condition::Fair,
    ];

    /// The label stored in the `condition` column.
    pub fn label(&self) -> &'static str {
        match self {
            Condition::Excellent => "Excellent",
            Condition::Good => "Good",
            Condition::Fair => "Fair",
            Condition::LikeNew => "Like New",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Condition {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Excellent" => Ok(Condition::Excellent),
            "Good" => Ok(Condition::Good),
            "Fair" => Ok(Condition::Fair),
            "Like New" => Ok(Condition::LikeNew),
            _ => Err(RecordError::invalid("condition", s)),
        }
    }
}

/// A used phone offered in the shop.
///
/// Only `brand`, `model`, `price`, `condition` and `is_sold` take part in
/// catalog filtering. The remaining attributes are carried through for
/// display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phone {
    pub id: PhoneId,
    pub brand: String,
    pub model: String,
    pub model_number: Option<String>,
    /// Asking price in rupees, never negative
    pub price: f64,
    pub storage: Option<String>,
    pub ram: Option<String>,
    pub condition: Condition,
    pub condition_rating: Option<String>,
    pub color: Option<String>,
    /// Battery health percentage (0-100)
    pub battery_health: Option<u8>,
    pub description: Option<String>,
    pub delivery_info: Option<String>,
    pub images: Vec<String>,
    pub is_negotiable: bool,
    pub is_sold: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl Phone {
    /// "Brand Model", as shown on cards and in admin listings.
    pub fn display_name(&self) -> String {
        format!("{} {}", self.brand, self.model)
    }

    /// First image, if the listing has any.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}

/// Payload for a new listing, as written to the `phones` table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewPhone {
    pub brand: String,
    pub model: String,
    pub model_number: Option<String>,
    pub price: f64,
    pub storage: String,
    pub ram: String,
    pub condition: Condition,
    pub condition_rating: Option<String>,
    pub color: Option<String>,
    pub battery_health: Option<u8>,
    pub description: Option<String>,
    pub delivery_info: Option<String>,
    pub images: Option<Vec<String>>,
    pub is_negotiable: bool,
    pub is_sold: bool,
}

// =============================================================================
// Customer submissions
// =============================================================================

/// Brand and model of the phone an inquiry refers to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneSummary {
    pub brand: String,
    pub model: String,
}

/// A customer question about a specific listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Inquiry {
    pub id: Uuid,
    pub phone_id: Option<PhoneId>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    /// Joined listing details when the store embeds them
    pub listing: Option<PhoneSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewInquiry {
    pub phone_id: PhoneId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
}

/// A request to source a model the shop does not currently stock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificRequest {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub model_requested: String,
    pub budget: Option<f64>,
    pub message: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSpecificRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub model_requested: String,
    pub budget: Option<f64>,
    pub message: Option<String>,
}

/// A general message sent through the contact form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactSubmission {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

// =============================================================================
// Roles
// =============================================================================

/// Role granted to a user, e.g. `admin`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: UserId,
    pub role: String,
}

/// Name of the role that unlocks the back office.
pub const ADMIN_ROLE: &str = "admin";
