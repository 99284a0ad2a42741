//! Customer and admin forms, validated into insertable records.
//!
//! Text fields are trimmed before checking. Validation stops at the first
//! bad field and reports it as [`StorefrontError::Validation`].

use std::sync::OnceLock;

use phone_records::{
    Condition, NewContactSubmission, NewInquiry, NewPhone, NewSpecificRequest, PhoneId,
};
use regex::Regex;

use crate::error::{Result, StorefrontError};

const NAME_MAX: usize = 100;
const EMAIL_MAX: usize = 255;
const PHONE_MIN: usize = 10;
const PHONE_MAX: usize = 15;
const MESSAGE_MAX: usize = 1000;
const MODEL_MAX: usize = 200;
const SUBJECT_MAX: usize = 200;

/// Question about a listing, from the product page.
#[derive(Debug, Clone, Default)]
pub struct InquiryForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub message: Option<String>,
}

/// Request to source a model the shop doesn't stock.
#[derive(Debug, Clone, Default)]
pub struct RequestForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub model_requested: String,
    pub budget: Option<f64>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: String,
}

/// New listing as typed into the admin form: every field is raw text.
#[derive(Debug, Clone, Default)]
pub struct NewPhoneForm {
    pub brand: String,
    pub model: String,
    pub model_number: String,
    pub price: String,
    pub storage: String,
    pub ram: String,
    pub condition: String,
    pub condition_rating: String,
    pub color: String,
    pub battery_health: String,
    pub description: String,
    pub delivery_info: String,
    /// Comma-separated image URLs
    pub images: String,
    pub is_negotiable: bool,
}

fn required(field: &'static str, value: &str, label: &str, max: usize) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(StorefrontError::validation(field, format!("{label} is required")));
    }
    at_most(field, value, label, max)?;
    Ok(value.to_string())
}

fn at_most(field: &'static str, value: &str, label: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(StorefrontError::validation(
            field,
            format!("{label} must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Trimmed optional text; blank becomes `None`.
fn optional(field: &'static str, value: Option<&str>, label: &str, max: usize) -> Result<Option<String>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(v) => {
            at_most(field, v, label, max)?;
            Ok(Some(v.to_string()))
        }
        None => Ok(None),
    }
}

fn is_valid_email(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
    });
    regex.is_match(email)
}

fn email(value: &str) -> Result<String> {
    let value = value.trim();
    if !is_valid_email(value) {
        return Err(StorefrontError::validation("email", "Invalid email"));
    }
    at_most("email", value, "Email", EMAIL_MAX)?;
    Ok(value.to_string())
}

fn phone_number(value: &str) -> Result<String> {
    let value = value.trim();
    if value.chars().count() < PHONE_MIN {
        return Err(StorefrontError::validation(
            "phone",
            "Phone number must be at least 10 digits",
        ));
    }
    at_most("phone", value, "Phone number", PHONE_MAX)?;
    Ok(value.to_string())
}

impl InquiryForm {
    pub fn validate(&self, phone_id: PhoneId) -> Result<NewInquiry> {
        Ok(NewInquiry {
            phone_id,
            name: required("name", &self.name, "Name", NAME_MAX)?,
            email: email(&self.email)?,
            phone: phone_number(&self.phone)?,
            message: optional("message", self.message.as_deref(), "Message", MESSAGE_MAX)?,
        })
    }
}

impl RequestForm {
    pub fn validate(&self) -> Result<NewSpecificRequest> {
        let name = required("name", &self.name, "Name", NAME_MAX)?;
        let email = email(&self.email)?;
        let phone = phone_number(&self.phone)?;
        let model_requested =
            required("model_requested", &self.model_requested, "Model name", MODEL_MAX)?;

        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(StorefrontError::validation("budget", "Budget cannot be negative"));
            }
        }

        Ok(NewSpecificRequest {
            name,
            email,
            phone,
            model_requested,
            budget: self.budget,
            message: optional("message", self.message.as_deref(), "Message", MESSAGE_MAX)?,
        })
    }
}

impl ContactForm {
    pub fn validate(&self) -> Result<NewContactSubmission> {
        let name = required("name", &self.name, "Name", NAME_MAX)?;
        let email = email(&self.email)?;
        let phone = match self.phone.as_deref().map(str::trim).filter(|p| !p.is_empty()) {
            Some(p) => Some(phone_number(p)?),
            None => None,
        };
        Ok(NewContactSubmission {
            name,
            email,
            phone,
            subject: optional("subject", self.subject.as_deref(), "Subject", SUBJECT_MAX)?,
            message: required("message", &self.message, "Message", MESSAGE_MAX)?,
        })
    }
}

impl NewPhoneForm {
    pub fn validate(&self) -> Result<NewPhone> {
        let brand = required("brand", &self.brand, "Brand", NAME_MAX)?;
        let model = required("model", &self.model, "Model", MODEL_MAX)?;

        let price: f64 = self
            .price
            .trim()
            .parse()
            .ok()
            .filter(|p: &f64| p.is_finite())
            .ok_or_else(|| StorefrontError::validation("price", "Price must be a number"))?;
        if price < 0.0 {
            return Err(StorefrontError::validation("price", "Price cannot be negative"));
        }

        let storage = required("storage", &self.storage, "Storage", NAME_MAX)?;
        let ram = required("ram", &self.ram, "RAM", NAME_MAX)?;
        let condition: Condition = required("condition", &self.condition, "Condition", NAME_MAX)?
            .parse()
            .map_err(|_| {
                StorefrontError::validation(
                    "condition",
                    "Condition must be one of Excellent, Good, Fair, Like New",
                )
            })?;

        let battery_health = match self.battery_health.trim() {
            "" => None,
            raw => Some(
                raw.parse::<u8>()
                    .ok()
                    .filter(|b| *b <= 100)
                    .ok_or_else(|| {
                        StorefrontError::validation(
                            "battery_health",
                            "Battery health must be a whole number from 0 to 100",
                        )
                    })?,
            ),
        };

        let images: Vec<String> = self
            .images
            .split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
            .collect();

        Ok(NewPhone {
            brand,
            model,
            model_number: blank_to_none(&self.model_number),
            price,
            storage,
            ram,
            condition,
            condition_rating: blank_to_none(&self.condition_rating),
            color: blank_to_none(&self.color),
            battery_health,
            description: blank_to_none(&self.description),
            delivery_info: blank_to_none(&self.delivery_info),
            images: (!images.is_empty()).then_some(images),
            is_negotiable: self.is_negotiable,
            is_sold: false,
        })
    }
}

fn blank_to_none(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
