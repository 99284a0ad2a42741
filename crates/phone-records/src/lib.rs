//! # Phone Records Crate
//!
//! Typed records for the used-phone storefront and the single boundary step
//! that validates raw rows coming back from the hosted record store.
//!
//! ## Main Components
//!
//! - **types**: Domain types (Phone, Condition, Inquiry, SpecificRequest, ContactSubmission)
//! - **parser**: Turn store rows (`serde_json::Value`) into validated records
//! - **stats**: Inventory and dashboard counts
//! - **error**: Error types for row validation
//!
//! ## Example Usage
//!
//! ```ignore
//! use phone_records::parse_phones;
//!
//! let rows: Vec<serde_json::Value> = store.list(Table::Phones, &query).await?;
//! let phones = parse_phones(&rows)?;
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod stats;

pub use error::{RecordError, Result};
pub use types::{
    // Identifiers
    PhoneId,
    UserId,
    // Listings
    Condition,
    Phone,
    NewPhone,
    // Submissions
    Inquiry,
    NewInquiry,
    PhoneSummary,
    SpecificRequest,
    NewSpecificRequest,
    ContactSubmission,
    NewContactSubmission,
    // Roles
    UserRole,
    ADMIN_ROLE,
};
pub use parser::{
    parse_contact, parse_contacts, parse_inquiries, parse_inquiry, parse_phone, parse_phones,
    parse_phones_lossy, parse_specific_request, parse_specific_requests, parse_user_role,
};
pub use stats::{DashboardStats, InventoryStats};
