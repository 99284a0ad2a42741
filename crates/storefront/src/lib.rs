//! Storefront crate for the used-phone shop.
//!
//! Wires the record store, the admin gate and the catalog filter engine
//! into the operations behind each page of the shop.

pub mod error;
pub mod forms;
pub mod storefront;

pub use error::{Notice, Result, Severity, StorefrontError};
pub use forms::{ContactForm, InquiryForm, NewPhoneForm, RequestForm};
pub use storefront::{FEATURED_LIMIT, LoadOutcome, SoldFilter, Storefront};
