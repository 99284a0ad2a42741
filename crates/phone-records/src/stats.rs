//! Inventory statistics for the admin dashboard.

use serde::Serialize;

use crate::types::Phone;

/// Availability counts over a set of listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InventoryStats {
    pub total: usize,
    pub available: usize,
    pub sold: usize,
}

impl InventoryStats {
    pub fn from_phones(phones: &[Phone]) -> Self {
        let sold = phones.iter().filter(|p| p.is_sold).count();
        Self {
            total: phones.len(),
            available: phones.len() - sold,
            sold,
        }
    }
}

/// Everything the back office landing page shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DashboardStats {
    pub inventory: InventoryStats,
    pub inquiries: u64,
    pub specific_requests: u64,
    pub contact_submissions: u64,
}
