//! # Storefront Service
//!
//! Every page of the shop maps onto one operation here:
//! - catalog, home page highlights and product detail
//! - inquiry, phone request and contact submissions
//! - the admin back office (inventory, submissions, dashboard)
//!
//! Admin operations run the admin gate first: a signed-in session whose
//! user holds the `admin` role.

use std::sync::Arc;

use catalog_filter::CatalogView;
use phone_records::{
    ADMIN_ROLE, ContactSubmission, DashboardStats, Inquiry, InventoryStats, Phone, PhoneId,
    SpecificRequest, parse_contact, parse_contacts, parse_inquiries, parse_inquiry, parse_phone,
    parse_phones, parse_phones_lossy, parse_specific_request, parse_specific_requests,
};
use record_store::{
    Query, RecordStore, RoleChecker, Session, SessionProvider, StoreError, Table,
};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::error::{Result, StorefrontError};
use crate::forms::{ContactForm, InquiryForm, NewPhoneForm, RequestForm};

/// Number of listings on the home page.
pub const FEATURED_LIMIT: usize = 5;

/// Whether a phone listing includes sold phones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoldFilter {
    /// Customer-facing pages
    AvailableOnly,
    /// Admin inventory
    All,
}

/// What happened to a catalog fetch once it returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The fetch was the latest one; the view now holds this many phones
    Applied(usize),
    /// A newer fetch started meanwhile; the result was dropped
    Discarded,
}

#[derive(Clone)]
pub struct Storefront {
    store: Arc<dyn RecordStore>,
    sessions: Arc<dyn SessionProvider>,
    roles: Arc<dyn RoleChecker>,
}

impl Storefront {
    pub fn new(
        store: Arc<dyn RecordStore>,
        sessions: Arc<dyn SessionProvider>,
        roles: Arc<dyn RoleChecker>,
    ) -> Self {
        Self {
            store,
            sessions,
            roles,
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Fetch listings newest first.
    ///
    /// Customer pages tolerate bad rows: they are skipped and logged so one
    /// broken listing can't blank the whole catalog.
    pub async fn fetch_phones(&self, sold: SoldFilter) -> Result<Vec<Phone>> {
        let mut query = Query::new().newest_first();
        if sold == SoldFilter::AvailableOnly {
            query = query.eq("is_sold", false);
        }
        let rows = self.store.list(Table::Phones, &query).await.map_err(|e| {
            error!("Failed to fetch phones: {}", e);
            e
        })?;

        match sold {
            SoldFilter::AvailableOnly => {
                let (phones, rejected) = parse_phones_lossy(&rows);
                if !rejected.is_empty() {
                    warn!("Skipped {} malformed phone rows", rejected.len());
                }
                Ok(phones)
            }
            SoldFilter::All => Ok(parse_phones(&rows)?),
        }
    }

    /// Refresh `view` from the store.
    ///
    /// The view lock is held only to start and finish the fetch, so several
    /// loads may overlap; only the most recently started one lands.
    pub async fn load_catalog(
        &self,
        view: &Mutex<CatalogView>,
        sold: SoldFilter,
    ) -> Result<LoadOutcome> {
        let ticket = view.lock().await.begin_fetch();
        let result = self.fetch_phones(sold).await;

        let mut view = view.lock().await;
        match result {
            Ok(phones) => {
                let count = phones.len();
                if view.finish_fetch(ticket, Ok::<_, StorefrontError>(phones)) {
                    info!("Loaded {} phones into catalog", count);
                    Ok(LoadOutcome::Applied(count))
                } else {
                    Ok(LoadOutcome::Discarded)
                }
            }
            Err(e) => {
                if view.finish_fetch(ticket, Err::<Vec<Phone>, _>(&e)) {
                    Err(e)
                } else {
                    Ok(LoadOutcome::Discarded)
                }
            }
        }
    }

    /// Newest available phones for the home page.
    pub async fn featured_phones(&self, limit: usize) -> Result<Vec<Phone>> {
        let query = Query::new().eq("is_sold", false).newest_first().limit(limit);
        let rows = self.store.list(Table::Phones, &query).await?;
        let (phones, rejected) = parse_phones_lossy(&rows);
        if !rejected.is_empty() {
            warn!("Skipped {} malformed featured rows", rejected.len());
        }
        Ok(phones)
    }

    pub async fn phone_detail(&self, id: PhoneId) -> Result<Phone> {
        let row = self
            .store
            .get_by_id(Table::Phones, &id.to_string())
            .await?
            .ok_or_else(|| StorefrontError::NotFound {
                table: Table::Phones,
                id: id.to_string(),
            })?;
        Ok(parse_phone(&row)?)
    }

    // =========================================================================
    // Customer submissions
    // =========================================================================

    pub async fn submit_inquiry(&self, phone_id: PhoneId, form: &InquiryForm) -> Result<Inquiry> {
        let new = form.validate(phone_id).inspect_err(log_rejected)?;
        let row = self.insert(Table::Inquiries, &new).await?;
        info!("Inquiry received for phone {}", phone_id);
        Ok(parse_inquiry(&row)?)
    }

    pub async fn submit_request(&self, form: &RequestForm) -> Result<SpecificRequest> {
        let new = form.validate().inspect_err(log_rejected)?;
        let row = self.insert(Table::SpecificRequests, &new).await?;
        info!("Phone request received for {}", new.model_requested);
        Ok(parse_specific_request(&row)?)
    }

    pub async fn submit_contact(&self, form: &ContactForm) -> Result<ContactSubmission> {
        let new = form.validate().inspect_err(log_rejected)?;
        let row = self.insert(Table::ContactSubmissions, &new).await?;
        info!("Contact message received");
        Ok(parse_contact(&row)?)
    }

    async fn insert<T: Serialize>(&self, table: Table, record: &T) -> Result<Value> {
        let row = serde_json::to_value(record).map_err(StoreError::from)?;
        Ok(self.store.insert(table, row).await?)
    }

    // =========================================================================
    // Admin gate
    // =========================================================================

    /// The signed-in admin's session.
    pub async fn require_admin(&self) -> Result<Session> {
        let session = self
            .sessions
            .current_session()
            .await?
            .ok_or(StorefrontError::NotAuthenticated)?;

        if !self.roles.has_role(&session.user_id, ADMIN_ROLE).await? {
            warn!("User {} denied admin access", session.user_id);
            return Err(StorefrontError::AccessDenied);
        }
        debug!("Admin gate passed for {}", session.user_id);
        Ok(session)
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.sessions.sign_out().await?;
        Ok(())
    }

    // =========================================================================
    // Admin: inventory
    // =========================================================================

    pub async fn admin_phones(&self) -> Result<Vec<Phone>> {
        self.require_admin().await?;
        self.fetch_phones(SoldFilter::All).await
    }

    pub async fn add_phone(&self, form: &NewPhoneForm) -> Result<Phone> {
        self.require_admin().await?;
        let new = form.validate().inspect_err(log_rejected)?;
        let row = self.insert(Table::Phones, &new).await?;
        let phone = parse_phone(&row)?;
        info!("Added phone {} ({})", phone.display_name(), phone.id);
        Ok(phone)
    }

    pub async fn set_sold(&self, id: PhoneId, is_sold: bool) -> Result<Phone> {
        self.require_admin().await?;
        let patch = serde_json::json!({ "is_sold": is_sold });
        let row = self
            .store
            .update(Table::Phones, &id.to_string(), patch)
            .await
            .map_err(not_found)?;
        info!("Phone {} marked as {}", id, if is_sold { "sold" } else { "available" });
        Ok(parse_phone(&row)?)
    }

    /// Flip the sold flag, returning the updated phone.
    pub async fn toggle_sold(&self, id: PhoneId) -> Result<Phone> {
        let current = self.phone_detail(id).await?;
        self.set_sold(id, !current.is_sold).await
    }

    pub async fn delete_phone(&self, id: PhoneId) -> Result<()> {
        self.delete_row(Table::Phones, id).await
    }

    pub async fn delete_inquiry(&self, id: uuid::Uuid) -> Result<()> {
        self.delete_row(Table::Inquiries, id).await
    }

    pub async fn delete_request(&self, id: uuid::Uuid) -> Result<()> {
        self.delete_row(Table::SpecificRequests, id).await
    }

    pub async fn delete_contact(&self, id: uuid::Uuid) -> Result<()> {
        self.delete_row(Table::ContactSubmissions, id).await
    }

    async fn delete_row(&self, table: Table, id: uuid::Uuid) -> Result<()> {
        self.require_admin().await?;
        let id = id.to_string();
        let deleted = self.store.delete(table, &id).await?;
        if deleted == 0 {
            warn!("Delete from {} removed no rows for {}", table, id);
            return Err(StorefrontError::NothingDeleted { table, id });
        }
        info!("Deleted {} from {}", id, table);
        Ok(())
    }

    // =========================================================================
    // Admin: submissions and dashboard
    // =========================================================================

    /// Inquiries newest first, with the listing's brand and model attached.
    pub async fn inquiries(&self) -> Result<Vec<Inquiry>> {
        self.require_admin().await?;
        let query = Query::new()
            .embed(Table::Phones, "phone_id", &["brand", "model"])
            .newest_first();
        let rows = self.store.list(Table::Inquiries, &query).await?;
        Ok(parse_inquiries(&rows)?)
    }

    pub async fn requests(&self) -> Result<Vec<SpecificRequest>> {
        self.require_admin().await?;
        let rows = self
            .store
            .list(Table::SpecificRequests, &Query::new().newest_first())
            .await?;
        Ok(parse_specific_requests(&rows)?)
    }

    pub async fn contacts(&self) -> Result<Vec<ContactSubmission>> {
        self.require_admin().await?;
        let rows = self
            .store
            .list(Table::ContactSubmissions, &Query::new().newest_first())
            .await?;
        Ok(parse_contacts(&rows)?)
    }

    /// Inventory and submission counts, fetched concurrently.
    pub async fn dashboard(&self) -> Result<DashboardStats> {
        self.require_admin().await?;

        let (phones, inquiries, requests, contacts) = tokio::join!(
            self.fetch_phones(SoldFilter::All),
            self.store.count(Table::Inquiries),
            self.store.count(Table::SpecificRequests),
            self.store.count(Table::ContactSubmissions),
        );

        Ok(DashboardStats {
            inventory: InventoryStats::from_phones(&phones?),
            inquiries: inquiries?,
            specific_requests: requests?,
            contact_submissions: contacts?,
        })
    }
}

fn log_rejected(err: &StorefrontError) {
    warn!("Rejected form: {}", err);
}

fn not_found(err: StoreError) -> StorefrontError {
    match err {
        StoreError::NotFound { table, id } => StorefrontError::NotFound { table, id },
        other => other.into(),
    }
}
