//! End-to-end storefront flows over the in-memory store.

use std::sync::Arc;

use async_trait::async_trait;
use catalog_filter::{CatalogView, FilterCriteria, ListingState, Visible};
use record_store::{
    InMemoryStore, Query, RecordStore, Session, StaticSessionProvider, StoreError,
    StoreRoleChecker, Table,
};
use serde_json::{Value, json};
use storefront::{
    ContactForm, FEATURED_LIMIT, InquiryForm, LoadOutcome, NewPhoneForm, RequestForm, Severity,
    SoldFilter, Storefront, StorefrontError,
};
use tokio::sync::{Mutex, oneshot};
use uuid::Uuid;

// ============================================================================
// Fixtures
// ============================================================================

fn phone_row(brand: &str, model: &str, price: u32, condition: &str, sold: bool, day: u32) -> Value {
    json!({
        "id": Uuid::new_v4().to_string(),
        "brand": brand,
        "model": model,
        "price": price,
        "storage": "128GB",
        "ram": "6GB",
        "condition": condition,
        "battery_health": 88,
        "images": ["https://img.example/1.jpg"],
        "is_negotiable": true,
        "is_sold": sold,
        "created_at": format!("2025-01-{:02}T10:00:00+00:00", day),
    })
}

fn inventory() -> Vec<Value> {
    vec![
        phone_row("Apple", "iPhone 13", 45000, "Good", false, 1),
        phone_row("Samsung", "Galaxy S21", 30000, "Excellent", false, 2),
        phone_row("OnePlus", "Nord 2", 15000, "Fair", true, 3),
        phone_row("Google", "Pixel 7", 28000, "Like New", false, 4),
        phone_row("Xiaomi", "Redmi Note 12", 9999, "Good", false, 5),
        phone_row("Realme", "GT 2", 20000, "Excellent", false, 6),
        phone_row("Samsung", "Galaxy A54", 24000, "Good", false, 7),
    ]
}

struct Shop {
    storefront: Storefront,
    store: InMemoryStore,
    admin: Uuid,
}

fn shop(signed_in_as_admin: bool) -> Shop {
    let admin = Uuid::new_v4();
    let store = InMemoryStore::from_json(&json!({
        "phones": inventory(),
        "user_roles": [{"user_id": admin.to_string(), "role": "admin"}]
    }))
    .unwrap();
    let shared: Arc<dyn RecordStore> = Arc::new(store.clone());

    let sessions = if signed_in_as_admin {
        StaticSessionProvider::signed_in(Session::new(admin).with_email("owner@shop.in"))
    } else {
        StaticSessionProvider::anonymous()
    };

    Shop {
        storefront: Storefront::new(
            shared.clone(),
            Arc::new(sessions),
            Arc::new(StoreRoleChecker::new(shared)),
        ),
        store,
        admin,
    }
}

fn inquiry_form() -> InquiryForm {
    InquiryForm {
        name: "Asha".into(),
        email: "asha@example.in".into(),
        phone: "9876543210".into(),
        message: Some("Is the price negotiable?".into()),
    }
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_catalog_hides_sold_and_lists_newest_first() {
    let shop = shop(false);
    let view = Mutex::new(CatalogView::new());

    let outcome = shop
        .storefront
        .load_catalog(&view, SoldFilter::AvailableOnly)
        .await
        .unwrap();
    assert_eq!(outcome, LoadOutcome::Applied(6));

    let mut view = view.lock().await;
    match view.visible() {
        Visible::Phones(phones) => {
            assert_eq!(phones[0].model, "Galaxy A54");
            assert!(phones.iter().all(|p| !p.is_sold));
        }
        other => panic!("expected phones, got {other:?}"),
    }

    view.set_criteria(FilterCriteria::from_raw("galaxy", "samsung", "all", "20000-40000"));
    assert_eq!(view.summary(), "Showing 2 phones");

    view.set_search("nonexistent");
    assert_eq!(view.summary(), "No phones found matching your criteria");
}

#[tokio::test]
async fn test_featured_is_limited_and_available() {
    let shop = shop(false);
    let featured = shop.storefront.featured_phones(FEATURED_LIMIT).await.unwrap();
    let models: Vec<&str> = featured.iter().map(|p| p.model.as_str()).collect();
    assert_eq!(
        models,
        vec!["Galaxy A54", "GT 2", "Redmi Note 12", "Pixel 7", "Galaxy S21"]
    );
}

#[tokio::test]
async fn test_phone_detail_not_found() {
    let shop = shop(false);
    let err = shop.storefront.phone_detail(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, StorefrontError::NotFound { table: Table::Phones, .. }));
}

/// Store whose first `list` call holds its answer until released.
struct GatedStore {
    inner: InMemoryStore,
    gate: std::sync::Mutex<Option<(oneshot::Sender<()>, oneshot::Receiver<()>)>>,
}

#[async_trait]
impl RecordStore for GatedStore {
    async fn list(&self, table: Table, query: &Query) -> record_store::Result<Vec<Value>> {
        let rows = self.inner.list(table, query).await?;
        let gate = self.gate.lock().unwrap().take();
        if let Some((entered, release)) = gate {
            let _ = entered.send(());
            let _ = release.await;
        }
        Ok(rows)
    }

    async fn get_by_id(&self, table: Table, id: &str) -> record_store::Result<Option<Value>> {
        self.inner.get_by_id(table, id).await
    }

    async fn insert(&self, table: Table, row: Value) -> record_store::Result<Value> {
        self.inner.insert(table, row).await
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> record_store::Result<Value> {
        self.inner.update(table, id, patch).await
    }

    async fn delete(&self, table: Table, id: &str) -> record_store::Result<u64> {
        self.inner.delete(table, id).await
    }

    async fn count(&self, table: Table) -> record_store::Result<u64> {
        self.inner.count(table).await
    }
}

#[tokio::test]
async fn test_stale_catalog_fetch_is_discarded() {
    let inner = InMemoryStore::from_json(&json!({
        "phones": [phone_row("Apple", "iPhone 13", 45000, "Good", false, 1)]
    }))
    .unwrap();
    let (entered_tx, entered_rx) = oneshot::channel();
    let (release_tx, release_rx) = oneshot::channel();
    let store: Arc<dyn RecordStore> = Arc::new(GatedStore {
        inner: inner.clone(),
        gate: std::sync::Mutex::new(Some((entered_tx, release_rx))),
    });
    let storefront = Storefront::new(
        store.clone(),
        Arc::new(StaticSessionProvider::anonymous()),
        Arc::new(StoreRoleChecker::new(store)),
    );
    let view = Arc::new(Mutex::new(CatalogView::new()));

    let slow = tokio::spawn({
        let storefront = storefront.clone();
        let view = view.clone();
        async move { storefront.load_catalog(&view, SoldFilter::AvailableOnly).await }
    });
    entered_rx.await.unwrap();

    inner
        .insert(Table::Phones, phone_row("Google", "Pixel 7", 28000, "Good", false, 2))
        .await
        .unwrap();
    let fresh = storefront
        .load_catalog(&view, SoldFilter::AvailableOnly)
        .await
        .unwrap();
    assert_eq!(fresh, LoadOutcome::Applied(2));

    release_tx.send(()).unwrap();
    assert_eq!(slow.await.unwrap().unwrap(), LoadOutcome::Discarded);

    let view = view.lock().await;
    match view.listing() {
        ListingState::Ready(phones) => assert_eq!(phones.len(), 2),
        other => panic!("expected ready listing, got {other:?}"),
    }
}

// ============================================================================
// Customer submissions
// ============================================================================

#[tokio::test]
async fn test_inquiry_is_stored_and_listed_with_phone() {
    let shop = shop(true);
    let phone = shop.storefront.featured_phones(1).await.unwrap().remove(0);

    let inquiry = shop
        .storefront
        .submit_inquiry(phone.id, &inquiry_form())
        .await
        .unwrap();
    assert_eq!(inquiry.phone_id, Some(phone.id));

    let listed = shop.storefront.inquiries().await.unwrap();
    assert_eq!(listed.len(), 1);
    let listing = listed[0].listing.as_ref().unwrap();
    assert_eq!(listing.brand, phone.brand);
    assert_eq!(listing.model, phone.model);
}

#[tokio::test]
async fn test_invalid_inquiry_is_not_stored() {
    let shop = shop(false);
    let mut form = inquiry_form();
    form.email = "asha-at-example".into();

    let err = shop
        .storefront
        .submit_inquiry(Uuid::new_v4(), &form)
        .await
        .unwrap_err();
    let notice = err.notice();
    assert_eq!(notice.title, "Validation Error");
    assert_eq!(notice.severity, Severity::Error);
    assert_eq!(shop.store.count(Table::Inquiries).await.unwrap(), 0);
}

#[tokio::test]
async fn test_request_and_contact_submissions() {
    let shop = shop(true);
    let request = shop
        .storefront
        .submit_request(&RequestForm {
            name: "Ravi".into(),
            email: "ravi@example.in".into(),
            phone: "9123456780".into(),
            model_requested: "Pixel 8 Pro".into(),
            budget: Some(40000.0),
            message: None,
        })
        .await
        .unwrap();
    assert_eq!(request.model_requested, "Pixel 8 Pro");

    shop.storefront
        .submit_contact(&ContactForm {
            name: "Meera".into(),
            email: "meera@example.in".into(),
            phone: None,
            subject: Some("Warranty".into()),
            message: "Do refurbished phones carry a warranty?".into(),
        })
        .await
        .unwrap();

    assert_eq!(shop.storefront.requests().await.unwrap().len(), 1);
    let contacts = shop.storefront.contacts().await.unwrap();
    assert_eq!(contacts[0].subject.as_deref(), Some("Warranty"));
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_admin_operations_require_admin() {
    let shop = shop(false);
    assert!(matches!(
        shop.storefront.dashboard().await,
        Err(StorefrontError::NotAuthenticated)
    ));
    assert!(matches!(
        shop.storefront.delete_phone(Uuid::new_v4()).await,
        Err(StorefrontError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_add_toggle_and_delete_phone() {
    let shop = shop(true);
    assert!(shop.storefront.require_admin().await.unwrap().user_id == shop.admin);

    let added = shop
        .storefront
        .add_phone(&NewPhoneForm {
            brand: "Nothing".into(),
            model: "Phone (2)".into(),
            price: "32000".into(),
            storage: "256GB".into(),
            ram: "12GB".into(),
            condition: "Excellent".into(),
            images: "https://img.example/a.jpg, https://img.example/b.jpg".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    assert!(!added.is_sold);
    assert_eq!(added.images.len(), 2);

    let sold = shop.storefront.toggle_sold(added.id).await.unwrap();
    assert!(sold.is_sold);
    let available = shop.storefront.toggle_sold(added.id).await.unwrap();
    assert!(!available.is_sold);

    shop.storefront.delete_phone(added.id).await.unwrap();
    let err = shop.storefront.delete_phone(added.id).await.unwrap_err();
    assert!(matches!(err, StorefrontError::NothingDeleted { table: Table::Phones, .. }));
    assert_eq!(err.notice().title, "Delete Failed");
}

#[tokio::test]
async fn test_set_sold_on_missing_phone() {
    let shop = shop(true);
    let err = shop.storefront.set_sold(Uuid::new_v4(), true).await.unwrap_err();
    assert!(matches!(err, StorefrontError::NotFound { .. }));
}

#[tokio::test]
async fn test_admin_inventory_includes_sold() {
    let shop = shop(true);
    let phones = shop.storefront.admin_phones().await.unwrap();
    assert_eq!(phones.len(), 7);
    assert_eq!(phones.iter().filter(|p| p.is_sold).count(), 1);
}

#[tokio::test]
async fn test_dashboard_counts() {
    let shop = shop(true);
    let phone = shop.storefront.featured_phones(1).await.unwrap().remove(0);
    shop.storefront
        .submit_inquiry(phone.id, &inquiry_form())
        .await
        .unwrap();

    let stats = shop.storefront.dashboard().await.unwrap();
    assert_eq!(stats.inventory.total, 7);
    assert_eq!(stats.inventory.available, 6);
    assert_eq!(stats.inventory.sold, 1);
    assert_eq!(stats.inquiries, 1);
    assert_eq!(stats.specific_requests, 0);
    assert_eq!(stats.contact_submissions, 0);
}

#[tokio::test]
async fn test_sign_out_closes_admin_gate() {
    let shop = shop(true);
    shop.storefront.require_admin().await.unwrap();
    shop.storefront.sign_out().await.unwrap();
    assert!(matches!(
        shop.storefront.require_admin().await,
        Err(StorefrontError::NotAuthenticated)
    ));
}

#[tokio::test]
async fn test_store_failures_surface_as_errors() {
    struct Down;

    #[async_trait]
    impl RecordStore for Down {
        async fn list(&self, _: Table, _: &Query) -> record_store::Result<Vec<Value>> {
            Err(StoreError::Http {
                status: 503,
                message: "service unavailable".into(),
            })
        }
        async fn get_by_id(&self, _: Table, _: &str) -> record_store::Result<Option<Value>> {
            Ok(None)
        }
        async fn insert(&self, _: Table, row: Value) -> record_store::Result<Value> {
            Ok(row)
        }
        async fn update(&self, _: Table, _: &str, patch: Value) -> record_store::Result<Value> {
            Ok(patch)
        }
        async fn delete(&self, _: Table, _: &str) -> record_store::Result<u64> {
            Ok(0)
        }
        async fn count(&self, _: Table) -> record_store::Result<u64> {
            Ok(0)
        }
    }

    let store: Arc<dyn RecordStore> = Arc::new(Down);
    let storefront = Storefront::new(
        store.clone(),
        Arc::new(StaticSessionProvider::anonymous()),
        Arc::new(StoreRoleChecker::new(store)),
    );
    let view = Mutex::new(CatalogView::new());

    let err = storefront
        .load_catalog(&view, SoldFilter::AvailableOnly)
        .await
        .unwrap_err();
    assert_eq!(err.notice().description, "service unavailable");

    let mut view = view.lock().await;
    assert!(matches!(view.visible(), Visible::Failed(_)));
    assert!(view.summary().starts_with("Could not load phones"));
}
