//! Sessions and roles.
//!
//! The back office is gated on two questions: is someone signed in, and do
//! they hold the admin role. [`SessionProvider`] answers the first and
//! [`RoleChecker`] the second, so the gate can run against the hosted auth
//! service or against fixed values in tests and offline mode.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use phone_records::{UserId, parse_user_role};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::store::{RecordStore, Table};

/// A signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub email: Option<String>,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The current session, or `None` when nobody is signed in.
    async fn current_session(&self) -> Result<Option<Session>>;

    async fn sign_out(&self) -> Result<()>;
}

#[async_trait]
pub trait RoleChecker: Send + Sync {
    async fn has_role(&self, user_id: &UserId, role: &str) -> Result<bool>;
}

// =============================================================================
// Static sessions
// =============================================================================

/// Session fixed at construction, cleared by `sign_out`.
#[derive(Debug, Default)]
pub struct StaticSessionProvider {
    session: RwLock<Option<Session>>,
}

impl StaticSessionProvider {
    pub fn signed_in(session: Session) -> Self {
        Self {
            session: RwLock::new(Some(session)),
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionProvider for StaticSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        let session = self
            .session
            .read()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire read lock: {}", e)))?;
        Ok(session.clone())
    }

    async fn sign_out(&self) -> Result<()> {
        let mut session = self
            .session
            .write()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire write lock: {}", e)))?;
        *session = None;
        Ok(())
    }
}

// =============================================================================
// Hosted auth service
// =============================================================================

/// Access token shared between the session provider and the REST store, so
/// signing out also drops the store's user credentials.
pub type SharedToken = Arc<RwLock<Option<String>>>;

pub(crate) fn read_token(token: &SharedToken) -> Result<Option<String>> {
    let token = token
        .read()
        .map_err(|e| StoreError::Lock(format!("Failed to acquire read lock: {}", e)))?;
    Ok(token.clone())
}

/// Sessions resolved against `{base_url}/auth/v1`.
///
/// The access token comes from [`StoreConfig::access_token`]; without one
/// nobody is signed in.
pub struct RestSessionProvider {
    client: Client,
    config: StoreConfig,
    token: SharedToken,
}

impl RestSessionProvider {
    pub fn new(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        let token = Arc::new(RwLock::new(config.access_token.clone()));
        Ok(Self {
            client,
            config,
            token,
        })
    }

    /// Handle to the live token, for a [`crate::RestStore`] that should
    /// follow this provider's sign-in state.
    pub fn token_handle(&self) -> SharedToken {
        Arc::clone(&self.token)
    }

    fn token(&self) -> Result<Option<String>> {
        read_token(&self.token)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.config.base(), path)
    }
}

#[async_trait]
impl SessionProvider for RestSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        let Some(token) = self.token()? else {
            return Ok(None);
        };

        let response = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.config.api_key)
            .bearer_auth(&token)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                warn!("Access token rejected, treating as signed out");
                return Ok(None);
            }
            status if !status.is_success() => {
                return Err(StoreError::Http {
                    status: status.as_u16(),
                    message: response.text().await.unwrap_or_default(),
                });
            }
            _ => {}
        }

        let user: Value = response.json().await?;
        let user_id = user
            .get("id")
            .and_then(Value::as_str)
            .and_then(|id| Uuid::parse_str(id).ok())
            .ok_or_else(|| StoreError::Protocol("auth user has no valid id".to_string()))?;
        let email = user.get("email").and_then(Value::as_str).map(str::to_string);

        debug!("Resolved session for user {}", user_id);
        Ok(Some(Session { user_id, email }))
    }

    async fn sign_out(&self) -> Result<()> {
        if let Some(token) = self.token()? {
            let response = self
                .client
                .post(self.auth_url("logout"))
                .header("apikey", &self.config.api_key)
                .bearer_auth(&token)
                .send()
                .await?;
            if !response.status().is_success() {
                warn!("Logout returned {}, clearing local session anyway", response.status());
            }
        }

        let mut token = self
            .token
            .write()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire write lock: {}", e)))?;
        *token = None;
        info!("Signed out");
        Ok(())
    }
}

// =============================================================================
// Roles
// =============================================================================

/// Role lookup through the `user_roles` table of any record store.
#[derive(Clone)]
pub struct StoreRoleChecker {
    store: Arc<dyn RecordStore>,
}

impl StoreRoleChecker {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoleChecker for StoreRoleChecker {
    async fn has_role(&self, user_id: &UserId, role: &str) -> Result<bool> {
        let query = Query::new()
            .eq("user_id", user_id.to_string())
            .eq("role", role)
            .limit(1);
        let rows = self.store.list(Table::UserRoles, &query).await?;

        for row in &rows {
            let granted = parse_user_role(row)?;
            if granted.user_id == *user_id && granted.role == role {
                return Ok(true);
            }
        }
        Ok(false)
    }
}
