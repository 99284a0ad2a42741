//! Record store backed by a hosted PostgREST endpoint.
//!
//! Rows live under `{base_url}/rest/v1/{table}`. Every request carries the
//! project key in `apikey` and a bearer token (the signed-in user's token
//! when there is one), so row-level permissions apply on the server side.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;
use tracing::{debug, error};

use crate::auth::{SharedToken, read_token};
use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::store::{RecordStore, Table};

const RETURN_REPRESENTATION: &str = "return=representation";

#[derive(Clone)]
pub struct RestStore {
    client: Client,
    config: StoreConfig,
    token: SharedToken,
}

impl RestStore {
    /// Store holding its own copy of [`StoreConfig::access_token`].
    pub fn new(config: StoreConfig) -> Result<Self> {
        let token = Arc::new(RwLock::new(config.access_token.clone()));
        Self::with_token(config, token)
    }

    /// Store that authenticates with a token owned elsewhere, typically
    /// [`crate::RestSessionProvider::token_handle`]. Once the token is
    /// cleared requests fall back to the project key.
    pub fn with_token(config: StoreConfig, token: SharedToken) -> Result<Self> {
        config.validate()?;
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            config,
            token,
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.config.base(), table.name())
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder> {
        let bearer = read_token(&self.token)?.unwrap_or_else(|| self.config.api_key.clone());
        Ok(request
            .header("apikey", &self.config.api_key)
            .bearer_auth(bearer))
    }

    async fn rows(&self, request: RequestBuilder) -> Result<Vec<Value>> {
        let response = check(self.authorized(request)?.send().await?).await?;
        let body: Value = response.json().await?;
        match body {
            Value::Array(rows) => Ok(rows),
            other => Err(StoreError::Protocol(format!(
                "expected an array of rows, got {}",
                other
            ))),
        }
    }
}

/// Turn a non-success response into [`StoreError::Http`].
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let text = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&text)
        .ok()
        .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_string))
        .unwrap_or(text);
    error!("Record store request failed with {}: {}", status, message);
    Err(StoreError::Http {
        status: status.as_u16(),
        message,
    })
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.trim().parse().ok()
}

fn id_filter(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

#[async_trait]
impl RecordStore for RestStore {
    async fn list(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        let params = query.to_params();
        debug!("GET {} {:?}", table, params);
        self.rows(self.client.get(self.table_url(table)).query(&params))
            .await
    }

    async fn get_by_id(&self, table: Table, id: &str) -> Result<Option<Value>> {
        let query = Query::new().eq("id", id).limit(1);
        Ok(self.list(table, &query).await?.into_iter().next())
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value> {
        debug!("POST {}", table);
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&row);
        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::Protocol(format!("insert into {} returned no row", table)))
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<Value> {
        debug!("PATCH {} id={}", table, id);
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&id_filter(id))
            .header("Prefer", RETURN_REPRESENTATION)
            .json(&patch);
        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound {
                table,
                id: id.to_string(),
            })
    }

    async fn delete(&self, table: Table, id: &str) -> Result<u64> {
        debug!("DELETE {} id={}", table, id);
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&id_filter(id))
            .header("Prefer", "return=representation,count=exact");
        let response = check(self.authorized(request)?.send().await?).await?;

        let counted = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);
        if let Some(count) = counted {
            return Ok(count);
        }
        let rows: Vec<Value> = response.json().await?;
        Ok(rows.len() as u64)
    }

    async fn count(&self, table: Table) -> Result<u64> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&[("select", "id"), ("limit", "0")])
            .header("Prefer", "count=exact");
        let response = check(self.authorized(request)?.send().await?).await?;

        let header = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| StoreError::Protocol("count response had no Content-Range".into()))?;
        parse_content_range(header)
            .ok_or_else(|| StoreError::Protocol(format!("unreadable Content-Range {header:?}")))
    }
}
