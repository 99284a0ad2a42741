//! In-memory record store for tests, demos and offline data files.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::query::Query;
use crate::store::{RecordStore, Table};

/// Tables held as JSON rows in insertion order.
///
/// Cloning shares the underlying tables.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<HashMap<Table, Vec<Value>>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a document shaped `{ "phones": [...], "inquiries": [...] }`.
    ///
    /// Rows keep whatever `id` and `created_at` they carry; missing ones are
    /// filled in as on insert.
    pub fn from_json(document: &Value) -> Result<Self> {
        let object = document.as_object().ok_or_else(|| {
            StoreError::Protocol("seed document must be a JSON object".to_string())
        })?;

        let mut tables = HashMap::new();
        for (name, rows) in object {
            let table: Table = name.parse()?;
            let rows = rows.as_array().ok_or_else(|| {
                StoreError::Protocol(format!("seed table {name} must be an array"))
            })?;
            let rows = rows
                .iter()
                .cloned()
                .map(stamp)
                .collect::<Result<Vec<_>>>()?;
            debug!("Seeded {} rows into {}", rows.len(), table);
            tables.insert(table, rows);
        }

        Ok(Self {
            tables: Arc::new(RwLock::new(tables)),
        })
    }

    /// Snapshot every non-empty table in the shape [`InMemoryStore::from_json`]
    /// accepts.
    pub fn to_json(&self) -> Result<Value> {
        let tables = self
            .tables
            .read()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire read lock: {}", e)))?;

        let document: Map<String, Value> = Table::ALL
            .into_iter()
            .filter_map(|table| {
                let rows = tables.get(&table).filter(|rows| !rows.is_empty())?;
                Some((table.name().to_string(), Value::Array(rows.clone())))
            })
            .collect();
        Ok(Value::Object(document))
    }

    fn read_rows<T>(&self, table: Table, f: impl FnOnce(&[Value]) -> T) -> Result<T> {
        let tables = self
            .tables
            .read()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire read lock: {}", e)))?;
        Ok(f(tables.get(&table).map(Vec::as_slice).unwrap_or(&[])))
    }

    fn write_rows<T>(&self, table: Table, f: impl FnOnce(&mut Vec<Value>) -> T) -> Result<T> {
        let mut tables = self
            .tables
            .write()
            .map_err(|e| StoreError::Lock(format!("Failed to acquire write lock: {}", e)))?;
        Ok(f(tables.entry(table).or_default()))
    }

    /// Attach the embedded related row the way the hosted store does for
    /// `select=*,phones(brand,model)`.
    fn embed_related(&self, query: &Query, rows: &mut [Value]) -> Result<()> {
        let Some(embed) = &query.embed else {
            return Ok(());
        };
        let related = self.read_rows(embed.table, |rows| rows.to_vec())?;

        for row in rows.iter_mut() {
            let key = row.get(&embed.foreign_key).cloned();
            let found = key.filter(|k| !k.is_null()).and_then(|k| {
                related
                    .iter()
                    .find(|candidate| candidate.get("id") == Some(&k))
            });
            let value = match found {
                Some(candidate) => {
                    let picked: Map<String, Value> = embed
                        .columns
                        .iter()
                        .map(|c| (c.clone(), candidate.get(c).cloned().unwrap_or(Value::Null)))
                        .collect();
                    Value::Object(picked)
                }
                None => Value::Null,
            };
            if let Some(object) = row.as_object_mut() {
                object.insert(embed.table.name().to_string(), value);
            }
        }
        Ok(())
    }
}

/// Fill in `id` and `created_at` when the row lacks them.
fn stamp(row: Value) -> Result<Value> {
    let Value::Object(mut object) = row else {
        return Err(StoreError::Protocol("rows must be JSON objects".to_string()));
    };
    if object.get("id").is_none_or(Value::is_null) {
        object.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
    }
    if object.get("created_at").is_none_or(Value::is_null) {
        object.insert("created_at".to_string(), Value::String(Utc::now().to_rfc3339()));
    }
    Ok(Value::Object(object))
}

fn has_id(row: &Value, id: &str) -> bool {
    row.get("id").and_then(Value::as_str) == Some(id)
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn list(&self, table: Table, query: &Query) -> Result<Vec<Value>> {
        let mut rows: Vec<Value> = self.read_rows(table, |rows| {
            rows.iter().filter(|row| query.matches(row)).cloned().collect()
        })?;

        // Stable sort keeps insertion order among equal keys.
        rows.sort_by(|a, b| query.compare(a, b));
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        self.embed_related(query, &mut rows)?;

        debug!("Listed {} rows from {}", rows.len(), table);
        Ok(rows)
    }

    async fn get_by_id(&self, table: Table, id: &str) -> Result<Option<Value>> {
        self.read_rows(table, |rows| rows.iter().find(|row| has_id(row, id)).cloned())
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Value> {
        let row = stamp(row)?;
        self.write_rows(table, |rows| rows.push(row.clone()))?;
        Ok(row)
    }

    async fn update(&self, table: Table, id: &str, patch: Value) -> Result<Value> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::Protocol("update patch must be a JSON object".to_string()));
        };

        let updated = self.write_rows(table, |rows| {
            let row = rows.iter_mut().find(|row| has_id(row, id))?;
            if let Some(object) = row.as_object_mut() {
                for (key, value) in patch {
                    object.insert(key, value);
                }
            }
            Some(row.clone())
        })?;

        updated.ok_or_else(|| StoreError::NotFound {
            table,
            id: id.to_string(),
        })
    }

    async fn delete(&self, table: Table, id: &str) -> Result<u64> {
        self.write_rows(table, |rows| {
            let before = rows.len();
            rows.retain(|row| !has_id(row, id));
            (before - rows.len()) as u64
        })
    }

    async fn count(&self, table: Table) -> Result<u64> {
        self.read_rows(table, |rows| rows.len() as u64)
    }
}
