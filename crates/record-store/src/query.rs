//! Query description shared by every store implementation.
//!
//! A query is a conjunction of column equality predicates, an optional
//! ordering, an optional row limit and an optional embedded lookup of a
//! related table. [`Query::to_params`] renders it in PostgREST syntax; the
//! in-memory store evaluates it directly with [`Query::matches`].

use std::cmp::Ordering;

use serde_json::Value;

use crate::store::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub column: String,
    pub direction: Direction,
}

/// Embed columns of a related row, looked up through a foreign key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Embed {
    pub table: Table,
    pub foreign_key: String,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<(String, Value)>,
    pub order: Option<OrderBy>,
    pub limit: Option<usize>,
    pub embed: Option<Embed>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column == value`.
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(OrderBy {
            column: column.into(),
            direction,
        });
        self
    }

    /// Order by `created_at`, most recent first.
    pub fn newest_first(self) -> Self {
        self.order_by("created_at", Direction::Descending)
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn embed(mut self, table: Table, foreign_key: impl Into<String>, columns: &[&str]) -> Self {
        self.embed = Some(Embed {
            table,
            foreign_key: foreign_key.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    /// Whether `row` satisfies every equality predicate.
    pub fn matches(&self, row: &Value) -> bool {
        self.filters
            .iter()
            .all(|(column, expected)| row.get(column) == Some(expected))
    }

    /// Ordering between two rows under this query's `order`.
    ///
    /// Rows missing the column sort after rows that have it.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let Some(order) = &self.order else {
            return Ordering::Equal;
        };
        let left = a.get(&order.column).filter(|v| !v.is_null());
        let right = b.get(&order.column).filter(|v| !v.is_null());
        let ordering = match (left, right) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Greater,
            (Some(_), None) => return Ordering::Less,
            (Some(l), Some(r)) => compare_values(l, r),
        };
        match order.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }

    /// Render as PostgREST query-string parameters.
    pub fn to_params(&self) -> Vec<(String, String)> {
        let select = match &self.embed {
            None => "*".to_string(),
            Some(embed) => format!("*,{}({})", embed.table.name(), embed.columns.join(",")),
        };
        let mut params = vec![("select".to_string(), select)];

        for (column, value) in &self.filters {
            params.push((column.clone(), format!("eq.{}", literal(value))));
        }
        if let Some(order) = &self.order {
            let direction = match order.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
        }
        if let Some(limit) = self.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }
        params
    }
}

/// Value as it appears after `eq.` in a PostgREST filter.
fn literal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}
