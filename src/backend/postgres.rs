//! PostgreSQL backend: one table per schema, queried through a shared pool.

use crate::backend::{Backend, Record};
use crate::error::BackendError;
use crate::query::Constraint;
use crate::sql::{select_one, select_page, BindValue, QueryBuf};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::PgPool;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PgColumnType {
    Int,
    Text,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PgColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub col_type: PgColumnType,
}

impl PgColumn {
    pub fn new(name: impl Into<String>, col_type: PgColumnType) -> Self {
        PgColumn {
            name: name.into(),
            col_type,
        }
    }
}

/// The table a schema reads from. Only declared columns are selected or filtered on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PgTable {
    pub db_schema: String,
    pub table: String,
    pub columns: Vec<PgColumn>,
    /// Column giving pages a stable order. Without it row order is whatever Postgres returns.
    pub order_by: Option<String>,
}

impl PgTable {
    pub fn new(db_schema: impl Into<String>, table: impl Into<String>, columns: Vec<PgColumn>) -> Self {
        PgTable {
            db_schema: db_schema.into(),
            table: table.into(),
            columns,
            order_by: None,
        }
    }

    pub fn with_order_by(mut self, column: impl Into<String>) -> Self {
        self.order_by = Some(column.into());
        self
    }

    pub fn column(&self, name: &str) -> Option<&PgColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub struct PgBackend {
    pool: PgPool,
    table: PgTable,
}

impl PgBackend {
    pub fn new(pool: PgPool, table: PgTable) -> Self {
        PgBackend { pool, table }
    }

    async fn query_many(&self, q: &QueryBuf) -> Result<Vec<Record>, BackendError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let rows = bind_all(sqlx::query(&q.sql), &q.params).fetch_all(&self.pool).await?;
        Ok(rows.iter().map(row_to_record).collect())
    }

    async fn query_optional(&self, q: &QueryBuf) -> Result<Option<Record>, BackendError> {
        tracing::debug!(sql = %q.sql, params = ?q.params, "query");
        let row = bind_all(sqlx::query(&q.sql), &q.params).fetch_optional(&self.pool).await?;
        Ok(row.as_ref().map(row_to_record))
    }
}

#[async_trait]
impl Backend for PgBackend {
    async fn fetch_page(&self, offset: u64, count: u64) -> Result<Vec<Record>, BackendError> {
        let q = select_page(&self.table, offset, count);
        self.query_many(&q).await
    }

    async fn find_one(&self, constraints: &[Constraint]) -> Result<Record, BackendError> {
        let q = select_one(&self.table, constraints)?;
        self.query_optional(&q)
            .await?
            .ok_or_else(|| BackendError::NotFound("no entries found".into()))
    }
}

fn bind_all<'q>(
    mut query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    params: &[BindValue],
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    for p in params {
        query = match p {
            BindValue::Int(n) => query.bind(*n),
            BindValue::Text(s) => query.bind(s.clone()),
        };
    }
    query
}

fn row_to_record(row: &PgRow) -> Record {
    use sqlx::Column;
    use sqlx::Row;
    row.columns()
        .iter()
        .map(|col| (col.name().to_string(), cell_to_value(row, col.name())))
        .collect()
}

/// Best-effort decode: try the scalar types a config column can map to, else null.
fn cell_to_value(row: &PgRow, name: &str) -> Value {
    use sqlx::Row;
    if let Ok(Some(n)) = row.try_get::<Option<i16>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i32>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<i64>, _>(name) {
        return Value::Number(n.into());
    }
    if let Ok(Some(n)) = row.try_get::<Option<f64>, _>(name) {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    if let Ok(Some(b)) = row.try_get::<Option<bool>, _>(name) {
        return Value::Bool(b);
    }
    if let Ok(Some(u)) = row.try_get::<Option<uuid::Uuid>, _>(name) {
        return Value::String(u.to_string());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::DateTime<chrono::Utc>>, _>(name) {
        return Value::String(d.to_rfc3339());
    }
    if let Ok(Some(d)) = row.try_get::<Option<chrono::NaiveDateTime>, _>(name) {
        return Value::String(d.format("%Y-%m-%dT%H:%M:%S%.f").to_string());
    }
    if let Ok(Some(s)) = row.try_get::<Option<String>, _>(name) {
        return Value::String(s);
    }
    if let Ok(Some(j)) = row.try_get::<Option<Value>, _>(name) {
        return j;
    }
    Value::Null
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_config_deserializes() {
        let c: PgColumn = serde_json::from_str(r#"{"name": "age", "type": "int"}"#).unwrap();
        assert_eq!(c, PgColumn::new("age", PgColumnType::Int));
    }

    #[test]
    fn table_column_lookup() {
        let t = PgTable::new("public", "users", vec![PgColumn::new("name", PgColumnType::Text)]).with_order_by("name");
        assert!(t.column("name").is_some());
        assert!(t.column("Name").is_none());
        assert_eq!(t.order_by.as_deref(), Some("name"));
    }
}
