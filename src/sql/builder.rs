//! Builds parameterized SELECTs for the Postgres backend from a table description.

use crate::backend::{PgColumnType, PgTable};
use crate::error::BackendError;
use crate::query::{Comparator, Constraint};

/// A value bound to a numbered placeholder.
#[derive(Clone, Debug, PartialEq)]
pub enum BindValue {
    Int(i64),
    Text(String),
}

pub struct QueryBuf {
    pub sql: String,
    pub params: Vec<BindValue>,
}

impl QueryBuf {
    fn new() -> Self {
        QueryBuf {
            sql: String::new(),
            params: Vec::new(),
        }
    }

    fn push_param(&mut self, v: BindValue) -> u32 {
        let n = self.params.len() as u32 + 1;
        self.params.push(v);
        n
    }
}

/// Quote identifier for PostgreSQL (safe: only from config).
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}

fn qualified_table(table: &PgTable) -> String {
    format!("{}.{}", quoted(&table.db_schema), quoted(&table.table))
}

fn select_column_list(table: &PgTable) -> String {
    table
        .columns
        .iter()
        .map(|c| quoted(&c.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn order_clause(table: &PgTable) -> String {
    table
        .order_by
        .as_deref()
        .map(|c| format!(" ORDER BY {}", quoted(c)))
        .unwrap_or_default()
}

fn sql_operator(comparator: Comparator) -> &'static str {
    match comparator {
        Comparator::Eq => "=",
        Comparator::Ne => "<>",
        Comparator::Lt => "<",
        Comparator::Le => "<=",
        Comparator::Gt => ">",
        Comparator::Ge => ">=",
    }
}

fn to_i64(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}

/// SELECT a page: optional ORDER BY, then LIMIT $1 OFFSET $2.
pub fn select_page(table: &PgTable, offset: u64, count: u64) -> QueryBuf {
    let mut q = QueryBuf::new();
    let limit = q.push_param(BindValue::Int(to_i64(count)));
    let off = q.push_param(BindValue::Int(to_i64(offset)));
    q.sql = format!(
        "SELECT {} FROM {}{} LIMIT ${} OFFSET ${}",
        select_column_list(table),
        qualified_table(table),
        order_clause(table),
        limit,
        off
    );
    q
}

/// SELECT the first row matching all constraints.
/// Constraints on columns the table does not declare are dropped.
pub fn select_one(table: &PgTable, constraints: &[Constraint]) -> Result<QueryBuf, BackendError> {
    let mut q = QueryBuf::new();
    let mut where_parts = Vec::new();
    for c in constraints {
        let Some(column) = table.column(&c.property) else {
            tracing::debug!(property = %c.property, table = %table.table, "skipping constraint on unknown column");
            continue;
        };
        let value = match column.col_type {
            PgColumnType::Int => BindValue::Int(c.value.parse().map_err(|_| BackendError::InvalidValue {
                property: c.property.clone(),
                value: c.value.clone(),
            })?),
            PgColumnType::Text => BindValue::Text(c.value.clone()),
        };
        let n = q.push_param(value);
        where_parts.push(format!("{} {} ${}", quoted(&column.name), sql_operator(c.comparator), n));
    }
    let where_clause = if where_parts.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", where_parts.join(" AND "))
    };
    q.sql = format!(
        "SELECT {} FROM {}{}{} LIMIT 1",
        select_column_list(table),
        qualified_table(table),
        where_clause,
        order_clause(table)
    );
    Ok(q)
}
