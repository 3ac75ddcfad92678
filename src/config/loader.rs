//! Load config from JSON and bind each schema to a Postgres backend.

use crate::backend::{PgBackend, PgTable};
use crate::config::{validate, ApiConfig};
use crate::error::ConfigError;
use crate::routes::{RouteConfig, Schema};
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;

/// Parse and validate a JSON config document.
pub fn load_from_str(json: &str) -> Result<ApiConfig, ConfigError> {
    let config: ApiConfig = serde_json::from_str(json).map_err(|e| ConfigError::Load(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

pub async fn load_from_path(path: impl AsRef<Path>) -> Result<ApiConfig, ConfigError> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading config");
    let json = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    load_from_str(&json)
}

/// Route config with one `PgBackend` per schema, all sharing `pool`.
pub fn build_route_config(config: &ApiConfig, pool: PgPool) -> RouteConfig {
    let schemas = config
        .schemas
        .iter()
        .map(|s| {
            let mut table = PgTable::new(s.db_schema.clone(), s.table.clone(), s.columns.clone());
            table.order_by = s.order_by.clone();
            Schema::new(s.name.clone(), Arc::new(PgBackend::new(pool.clone(), table)))
        })
        .collect();
    RouteConfig {
        root: config.root.clone(),
        schemas,
    }
}
