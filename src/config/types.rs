//! Raw config types matching the JSON config file.

use crate::backend::PgColumn;
use serde::{Deserialize, Serialize};

fn default_db_schema() -> String {
    "public".into()
}

/// One routed schema backed by a single Postgres table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Route name; folded to lowercase when routes are synthesized.
    pub name: String,
    pub table: String,
    #[serde(default = "default_db_schema")]
    pub db_schema: String,
    #[serde(default)]
    pub order_by: Option<String>,
    pub columns: Vec<PgColumn>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub root: Option<String>,
    #[serde(default)]
    pub schemas: Vec<SchemaConfig>,
}
