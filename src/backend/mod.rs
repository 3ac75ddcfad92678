//! Backend adapter contract: the two data-access capabilities every schema needs.

mod memory;
mod postgres;
pub use memory::MemoryBackend;
pub use postgres::{PgBackend, PgColumn, PgColumnType, PgTable};

use crate::error::BackendError;
use crate::query::Constraint;
use async_trait::async_trait;

/// A record is a field name to scalar mapping. The route layer never looks inside.
pub type Record = serde_json::Map<String, serde_json::Value>;

#[async_trait]
pub trait Backend: Send + Sync {
    /// At most `count` records starting at position `offset` in a stable order.
    /// An offset past the end yields an empty page, not an error.
    async fn fetch_page(&self, offset: u64, count: u64) -> Result<Vec<Record>, BackendError>;

    /// First record satisfying every constraint.
    ///
    /// What an empty constraint list means is up to the implementation.
    async fn find_one(&self, constraints: &[Constraint]) -> Result<Record, BackendError>;
}
