//! easyapi SDK: REST-like routes synthesized from named schemas over pluggable backends.

pub mod backend;
pub mod config;
pub mod error;
pub mod operation;
pub mod query;
pub mod response;
pub mod routes;
pub mod sql;

pub use backend::{Backend, MemoryBackend, PgBackend, PgColumn, PgColumnType, PgTable, Record};
pub use config::{build_route_config, load_from_path, load_from_str, ApiConfig, SchemaConfig};
pub use error::{AppError, BackendError, ConfigError};
pub use operation::{operations, FindOneOperation, ListOperation, Method, Operation, OperationResult};
pub use query::{parse_constraints, Comparator, Constraint, ParsedParams};
pub use routes::{common_routes, route_by_path, router, synthesize, RouteConfig, RouteDescriptor, Schema};
