//! Route synthesis: every schema crossed with every registered operation.

use crate::backend::Backend;
use crate::error::{AppError, ConfigError};
use crate::operation::{operations, Method, Operation, OperationResult};
use crate::query::ParsedParams;
use std::fmt;
use std::sync::Arc;

pub const DEFAULT_ROOT: &str = "/api";

/// A named collection of records served by one backend.
#[derive(Clone)]
pub struct Schema {
    pub name: String,
    pub backend: Arc<dyn Backend>,
}

impl Schema {
    pub fn new(name: impl Into<String>, backend: Arc<dyn Backend>) -> Self {
        Schema {
            name: name.into(),
            backend,
        }
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema").field("name", &self.name).finish_non_exhaustive()
    }
}

#[derive(Clone, Debug, Default)]
pub struct RouteConfig {
    /// Prefix for every route. Unset or empty means `/api`.
    pub root: Option<String>,
    pub schemas: Vec<Schema>,
}

/// One (schema, operation) pair bound to its path.
pub struct RouteDescriptor {
    path: String,
    schema: String,
    operation: &'static dyn Operation,
    backend: Arc<dyn Backend>,
}

impl RouteDescriptor {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.operation.method()
    }

    /// Lowercased schema name.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn operation_name(&self) -> &'static str {
        self.operation.name()
    }

    /// Run the bound operation against a URL-encoded parameter string (no leading `?`).
    pub async fn invoke(&self, raw_params: &str) -> Result<OperationResult, AppError> {
        tracing::debug!(path = %self.path, params = %raw_params, "invoke");
        let params = ParsedParams::parse(raw_params)?;
        self.operation.execute(&params, self.backend.as_ref()).await
    }
}

impl fmt::Debug for RouteDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDescriptor")
            .field("path", &self.path)
            .field("method", &self.method())
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Build descriptors in schema order, then registry order. Fails without partial output.
pub fn synthesize(config: &RouteConfig) -> Result<Vec<RouteDescriptor>, ConfigError> {
    let root = match config.root.as_deref() {
        None | Some("") => DEFAULT_ROOT,
        Some(r) if r.starts_with('/') => r,
        Some(r) => return Err(ConfigError::InvalidRoot(r.to_string())),
    };

    let mut routes = Vec::with_capacity(config.schemas.len() * operations().len());
    for schema in &config.schemas {
        let name = schema.name.to_lowercase();
        if name.is_empty() {
            return Err(ConfigError::EmptySchemaName);
        }
        for &operation in operations() {
            let path = path_join(&[root, &name, operation.name()]);
            tracing::debug!(path = %path, method = %operation.method(), "synthesized route");
            routes.push(RouteDescriptor {
                path,
                schema: name.clone(),
                operation,
                backend: Arc::clone(&schema.backend),
            });
        }
    }
    Ok(routes)
}

pub fn route_by_path<'a>(routes: &'a [RouteDescriptor], path: &str) -> Option<&'a RouteDescriptor> {
    routes.iter().find(|r| r.path == path)
}

/// Slash-separated join with lexical cleaning: empty elements are ignored, repeated
/// slashes collapse, `.` and `..` resolve, and no trailing slash survives.
pub fn path_join(elems: &[&str]) -> String {
    let joined = elems
        .iter()
        .copied()
        .filter(|e| !e.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if joined.is_empty() {
        return String::new();
    }
    clean(&joined)
}

fn clean(path: &str) -> String {
    let rooted = path.starts_with('/');
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|p| *p != "..") {
                    parts.pop();
                } else if !rooted {
                    parts.push("..");
                }
            }
            s => parts.push(s),
        }
    }
    let body = parts.join("/");
    if rooted {
        format!("/{}", body)
    } else if body.is_empty() {
        ".".to_string()
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    fn schema(name: &str) -> Schema {
        Schema::new(name, Arc::new(MemoryBackend::default()))
    }

    #[test]
    fn join_collapses_and_cleans() {
        assert_eq!(path_join(&["/api", "users", "all"]), "/api/users/all");
        assert_eq!(path_join(&["/api/", "/users/", "all"]), "/api/users/all");
        assert_eq!(path_join(&["//v1//", "", "x"]), "/v1/x");
        assert_eq!(path_join(&["/a/./b", "../c"]), "/a/c");
        assert_eq!(path_join(&["/", ".."]), "/");
        assert_eq!(path_join(&["a", "..", ".."]), "..");
        assert_eq!(path_join(&["a", ".."]), ".");
        assert_eq!(path_join(&["", ""]), "");
    }

    #[test]
    fn default_root_and_lowercase_names() {
        let config = RouteConfig {
            root: None,
            schemas: vec![schema("Users"), schema("ORDERS")],
        };
        let routes = synthesize(&config).unwrap();
        let paths: Vec<_> = routes.iter().map(|r| r.path()).collect();
        assert_eq!(
            paths,
            ["/api/users/all", "/api/users/findone", "/api/orders/all", "/api/orders/findone"]
        );
        assert_eq!(routes[2].schema(), "orders");
        assert_eq!(routes[3].operation_name(), "findone");
        assert!(routes.iter().all(|r| r.method() == Method::Get));
    }

    #[test]
    fn empty_root_means_default() {
        let config = RouteConfig {
            root: Some(String::new()),
            schemas: vec![schema("users")],
        };
        assert_eq!(synthesize(&config).unwrap()[0].path(), "/api/users/all");
    }

    #[test]
    fn explicit_root_with_trailing_slash() {
        let config = RouteConfig {
            root: Some("/home/".into()),
            schemas: vec![schema("users")],
        };
        let routes = synthesize(&config).unwrap();
        assert!(route_by_path(&routes, "/home/users/findone").is_some());
        assert!(route_by_path(&routes, "/api/users/findone").is_none());
    }

    #[test]
    fn relative_root_is_rejected() {
        let config = RouteConfig {
            root: Some("home".into()),
            schemas: vec![schema("users")],
        };
        let err = synthesize(&config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRoot(_)));
        assert!(err.to_string().contains("root must begin with a forward slash"));
    }

    #[test]
    fn empty_schema_name_fails_whole_synthesis() {
        let config = RouteConfig {
            root: None,
            schemas: vec![schema("users"), schema("")],
        };
        let err = synthesize(&config).unwrap_err();
        assert!(matches!(err, ConfigError::EmptySchemaName));
        assert_eq!(err.to_string(), "schema name cannot be empty");
    }

    #[test]
    fn no_schemas_no_routes() {
        assert!(synthesize(&RouteConfig::default()).unwrap().is_empty());
    }
}
