//! Mounts synthesized routes on an axum router.
//! The raw query string is handed to the descriptor untouched; results go out in the standard envelope.

use crate::error::{AppError, ConfigError};
use crate::operation::{Method, OperationResult};
use crate::response::{success_many, success_one_ok};
use crate::routes::RouteDescriptor;
use axum::{
    extract::RawQuery,
    response::{IntoResponse, Response},
    routing::{on, MethodFilter},
    Router,
};
use std::collections::HashSet;
use std::sync::Arc;

/// Characters axum reads as captures or wildcards inside a path segment.
pub const RESERVED_PATH_CHARS: [char; 4] = [':', '*', '{', '}'];

/// One handler per descriptor. Fails if two descriptors share both path and method,
/// or if a path segment contains characters axum would treat as a capture.
pub fn router(routes: Vec<RouteDescriptor>) -> Result<Router, ConfigError> {
    let mut seen = HashSet::new();
    let mut app = Router::new();
    for route in routes {
        check_literal_path(route.path())?;
        if !seen.insert((route.path().to_string(), route.method())) {
            return Err(ConfigError::Validation(format!(
                "duplicate route: {} {}",
                route.method(),
                route.path()
            )));
        }
        let path = route.path().to_string();
        let filter = match route.method() {
            Method::Get => MethodFilter::GET,
            Method::Post => MethodFilter::POST,
        };
        let route = Arc::new(route);
        app = app.route(
            &path,
            on(filter, move |RawQuery(query): RawQuery| {
                let route = Arc::clone(&route);
                async move { respond(&route, query.as_deref().unwrap_or("")).await }
            }),
        );
    }
    Ok(app)
}

fn check_literal_path(path: &str) -> Result<(), ConfigError> {
    match path.split('/').find(|segment| segment.contains(RESERVED_PATH_CHARS)) {
        Some(segment) => Err(ConfigError::Validation(format!(
            "route {} has reserved characters in segment '{}'",
            path, segment
        ))),
        None => Ok(()),
    }
}

async fn respond(route: &RouteDescriptor, raw: &str) -> Result<Response, AppError> {
    Ok(match route.invoke(raw).await? {
        OperationResult::List(records) => success_many(records).into_response(),
        OperationResult::Single(record) => success_one_ok(record).into_response(),
    })
}
