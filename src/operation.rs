//! Operation registry: the fixed set of actions every schema exposes.

use crate::backend::{Backend, Record};
use crate::error::AppError;
use crate::query::{parse_constraints, ParsedParams};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
        })
    }
}

/// What an operation hands back: a page of records or a single one.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OperationResult {
    List(Vec<Record>),
    Single(Record),
}

impl OperationResult {
    pub fn into_list(self) -> Option<Vec<Record>> {
        match self {
            OperationResult::List(records) => Some(records),
            OperationResult::Single(_) => None,
        }
    }

    pub fn into_single(self) -> Option<Record> {
        match self {
            OperationResult::Single(record) => Some(record),
            OperationResult::List(_) => None,
        }
    }
}

#[async_trait]
pub trait Operation: Send + Sync {
    /// Name used as the last path segment.
    fn name(&self) -> &'static str;

    fn method(&self) -> Method;

    async fn execute(&self, params: &ParsedParams, backend: &dyn Backend) -> Result<OperationResult, AppError>;
}

/// `all`: paginated listing driven by `offset` and `count`.
pub struct ListOperation;

/// Upper bound used when `count` is absent or unparseable.
pub const DEFAULT_COUNT: i64 = i32::MAX as i64;

#[async_trait]
impl Operation for ListOperation {
    fn name(&self) -> &'static str {
        "all"
    }

    fn method(&self) -> Method {
        Method::Get
    }

    async fn execute(&self, params: &ParsedParams, backend: &dyn Backend) -> Result<OperationResult, AppError> {
        // Missing or malformed values fall back to defaults rather than failing.
        let offset = params.get_int("offset").unwrap_or(0);
        let count = params.get_int("count").unwrap_or(DEFAULT_COUNT);
        if offset < 0 || count < 0 {
            return Err(AppError::Validation(format!(
                "negative offset or count not allowed, offset = {}, count = {}",
                offset, count
            )));
        }
        let records = backend.fetch_page(offset as u64, count as u64).await?;
        Ok(OperationResult::List(records))
    }
}

/// `findone`: first record matching every comparison constraint.
pub struct FindOneOperation;

#[async_trait]
impl Operation for FindOneOperation {
    fn name(&self) -> &'static str {
        "findone"
    }

    fn method(&self) -> Method {
        Method::Get
    }

    async fn execute(&self, params: &ParsedParams, backend: &dyn Backend) -> Result<OperationResult, AppError> {
        let constraints = parse_constraints(params)?;
        let record = backend.find_one(&constraints).await?;
        Ok(OperationResult::Single(record))
    }
}

static OPERATIONS: [&(dyn Operation); 2] = [&ListOperation, &FindOneOperation];

/// Registered operations in route synthesis order.
pub fn operations() -> &'static [&'static dyn Operation] {
    &OPERATIONS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::error::BackendError;
    use crate::query::Constraint;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records the arguments of the last call.
    #[derive(Default)]
    struct Recording {
        page: Mutex<Option<(u64, u64)>>,
        constraints: Mutex<Option<Vec<Constraint>>>,
    }

    #[async_trait]
    impl Backend for Recording {
        async fn fetch_page(&self, offset: u64, count: u64) -> Result<Vec<Record>, BackendError> {
            *self.page.lock().unwrap() = Some((offset, count));
            Ok(Vec::new())
        }

        async fn find_one(&self, constraints: &[Constraint]) -> Result<Record, BackendError> {
            *self.constraints.lock().unwrap() = Some(constraints.to_vec());
            Err(BackendError::Other("backend says no".into()))
        }
    }

    async fn run(op: &dyn Operation, raw: &str, backend: &dyn Backend) -> Result<OperationResult, AppError> {
        op.execute(&ParsedParams::parse(raw)?, backend).await
    }

    #[test]
    fn registry_order_and_methods() {
        let names: Vec<_> = operations().iter().map(|o| o.name()).collect();
        assert_eq!(names, ["all", "findone"]);
        assert!(operations().iter().all(|o| o.method() == Method::Get));
    }

    #[tokio::test]
    async fn list_defaults_offset_and_count() {
        let backend = Recording::default();
        run(&ListOperation, "", &backend).await.unwrap();
        assert_eq!(*backend.page.lock().unwrap(), Some((0, i32::MAX as u64)));

        run(&ListOperation, "offset=abc&count=", &backend).await.unwrap();
        assert_eq!(*backend.page.lock().unwrap(), Some((0, i32::MAX as u64)));

        run(&ListOperation, "offset=3&count=5", &backend).await.unwrap();
        assert_eq!(*backend.page.lock().unwrap(), Some((3, 5)));
    }

    #[tokio::test]
    async fn list_rejects_negative_values_before_backend_call() {
        let backend = Recording::default();
        let err = run(&ListOperation, "offset=-1&count=4", &backend).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(err.to_string().contains("offset = -1, count = 4"));
        assert!(backend.page.lock().unwrap().is_none());

        let err = run(&ListOperation, "count=-2", &backend).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn findone_forwards_empty_constraints_and_backend_errors() {
        let backend = Recording::default();
        let err = run(&FindOneOperation, "", &backend).await.unwrap_err();
        assert_eq!(err.to_string(), "backend says no");
        assert_eq!(*backend.constraints.lock().unwrap(), Some(Vec::new()));
    }

    #[tokio::test]
    async fn findone_parse_errors_skip_the_backend() {
        let backend = Recording::default();
        let err = run(&FindOneOperation, "name=-is+John", &backend).await.unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(backend.constraints.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn findone_returns_single_record() {
        let backend = MemoryBackend::from_values([json!({"name": "John"}), json!({"name": "Alex"})]);
        let result = run(&FindOneOperation, "name=-eq+Alex", &backend).await.unwrap();
        let record = result.into_single().unwrap();
        assert_eq!(record["name"], "Alex");
    }

    #[test]
    fn results_serialize_untagged() {
        let record: Record = serde_json::from_value(json!({"a": 1})).unwrap();
        assert_eq!(serde_json::to_value(OperationResult::Single(record.clone())).unwrap(), json!({"a": 1}));
        assert_eq!(serde_json::to_value(OperationResult::List(vec![record])).unwrap(), json!([{"a": 1}]));
    }
}
