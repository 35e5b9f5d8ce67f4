//! Shared fixtures for the scenario suites: the application/version models
//! and a fake executor that replays canned rows.

pub mod models;

use std::collections::VecDeque;
use std::sync::Mutex;

use queryable_core::{QueryableError, QueryableResult};
use queryable_db::executor::DbExecutor;
use queryable_db::query::compiler::{DatabaseBackendType, Row};
use queryable_db::value::Value;

/// An executor that records every statement and replays canned row batches.
pub struct FakeDb {
    backend: DatabaseBackendType,
    pub statements: Mutex<Vec<(String, Vec<Value>)>>,
    batches: Mutex<VecDeque<Vec<Row>>>,
    affected: u64,
}

impl FakeDb {
    pub fn new() -> Self {
        Self {
            backend: DatabaseBackendType::PostgreSQL,
            statements: Mutex::new(Vec::new()),
            batches: Mutex::new(VecDeque::new()),
            affected: 1,
        }
    }

    /// Sets the row count reported for statements.
    #[must_use]
    pub fn affecting(mut self, n: u64) -> Self {
        self.affected = n;
        self
    }

    /// Queues a batch of rows for the next query.
    pub fn push_rows(&self, rows: Vec<Row>) {
        self.batches.lock().unwrap().push_back(rows);
    }

    /// The SQL of the statements seen so far.
    pub fn seen_sql(&self) -> Vec<String> {
        self.statements
            .lock()
            .unwrap()
            .iter()
            .map(|(sql, _)| sql.clone())
            .collect()
    }

    fn record(&self, sql: &str, params: &[Value]) {
        self.statements
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
    }
}

impl Default for FakeDb {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DbExecutor for FakeDb {
    fn backend_type(&self) -> DatabaseBackendType {
        self.backend
    }

    async fn execute_sql(&self, sql: &str, params: &[Value]) -> QueryableResult<u64> {
        self.record(sql, params);
        Ok(self.affected)
    }

    async fn query(&self, sql: &str, params: &[Value]) -> QueryableResult<Vec<Row>> {
        self.record(sql, params);
        Ok(self.batches.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn query_one(&self, sql: &str, params: &[Value]) -> QueryableResult<Row> {
        self.record(sql, params);
        self.batches
            .lock()
            .unwrap()
            .pop_front()
            .and_then(|batch| batch.into_iter().next())
            .ok_or_else(|| QueryableError::DoesNotExist("no rows queued".to_string()))
    }
}

/// Builds a row for the version table, optionally with extra annotation
/// columns appended.
pub fn version_row(
    id: i64,
    major: i64,
    minor: i64,
    patch: i64,
    extra: Vec<(&str, Value)>,
) -> Row {
    let mut columns = vec![
        "id".to_string(),
        "major".to_string(),
        "minor".to_string(),
        "patch".to_string(),
        "application_id".to_string(),
    ];
    let mut values = vec![
        Value::Int(id),
        Value::Int(major),
        Value::Int(minor),
        Value::Int(patch),
        Value::Int(1),
    ];
    for (name, value) in extra {
        columns.push(name.to_string());
        values.push(value);
    }
    Row::new(columns, values)
}

/// Builds a row for the application table with extra annotation columns.
pub fn application_row(id: i64, name: &str, extra: Vec<(&str, Value)>) -> Row {
    let mut columns = vec![
        "id".to_string(),
        "name".to_string(),
        "category".to_string(),
    ];
    let mut values = vec![
        Value::Int(id),
        Value::from(name),
        Value::from("Demo apps"),
    ];
    for (name, value) in extra {
        columns.push(name.to_string());
        values.push(value);
    }
    Row::new(columns, values)
}
