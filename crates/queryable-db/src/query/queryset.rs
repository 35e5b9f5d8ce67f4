//! QuerySet and Manager for building and executing database queries.
//!
//! The [`QuerySet`] represents a lazy database query that builds up a SQL query
//! AST. It only executes when a terminal method is called (`.get_exec()`,
//! `.count_exec()`, `.first_exec()`, etc.). The [`Manager`] is the entry point
//! for accessing querysets on a model.
//!
//! The property-aware layer builds on this type: it resolves property names
//! into expressions and then drives the same queryset through
//! [`QuerySet::annotate`], [`QuerySet::and_where`], [`QuerySet::and_having`]
//! and [`QuerySet::query_mut`].
//!
//! # Examples
//!
//! ```
//! use queryable_db::query::queryset::{QuerySet, Manager};
//! use queryable_db::query::lookups::{Q, Lookup};
//! use queryable_db::value::Value;
//! // QuerySets are lazy — they build a Query AST without executing anything.
//! ```

use super::compiler::{
    DatabaseBackendType, OrderBy, Query, SelectColumn, SqlCompiler, WhereNode,
};
use super::expressions::Expression;
use super::lookups::Q;
use crate::executor::DbExecutor;
use crate::model::Model;
use crate::value::Value;
use queryable_core::{QueryableError, QueryableResult};
use std::marker::PhantomData;

/// The entry point for model-level query operations.
///
/// Every model has a default `Manager` that provides access to the
/// `QuerySet` API.
///
/// The `Manager` itself does not hold any query state — it simply
/// creates fresh `QuerySet` instances.
#[derive(Debug)]
pub struct Manager<M: Model> {
    _phantom: PhantomData<M>,
    using: Option<String>,
}

impl<M: Model> Default for Manager<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> Manager<M> {
    /// Creates a new manager.
    pub const fn new() -> Self {
        Self {
            _phantom: PhantomData,
            using: None,
        }
    }

    /// Sets the database alias for this manager.
    #[must_use]
    pub fn using(mut self, db: impl Into<String>) -> Self {
        self.using = Some(db.into());
        self
    }

    /// Returns a new `QuerySet` that returns all objects.
    pub fn all(&self) -> QuerySet<M> {
        QuerySet::new(self.using.clone())
    }

    /// Returns a new `QuerySet` with the given filter applied.
    pub fn filter(&self, q: Q) -> QuerySet<M> {
        self.all().filter(q)
    }

    /// Returns a new `QuerySet` with the given exclusion applied.
    pub fn exclude(&self, q: Q) -> QuerySet<M> {
        self.all().exclude(q)
    }

    /// Returns an empty `QuerySet` that matches nothing.
    pub fn none(&self) -> QuerySet<M> {
        self.all().none()
    }

    /// Shortcut for creating a record via the queryset.
    pub fn create(&self, fields: Vec<(&'static str, Value)>) -> QuerySet<M> {
        let mut qs = self.all();
        qs.pending_create = Some(fields);
        qs
    }
}

/// A lazy, composable database query.
///
/// `QuerySet` builds a [`Query`] AST through method chaining. The SQL is only
/// generated and executed when a terminal method is called.
///
/// All filtering/ordering methods return a new `QuerySet` (they consume `self`
/// and return a modified version), making the API chainable and immutable from
/// the caller's perspective.
pub struct QuerySet<M: Model> {
    model: PhantomData<M>,
    query: Query,
    using: Option<String>,
    /// Whether this queryset should return no results.
    is_none: bool,
    /// Pending create operation fields.
    pending_create: Option<Vec<(&'static str, Value)>>,
    /// Pending update operation fields.
    pending_update: Option<Vec<(&'static str, Value)>>,
    /// Whether this is a delete operation.
    pending_delete: bool,
}

impl<M: Model> QuerySet<M> {
    /// Creates a new queryset for the model.
    fn new(using: Option<String>) -> Self {
        Self {
            model: PhantomData,
            query: Query::new(M::table_name()),
            using,
            is_none: false,
            pending_create: None,
            pending_update: None,
            pending_delete: false,
        }
    }

    /// Returns a reference to the underlying query AST.
    pub const fn query(&self) -> &Query {
        &self.query
    }

    /// Returns a mutable reference to the underlying query AST.
    ///
    /// The property-aware layer uses this to install GROUP BY columns and
    /// bookkeeping annotations while reusing this queryset's SQL generation
    /// and execution paths.
    pub fn query_mut(&mut self) -> &mut Query {
        &mut self.query
    }

    /// Returns the database alias in use.
    pub fn using_db(&self) -> Option<&str> {
        self.using.as_deref()
    }

    /// Forces this queryset to use a specific database connection.
    ///
    /// The `db` parameter is an alias that corresponds to a configured
    /// database connection.
    #[must_use]
    pub fn using(mut self, db: impl Into<String>) -> Self {
        self.using = Some(db.into());
        self
    }

    // ── Filtering methods (lazy) ─────────────────────────────────────

    /// Adds a filter condition. Returns a new queryset.
    #[must_use]
    pub fn filter(mut self, q: Q) -> Self {
        self.query.and_where(WhereNode::from_q(&q));
        self
    }

    /// Adds an exclusion condition (NOT). Returns a new queryset.
    #[must_use]
    pub fn exclude(mut self, q: Q) -> Self {
        self.query
            .and_where(WhereNode::Not(Box::new(WhereNode::from_q(&q))));
        self
    }

    /// ANDs a pre-built condition node into the WHERE clause.
    ///
    /// Accepts conditions that `Q` cannot express, such as
    /// [`WhereNode::ExpressionCondition`] produced when a filter targets a
    /// computed annotation.
    #[must_use]
    pub fn and_where(mut self, node: WhereNode) -> Self {
        self.query.and_where(node);
        self
    }

    /// ANDs a pre-built condition node into the HAVING clause.
    ///
    /// Conditions on aggregating annotations cannot go in WHERE; they are
    /// routed here together with a GROUP BY over the model's columns.
    #[must_use]
    pub fn and_having(mut self, node: WhereNode) -> Self {
        self.query.and_having(node);
        self
    }

    /// Sets the ordering. Returns a new queryset.
    #[must_use]
    pub fn order_by(mut self, fields: Vec<OrderBy>) -> Self {
        self.query.order_by = fields;
        self
    }

    /// Reverses the current ordering.
    #[must_use]
    pub fn reverse(mut self) -> Self {
        for order in &mut self.query.order_by {
            order.descending = !order.descending;
        }
        self
    }

    /// Selects specific fields (equivalent to `.values()`).
    ///
    /// Annotations stay selected, so computed properties appear in the
    /// resulting rows next to the named fields.
    #[must_use]
    pub fn values(mut self, fields: Vec<&str>) -> Self {
        self.query.select = fields
            .into_iter()
            .map(|f| SelectColumn::Column(f.to_string()))
            .collect();
        self
    }

    /// Selects specific fields as a flat list.
    #[must_use]
    pub fn values_list(mut self, fields: Vec<&str>) -> Self {
        self.query.select = fields
            .into_iter()
            .map(|f| SelectColumn::Column(f.to_string()))
            .collect();
        self
    }

    /// Adds DISTINCT to the query.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.query.distinct = true;
        self
    }

    /// Returns all objects (identity operation for chaining).
    #[must_use]
    pub fn all(self) -> Self {
        self
    }

    /// Returns an empty queryset.
    #[must_use]
    pub fn none(mut self) -> Self {
        self.is_none = true;
        self
    }

    /// Sets the LIMIT.
    #[must_use]
    pub fn limit(mut self, n: usize) -> Self {
        self.query.limit = Some(n);
        self
    }

    /// Sets the OFFSET.
    #[must_use]
    pub fn offset(mut self, n: usize) -> Self {
        self.query.offset = Some(n);
        self
    }

    /// Adds an annotation (computed expression with an alias).
    ///
    /// Re-annotating an existing alias replaces its expression.
    #[must_use]
    pub fn annotate(mut self, name: impl Into<String>, expr: Expression) -> Self {
        self.query.add_annotation(name, expr);
        self
    }

    /// Sets fields for an update operation.
    #[must_use]
    pub fn update(mut self, fields: Vec<(&'static str, Value)>) -> Self {
        self.pending_update = Some(fields);
        self
    }

    /// Marks this queryset for deletion.
    #[must_use]
    pub fn delete(mut self) -> Self {
        self.pending_delete = true;
        self
    }

    // ── SQL generation (for inspection/debugging) ────────────────────

    /// Compiles the queryset to SQL for the given backend.
    ///
    /// This is useful for debugging and testing. In production, the backend
    /// calls this internally during execution.
    pub fn to_sql(&self, backend: DatabaseBackendType) -> (String, Vec<Value>) {
        if self.is_none {
            return ("SELECT * FROM \"__none__\" WHERE 1=0".to_string(), vec![]);
        }

        let compiler = SqlCompiler::new(backend);

        if let Some(ref fields) = self.pending_create {
            return compiler.compile_insert(&self.query.table, fields);
        }

        if let Some(ref fields) = self.pending_update {
            if let Some(ref where_clause) = self.query.where_clause {
                return compiler.compile_update(&self.query.table, fields, where_clause);
            }
            // Update without WHERE — update all rows
            let where_all = WhereNode::And(vec![]);
            return compiler.compile_update(&self.query.table, fields, &where_all);
        }

        if self.pending_delete {
            if let Some(ref where_clause) = self.query.where_clause {
                return compiler.compile_delete(&self.query.table, where_clause);
            }
            let where_all = WhereNode::And(vec![]);
            return compiler.compile_delete(&self.query.table, &where_all);
        }

        compiler.compile_select(&self.query)
    }

    /// Compiles a COUNT query.
    ///
    /// Slicing, DISTINCT and grouping change which rows exist to count, so
    /// those querysets count over a subquery instead of replacing the select
    /// list.
    pub fn count_sql(&self, backend: DatabaseBackendType) -> (String, Vec<Value>) {
        if self.is_none {
            return (
                "SELECT COUNT(*) FROM \"__none__\" WHERE 1=0".to_string(),
                vec![],
            );
        }

        let compiler = SqlCompiler::new(backend);
        if self.query.limit.is_some()
            || self.query.offset.is_some()
            || self.query.distinct
            || !self.query.group_by.is_empty()
        {
            let mut params = Vec::new();
            let inner_sql = compiler.compile_select_into(&self.query, &mut params);
            return (
                format!("SELECT COUNT(*) AS \"count\" FROM ({inner_sql}) AS \"subquery\""),
                params,
            );
        }

        let mut count_query = self.query.clone();
        count_query.select = vec![SelectColumn::Expression(
            Expression::aggregate(
                super::expressions::AggregateFunc::Count,
                Expression::col("*"),
            ),
            "count".to_string(),
        )];
        count_query.annotations.clear();
        count_query.order_by.clear();
        count_query.limit = None;
        count_query.offset = None;
        compiler.compile_select(&count_query)
    }

    /// Compiles an EXISTS query.
    pub fn exists_sql(&self, backend: DatabaseBackendType) -> (String, Vec<Value>) {
        if self.is_none {
            return (
                "SELECT EXISTS(SELECT 1 FROM \"__none__\" WHERE 1=0)".to_string(),
                vec![],
            );
        }
        let mut exists_query = self.query.clone();
        exists_query.select = vec![SelectColumn::Expression(
            Expression::raw("1", Vec::new()),
            "__exists__".to_string(),
        )];
        exists_query.order_by.clear();
        exists_query.limit = Some(1);
        let (inner_sql, params) = SqlCompiler::new(backend).compile_select(&exists_query);
        (format!("SELECT EXISTS({inner_sql})"), params)
    }

    /// Compiles a query to get the first result.
    pub fn first_sql(&self, backend: DatabaseBackendType) -> (String, Vec<Value>) {
        let mut first_query = self.query.clone();
        first_query.limit = Some(1);
        SqlCompiler::new(backend).compile_select(&first_query)
    }

    /// Compiles a query to get the last result.
    pub fn last_sql(&self, backend: DatabaseBackendType) -> (String, Vec<Value>) {
        let mut last_query = self.query.clone();
        // Reverse all orderings
        for order in &mut last_query.order_by {
            order.descending = !order.descending;
        }
        last_query.limit = Some(1);
        SqlCompiler::new(backend).compile_select(&last_query)
    }

    /// Compiles a query for `.get_exec()` (expects exactly one result).
    pub fn get_sql(&self, backend: DatabaseBackendType) -> (String, Vec<Value>) {
        let mut get_query = self.query.clone();
        get_query.limit = Some(2); // Get 2 to detect MultipleObjectsReturned
        SqlCompiler::new(backend).compile_select(&get_query)
    }

    /// Compiles an aggregate query.
    ///
    /// When the queryset is sliced, DISTINCT, grouped or carries selected
    /// annotations, the aggregate must run over exactly the rows the queryset
    /// would return, so the queryset becomes a FROM subquery and the
    /// aggregates reference its output columns.
    pub fn aggregate_sql(
        &self,
        aggregates: Vec<(String, Expression)>,
        backend: DatabaseBackendType,
    ) -> (String, Vec<Value>) {
        let compiler = SqlCompiler::new(backend);

        if self.query.limit.is_some()
            || self.query.offset.is_some()
            || self.query.distinct
            || !self.query.annotations.is_empty()
            || !self.query.group_by.is_empty()
        {
            // The aggregate list renders first, so its parameters come first.
            let mut params = Vec::new();
            let agg_parts: Vec<String> = aggregates
                .into_iter()
                .map(|(alias, expr)| {
                    let expr_sql = compiler.compile_expression(&expr, &mut params);
                    format!("{expr_sql} AS \"{alias}\"")
                })
                .collect();
            let inner_sql = compiler.compile_select_into(&self.query, &mut params);
            let sql = format!(
                "SELECT {} FROM ({inner_sql}) AS \"subquery\"",
                agg_parts.join(", ")
            );
            return (sql, params);
        }

        let mut agg_query = self.query.clone();
        agg_query.select = aggregates
            .into_iter()
            .map(|(alias, expr)| SelectColumn::Expression(expr, alias))
            .collect();
        agg_query.order_by.clear();
        agg_query.limit = None;
        agg_query.offset = None;
        compiler.compile_select(&agg_query)
    }

    // ── Async execution methods ───────────────────────────────────────

    /// Executes the query and returns all matching model instances.
    ///
    /// Compiles the query to SQL using the backend's dialect, sends it,
    /// and maps the returned rows to model instances via `M::from_row()`.
    pub async fn execute_query(&self, db: &dyn DbExecutor) -> QueryableResult<Vec<M>> {
        if self.is_none {
            return Ok(Vec::new());
        }

        let (sql, params) = self.to_sql(db.backend_type());
        let rows = db.query(&sql, &params).await?;
        rows.iter().map(M::from_row).collect()
    }

    /// Executes the query and returns the raw rows.
    ///
    /// Annotation aliases are present as columns, which is what the
    /// property-aware layer reads when it populates instance caches.
    pub async fn execute_rows(&self, db: &dyn DbExecutor) -> QueryableResult<Vec<super::compiler::Row>> {
        if self.is_none {
            return Ok(Vec::new());
        }

        let (sql, params) = self.to_sql(db.backend_type());
        db.query(&sql, &params).await
    }

    /// Returns the count of matching records.
    ///
    /// Runs a `SELECT COUNT(*)` query.
    pub async fn count_exec(&self, db: &dyn DbExecutor) -> QueryableResult<i64> {
        if self.is_none {
            return Ok(0);
        }

        let (sql, params) = self.count_sql(db.backend_type());
        let rows = db.query(&sql, &params).await?;
        if let Some(row) = rows.into_iter().next() {
            row.get_by_index::<i64>(0)
        } else {
            Ok(0)
        }
    }

    /// Returns whether any records match the query.
    pub async fn exists_exec(&self, db: &dyn DbExecutor) -> QueryableResult<bool> {
        if self.is_none {
            return Ok(false);
        }

        let mut first_query = self.query.clone();
        first_query.select = vec![SelectColumn::Expression(
            Expression::raw("1", Vec::new()),
            "__exists__".to_string(),
        )];
        first_query.order_by.clear();
        first_query.limit = Some(1);

        let (sql, params) = SqlCompiler::new(db.backend_type()).compile_select(&first_query);
        let rows = db.query(&sql, &params).await?;
        Ok(!rows.is_empty())
    }

    /// Returns the first matching record, or `None` if no records match.
    pub async fn first_exec(&self, db: &dyn DbExecutor) -> QueryableResult<Option<M>> {
        if self.is_none {
            return Ok(None);
        }

        let (sql, params) = self.first_sql(db.backend_type());
        let rows = db.query(&sql, &params).await?;
        match rows.into_iter().next() {
            Some(row) => Ok(Some(M::from_row(&row)?)),
            None => Ok(None),
        }
    }

    /// Returns a single matching record.
    ///
    /// Returns `DoesNotExist` if no records match, or
    /// `MultipleObjectsReturned` if more than one record matches.
    pub async fn get_exec(&self, db: &dyn DbExecutor) -> QueryableResult<M> {
        if self.is_none {
            return Err(QueryableError::DoesNotExist(format!(
                "{} matching query does not exist.",
                M::table_name()
            )));
        }

        let (sql, params) = self.get_sql(db.backend_type());
        let rows = db.query(&sql, &params).await?;
        match rows.len() {
            0 => Err(QueryableError::DoesNotExist(format!(
                "{} matching query does not exist.",
                M::table_name()
            ))),
            1 => M::from_row(&rows[0]),
            _ => Err(QueryableError::MultipleObjectsReturned(format!(
                "get() returned more than one {} -- it returned {}!",
                M::table_name(),
                rows.len()
            ))),
        }
    }

    /// Runs an UPDATE and returns the number of rows affected.
    ///
    /// The queryset must have been prepared with `.update(fields)`.
    pub async fn update_exec(&self, db: &dyn DbExecutor) -> QueryableResult<u64> {
        if self.is_none {
            return Ok(0);
        }

        if self.pending_update.is_none() {
            return Err(QueryableError::DatabaseError(
                "No pending update fields. Call .update(fields) before .update_exec()".to_string(),
            ));
        }

        let (sql, params) = self.to_sql(db.backend_type());
        db.execute_sql(&sql, &params).await
    }

    /// Runs a DELETE and returns the number of rows affected.
    ///
    /// The queryset must have been prepared with `.delete()`.
    pub async fn delete_exec(&self, db: &dyn DbExecutor) -> QueryableResult<u64> {
        if self.is_none {
            return Ok(0);
        }

        if !self.pending_delete {
            return Err(QueryableError::DatabaseError(
                "QuerySet is not marked for deletion. Call .delete() before .delete_exec()"
                    .to_string(),
            ));
        }

        let (sql, params) = self.to_sql(db.backend_type());
        db.execute_sql(&sql, &params).await
    }

    /// Runs a CREATE (INSERT) and returns the inserted row ID.
    ///
    /// The queryset must have been prepared via `Manager::create(fields)`.
    pub async fn create_exec(&self, db: &dyn DbExecutor) -> QueryableResult<Value> {
        if self.pending_create.is_none() {
            return Err(QueryableError::DatabaseError(
                "No pending create fields. Call Manager::create(fields) before .create_exec()"
                    .to_string(),
            ));
        }

        let (sql, params) = self.to_sql(db.backend_type());
        db.insert_returning_id(&sql, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldDef, FieldType};
    use crate::model::{Model, ModelMeta, Row};
    use crate::query::expressions::AggregateFunc;
    use crate::query::lookups::Lookup;

    // A test model for queryset tests
    struct Release {
        id: i64,
        name: String,
        downloads: i64,
    }

    impl Model for Release {
        fn meta() -> &'static ModelMeta {
            use std::sync::LazyLock;
            static META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
                app_label: "app",
                model_name: "release",
                db_table: "app_release".to_string(),
                verbose_name: "release".to_string(),
                verbose_name_plural: "releases".to_string(),
                ordering: vec![OrderBy::asc("name")],
                abstract_model: false,
                fields: vec![
                    FieldDef::new("id", FieldType::BigAutoField).primary_key(),
                    FieldDef::new("name", FieldType::CharField).max_length(100),
                    FieldDef::new("downloads", FieldType::IntegerField),
                ],
            });
            &META
        }
        fn table_name() -> &'static str {
            "app_release"
        }
        fn app_label() -> &'static str {
            "app"
        }
        fn pk(&self) -> Option<Value> {
            (self.id != 0).then(|| Value::Int(self.id))
        }
        fn set_pk(&mut self, value: Value) {
            if let Value::Int(id) = value {
                self.id = id;
            }
        }
        fn field_values(&self) -> Vec<(&'static str, Value)> {
            vec![
                ("id", Value::Int(self.id)),
                ("name", Value::String(self.name.clone())),
                ("downloads", Value::Int(self.downloads)),
            ]
        }
        fn from_row(row: &Row) -> Result<Self, QueryableError> {
            Ok(Release {
                id: row.get("id")?,
                name: row.get("name")?,
                downloads: row.get("downloads")?,
            })
        }
    }

    fn pg() -> DatabaseBackendType {
        DatabaseBackendType::PostgreSQL
    }

    fn sqlite() -> DatabaseBackendType {
        DatabaseBackendType::SQLite
    }

    #[test]
    fn test_manager_all() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all();
        let (sql, params) = qs.to_sql(pg());
        assert_eq!(sql, "SELECT * FROM \"app_release\"");
        assert!(params.is_empty());
    }

    #[test]
    fn test_manager_filter() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.filter(Q::filter("name", Lookup::Exact(Value::from("1.2.3"))));
        let (sql, params) = qs.to_sql(pg());
        assert_eq!(sql, "SELECT * FROM \"app_release\" WHERE \"name\" = $1");
        assert_eq!(params, vec![Value::String("1.2.3".to_string())]);
    }

    #[test]
    fn test_manager_exclude() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.exclude(Q::filter("downloads", Lookup::Exact(Value::from(0))));
        let (sql, _) = qs.to_sql(pg());
        assert!(sql.contains("NOT"));
    }

    #[test]
    fn test_queryset_chaining() {
        let mgr = Manager::<Release>::new();
        let qs = mgr
            .all()
            .filter(Q::filter("downloads", Lookup::Gte(Value::from(100))))
            .filter(Q::filter("downloads", Lookup::Lte(Value::from(10_000))))
            .order_by(vec![OrderBy::asc("name")])
            .limit(10)
            .offset(0);
        let (sql, params) = qs.to_sql(pg());
        assert!(sql.contains("\"downloads\" >= $1"));
        assert!(sql.contains("\"downloads\" <= $2"));
        assert!(sql.contains("ORDER BY"));
        assert!(sql.contains("LIMIT 10"));
        assert!(sql.contains("OFFSET 0"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_queryset_distinct() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().values(vec!["name"]).distinct();
        let (sql, _) = qs.to_sql(pg());
        assert!(sql.contains("DISTINCT"));
        assert!(sql.contains("\"name\""));
    }

    #[test]
    fn test_queryset_none() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.none();
        let (sql, _) = qs.to_sql(pg());
        assert!(sql.contains("1=0"));
    }

    #[test]
    fn test_queryset_reverse() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().order_by(vec![OrderBy::asc("name")]).reverse();
        let (sql, _) = qs.to_sql(pg());
        assert!(sql.contains("DESC"));
    }

    #[test]
    fn test_queryset_values() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().values(vec!["name", "downloads"]);
        let (sql, _) = qs.to_sql(pg());
        assert!(sql.contains("\"name\""));
        assert!(sql.contains("\"downloads\""));
        assert!(!sql.contains('*'));
    }

    #[test]
    fn test_queryset_values_keeps_annotations() {
        let mgr = Manager::<Release>::new();
        let qs = mgr
            .all()
            .annotate(
                "name_upper",
                Expression::func("UPPER", vec![Expression::col("name")]),
            )
            .values(vec!["name"]);
        let (sql, _) = qs.to_sql(pg());
        assert_eq!(
            sql,
            "SELECT \"name\", UPPER(\"name\") AS \"name_upper\" FROM \"app_release\""
        );
    }

    #[test]
    fn test_queryset_count_sql() {
        let mgr = Manager::<Release>::new();
        let qs = mgr
            .all()
            .filter(Q::filter("downloads", Lookup::Gt(Value::from(100))));
        let (sql, params) = qs.count_sql(pg());
        assert_eq!(
            sql,
            "SELECT COUNT(*) AS \"count\" FROM \"app_release\" WHERE \"downloads\" > $1"
        );
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn test_queryset_count_sql_sliced_wraps_subquery() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().limit(5);
        let (sql, _) = qs.count_sql(pg());
        assert_eq!(
            sql,
            "SELECT COUNT(*) AS \"count\" FROM \
             (SELECT * FROM \"app_release\" LIMIT 5) AS \"subquery\""
        );
    }

    #[test]
    fn test_queryset_count_sql_distinct_wraps_subquery() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().values(vec!["name"]).distinct();
        let (sql, _) = qs.count_sql(pg());
        assert!(sql.starts_with("SELECT COUNT(*) AS \"count\" FROM (SELECT DISTINCT"));
    }

    #[test]
    fn test_queryset_exists_sql() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.filter(Q::filter("name", Lookup::Exact(Value::from("1.2.3"))));
        let (sql, _) = qs.exists_sql(pg());
        assert!(sql.contains("EXISTS"));
        assert!(sql.contains("SELECT 1 AS \"__exists__\""));
        assert!(sql.contains("LIMIT 1"));
    }

    #[test]
    fn test_queryset_first_sql() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().order_by(vec![OrderBy::asc("name")]);
        let (sql, _) = qs.first_sql(pg());
        assert!(sql.contains("LIMIT 1"));
        assert!(sql.contains("ASC"));
    }

    #[test]
    fn test_queryset_last_sql() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().order_by(vec![OrderBy::asc("name")]);
        let (sql, _) = qs.last_sql(pg());
        assert!(sql.contains("LIMIT 1"));
        assert!(sql.contains("DESC"));
    }

    #[test]
    fn test_queryset_get_sql() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.filter(Q::filter("id", Lookup::Exact(Value::from(1))));
        let (sql, _) = qs.get_sql(pg());
        assert!(sql.contains("LIMIT 2"));
    }

    #[test]
    fn test_queryset_create_sql() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.create(vec![
            ("name", Value::from("2.0.0")),
            ("downloads", Value::from(0)),
        ]);
        let (sql, params) = qs.to_sql(pg());
        assert!(sql.contains("INSERT INTO"));
        assert!(sql.contains("\"name\""));
        assert!(sql.contains("\"downloads\""));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_queryset_update_sql() {
        let mgr = Manager::<Release>::new();
        let qs = mgr
            .filter(Q::filter("id", Lookup::Exact(Value::from(1))))
            .update(vec![("name", Value::from("2.0.1"))]);
        let (sql, params) = qs.to_sql(pg());
        assert!(sql.contains("UPDATE"));
        assert!(sql.contains("SET"));
        assert!(sql.contains("WHERE"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_queryset_delete_sql() {
        let mgr = Manager::<Release>::new();
        let qs = mgr
            .filter(Q::filter("id", Lookup::Exact(Value::from(1))))
            .delete();
        let (sql, _) = qs.to_sql(pg());
        assert!(sql.contains("DELETE FROM"));
        assert!(sql.contains("WHERE"));
    }

    #[test]
    fn test_queryset_annotate() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().annotate(
            "name_upper",
            Expression::func("UPPER", vec![Expression::col("name")]),
        );
        let (sql, _) = qs.to_sql(pg());
        assert!(sql.contains("UPPER(\"name\") AS \"name_upper\""));
    }

    #[test]
    fn test_queryset_and_where_expression_condition() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().and_where(WhereNode::ExpressionCondition {
            expr: Expression::func("LENGTH", vec![Expression::col("name")]),
            lookup: Lookup::Gt(Value::from(5)),
        });
        let (sql, params) = qs.to_sql(pg());
        assert_eq!(
            sql,
            "SELECT * FROM \"app_release\" WHERE LENGTH(\"name\") > $1"
        );
        assert_eq!(params, vec![Value::Int(5)]);
    }

    #[test]
    fn test_queryset_and_where_merges_with_filter() {
        let mgr = Manager::<Release>::new();
        let qs = mgr
            .filter(Q::filter("downloads", Lookup::Gt(Value::from(0))))
            .and_where(WhereNode::ExpressionCondition {
                expr: Expression::func("LENGTH", vec![Expression::col("name")]),
                lookup: Lookup::Lte(Value::from(10)),
            });
        let (sql, params) = qs.to_sql(pg());
        assert!(sql.contains("(\"downloads\" > $1 AND LENGTH(\"name\") <= $2)"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_queryset_and_having_with_group_by() {
        let mgr = Manager::<Release>::new();
        let mut qs = mgr.all();
        qs.query_mut().set_group_by(vec![
            "id".to_string(),
            "name".to_string(),
            "downloads".to_string(),
        ]);
        let qs = qs.and_having(WhereNode::ExpressionCondition {
            expr: Expression::aggregate(AggregateFunc::Count, Expression::col("id")),
            lookup: Lookup::Gt(Value::from(3)),
        });
        let (sql, params) = qs.to_sql(pg());
        assert!(sql.contains("GROUP BY \"id\", \"name\", \"downloads\""));
        assert!(sql.contains("HAVING COUNT(\"id\") > $1"));
        assert_eq!(params, vec![Value::Int(3)]);
    }

    #[test]
    fn test_queryset_aggregate_sql() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all();
        let (sql, _) = qs.aggregate_sql(
            vec![(
                "avg_downloads".to_string(),
                Expression::aggregate(AggregateFunc::Avg, Expression::col("downloads")),
            )],
            pg(),
        );
        assert_eq!(
            sql,
            "SELECT AVG(\"downloads\") AS \"avg_downloads\" FROM \"app_release\""
        );
    }

    #[test]
    fn test_queryset_aggregate_sql_sliced_wraps_subquery() {
        let mgr = Manager::<Release>::new();
        let qs = mgr
            .all()
            .order_by(vec![OrderBy::desc("downloads")])
            .limit(3);
        let (sql, _) = qs.aggregate_sql(
            vec![(
                "max_downloads".to_string(),
                Expression::aggregate(AggregateFunc::Max, Expression::col("downloads")),
            )],
            pg(),
        );
        assert_eq!(
            sql,
            "SELECT MAX(\"downloads\") AS \"max_downloads\" FROM \
             (SELECT * FROM \"app_release\" ORDER BY \"downloads\" DESC LIMIT 3) AS \"subquery\""
        );
    }

    #[test]
    fn test_queryset_aggregate_sql_over_annotation() {
        // The annotated queryset becomes a subquery and the aggregate reads
        // the annotation through its output column.
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().annotate(
            "name_length",
            Expression::func("LENGTH", vec![Expression::col("name")]),
        );
        let (sql, params) = qs.aggregate_sql(
            vec![(
                "max_length".to_string(),
                Expression::aggregate(AggregateFunc::Max, Expression::col("name_length")),
            )],
            pg(),
        );
        assert_eq!(
            sql,
            "SELECT MAX(\"name_length\") AS \"max_length\" FROM \
             (SELECT *, LENGTH(\"name\") AS \"name_length\" FROM \"app_release\") AS \"subquery\""
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_queryset_sqlite_backend() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.filter(Q::filter("name", Lookup::Exact(Value::from("test"))));
        let (sql, _) = qs.to_sql(sqlite());
        assert!(sql.contains('?'));
        assert!(!sql.contains('$'));
    }

    #[test]
    fn test_queryset_none_count() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.none();
        let (sql, _) = qs.count_sql(pg());
        assert!(sql.contains("1=0"));
    }

    #[test]
    fn test_queryset_none_exists() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.none();
        let (sql, _) = qs.exists_sql(pg());
        assert!(sql.contains("1=0"));
    }

    #[test]
    fn test_manager_default() {
        let mgr = Manager::<Release>::default();
        let qs = mgr.all();
        let (sql, _) = qs.to_sql(pg());
        assert!(sql.contains("app_release"));
    }

    #[test]
    fn test_queryset_update_all() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().update(vec![("downloads", Value::from(0))]);
        let (sql, _) = qs.to_sql(pg());
        assert!(sql.contains("UPDATE"));
        assert!(sql.contains("1=1")); // empty AND = update all
    }

    #[test]
    fn test_queryset_delete_all() {
        let mgr = Manager::<Release>::new();
        let qs = mgr.all().delete();
        let (sql, _) = qs.to_sql(pg());
        assert!(sql.contains("DELETE FROM"));
    }

    #[test]
    fn test_queryset_complex_filter_chain() {
        let mgr = Manager::<Release>::new();
        let qs = mgr
            .all()
            .filter(
                Q::filter("name", Lookup::Contains("1.".to_string()))
                    | Q::filter("name", Lookup::Contains("2.".to_string())),
            )
            .filter(Q::filter("downloads", Lookup::Gte(Value::from(10))))
            .exclude(Q::filter("downloads", Lookup::Gt(Value::from(100_000))))
            .order_by(vec![OrderBy::desc("downloads"), OrderBy::asc("name")])
            .limit(25)
            .offset(50);
        let (sql, params) = qs.to_sql(pg());
        assert!(sql.contains("WHERE"));
        assert!(sql.contains("AND"));
        assert!(sql.contains("NOT"));
        assert!(sql.contains("ORDER BY"));
        assert!(sql.contains("LIMIT 25"));
        assert!(sql.contains("OFFSET 50"));
        assert_eq!(params.len(), 4); // 2 contains + 1 gte + 1 gt
    }
}
