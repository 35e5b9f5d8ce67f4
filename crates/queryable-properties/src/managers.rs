//! The property-aware manager and queryset.
//!
//! A model whose queryable properties should participate in query
//! construction must route its database access through
//! [`QueryablePropertiesManager`] instead of the substrate's plain manager.
//! The plain queryset treats every name as a literal column; the queryset
//! returned here resolves names through [`PropertyQuery`] first, so property
//! names in filters, orderings, annotations, values and updates behave like
//! real columns.
//!
//! Chainers are infallible and consuming, matching the substrate queryset.
//! A resolution error (unknown name, property without the required hook,
//! conflicting update values) is stashed on the queryset and surfaced from
//! [`to_sql`](QueryablePropertiesQuerySet::to_sql) and every terminal
//! method, so an invalid queryset fails when it is evaluated rather than
//! when it is built.

use std::collections::{HashSet, VecDeque};
use std::marker::PhantomData;

use queryable_core::{QueryableError, QueryableResult};
use queryable_db::executor::DbExecutor;
use queryable_db::query::compiler::{
    DatabaseBackendType, Query, Row, SqlCompiler, WhereNode,
};
use queryable_db::query::expressions::Expression;
use queryable_db::query::lookups::Q;
use queryable_db::query::queryset::{Manager, QuerySet};
use queryable_db::value::Value;

use crate::model::{get_queryable_property, QueryableModel};
use crate::query::{unknown_field_error, FilterParts, PropertyQuery};

/// The entry point for property-aware query operations.
///
/// Like the substrate [`Manager`], this type holds no query state; it only
/// creates fresh [`QueryablePropertiesQuerySet`] instances.
#[derive(Debug)]
pub struct QueryablePropertiesManager<M: QueryableModel> {
    _phantom: PhantomData<M>,
    using: Option<String>,
}

impl<M: QueryableModel> Default for QueryablePropertiesManager<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: QueryableModel> QueryablePropertiesManager<M> {
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

    /// Returns a queryset over all objects.
    pub fn all(&self) -> QueryablePropertiesQuerySet<M> {
        QueryablePropertiesQuerySet::new(self.using.clone())
    }

    /// Returns a queryset with the given filter applied.
    pub fn filter(&self, q: Q) -> QueryablePropertiesQuerySet<M> {
        self.all().filter(q)
    }

    /// Returns a queryset with the given exclusion applied.
    pub fn exclude(&self, q: Q) -> QueryablePropertiesQuerySet<M> {
        self.all().exclude(q)
    }

    /// Returns an empty queryset that matches nothing.
    pub fn none(&self) -> QueryablePropertiesQuerySet<M> {
        self.all().none()
    }

    /// Returns a queryset with the named property annotations selected.
    pub fn select_properties(&self, names: &[&str]) -> QueryablePropertiesQuerySet<M> {
        self.all().select_properties(names)
    }

    /// Returns a queryset with the given annotation added.
    pub fn annotate(
        &self,
        alias: impl Into<String>,
        expr: Expression,
    ) -> QueryablePropertiesQuerySet<M> {
        self.all().annotate(alias, expr)
    }

    /// Returns a queryset ordered by the given specs.
    pub fn order_by(&self, specs: &[&str]) -> QueryablePropertiesQuerySet<M> {
        self.all().order_by(specs)
    }

    /// Returns a queryset restricted to the named fields.
    pub fn values(&self, names: &[&str]) -> QueryablePropertiesQuerySet<M> {
        self.all().values(names)
    }

    /// Returns a queryset restricted to the named fields as a flat list.
    pub fn values_list(&self, names: &[&str]) -> QueryablePropertiesQuerySet<M> {
        self.all().values_list(names)
    }

    /// Returns a queryset with a staged update over all objects.
    pub fn update(&self, fields: Vec<(&str, Value)>) -> QueryablePropertiesQuerySet<M> {
        self.all().update(fields)
    }

    /// Compiles an aggregate query over all objects.
    pub fn aggregate_sql(
        &self,
        aggregates: Vec<(String, Expression)>,
        backend: DatabaseBackendType,
    ) -> QueryableResult<(String, Vec<Value>)> {
        self.all().aggregate_sql(aggregates, backend)
    }

    /// Executes the query over all objects.
    pub async fn execute_query(&self, db: &dyn DbExecutor) -> QueryableResult<Vec<M>> {
        self.all().execute_query(db).await
    }

    /// Returns the first object, or `None`.
    pub async fn first_exec(&self, db: &dyn DbExecutor) -> QueryableResult<Option<M>> {
        self.all().first_exec(db).await
    }

    /// Returns exactly one object.
    pub async fn get_exec(&self, db: &dyn DbExecutor) -> QueryableResult<M> {
        self.all().get_exec(db).await
    }

    /// Returns the total object count.
    pub async fn count_exec(&self, db: &dyn DbExecutor) -> QueryableResult<i64> {
        self.all().count_exec(db).await
    }

    /// Runs the aggregates over all objects.
    pub async fn aggregate_exec(
        &self,
        aggregates: Vec<(String, Expression)>,
        db: &dyn DbExecutor,
    ) -> QueryableResult<Row> {
        self.all().aggregate_exec(aggregates, db).await
    }
}

/// A lazy queryset that resolves queryable property names.
///
/// Builds on the same [`Query`] AST and [`SqlCompiler`] as the substrate
/// queryset; the difference is that every incoming name passes through
/// [`PropertyQuery`] resolution before it reaches the AST.
pub struct QueryablePropertiesQuerySet<M: QueryableModel> {
    property_query: PropertyQuery<M>,
    using: Option<String>,
    is_none: bool,
    /// Expanded concrete field/value pairs for a pending update.
    pending_update: Option<Vec<(String, Value)>>,
    pending_delete: bool,
    /// The first resolution error, surfaced on evaluation.
    error: Option<QueryableError>,
}

impl<M: QueryableModel> QueryablePropertiesQuerySet<M> {
    fn new(using: Option<String>) -> Self {
        Self {
            property_query: PropertyQuery::new(),
            using,
            is_none: false,
            pending_update: None,
            pending_delete: false,
            error: None,
        }
    }

    /// Returns the underlying query AST.
    pub const fn query(&self) -> &Query {
        self.property_query.query()
    }

    /// Returns the property bookkeeping wrapper.
    pub const fn property_query(&self) -> &PropertyQuery<M> {
        &self.property_query
    }

    /// Only the first resolution error is kept; it already describes the
    /// point where the queryset became invalid.
    fn stash(&mut self, err: QueryableError) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }

    // ── Filtering ────────────────────────────────────────────────────

    /// Adds a filter condition, resolving property names.
    ///
    /// Conditions on aggregate property annotations are routed to HAVING;
    /// everything else lands in WHERE.
    #[must_use]
    pub fn filter(mut self, q: Q) -> Self {
        match self.property_query.add_q(&q) {
            Ok(parts) => self.apply_parts(parts),
            Err(err) => self.stash(err),
        }
        self
    }

    /// Adds an exclusion (NOT) condition, resolving property names.
    #[must_use]
    pub fn exclude(mut self, q: Q) -> Self {
        match self.property_query.add_q(&q) {
            Ok(FilterParts {
                where_node: Some(_),
                having_node: Some(_),
            }) => self.stash(QueryableError::OperationalError(
                "Filters on aggregate annotations cannot be negated together with other \
                 conditions."
                    .to_string(),
            )),
            Ok(parts) => self.apply_parts(FilterParts {
                where_node: parts.where_node.map(|n| WhereNode::Not(Box::new(n))),
                having_node: parts.having_node.map(|n| WhereNode::Not(Box::new(n))),
            }),
            Err(err) => self.stash(err),
        }
        self
    }

    fn apply_parts(&mut self, parts: FilterParts) {
        if let Some(node) = parts.where_node {
            self.property_query.query_mut().and_where(node);
        }
        if let Some(node) = parts.having_node {
            self.property_query.query_mut().and_having(node);
        }
    }

    // ── Property selection and annotation ────────────────────────────

    /// Selects the annotations of the named properties.
    ///
    /// Selected property values are fetched alongside the model columns and
    /// written into each instance's property cache during row mapping.
    #[must_use]
    pub fn select_properties(mut self, names: &[&str]) -> Self {
        for name in names {
            match get_queryable_property::<M>(name) {
                Ok(prop) => {
                    if let Err(err) = self.property_query.add_property_annotation(prop, true) {
                        self.stash(err);
                    }
                }
                Err(err) => self.stash(err),
            }
        }
        self
    }

    /// Adds a named annotation, inlining property references.
    ///
    /// `F(name)` nodes naming a property are replaced with the property's
    /// annotation expression without selecting the property itself.
    /// Aggregate annotations set the GROUP BY to the model's columns when no
    /// grouping exists yet.
    #[must_use]
    pub fn annotate(mut self, alias: impl Into<String>, expr: Expression) -> Self {
        match self.property_query.resolve_expression(expr) {
            Ok(resolved) => {
                if resolved.contains_aggregate()
                    && self.property_query.query().group_by.is_empty()
                {
                    let columns = M::meta()
                        .column_names()
                        .into_iter()
                        .map(str::to_string)
                        .collect();
                    self.property_query.query_mut().set_group_by(columns);
                }
                self.property_query.query_mut().add_annotation(alias, resolved);
            }
            Err(err) => self.stash(err),
        }
        self
    }

    // ── Ordering and projection ──────────────────────────────────────

    /// Sets the ordering from specs with an optional `-` prefix.
    ///
    /// Property names are annotated without being selected; ordering uses the
    /// annotation alias when the property is selected and the inlined
    /// expression otherwise.
    #[must_use]
    pub fn order_by(mut self, specs: &[&str]) -> Self {
        let mut orders = Vec::with_capacity(specs.len());
        for spec in specs {
            match self.property_query.resolve_order_field(spec) {
                Ok(order) => orders.push(order),
                Err(err) => {
                    self.stash(err);
                    return self;
                }
            }
        }
        self.property_query.query_mut().order_by = orders;
        self
    }

    /// Reverses the current ordering.
    #[must_use]
    pub fn reverse(mut self) -> Self {
        for order in &mut self.property_query.query_mut().order_by {
            order.descending = !order.descending;
        }
        self
    }

    /// Restricts the select list to the named fields.
    ///
    /// Property names select their annotations instead of becoming columns.
    #[must_use]
    pub fn values(mut self, names: &[&str]) -> Self {
        // Replace the implicit star select; only the named fields and the
        // selected property annotations remain.
        self.property_query.query_mut().select.clear();
        for name in names {
            if let Err(err) = self.select_value_name(name) {
                self.stash(err);
            }
        }
        self
    }

    /// Restricts the select list to the named fields as a flat list.
    #[must_use]
    pub fn values_list(self, names: &[&str]) -> Self {
        self.values(names)
    }

    fn select_value_name(&mut self, name: &str) -> QueryableResult<()> {
        use queryable_db::query::compiler::SelectColumn;

        if let Ok(prop) = get_queryable_property::<M>(name) {
            return self.property_query.add_property_annotation(prop, true);
        }
        // An annotation alias is already part of the compiled select list.
        if self.property_query.query().annotation(name).is_some() {
            return Ok(());
        }
        let column = if name == "pk" {
            Some(M::pk_field_name().to_string())
        } else {
            M::meta()
                .fields
                .iter()
                .find(|f| f.name == name || f.column == name)
                .map(|f| f.column.clone())
        };
        let Some(column) = column else {
            return Err(unknown_field_error::<M>(name));
        };
        self.property_query
            .query_mut()
            .select
            .push(SelectColumn::Column(column));
        Ok(())
    }

    // ── Plain chainers ───────────────────────────────────────────────

    /// Adds DISTINCT to the query.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.property_query.query_mut().distinct = true;
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
        self.property_query.query_mut().limit = Some(n);
        self
    }

    /// Sets the OFFSET.
    #[must_use]
    pub fn offset(mut self, n: usize) -> Self {
        self.property_query.query_mut().offset = Some(n);
        self
    }

    // ── Updates and deletion ─────────────────────────────────────────

    /// Stages an update, expanding property names into concrete fields.
    ///
    /// Property values expand through the property's update translation,
    /// recursively, until only concrete fields remain. A name produced twice
    /// during expansion is an error even when both values are equal.
    #[must_use]
    pub fn update(mut self, fields: Vec<(&str, Value)>) -> Self {
        let named = fields
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        match expand_update_fields::<M>(named) {
            Ok(expanded) => self.pending_update = Some(expanded),
            Err(err) => self.stash(err),
        }
        self
    }

    /// Marks this queryset for deletion.
    #[must_use]
    pub fn delete(mut self) -> Self {
        self.pending_delete = true;
        self
    }

    // ── SQL generation ───────────────────────────────────────────────

    /// Compiles the queryset to SQL, surfacing any stashed resolution error.
    pub fn to_sql(&self, backend: DatabaseBackendType) -> QueryableResult<(String, Vec<Value>)> {
        if let Some(err) = &self.error {
            return Err(replay_error(err));
        }
        if self.is_none {
            return Ok(("SELECT * FROM \"__none__\" WHERE 1=0".to_string(), vec![]));
        }

        if let Some(fields) = &self.pending_update {
            let compiler = SqlCompiler::new(backend);
            let query = self.property_query.query();
            let where_all = WhereNode::And(vec![]);
            let where_clause = query.where_clause.as_ref().unwrap_or(&where_all);
            return Ok(compiler.compile_update(&query.table, fields, where_clause));
        }
        if self.pending_delete {
            let compiler = SqlCompiler::new(backend);
            let query = self.property_query.query();
            let where_all = WhereNode::And(vec![]);
            let where_clause = query.where_clause.as_ref().unwrap_or(&where_all);
            return Ok(compiler.compile_delete(&query.table, where_clause));
        }

        Ok(self.build_queryset()?.to_sql(backend))
    }

    /// Compiles a COUNT query.
    pub fn count_sql(&self, backend: DatabaseBackendType) -> QueryableResult<(String, Vec<Value>)> {
        Ok(self.build_queryset()?.count_sql(backend))
    }

    /// Compiles an EXISTS query.
    pub fn exists_sql(
        &self,
        backend: DatabaseBackendType,
    ) -> QueryableResult<(String, Vec<Value>)> {
        Ok(self.build_queryset()?.exists_sql(backend))
    }

    /// Compiles a query for the first result.
    pub fn first_sql(&self, backend: DatabaseBackendType) -> QueryableResult<(String, Vec<Value>)> {
        Ok(self.build_queryset()?.first_sql(backend))
    }

    /// Compiles a query for `get_exec` (LIMIT 2 to detect multiples).
    pub fn get_sql(&self, backend: DatabaseBackendType) -> QueryableResult<(String, Vec<Value>)> {
        Ok(self.build_queryset()?.get_sql(backend))
    }

    /// Compiles an aggregate query, resolving property references.
    ///
    /// Aggregating over a property inlines its annotation expression. A
    /// sliced, distinct, grouped or annotated queryset becomes a FROM
    /// subquery so the aggregates apply to exactly the rows it would return.
    pub fn aggregate_sql(
        mut self,
        aggregates: Vec<(String, Expression)>,
        backend: DatabaseBackendType,
    ) -> QueryableResult<(String, Vec<Value>)> {
        let resolved = self.resolve_aggregates(aggregates)?;
        Ok(self.build_queryset()?.aggregate_sql(resolved, backend))
    }

    fn resolve_aggregates(
        &mut self,
        aggregates: Vec<(String, Expression)>,
    ) -> QueryableResult<Vec<(String, Expression)>> {
        if let Some(err) = &self.error {
            return Err(replay_error(err));
        }
        aggregates
            .into_iter()
            .map(|(alias, expr)| {
                let resolved = self.property_query.resolve_expression(expr)?;
                Ok((alias, resolved))
            })
            .collect()
    }

    /// Rebuilds a substrate queryset carrying this queryset's query AST.
    ///
    /// The substrate queryset provides the SQL inspection variants and the
    /// execution plumbing; all property resolution has already happened.
    fn build_queryset(&self) -> QueryableResult<QuerySet<M>> {
        if let Some(err) = &self.error {
            return Err(replay_error(err));
        }
        let mut qs = Manager::<M>::new().all();
        if let Some(db) = &self.using {
            qs = qs.using(db.clone());
        }
        *qs.query_mut() = self.property_query.query().clone();
        if self.is_none {
            qs = qs.none();
        }
        Ok(qs)
    }

    // ── Execution ────────────────────────────────────────────────────

    /// Executes the query and returns model instances.
    ///
    /// Each selected property's column value is written into the instance's
    /// property cache. Rows missing a selected alias are skipped silently,
    /// so manual annotation removal degrades to uncached instances.
    pub async fn execute_query(&self, db: &dyn DbExecutor) -> QueryableResult<Vec<M>> {
        if let Some(err) = &self.error {
            return Err(replay_error(err));
        }
        if self.is_none {
            return Ok(Vec::new());
        }
        let (sql, params) = self.to_sql(db.backend_type())?;
        tracing::debug!(%sql, params = params.len(), "executing property-aware select");
        let rows = db.query(&sql, &params).await?;
        rows.iter().map(|row| self.hydrate(row)).collect()
    }

    /// Maps a row to an instance and populates its property cache.
    fn hydrate(&self, row: &Row) -> QueryableResult<M> {
        let mut instance = M::from_row(row)?;
        for name in self.property_query.selected_property_names() {
            if let Some(value) = row.get_value(name) {
                instance.property_cache_mut().set(name, value.clone());
            }
        }
        Ok(instance)
    }

    /// Returns the count of matching records.
    pub async fn count_exec(&self, db: &dyn DbExecutor) -> QueryableResult<i64> {
        if let Some(err) = &self.error {
            return Err(replay_error(err));
        }
        self.build_queryset()?.count_exec(db).await
    }

    /// Returns whether any records match.
    pub async fn exists_exec(&self, db: &dyn DbExecutor) -> QueryableResult<bool> {
        self.build_queryset()?.exists_exec(db).await
    }

    /// Returns the first matching record, cache populated, or `None`.
    pub async fn first_exec(&self, db: &dyn DbExecutor) -> QueryableResult<Option<M>> {
        if let Some(err) = &self.error {
            return Err(replay_error(err));
        }
        if self.is_none {
            return Ok(None);
        }
        let (sql, params) = self.first_sql(db.backend_type())?;
        tracing::debug!(%sql, "executing property-aware first()");
        let rows = db.query(&sql, &params).await?;
        match rows.first() {
            Some(row) => Ok(Some(self.hydrate(row)?)),
            None => Ok(None),
        }
    }

    /// Returns exactly one matching record, cache populated.
    ///
    /// Returns `DoesNotExist` when no record matches and
    /// `MultipleObjectsReturned` when more than one does.
    pub async fn get_exec(&self, db: &dyn DbExecutor) -> QueryableResult<M> {
        if let Some(err) = &self.error {
            return Err(replay_error(err));
        }
        if self.is_none {
            return Err(QueryableError::DoesNotExist(format!(
                "{} matching query does not exist.",
                M::table_name()
            )));
        }
        let (sql, params) = self.get_sql(db.backend_type())?;
        tracing::debug!(%sql, "executing property-aware get()");
        let rows = db.query(&sql, &params).await?;
        match rows.len() {
            0 => Err(QueryableError::DoesNotExist(format!(
                "{} matching query does not exist.",
                M::table_name()
            ))),
            1 => self.hydrate(&rows[0]),
            n => Err(QueryableError::MultipleObjectsReturned(format!(
                "get() returned more than one {} -- it returned {n}!",
                M::table_name(),
            ))),
        }
    }

    /// Runs the staged UPDATE and returns the number of rows affected.
    pub async fn update_exec(&self, db: &dyn DbExecutor) -> QueryableResult<u64> {
        if let Some(err) = &self.error {
            return Err(replay_error(err));
        }
        if self.is_none {
            return Ok(0);
        }
        if self.pending_update.is_none() {
            return Err(QueryableError::DatabaseError(
                "No pending update fields. Call .update(fields) before .update_exec()".to_string(),
            ));
        }
        let (sql, params) = self.to_sql(db.backend_type())?;
        tracing::debug!(%sql, params = params.len(), "executing property-aware update");
        db.execute_sql(&sql, &params).await
    }

    /// Runs a DELETE and returns the number of rows affected.
    pub async fn delete_exec(&self, db: &dyn DbExecutor) -> QueryableResult<u64> {
        if let Some(err) = &self.error {
            return Err(replay_error(err));
        }
        if self.is_none {
            return Ok(0);
        }
        if !self.pending_delete {
            return Err(QueryableError::DatabaseError(
                "QuerySet is not marked for deletion. Call .delete() before .delete_exec()"
                    .to_string(),
            ));
        }
        let (sql, params) = self.to_sql(db.backend_type())?;
        tracing::debug!(%sql, "executing property-aware delete");
        db.execute_sql(&sql, &params).await
    }

    /// Runs the aggregates and returns the single result row.
    pub async fn aggregate_exec(
        self,
        aggregates: Vec<(String, Expression)>,
        db: &dyn DbExecutor,
    ) -> QueryableResult<Row> {
        let (sql, params) = self.aggregate_sql(aggregates, db.backend_type())?;
        tracing::debug!(%sql, "executing property-aware aggregate");
        db.query_one(&sql, &params).await
    }
}

impl<M: QueryableModel> Clone for QueryablePropertiesQuerySet<M> {
    fn clone(&self) -> Self {
        Self {
            property_query: self.property_query.clone(),
            using: self.using.clone(),
            is_none: self.is_none,
            pending_update: self.pending_update.clone(),
            pending_delete: self.pending_delete,
            error: self.error.as_ref().map(replay_error),
        }
    }
}

impl<M: QueryableModel> std::fmt::Debug for QueryablePropertiesQuerySet<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryablePropertiesQuerySet")
            .field("property_query", &self.property_query)
            .field("is_none", &self.is_none)
            .field("pending_update", &self.pending_update)
            .field("pending_delete", &self.pending_delete)
            .field("error", &self.error)
            .finish()
    }
}

/// Expands update pairs until only concrete fields remain.
///
/// Property names run through the property's update translation; the
/// returned names may name further properties and are expanded in turn. Any
/// name encountered twice is a conflict, even with equal values.
fn expand_update_fields<M: QueryableModel>(
    fields: Vec<(String, Value)>,
) -> QueryableResult<Vec<(String, Value)>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut queue: VecDeque<(String, Value)> = fields.into_iter().collect();
    let mut concrete = Vec::new();

    while let Some((name, value)) = queue.pop_front() {
        if !seen.insert(name.clone()) {
            return Err(QueryableError::Property(format!(
                "Updating the given queryable properties would set conflicting values for \
                 \"{name}\"."
            )));
        }

        if let Ok(prop) = get_queryable_property::<M>(&name) {
            let Some(result) = prop.get_update_kwargs(value) else {
                return Err(QueryableError::Property(format!(
                    "Queryable property \"{name}\" does not implement queryset updating."
                )));
            };
            queue.extend(result?);
            continue;
        }

        let column = if name == "pk" {
            Some(M::pk_field_name().to_string())
        } else {
            M::meta()
                .fields
                .iter()
                .find(|f| f.name == name || f.column == name)
                .map(|f| f.column.clone())
        };
        match column {
            Some(column) => concrete.push((column, value)),
            None => return Err(unknown_field_error::<M>(&name)),
        }
    }

    Ok(concrete)
}

/// Reconstructs an error for re-surfacing.
///
/// The stashed error outlives the call that produced it, so terminals
/// rebuild an owned copy each time they report it.
fn replay_error(err: &QueryableError) -> QueryableError {
    match err {
        QueryableError::Property(m) => QueryableError::Property(m.clone()),
        QueryableError::PropertyDoesNotExist(m) => QueryableError::PropertyDoesNotExist(m.clone()),
        QueryableError::FieldError(m) => QueryableError::FieldError(m.clone()),
        QueryableError::DoesNotExist(m) => QueryableError::DoesNotExist(m.clone()),
        QueryableError::MultipleObjectsReturned(m) => {
            QueryableError::MultipleObjectsReturned(m.clone())
        }
        QueryableError::DatabaseError(m) => QueryableError::DatabaseError(m.clone()),
        QueryableError::IntegrityError(m) => QueryableError::IntegrityError(m.clone()),
        QueryableError::OperationalError(m) => QueryableError::OperationalError(m.clone()),
        QueryableError::ConfigurationError(m) => QueryableError::ConfigurationError(m.clone()),
        QueryableError::IoError(e) => {
            QueryableError::IoError(std::io::Error::new(e.kind(), e.to_string()))
        }
    }
}
