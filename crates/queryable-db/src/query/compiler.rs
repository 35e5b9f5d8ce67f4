//! SQL query AST and compiler.
//!
//! This module defines the [`Query`] AST that represents a database query, and
//! the [`SqlCompiler`] that translates it into parameterized SQL strings. The
//! compiler supports PostgreSQL (`$1, $2, ...`) and SQLite/MySQL (`?`)
//! parameter placeholder styles.
//!
//! Queryable property annotations surface here as ordinary entries in
//! [`Query::annotations`]: computed expressions selected under an alias,
//! filtered through [`WhereNode::ExpressionCondition`] and ordered through
//! [`OrderTarget::Expression`]. The compiler threads a single parameter list
//! through subqueries so that placeholder numbering stays correct when a
//! correlated annotation sits next to an outer WHERE condition.

use super::expressions::Expression;
use super::lookups::{Lookup, Q};
use crate::value::Value;
use queryable_core::QueryableError;

/// The type of database backend, used by the compiler to generate
/// backend-specific SQL syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackendType {
    /// PostgreSQL (uses `$1, $2, ...` placeholders).
    PostgreSQL,
    /// SQLite (uses `?` placeholders).
    SQLite,
    /// MySQL (uses `?` placeholders).
    MySQL,
}

/// What an ORDER BY entry sorts on.
///
/// Ordering by a selected annotation uses its alias as a plain column;
/// ordering by a property that is not selected inlines the full expression.
#[derive(Debug, Clone)]
pub enum OrderTarget {
    /// A column (or selected annotation alias).
    Column(String),
    /// An inlined expression.
    Expression(Expression),
}

/// A single ORDER BY entry.
#[derive(Debug, Clone)]
pub struct OrderBy {
    /// The column or expression to order by.
    pub target: OrderTarget,
    /// Whether to sort in descending order.
    pub descending: bool,
    /// Whether to put nulls first or last.
    pub nulls_first: Option<bool>,
}

impl OrderBy {
    /// Creates an ascending order on a column.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            target: OrderTarget::Column(column.into()),
            descending: false,
            nulls_first: None,
        }
    }

    /// Creates a descending order on a column.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            target: OrderTarget::Column(column.into()),
            descending: true,
            nulls_first: None,
        }
    }

    /// Creates an ascending order on an expression.
    pub fn asc_expr(expr: Expression) -> Self {
        Self {
            target: OrderTarget::Expression(expr),
            descending: false,
            nulls_first: None,
        }
    }

    /// Creates a descending order on an expression.
    pub fn desc_expr(expr: Expression) -> Self {
        Self {
            target: OrderTarget::Expression(expr),
            descending: true,
            nulls_first: None,
        }
    }
}

/// A column to select in a query.
#[derive(Debug, Clone)]
pub enum SelectColumn {
    /// A simple column name.
    Column(String),
    /// An expression with an alias.
    Expression(Expression, String),
    /// All columns (`*`).
    Star,
}

/// A WHERE (or HAVING) clause node in the query AST.
#[derive(Debug, Clone)]
pub enum WhereNode {
    /// A lookup against a plain column.
    Condition {
        /// The column name.
        column: String,
        /// The lookup type.
        lookup: Lookup,
    },
    /// A lookup against a computed expression.
    ///
    /// Produced when a filter targets an annotation: the annotation's
    /// expression becomes the left-hand side of the lookup. Aggregating
    /// expressions belong in [`Query::having`], everything else in
    /// [`Query::where_clause`].
    ExpressionCondition {
        /// The left-hand side expression.
        expr: Expression,
        /// The lookup type.
        lookup: Lookup,
    },
    /// An equality between a column and an expression.
    ///
    /// The correlation predicate of subqueries, e.g.
    /// `"application_id" = "app_application"."id"` with an
    /// [`Expression::OuterRef`] on the right-hand side.
    ColumnExpression {
        /// The column name.
        column: String,
        /// The right-hand side expression.
        expr: Expression,
    },
    /// Logical AND of conditions.
    And(Vec<WhereNode>),
    /// Logical OR of conditions.
    Or(Vec<WhereNode>),
    /// Logical NOT of a condition.
    Not(Box<WhereNode>),
}

impl WhereNode {
    /// Converts a `Q` object into a `WhereNode`.
    pub fn from_q(q: &Q) -> Self {
        match q {
            Q::Filter { field, lookup } => Self::Condition {
                column: field.clone(),
                lookup: lookup.clone(),
            },
            Q::And(children) => {
                Self::And(children.iter().map(Self::from_q).collect())
            }
            Q::Or(children) => {
                Self::Or(children.iter().map(Self::from_q).collect())
            }
            Q::Not(inner) => Self::Not(Box::new(Self::from_q(inner))),
        }
    }
}

/// The complete query AST representing a SELECT statement.
#[derive(Debug, Clone)]
pub struct Query {
    /// The main table name.
    pub table: String,
    /// Columns to select.
    pub select: Vec<SelectColumn>,
    /// WHERE clause.
    pub where_clause: Option<WhereNode>,
    /// ORDER BY clauses.
    pub order_by: Vec<OrderBy>,
    /// GROUP BY columns.
    pub group_by: Vec<String>,
    /// HAVING clause.
    pub having: Option<WhereNode>,
    /// LIMIT.
    pub limit: Option<usize>,
    /// OFFSET.
    pub offset: Option<usize>,
    /// DISTINCT flag.
    pub distinct: bool,
    /// Named annotations (computed columns), in declaration order.
    ///
    /// Kept as a vector so the selected columns render deterministically.
    pub annotations: Vec<(String, Expression)>,
}

impl Query {
    /// Creates a new query for the given table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            select: vec![SelectColumn::Star],
            where_clause: None,
            order_by: Vec::new(),
            group_by: Vec::new(),
            having: None,
            limit: None,
            offset: None,
            distinct: false,
            annotations: Vec::new(),
        }
    }

    /// Adds an annotation under the given alias.
    ///
    /// Re-annotating an existing alias replaces its expression in place, so
    /// the original declaration position is kept.
    pub fn add_annotation(&mut self, name: impl Into<String>, expr: Expression) {
        let name = name.into();
        if let Some(slot) = self.annotations.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = expr;
        } else {
            self.annotations.push((name, expr));
        }
    }

    /// Returns the annotation expression registered under `name`, if any.
    pub fn annotation(&self, name: &str) -> Option<&Expression> {
        self.annotations
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, expr)| expr)
    }

    /// Sets the GROUP BY columns, replacing any existing grouping.
    pub fn set_group_by(&mut self, columns: Vec<String>) {
        self.group_by = columns;
    }

    /// ANDs a condition node into the WHERE clause.
    pub fn and_where(&mut self, node: WhereNode) {
        self.where_clause = Some(match self.where_clause.take() {
            Some(existing) => WhereNode::And(vec![existing, node]),
            None => node,
        });
    }

    /// ANDs a condition node into the HAVING clause.
    pub fn and_having(&mut self, node: WhereNode) {
        self.having = Some(match self.having.take() {
            Some(existing) => WhereNode::And(vec![existing, node]),
            None => node,
        });
    }
}

/// A generic database row for passing data between backends and the ORM.
///
/// `Row` holds a list of column names and their corresponding values. It
/// provides typed access via the [`get`](Row::get) method.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Creates a new row from column names and values.
    ///
    /// # Panics
    ///
    /// Panics if the number of columns does not match the number of values.
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Self {
        assert_eq!(
            columns.len(),
            values.len(),
            "Row column count must match value count"
        );
        Self { columns, values }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if the row has no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Gets a typed value by column name.
    ///
    /// # Errors
    ///
    /// Returns an error if the column does not exist or the value cannot be
    /// converted to the requested type.
    pub fn get<T: FromValue>(&self, column: &str) -> Result<T, QueryableError> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| {
                QueryableError::DatabaseError(format!("Column '{column}' not found in row"))
            })?;
        T::from_value(&self.values[idx])
    }

    /// Gets a typed value by column index.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of bounds or the value cannot be
    /// converted to the requested type.
    pub fn get_by_index<T: FromValue>(&self, idx: usize) -> Result<T, QueryableError> {
        if idx >= self.values.len() {
            return Err(QueryableError::DatabaseError(format!(
                "Column index {idx} out of bounds (row has {} columns)",
                self.values.len()
            )));
        }
        T::from_value(&self.values[idx])
    }

    /// Returns a reference to the raw Value at the given column name.
    pub fn get_value(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|idx| &self.values[idx])
    }
}

/// Trait for converting a [`Value`] to a concrete Rust type.
pub trait FromValue: Sized {
    /// Attempts to convert a value reference to this type.
    fn from_value(value: &Value) -> Result<Self, QueryableError>;
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, QueryableError> {
        match value {
            Value::Int(i) => Ok(*i),
            _ => Err(QueryableError::DatabaseError(format!(
                "Expected Int, got {value:?}"
            ))),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, QueryableError> {
        match value {
            Value::Int(i) => i32::try_from(*i).map_err(|e| {
                QueryableError::DatabaseError(format!("Int value out of i32 range: {e}"))
            }),
            _ => Err(QueryableError::DatabaseError(format!(
                "Expected Int, got {value:?}"
            ))),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, QueryableError> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            _ => Err(QueryableError::DatabaseError(format!(
                "Expected Float, got {value:?}"
            ))),
        }
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, QueryableError> {
        match value {
            Value::Bool(b) => Ok(*b),
            _ => Err(QueryableError::DatabaseError(format!(
                "Expected Bool, got {value:?}"
            ))),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, QueryableError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            _ => Err(QueryableError::DatabaseError(format!(
                "Expected String, got {value:?}"
            ))),
        }
    }
}

impl FromValue for uuid::Uuid {
    fn from_value(value: &Value) -> Result<Self, QueryableError> {
        match value {
            Value::Uuid(u) => Ok(*u),
            _ => Err(QueryableError::DatabaseError(format!(
                "Expected Uuid, got {value:?}"
            ))),
        }
    }
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, QueryableError> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, QueryableError> {
        match value {
            Value::Null => Ok(None),
            _ => T::from_value(value).map(Some),
        }
    }
}

/// The SQL compiler translates a [`Query`] AST into parameterized SQL.
///
/// Different backends use different placeholder styles:
/// - PostgreSQL: `$1, $2, $3, ...`
/// - SQLite / MySQL: `?, ?, ?, ...`
pub struct SqlCompiler {
    backend: DatabaseBackendType,
}

impl SqlCompiler {
    /// Creates a new compiler for the given backend type.
    pub const fn new(backend: DatabaseBackendType) -> Self {
        Self { backend }
    }

    /// Returns a parameter placeholder for the given 1-based index.
    fn placeholder(&self, index: usize) -> String {
        match self.backend {
            DatabaseBackendType::PostgreSQL => format!("${index}"),
            DatabaseBackendType::SQLite | DatabaseBackendType::MySQL => "?".to_string(),
        }
    }

    /// Compiles a SELECT query into SQL and parameters.
    pub fn compile_select(&self, query: &Query) -> (String, Vec<Value>) {
        let mut params: Vec<Value> = Vec::new();
        let sql = self.compile_select_inner(query, &mut params, None);
        (sql, params)
    }

    /// Compiles a SELECT into an existing parameter list.
    ///
    /// Used when the SELECT becomes the FROM subquery of a wrapping statement
    /// whose own expressions were compiled first.
    pub(crate) fn compile_select_into(&self, query: &Query, params: &mut Vec<Value>) -> String {
        self.compile_select_inner(query, params, None)
    }

    /// Compiles a SELECT, appending parameters to a shared list.
    ///
    /// `outer_table` is the table of the enclosing query when this SELECT is
    /// embedded as a subquery; `OuterRef` columns qualify against it. Sharing
    /// `params` keeps PostgreSQL placeholder numbering continuous across
    /// subquery boundaries.
    fn compile_select_inner(
        &self,
        query: &Query,
        params: &mut Vec<Value>,
        outer_table: Option<&str>,
    ) -> String {
        let table = query.table.as_str();
        let mut sql = String::from("SELECT ");

        if query.distinct {
            sql.push_str("DISTINCT ");
        }

        // SELECT columns, then annotations in declaration order. An empty
        // select list with annotations (a values() call naming only
        // computed columns) selects just the annotations.
        let mut select_parts: Vec<String> = query
            .select
            .iter()
            .map(|col| match col {
                SelectColumn::Column(name) => format!("\"{name}\""),
                SelectColumn::Expression(expr, alias) => {
                    let expr_sql =
                        self.compile_expression_in(expr, params, Some(table), outer_table);
                    format!("{expr_sql} AS \"{alias}\"")
                }
                SelectColumn::Star => "*".to_string(),
            })
            .collect();
        for (alias, expr) in &query.annotations {
            let expr_sql = self.compile_expression_in(expr, params, Some(table), outer_table);
            select_parts.push(format!("{expr_sql} AS \"{alias}\""));
        }
        if select_parts.is_empty() {
            select_parts.push("*".to_string());
        }
        sql.push_str(&select_parts.join(", "));

        // FROM
        sql.push_str(&format!(" FROM \"{table}\""));

        // WHERE
        if let Some(ref where_clause) = query.where_clause {
            sql.push_str(" WHERE ");
            self.compile_where_node(where_clause, &mut sql, params, Some(table), outer_table);
        }

        // GROUP BY
        if !query.group_by.is_empty() {
            let cols: Vec<String> = query.group_by.iter().map(|c| format!("\"{c}\"")).collect();
            sql.push_str(&format!(" GROUP BY {}", cols.join(", ")));
        }

        // HAVING
        if let Some(ref having) = query.having {
            sql.push_str(" HAVING ");
            self.compile_where_node(having, &mut sql, params, Some(table), outer_table);
        }

        // ORDER BY
        if !query.order_by.is_empty() {
            let mut orders: Vec<String> = Vec::with_capacity(query.order_by.len());
            for o in &query.order_by {
                let dir = if o.descending { " DESC" } else { " ASC" };
                let nulls = match o.nulls_first {
                    Some(true) => " NULLS FIRST",
                    Some(false) => " NULLS LAST",
                    None => "",
                };
                let target = match &o.target {
                    OrderTarget::Column(name) => format!("\"{name}\""),
                    OrderTarget::Expression(expr) => {
                        self.compile_expression_in(expr, params, Some(table), outer_table)
                    }
                };
                orders.push(format!("{target}{dir}{nulls}"));
            }
            sql.push_str(&format!(" ORDER BY {}", orders.join(", ")));
        }

        // LIMIT
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        // OFFSET
        if let Some(offset) = query.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }

    /// Compiles an INSERT statement.
    pub fn compile_insert<S: AsRef<str>>(
        &self,
        table: &str,
        fields: &[(S, Value)],
    ) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let columns: Vec<String> = fields
            .iter()
            .map(|(name, _)| format!("\"{}\"", name.as_ref()))
            .collect();
        let placeholders: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, (_, val))| {
                params.push(val.clone());
                self.placeholder(i + 1)
            })
            .collect();

        let sql = format!(
            "INSERT INTO \"{}\" ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        );

        (sql, params)
    }

    /// Compiles an UPDATE statement.
    pub fn compile_update<S: AsRef<str>>(
        &self,
        table: &str,
        fields: &[(S, Value)],
        where_clause: &WhereNode,
    ) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let set_parts: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, (name, val))| {
                params.push(val.clone());
                let ph = self.placeholder(i + 1);
                format!("\"{}\" = {ph}", name.as_ref())
            })
            .collect();

        let mut sql = format!(
            "UPDATE \"{}\" SET {} WHERE ",
            table,
            set_parts.join(", ")
        );

        self.compile_where_node(where_clause, &mut sql, &mut params, Some(table), None);

        (sql, params)
    }

    /// Compiles a DELETE statement.
    pub fn compile_delete(
        &self,
        table: &str,
        where_clause: &WhereNode,
    ) -> (String, Vec<Value>) {
        let mut params = Vec::new();
        let mut sql = format!("DELETE FROM \"{table}\" WHERE ");
        self.compile_where_node(where_clause, &mut sql, &mut params, Some(table), None);
        (sql, params)
    }

    /// Compiles a `WhereNode` into SQL, appending to the provided string.
    fn compile_where_node(
        &self,
        node: &WhereNode,
        sql: &mut String,
        params: &mut Vec<Value>,
        current: Option<&str>,
        outer: Option<&str>,
    ) {
        match node {
            WhereNode::Condition { column, lookup } => {
                let lhs = format!("\"{column}\"");
                self.compile_lookup(&lhs, lookup, sql, params);
            }
            WhereNode::ExpressionCondition { expr, lookup } => {
                let lhs = self.compile_expression_in(expr, params, current, outer);
                self.compile_lookup(&lhs, lookup, sql, params);
            }
            WhereNode::ColumnExpression { column, expr } => {
                let rhs = self.compile_expression_in(expr, params, current, outer);
                sql.push_str(&format!("\"{column}\" = {rhs}"));
            }
            WhereNode::And(children) => {
                if children.is_empty() {
                    sql.push_str("1=1");
                    return;
                }
                sql.push('(');
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(" AND ");
                    }
                    self.compile_where_node(child, sql, params, current, outer);
                }
                sql.push(')');
            }
            WhereNode::Or(children) => {
                if children.is_empty() {
                    sql.push_str("1=0");
                    return;
                }
                sql.push('(');
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        sql.push_str(" OR ");
                    }
                    self.compile_where_node(child, sql, params, current, outer);
                }
                sql.push(')');
            }
            WhereNode::Not(inner) => {
                sql.push_str("NOT (");
                self.compile_where_node(inner, sql, params, current, outer);
                sql.push(')');
            }
        }
    }

    /// Compiles a single lookup into SQL.
    ///
    /// `lhs` is the already-rendered left-hand side: a quoted column for
    /// plain conditions, a full expression for annotation-backed ones.
    fn compile_lookup(
        &self,
        lhs: &str,
        lookup: &Lookup,
        sql: &mut String,
        params: &mut Vec<Value>,
    ) {
        match lookup {
            Lookup::Exact(val) => {
                if val.is_null() {
                    sql.push_str(&format!("{lhs} IS NULL"));
                } else {
                    params.push(val.clone());
                    let ph = self.placeholder(params.len());
                    sql.push_str(&format!("{lhs} = {ph}"));
                }
            }
            Lookup::IExact(val) => {
                params.push(val.clone());
                let ph = self.placeholder(params.len());
                sql.push_str(&format!("LOWER({lhs}) = LOWER({ph})"));
            }
            Lookup::Contains(val) => {
                params.push(Value::String(format!("%{val}%")));
                let ph = self.placeholder(params.len());
                sql.push_str(&format!("{lhs} LIKE {ph}"));
            }
            Lookup::IContains(val) => {
                params.push(Value::String(format!("%{val}%")));
                let ph = self.placeholder(params.len());
                match self.backend {
                    DatabaseBackendType::PostgreSQL => {
                        sql.push_str(&format!("{lhs} ILIKE {ph}"));
                    }
                    _ => {
                        sql.push_str(&format!("LOWER({lhs}) LIKE LOWER({ph})"));
                    }
                }
            }
            Lookup::In(vals) => {
                let placeholders: Vec<String> = vals
                    .iter()
                    .map(|v| {
                        params.push(v.clone());
                        self.placeholder(params.len())
                    })
                    .collect();
                sql.push_str(&format!("{lhs} IN ({})", placeholders.join(", ")));
            }
            Lookup::Gt(val) => {
                params.push(val.clone());
                let ph = self.placeholder(params.len());
                sql.push_str(&format!("{lhs} > {ph}"));
            }
            Lookup::Gte(val) => {
                params.push(val.clone());
                let ph = self.placeholder(params.len());
                sql.push_str(&format!("{lhs} >= {ph}"));
            }
            Lookup::Lt(val) => {
                params.push(val.clone());
                let ph = self.placeholder(params.len());
                sql.push_str(&format!("{lhs} < {ph}"));
            }
            Lookup::Lte(val) => {
                params.push(val.clone());
                let ph = self.placeholder(params.len());
                sql.push_str(&format!("{lhs} <= {ph}"));
            }
            Lookup::StartsWith(val) => {
                params.push(Value::String(format!("{val}%")));
                let ph = self.placeholder(params.len());
                sql.push_str(&format!("{lhs} LIKE {ph}"));
            }
            Lookup::EndsWith(val) => {
                params.push(Value::String(format!("%{val}")));
                let ph = self.placeholder(params.len());
                sql.push_str(&format!("{lhs} LIKE {ph}"));
            }
            Lookup::Range(low, high) => {
                params.push(low.clone());
                let ph_low = self.placeholder(params.len());
                params.push(high.clone());
                let ph_high = self.placeholder(params.len());
                sql.push_str(&format!("{lhs} BETWEEN {ph_low} AND {ph_high}"));
            }
            Lookup::IsNull(is_null) => {
                if *is_null {
                    sql.push_str(&format!("{lhs} IS NULL"));
                } else {
                    sql.push_str(&format!("{lhs} IS NOT NULL"));
                }
            }
        }
    }

    /// Compiles a standalone expression into SQL, appending its parameters.
    pub fn compile_expression(&self, expr: &Expression, params: &mut Vec<Value>) -> String {
        self.compile_expression_in(expr, params, None, None)
    }

    /// Compiles an expression in the context of a query.
    ///
    /// `current` is the table of the query the expression belongs to, and
    /// becomes the outer table of any subquery nested in the expression.
    /// `outer` is the enclosing query's table when the expression itself sits
    /// inside a subquery; `OuterRef` resolves against it.
    fn compile_expression_in(
        &self,
        expr: &Expression,
        params: &mut Vec<Value>,
        current: Option<&str>,
        outer: Option<&str>,
    ) -> String {
        match expr {
            Expression::Col(name) => {
                if name == "*" {
                    "*".to_string()
                } else {
                    format!("\"{name}\"")
                }
            }
            Expression::Value(val) => {
                params.push(val.clone());
                self.placeholder(params.len())
            }
            Expression::F(name) => format!("\"{name}\""),
            Expression::Func { name, args } => {
                let arg_parts: Vec<String> = args
                    .iter()
                    .map(|a| self.compile_expression_in(a, params, current, outer))
                    .collect();
                format!("{name}({})", arg_parts.join(", "))
            }
            Expression::Aggregate {
                func,
                field,
                distinct,
            } => {
                let field_sql = self.compile_expression_in(field, params, current, outer);
                let distinct_str = if *distinct { "DISTINCT " } else { "" };
                format!("{}({distinct_str}{field_sql})", func.sql_name())
            }
            Expression::Case { whens, default } => {
                let mut sql = "CASE".to_string();
                for when in whens {
                    sql.push_str(" WHEN ");
                    let node = WhereNode::from_q(&when.condition);
                    let mut cond_sql = String::new();
                    self.compile_where_node(&node, &mut cond_sql, params, current, outer);
                    sql.push_str(&cond_sql);
                    sql.push_str(" THEN ");
                    sql.push_str(&self.compile_expression_in(&when.then, params, current, outer));
                }
                if let Some(default) = default {
                    sql.push_str(" ELSE ");
                    sql.push_str(&self.compile_expression_in(default, params, current, outer));
                }
                sql.push_str(" END");
                sql
            }
            Expression::Subquery(query) => {
                let sub_sql = self.compile_select_inner(query, params, current);
                format!("({sub_sql})")
            }
            Expression::OuterRef(column) => match outer {
                Some(table) => format!("\"{table}\".\"{column}\""),
                None => format!("\"{column}\""),
            },
            Expression::Exists { query, negated } => {
                // EXISTS only checks row presence: select a constant, drop
                // the ordering and stop at the first row.
                let mut inner = (**query).clone();
                inner.select = vec![SelectColumn::Expression(
                    Expression::RawSQL("1".to_string(), Vec::new()),
                    "__exists__".to_string(),
                )];
                inner.order_by.clear();
                inner.limit = Some(1);
                let sub_sql = self.compile_select_inner(&inner, params, current);
                let prefix = if *negated { "NOT EXISTS" } else { "EXISTS" };
                format!("{prefix} ({sub_sql})")
            }
            Expression::Cast { expr, data_type } => {
                let inner = self.compile_expression_in(expr, params, current, outer);
                format!("CAST({inner} AS {data_type})")
            }
            Expression::RawSQL(raw, raw_params) => {
                params.extend(raw_params.clone());
                raw.clone()
            }
            Expression::Add(left, right) => {
                let l = self.compile_expression_in(left, params, current, outer);
                let r = self.compile_expression_in(right, params, current, outer);
                format!("({l} + {r})")
            }
            Expression::Sub(left, right) => {
                let l = self.compile_expression_in(left, params, current, outer);
                let r = self.compile_expression_in(right, params, current, outer);
                format!("({l} - {r})")
            }
            Expression::Mul(left, right) => {
                let l = self.compile_expression_in(left, params, current, outer);
                let r = self.compile_expression_in(right, params, current, outer);
                format!("({l} * {r})")
            }
            Expression::Div(left, right) => {
                let l = self.compile_expression_in(left, params, current, outer);
                let r = self.compile_expression_in(right, params, current, outer);
                format!("({l} / {r})")
            }
        }
    }
}
