//! Database execution layer.
//!
//! [`DbExecutor`] is the interface between compiled SQL and a concrete
//! database driver: backends implement four methods (send a statement, run a
//! query, run a single-row query, report their dialect) and the rest of the
//! crate funnels everything through them. [`save_model`] and [`delete_model`]
//! build on the executor to persist individual model instances.

use crate::model::Model;
use crate::query::compiler::{DatabaseBackendType, Row, SqlCompiler, WhereNode};
use crate::query::lookups::Lookup;
use crate::value::Value;
use queryable_core::{QueryableError, QueryableResult};

/// The interface a database backend implements.
///
/// All SQL produced by the query layer is compiled for
/// [`Self::backend_type`] and executed through these methods.
#[async_trait::async_trait]
pub trait DbExecutor: Send + Sync {
    /// The SQL dialect this executor speaks.
    fn backend_type(&self) -> DatabaseBackendType;

    /// Executes a statement and returns the number of affected rows.
    async fn execute_sql(&self, sql: &str, params: &[Value]) -> QueryableResult<u64>;

    /// Runs a query and returns all result rows.
    async fn query(&self, sql: &str, params: &[Value]) -> QueryableResult<Vec<Row>>;

    /// Runs a query expected to return exactly one row.
    async fn query_one(&self, sql: &str, params: &[Value]) -> QueryableResult<Row>;

    /// Executes an INSERT and returns the new row's ID.
    async fn insert_returning_id(&self, sql: &str, params: &[Value]) -> QueryableResult<Value> {
        // Default: query last_insert_rowid (SQLite) or LASTVAL() (PG)
        // Each backend should override this for correctness.
        self.execute_sql(sql, params).await?;
        let rows = self.query("SELECT last_insert_rowid() AS id", &[]).await?;
        if let Some(row) = rows.first() {
            row.get::<Value>("id")
        } else {
            Err(QueryableError::DatabaseError(
                "Failed to retrieve last inserted ID".to_string(),
            ))
        }
    }
}

/// Saves a model instance.
///
/// Instances with a primary key are updated; instances without one are
/// inserted and receive their new primary key via [`Model::set_pk`].
pub async fn save_model<M: Model>(model: &mut M, db: &dyn DbExecutor) -> QueryableResult<()> {
    let compiler = SqlCompiler::new(db.backend_type());
    let fields = model.non_pk_field_values();

    if let Some(pk) = model.pk() {
        if fields.is_empty() {
            return Ok(());
        }
        let where_clause = WhereNode::Condition {
            column: M::pk_field_name().to_string(),
            lookup: Lookup::Exact(pk),
        };
        let (sql, params) = compiler.compile_update(M::table_name(), &fields, &where_clause);
        db.execute_sql(&sql, &params).await?;
    } else {
        let (sql, params) = compiler.compile_insert(M::table_name(), &fields);
        let id = db.insert_returning_id(&sql, &params).await?;
        model.set_pk(id);
    }

    Ok(())
}

/// Deletes a model instance by primary key.
///
/// Returns the number of rows deleted.
pub async fn delete_model<M: Model>(model: &M, db: &dyn DbExecutor) -> QueryableResult<u64> {
    let pk = model.pk().ok_or_else(|| {
        QueryableError::DatabaseError("Cannot delete a model without a primary key".to_string())
    })?;

    let compiler = SqlCompiler::new(db.backend_type());
    let where_clause = WhereNode::Condition {
        column: M::pk_field_name().to_string(),
        lookup: Lookup::Exact(pk),
    };
    let (sql, params) = compiler.compile_delete(M::table_name(), &where_clause);
    db.execute_sql(&sql, &params).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{FieldDef, FieldType};
    use crate::model::ModelMeta;
    use std::sync::Mutex;

    struct Category {
        id: i64,
        name: String,
    }

    impl Model for Category {
        fn meta() -> &'static ModelMeta {
            use std::sync::LazyLock;
            static META: LazyLock<ModelMeta> = LazyLock::new(|| ModelMeta {
                app_label: "app",
                model_name: "category",
                db_table: "app_category".to_string(),
                verbose_name: "category".to_string(),
                verbose_name_plural: "categories".to_string(),
                ordering: vec![],
                abstract_model: false,
                fields: vec![
                    FieldDef::new("id", FieldType::BigAutoField).primary_key(),
                    FieldDef::new("name", FieldType::CharField).max_length(100),
                ],
            });
            &META
        }
        fn table_name() -> &'static str {
            "app_category"
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
            ]
        }
        fn from_row(row: &Row) -> Result<Self, QueryableError> {
            Ok(Category {
                id: row.get("id")?,
                name: row.get("name")?,
            })
        }
    }

    /// Records every statement it receives instead of talking to a database.
    struct RecordingExecutor {
        statements: Mutex<Vec<(String, Vec<Value>)>>,
        insert_id: i64,
    }

    impl RecordingExecutor {
        fn new(insert_id: i64) -> Self {
            Self {
                statements: Mutex::new(Vec::new()),
                insert_id,
            }
        }
    }

    #[async_trait::async_trait]
    impl DbExecutor for RecordingExecutor {
        fn backend_type(&self) -> DatabaseBackendType {
            DatabaseBackendType::PostgreSQL
        }

        async fn execute_sql(&self, sql: &str, params: &[Value]) -> QueryableResult<u64> {
            self.statements
                .lock()
                .unwrap()
                .push((sql.to_string(), params.to_vec()));
            Ok(1)
        }

        async fn query(&self, sql: &str, params: &[Value]) -> QueryableResult<Vec<Row>> {
            self.statements
                .lock()
                .unwrap()
                .push((sql.to_string(), params.to_vec()));
            Ok(vec![])
        }

        async fn query_one(&self, sql: &str, params: &[Value]) -> QueryableResult<Row> {
            self.statements
                .lock()
                .unwrap()
                .push((sql.to_string(), params.to_vec()));
            Err(QueryableError::DoesNotExist("no rows".to_string()))
        }

        async fn insert_returning_id(
            &self,
            sql: &str,
            params: &[Value],
        ) -> QueryableResult<Value> {
            self.statements
                .lock()
                .unwrap()
                .push((sql.to_string(), params.to_vec()));
            Ok(Value::Int(self.insert_id))
        }
    }

    fn _assert_object_safe(_: &dyn DbExecutor) {}

    #[tokio::test]
    async fn test_save_model_with_pk_updates() {
        let db = RecordingExecutor::new(7);
        let mut cat = Category {
            id: 3,
            name: "Demo apps".to_string(),
        };
        save_model(&mut cat, &db).await.unwrap();

        let stmts = db.statements.lock().unwrap();
        assert_eq!(stmts.len(), 1);
        assert_eq!(
            stmts[0].0,
            "UPDATE \"app_category\" SET \"name\" = $1 WHERE \"id\" = $2"
        );
        assert_eq!(
            stmts[0].1,
            vec![Value::String("Demo apps".to_string()), Value::Int(3)]
        );
    }

    #[tokio::test]
    async fn test_save_model_without_pk_inserts_and_sets_pk() {
        let db = RecordingExecutor::new(7);
        let mut cat = Category {
            id: 0,
            name: "New category".to_string(),
        };
        save_model(&mut cat, &db).await.unwrap();
        assert_eq!(cat.id, 7);

        let stmts = db.statements.lock().unwrap();
        assert_eq!(stmts.len(), 1);
        assert_eq!(
            stmts[0].0,
            "INSERT INTO \"app_category\" (\"name\") VALUES ($1)"
        );
    }

    #[tokio::test]
    async fn test_delete_model() {
        let db = RecordingExecutor::new(1);
        let cat = Category {
            id: 5,
            name: "Obsolete".to_string(),
        };
        let deleted = delete_model(&cat, &db).await.unwrap();
        assert_eq!(deleted, 1);

        let stmts = db.statements.lock().unwrap();
        assert_eq!(stmts[0].0, "DELETE FROM \"app_category\" WHERE \"id\" = $1");
        assert_eq!(stmts[0].1, vec![Value::Int(5)]);
    }

    #[tokio::test]
    async fn test_delete_model_without_pk_errors() {
        let db = RecordingExecutor::new(1);
        let cat = Category {
            id: 0,
            name: "Unsaved".to_string(),
        };
        let err = delete_model(&cat, &db).await.unwrap_err();
        assert!(matches!(err, QueryableError::DatabaseError(_)));
    }
}
