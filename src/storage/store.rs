use sqlx::QueryBuilder;

use super::cursor::RowCursor;
use super::db::Database;
use super::predicate::{Predicate, Value};
use super::types::DatabaseError;

impl Database {
    // ========================================================================
    // Store Accessor Primitives
    // ========================================================================

    /// Query all columns of `table`, in declared column order, filtered
    /// by `predicate` (an empty predicate matches every row).
    ///
    /// Returns a lazy cursor; the caller must exhaust it or drop it to
    /// release the underlying connection.
    pub fn query(&self, table: &str, predicate: &Predicate) -> RowCursor {
        let sql = match predicate.to_sql() {
            Some(filter) => format!("SELECT * FROM {} WHERE {}", table, filter),
            None => format!("SELECT * FROM {}", table),
        };
        tracing::debug!(table, sql = %sql, "row query");
        RowCursor::spawn(self.pool.clone(), sql)
    }

    /// Insert a row, or replace an existing row carrying the same
    /// identity, and return the effective row id (the existing id on
    /// replace, a freshly generated one on insert).
    ///
    /// `values` is a full column set; a `Null` identity value yields a
    /// generated id.
    pub async fn insert_or_replace(
        &self,
        table: &str,
        values: &[(&str, Value)],
    ) -> Result<i64, DatabaseError> {
        let mut builder: QueryBuilder<sqlx::Sqlite> =
            QueryBuilder::new(format!("INSERT OR REPLACE INTO {} (", table));

        let mut columns = builder.separated(", ");
        for (column, _) in values {
            columns.push(*column);
        }
        builder.push(") VALUES (");

        let mut binds = builder.separated(", ");
        for (_, value) in values {
            match value {
                Value::Integer(n) => binds.push_bind(*n),
                Value::Text(s) => binds.push_bind(s.clone()),
                Value::Null => binds.push_bind(Option::<i64>::None),
            };
        }
        builder.push(")");

        let result = builder.build().execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    /// Delete every row of `table` matching `predicate`, returning the
    /// number of rows removed.
    ///
    /// An empty predicate deletes **all** rows in the table; callers
    /// must never reach this without an intentionally empty scope.
    pub async fn delete(&self, table: &str, predicate: &Predicate) -> Result<u64, DatabaseError> {
        let sql = match predicate.to_sql() {
            Some(filter) => format!("DELETE FROM {} WHERE {}", table, filter),
            None => format!("DELETE FROM {}", table),
        };
        tracing::debug!(table, sql = %sql, "row delete");
        let result = sqlx::query(&sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
