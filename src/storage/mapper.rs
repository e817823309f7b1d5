use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;

use super::cursor::RowCursor;
use super::types::DatabaseError;

/// Shared contract for per-entity mappers.
///
/// A mapper is configured at construction with the optional filters
/// that scope it; each operation builds its predicate from the filters
/// that are present and delegates to the store primitives, cascading
/// into a child-scoped mapper where the entity owns children.
///
/// Cascaded parent/child store and delete are two sequential phases
/// with no enclosing transaction: parent first, then children. On
/// partial failure the error propagates and the store is left in
/// whatever partially-applied state resulted.
#[async_trait]
pub trait Persistable: Send + Sync {
    type Item: Send;

    /// Run the scoped query, returning a cursor over the raw rows.
    fn query(&self) -> RowCursor;

    /// Read one item out of `row`, cascading into child records where
    /// the mapper was configured to include them.
    async fn materialize(&self, row: &SqliteRow) -> Result<Self::Item, DatabaseError>;

    /// Insert-or-replace `items`, writing each effective identity back
    /// onto its item and returning the identities in input order.
    ///
    /// `None` input is a caller-contract violation and yields
    /// `Ok(None)` ("nothing was stored"); an empty collection yields an
    /// empty identity list.
    async fn store(
        &self,
        items: Option<&mut Vec<Self::Item>>,
    ) -> Result<Option<Vec<i64>>, DatabaseError>;

    /// Delete every row in this mapper's scope (parent rows first,
    /// then cascaded children), returning the number of parent rows
    /// removed.
    async fn delete(&self) -> Result<u64, DatabaseError>;

    /// Query, then materialize every row: drives the cursor to
    /// exhaustion so its connection is always released.
    async fn load(&self) -> Result<Vec<Self::Item>, DatabaseError> {
        let mut cursor = self.query();
        let mut items = Vec::new();
        while let Some(row) = cursor.try_next().await? {
            items.push(self.materialize(&row).await?);
        }
        Ok(items)
    }
}
