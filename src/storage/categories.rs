use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::cursor::RowCursor;
use super::db::{Database, TABLE_CATEGORIES};
use super::feeds::FeedMapper;
use super::mapper::Persistable;
use super::predicate::{Predicate, Value};
use super::types::{Category, DatabaseError};

/// Mapper between rows of the `categories` table and [`Category`]
/// values, the top of the hierarchy.
///
/// Cascades follow the same rules as [`FeedMapper`]: loads descend only
/// on `exclude_feeds == Some(false)` (and then pull each feed's entries
/// along), store and delete descend unless `exclude_feeds ==
/// Some(true)`.
pub struct CategoryMapper {
    db: Database,
    category_id: Option<i64>,
    exclude_feeds: Option<bool>,
    only_visible: Option<bool>,
}

impl CategoryMapper {
    pub fn new(
        db: &Database,
        category_id: Option<i64>,
        exclude_feeds: Option<bool>,
        only_visible: Option<bool>,
    ) -> Self {
        Self {
            db: db.clone(),
            category_id,
            exclude_feeds,
            only_visible,
        }
    }

    fn scope_predicate(&self) -> Predicate {
        Predicate::new().and_eq_opt("id", self.category_id)
    }
}

#[async_trait]
impl Persistable for CategoryMapper {
    type Item = Category;

    fn query(&self) -> RowCursor {
        let predicate = self
            .scope_predicate()
            .and_eq_opt("visible", self.only_visible);
        self.db.query(TABLE_CATEGORIES, &predicate)
    }

    async fn materialize(&self, row: &SqliteRow) -> Result<Category, DatabaseError> {
        let mut category = Category {
            id: Some(row.try_get(0)?),
            name: row.try_get(1)?,
            color: row.try_get(2)?,
            visible: row.try_get::<i64, _>(3)? == 1,
            last_update: row.try_get(4)?,
            feeds: None,
        };

        if self.exclude_feeds == Some(false) {
            // Full-subtree load: feeds pull their entries along
            let feeds = FeedMapper::new(&self.db, category.id, None, Some(false), None);
            let mut cursor = feeds.query();
            let mut cached = Vec::new();
            while let Some(feed_row) = cursor.try_next().await? {
                cached.push(feeds.materialize(&feed_row).await?);
            }
            if !cached.is_empty() {
                category.feeds = Some(cached);
            }
        }
        Ok(category)
    }

    async fn store(
        &self,
        items: Option<&mut Vec<Category>>,
    ) -> Result<Option<Vec<i64>>, DatabaseError> {
        let Some(items) = items else {
            return Ok(None);
        };

        let mut ids = Vec::with_capacity(items.len());
        for category in items.iter_mut() {
            let values = [
                ("id", Value::from(category.id)),
                ("name", Value::from(category.name.as_str())),
                ("color", Value::from(category.color)),
                ("visible", Value::from(category.visible)),
                ("last_update", Value::from(category.last_update)),
            ];
            let id = self.db.insert_or_replace(TABLE_CATEGORIES, &values).await?;
            category.id = Some(id);
            ids.push(id);

            if self.exclude_feeds != Some(true) {
                let feeds = FeedMapper::new(&self.db, Some(id), None, None, None);
                feeds.store(category.feeds.as_mut()).await?;
            }
        }
        Ok(Some(ids))
    }

    async fn delete(&self) -> Result<u64, DatabaseError> {
        let removed = self
            .db
            .delete(TABLE_CATEGORIES, &self.scope_predicate())
            .await?;
        tracing::debug!(removed, category_id = self.category_id, "deleted categories");

        if self.exclude_feeds != Some(true) {
            // Feed mapper cascades onward into entries
            FeedMapper::new(&self.db, self.category_id, None, None, None)
                .delete()
                .await?;
        }
        Ok(removed)
    }
}
