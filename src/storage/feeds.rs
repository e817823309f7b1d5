use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::cursor::RowCursor;
use super::db::{Database, TABLE_FEEDS};
use super::entries::EntryMapper;
use super::mapper::Persistable;
use super::predicate::{Predicate, Value};
use super::types::{DatabaseError, Feed};

/// Mapper between rows of the `feeds` table and [`Feed`] values.
///
/// The four filters are independent and each `None` means "do not
/// constrain on this field":
///
/// - `category_id` — restrict to feeds under one category.
/// - `feed_id` — restrict to exactly one feed.
/// - `exclude_entries` — `Some(true)` never touches the child entry
///   set; `Some(false)` cascades loads into it; `None` cascades store
///   and delete but not loads (only an affirmative request loads
///   children).
/// - `only_visible` — restricts query-side operations to rows with the
///   matching visibility; store and delete are identity/parent scoped
///   and ignore it.
pub struct FeedMapper {
    db: Database,
    category_id: Option<i64>,
    feed_id: Option<i64>,
    exclude_entries: Option<bool>,
    only_visible: Option<bool>,
}

impl FeedMapper {
    pub fn new(
        db: &Database,
        category_id: Option<i64>,
        feed_id: Option<i64>,
        exclude_entries: Option<bool>,
        only_visible: Option<bool>,
    ) -> Self {
        Self {
            db: db.clone(),
            category_id,
            feed_id,
            exclude_entries,
            only_visible,
        }
    }

    /// Child mapper over the entries owned by one feed (or by this
    /// mapper's whole scope, for deletes). Carries no visibility
    /// filter: cascades are parent scoped, not view filtered.
    fn entry_mapper(&self, category_id: Option<i64>, feed_id: Option<i64>) -> EntryMapper {
        EntryMapper::new(&self.db, category_id, feed_id, None)
    }

    /// Identity/parent scope shared by store and delete.
    fn scope_predicate(&self) -> Predicate {
        Predicate::new()
            .and_eq_opt("category_id", self.category_id)
            .and_eq_opt("id", self.feed_id)
    }
}

#[async_trait]
impl Persistable for FeedMapper {
    type Item = Feed;

    fn query(&self) -> RowCursor {
        // Clause order is fixed: category, feed id, visibility
        let predicate = self
            .scope_predicate()
            .and_eq_opt("visible", self.only_visible);
        self.db.query(TABLE_FEEDS, &predicate)
    }

    async fn materialize(&self, row: &SqliteRow) -> Result<Feed, DatabaseError> {
        let mut feed = Feed {
            id: Some(row.try_get(0)?),
            category_id: row.try_get(1)?,
            title: row.try_get(2)?,
            description: row.try_get(3)?,
            xml_url: row.try_get(4)?,
            visible: row.try_get::<i64, _>(5)? == 1,
            html_url: row.try_get(6)?,
            feed_type: row.try_get(7)?,
            entries: None,
        };

        // Only an affirmative "include children" request cascades
        if self.exclude_entries == Some(false) {
            let entries = self.entry_mapper(feed.category_id, feed.id);
            let mut cursor = entries.query();
            let mut cached = Vec::new();
            while let Some(entry_row) = cursor.try_next().await? {
                cached.push(entries.materialize(&entry_row).await?);
            }
            // Zero child rows leave the field unset, never Some(vec![])
            if !cached.is_empty() {
                feed.entries = Some(cached);
            }
        }
        Ok(feed)
    }

    async fn store(&self, items: Option<&mut Vec<Feed>>) -> Result<Option<Vec<i64>>, DatabaseError> {
        let Some(items) = items else {
            return Ok(None);
        };

        let mut ids = Vec::with_capacity(items.len());
        for feed in items.iter_mut() {
            // "Store feed already scoped under category X"
            if feed.category_id.is_none() {
                feed.category_id = self.category_id;
            }

            let values = [
                ("id", Value::from(feed.id)),
                ("category_id", Value::from(feed.category_id)),
                ("title", Value::from(feed.title.as_str())),
                ("description", Value::from(feed.description.as_deref())),
                ("xml_url", Value::from(feed.xml_url.as_str())),
                ("visible", Value::from(feed.visible)),
                ("html_url", Value::from(feed.html_url.as_deref())),
                ("type", Value::from(feed.feed_type.as_deref())),
            ];
            let id = self.db.insert_or_replace(TABLE_FEEDS, &values).await?;
            feed.id = Some(id);
            ids.push(id);

            if self.exclude_entries != Some(true) {
                let entry_mapper = self.entry_mapper(feed.category_id, Some(id));
                entry_mapper.store(feed.entries.as_mut()).await?;
            }
        }
        Ok(Some(ids))
    }

    async fn delete(&self) -> Result<u64, DatabaseError> {
        // Parent rows first, then children; the two phases are not
        // wrapped in a transaction, so a reader may transiently see
        // orphaned entries.
        let removed = self.db.delete(TABLE_FEEDS, &self.scope_predicate()).await?;
        tracing::debug!(
            removed,
            category_id = self.category_id,
            feed_id = self.feed_id,
            "deleted feeds"
        );

        if self.exclude_entries != Some(true) {
            self.entry_mapper(self.category_id, self.feed_id)
                .delete()
                .await?;
        }
        Ok(removed)
    }
}
