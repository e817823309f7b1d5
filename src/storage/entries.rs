use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use super::cursor::RowCursor;
use super::db::{Database, TABLE_ENTRIES};
use super::mapper::Persistable;
use super::predicate::{Predicate, Value};
use super::types::{DatabaseError, Entry};

/// Mapper between rows of the `entries` table and [`Entry`] values.
///
/// Entries are the leaf of the hierarchy: there is no further cascade.
/// Scope filters are the owning category and feed ids plus the
/// query-side visibility filter; `None` means "do not constrain".
pub struct EntryMapper {
    db: Database,
    category_id: Option<i64>,
    feed_id: Option<i64>,
    only_visible: Option<bool>,
}

impl EntryMapper {
    pub fn new(
        db: &Database,
        category_id: Option<i64>,
        feed_id: Option<i64>,
        only_visible: Option<bool>,
    ) -> Self {
        Self {
            db: db.clone(),
            category_id,
            feed_id,
            only_visible,
        }
    }

    /// Identity/parent scope shared by store and delete; never carries
    /// the visibility filter.
    fn scope_predicate(&self) -> Predicate {
        Predicate::new()
            .and_eq_opt("category_id", self.category_id)
            .and_eq_opt("feed_id", self.feed_id)
    }
}

#[async_trait]
impl Persistable for EntryMapper {
    type Item = Entry;

    fn query(&self) -> RowCursor {
        let predicate = self
            .scope_predicate()
            .and_eq_opt("visible", self.only_visible);
        self.db.query(TABLE_ENTRIES, &predicate)
    }

    async fn materialize(&self, row: &SqliteRow) -> Result<Entry, DatabaseError> {
        Ok(Entry {
            id: Some(row.try_get(0)?),
            category_id: row.try_get(1)?,
            feed_id: row.try_get(2)?,
            title: row.try_get(3)?,
            description: row.try_get(4)?,
            url: row.try_get(5)?,
            date: row.try_get(6)?,
            src_name: row.try_get(7)?,
            visible: row.try_get::<i64, _>(8)? == 1,
        })
    }

    async fn store(
        &self,
        items: Option<&mut Vec<Entry>>,
    ) -> Result<Option<Vec<i64>>, DatabaseError> {
        let Some(items) = items else {
            return Ok(None);
        };

        let mut ids = Vec::with_capacity(items.len());
        for entry in items.iter_mut() {
            if entry.category_id.is_none() {
                entry.category_id = self.category_id;
            }
            // The scope owns the parent link: a stale or absent feed id
            // on the in-memory entry is overwritten.
            if let Some(feed_id) = self.feed_id {
                entry.feed_id = Some(feed_id);
            }

            let values = [
                ("id", Value::from(entry.id)),
                ("category_id", Value::from(entry.category_id)),
                ("feed_id", Value::from(entry.feed_id)),
                ("title", Value::from(entry.title.as_str())),
                ("description", Value::from(entry.description.as_deref())),
                ("url", Value::from(entry.url.as_deref())),
                ("date", Value::from(entry.date)),
                ("src_name", Value::from(entry.src_name.as_deref())),
                ("visible", Value::from(entry.visible)),
            ];
            let id = self.db.insert_or_replace(TABLE_ENTRIES, &values).await?;
            entry.id = Some(id);
            ids.push(id);
        }
        Ok(Some(ids))
    }

    async fn delete(&self) -> Result<u64, DatabaseError> {
        let removed = self.db.delete(TABLE_ENTRIES, &self.scope_predicate()).await?;
        tracing::debug!(
            removed,
            category_id = self.category_id,
            feed_id = self.feed_id,
            "deleted entries"
        );
        Ok(removed)
    }
}
