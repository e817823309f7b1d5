use futures::StreamExt;
use sqlx::sqlite::SqliteRow;
use sqlx::SqlitePool;
use tokio::sync::mpsc;

use super::types::DatabaseError;

/// Forward-only, single-pass view over the rows of one query.
///
/// A background task drives the underlying fetch stream and hands rows
/// through a bounded channel, so the query stays lazy: at most
/// [`READ_AHEAD`](Self::READ_AHEAD) rows are materialized ahead of the
/// consumer. Dropping the cursor closes the channel, which ends the
/// task and returns its connection to the pool — release happens on
/// every exit path, including early drops and `?` propagation out of
/// row materialization.
pub struct RowCursor {
    rows: mpsc::Receiver<Result<SqliteRow, sqlx::Error>>,
}

impl RowCursor {
    /// How many rows may be buffered ahead of the consumer.
    const READ_AHEAD: usize = 32;

    pub(crate) fn spawn(pool: SqlitePool, sql: String) -> Self {
        let (tx, rows) = mpsc::channel(Self::READ_AHEAD);
        tokio::spawn(async move {
            let mut stream = sqlx::query(&sql).fetch(&pool);
            while let Some(row) = stream.next().await {
                let failed = row.is_err();
                if tx.send(row).await.is_err() {
                    // Receiver dropped; stop reading.
                    break;
                }
                if failed {
                    break;
                }
            }
        });
        Self { rows }
    }

    /// Advance to the next row. `Ok(None)` means the cursor is exhausted.
    pub async fn try_next(&mut self) -> Result<Option<SqliteRow>, DatabaseError> {
        match self.rows.recv().await {
            Some(Ok(row)) => Ok(Some(row)),
            Some(Err(e)) => Err(DatabaseError::from(e)),
            None => Ok(None),
        }
    }
}
