//! Cursor-driven persistence for a three-level feed hierarchy
//! (category → feed → entry) backed by SQLite.
//!
//! The crate is organized around per-entity *mappers* sharing one
//! [`storage::Persistable`] contract: each mapper is configured with a
//! set of optional scalar filters, builds a conjunctive predicate from
//! the filters that are present, and delegates to the generic store
//! primitives on [`storage::Database`]. Store and delete cascade from
//! parents into their owned children unless the caller excludes them;
//! loads cascade only on an affirmative request.
//!
//! ```no_run
//! use feedstore::storage::{Database, Feed, FeedMapper, Persistable};
//!
//! # async fn demo() -> Result<(), feedstore::storage::DatabaseError> {
//! let db = Database::open("news.db").await?;
//!
//! // Store a feed under category 7, entries included.
//! let mapper = FeedMapper::new(&db, Some(7), None, None, None);
//! let mut feeds = vec![Feed {
//!     title: "Example".into(),
//!     xml_url: "https://example.com/rss".into(),
//!     ..Feed::default()
//! }];
//! let ids = mapper.store(Some(&mut feeds)).await?;
//! assert_eq!(ids.map(|ids| ids.len()), Some(1));
//!
//! // Load every visible feed in that category, with entries.
//! let visible = FeedMapper::new(&db, Some(7), None, Some(false), Some(true));
//! let loaded = visible.load().await?;
//! # let _ = loaded;
//! # Ok(())
//! # }
//! ```

pub mod storage;
