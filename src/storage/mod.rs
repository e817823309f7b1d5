mod categories;
mod cursor;
mod db;
mod entries;
mod feeds;
mod mapper;
mod predicate;
mod store;
mod types;

pub use categories::CategoryMapper;
pub use cursor::RowCursor;
pub use db::{Database, TABLE_CATEGORIES, TABLE_ENTRIES, TABLE_FEEDS};
pub use entries::EntryMapper;
pub use feeds::FeedMapper;
pub use mapper::Persistable;
pub use predicate::{Predicate, Value};
pub use types::{Category, DatabaseError, Entry, Feed};
