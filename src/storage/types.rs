use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Storage-layer errors.
///
/// Underlying store errors (connectivity, constraint violations) pass
/// through unchanged via the `Other` variant; this layer adds no retry
/// or suppression logic.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Schema migration failed
    #[error("database migration failed: {0}")]
    Migration(String),

    /// Generic database error
    #[error("database error: {0}")]
    Other(#[from] sqlx::Error),
}

// ============================================================================
// Data Structures
// ============================================================================

/// A feed category, the top level of the hierarchy.
///
/// `feeds` is `Some` only when a load affirmatively cascaded into
/// child feeds and at least one row came back; absent is distinct from
/// empty.
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: Option<i64>,
    pub name: String,
    pub color: Option<i64>,
    pub visible: bool,
    /// Epoch seconds of the last refresh, owned by the caller.
    pub last_update: Option<i64>,
    pub feeds: Option<Vec<Feed>>,
}

impl Default for Category {
    fn default() -> Self {
        Self {
            id: None,
            name: String::new(),
            color: None,
            visible: true,
            last_update: None,
            feeds: None,
        }
    }
}

/// A syndication feed row.
///
/// Identity is store-assigned on first insert and stable afterwards;
/// `category_id` stays `None` until resolved (either carried by the
/// object or imputed from the storing mapper's scope). `entries`
/// follows the same absent-vs-empty rule as [`Category::feeds`].
#[derive(Debug, Clone, PartialEq)]
pub struct Feed {
    pub id: Option<i64>,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub xml_url: String,
    pub visible: bool,
    pub html_url: Option<String>,
    /// Free-form discriminator ("rss", "atom", ...).
    pub feed_type: Option<String>,
    pub entries: Option<Vec<Entry>>,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            id: None,
            category_id: None,
            title: String::new(),
            description: None,
            xml_url: String::new(),
            visible: true,
            html_url: None,
            feed_type: None,
            entries: None,
        }
    }
}

/// A single entry (article) owned by exactly one feed.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    pub id: Option<i64>,
    pub category_id: Option<i64>,
    pub feed_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub url: Option<String>,
    /// Publication time as epoch seconds.
    pub date: Option<i64>,
    /// Name of the source the entry was fetched from.
    pub src_name: Option<String>,
    pub visible: bool,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            id: None,
            category_id: None,
            feed_id: None,
            title: String::new(),
            description: None,
            url: None,
            date: None,
            src_name: None,
            visible: true,
        }
    }
}
