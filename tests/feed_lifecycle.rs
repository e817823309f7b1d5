//! Integration tests for the hierarchy lifecycle: store, load, re-store,
//! delete across categories, feeds, and entries.
//!
//! Each test creates its own in-memory SQLite database for isolation.
//! These tests exercise the mappers end-to-end, verifying that cascades
//! compose correctly across all three levels of the hierarchy.

use feedstore::storage::{
    Category, CategoryMapper, Database, Entry, EntryMapper, Feed, FeedMapper, Persistable,
};
use pretty_assertions::assert_eq;

async fn test_db() -> Database {
    Database::open_in_memory().await.unwrap()
}

fn feed(title: &str) -> Feed {
    Feed {
        title: title.to_string(),
        description: Some(format!("All about {}", title)),
        xml_url: format!("https://{}.example.com/feed.xml", title),
        html_url: Some(format!("https://{}.example.com", title)),
        feed_type: Some("rss".to_string()),
        ..Feed::default()
    }
}

fn entry(title: &str) -> Entry {
    Entry {
        title: title.to_string(),
        url: Some(format!("https://example.com/{}", title)),
        date: Some(1700000000),
        src_name: Some("example".to_string()),
        ..Entry::default()
    }
}

// ============================================================================
// Store → Load Round Trips
// ============================================================================

#[tokio::test]
async fn test_store_then_load_round_trips_entry_order() {
    let db = test_db().await;

    let mut feeds = vec![Feed {
        entries: Some(vec![entry("first"), entry("second"), entry("third")]),
        ..feed("ordered")
    }];
    let ids = FeedMapper::new(&db, Some(1), None, None, None)
        .store(Some(&mut feeds))
        .await
        .unwrap()
        .unwrap();

    let loaded = FeedMapper::new(&db, None, Some(ids[0]), Some(false), None)
        .load()
        .await
        .unwrap();
    assert_eq!(loaded.len(), 1);

    let entries = loaded[0].entries.as_ref().unwrap();
    assert_eq!(entries.len(), 3, "same number of entries as were stored");
    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(titles, ["first", "second", "third"], "insertion order");
}

#[tokio::test]
async fn test_restored_subtree_keeps_identities() {
    let db = test_db().await;
    let mapper = FeedMapper::new(&db, Some(1), None, None, None);

    let mut feeds = vec![Feed {
        entries: Some(vec![entry("e1"), entry("e2")]),
        ..feed("stable")
    }];
    let first = mapper.store(Some(&mut feeds)).await.unwrap().unwrap();
    let entry_ids: Vec<_> = feeds[0]
        .entries
        .as_ref()
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();

    // Re-storing the exact objects replaces rows by identity
    let second = mapper.store(Some(&mut feeds)).await.unwrap().unwrap();
    assert_eq!(first, second);
    let entry_ids_after: Vec<_> = feeds[0]
        .entries
        .as_ref()
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(entry_ids, entry_ids_after);

    let loaded = FeedMapper::new(&db, Some(1), None, Some(false), None)
        .load()
        .await
        .unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].entries.as_ref().unwrap().len(), 2);
}

// ============================================================================
// Scoped Visible Load: category fixed, entries included, visible only
// ============================================================================

#[tokio::test]
async fn test_visible_feeds_in_category_with_entries() {
    let db = test_db().await;

    let mut feeds = vec![
        Feed {
            entries: Some(vec![entry("a1"), entry("a2")]),
            ..feed("alpha")
        },
        Feed {
            visible: false,
            entries: Some(vec![entry("b1")]),
            ..feed("beta")
        },
    ];
    FeedMapper::new(&db, Some(7), None, None, None)
        .store(Some(&mut feeds))
        .await
        .unwrap();

    // A feed in another category must not leak into the scope
    let mut other = vec![feed("gamma")];
    FeedMapper::new(&db, Some(8), None, None, None)
        .store(Some(&mut other))
        .await
        .unwrap();

    let loaded = FeedMapper::new(&db, Some(7), None, Some(false), Some(true))
        .load()
        .await
        .unwrap();
    assert_eq!(loaded.len(), 1, "hidden and out-of-category feeds filtered");
    assert_eq!(loaded[0].title, "alpha");
    assert_eq!(loaded[0].entries.as_ref().unwrap().len(), 2);
}

// ============================================================================
// Delete Cascades
// ============================================================================

#[tokio::test]
async fn test_delete_feed_cascades_to_its_entries() {
    let db = test_db().await;

    let mut feeds = vec![
        Feed {
            entries: Some(vec![entry("doomed-1"), entry("doomed-2")]),
            ..feed("doomed")
        },
        Feed {
            entries: Some(vec![entry("kept-1")]),
            ..feed("kept")
        },
    ];
    let ids = FeedMapper::new(&db, Some(7), None, None, None)
        .store(Some(&mut feeds))
        .await
        .unwrap()
        .unwrap();

    let removed = FeedMapper::new(&db, Some(7), Some(ids[0]), None, None)
        .delete()
        .await
        .unwrap();
    assert_eq!(removed, 1);

    let remaining = FeedMapper::new(&db, Some(7), None, Some(false), None)
        .load()
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "kept");
    assert_eq!(remaining[0].entries.as_ref().unwrap().len(), 1);

    let orphans = EntryMapper::new(&db, None, Some(ids[0]), None)
        .load()
        .await
        .unwrap();
    assert!(orphans.is_empty(), "entries of the deleted feed are gone");
}

#[tokio::test]
async fn test_delete_whole_category_scope() {
    let db = test_db().await;

    let mut feeds = vec![
        Feed {
            entries: Some(vec![entry("e1")]),
            ..feed("one")
        },
        Feed {
            entries: Some(vec![entry("e2")]),
            ..feed("two")
        },
    ];
    FeedMapper::new(&db, Some(7), None, None, None)
        .store(Some(&mut feeds))
        .await
        .unwrap();

    // No feed id: the whole category scope goes
    let removed = FeedMapper::new(&db, Some(7), None, None, None)
        .delete()
        .await
        .unwrap();
    assert_eq!(removed, 2);

    let entries = EntryMapper::new(&db, Some(7), None, None)
        .load()
        .await
        .unwrap();
    assert!(entries.is_empty());
}

// ============================================================================
// Full Three-Level Lifecycle
// ============================================================================

#[tokio::test]
async fn test_full_lifecycle_across_three_levels() {
    let db = test_db().await;

    // Step 1: store two categories, each with a feed subtree
    let mut categories = vec![
        Category {
            name: "Tech".to_string(),
            feeds: Some(vec![Feed {
                entries: Some(vec![entry("rust-1"), entry("rust-2")]),
                ..feed("rust-blog")
            }]),
            ..Category::default()
        },
        Category {
            name: "News".to_string(),
            feeds: Some(vec![Feed {
                entries: Some(vec![entry("hn-1")]),
                ..feed("hacker-news")
            }]),
            ..Category::default()
        },
    ];
    let ids = CategoryMapper::new(&db, None, None, None)
        .store(Some(&mut categories))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ids.len(), 2);

    // Step 2: load the full tree back
    let tree = CategoryMapper::new(&db, None, Some(false), None)
        .load()
        .await
        .unwrap();
    assert_eq!(tree.len(), 2);
    let tech = tree.iter().find(|c| c.name == "Tech").unwrap();
    assert_eq!(
        tech.feeds.as_ref().unwrap()[0]
            .entries
            .as_ref()
            .unwrap()
            .len(),
        2
    );

    // Step 3: update one feed's title and re-store it under its category
    let mut tech_feeds = tech.feeds.clone().unwrap();
    tech_feeds[0].title = "Official Rust Blog".to_string();
    FeedMapper::new(&db, Some(ids[0]), None, None, None)
        .store(Some(&mut tech_feeds))
        .await
        .unwrap();

    let reloaded = FeedMapper::new(&db, Some(ids[0]), None, None, None)
        .load()
        .await
        .unwrap();
    assert_eq!(reloaded.len(), 1, "replace by identity");
    assert_eq!(reloaded[0].title, "Official Rust Blog");

    // Step 4: delete the Tech category; News must be untouched
    let removed = CategoryMapper::new(&db, Some(ids[0]), None, None)
        .delete()
        .await
        .unwrap();
    assert_eq!(removed, 1);

    assert!(FeedMapper::new(&db, Some(ids[0]), None, None, None)
        .load()
        .await
        .unwrap()
        .is_empty());
    assert!(EntryMapper::new(&db, Some(ids[0]), None, None)
        .load()
        .await
        .unwrap()
        .is_empty());

    let remaining = CategoryMapper::new(&db, None, Some(false), None)
        .load()
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "News");
    assert_eq!(remaining[0].feeds.as_ref().unwrap().len(), 1);
}

// ============================================================================
// Cursor Discipline Under Cascades
// ============================================================================

#[tokio::test]
async fn test_manual_cursor_drive_with_nested_cascade() {
    let db = test_db().await;

    let mut feeds: Vec<Feed> = (0..10)
        .map(|i| Feed {
            entries: Some(vec![entry(&format!("e{}", i))]),
            ..feed(&format!("feed-{}", i))
        })
        .collect();
    FeedMapper::new(&db, Some(7), None, None, None)
        .store(Some(&mut feeds))
        .await
        .unwrap();

    // Drive the cursor by hand, materializing (and cascading) each row
    // while the parent cursor is still open.
    let mapper = FeedMapper::new(&db, Some(7), None, Some(false), None);
    let mut cursor = mapper.query();
    let mut count = 0;
    while let Some(row) = cursor.try_next().await.unwrap() {
        let f = mapper.materialize(&row).await.unwrap();
        assert_eq!(f.entries.as_ref().unwrap().len(), 1);
        count += 1;
    }
    assert_eq!(count, 10);

    // Abandon a cursor halfway; the pool must survive repeated drops
    for _ in 0..10 {
        let mut cursor = mapper.query();
        let row = cursor.try_next().await.unwrap().unwrap();
        mapper.materialize(&row).await.unwrap();
        drop(cursor);
    }

    let still_there = mapper.load().await.unwrap();
    assert_eq!(still_there.len(), 10);
}
