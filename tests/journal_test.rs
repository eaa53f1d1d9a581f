mod common;

use std::sync::Arc;

use common::FakeSheetStore;
use nestnote::error::AppError;
use nestnote::journal::{JournalOptions, SheetRef, ThoughtJournal};
use nestnote::models::{SearchKind, SearchScope};

fn seeded_store() -> Arc<FakeSheetStore> {
    Arc::new(
        FakeSheetStore::new()
            .with_sheet(
                "Thoughts",
                0,
                vec![
                    vec!["Content", "Timestamp", "Date"],
                    vec!["a", "2024/01/01 08:00:00", "2024/01/01"],
                    vec!["b", "2024/01/02 08:00:00", "2024/01/02"],
                ],
            )
            .with_sheet(
                "ArchivedThoughts",
                7,
                vec![vec!["Content", "Timestamp", "Date", "ArchivedAt"]],
            ),
    )
}

fn journal(store: Arc<FakeSheetStore>) -> ThoughtJournal<FakeSheetStore> {
    ThoughtJournal::new(
        store,
        SheetRef {
            title: "Thoughts".to_string(),
            sheet_id: 0,
        },
        SheetRef {
            title: "ArchivedThoughts".to_string(),
            sheet_id: 7,
        },
        JournalOptions::default(),
    )
}

#[tokio::test]
async fn test_list_is_newest_first_with_positional_ids() {
    let journal = journal(seeded_store());
    let page = journal.list(None, None, false).await.unwrap();

    assert_eq!(page.thoughts.len(), 2);
    assert_eq!(
        (page.thoughts[0].id, page.thoughts[0].content.as_str()),
        (0, "b")
    );
    assert_eq!(
        (page.thoughts[1].id, page.thoughts[1].content.as_str()),
        (1, "a")
    );
    assert_eq!(page.pagination.total_count, 2);
    assert_eq!(page.pagination.total_pages, 1);
    assert!(!page.pagination.has_more);
    assert!(!page.cached);
}

#[tokio::test]
async fn test_delete_newest_shifts_remaining_ids() {
    let store = seeded_store();
    let journal = journal(store.clone());

    journal.delete(0).await.unwrap();

    // "b" was the bottom sheet row; only the header and "a" remain
    let rows = store.rows("Thoughts");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][0], "a");

    let page = journal.list(None, None, false).await.unwrap();
    assert_eq!(page.thoughts.len(), 1);
    assert_eq!(
        (page.thoughts[0].id, page.thoughts[0].content.as_str()),
        (0, "a")
    );
}

#[tokio::test]
async fn test_add_appends_and_becomes_id_zero() {
    let store = seeded_store();
    let journal = journal(store.clone());

    let created = journal.add("c").await.unwrap();
    assert_eq!(created.message, "Thought added successfully");
    assert_eq!(created.content, "c");
    assert!(!created.timestamp.is_empty());

    assert_eq!(store.rows("Thoughts").len(), 4);

    let page = journal.list(None, None, false).await.unwrap();
    assert_eq!(
        (page.thoughts[0].id, page.thoughts[0].content.as_str()),
        (0, "c")
    );
}

#[tokio::test]
async fn test_update_rewrites_in_place_keeping_timestamps() {
    let store = seeded_store();
    let journal = journal(store.clone());

    // frontend index 1 is the oldest entry, sheet row 2
    let updated = journal.update(1, "a edited").await.unwrap();
    assert_eq!(updated.timestamp, "2024/01/01 08:00:00");
    assert_eq!(updated.date, "2024/01/01");

    let rows = store.rows("Thoughts");
    assert_eq!(
        rows[1],
        vec![
            "a edited".to_string(),
            "2024/01/01 08:00:00".to_string(),
            "2024/01/01".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_indexes_past_end_are_not_found() {
    let journal = journal(seeded_store());

    assert!(matches!(
        journal.update(2, "x").await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        journal.delete(2).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        journal.delete(-1).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_archive_then_unarchive_round_trip() {
    let store = seeded_store();
    let journal = journal(store.clone());

    let archived = journal.archive(0).await.unwrap();
    assert_eq!(archived.content, "b");
    assert_eq!(archived.timestamp, "2024/01/02 08:00:00");
    assert!(!archived.archived_at.is_empty());

    let main = journal.list(None, None, false).await.unwrap();
    assert_eq!(main.thoughts.len(), 1);
    assert_eq!(main.thoughts[0].content, "a");

    let archive = journal.list_archived(None, None, false).await.unwrap();
    assert_eq!(archive.thoughts.len(), 1);
    assert_eq!(
        (archive.thoughts[0].id, archive.thoughts[0].content.as_str()),
        (0, "b")
    );
    assert_eq!(archive.thoughts[0].archived_at, archived.archived_at);

    let restored = journal.unarchive(0).await.unwrap();
    assert_eq!(restored.content, "b");
    assert_eq!(restored.timestamp, "2024/01/02 08:00:00");

    // the archive is empty again and "b" is back as the newest entry
    assert_eq!(store.rows("ArchivedThoughts").len(), 1);
    let main = journal.list(None, None, false).await.unwrap();
    assert_eq!(
        (main.thoughts[0].id, main.thoughts[0].content.as_str()),
        (0, "b")
    );
}

#[tokio::test]
async fn test_page_beyond_end_is_empty() {
    let journal = journal(seeded_store());
    let page = journal.list(Some(5), Some(10), false).await.unwrap();

    assert!(page.thoughts.is_empty());
    assert_eq!(page.pagination.total_count, 2);
    assert!(!page.pagination.has_more);
}

#[tokio::test]
async fn test_limit_is_clamped_to_max_page_size() {
    let journal = journal(seeded_store());
    let page = journal.list(Some(1), Some(500), false).await.unwrap();
    assert_eq!(page.pagination.limit, 50);

    let page = journal.list(Some(1), Some(0), false).await.unwrap();
    assert_eq!(page.pagination.limit, 1);
}

#[tokio::test]
async fn test_cached_flag_and_forced_refresh() {
    let journal = journal(seeded_store());

    assert!(!journal.list(None, None, false).await.unwrap().cached);
    assert!(journal.list(None, None, false).await.unwrap().cached);
    assert!(!journal.list(None, None, true).await.unwrap().cached);
}

#[tokio::test]
async fn test_search_spans_both_sheets_newest_first() {
    let store = Arc::new(
        FakeSheetStore::new()
            .with_sheet(
                "Thoughts",
                0,
                vec![
                    vec!["Content", "Timestamp", "Date"],
                    vec!["Apple crumble", "2024/01/01 08:00:00", "2024/01/01"],
                    vec!["banana bread", "2024/01/02 08:00:00", "2024/01/02"],
                ],
            )
            .with_sheet(
                "ArchivedThoughts",
                7,
                vec![
                    vec!["Content", "Timestamp", "Date", "ArchivedAt"],
                    vec![
                        "apple pie",
                        "2024/01/03 09:00:00",
                        "2024/01/03",
                        "2024/01/04 10:00:00",
                    ],
                ],
            ),
    );
    let journal = journal(store);

    let results = journal.search("APPLE", SearchScope::All).await.unwrap();
    assert_eq!(results.pagination.total_count, 2);
    assert_eq!(results.thoughts[0].content, "apple pie");
    assert_eq!(results.thoughts[0].kind, SearchKind::Archive);
    assert!(results.thoughts[0].archived_at.is_some());
    assert_eq!(results.thoughts[1].content, "Apple crumble");
    assert_eq!(results.thoughts[1].kind, SearchKind::Main);

    let main_only = journal.search("apple", SearchScope::Main).await.unwrap();
    assert_eq!(main_only.pagination.total_count, 1);

    let blank = journal.search("   ", SearchScope::All).await.unwrap();
    assert!(blank.thoughts.is_empty());
}
