use std::sync::Arc;
use std::time::Duration;

use chrono::Local;

use crate::cache::SheetCache;
use crate::error::{AppError, Result};
use crate::models::{
    cell, ArchiveOutcome, ArchivedPage, ArchivedThought, CreatedThought, Pagination, SearchHit,
    SearchKind, SearchPagination, SearchResults, SearchScope, Thought, ThoughtsPage,
    UnarchiveOutcome, UpdatedThought,
};
use crate::retry::{with_retry, RetryPolicy};
use crate::rows::locate_row;
use crate::sheets::SheetStore;
use crate::validation::ContentValidator;

/// Resolved worksheet: the title for A1 ranges, the id for structural updates.
#[derive(Debug, Clone)]
pub struct SheetRef {
    pub title: String,
    pub sheet_id: i64,
}

/// Tunables for the journal repository.
#[derive(Debug, Clone)]
pub struct JournalOptions {
    pub per_page: usize,
    pub max_page_size: usize,
    pub max_content_length: usize,
    pub cache_ttl: Duration,
    pub retry: RetryPolicy,
}

impl Default for JournalOptions {
    fn default() -> Self {
        Self {
            per_page: 10,
            max_page_size: 50,
            max_content_length: 10_000,
            cache_ttl: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

/// Sheet-backed repository for the journal and its archive.
///
/// Single-writer by assumption: row addressing is recomputed from a fresh
/// read at mutation time, so two concurrent mutations of the same sheet can
/// race on the row count and hit the wrong row. That limitation is inherited
/// from the store's positional addressing and is deliberately not papered
/// over with locks the backend does not provide.
pub struct ThoughtJournal<S> {
    store: Arc<S>,
    main: SheetRef,
    archive: SheetRef,
    options: JournalOptions,
    validator: ContentValidator,
    main_cache: SheetCache<Vec<Thought>>,
    archive_cache: SheetCache<Vec<ArchivedThought>>,
}

impl<S: SheetStore> ThoughtJournal<S> {
    pub fn new(store: Arc<S>, main: SheetRef, archive: SheetRef, options: JournalOptions) -> Self {
        Self {
            validator: ContentValidator::new(options.max_content_length),
            main_cache: SheetCache::new(options.cache_ttl),
            archive_cache: SheetCache::new(options.cache_ttl),
            store,
            main,
            archive,
            options,
        }
    }

    fn main_range(&self) -> String {
        format!("{}!A:C", self.main.title)
    }

    fn archive_range(&self) -> String {
        format!("{}!A:D", self.archive.title)
    }

    fn clamp_page(&self, page: Option<usize>, limit: Option<usize>) -> (usize, usize) {
        let page = page.unwrap_or(1).max(1);
        let limit = limit
            .unwrap_or(self.options.per_page)
            .clamp(1, self.options.max_page_size);
        (page, limit)
    }

    /// Newest-first page of journal entries, served from the cache when a
    /// snapshot younger than the TTL exists and `force_refresh` is unset.
    pub async fn list(
        &self,
        page: Option<usize>,
        limit: Option<usize>,
        force_refresh: bool,
    ) -> Result<ThoughtsPage> {
        let (page, limit) = self.clamp_page(page, limit);
        let range = self.main_range();

        let (all, cached) = self
            .main_cache
            .get_or_fetch(force_refresh, || {
                let range = range.as_str();
                async move {
                    let rows =
                        with_retry(&self.options.retry, || self.store.get_values(range)).await?;
                    Ok(thoughts_from_rows(&rows))
                }
            })
            .await?;

        let (thoughts, pagination) = paginate(all, page, limit);
        Ok(ThoughtsPage {
            thoughts,
            pagination,
            cached,
        })
    }

    /// Appends a new entry. The append is not retried: it is not idempotent,
    /// and a blind retry could write the row twice.
    pub async fn add(&self, content: &str) -> Result<CreatedThought> {
        let content = self.validator.validate_content(content)?;
        let timestamp = now_timestamp();
        let date = now_date();

        self.store
            .append_row(
                &self.main_range(),
                vec![content.clone(), timestamp.clone(), date.clone()],
            )
            .await?;
        self.main_cache.invalidate().await;

        tracing::info!("added thought ({} chars)", content.chars().count());
        Ok(CreatedThought {
            message: "Thought added successfully".to_string(),
            content,
            timestamp,
            date,
        })
    }

    /// Rewrites the content of one entry, preserving its original
    /// timestamp and date. Reads the sheet fresh (never the cache) so the
    /// index translation reflects the state about to be mutated.
    pub async fn update(&self, frontend_index: i64, content: &str) -> Result<UpdatedThought> {
        let content = self.validator.validate_content(content)?;
        let range = self.main_range();

        let (timestamp, date) = with_retry(&self.options.retry, || {
            let content = content.clone();
            let range = range.as_str();
            async move {
                let rows = self.store.get_values(range).await?;
                let total = rows.len().saturating_sub(1);
                let loc = locate_row(frontend_index, total)
                    .ok_or_else(|| AppError::NotFound("Thought".to_string()))?;

                let row = &rows[loc.array_index];
                let timestamp = non_empty(cell(row, 1)).unwrap_or_else(now_timestamp);
                let date = non_empty(cell(row, 2)).unwrap_or_else(now_date);

                tracing::info!(
                    "updating thought: frontend index {} -> sheet row {}",
                    frontend_index,
                    loc.sheet_row_index
                );
                self.store
                    .update_values(
                        &format!(
                            "{}!A{}:C{}",
                            self.main.title, loc.sheet_row_index, loc.sheet_row_index
                        ),
                        vec![vec![content, timestamp.clone(), date.clone()]],
                    )
                    .await?;
                Ok((timestamp, date))
            }
        })
        .await?;
        self.main_cache.invalidate().await;

        Ok(UpdatedThought {
            message: "Thought updated successfully".to_string(),
            content,
            timestamp,
            date,
        })
    }

    /// Structurally deletes one entry.
    pub async fn delete(&self, frontend_index: i64) -> Result<()> {
        let range = self.main_range();

        with_retry(&self.options.retry, || {
            let range = range.as_str();
            async move {
                let rows = self.store.get_values(range).await?;
                let total = rows.len().saturating_sub(1);
                let loc = locate_row(frontend_index, total)
                    .ok_or_else(|| AppError::NotFound("Thought".to_string()))?;

                tracing::info!(
                    "deleting thought: frontend index {} -> sheet row {}",
                    frontend_index,
                    loc.sheet_row_index
                );
                self.store
                    .delete_row(self.main.sheet_id, loc.delete_index() as i64)
                    .await
            }
        })
        .await?;
        self.main_cache.invalidate().await;
        Ok(())
    }

    /// Moves one entry to the archive sheet, stamping `archivedAt`.
    ///
    /// Copy-then-delete with no atomicity: a failure between the append and
    /// the delete leaves the entry in both sheets.
    pub async fn archive(&self, frontend_index: i64) -> Result<ArchiveOutcome> {
        let main_range = self.main_range();
        let archive_range = self.archive_range();

        let outcome = with_retry(&self.options.retry, || {
            let main_range = main_range.as_str();
            let archive_range = archive_range.as_str();
            async move {
                let rows = self.store.get_values(main_range).await?;
                let total = rows.len().saturating_sub(1);
                let loc = locate_row(frontend_index, total)
                    .ok_or_else(|| AppError::NotFound("Thought".to_string()))?;

                let row = rows[loc.array_index].clone();
                let archived_at = now_timestamp();

                tracing::info!(
                    "archiving thought: frontend index {} -> sheet row {}",
                    frontend_index,
                    loc.sheet_row_index
                );
                self.store
                    .append_row(
                        archive_range,
                        vec![cell(&row, 0), cell(&row, 1), cell(&row, 2), archived_at.clone()],
                    )
                    .await?;
                self.store
                    .delete_row(self.main.sheet_id, loc.delete_index() as i64)
                    .await?;

                Ok(ArchiveOutcome {
                    message: "Thought archived successfully".to_string(),
                    content: cell(&row, 0),
                    timestamp: cell(&row, 1),
                    date: cell(&row, 2),
                    archived_at,
                })
            }
        })
        .await?;

        self.main_cache.invalidate().await;
        self.archive_cache.invalidate().await;
        Ok(outcome)
    }

    /// Moves an archived entry back to the journal, dropping `archivedAt`.
    /// Same copy-then-delete exposure as `archive`.
    pub async fn unarchive(&self, frontend_index: i64) -> Result<UnarchiveOutcome> {
        let main_range = self.main_range();
        let archive_range = self.archive_range();

        let outcome = with_retry(&self.options.retry, || {
            let main_range = main_range.as_str();
            let archive_range = archive_range.as_str();
            async move {
                let rows = self.store.get_values(archive_range).await?;
                let total = rows.len().saturating_sub(1);
                let loc = locate_row(frontend_index, total)
                    .ok_or_else(|| AppError::NotFound("Archived thought".to_string()))?;

                let row = rows[loc.array_index].clone();

                tracing::info!(
                    "unarchiving thought: frontend index {} -> archive row {}",
                    frontend_index,
                    loc.sheet_row_index
                );
                self.store
                    .append_row(main_range, vec![cell(&row, 0), cell(&row, 1), cell(&row, 2)])
                    .await?;
                self.store
                    .delete_row(self.archive.sheet_id, loc.delete_index() as i64)
                    .await?;

                Ok(UnarchiveOutcome {
                    message: "Thought unarchived successfully".to_string(),
                    content: cell(&row, 0),
                    timestamp: cell(&row, 1),
                    date: cell(&row, 2),
                })
            }
        })
        .await?;

        self.main_cache.invalidate().await;
        self.archive_cache.invalidate().await;
        Ok(outcome)
    }

    /// Newest-first page of archived entries.
    pub async fn list_archived(
        &self,
        page: Option<usize>,
        limit: Option<usize>,
        force_refresh: bool,
    ) -> Result<ArchivedPage> {
        let (page, limit) = self.clamp_page(page, limit);
        let range = self.archive_range();

        let (all, cached) = self
            .archive_cache
            .get_or_fetch(force_refresh, || {
                let range = range.as_str();
                async move {
                    let rows =
                        with_retry(&self.options.retry, || self.store.get_values(range)).await?;
                    Ok(archived_from_rows(&rows))
                }
            })
            .await?;

        let (thoughts, pagination) = paginate(all, page, limit);
        Ok(ArchivedPage {
            thoughts,
            pagination,
            cached,
        })
    }

    /// Case-insensitive substring search across the journal and/or archive,
    /// newest first. Reads are uncached; a sheet that fails to read is
    /// skipped with a warning rather than failing the whole search.
    pub async fn search(&self, query: &str, scope: SearchScope) -> Result<SearchResults> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(SearchResults {
                thoughts: Vec::new(),
                pagination: SearchPagination {
                    total_count: 0,
                    has_more: false,
                },
                query: query.to_string(),
            });
        }

        let mut hits: Vec<SearchHit> = Vec::new();

        if matches!(scope, SearchScope::Main | SearchScope::All) {
            match self.store.get_values(&self.main_range()).await {
                Ok(rows) => {
                    for thought in thoughts_from_rows(&rows) {
                        if thought.content.to_lowercase().contains(&needle) {
                            hits.push(SearchHit {
                                id: thought.id,
                                content: thought.content,
                                timestamp: thought.timestamp,
                                date: thought.date,
                                archived_at: None,
                                kind: SearchKind::Main,
                            });
                        }
                    }
                }
                Err(err) => tracing::warn!("search skipped journal sheet: {}", err),
            }
        }

        if matches!(scope, SearchScope::Archive | SearchScope::All) {
            match self.store.get_values(&self.archive_range()).await {
                Ok(rows) => {
                    for thought in archived_from_rows(&rows) {
                        if thought.content.to_lowercase().contains(&needle) {
                            hits.push(SearchHit {
                                id: thought.id,
                                content: thought.content,
                                timestamp: thought.timestamp,
                                date: thought.date,
                                archived_at: Some(thought.archived_at),
                                kind: SearchKind::Archive,
                            });
                        }
                    }
                }
                Err(err) => tracing::warn!("search skipped archive sheet: {}", err),
            }
        }

        hits.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        Ok(SearchResults {
            pagination: SearchPagination {
                total_count: hits.len(),
                has_more: false,
            },
            thoughts: hits,
            query: query.to_string(),
        })
    }
}

/// Maps raw sheet rows (header included) to the reversed client view,
/// assigning frontend-index ids: 0 is the newest entry.
fn thoughts_from_rows(rows: &[Vec<String>]) -> Vec<Thought> {
    data_rows(rows)
        .iter()
        .rev()
        .enumerate()
        .map(|(id, row)| Thought {
            id,
            content: cell(row, 0),
            timestamp: cell(row, 1),
            date: cell(row, 2),
        })
        .collect()
}

fn archived_from_rows(rows: &[Vec<String>]) -> Vec<ArchivedThought> {
    data_rows(rows)
        .iter()
        .rev()
        .enumerate()
        .map(|(id, row)| ArchivedThought {
            id,
            content: cell(row, 0),
            timestamp: cell(row, 1),
            date: cell(row, 2),
            archived_at: cell(row, 3),
        })
        .collect()
}

fn data_rows(rows: &[Vec<String>]) -> &[Vec<String>] {
    if rows.is_empty() {
        rows
    } else {
        &rows[1..]
    }
}

fn paginate<T>(all: Vec<T>, page: usize, limit: usize) -> (Vec<T>, Pagination) {
    let total_count = all.len();
    let offset = (page - 1) * limit;
    let has_more = offset + limit < total_count;
    let total_pages = total_count.div_ceil(limit);

    let items = all
        .into_iter()
        .skip(offset)
        .take(limit)
        .collect::<Vec<_>>();

    (
        items,
        Pagination {
            page,
            limit,
            total_count,
            total_pages,
            has_more,
        },
    )
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

pub fn now_timestamp() -> String {
    Local::now().format("%Y/%m/%d %H:%M:%S").to_string()
}

pub fn now_date() -> String {
    Local::now().format("%Y/%m/%d").to_string()
}
