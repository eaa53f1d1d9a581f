use serde::{Deserialize, Serialize};

/// One journal entry as presented to clients.
///
/// `id` is the frontend index: the zero-based position of the entry in the
/// reversed (newest-first) view at the time the snapshot was read. It is
/// positional, not stable — any append or delete shifts it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Thought {
    pub id: usize,
    pub content: String,
    pub timestamp: String,
    pub date: String,
}

/// Journal entry moved to the archive sheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ArchivedThought {
    pub id: usize,
    pub content: String,
    pub timestamp: String,
    pub date: String,
    pub archived_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total_count: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

#[derive(Debug, Serialize)]
pub struct ThoughtsPage {
    pub thoughts: Vec<Thought>,
    pub pagination: Pagination,
    pub cached: bool,
}

#[derive(Debug, Serialize)]
pub struct ArchivedPage {
    pub thoughts: Vec<ArchivedThought>,
    pub pagination: Pagination,
    pub cached: bool,
}

#[derive(Debug, Deserialize)]
pub struct NewThought {
    pub content: String,
}

/// Echo of a successful add; no re-read happens.
#[derive(Debug, Serialize)]
pub struct CreatedThought {
    pub message: String,
    pub content: String,
    pub timestamp: String,
    pub date: String,
}

#[derive(Debug, Serialize)]
pub struct UpdatedThought {
    pub message: String,
    pub content: String,
    pub timestamp: String,
    pub date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveOutcome {
    pub message: String,
    pub content: String,
    pub timestamp: String,
    pub date: String,
    pub archived_at: String,
}

#[derive(Debug, Serialize)]
pub struct UnarchiveOutcome {
    pub message: String,
    pub content: String,
    pub timestamp: String,
    pub date: String,
}

/// Which sheets a search covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchScope {
    Main,
    Archive,
    All,
}

impl Default for SearchScope {
    fn default() -> Self {
        SearchScope::All
    }
}

/// One search hit. `id` follows the same frontend-index scheme as `list`,
/// computed against the snapshot read during the search; it is only valid
/// against a fresh list of the sheet named by `kind`.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub id: usize,
    pub content: String,
    pub timestamp: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
    #[serde(rename = "type")]
    pub kind: SearchKind,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Main,
    Archive,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    pub thoughts: Vec<SearchHit>,
    pub pagination: SearchPagination,
    pub query: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPagination {
    pub total_count: usize,
    pub has_more: bool,
}

// ---- family board records ----

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Child {
    pub id: String,
    pub name: String,
    pub age: String,
    pub birthday: String,
    pub avatar: String,
    pub created_at: String,
    pub updated_at: String,
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct NewChild {
    pub name: Option<String>,
    pub age: Option<String>,
    pub birthday: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChildPatch {
    pub name: Option<String>,
    pub age: Option<String>,
    pub birthday: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    pub id: String,
    pub child_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub reminder_type: String,
    pub reminder_time: String,
    pub repeat_rule: String,
    pub advance_minutes: i64,
    pub enabled: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReminder {
    pub child_id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub reminder_type: Option<String>,
    pub reminder_time: Option<String>,
    pub repeat_rule: Option<String>,
    pub advance_minutes: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub reminder_type: Option<String>,
    pub reminder_time: Option<String>,
    pub repeat_rule: Option<String>,
    pub advance_minutes: Option<i64>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CareRecord {
    pub id: String,
    pub reminder_id: String,
    pub child_id: String,
    pub scheduled_time: String,
    pub completed_time: String,
    pub status: String,
    pub note: String,
    pub operator: String,
    pub created_at: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRecord {
    pub reminder_id: Option<String>,
    pub child_id: Option<String>,
    pub scheduled_time: Option<String>,
    pub status: Option<String>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub order: i64,
    pub description: String,
    pub created_at: String,
}

#[derive(Debug, Default, Clone, Serialize, PartialEq)]
pub struct CategoryStat {
    pub total: usize,
    pub completed: usize,
    pub skipped: usize,
    pub pending: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub skipped_tasks: usize,
    pub pending_tasks: usize,
    pub completion_rate: f64,
    pub category_stats: std::collections::HashMap<String, CategoryStat>,
}

// ---- auth payloads ----

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthOutcome {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub authenticated: bool,
    pub has_password: bool,
}

/// Pulls one cell out of a sheet row, empty when the row is ragged.
pub fn cell(row: &[String], index: usize) -> String {
    row.get(index).cloned().unwrap_or_default()
}
