use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::header::SET_COOKIE;
use axum::http::{HeaderMap, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::auth::{
    clear_session_cookie, require_auth, session_cookie, session_token, SessionStore,
};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::family::FamilyBoard;
use crate::journal::ThoughtJournal;
use crate::models::{
    AuthOutcome, AuthStatus, ChildPatch, LoginRequest, NewChild, NewRecord, NewReminder,
    NewThought, ReminderPatch, SearchScope,
};
use crate::sheets::GoogleSheetsClient;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub journal: Arc<ThoughtJournal<GoogleSheetsClient>>,
    pub family: Arc<FamilyBoard<GoogleSheetsClient>>,
    pub sessions: Arc<SessionStore>,
}

pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/thoughts", get(list_thoughts).post(add_thought))
        .route("/api/thoughts/search", get(search_thoughts))
        .route("/api/thoughts/archived", get(list_archived))
        .route("/api/thoughts/:id", put(update_thought).delete(delete_thought))
        .route("/api/thoughts/:id/archive", post(archive_thought))
        .route("/api/thoughts/:id/unarchive", post(unarchive_thought))
        .route("/api/children", get(list_children).post(add_child))
        .route("/api/children/:id", put(update_child))
        .route("/api/reminders", get(list_reminders).post(add_reminder))
        .route(
            "/api/reminders/:id",
            put(update_reminder).delete(delete_reminder),
        )
        .route("/api/records", get(list_records).post(add_record))
        .route("/api/categories", get(list_categories))
        .route("/api/statistics", get(statistics))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/status", get(auth_status))
        .route("/health", get(health))
        .merge(protected)
        .with_state(state)
}

// ---- auth ----

async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    if req.password == state.config.auth_password {
        let token = state.sessions.create();
        let cookie = session_cookie(&token, state.config.session_ttl, state.config.cookie_secure);
        (
            [(SET_COOKIE, cookie)],
            Json(AuthOutcome {
                success: true,
                message: "Login successful".to_string(),
            }),
        )
            .into_response()
    } else {
        tracing::warn!("login rejected: wrong password");
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Invalid password" })),
        )
            .into_response()
    }
}

async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = session_token(&headers) {
        state.sessions.revoke(&token);
    }
    (
        [(SET_COOKIE, clear_session_cookie())],
        Json(AuthOutcome {
            success: true,
            message: "Logout successful".to_string(),
        }),
    )
        .into_response()
}

async fn auth_status(State(state): State<AppState>, headers: HeaderMap) -> Json<AuthStatus> {
    let authenticated = session_token(&headers)
        .map(|token| state.sessions.validate(&token))
        .unwrap_or(false);
    Json(AuthStatus {
        authenticated,
        has_password: state.config.has_real_password(),
    })
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "OK", "timestamp": Utc::now().to_rfc3339() }))
}

// ---- thoughts ----

#[derive(Deserialize)]
struct ListQuery {
    page: Option<usize>,
    limit: Option<usize>,
    refresh: Option<String>,
}

impl ListQuery {
    fn force_refresh(&self) -> bool {
        self.refresh.as_deref() == Some("true")
    }
}

async fn list_thoughts(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Response, AppError> {
    let page = state
        .journal
        .list(q.page, q.limit, q.force_refresh())
        .await?;
    Ok(Json(page).into_response())
}

async fn add_thought(
    State(state): State<AppState>,
    Json(req): Json<NewThought>,
) -> Result<Response, AppError> {
    let created = state.journal.add(&req.content).await?;
    Ok(Json(created).into_response())
}

async fn update_thought(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<NewThought>,
) -> Result<Response, AppError> {
    let updated = state.journal.update(id, &req.content).await?;
    Ok(Json(updated).into_response())
}

async fn delete_thought(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    state.journal.delete(id).await?;
    Ok(Json(json!({ "message": "Thought deleted successfully" })).into_response())
}

async fn archive_thought(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let outcome = state.journal.archive(id).await?;
    Ok(Json(outcome).into_response())
}

async fn unarchive_thought(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let outcome = state.journal.unarchive(id).await?;
    Ok(Json(outcome).into_response())
}

async fn list_archived(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Result<Response, AppError> {
    let page = state
        .journal
        .list_archived(q.page, q.limit, q.force_refresh())
        .await?;
    Ok(Json(page).into_response())
}

#[derive(Deserialize)]
struct SearchQuery {
    q: Option<String>,
    #[serde(rename = "type")]
    scope: Option<SearchScope>,
}

async fn search_thoughts(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Response, AppError> {
    let results = state
        .journal
        .search(q.q.as_deref().unwrap_or(""), q.scope.unwrap_or_default())
        .await?;
    Ok(Json(results).into_response())
}

// ---- family board ----

async fn list_children(State(state): State<AppState>) -> Result<Response, AppError> {
    let children = state.family.children().await?;
    Ok(Json(json!({ "children": children })).into_response())
}

async fn add_child(
    State(state): State<AppState>,
    Json(req): Json<NewChild>,
) -> Result<Response, AppError> {
    let child = state.family.add_child(req).await?;
    Ok(Json(json!({ "message": "Child added successfully", "child": child })).into_response())
}

async fn update_child(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ChildPatch>,
) -> Result<Response, AppError> {
    state.family.update_child(&id, req).await?;
    Ok(Json(json!({ "message": "Child updated successfully" })).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReminderQuery {
    child_id: Option<String>,
    date: Option<String>,
}

async fn list_reminders(
    State(state): State<AppState>,
    Query(q): Query<ReminderQuery>,
) -> Result<Response, AppError> {
    let reminders = state
        .family
        .reminders(q.child_id.as_deref(), q.date.as_deref())
        .await?;
    Ok(Json(json!({ "reminders": reminders })).into_response())
}

async fn add_reminder(
    State(state): State<AppState>,
    Json(req): Json<NewReminder>,
) -> Result<Response, AppError> {
    let reminder = state.family.add_reminder(req).await?;
    Ok(
        Json(json!({ "message": "Reminder added successfully", "reminder": reminder }))
            .into_response(),
    )
}

async fn update_reminder(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<ReminderPatch>,
) -> Result<Response, AppError> {
    state.family.update_reminder(&id, req).await?;
    Ok(Json(json!({ "message": "Reminder updated successfully" })).into_response())
}

async fn delete_reminder(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    state.family.delete_reminder(&id).await?;
    Ok(Json(json!({ "message": "Reminder deleted successfully" })).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordQuery {
    child_id: Option<String>,
    reminder_id: Option<String>,
    date: Option<String>,
}

async fn list_records(
    State(state): State<AppState>,
    Query(q): Query<RecordQuery>,
) -> Result<Response, AppError> {
    let records = state
        .family
        .records(q.child_id.as_deref(), q.reminder_id.as_deref(), q.date.as_deref())
        .await?;
    Ok(Json(json!({ "records": records })).into_response())
}

async fn add_record(
    State(state): State<AppState>,
    Json(req): Json<NewRecord>,
) -> Result<Response, AppError> {
    let record = state.family.add_record(req).await?;
    Ok(Json(json!({ "message": "Record added successfully", "record": record })).into_response())
}

async fn list_categories(State(state): State<AppState>) -> Result<Response, AppError> {
    let categories = state.family.categories().await?;
    Ok(Json(json!({ "categories": categories })).into_response())
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsQuery {
    child_id: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

async fn statistics(
    State(state): State<AppState>,
    Query(q): Query<StatsQuery>,
) -> Result<Response, AppError> {
    let stats = state
        .family
        .statistics(
            q.child_id.as_deref(),
            q.start_date.as_deref(),
            q.end_date.as_deref(),
        )
        .await?;
    Ok(Json(json!({ "statistics": stats })).into_response())
}
