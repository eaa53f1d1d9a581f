use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use nestnote::api::{self, AppState};
use nestnote::auth::SessionStore;
use nestnote::config::AppConfig;
use nestnote::family::FamilyBoard;
use nestnote::journal::{JournalOptions, ThoughtJournal};
use nestnote::retry::RetryPolicy;
use nestnote::setup;
use nestnote::sheets::GoogleSheetsClient;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Arc::new(AppConfig::from_env()?);
    let store = Arc::new(GoogleSheetsClient::new(
        config.spreadsheet_id.clone(),
        config.access_token.clone(),
        config.request_timeout,
    )?);

    let resolved = setup::initialize(store.as_ref()).await?;

    let journal = Arc::new(ThoughtJournal::new(
        store.clone(),
        resolved.main,
        resolved.archive,
        JournalOptions {
            per_page: config.thoughts_per_page,
            max_page_size: config.max_page_size,
            max_content_length: config.max_content_length,
            cache_ttl: config.cache_ttl,
            retry: RetryPolicy::default(),
        },
    ));
    let family = Arc::new(FamilyBoard::new(store, resolved.family));
    let sessions = Arc::new(SessionStore::new(config.session_ttl));

    let state = AppState {
        config: config.clone(),
        journal,
        family,
        sessions,
    };
    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app).await?;
    Ok(())
}
