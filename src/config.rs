use std::env;
use std::time::Duration;

/// Runtime configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub spreadsheet_id: String,
    pub access_token: String,
    pub auth_password: String,
    pub cookie_secure: bool,
    pub thoughts_per_page: usize,
    pub max_page_size: usize,
    pub max_content_length: usize,
    pub cache_ttl: Duration,
    pub request_timeout: Duration,
    pub session_ttl: Duration,
}

const DEMO_PASSWORD: &str = "demo-password-change-me";

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let spreadsheet_id = env::var("GOOGLE_SHEETS_ID")
            .ok()
            .filter(|v| !v.is_empty() && v != "your_google_sheets_id_here")
            .ok_or_else(|| anyhow::anyhow!("GOOGLE_SHEETS_ID must be set"))?;

        let access_token = env::var("GOOGLE_SHEETS_TOKEN")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow::anyhow!("GOOGLE_SHEETS_TOKEN must be set"))?;

        let auth_password = env::var("AUTH_PASSWORD")
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow::anyhow!("AUTH_PASSWORD must be set"))?;
        if auth_password == DEMO_PASSWORD {
            tracing::warn!("AUTH_PASSWORD is the demo default; change it for real use");
        }

        Ok(Self {
            port: parse_env("PORT", 3000),
            spreadsheet_id,
            access_token,
            auth_password,
            cookie_secure: env::var("COOKIE_SECURE").as_deref() == Ok("true"),
            thoughts_per_page: parse_env("THOUGHTS_PER_PAGE", 10),
            max_page_size: 50,
            max_content_length: parse_env("MAX_CONTENT_LENGTH", 10_000),
            cache_ttl: Duration::from_secs(parse_env("CACHE_TTL_SECS", 30)),
            request_timeout: Duration::from_secs(10),
            session_ttl: Duration::from_secs(7 * 24 * 60 * 60),
        })
    }

    /// True unless the password is still the shipped demo value.
    pub fn has_real_password(&self) -> bool {
        self.auth_password != DEMO_PASSWORD
    }
}

fn parse_env<T: std::str::FromStr + Copy>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
