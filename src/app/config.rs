use std::time::Duration;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub billing_base_url: String,
    pub directory_base_url: String,
    pub redis_url: Option<String>,
    pub bind_port: u16,
    pub cache_ttl: Duration,
    /// Self-hosted installs never inject the demo repository.
    pub self_hosted: bool,
    pub demo_repo: Option<String>,
    pub allowed_origin: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let billing_base_url = require_env("BILLING_API_URL")?;
        let directory_base_url = require_env("REPO_API_URL")?;

        Ok(Self {
            billing_base_url,
            directory_base_url,
            redis_url: std::env::var("REDIS_URL").ok(),
            bind_port: read_env_parsed("PORT").unwrap_or(3000),
            cache_ttl: Duration::from_secs(read_env_parsed("CACHE_TTL_SECS").unwrap_or(60)),
            self_hosted: std::env::var("SELF_HOSTED")
                .map(|value| value == "true" || value == "1")
                .unwrap_or(false),
            demo_repo: std::env::var("DEMO_REPO").ok().filter(|name| !name.is_empty()),
            allowed_origin: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String, String> {
    std::env::var(key).map_err(|_| format!("Missing {}", key))
}

fn read_env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|value| value.parse::<T>().ok())
}
