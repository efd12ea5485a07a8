use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
const DEFAULT_ANALYSIS_TIMEOUT_SECS: u64 = 300;

/// Client configuration loaded from environment variables.
/// Every variable has a default; only malformed values are errors.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the analysis backend, without a trailing path.
    pub api_url: String,
    /// Timeout applied to each HTTP request.
    pub request_timeout: Duration,
    /// Bound on the whole two-call analysis. `None` waits indefinitely.
    pub analysis_timeout: Option<Duration>,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            analysis_timeout: Some(Duration::from_secs(DEFAULT_ANALYSIS_TIMEOUT_SECS)),
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. `from_env` delegates here.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let request_timeout_secs = parse_secs(&lookup, "REQUEST_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        // Unlike the analysis bound, the request timeout cannot be disabled.
        anyhow::ensure!(
            request_timeout_secs > 0,
            "REQUEST_TIMEOUT_SECS must be at least 1 second"
        );
        let analysis_timeout_secs = parse_secs(&lookup, "ANALYSIS_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_ANALYSIS_TIMEOUT_SECS);

        Ok(Config {
            api_url: lookup("CAREER_API_URL")
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            request_timeout: Duration::from_secs(request_timeout_secs),
            // 0 disables the overall bound
            analysis_timeout: (analysis_timeout_secs > 0)
                .then(|| Duration::from_secs(analysis_timeout_secs)),
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn parse_secs<F>(lookup: &F, key: &str) -> Result<Option<u64>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<u64>()
                .with_context(|| format!("{key} must be a whole number of seconds, got '{raw}'"))
        })
        .transpose()
}
