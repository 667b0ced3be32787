// Process configuration.
// Read once from the environment at startup and passed down explicitly.

use std::time::Duration;

use url::Url;

use crate::error::{GlError, Result};

pub const TOKEN_VAR: &str = "GITLAB_PERSONAL_TOKEN";
pub const URL_VAR: &str = "GITLAB_URL";
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Immutable settings for one process lifetime.
#[derive(Debug, Clone)]
pub struct Config {
    /// Personal access token sent as `PRIVATE-TOKEN`.
    pub token: String,
    /// Instance URL without trailing slash, e.g. `https://gitlab.com`.
    pub base_url: String,
    /// Upper bound for any single HTTP call.
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let token = lookup(TOKEN_VAR)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(GlError::MissingToken)?;

        let raw_url = lookup(URL_VAR)
            .map(|u| u.trim().to_string())
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string());
        let base_url = raw_url.trim_end_matches('/').to_string();

        Url::parse(&base_url).map_err(|e| GlError::InvalidUrl {
            url: raw_url.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            token,
            base_url,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Root of the REST API for this instance.
    pub fn api_url(&self) -> String {
        format!("{}/api/v4", self.base_url)
    }
}
