// Error types for glpipes.
// Splits failures into configuration, remote, and reference classes.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GlError {
    #[error("Missing GITLAB_PERSONAL_TOKEN environment variable")]
    MissingToken,

    #[error("Invalid GitLab URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Invalid GITLAB_PERSONAL_TOKEN: {0}")]
    InvalidToken(String),

    #[error("GitLab API error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Authentication failed: invalid or expired token")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid selection: {0}")]
    Reference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GlError {
    /// Whether this error came from talking to the GitLab instance.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            GlError::Api(_)
                | GlError::Timeout
                | GlError::Unauthorized
                | GlError::NotFound(_)
                | GlError::Http { .. }
                | GlError::Json(_)
        )
    }

    /// Whether startup must abort on this error.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            GlError::MissingToken | GlError::InvalidToken(_) | GlError::InvalidUrl { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, GlError>;
