// GitLab API module.
// Provides the client, pagination, and types for the GitLab REST API v4.

pub mod client;
pub mod endpoints;
pub mod pagination;
pub mod trace;
pub mod types;

pub use client::GitLabClient;
pub use types::*;
