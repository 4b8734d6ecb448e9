//! Error types for GitHub access.

use thiserror::Error;

/// Errors that can occur talking to the GitHub API.
#[derive(Debug, Error)]
pub enum ScmError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub returned a non-success status
    #[error("GitHub API error: {status} - {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },

    /// Repository reference did not split into owner and name
    #[error("invalid repository reference (expected owner/name): {0}")]
    InvalidRepo(String),
}
