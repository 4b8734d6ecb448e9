//! Error types for notification dispatch.

use thiserror::Error;

/// Errors that can occur when sending notifications.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhook is not configured
    #[error("webhook not configured: {0}")]
    NotConfigured(String),

    /// Rate limited by the service
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Webhook rejected the payload
    #[error("{0}")]
    Other(String),
}
