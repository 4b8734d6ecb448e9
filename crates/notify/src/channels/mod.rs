//! Notification channel implementations and dispatch.

pub mod slack;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, info};

use crate::error::DispatchError;
use crate::message::{NotificationMessage, Status};

/// Trait for webhook-backed notification sinks (Slack today).
#[async_trait]
pub trait NotifyChannel: Send + Sync {
    /// Get the name of this sink.
    fn name(&self) -> &'static str;

    /// Send the compiled message to one named channel.
    async fn send(
        &self,
        channel: &str,
        message: &NotificationMessage,
    ) -> Result<(), DispatchError>;
}

/// Channels to notify: the base set always, escalation only on failure.
/// First-seen order, no duplicates.
#[must_use]
pub fn resolve_channels(base: &[String], escalation: &[String], status: Status) -> Vec<String> {
    let escalation: &[String] = if status.is_failure() { escalation } else { &[] };

    let mut resolved = Vec::with_capacity(base.len() + escalation.len());
    for channel in base.iter().chain(escalation) {
        if !resolved.contains(channel) {
            resolved.push(channel.clone());
        }
    }
    resolved
}

/// Send `message` to every resolved channel concurrently.
///
/// Joins on all sends and surfaces the first error. Channels that already
/// accepted the message keep it; delivery is not rolled back.
///
/// # Errors
///
/// Returns the first [`DispatchError`] from any channel send.
pub async fn dispatch(
    sink: &dyn NotifyChannel,
    message: &NotificationMessage,
    base: &[String],
    escalation: &[String],
    status: Status,
    dry_run: bool,
) -> Result<(), DispatchError> {
    let channels = resolve_channels(base, escalation, status);

    if dry_run {
        info!(
            channels = ?channels,
            headline = %message.headline,
            "dry run, skipping dispatch"
        );
        return Ok(());
    }

    debug!(
        sink = sink.name(),
        count = channels.len(),
        "dispatching notification"
    );
    try_join_all(channels.iter().map(|c| sink.send(c, message))).await?;
    Ok(())
}
