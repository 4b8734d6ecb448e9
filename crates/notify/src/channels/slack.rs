//! Slack webhook sink.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::channels::NotifyChannel;
use crate::error::DispatchError;
use crate::message::NotificationMessage;

/// Webhook username used when none is configured.
pub const DEFAULT_USERNAME: &str = "Workflow Deploy Message";

/// Slack incoming-webhook sink.
pub struct SlackWebhook {
    webhook_url: Option<String>,
    username: String,
    icon_emoji: String,
    client: reqwest::Client,
}

impl SlackWebhook {
    /// Create a Slack sink.
    ///
    /// `webhook_url` may be `None` for dry runs; sending then fails with
    /// [`DispatchError::NotConfigured`].
    #[must_use]
    pub fn new(webhook_url: Option<String>, username: String, icon_emoji: String) -> Self {
        Self {
            webhook_url,
            username,
            icon_emoji,
            client: reqwest::Client::new(),
        }
    }

    /// Format a compiled message as a Block Kit payload for one channel:
    /// a section holding the headline, then one context block per commit.
    fn format_payload(&self, channel: &str, message: &NotificationMessage) -> SlackPayload {
        let mut blocks = vec![SlackBlock::Section {
            text: SlackText::mrkdwn(message.headline.clone()),
        }];

        for commit in &message.blocks {
            let mut elements = Vec::with_capacity(2);
            if let Some(url) = &commit.image_url {
                elements.push(ContextElement::Image {
                    image_url: url.clone(),
                    alt_text: "avatar".to_string(),
                });
            }
            elements.push(ContextElement::Mrkdwn {
                text: commit.text.clone(),
            });
            blocks.push(SlackBlock::Context { elements });
        }

        SlackPayload {
            channel: channel.to_string(),
            username: self.username.clone(),
            icon_emoji: self.icon_emoji.clone(),
            text: message.headline.clone(),
            blocks,
        }
    }
}

#[async_trait]
impl NotifyChannel for SlackWebhook {
    fn name(&self) -> &'static str {
        "slack"
    }

    async fn send(
        &self,
        channel: &str,
        message: &NotificationMessage,
    ) -> Result<(), DispatchError> {
        let webhook_url = self
            .webhook_url
            .as_ref()
            .ok_or_else(|| DispatchError::NotConfigured("SLACK_WEBHOOK_URL".to_string()))?;

        let payload = self.format_payload(channel, message);

        debug!(channel, blocks = payload.blocks.len(), "sending notification");

        let response = self.client.post(webhook_url).json(&payload).send().await?;

        if response.status().is_success() {
            debug!(channel, "notification sent");
            Ok(())
        } else if response.status() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(5);

            warn!(channel, retry_after_secs = retry_after, "rate limited by Slack");

            Err(DispatchError::RateLimited {
                retry_after_secs: retry_after,
            })
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            warn!(channel, %status, body = %body, "Slack webhook request failed");

            Err(DispatchError::Other(format!(
                "Slack returned {status}: {body}"
            )))
        }
    }
}

// =============================================================================
// Slack API types (Block Kit)
// =============================================================================

#[derive(Debug, Serialize)]
struct SlackPayload {
    channel: String,
    username: String,
    icon_emoji: String,
    /// Fallback text for notifications
    text: String,
    blocks: Vec<SlackBlock>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SlackBlock {
    /// Section block with text
    Section { text: SlackText },
    /// Context block for per-commit lines
    Context { elements: Vec<ContextElement> },
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContextElement {
    Image { image_url: String, alt_text: String },
    Mrkdwn { text: String },
}

#[derive(Debug, Serialize)]
struct SlackText {
    #[serde(rename = "type")]
    text_type: &'static str,
    text: String,
}

impl SlackText {
    fn mrkdwn(text: impl Into<String>) -> Self {
        Self {
            text_type: "mrkdwn",
            text: text.into(),
        }
    }
}
