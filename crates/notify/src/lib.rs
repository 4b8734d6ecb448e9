//! Deploy-status notification compilation and dispatch.
//!
//! This crate turns a deployment event plus a diffed commit range into a
//! Slack notification and fans it out to a status-dependent set of
//! channels.
//!
//! # Usage
//!
//! ```no_run
//! use notify::channels::slack::{SlackWebhook, DEFAULT_USERNAME};
//! use notify::message::{compile, DeploymentEvent, RenderContext, Status, DEFAULT_TEMPLATE};
//!
//! # async fn example() -> Result<(), notify::DispatchError> {
//! let repo = scm::RepoRef::parse("acme/widgets").unwrap();
//! let identity_map = scm::IdentityMap::new();
//! let event = DeploymentEvent {
//!     commit: "bbb222".to_string(),
//!     environment: "production".to_string(),
//!     status: Status::Started,
//! };
//! let ctx = RenderContext {
//!     repo: &repo,
//!     actor: Some("alice"),
//!     identity_map: &identity_map,
//!     status_url: None,
//! };
//!
//! let message = compile(&event, &ctx, &[], DEFAULT_TEMPLATE);
//!
//! let sink = SlackWebhook::new(
//!     Some("https://hooks.slack.com/services/T000/B000/XXX".to_string()),
//!     DEFAULT_USERNAME.to_string(),
//!     event.status.icon().to_string(),
//! );
//! notify::channels::dispatch(
//!     &sink,
//!     &message,
//!     &["#deploys".to_string()],
//!     &["#incidents".to_string()],
//!     event.status,
//!     false,
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! - [`message`] compiles the notification: status/environment tables,
//!   token template substitution, author attribution, block ordering.
//! - [`channels::NotifyChannel`] is the sink seam;
//!   [`channels::slack::SlackWebhook`] implements it.
//! - [`channels::dispatch`] resolves the channel set (escalation channels
//!   only on failure), honors dry-run, and joins all sends, surfacing the
//!   first error.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod channels;
pub mod error;
pub mod message;

pub use channels::slack::SlackWebhook;
pub use channels::{dispatch, NotifyChannel};
pub use error::DispatchError;
pub use message::{
    compile, CommitBlock, DeploymentEvent, NotificationMessage, RenderContext, Status,
};
