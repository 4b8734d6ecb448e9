//! Run orchestration.
//!
//! Sequencing: identity map and deployed-commit discovery run concurrently;
//! the diff needs the deployed commit; compilation needs the diff and the
//! identity map; dispatch needs the compiled message. For `success` and
//! `cancelled` the status endpoint and the diff are skipped entirely.

use anyhow::{Context, Result};
use notify::channels::slack::{SlackWebhook, DEFAULT_USERNAME};
use notify::message::{compile, DeploymentEvent, RenderContext, Status};
use scm::{GithubClient, RepoRef};
use tracing::{debug, info};

use crate::config::Config;
use crate::status::StatusClient;

/// Execute one notification run.
///
/// # Errors
///
/// Any unrecovered failure in the pipeline (configuration, GitHub access,
/// status discovery, dispatch) aborts the run.
pub async fn run(config: Config) -> Result<()> {
    // Malformed repository references fail before any network call.
    let repo = RepoRef::parse(&config.repo)?;
    let map_repo = RepoRef::parse(&config.slack_map_repo)?;
    let status = Status::parse(&config.status);

    let github =
        GithubClient::new(&config.github_token)?.with_base_url(config.github_api_url.clone());

    let identity_fut = async {
        github
            .identity_map(&map_repo, &config.slack_map_file)
            .await
            .context("failed to resolve identity map")
    };
    let deployed_fut = async {
        if !status.wants_diff() {
            return Ok(None);
        }
        let url = config
            .status_url
            .as_deref()
            .context("service status URL is required when the status calls for a diff")?;
        let client = StatusClient::new(url, config.status_auth.as_deref(), &config.status_commit_field)?;
        client.deployed_commit().await.map(Some)
    };

    let (identity_map, deployed) = tokio::try_join!(identity_fut, deployed_fut)?;
    debug!(entries = identity_map.len(), "identity map resolved");

    let commits = match &deployed {
        Some(base) => github
            .compare(&repo, base, &config.commit)
            .await
            .context("failed to diff deployed commit range")?,
        None => Vec::new(),
    };

    let event = DeploymentEvent {
        commit: config.commit.clone(),
        environment: config.environment.clone(),
        status,
    };
    let ctx = RenderContext {
        repo: &repo,
        actor: config.actor.as_deref(),
        identity_map: &identity_map,
        status_url: config.status_url.as_deref(),
    };
    let message = compile(&event, &ctx, &commits, &config.template);
    debug!(
        headline = %message.headline,
        blocks = message.blocks.len(),
        "notification compiled"
    );

    let sink = SlackWebhook::new(
        config.slack_webhook.clone(),
        config
            .username
            .clone()
            .unwrap_or_else(|| DEFAULT_USERNAME.to_string()),
        config
            .icon_emoji
            .clone()
            .unwrap_or_else(|| status.icon().to_string()),
    );

    notify::channels::dispatch(
        &sink,
        &message,
        &config.channels,
        &config.failure_channels,
        status,
        config.dry_run,
    )
    .await
    .context("failed to dispatch notification")?;

    info!(
        status = status.text(),
        commits = commits.len(),
        "notification run complete"
    );
    Ok(())
}
