//! Configuration for a notification run.
//!
//! Every recognized input is a flag with an environment-variable fallback,
//! so the binary drops into a CI job step unchanged. The struct is built
//! once at the boundary and passed down; nothing below reads ambient state.

use clap::Parser;
use notify::message::DEFAULT_TEMPLATE;

/// Compile and dispatch a deployment-status Slack notification.
#[derive(Debug, Parser)]
#[command(name = "deploy-notify", version)]
pub struct Config {
    /// GitHub token used for the mapping and compare lookups.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: String,

    /// Commit that was deployed (defaults to the triggering commit).
    #[arg(long, env = "GITHUB_SHA")]
    pub commit: String,

    /// Repository the deployment came from, as owner/name.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    pub repo: String,

    /// Target environment name.
    #[arg(long, env = "DEPLOY_ENVIRONMENT", default_value = "unknown environment")]
    pub environment: String,

    /// Lifecycle status: started, success, cancelled or failure.
    /// Anything else is treated as a failure.
    #[arg(long, env = "DEPLOY_STATUS")]
    pub status: String,

    /// Login of the actor who triggered the deployment.
    #[arg(long, env = "GITHUB_ACTOR")]
    pub actor: Option<String>,

    /// Repository holding the login-to-Slack mapping file, as owner/name.
    #[arg(long, env = "SLACK_MAP_REPO")]
    pub slack_map_repo: String,

    /// Path of the mapping file inside the mapping repository.
    #[arg(long, env = "SLACK_MAP_FILE", default_value = "mapping.json")]
    pub slack_map_file: String,

    /// Status endpoint reporting the currently live commit. Required when
    /// the status calls for a commit diff (started, failure).
    #[arg(long, env = "SERVICE_STATUS_URL")]
    pub status_url: Option<String>,

    /// Raw Authorization header value for the status endpoint.
    #[arg(long, env = "SERVICE_STATUS_AUTH", hide_env_values = true)]
    pub status_auth: Option<String>,

    /// JSON field of the status response holding the live commit.
    #[arg(long, env = "STATUS_COMMIT_FIELD", default_value = "BUILD_COMMIT")]
    pub status_commit_field: String,

    /// Headline template; see the token list in the notify crate.
    #[arg(long, env = "MESSAGE_TEMPLATE", default_value = DEFAULT_TEMPLATE)]
    pub template: String,

    /// Channels always notified (comma-separated).
    #[arg(
        long,
        env = "SLACK_CHANNELS",
        value_delimiter = ',',
        required = true
    )]
    pub channels: Vec<String>,

    /// Channels additionally notified on failure (comma-separated).
    #[arg(long, env = "SLACK_FAILURE_CHANNELS", value_delimiter = ',')]
    pub failure_channels: Vec<String>,

    /// Webhook icon override (defaults to the status icon).
    #[arg(long, env = "SLACK_ICON_EMOJI")]
    pub icon_emoji: Option<String>,

    /// Webhook username override.
    #[arg(long, env = "SLACK_USERNAME")]
    pub username: Option<String>,

    /// Slack incoming-webhook URL.
    #[arg(long, env = "SLACK_WEBHOOK_URL", hide_env_values = true)]
    pub slack_webhook: Option<String>,

    /// Compute everything but send nothing.
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,

    /// GitHub API base URL (CI runners set this).
    #[arg(
        long,
        env = "GITHUB_API_URL",
        default_value = "https://api.github.com",
        hide = true
    )]
    pub github_api_url: String,
}
