//! Deploy-status message compilation.
//!
//! Turns a deployment event, an identity map, and a diffed commit range
//! into a [`NotificationMessage`]: a templated headline plus one block per
//! delivered commit, oldest first.

use std::sync::LazyLock;

use regex::Regex;
use scm::{CommitRecord, IdentityMap, RepoRef};

/// Headline template used when none is configured.
pub const DEFAULT_TEMPLATE: &str =
    "$STATUS_ICON $ACTOR_LINK $STATUS_TEXT $COMMIT_LINK in $REPO_LINK to $ENV_ICON $ENV_LINK";

/// Environment name whose unattended deployments are not attributed to the
/// triggering actor (unless they fail).
pub const NIGHTLY_ENVIRONMENT: &str = "nightly";

/// Shown for commits whose message is empty.
const EMPTY_MESSAGE_PLACEHOLDER: &str = "…";

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("whitespace regex"));

/// Lifecycle status of a deployment event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Started,
    Success,
    Cancelled,
    Failure,
}

impl Status {
    /// Parse a status string.
    ///
    /// Unrecognized values are treated as a failure rather than rejected,
    /// so a misbehaving pipeline still produces a (loud) notification.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "started" => Self::Started,
            "success" => Self::Success,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Failure,
        }
    }

    /// Human-readable verb for the headline.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::Started => "deploying",
            Self::Success => "deployed",
            Self::Cancelled => "cancelled",
            Self::Failure => "deployment failure",
        }
    }

    /// Emoji shorthand for the headline and the default webhook icon.
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Started => ":hourglass_flowing_sand:",
            Self::Success => ":white_check_mark:",
            Self::Cancelled => ":question:",
            Self::Failure => ":x:",
        }
    }

    /// Whether this status warrants diffing against the live commit.
    #[must_use]
    pub const fn wants_diff(self) -> bool {
        matches!(self, Self::Started | Self::Failure)
    }

    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Failure)
    }
}

/// Emoji for a target environment.
#[must_use]
pub fn environment_icon(environment: &str) -> &'static str {
    match environment {
        "staging" => ":construction:",
        "production" => ":rocket:",
        NIGHTLY_ENVIRONMENT => ":crescent_moon:",
        "uat" => ":test_tube:",
        _ => ":gear:",
    }
}

/// One deployment occurrence, built once per run from configuration.
#[derive(Debug, Clone)]
pub struct DeploymentEvent {
    pub commit: String,
    pub environment: String,
    pub status: Status,
}

/// Render-only view of a commit: attribution line plus optional avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitBlock {
    pub text: String,
    pub image_url: Option<String>,
}

/// The compiled notification: headline plus commit blocks, oldest first.
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    pub headline: String,
    pub blocks: Vec<CommitBlock>,
}

/// Inputs shared by every rendering rule.
#[derive(Debug)]
pub struct RenderContext<'a> {
    pub repo: &'a RepoRef,
    pub actor: Option<&'a str>,
    pub identity_map: &'a IdentityMap,
    pub status_url: Option<&'a str>,
}

/// Compile the notification for `event`.
///
/// `commits` is expected in the compare endpoint's order (newest first);
/// this is the single place the sequence is reversed to read oldest first.
#[must_use]
pub fn compile(
    event: &DeploymentEvent,
    ctx: &RenderContext<'_>,
    commits: &[CommitRecord],
    template: &str,
) -> NotificationMessage {
    let headline = render_headline(event, ctx, template);
    let blocks = commits
        .iter()
        .rev()
        .map(|c| commit_block(ctx.identity_map, c))
        .collect();

    NotificationMessage { headline, blocks }
}

fn render_headline(event: &DeploymentEvent, ctx: &RenderContext<'_>, template: &str) -> String {
    let repo_url = ctx.repo.html_url();
    let environment_link = match ctx.status_url {
        Some(url) => format!("<{url}|{}>", event.environment),
        None => event.environment.clone(),
    };
    let commit_link = format!(
        "<{repo_url}/commit/{}|{}>",
        event.commit,
        short_sha(&event.commit)
    );

    let replacements: [(&str, String); 7] = [
        ("$ACTOR_LINK", actor_link(event, ctx)),
        ("$STATUS_ICON", event.status.icon().to_string()),
        ("$STATUS_TEXT", event.status.text().to_string()),
        ("$ENV_ICON", environment_icon(&event.environment).to_string()),
        ("$ENV_LINK", environment_link),
        ("$COMMIT_LINK", commit_link),
        ("$REPO_LINK", format!("<{repo_url}|{}>", ctx.repo)),
    ];

    let mut rendered = template.to_string();
    for (token, value) in &replacements {
        rendered = rendered.replace(token, value);
    }

    // Actor suppression can leave a double gap behind.
    let rendered = WHITESPACE_RUN.replace_all(&rendered, " ").trim().to_string();

    if rendered.is_empty() {
        format!("{} {}", event.status.icon(), event.status.text())
    } else {
        rendered
    }
}

/// Headline attribution for the triggering actor.
///
/// Nightly deployments are unattended, so the actor is dropped from the
/// headline unless the deployment failed.
fn actor_link(event: &DeploymentEvent, ctx: &RenderContext<'_>) -> String {
    if event.environment == NIGHTLY_ENVIRONMENT && !event.status.is_failure() {
        return String::new();
    }
    match ctx.actor {
        Some(login) => attribution(ctx.identity_map, login, None),
        None => String::new(),
    }
}

/// Mention when the login is mapped, profile hyperlink otherwise.
fn attribution(map: &IdentityMap, login: &str, profile_url: Option<&str>) -> String {
    match map.get(login) {
        Some(handle) => format!("<@{handle}>"),
        None => {
            let url = profile_url
                .map(str::to_string)
                .unwrap_or_else(|| format!("https://github.com/{login}"));
            format!("<{url}|{login}>")
        }
    }
}

fn commit_block(map: &IdentityMap, commit: &CommitRecord) -> CommitBlock {
    let author = match commit.author_login.as_deref() {
        Some(login) => attribution(map, login, commit.author_profile_url.as_deref()),
        None => "unknown".to_string(),
    };

    let first_line = commit.message.lines().next().unwrap_or("").trim();
    let display = if first_line.is_empty() {
        EMPTY_MESSAGE_PLACEHOLDER
    } else {
        first_line
    };

    CommitBlock {
        text: format!("- {author} <{}|{display}>", commit.url),
        image_url: commit.author_avatar_url.clone(),
    }
}

fn short_sha(sha: &str) -> &str {
    if sha.len() > 7 {
        &sha[..7]
    } else {
        sha
    }
}
