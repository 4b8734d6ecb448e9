//! GitHub REST access for deploy notifications.
//!
//! Two operations back the notification pipeline:
//!
//! - [`GithubClient::identity_map`] fetches a JSON file mapping GitHub
//!   logins to Slack user IDs out of a configured repository.
//! - [`GithubClient::compare`] lists the commits between two refs via the
//!   compare endpoint.

pub mod client;
pub mod error;

pub use client::{GithubClient, IdentityMap};
pub use error::ScmError;

/// A repository reference split into owner and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl RepoRef {
    /// Parse an `owner/name` reference.
    ///
    /// # Errors
    ///
    /// Returns [`ScmError::InvalidRepo`] unless the reference splits into
    /// exactly two non-empty parts.
    pub fn parse(reference: &str) -> Result<Self, ScmError> {
        match reference.split('/').collect::<Vec<_>>().as_slice() {
            [owner, name] if !owner.is_empty() && !name.is_empty() => Ok(Self {
                owner: (*owner).to_string(),
                name: (*name).to_string(),
            }),
            _ => Err(ScmError::InvalidRepo(reference.to_string())),
        }
    }

    /// Web URL of the repository.
    #[must_use]
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }
}

impl std::fmt::Display for RepoRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// One commit from a compare-range response, read-only after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub sha: String,
    pub author_login: Option<String>,
    pub author_profile_url: Option<String>,
    pub author_avatar_url: Option<String>,
    pub message: String,
    pub url: String,
}
