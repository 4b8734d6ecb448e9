//! GitHub API client.

use std::collections::HashMap;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, ACCEPT, USER_AGENT};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::ScmError;
use crate::{CommitRecord, RepoRef};

const GITHUB_API_URL: &str = "https://api.github.com";

/// Mapping from GitHub login to Slack user ID.
pub type IdentityMap = HashMap<String, String>;

/// GitHub API client for identity-map resolution and commit comparison.
#[derive(Debug, Clone)]
pub struct GithubClient {
    client: reqwest::Client,
    token: String,
    base_url: String,
}

impl GithubClient {
    /// Create a new GitHub client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(token: &str) -> Result<Self, ScmError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("deploy-notify/0.1"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            token: token.to_string(),
            base_url: GITHUB_API_URL.to_string(),
        })
    }

    /// Override the API base URL (for tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Resolve the login-to-Slack-handle map from a JSON file in `repo`.
    ///
    /// The contents lookup locates the raw download URL for `path`. A
    /// failure there aborts the run. A failure downloading or parsing the
    /// file itself degrades to an empty map instead: a malformed mapping
    /// file must not block deployment notifications.
    ///
    /// # Errors
    ///
    /// Returns an error if the contents lookup fails.
    pub async fn identity_map(
        &self,
        repo: &RepoRef,
        path: &str,
    ) -> Result<IdentityMap, ScmError> {
        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.base_url, repo.owner, repo.name, path
        );
        debug!(%url, "looking up identity mapping file");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, repo = %repo, path, "identity map lookup failed");
            return Err(ScmError::Api { status, body });
        }

        let contents: ContentsResponse = response.json().await?;

        match self.download_map(&contents.download_url).await {
            Ok(map) => {
                debug!(entries = map.len(), "identity map loaded");
                Ok(map)
            }
            Err(e) => {
                warn!(error = %e, "failed to download identity map, continuing with empty map");
                Ok(IdentityMap::new())
            }
        }
    }

    async fn download_map(&self, url: &str) -> Result<IdentityMap, ScmError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ScmError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    /// List the commits in `(base, head]`, in the order the compare
    /// endpoint returns them.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn compare(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<Vec<CommitRecord>, ScmError> {
        let url = format!(
            "{}/repos/{}/{}/compare/{}...{}",
            self.base_url, repo.owner, repo.name, base, head
        );
        debug!(%url, "comparing commit range");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, repo = %repo, base, head, "compare request failed");
            return Err(ScmError::Api { status, body });
        }

        let compared: CompareResponse = response.json().await?;
        debug!(commits = compared.commits.len(), "compare range resolved");

        Ok(compared.commits.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// GitHub API wire types
// =============================================================================

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    download_url: String,
}

#[derive(Debug, Deserialize)]
struct CompareResponse {
    commits: Vec<CompareCommit>,
}

#[derive(Debug, Deserialize)]
struct CompareCommit {
    sha: String,
    html_url: String,
    commit: CommitDetail,
    author: Option<AuthorInfo>,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct AuthorInfo {
    login: String,
    html_url: Option<String>,
    avatar_url: Option<String>,
}

impl From<CompareCommit> for CommitRecord {
    fn from(c: CompareCommit) -> Self {
        let (author_login, author_profile_url, author_avatar_url) = match c.author {
            Some(a) => (Some(a.login), a.html_url, a.avatar_url),
            None => (None, None, None),
        };
        Self {
            sha: c.sha,
            author_login,
            author_profile_url,
            author_avatar_url,
            message: c.commit.message,
            url: c.html_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> GithubClient {
        GithubClient::new("test-token")
            .unwrap()
            .with_base_url(server.uri())
    }

    #[tokio::test]
    async fn identity_map_resolves_via_download_url() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/people/contents/mapping.json"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "download_url": format!("{}/raw/mapping.json", server.uri())
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/raw/mapping.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "dave": "U123",
                "erin": "U456"
            })))
            .mount(&server)
            .await;

        let repo = RepoRef::parse("acme/people").unwrap();
        let map = client(&server)
            .identity_map(&repo, "mapping.json")
            .await
            .unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map["dave"], "U123");
    }

    #[tokio::test]
    async fn identity_map_lookup_failure_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/people/contents/mapping.json"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&server)
            .await;

        let repo = RepoRef::parse("acme/people").unwrap();
        let err = client(&server)
            .identity_map(&repo, "mapping.json")
            .await
            .unwrap_err();

        assert!(matches!(err, ScmError::Api { status, .. } if status == 404));
    }

    #[tokio::test]
    async fn identity_map_download_failure_degrades_to_empty() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/people/contents/mapping.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "download_url": format!("{}/raw/mapping.json", server.uri())
            })))
            .mount(&server)
            .await;

        // Not JSON at all - the download stage must recover.
        Mock::given(method("GET"))
            .and(path("/raw/mapping.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let repo = RepoRef::parse("acme/people").unwrap();
        let map = client(&server)
            .identity_map(&repo, "mapping.json")
            .await
            .unwrap();

        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn compare_maps_commits_in_api_order() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/compare/aaa111...bbb222"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "commits": [
                    {
                        "sha": "bbb222",
                        "html_url": "https://github.com/acme/widgets/commit/bbb222",
                        "commit": { "message": "Fix login\n\nLonger body" },
                        "author": {
                            "login": "carol",
                            "html_url": "https://github.com/carol",
                            "avatar_url": "https://avatars.example.com/carol.png"
                        }
                    },
                    {
                        "sha": "ccc333",
                        "html_url": "https://github.com/acme/widgets/commit/ccc333",
                        "commit": { "message": "Bump deps" },
                        "author": null
                    }
                ]
            })))
            .mount(&server)
            .await;

        let repo = RepoRef::parse("acme/widgets").unwrap();
        let commits = client(&server)
            .compare(&repo, "aaa111", "bbb222")
            .await
            .unwrap();

        assert_eq!(commits.len(), 2);
        assert_eq!(commits[0].sha, "bbb222");
        assert_eq!(commits[0].author_login.as_deref(), Some("carol"));
        assert_eq!(commits[0].message, "Fix login\n\nLonger body");
        assert_eq!(commits[1].sha, "ccc333");
        assert!(commits[1].author_login.is_none());
    }

    #[tokio::test]
    async fn compare_failure_is_fatal() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/compare/aaa111...bbb222"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let repo = RepoRef::parse("acme/widgets").unwrap();
        let err = client(&server)
            .compare(&repo, "aaa111", "bbb222")
            .await
            .unwrap_err();

        assert!(matches!(err, ScmError::Api { status, .. } if status == 500));
    }
}
