//! Deployed-commit discovery via a service status endpoint.

use anyhow::{anyhow, Context, Result};
use reqwest::header::AUTHORIZATION;
use tracing::debug;
use uuid::Uuid;

/// Client for the service status endpoint.
pub struct StatusClient {
    client: reqwest::Client,
    url: String,
    auth: Option<String>,
    commit_field: String,
}

impl StatusClient {
    /// Create a status client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(url: &str, auth: Option<&str>, commit_field: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: url.to_string(),
            auth: auth.map(str::to_string),
            commit_field: commit_field.to_string(),
        })
    }

    /// Fetch the commit the service currently reports as live.
    ///
    /// Every call carries a randomized cache-busting query parameter so a
    /// stale intermediary cache cannot answer for the endpoint.
    ///
    /// # Errors
    ///
    /// Any network failure, non-success response, or missing commit field
    /// is an error; there is no degraded mode here.
    pub async fn deployed_commit(&self) -> Result<String> {
        let mut request = self
            .client
            .get(&self.url)
            .query(&[("cache_bust", Uuid::new_v4().to_string())]);

        if let Some(auth) = &self.auth {
            request = request.header(AUTHORIZATION, auth.as_str());
        }

        let response = request
            .send()
            .await
            .context("Failed to query service status endpoint")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("service status endpoint returned {status}: {body}"));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .context("Failed to parse service status response")?;

        let commit = body
            .get(&self.commit_field)
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                anyhow!(
                    "service status response has no {:?} field",
                    self.commit_field
                )
            })?;

        debug!(commit, "service status resolved");
        Ok(commit.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

    struct HasQueryParam(&'static str);

    impl Match for HasQueryParam {
        fn matches(&self, request: &Request) -> bool {
            request.url.query_pairs().any(|(k, _)| k == self.0)
        }
    }

    #[tokio::test]
    async fn extracts_the_configured_commit_field() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .and(HasQueryParam("cache_bust"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "BUILD_COMMIT": "aaa111",
                "VERSION": "1.2.3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client =
            StatusClient::new(&format!("{}/status", server.uri()), None, "BUILD_COMMIT").unwrap();
        assert_eq!(client.deployed_commit().await.unwrap(), "aaa111");
    }

    #[tokio::test]
    async fn sends_the_configured_authorization_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .and(header("authorization", "Bearer sekret"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "BUILD_COMMIT": "aaa111" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = StatusClient::new(
            &format!("{}/status", server.uri()),
            Some("Bearer sekret"),
            "BUILD_COMMIT",
        )
        .unwrap();
        assert_eq!(client.deployed_commit().await.unwrap(), "aaa111");
    }

    #[tokio::test]
    async fn cache_buster_changes_between_calls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "BUILD_COMMIT": "aaa111" })),
            )
            .mount(&server)
            .await;

        let client =
            StatusClient::new(&format!("{}/status", server.uri()), None, "BUILD_COMMIT").unwrap();
        client.deployed_commit().await.unwrap();
        client.deployed_commit().await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let busters: Vec<String> = requests
            .iter()
            .map(|r| {
                r.url
                    .query_pairs()
                    .find(|(k, _)| k == "cache_bust")
                    .map(|(_, v)| v.to_string())
                    .expect("cache_bust missing")
            })
            .collect();

        assert_eq!(busters.len(), 2);
        assert_ne!(busters[0], busters[1]);
    }

    #[tokio::test]
    async fn missing_field_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "VERSION": "1.2.3" })),
            )
            .mount(&server)
            .await;

        let client =
            StatusClient::new(&format!("{}/status", server.uri()), None, "BUILD_COMMIT").unwrap();
        let err = client.deployed_commit().await.unwrap_err();

        assert!(err.to_string().contains("BUILD_COMMIT"));
    }

    #[tokio::test]
    async fn endpoint_failure_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/status"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let client =
            StatusClient::new(&format!("{}/status", server.uri()), None, "BUILD_COMMIT").unwrap();
        let err = client.deployed_commit().await.unwrap_err();

        assert!(err.to_string().contains("503"));
    }
}
