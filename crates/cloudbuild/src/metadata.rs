//! GCE metadata server client.
//!
//! Used for project attributes (the GitHub token) and service-account access
//! tokens. Every request carries `Metadata-Flavor: Google`.

use std::time::Duration;

use tracing::debug;

use crate::wire::TokenResponse;
use crate::CloudBuildError;

/// An OAuth2 access token together with its remaining lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub token: String,
    pub expires_in: Duration,
}

/// Minimal client for the GCE metadata server.
#[derive(Debug, Clone)]
pub struct MetadataClient {
    http: reqwest::Client,
    base_url: String,
}

impl MetadataClient {
    /// Host used when `GCE_METADATA_HOST` is not set.
    pub const DEFAULT_HOST: &'static str = "metadata.google.internal";

    /// Creates a client against `base_url` (scheme and host, no trailing path).
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a client for the host named by `GCE_METADATA_HOST`, falling
    /// back to [`Self::DEFAULT_HOST`].
    pub fn from_env(http: reqwest::Client) -> Self {
        let host = std::env::var("GCE_METADATA_HOST")
            .ok()
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_HOST.to_string());
        Self::new(http, format!("http://{host}"))
    }

    /// Reads a project-level custom metadata attribute.
    pub async fn project_attribute(&self, name: &str) -> Result<String, CloudBuildError> {
        let path = format!("project/attributes/{name}");
        let value = self.get(&path).await?.text().await?;
        let value = value.trim().to_string();
        if value.is_empty() {
            return Err(CloudBuildError::EmptyValue { path });
        }
        Ok(value)
    }

    /// Fetches an access token for `account` (an email, or `default`).
    pub async fn service_account_token(&self, account: &str) -> Result<AccessToken, CloudBuildError> {
        let path = format!("instance/service-accounts/{account}/token");
        let body: TokenResponse = self.get(&path).await?.json().await?;
        if body.access_token.is_empty() {
            return Err(CloudBuildError::EmptyValue { path });
        }
        debug!(account, expires_in = body.expires_in, "fetched service account token");
        Ok(AccessToken {
            token: body.access_token,
            expires_in: Duration::from_secs(body.expires_in),
        })
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, CloudBuildError> {
        let url = format!("{}/computeMetadata/v1/{path}", self.base_url);
        let response = self
            .http
            .get(&url)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CloudBuildError::Metadata {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reads_project_attribute_with_flavor_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/computeMetadata/v1/project/attributes/github_token")
            .match_header("Metadata-Flavor", "Google")
            .with_body("ghp_secret\n")
            .create_async()
            .await;

        let client = MetadataClient::new(reqwest::Client::new(), server.url());
        let value = client.project_attribute("github_token").await.unwrap();

        assert_eq!(value, "ghp_secret");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_attribute_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/computeMetadata/v1/project/attributes/github_token")
            .with_status(404)
            .create_async()
            .await;

        let client = MetadataClient::new(reqwest::Client::new(), server.url());
        let err = client.project_attribute("github_token").await.unwrap_err();

        assert!(matches!(err, CloudBuildError::Metadata { status: 404, .. }));
    }

    #[tokio::test]
    async fn parses_service_account_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock(
                "GET",
                "/computeMetadata/v1/instance/service-accounts/default/token",
            )
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"ya29.abc","expires_in":3599,"token_type":"Bearer"}"#)
            .create_async()
            .await;

        let client = MetadataClient::new(reqwest::Client::new(), server.url());
        let token = client.service_account_token("default").await.unwrap();

        assert_eq!(token.token, "ya29.abc");
        assert_eq!(token.expires_in, Duration::from_secs(3599));
    }
}
