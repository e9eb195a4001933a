//! Cloud Build REST client.
//!
//! Fetches one build by project and ID and converts it into a
//! [`reporting::BuildSnapshot`].

use std::sync::Arc;

use async_trait::async_trait;
use reporting::{BuildRef, BuildSnapshot, BuildStatusProvider, ProviderError};
use tracing::debug;

use crate::wire::Build;
use crate::TokenSource;

/// Cloud Build REST client implementing [`BuildStatusProvider`].
#[derive(Clone)]
pub struct CloudBuildClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl CloudBuildClient {
    /// Public endpoint used when no override is configured.
    pub const DEFAULT_BASE_URL: &'static str = "https://cloudbuild.googleapis.com";

    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenSource>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn build_url(&self, build: &BuildRef) -> String {
        format!(
            "{}/v1/projects/{}/builds/{}",
            self.base_url, build.project, build.build_id
        )
    }
}

impl std::fmt::Debug for CloudBuildClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudBuildClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl BuildStatusProvider for CloudBuildClient {
    async fn get_build(&self, build: &BuildRef) -> Result<BuildSnapshot, ProviderError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .get(self.build_url(build))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Build = response.json().await.map_err(|e| ProviderError::Decode {
            message: e.to_string(),
        })?;
        debug!(%build, status = %payload.status, "polled build");
        Ok(payload.into())
    }
}
