//! GitHub infrastructure adapter for cloudbuild-report.
//!
//! Implements [`reporting::CommitStatusPublisher`] with the REST endpoint
//! `POST /repos/{owner}/{repo}/statuses/{sha}`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain domain rules. All GitHub
//! API details (headers, API version pinning, response decoding) are handled
//! here; the [`reporting`] crate never sees them.
//!
//! Any response above 399 is reported as [`reporting::PublishError::Rejected`]
//! with the response body, so the loop can log exactly what GitHub said.

use async_trait::async_trait;
use reporting::{
    CommitState, CommitStatusPublisher, CommitTarget, PublishError, PublishReceipt, StatusReport,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// REST API version sent with every request.
pub const API_VERSION: &str = "2022-11-28";

/// Request body for the create-status endpoint.
#[derive(Debug, Serialize)]
struct CreateStatus<'a> {
    state: CommitState,
    target_url: &'a str,
    description: &'a str,
    context: &'a str,
}

/// The subset of the created status the publisher reads back.
#[derive(Debug, Deserialize)]
struct RepoStatus {
    state: CommitState,
}

/// Commit status client for github.com or a GitHub Enterprise API root.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_url: String,
    token: String,
}

impl GithubClient {
    /// API root used when no override is configured.
    pub const DEFAULT_API_URL: &'static str = "https://api.github.com";

    pub fn new(http: reqwest::Client, api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn statuses_url(&self, target: &CommitTarget) -> String {
        format!(
            "{}/repos/{}/{}/statuses/{}",
            self.api_url, target.org, target.repo, target.sha
        )
    }
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_url", &self.api_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CommitStatusPublisher for GithubClient {
    async fn create_status(
        &self,
        target: &CommitTarget,
        report: &StatusReport,
    ) -> Result<PublishReceipt, PublishError> {
        let body = CreateStatus {
            state: report.state,
            target_url: &report.target_url,
            description: &report.description,
            context: report.context.as_str(),
        };

        let response = self
            .http
            .post(self.statuses_url(target))
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| PublishError::Transport {
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.as_u16() > 399 {
            let body = response.text().await.unwrap_or_default();
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let created: RepoStatus = response.json().await.map_err(|e| PublishError::Decode {
            message: e.to_string(),
        })?;
        debug!(%target, state = %created.state, http_status = status.as_u16(), "created commit status");

        Ok(PublishReceipt {
            state: created.state,
            http_status: status.as_u16(),
        })
    }
}
