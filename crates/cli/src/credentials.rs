//! Credential bootstrap, resolved once at startup.

use std::sync::Arc;

use anyhow::Context;
use cloudbuild::{MetadataClient, MetadataTokenSource, StaticToken, TokenSource};
use tracing::info;

use crate::config::ServeConfig;

/// Project metadata attribute holding the GitHub token.
const GITHUB_TOKEN_ATTRIBUTE: &str = "github_token";

/// `GITHUB_TOKEN`, else the project metadata attribute. Fails startup if neither exists.
pub async fn github_token(config: &ServeConfig, metadata: &MetadataClient) -> anyhow::Result<String> {
    if let Some(token) = config.github_token.as_deref().filter(|t| !t.is_empty()) {
        return Ok(token.to_string());
    }
    info!("GITHUB_TOKEN not set; reading it from project metadata");
    metadata
        .project_attribute(GITHUB_TOKEN_ATTRIBUTE)
        .await
        .context("could not get GitHub token from GITHUB_TOKEN or project metadata")
}

/// Token source for Cloud Build calls.
pub fn cloudbuild_tokens(config: &ServeConfig, metadata: MetadataClient) -> Arc<dyn TokenSource> {
    match config.cloudbuild_token.as_deref().filter(|t| !t.is_empty()) {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => {
            info!(account = %config.service_account, "using metadata server for Cloud Build tokens");
            Arc::new(MetadataTokenSource::new(metadata, config.service_account.clone()))
        }
    }
}
