//! Bearer token sources for Cloud Build requests.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::{CloudBuildError, MetadataClient};

/// Supplies bearer tokens for Cloud Build requests.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, CloudBuildError>;
}

/// A fixed token, e.g. from `CLOUDBUILD_TOKEN`.
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken(..)")
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, CloudBuildError> {
        Ok(self.0.clone())
    }
}

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Service-account tokens from the metadata server, cached until shortly
/// before they expire.
pub struct MetadataTokenSource {
    metadata: MetadataClient,
    account: String,
    cached: Mutex<Option<CachedToken>>,
}

impl MetadataTokenSource {
    /// Tokens are refreshed once less than this much lifetime remains.
    pub const REFRESH_MARGIN: Duration = Duration::from_secs(60);

    /// Upper bound on the lifetime trusted from the metadata server.
    pub const MAX_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

    pub fn new(metadata: MetadataClient, account: impl Into<String>) -> Self {
        Self {
            metadata,
            account: account.into(),
            cached: Mutex::new(None),
        }
    }
}

impl std::fmt::Debug for MetadataTokenSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetadataTokenSource")
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenSource for MetadataTokenSource {
    async fn access_token(&self) -> Result<String, CloudBuildError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Instant::now() + Self::REFRESH_MARGIN < token.expires_at {
                return Ok(token.token.clone());
            }
        }

        let fresh = self.metadata.service_account_token(&self.account).await?;
        let token = fresh.token.clone();
        let now = Instant::now();
        *cached = Some(CachedToken {
            token: fresh.token,
            expires_at: now
                .checked_add(fresh.expires_in.min(Self::MAX_LIFETIME))
                .unwrap_or(now),
        });
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOKEN_PATH: &str = "/computeMetadata/v1/instance/service-accounts/robot@example.iam.gserviceaccount.com/token";

    #[tokio::test]
    async fn static_token_is_returned_verbatim() {
        assert_eq!(StaticToken::new("t0k").access_token().await.unwrap(), "t0k");
    }

    #[tokio::test]
    async fn metadata_token_is_cached_while_fresh() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", TOKEN_PATH)
            .with_body(r#"{"access_token":"ya29.one","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await;

        let source = MetadataTokenSource::new(
            MetadataClient::new(reqwest::Client::new(), server.url()),
            "robot@example.iam.gserviceaccount.com",
        );
        assert_eq!(source.access_token().await.unwrap(), "ya29.one");
        assert_eq!(source.access_token().await.unwrap(), "ya29.one");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn absurd_expiry_is_capped() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", TOKEN_PATH)
            .with_body(r#"{"access_token":"ya29.long","expires_in":18446744073709551615}"#)
            .expect(1)
            .create_async()
            .await;

        let source = MetadataTokenSource::new(
            MetadataClient::new(reqwest::Client::new(), server.url()),
            "robot@example.iam.gserviceaccount.com",
        );
        assert_eq!(source.access_token().await.unwrap(), "ya29.long");
        assert_eq!(source.access_token().await.unwrap(), "ya29.long");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn nearly_expired_token_is_refreshed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", TOKEN_PATH)
            .with_body(r#"{"access_token":"ya29.short","expires_in":30}"#)
            .expect(2)
            .create_async()
            .await;

        let source = MetadataTokenSource::new(
            MetadataClient::new(reqwest::Client::new(), server.url()),
            "robot@example.iam.gserviceaccount.com",
        );
        source.access_token().await.unwrap();
        source.access_token().await.unwrap();

        mock.assert_async().await;
    }
}
