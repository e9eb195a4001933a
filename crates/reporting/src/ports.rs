//! Port traits implemented by the infrastructure crates.
//!
//! Both traits are object safe so the composition root can hand
//! `Arc<dyn BuildStatusProvider>` and `Arc<dyn CommitStatusPublisher>` to the
//! endpoint and every loop it launches.

use async_trait::async_trait;

use crate::{
    BuildRef, BuildSnapshot, CommitTarget, ProviderError, PublishError, PublishReceipt,
    StatusReport,
};

/// Source of build state (`getBuild(project, buildID)`).
#[async_trait]
pub trait BuildStatusProvider: Send + Sync {
    /// Fetches a fresh snapshot of the build.
    async fn get_build(&self, build: &BuildRef) -> Result<BuildSnapshot, ProviderError>;
}

/// Sink for commit statuses (`createStatus(org, repo, sha, report)`).
#[async_trait]
pub trait CommitStatusPublisher: Send + Sync {
    /// Creates a status on `target`. Any HTTP status above 399 must surface as
    /// [`PublishError::Rejected`].
    async fn create_status(
        &self,
        target: &CommitTarget,
        report: &StatusReport,
    ) -> Result<PublishReceipt, PublishError>;
}
