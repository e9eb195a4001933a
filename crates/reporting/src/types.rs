//! Shared value types for the reporting domain.
//!
//! Unlike the newtype identifiers in [`crate::identifiers`], these types carry
//! structure: a build snapshot as observed on one poll, the commit a loop
//! reports against, and the status report pushed to the source host.

use serde::{Deserialize, Serialize};

use crate::{BuildId, CommitSha, Organization, ProjectId, Repository};

// ---------------------------------------------------------------------------
// Build side
// ---------------------------------------------------------------------------

/// Lookup key for a build: the owning project plus the build's identifier.
///
/// Created once at trigger time and reused for every poll of the loop.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildRef {
    pub project: ProjectId,
    pub build_id: BuildId,
}

impl BuildRef {
    pub fn new(project: ProjectId, build_id: BuildId) -> Self {
        Self { project, build_id }
    }
}

impl std::fmt::Display for BuildRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.project, self.build_id)
    }
}

// ---------------------------------------------------------------------------

/// Raw build status as reported by the build backend.
///
/// The known values are listed explicitly; anything else is preserved verbatim
/// in [`BuildStatus::Other`] so the description published downstream always
/// shows exactly what the backend said.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BuildStatus {
    StatusUnknown,
    Pending,
    Queued,
    Working,
    Success,
    Failure,
    InternalError,
    Timeout,
    Cancelled,
    Expired,
    /// A value this crate does not recognise (including the empty string).
    Other(String),
}

impl BuildStatus {
    /// Parses a raw status string. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "STATUS_UNKNOWN" => Self::StatusUnknown,
            "PENDING" => Self::Pending,
            "QUEUED" => Self::Queued,
            "WORKING" => Self::Working,
            "SUCCESS" => Self::Success,
            "FAILURE" => Self::Failure,
            "INTERNAL_ERROR" => Self::InternalError,
            "TIMEOUT" => Self::Timeout,
            "CANCELLED" => Self::Cancelled,
            "EXPIRED" => Self::Expired,
            other => Self::Other(other.to_string()),
        }
    }

    /// Returns the status exactly as the backend spells it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::StatusUnknown => "STATUS_UNKNOWN",
            Self::Pending => "PENDING",
            Self::Queued => "QUEUED",
            Self::Working => "WORKING",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::Expired => "EXPIRED",
            Self::Other(raw) => raw,
        }
    }

    /// Returns `true` once the build can no longer change status.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success
                | Self::Failure
                | Self::InternalError
                | Self::Timeout
                | Self::Cancelled
                | Self::Expired
        )
    }
}

impl From<String> for BuildStatus {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<BuildStatus> for String {
    fn from(status: BuildStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// A repository source as resolved by the build backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSource {
    pub project_id: Option<String>,
    pub repo_name: Option<String>,
    pub branch_name: Option<String>,
    pub tag_name: Option<String>,
    pub commit_sha: Option<String>,
}

/// An archive source in object storage as resolved by the build backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageSource {
    pub bucket: Option<String>,
    pub object: Option<String>,
    pub generation: Option<String>,
}

/// Provenance metadata linking a build to the source it built.
///
/// Kept structurally close to what the backend returns so that, when no commit
/// can be resolved, the whole thing can be dumped for diagnosis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceProvenance {
    pub resolved_repo_source: Option<RepoSource>,
    pub resolved_storage_source: Option<StorageSource>,
}

// ---------------------------------------------------------------------------

/// One observation of a build, produced fresh by every poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSnapshot {
    pub status: BuildStatus,
    /// RFC 3339 start time, verbatim from the backend.
    pub start_time: Option<String>,
    /// RFC 3339 finish time, verbatim from the backend.
    pub finish_time: Option<String>,
    pub provenance: Option<SourceProvenance>,
}

impl BuildSnapshot {
    /// Returns the resolved commit SHA, if the provenance carries a non-empty one.
    pub fn commit_sha(&self) -> Option<CommitSha> {
        self.provenance
            .as_ref()?
            .resolved_repo_source
            .as_ref()?
            .commit_sha
            .clone()
            .and_then(CommitSha::new)
    }
}

// ---------------------------------------------------------------------------
// Source host side
// ---------------------------------------------------------------------------

/// The commit a loop reports against. Fixed for the loop's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommitTarget {
    pub org: Organization,
    pub repo: Repository,
    pub sha: CommitSha,
}

impl CommitTarget {
    /// Resolves the target from the first snapshot's provenance.
    ///
    /// Returns `None` when the snapshot has no usable commit SHA.
    pub fn resolve(org: Organization, repo: Repository, snapshot: &BuildSnapshot) -> Option<Self> {
        let sha = snapshot.commit_sha()?;
        Some(Self { org, repo, sha })
    }
}

impl std::fmt::Display for CommitTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}@{}", self.org, self.repo, self.sha)
    }
}

// ---------------------------------------------------------------------------

/// Commit status vocabulary understood by the source host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    Pending,
    Success,
    Failure,
    Error,
}

impl CommitState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------

/// Namespaced label identifying which check a commit status represents.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextLabel(String);

impl ContextLabel {
    /// Default base label used when none is configured.
    pub const DEFAULT_BASE: &'static str = "ci/cloudbuild";

    /// Builds a label from `base` and an optional caller-supplied suffix.
    ///
    /// The suffix keeps only ASCII letters and digits; everything else,
    /// including all non-ASCII characters, is dropped. A present suffix always
    /// adds the `/` separator, even if nothing survives sanitisation.
    pub fn new(base: &str, suffix: Option<&str>) -> Self {
        match suffix {
            Some(raw) if !raw.is_empty() => {
                let clean: String = raw.chars().filter(char::is_ascii_alphanumeric).collect();
                Self(format!("{base}/{clean}"))
            }
            _ => Self(base.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ContextLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------

/// Template for the link attached to every published status.
///
/// `{build_id}` and `{project}` are substituted from the [`BuildRef`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetUrlTemplate(String);

impl TargetUrlTemplate {
    pub const DEFAULT: &'static str =
        "https://console.cloud.google.com/cloud-build/builds/{build_id}?project={project}";

    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    pub fn render(&self, build: &BuildRef) -> String {
        self.0
            .replace("{build_id}", build.build_id.as_str())
            .replace("{project}", build.project.as_str())
    }
}

impl Default for TargetUrlTemplate {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

// ---------------------------------------------------------------------------

/// A status update to publish for one commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub context: ContextLabel,
    pub state: CommitState,
    pub description: String,
    pub target_url: String,
}

/// What the source host acknowledged after a successful publish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReceipt {
    /// The state the host recorded.
    pub state: CommitState,
    /// HTTP status code of the create call.
    pub http_status: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_sha(sha: Option<&str>) -> BuildSnapshot {
        BuildSnapshot {
            status: BuildStatus::Working,
            start_time: None,
            finish_time: None,
            provenance: Some(SourceProvenance {
                resolved_repo_source: Some(RepoSource {
                    commit_sha: sha.map(str::to_string),
                    ..RepoSource::default()
                }),
                resolved_storage_source: None,
            }),
        }
    }

    #[test]
    fn context_suffix_keeps_only_ascii_alphanumerics() {
        let label = ContextLabel::new("ci/cloudbuild", Some("fo!o_1"));
        assert_eq!(label.as_str(), "ci/cloudbuild/foo1");
    }

    #[test]
    fn context_suffix_drops_non_ascii_letters_and_digits() {
        let label = ContextLabel::new("ci/cloudbuild", Some("déf٣9"));
        assert_eq!(label.as_str(), "ci/cloudbuild/df9");
    }

    #[test]
    fn missing_or_empty_suffix_yields_base() {
        assert_eq!(ContextLabel::new("ci/cloudbuild", None).as_str(), "ci/cloudbuild");
        assert_eq!(ContextLabel::new("ci/cloudbuild", Some("")).as_str(), "ci/cloudbuild");
    }

    #[test]
    fn suffix_that_sanitises_to_nothing_keeps_separator() {
        assert_eq!(
            ContextLabel::new("ci/cloudbuild", Some("-_-")).as_str(),
            "ci/cloudbuild/"
        );
    }

    #[test]
    fn build_status_round_trips_raw_text() {
        for raw in ["WORKING", "SUCCESS", "INTERNAL_ERROR", "SOMETHING_NEW", ""] {
            assert_eq!(BuildStatus::parse(raw).as_str(), raw);
        }
        assert_eq!(
            BuildStatus::parse("SOMETHING_NEW"),
            BuildStatus::Other("SOMETHING_NEW".to_string())
        );
    }

    #[test]
    fn build_status_deserialises_from_plain_string() {
        let status: BuildStatus = serde_json::from_str("\"QUEUED\"").unwrap();
        assert_eq!(status, BuildStatus::Queued);
    }

    #[test]
    fn only_finished_statuses_are_terminal() {
        assert!(BuildStatus::Success.is_terminal());
        assert!(BuildStatus::Cancelled.is_terminal());
        assert!(!BuildStatus::Working.is_terminal());
        assert!(!BuildStatus::Pending.is_terminal());
        assert!(!BuildStatus::Other("X".into()).is_terminal());
    }

    #[test]
    fn commit_target_requires_non_empty_sha() {
        let org = Organization::new("acme").unwrap();
        let repo = Repository::new("widgets").unwrap();

        let ok = CommitTarget::resolve(org.clone(), repo.clone(), &snapshot_with_sha(Some("abc123")));
        assert_eq!(ok.unwrap().sha.as_str(), "abc123");

        assert!(CommitTarget::resolve(org.clone(), repo.clone(), &snapshot_with_sha(Some(""))).is_none());
        assert!(CommitTarget::resolve(org, repo, &snapshot_with_sha(None)).is_none());
    }

    #[test]
    fn target_url_substitutes_build_and_project() {
        let build = BuildRef::new(
            ProjectId::new("my-proj").unwrap(),
            BuildId::new("b-42").unwrap(),
        );
        assert_eq!(
            TargetUrlTemplate::default().render(&build),
            "https://console.cloud.google.com/cloud-build/builds/b-42?project=my-proj"
        );
    }

    #[test]
    fn commit_state_serialises_lowercase() {
        assert_eq!(serde_json::to_string(&CommitState::Failure).unwrap(), "\"failure\"");
    }
}
