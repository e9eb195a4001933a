//! Cloud Build v1 JSON shapes. Only the fields the reporter reads are modelled.

use reporting::{BuildSnapshot, BuildStatus, RepoSource, SourceProvenance, StorageSource};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Build {
    #[serde(default)]
    pub status: String,
    pub start_time: Option<String>,
    pub finish_time: Option<String>,
    pub source_provenance: Option<Provenance>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Provenance {
    pub resolved_repo_source: Option<WireRepoSource>,
    pub resolved_storage_source: Option<WireStorageSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WireRepoSource {
    pub project_id: Option<String>,
    pub repo_name: Option<String>,
    pub branch_name: Option<String>,
    pub tag_name: Option<String>,
    pub commit_sha: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireStorageSource {
    pub bucket: Option<String>,
    pub object: Option<String>,
    pub generation: Option<String>,
}

impl From<Build> for BuildSnapshot {
    fn from(build: Build) -> Self {
        BuildSnapshot {
            status: BuildStatus::parse(&build.status),
            start_time: build.start_time,
            finish_time: build.finish_time,
            provenance: build.source_provenance.map(|p| SourceProvenance {
                resolved_repo_source: p.resolved_repo_source.map(|r| RepoSource {
                    project_id: r.project_id,
                    repo_name: r.repo_name,
                    branch_name: r.branch_name,
                    tag_name: r.tag_name,
                    commit_sha: r.commit_sha,
                }),
                resolved_storage_source: p.resolved_storage_source.map(|s| StorageSource {
                    bucket: s.bucket,
                    object: s.object,
                    generation: s.generation,
                }),
            }),
        }
    }
}

/// Token response from the metadata server.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    pub expires_in: u64,
}
