//! Google Cloud infrastructure adapter for cloudbuild-report.
//!
//! Implements [`reporting::BuildStatusProvider`] over the Cloud Build REST API
//! (`GET /v1/projects/{project}/builds/{id}`) and supplies the credentials the
//! service needs at startup from the GCE metadata server.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport, bearer-token handling, and the Cloud
//! Build JSON shape all live here. The [`reporting`] crate sees only
//! [`reporting::BuildSnapshot`] and [`reporting::ProviderError`].
//!
//! ## Credentials
//!
//! | Need | Source |
//! |------|--------|
//! | Cloud Build access token | [`StaticToken`] (explicit token) or [`MetadataTokenSource`] (service account on the metadata server, cached until shortly before expiry) |
//! | GitHub token fallback | [`MetadataClient::project_attribute`] (`github_token`) |

mod auth;
mod client;
mod error;
mod metadata;
mod wire;

pub use auth::{MetadataTokenSource, StaticToken, TokenSource};
pub use client::CloudBuildClient;
pub use error::CloudBuildError;
pub use metadata::{AccessToken, MetadataClient};
