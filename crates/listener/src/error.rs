//! Endpoint errors and their HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reporting::{BuildRef, ProviderError};
use thiserror::Error;

/// Errors surfaced synchronously to the trigger caller.
///
/// Bodies are plain text so the trigger client can copy them straight to
/// standard error.
#[derive(Debug, Error)]
pub enum TriggerError {
    /// One or more required parameters were absent or empty.
    #[error("Missing parameter(s): {}", .0.join(", "))]
    MissingParameters(Vec<&'static str>),

    /// The query string or form body could not be decoded.
    #[error("Malformed parameters: {0}")]
    MalformedBody(String),

    /// The one synchronous build lookup failed.
    #[error("Could not get build status {build}: {source}")]
    BuildLookup {
        build: BuildRef,
        #[source]
        source: ProviderError,
    },

    /// The build has no resolvable commit SHA; `dump` is the provenance as received.
    #[error("Missing CommitSHA from source provenance: {dump}")]
    MissingProvenance { dump: String },
}

impl TriggerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameters(_) | Self::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Self::BuildLookup { .. } | Self::MissingProvenance { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for TriggerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "trigger failed");
        } else {
            tracing::info!(error = %self, "trigger rejected");
        }
        (status, self.to_string()).into_response()
    }
}
