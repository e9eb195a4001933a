//! Adapter-level errors.

use reporting::ProviderError;
use thiserror::Error;

/// Errors raised by the metadata server client and token sources.
#[derive(Debug, Error)]
pub enum CloudBuildError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The metadata server answered with a non-success status.
    #[error("metadata server returned HTTP {status} for {path}")]
    Metadata { status: u16, path: String },

    /// The metadata server answered but the value was empty.
    #[error("metadata value {path} is empty")]
    EmptyValue { path: String },
}

impl From<CloudBuildError> for ProviderError {
    fn from(err: CloudBuildError) -> Self {
        ProviderError::Credentials {
            message: err.to_string(),
        }
    }
}
