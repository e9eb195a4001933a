//! Error types produced by the two external ports.
//!
//! The reconciliation loop treats every variant as transient: it logs the
//! failure and tries again on the next iteration until its time budget runs
//! out. The Trigger Endpoint, which performs one synchronous lookup, maps
//! [`ProviderError`] to a server error instead.

use thiserror::Error;

/// Failure to obtain a build snapshot from the build backend.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced a response (DNS, connect, TLS, timeout).
    #[error("build backend unreachable: {message}")]
    Transport { message: String },

    /// The backend answered with a non-success HTTP status.
    #[error("build backend returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The backend answered successfully but the payload could not be decoded.
    #[error("malformed build payload: {message}")]
    Decode { message: String },

    /// No credential was available to authenticate the request.
    #[error("build backend credentials unavailable: {message}")]
    Credentials { message: String },
}

/// Failure to publish a commit status.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The request never produced a response.
    #[error("status API unreachable: {message}")]
    Transport { message: String },

    /// The status API rejected the update (HTTP status above 399).
    #[error("status API rejected update with HTTP {status}: {body}")]
    Rejected { status: u16, body: String },

    /// The status API accepted the update but its response could not be decoded.
    #[error("malformed status response: {message}")]
    Decode { message: String },
}
