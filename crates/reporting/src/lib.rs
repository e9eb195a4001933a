//! Core domain for cloudbuild-report.
//!
//! This crate contains every domain concept used to mirror a build's lifecycle
//! onto a commit status: newtype identifiers, build snapshots, status reports,
//! the pure status translator, and the explicit state machine that the
//! reconciliation loop drives. Infrastructure crates implement the port traits
//! defined here; they never add domain rules.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is needed; infrastructure crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`BuildId`, `CommitSha`, `ReconcileRunId`, etc.) |
//! | [`types`] | Value types (`BuildSnapshot`, `StatusReport`, `ContextLabel`, etc.) |
//! | [`translate`] | Build status → commit status mapping |
//! | [`machine`] | Reconciliation loop state machine and policy |
//! | [`ports`] | `BuildStatusProvider` and `CommitStatusPublisher` traits |
//! | [`errors`] | Port error types |

pub mod errors;
pub mod identifiers;
pub mod machine;
pub mod ports;
pub mod translate;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{ProviderError, PublishError};
pub use identifiers::{BuildId, CommitSha, Organization, ProjectId, ReconcileRunId, Repository};
pub use machine::{
    LoopPhase, LoopState, PublishAction, PublishOutcome, ReconcilePolicy, Transition,
};
pub use ports::{BuildStatusProvider, CommitStatusPublisher};
pub use translate::{format_elapsed, translate, Translation};
pub use types::{
    BuildRef, BuildSnapshot, BuildStatus, CommitState, CommitTarget, ContextLabel,
    PublishReceipt, RepoSource, SourceProvenance, StatusReport, StorageSource, TargetUrlTemplate,
};
