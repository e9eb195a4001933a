//! Newtype domain identifiers.
//!
//! Every value that names something on one of the two external systems is a
//! distinct newtype wrapping a `String`. This prevents accidentally passing,
//! for example, a [`ProjectId`] where an [`Organization`] is expected even
//! though both are plain strings on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Macro for String-wrapped newtypes.
// Generates: struct, new() returning Option<Self>, as_str(), Display.
// ---------------------------------------------------------------------------
macro_rules! string_id {
    (
        $(#[$attr:meta])*
        $name:ident
    ) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(String);

        impl $name {
            /// Creates a new identifier, returning `None` if the value is empty.
            pub fn new(value: impl Into<String>) -> Option<Self> {
                let v = value.into();
                if v.is_empty() { None } else { Some(Self(v)) }
            }

            /// Returns the identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Identifiers: build backend
// ---------------------------------------------------------------------------

string_id! {
    /// Identifies one build within a Cloud project (the build's UUID as issued
    /// by the build backend).
    BuildId
}

string_id! {
    /// Identifies the Cloud project that owns a build.
    ProjectId
}

// ---------------------------------------------------------------------------
// Identifiers: source host
// ---------------------------------------------------------------------------

string_id! {
    /// The account or organisation that owns a repository (`owner` in `owner/repo`).
    Organization
}

string_id! {
    /// A repository name within an [`Organization`] (`repo` in `owner/repo`).
    Repository
}

string_id! {
    /// A Git commit SHA as reported by the build's source provenance.
    CommitSha
}

// ---------------------------------------------------------------------------
// Identifiers: UUID-backed (internally generated)
// ---------------------------------------------------------------------------

/// Identifies a single reconciliation loop.
///
/// Generated fresh for every accepted trigger; attached to the loop's tracing
/// span so all log events from one loop can be correlated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReconcileRunId(Uuid);

impl ReconcileRunId {
    /// Generates a new random run identifier.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying [`Uuid`].
    pub fn as_uuid(self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for ReconcileRunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
