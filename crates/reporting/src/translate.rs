//! Build status → commit status translation.
//!
//! [`translate`] is total: every [`BuildStatus`] maps to exactly one
//! [`CommitState`], with `error` as the catch-all. It performs no I/O and does
//! not read the clock.

use chrono::DateTime;

use crate::{BuildSnapshot, BuildStatus, CommitState};

/// The commit-status view of one build snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub state: CommitState,
    pub description: String,
}

/// Maps a snapshot to a commit state and a human-readable description.
///
/// Successful builds whose start and finish times both parse as RFC 3339 get
/// the elapsed time appended, e.g. `SUCCESS (1m5s)`. Every other case, and any
/// timestamp that fails to parse, yields the raw status text unchanged.
pub fn translate(snapshot: &BuildSnapshot) -> Translation {
    let raw = snapshot.status.as_str();
    let state = match snapshot.status {
        BuildStatus::Working | BuildStatus::Queued => CommitState::Pending,
        BuildStatus::Failure => CommitState::Failure,
        BuildStatus::Success => CommitState::Success,
        _ => CommitState::Error,
    };

    let description = match (state, elapsed_seconds(snapshot)) {
        (CommitState::Success, Some(secs)) => format!("{raw} ({})", format_elapsed(secs)),
        _ => raw.to_string(),
    };

    Translation { state, description }
}

/// Whole seconds between start and finish, truncated toward zero.
fn elapsed_seconds(snapshot: &BuildSnapshot) -> Option<i64> {
    let start = DateTime::parse_from_rfc3339(snapshot.start_time.as_deref()?).ok()?;
    let finish = DateTime::parse_from_rfc3339(snapshot.finish_time.as_deref()?).ok()?;
    Some((finish - start).num_seconds())
}

/// Formats whole seconds as `1h2m3s`, `4m0s`, `7s` (leading zero units are
/// omitted, inner ones are not). Negative spans carry a leading `-`.
pub fn format_elapsed(secs: i64) -> String {
    let sign = if secs < 0 { "-" } else { "" };
    let total = secs.unsigned_abs();
    let (h, m, s) = (total / 3600, (total % 3600) / 60, total % 60);
    if h > 0 {
        format!("{sign}{h}h{m}m{s}s")
    } else if m > 0 {
        format!("{sign}{m}m{s}s")
    } else {
        format!("{sign}{s}s")
    }
}
