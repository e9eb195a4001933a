//! Reconciliation loop state machine.
//!
//! The loop's policy (dedup, deadline, retry, stop-on-terminal) lives here as
//! two pure transition functions so it can be exercised without a runtime or
//! any network fakes:
//!
//! ```text
//!            observe(poll, now)                  record(outcome)
//! Polling ───────────────────────▶ Publishing ─────────────────────▶ Polling
//!    │  │                                          │
//!    │  └─ already published & terminal ─▶ Done ◀──┘ published & terminal
//!    └──── now > deadline ─────────────▶ TimedOut
//! ```
//!
//! The caller (the driver in the `reconciler` crate) supplies the clock and
//! performs the publish; this module only decides.

use std::time::{Duration, Instant};

use crate::{translate, BuildSnapshot, CommitState};

/// Timing policy for one loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilePolicy {
    /// Pause between iterations.
    pub poll_interval: Duration,
    /// Total time budget measured from loop start.
    pub budget: Duration,
}

impl ReconcilePolicy {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);
    pub const DEFAULT_BUDGET: Duration = Duration::from_secs(30 * 60);

    /// Longest budget a loop can be given.
    pub const MAX_BUDGET: Duration = Duration::from_secs(365 * 24 * 60 * 60);

    /// Deadline for a loop starting at `now`.
    ///
    /// Budgets above [`Self::MAX_BUDGET`] are clamped to it.
    pub fn deadline_from(&self, now: Instant) -> Instant {
        let budget = self.budget.min(Self::MAX_BUDGET);
        now.checked_add(budget).unwrap_or(now)
    }
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            budget: Self::DEFAULT_BUDGET,
        }
    }
}

// ---------------------------------------------------------------------------

/// Where a loop is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    /// Waiting for the next snapshot.
    Polling,
    /// A publish has been decided and its outcome is pending.
    Publishing,
    /// A terminal build status has been published. The loop stops.
    Done,
    /// The time budget ran out. The loop stops without a final publish.
    TimedOut,
}

impl LoopPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::TimedOut)
    }
}

/// A publish the driver should attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishAction {
    pub state: CommitState,
    pub description: String,
    /// Whether the snapshot behind this action had a terminal build status.
    pub terminal: bool,
}

/// What happened when the driver attempted a [`PublishAction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The host accepted the status and echoed this state back.
    Published(CommitState),
    /// Transport failure or HTTP error; nothing was recorded.
    Failed,
}

/// Result of [`LoopState::observe`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: LoopState,
    pub action: Option<PublishAction>,
}

// ---------------------------------------------------------------------------

/// State owned by exactly one reconciliation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoopState {
    phase: LoopPhase,
    last_published: Option<CommitState>,
    deadline: Instant,
}

impl LoopState {
    /// State for a loop starting at `now`.
    pub fn start(now: Instant, policy: &ReconcilePolicy) -> Self {
        Self::with_deadline(policy.deadline_from(now))
    }

    /// State for a loop with an explicit deadline.
    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            phase: LoopPhase::Polling,
            last_published: None,
            deadline,
        }
    }

    pub fn phase(&self) -> LoopPhase {
        self.phase
    }

    pub fn last_published(&self) -> Option<CommitState> {
        self.last_published
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Folds in the result of one poll.
    ///
    /// `poll` is `None` when the provider call failed. The deadline is checked
    /// after the poll, so failed polls still count toward the budget.
    pub fn observe(self, poll: Option<&BuildSnapshot>, now: Instant) -> Transition {
        if self.phase.is_terminal() {
            return Transition { state: self, action: None };
        }
        if now > self.deadline {
            return Transition {
                state: Self { phase: LoopPhase::TimedOut, ..self },
                action: None,
            };
        }
        let Some(snapshot) = poll else {
            return Transition {
                state: Self { phase: LoopPhase::Polling, ..self },
                action: None,
            };
        };

        let terminal = snapshot.status.is_terminal();
        let translation = translate(snapshot);

        if self.last_published == Some(translation.state) {
            let phase = if terminal { LoopPhase::Done } else { LoopPhase::Polling };
            return Transition {
                state: Self { phase, ..self },
                action: None,
            };
        }

        Transition {
            state: Self { phase: LoopPhase::Publishing, ..self },
            action: Some(PublishAction {
                state: translation.state,
                description: translation.description,
                terminal,
            }),
        }
    }

    /// Folds in the outcome of publishing `action`.
    pub fn record(self, action: &PublishAction, outcome: PublishOutcome) -> Self {
        if self.phase.is_terminal() {
            return self;
        }
        match outcome {
            PublishOutcome::Published(state) => Self {
                phase: if action.terminal { LoopPhase::Done } else { LoopPhase::Polling },
                last_published: Some(state),
                ..self
            },
            PublishOutcome::Failed => Self {
                phase: LoopPhase::Polling,
                ..self
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuildStatus;

    fn snap(status: BuildStatus) -> BuildSnapshot {
        BuildSnapshot {
            status,
            start_time: None,
            finish_time: None,
            provenance: None,
        }
    }

    fn fresh(now: Instant) -> LoopState {
        LoopState::start(now, &ReconcilePolicy::default())
    }

    #[test]
    fn oversized_budget_is_clamped() {
        let now = Instant::now();
        let policy = ReconcilePolicy {
            budget: Duration::from_secs(u64::MAX),
            ..ReconcilePolicy::default()
        };
        let state = LoopState::start(now, &policy);
        assert_eq!(state.deadline(), now + ReconcilePolicy::MAX_BUDGET);

        let t = state.observe(Some(&snap(BuildStatus::Working)), now);
        assert_eq!(t.state.phase(), LoopPhase::Publishing);
    }

    #[test]
    fn first_observation_requests_publish() {
        let now = Instant::now();
        let t = fresh(now).observe(Some(&snap(BuildStatus::Queued)), now);
        assert_eq!(t.state.phase(), LoopPhase::Publishing);
        let action = t.action.unwrap();
        assert_eq!(action.state, CommitState::Pending);
        assert_eq!(action.description, "QUEUED");
        assert!(!action.terminal);
    }

    #[test]
    fn same_state_after_publish_is_deduplicated() {
        let now = Instant::now();
        let t = fresh(now).observe(Some(&snap(BuildStatus::Queued)), now);
        let action = t.action.unwrap();
        let state = t.state.record(&action, PublishOutcome::Published(CommitState::Pending));
        assert_eq!(state.phase(), LoopPhase::Polling);

        // QUEUED -> WORKING is still `pending`: nothing to publish.
        let t = state.observe(Some(&snap(BuildStatus::Working)), now);
        assert!(t.action.is_none());
        assert_eq!(t.state.phase(), LoopPhase::Polling);
    }

    #[test]
    fn failed_publish_is_retried_on_next_observation() {
        let now = Instant::now();
        let t = fresh(now).observe(Some(&snap(BuildStatus::Working)), now);
        let action = t.action.unwrap();
        let state = t.state.record(&action, PublishOutcome::Failed);
        assert_eq!(state.last_published(), None);
        assert_eq!(state.phase(), LoopPhase::Polling);

        let t = state.observe(Some(&snap(BuildStatus::Working)), now);
        assert_eq!(t.action.unwrap().state, CommitState::Pending);
    }

    #[test]
    fn poll_failure_publishes_nothing() {
        let now = Instant::now();
        let t = fresh(now).observe(None, now);
        assert!(t.action.is_none());
        assert_eq!(t.state.phase(), LoopPhase::Polling);
    }

    #[test]
    fn past_deadline_times_out_without_action() {
        let now = Instant::now();
        let state = LoopState::with_deadline(now);
        let later = now + Duration::from_millis(1);
        let t = state.observe(Some(&snap(BuildStatus::Success)), later);
        assert!(t.action.is_none());
        assert_eq!(t.state.phase(), LoopPhase::TimedOut);
    }

    #[test]
    fn deadline_applies_even_when_poll_failed() {
        let now = Instant::now();
        let t = LoopState::with_deadline(now).observe(None, now + Duration::from_secs(1));
        assert_eq!(t.state.phase(), LoopPhase::TimedOut);
    }

    #[test]
    fn terminal_publish_finishes_loop() {
        let now = Instant::now();
        let t = fresh(now).observe(Some(&snap(BuildStatus::Failure)), now);
        let action = t.action.unwrap();
        assert!(action.terminal);
        let state = t.state.record(&action, PublishOutcome::Published(CommitState::Failure));
        assert_eq!(state.phase(), LoopPhase::Done);

        // Terminal phases absorb further observations.
        let t = state.observe(Some(&snap(BuildStatus::Working)), now);
        assert!(t.action.is_none());
        assert_eq!(t.state.phase(), LoopPhase::Done);
    }

    #[test]
    fn terminal_status_already_reflected_finishes_without_publish() {
        let now = Instant::now();
        // PENDING (awaiting approval) maps to `error` but is not terminal.
        let t = fresh(now).observe(Some(&snap(BuildStatus::Pending)), now);
        let action = t.action.unwrap();
        assert!(!action.terminal);
        let state = t.state.record(&action, PublishOutcome::Published(CommitState::Error));
        assert_eq!(state.phase(), LoopPhase::Polling);

        let t = state.observe(Some(&snap(BuildStatus::Cancelled)), now);
        assert!(t.action.is_none());
        assert_eq!(t.state.phase(), LoopPhase::Done);
    }

    #[test]
    fn recorded_state_is_what_the_host_echoed() {
        let now = Instant::now();
        let t = fresh(now).observe(Some(&snap(BuildStatus::Working)), now);
        let action = t.action.unwrap();
        let state = t.state.record(&action, PublishOutcome::Published(CommitState::Pending));
        assert_eq!(state.last_published(), Some(CommitState::Pending));
    }
}
