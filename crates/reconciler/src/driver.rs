//! The reconciliation driver: polls, publishes, sleeps, repeats.
//!
//! All decisions are delegated to [`reporting::LoopState`]; this module only
//! performs the I/O the state machine asks for and supplies the clock.

use std::sync::Arc;

use reporting::{
    BuildRef, BuildStatusProvider, CommitStatusPublisher, CommitTarget, ContextLabel, LoopPhase,
    LoopState, PublishOutcome, ReconcilePolicy, ReconcileRunId, StatusReport, Transition,
};
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};

/// Everything one loop needs, fixed at launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileJob {
    pub run_id: ReconcileRunId,
    pub build: BuildRef,
    /// Resolved once by the caller; never re-resolved by the loop.
    pub target: CommitTarget,
    pub context: ContextLabel,
    pub target_url: String,
}

/// How a loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopReport {
    /// Either [`LoopPhase::Done`] or [`LoopPhase::TimedOut`].
    pub phase: LoopPhase,
    /// Number of statuses the host accepted.
    pub published: u32,
}

/// Drives reconciliation loops against a provider and a publisher.
///
/// Cheap to clone; every launched loop holds its own clone.
#[derive(Clone)]
pub struct Reconciler {
    provider: Arc<dyn BuildStatusProvider>,
    publisher: Arc<dyn CommitStatusPublisher>,
    policy: ReconcilePolicy,
}

impl Reconciler {
    pub fn new(
        provider: Arc<dyn BuildStatusProvider>,
        publisher: Arc<dyn CommitStatusPublisher>,
        policy: ReconcilePolicy,
    ) -> Self {
        Self {
            provider,
            publisher,
            policy,
        }
    }

    pub fn policy(&self) -> ReconcilePolicy {
        self.policy
    }

    /// Runs one loop to completion with the policy's time budget.
    pub async fn run(&self, job: ReconcileJob) -> LoopReport {
        let deadline = self.policy.deadline_from(Instant::now().into_std());
        self.run_until(job, Instant::from_std(deadline)).await
    }

    /// Runs one loop to completion, giving up once `deadline` has passed.
    pub async fn run_until(&self, job: ReconcileJob, deadline: Instant) -> LoopReport {
        let span = info_span!(
            "reconcile",
            run_id = %job.run_id,
            build = %job.build,
            target = %job.target,
            context = %job.context,
        );
        self.drive(job, LoopState::with_deadline(deadline.into_std()))
            .instrument(span)
            .await
    }

    async fn drive(&self, job: ReconcileJob, mut state: LoopState) -> LoopReport {
        let mut published = 0;
        info!("reconciliation started");

        loop {
            let poll = match self.provider.get_build(&job.build).await {
                Ok(snapshot) => Some(snapshot),
                Err(err) => {
                    warn!(error = %err, "could not get build status");
                    None
                }
            };

            let Transition { state: next, action } =
                state.observe(poll.as_ref(), Instant::now().into_std());
            state = next;

            if let Some(action) = action {
                let report = StatusReport {
                    context: job.context.clone(),
                    state: action.state,
                    description: action.description.clone(),
                    target_url: job.target_url.clone(),
                };
                info!(state = %report.state, description = %report.description, "setting status");

                let outcome = match self.publisher.create_status(&job.target, &report).await {
                    Ok(receipt) => {
                        debug!(http_status = receipt.http_status, "status accepted");
                        published += 1;
                        PublishOutcome::Published(receipt.state)
                    }
                    Err(err) => {
                        warn!(error = %err, state = %report.state, "could not set commit status");
                        PublishOutcome::Failed
                    }
                };
                state = state.record(&action, outcome);
            }

            match state.phase() {
                LoopPhase::Done => {
                    info!(published, "build finished; reconciliation done");
                    break;
                }
                LoopPhase::TimedOut => {
                    warn!(published, "reconciliation timed out");
                    break;
                }
                LoopPhase::Polling | LoopPhase::Publishing => {}
            }

            tokio::time::sleep(self.policy.poll_interval).await;
        }

        LoopReport {
            phase: state.phase(),
            published,
        }
    }
}

impl std::fmt::Debug for Reconciler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reconciler")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
