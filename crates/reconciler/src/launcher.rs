//! Fire-and-forget launching of reconciliation loops.

use std::future::Future;

use crate::{ReconcileJob, Reconciler};

/// Spawns `task` on the current Tokio runtime and forgets it.
///
/// There is no handle, no join, and no cancellation. The task ends when its
/// own logic says so or when the process exits.
pub fn spawn_detached<F>(task: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    drop(tokio::spawn(task));
}

/// Starts a reconciliation loop without waiting for it.
///
/// The Trigger Endpoint depends on this seam rather than on [`Reconciler`]
/// directly.
pub trait ReconcileLauncher: Send + Sync {
    fn launch(&self, job: ReconcileJob);
}

impl ReconcileLauncher for Reconciler {
    fn launch(&self, job: ReconcileJob) {
        let reconciler = self.clone();
        spawn_detached(async move {
            reconciler.run(job).await;
        });
    }
}
