//! Reconciliation loop driver for cloudbuild-report.
//!
//! This crate owns the only long-lived work in the system: one loop per
//! accepted trigger that polls the build backend, asks the
//! [`reporting::LoopState`] machine what to do, and publishes commit statuses.
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** The driver sequences calls between the pure state
//! machine in [`reporting`] and the two port traits. It contains no mapping or
//! dedup rules of its own.
//!
//! ## Detached execution
//!
//! Loops are launched with [`spawn_detached`]: the task handle is dropped on
//! the spot. Nothing joins, cancels, or observes a loop once launched; its
//! outcome exists only in the logs.

mod driver;
mod launcher;

pub use driver::{LoopReport, ReconcileJob, Reconciler};
pub use launcher::{spawn_detached, ReconcileLauncher};
