//! Shared handler state.

use std::sync::Arc;

use reconciler::ReconcileLauncher;
use reporting::{BuildStatusProvider, ContextLabel, TargetUrlTemplate};

/// Per-deployment settings applied to every accepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportSettings {
    /// Base context label; a request's `context` suffix is appended to it.
    pub base_context: String,
    pub target_url: TargetUrlTemplate,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            base_context: ContextLabel::DEFAULT_BASE.to_string(),
            target_url: TargetUrlTemplate::default(),
        }
    }
}

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub provider: Arc<dyn BuildStatusProvider>,
    pub launcher: Arc<dyn ReconcileLauncher>,
    pub settings: Arc<ReportSettings>,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn BuildStatusProvider>,
        launcher: Arc<dyn ReconcileLauncher>,
        settings: ReportSettings,
    ) -> Self {
        Self {
            provider,
            launcher,
            settings: Arc::new(settings),
        }
    }
}
