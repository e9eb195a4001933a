//! Trigger endpoint for cloudbuild-report.
//!
//! One route, `POST /`, announces "a build for this commit has started". The
//! handler validates the parameters, resolves the commit SHA with a single
//! synchronous build lookup, answers `ok`, and hands the rest to a detached
//! reconciliation loop through [`reconciler::ReconcileLauncher`]. The caller
//! learns nothing about how that loop later fares; its outcome is log-only.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Request parsing and HTTP status mapping live here. The
//! endpoint depends on the [`reporting::BuildStatusProvider`] port and the
//! launcher seam, never on concrete adapters.
//!
//! ## Responses
//!
//! | Condition | Status |
//! |-----------|--------|
//! | Accepted, loop launched | 200 `ok` |
//! | Required parameter missing | 400 |
//! | Method other than POST | 405 |
//! | Build lookup failed / no commit in provenance | 500 |

pub mod error;
pub mod params;
pub mod routes;
pub mod state;

use std::future::Future;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

pub use error::TriggerError;
pub use state::{AppState, ReportSettings};

/// Build the axum Router with the trigger and health routes.
/// Used by [`serve`] and available for integration testing.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            post(routes::report).fallback(routes::method_not_allowed),
        )
        .route("/healthz", get(routes::healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the trigger endpoint on a pre-bound listener until `shutdown` resolves.
///
/// Loops already launched are not awaited; they die with the process.
pub async fn serve<F>(
    listener: tokio::net::TcpListener,
    state: AppState,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "trigger endpoint listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
