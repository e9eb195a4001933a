//! Request handlers.

use axum::body::Bytes;
use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use reconciler::ReconcileJob;
use reporting::{CommitTarget, ContextLabel, ReconcileRunId};
use tracing::info;

use crate::{params, AppState, TriggerError};

/// `POST /`: resolve the build's commit and launch a detached loop.
pub async fn report(
    State(app): State<AppState>,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, TriggerError> {
    let form_body = is_form(&headers).then_some(&body[..]);
    let request = params::parse(query.as_deref(), form_body)?;

    let context = ContextLabel::new(&app.settings.base_context, request.context.as_deref());

    let snapshot = app
        .provider
        .get_build(&request.build)
        .await
        .map_err(|source| TriggerError::BuildLookup {
            build: request.build.clone(),
            source,
        })?;

    let target = CommitTarget::resolve(request.org, request.repo, &snapshot).ok_or_else(|| {
        TriggerError::MissingProvenance {
            dump: format!("{:#?}", snapshot.provenance),
        }
    })?;

    let job = ReconcileJob {
        run_id: ReconcileRunId::new_random(),
        target_url: app.settings.target_url.render(&request.build),
        build: request.build,
        target,
        context,
    };
    info!(
        run_id = %job.run_id,
        build = %job.build,
        target = %job.target,
        context = %job.context,
        "launching reconciliation"
    );
    app.launcher.launch(job);

    Ok("ok")
}

/// Any non-POST request to `/`.
pub async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "POST please",
    )
}

/// `GET /healthz`
pub async fn healthz() -> &'static str {
    "ok"
}

fn is_form(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"))
}
