//! cloudbuild-report server entry point.
//!
//! This binary is the composition root for the entire system. Responsibilities:
//!
//! 1. **Parse configuration**: flags with environment fallbacks ([`config`]).
//! 2. **Wire observability**: `tracing-subscriber` with an optional JSON
//!    layer and an optional OpenTelemetry OTLP exporter ([`telemetry`]).
//! 3. **Resolve credentials**: the GitHub token and the Cloud Build token
//!    source, once, at startup ([`credentials`]).
//! 4. **Construct infrastructure**: `CloudBuildClient`, `GithubClient` and the
//!    `Reconciler`, injected into the trigger endpoint's `AppState`. Nothing is
//!    held in process-wide statics.
//! 5. **Serve** until SIGINT/SIGTERM. Loops still running are abandoned.

mod config;
mod credentials;
mod telemetry;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use cloudbuild::{CloudBuildClient, MetadataClient};
use github::GithubClient;
use listener::AppState;
use reconciler::Reconciler;
use reporting::{BuildStatusProvider, CommitStatusPublisher};
use tracing::{info, warn};

use crate::config::ServeConfig;

const USER_AGENT: &str = concat!("cloudbuild-report/", env!("CARGO_PKG_VERSION"));

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServeConfig::parse();
    let telemetry = telemetry::init(config.log_json, config.otlp_endpoint.as_deref())?;

    let result = run(config).await;
    if let Err(err) = &result {
        let chain = format!("{err:#}");
        tracing::error!(error = %chain, "server exited with error");
    }
    telemetry.shutdown();
    result
}

async fn run(config: ServeConfig) -> anyhow::Result<()> {
    let http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.http_timeout())
        .build()
        .context("could not build HTTP client")?;

    let metadata = MetadataClient::from_env(http.clone());
    let github_token = credentials::github_token(&config, &metadata).await?;
    let tokens = credentials::cloudbuild_tokens(&config, metadata);

    let provider: Arc<dyn BuildStatusProvider> = Arc::new(CloudBuildClient::new(
        http.clone(),
        &config.cloudbuild_api_url,
        tokens,
    ));
    let publisher: Arc<dyn CommitStatusPublisher> = Arc::new(GithubClient::new(
        http,
        &config.github_api_url,
        github_token,
    ));

    let policy = config.policy();
    info!(
        poll_interval_secs = policy.poll_interval.as_secs(),
        budget_secs = policy.budget.as_secs(),
        base_context = %config.base_context,
        "starting cloudbuild-report"
    );
    let reconciler = Reconciler::new(provider.clone(), publisher, policy);
    let state = AppState::new(provider, Arc::new(reconciler), config.settings());

    let socket = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("could not bind port {}", config.port))?;
    listener::serve(socket, state, shutdown_signal()).await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "could not listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "could not listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown requested");
}
