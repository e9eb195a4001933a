//! `report-trigger`: announce a started build to the report endpoint.
//!
//! Run as a build step. Exits non-zero when the endpoint cannot be reached or
//! rejects the request, echoing the endpoint's response body to stderr.

use std::io::IsTerminal;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use trigger::{fire, FireError, TriggerConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();

    let config = TriggerConfig::parse();

    let http = reqwest::Client::builder()
        .user_agent(concat!("report-trigger/", env!("CARGO_PKG_VERSION")))
        .timeout(config.timeout())
        .build()
        .context("could not build HTTP client")?;

    if let Err(err) = fire(&http, &config).await {
        if let FireError::Rejected { body, .. } = &err {
            eprintln!("{body}");
        }
        return Err(err).context("could not report build status");
    }

    tracing::info!("Reported build status.");
    Ok(())
}
