//! Trigger client for cloudbuild-report.
//!
//! Run as a build step to announce "a build for this commit has started". It
//! sends exactly one form-encoded POST to the trigger endpoint and reports
//! whether the endpoint accepted it. There is no retry and no polling; what
//! happens to the commit status afterwards is the server's business.

use std::time::Duration;

use clap::Parser;
use thiserror::Error;

/// Endpoint used when `REPORT_ENDPOINT` is not set.
pub const DEFAULT_ENDPOINT: &str = "https://cloudbuild-report.appspot.com/";

/// Values read from the build step's environment (or flags).
#[derive(Debug, Clone, Parser)]
#[command(
    name = "report-trigger",
    about = "Ask cloudbuild-report to mirror this build's status onto its commit",
    version
)]
pub struct TriggerConfig {
    /// Build identifier
    #[arg(long = "build-id", env = "REPORT_ID")]
    pub build_id: Option<String>,

    /// Cloud project that owns the build
    #[arg(long, env = "REPORT_PROJECT")]
    pub project: Option<String>,

    /// Repository owner
    #[arg(long, env = "REPORT_ORG")]
    pub org: Option<String>,

    /// Repository name
    #[arg(long, env = "REPORT_REPO")]
    pub repo: Option<String>,

    /// Optional status context suffix (e.g. "lint" -> ci/cloudbuild/lint)
    #[arg(long, env = "REPORT_CONTEXT")]
    pub context: Option<String>,

    /// Trigger endpoint URL
    #[arg(long, env = "REPORT_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Request timeout in seconds
    #[arg(long, env = "REPORT_TIMEOUT_SECS", default_value_t = 60)]
    pub timeout_secs: u64,
}

impl TriggerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Form fields to send, or the names of the missing environment variables.
    pub fn form(&self) -> Result<Vec<(&'static str, &str)>, FireError> {
        let required = [
            ("buildID", "REPORT_ID", &self.build_id),
            ("project", "REPORT_PROJECT", &self.project),
            ("org", "REPORT_ORG", &self.org),
            ("repo", "REPORT_REPO", &self.repo),
        ];

        let mut form = Vec::with_capacity(5);
        let mut missing = Vec::new();
        for (field, var, value) in required {
            match value.as_deref().filter(|v| !v.is_empty()) {
                Some(v) => form.push((field, v)),
                None => missing.push(var),
            }
        }
        if !missing.is_empty() {
            return Err(FireError::MissingConfig(missing));
        }
        if let Some(context) = self.context.as_deref().filter(|c| !c.is_empty()) {
            form.push(("context", context));
        }
        Ok(form)
    }
}

/// Why a trigger was not accepted.
#[derive(Debug, Error)]
pub enum FireError {
    #[error("missing environment variable(s): {}", .0.join(", "))]
    MissingConfig(Vec<&'static str>),

    #[error("could not reach trigger endpoint: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a client or server error.
    #[error("trigger endpoint returned HTTP {status}")]
    Rejected { status: u16, body: String },
}

/// Sends the trigger. Succeeds only if the endpoint answers below 400.
pub async fn fire(http: &reqwest::Client, config: &TriggerConfig) -> Result<(), FireError> {
    let form = config.form()?;
    tracing::info!(endpoint = %config.endpoint, ?form, "reporting");

    let response = http.post(&config.endpoint).form(&form).send().await?;
    let status = response.status();
    if status.as_u16() > 399 {
        let body = response.text().await.unwrap_or_default();
        return Err(FireError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(endpoint: String) -> TriggerConfig {
        TriggerConfig {
            build_id: Some("b1".into()),
            project: Some("proj".into()),
            org: Some("acme".into()),
            repo: Some("widgets".into()),
            context: Some("lint".into()),
            endpoint,
            timeout_secs: 5,
        }
    }

    #[test]
    fn missing_values_are_named_by_env_var() {
        let mut cfg = config(DEFAULT_ENDPOINT.into());
        cfg.org = None;
        cfg.repo = Some(String::new());
        match cfg.form().unwrap_err() {
            FireError::MissingConfig(vars) => assert_eq!(vars, vec!["REPORT_ORG", "REPORT_REPO"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn context_is_optional() {
        let mut cfg = config(DEFAULT_ENDPOINT.into());
        cfg.context = None;
        let form = cfg.form().unwrap();
        assert!(form.iter().all(|(k, _)| *k != "context"));
        assert_eq!(form.len(), 4);
    }

    #[tokio::test]
    async fn accepted_trigger_succeeds() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body("buildID=b1&project=proj&org=acme&repo=widgets&context=lint")
            .with_body("ok")
            .create_async()
            .await;

        fire(&reqwest::Client::new(), &config(format!("{}/", server.url())))
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn rejected_trigger_carries_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/")
            .with_status(400)
            .with_body("Missing parameter(s): repo")
            .create_async()
            .await;

        let err = fire(&reqwest::Client::new(), &config(format!("{}/", server.url())))
            .await
            .unwrap_err();

        match err {
            FireError::Rejected { status, body } => {
                assert_eq!(status, 400);
                assert_eq!(body, "Missing parameter(s): repo");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
