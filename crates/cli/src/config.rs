//! Server configuration. Every knob is a flag with an environment fallback so
//! the binary can be configured entirely from the deployment descriptor.

use std::time::Duration;

use clap::Parser;
use cloudbuild::CloudBuildClient;
use github::GithubClient;
use listener::ReportSettings;
use reporting::{ContextLabel, ReconcilePolicy, TargetUrlTemplate};

const MAX_BUDGET_SECS: u64 = ReconcilePolicy::MAX_BUDGET.as_secs();

#[derive(Debug, Clone, Parser)]
#[command(
    name = "cloudbuild-report",
    about = "Mirror Cloud Build status onto GitHub commit statuses",
    version
)]
pub struct ServeConfig {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// GitHub token; read from the `github_token` project metadata attribute when unset
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub REST API root
    #[arg(long, env = "GITHUB_API_URL", default_value = GithubClient::DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Static Cloud Build access token; a metadata-server token is used when unset
    #[arg(long, env = "CLOUDBUILD_TOKEN", hide_env_values = true)]
    pub cloudbuild_token: Option<String>,

    /// Cloud Build API root
    #[arg(long, env = "CLOUDBUILD_API_URL", default_value = CloudBuildClient::DEFAULT_BASE_URL)]
    pub cloudbuild_api_url: String,

    /// Service account whose metadata-server token authenticates Cloud Build calls
    #[arg(long, env = "REPORT_SERVICE_ACCOUNT", default_value = "default")]
    pub service_account: String,

    /// Base commit status context
    #[arg(long, env = "REPORT_BASE_CONTEXT", default_value = ContextLabel::DEFAULT_BASE)]
    pub base_context: String,

    /// Status link template; `{build_id}` and `{project}` are substituted
    #[arg(long, env = "REPORT_TARGET_URL", default_value = TargetUrlTemplate::DEFAULT)]
    pub target_url: String,

    /// Seconds between polls of one build
    #[arg(
        long,
        env = "REPORT_POLL_INTERVAL_SECS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub poll_interval_secs: u64,

    /// Seconds a loop may run before giving up
    #[arg(
        long,
        env = "REPORT_BUDGET_SECS",
        default_value_t = 30 * 60,
        value_parser = clap::value_parser!(u64).range(1..=MAX_BUDGET_SECS)
    )]
    pub budget_secs: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, env = "REPORT_HTTP_TIMEOUT_SECS", default_value_t = 30)]
    pub http_timeout_secs: u64,

    /// Emit logs as newline-delimited JSON
    #[arg(long, env = "LOG_JSON")]
    pub log_json: bool,

    /// OTLP collector endpoint; tracing spans are exported when set
    #[arg(long, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

impl ServeConfig {
    pub fn policy(&self) -> ReconcilePolicy {
        ReconcilePolicy {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            budget: Duration::from_secs(self.budget_secs),
        }
    }

    pub fn settings(&self) -> ReportSettings {
        ReportSettings {
            base_context: self.base_context.clone(),
            target_url: TargetUrlTemplate::new(self.target_url.clone()),
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
