//! Operator configuration.
//!
//! Every option can be given as a flag or through the environment, which is
//! how the operator is normally configured inside a Pod.

use crate::error::{OperatorError, OperatorResult};
use clap::Parser;
use std::time::Duration;

/// Command-line and environment configuration for the operator binary.
#[derive(Debug, Clone, Parser)]
#[command(name = "github-operator")]
#[command(author, version, about = "Reconciles GitRepository resources against GitHub", long_about = None)]
pub struct OperatorConfig {
    /// GitHub token used for all API calls.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub github_token: Option<String>,

    /// GitHub API base URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = github_client::DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Owner login. For a user account it must match the token's login;
    /// discovered from the token when unset.
    #[arg(long, env = "GITHUB_OWNER")]
    pub github_owner: Option<String>,

    /// Treat the owner as an organization.
    #[arg(long, env = "GITHUB_ORGANIZATION")]
    pub github_organization: bool,

    /// Only watch this namespace. Watches all namespaces when unset.
    #[arg(long, env = "WATCH_NAMESPACE")]
    pub namespace: Option<String>,

    /// Timeout for a single GitHub request, in seconds.
    #[arg(long, env = "GITHUB_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// First retry delay after a failed reconciliation, in seconds.
    #[arg(long, default_value_t = 5)]
    pub retry_base_secs: u64,

    /// Upper bound for the retry delay, in seconds.
    #[arg(long, default_value_t = 300)]
    pub retry_max_secs: u64,

    /// Print the CustomResourceDefinition as YAML and exit.
    #[arg(long)]
    pub generate_crds: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl OperatorConfig {
    /// Check that the options are usable together.
    ///
    /// # Errors
    ///
    /// Returns [`OperatorError::InvalidConfig`] describing the first problem found.
    pub fn validate(&self) -> OperatorResult<()> {
        if self.generate_crds {
            return Ok(());
        }

        if self.github_token.as_deref().is_none_or(|t| t.trim().is_empty()) {
            return Err(OperatorError::InvalidConfig(
                "a GitHub token is required (--github-token or GITHUB_TOKEN)".into(),
            ));
        }
        if self.github_organization && self.github_owner.is_none() {
            return Err(OperatorError::InvalidConfig(
                "--github-organization requires --github-owner".into(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(OperatorError::InvalidConfig(
                "request timeout must be greater than zero".into(),
            ));
        }
        if self.retry_base_secs == 0 || self.retry_max_secs < self.retry_base_secs {
            return Err(OperatorError::InvalidConfig(format!(
                "invalid retry bounds: base {}s, max {}s",
                self.retry_base_secs, self.retry_max_secs
            )));
        }
        Ok(())
    }

    /// Timeout for a single GitHub request.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// First retry delay.
    pub fn retry_base(&self) -> Duration {
        Duration::from_secs(self.retry_base_secs)
    }

    /// Largest retry delay.
    pub fn retry_max(&self) -> Duration {
        Duration::from_secs(self.retry_max_secs)
    }

    /// Default log filter for the chosen verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "github_operator=info,kube=warn",
            1 => "github_operator=debug,github_client=debug,kube=info",
            _ => "github_operator=trace,github_client=trace,kube=debug",
        }
    }
}
