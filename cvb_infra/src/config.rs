//! Configuration for the deploy CLI, read from `CVB_*` environment variables.
//!
//! The process exits with a clear error message if any required variable is
//! missing or invalid, before anything talks to AWS.

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated CLI configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// AWS region the gateway is provisioned into (`CVB_DEPLOY_REGION`).
    /// **Required.**
    pub deploy_region: String,

    /// CloudFormation stack name (`CVB_STACK_NAME`).
    #[serde(default = "default_stack_name")]
    pub stack_name: String,

    /// Tracing log level (`CVB_LOG_LEVEL`, e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_stack_name() -> String {
    "cvbuilder-api-gateway".into()
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from `CVB_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is absent or a value fails
    /// validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::with_prefix("CVB"))
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        if self.deploy_region.trim().is_empty() {
            anyhow::bail!("CVB_DEPLOY_REGION is required and must not be empty");
        }
        cfn_template::validate_stack_name(&self.stack_name)
            .context("CVB_STACK_NAME is not a usable stack name")?;
        Ok(())
    }
}
