//! Preflight: verify the parameter store entries the stack resolves.
//!
//! The template only names its parameter store entries; the engine reads
//! them at apply time. Checking them up front turns a mid-deploy rollback
//! into a clear error before anything is provisioned.

use anyhow::{bail, Context, Result};
use gateway_stack::stack::{certificate_arn_param, HOSTED_ZONE_ID_PARAM, HOSTED_ZONE_NAME_PARAM};
use gateway_stack::DeployContext;
use tracing::info;

use crate::aws::AwsClients;
use crate::config::Config;

/// Checks every parameter store name the template resolves, and fails
/// listing all the missing ones.
pub async fn run(cfg: &Config) -> Result<()> {
    let ctx = DeployContext::new(&cfg.deploy_region)?;
    let required = [
        HOSTED_ZONE_ID_PARAM.to_string(),
        HOSTED_ZONE_NAME_PARAM.to_string(),
        certificate_arn_param(ctx.region()),
    ];

    let clients = AwsClients::init(ctx.region()).await;
    let mut missing = Vec::new();
    for name in &required {
        if parameter_exists(&clients.ssm, name).await? {
            info!(parameter = name.as_str(), "present");
        } else {
            missing.push(name.as_str());
        }
    }
    if !missing.is_empty() {
        bail!("missing parameter store entries: {}", missing.join(", "));
    }
    Ok(())
}

async fn parameter_exists(client: &aws_sdk_ssm::Client, name: &str) -> Result<bool> {
    match client.get_parameter().name(name).send().await {
        Ok(_) => Ok(true),
        Err(e) => {
            if e.as_service_error()
                .is_some_and(|se| se.is_parameter_not_found())
            {
                return Ok(false);
            }
            Err(e).with_context(|| format!("failed to read parameter {name}"))
        }
    }
}
