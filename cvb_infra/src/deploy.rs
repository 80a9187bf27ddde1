//! Applies the synthesized template through CloudFormation.
//!
//! Create the stack if it does not exist, update it otherwise, then poll
//! until the engine settles and print the stack outputs. An update with
//! nothing to change counts as success. A stack that rolls back (or, for a
//! first create, deletes itself) is reported as a failure together with the
//! status reason the engine gives.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use aws_sdk_cloudformation::error::ProvideErrorMetadata;
use aws_sdk_cloudformation::types::{OnFailure, Stack, StackStatus};
use gateway_stack::{compose, DeployContext};
use tracing::{debug, info};

use crate::aws::AwsClients;
use crate::config::Config;

const POLL_INTERVAL: Duration = Duration::from_millis(700);

/// Synthesizes the template (or reads a previously synthesized one) and
/// drives the stack to completion. The target region is validated up front
/// either way, before any file or network I/O.
pub async fn run(cfg: &Config, template_path: Option<&Path>) -> Result<()> {
    let ctx = DeployContext::new(&cfg.deploy_region)?;
    let body = match template_path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read template from {}", path.display()))?,
        None => compose(&ctx)?.to_json()?,
    };

    let clients = AwsClients::init(ctx.region()).await;
    create_or_update_stack(&clients.cloudformation, &cfg.stack_name, &body).await?;
    let outputs = wait_for_outputs(&clients.cloudformation, &cfg.stack_name).await?;

    info!(stack = cfg.stack_name.as_str(), "stack settled");
    for (key, value) in &outputs {
        println!("{key}: {value}");
    }
    Ok(())
}

async fn does_stack_exist(
    client: &aws_sdk_cloudformation::Client,
    name: &str,
) -> Result<bool> {
    match client.describe_stacks().stack_name(name).send().await {
        Ok(_) => Ok(true),
        Err(e) => {
            // DescribeStacks has no dedicated not-found error; the service
            // reports a ValidationError carrying this message.
            if e.message().unwrap_or_default().contains("does not exist") {
                return Ok(false);
            }
            Err(e).with_context(|| format!("failed to describe stack {name}"))
        }
    }
}

async fn create_or_update_stack(
    client: &aws_sdk_cloudformation::Client,
    name: &str,
    body: &str,
) -> Result<()> {
    if does_stack_exist(client, name).await? {
        info!(stack = name, "updating existing stack");
        if let Err(e) = client
            .update_stack()
            .stack_name(name)
            .template_body(body)
            .send()
            .await
        {
            if e.message()
                .unwrap_or_default()
                .contains("No updates are to be performed")
            {
                info!(stack = name, "stack is already up to date");
                return Ok(());
            }
            return Err(e).with_context(|| format!("failed to update stack {name}"));
        }
    } else {
        info!(stack = name, "creating stack");
        client
            .create_stack()
            .on_failure(OnFailure::Delete)
            .stack_name(name)
            .template_body(body)
            .send()
            .await
            .with_context(|| format!("failed to create stack {name}"))?;
    }
    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum Progress {
    Settled,
    InProgress,
    Failed,
}

/// What a stack status means for the poll loop. Anything that is neither
/// healthy-terminal nor transitional is a failure, including the
/// `DELETE_COMPLETE` a failed first create leaves behind.
fn classify(status: &StackStatus) -> Progress {
    match status {
        StackStatus::CreateComplete
        | StackStatus::UpdateComplete
        | StackStatus::ImportComplete => Progress::Settled,
        StackStatus::CreateInProgress
        | StackStatus::DeleteInProgress
        | StackStatus::ImportInProgress
        | StackStatus::ImportRollbackInProgress
        | StackStatus::ReviewInProgress
        | StackStatus::RollbackInProgress
        | StackStatus::UpdateCompleteCleanupInProgress
        | StackStatus::UpdateInProgress
        | StackStatus::UpdateRollbackCompleteCleanupInProgress
        | StackStatus::UpdateRollbackInProgress => Progress::InProgress,
        _ => Progress::Failed,
    }
}

/// `Ok(Some(stack))` once the stack reaches a healthy terminal status,
/// `Ok(None)` while the engine is still working, and an error carrying the
/// status reason otherwise.
async fn describe_stack(
    client: &aws_sdk_cloudformation::Client,
    name: &str,
) -> Result<Option<Stack>> {
    let resp = client
        .describe_stacks()
        .stack_name(name)
        .send()
        .await
        .with_context(|| format!("failed to describe stack {name}"))?;
    let Some(stack) = resp.stacks().first() else {
        bail!("stack {name} not found");
    };
    let Some(status) = stack.stack_status() else {
        bail!("stack {name} reported no status");
    };
    match classify(status) {
        Progress::Settled => Ok(Some(stack.clone())),
        Progress::InProgress => Ok(None),
        Progress::Failed => {
            let reason = stack.stack_status_reason().unwrap_or("no reason reported");
            bail!("stack {name} ended in {}: {reason}", status.as_str());
        }
    }
}

/// Polls until the stack settles, then returns its outputs in key order.
async fn wait_for_outputs(
    client: &aws_sdk_cloudformation::Client,
    name: &str,
) -> Result<BTreeMap<String, String>> {
    loop {
        tokio::time::sleep(POLL_INTERVAL).await;
        match describe_stack(client, name).await? {
            Some(stack) => {
                let mut outputs = BTreeMap::new();
                for output in stack.outputs() {
                    if let (Some(key), Some(value)) = (output.output_key(), output.output_value())
                    {
                        outputs.insert(key.to_string(), value.to_string());
                    }
                }
                return Ok(outputs);
            }
            None => debug!(stack = name, "still in progress"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn healthy_terminal_statuses_settle() {
        for status in [
            StackStatus::CreateComplete,
            StackStatus::UpdateComplete,
            StackStatus::ImportComplete,
        ] {
            assert_eq!(classify(&status), Progress::Settled, "{status:?}");
        }
    }

    #[test]
    fn transitional_statuses_keep_polling() {
        for status in [
            StackStatus::CreateInProgress,
            StackStatus::UpdateInProgress,
            StackStatus::RollbackInProgress,
            StackStatus::UpdateCompleteCleanupInProgress,
        ] {
            assert_eq!(classify(&status), Progress::InProgress, "{status:?}");
        }
    }

    #[test]
    fn rollbacks_and_deletions_are_failures() {
        for status in [
            StackStatus::CreateFailed,
            StackStatus::RollbackComplete,
            StackStatus::RollbackFailed,
            StackStatus::UpdateRollbackComplete,
            StackStatus::DeleteComplete,
            StackStatus::DeleteFailed,
        ] {
            assert_eq!(classify(&status), Progress::Failed, "{status:?}");
        }
    }

    #[tokio::test]
    async fn deploying_a_saved_template_still_verifies_the_region() {
        let cfg = Config {
            deploy_region: "eu-wst-1".into(),
            stack_name: "cvbuilder-api-gateway".into(),
            log_level: "info".into(),
        };
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("stack.json");

        let err = run(&cfg, Some(&template)).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("unknown AWS region"), "{message}");
        assert!(message.contains("eu-wst-1"), "{message}");
    }
}
