//! `cvb-infra`: synthesize, check, and deploy the cvbuilder API gateway.
//!
//! Startup sequence:
//! 1. Parse the command line.
//! 2. Load and validate [`Config`] from `CVB_*` environment variables.
//! 3. Initialize logging on stderr.
//! 4. Dispatch the subcommand.

mod aws;
mod check;
mod config;
mod deploy;
mod telemetry;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gateway_stack::{compose, DeployContext};
use tracing::debug;

use crate::config::Config;

/// cvb-infra - cvbuilder API gateway provisioning tool
#[derive(Parser, Debug)]
#[command(name = "cvb-infra")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize the CloudFormation template
    Synth {
        /// Write the template here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Create or update the gateway stack and wait for it to settle
    Deploy {
        /// Deploy a previously synthesized template instead of composing one
        #[arg(long)]
        template: Option<PathBuf>,
    },

    /// Verify the parameter store entries the stack resolves exist
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = Config::from_env().map_err(|e| {
        eprintln!("ERROR: cvb-infra configuration invalid: {e}");
        e
    })?;
    telemetry::init(&cfg.log_level)?;

    match cli.command {
        Commands::Synth { output } => synth(&cfg, output.as_deref()),
        Commands::Deploy { template } => deploy::run(&cfg, template.as_deref()).await,
        Commands::Check => check::run(&cfg).await,
    }
}

fn synth(cfg: &Config, output: Option<&Path>) -> Result<()> {
    let ctx = DeployContext::new(&cfg.deploy_region)?;
    let template = compose(&ctx)?;
    debug!(
        parameters = template.parameters().len(),
        resources = template.resources().len(),
        outputs = template.outputs().len(),
        "composed gateway template"
    );
    let body = template.to_json()?;
    match output {
        Some(path) => std::fs::write(path, body)
            .with_context(|| format!("failed to write template to {}", path.display()))?,
        None => println!("{body}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["cvb-infra"]).is_err());
    }

    #[test]
    fn cli_parses_synth_with_output() {
        let cli = Cli::try_parse_from(["cvb-infra", "synth", "--output", "stack.json"]).unwrap();
        match cli.command {
            Commands::Synth { output } => assert_eq!(output, Some(PathBuf::from("stack.json"))),
            other => panic!("expected synth, got {other:?}"),
        }
    }

    #[test]
    fn cli_parses_deploy_with_template() {
        let cli = Cli::try_parse_from(["cvb-infra", "deploy", "--template", "stack.json"]).unwrap();
        match cli.command {
            Commands::Deploy { template } => {
                assert_eq!(template, Some(PathBuf::from("stack.json")))
            }
            other => panic!("expected deploy, got {other:?}"),
        }
    }

    #[test]
    fn cli_parses_bare_check() {
        let cli = Cli::try_parse_from(["cvb-infra", "check"]).unwrap();
        assert!(matches!(cli.command, Commands::Check));
    }

    #[test]
    fn synth_writes_the_template_to_a_file() {
        let cfg = Config {
            deploy_region: "eu-west-1".into(),
            stack_name: "cvbuilder-api-gateway".into(),
            log_level: "info".into(),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stack.json");

        synth(&cfg, Some(&path)).unwrap();

        let body = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["AWSTemplateFormatVersion"], "2010-09-09");
        assert!(value["Resources"]
            .as_object()
            .is_some_and(|resources| !resources.is_empty()));
    }

    #[test]
    fn synth_rejects_unknown_regions() {
        let cfg = Config {
            deploy_region: "mars-north-1".into(),
            stack_name: "cvbuilder-api-gateway".into(),
            log_level: "info".into(),
        };
        assert!(synth(&cfg, None).is_err());
    }
}
