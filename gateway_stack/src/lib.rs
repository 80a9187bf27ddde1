//! Stack definition for the cvbuilder API gateway.
//!
//! [`stack::compose`] turns a [`DeployContext`] into the complete
//! CloudFormation template: REST API, health route, `v1` stage, custom
//! domain, and DNS alias. Composition is pure declaration; nothing talks to
//! AWS here, and every external value enters as a parameter-store reference
//! the provisioning engine resolves later.

pub mod context;
pub mod cors;
pub mod regions;
pub mod stack;

pub use context::DeployContext;
pub use stack::compose;

use cfn_template::TemplateError;

#[derive(Debug, thiserror::Error)]
pub enum StackError {
    /// The deployment region is missing or not a known AWS region. Raised
    /// before anything is declared.
    #[error("{0}")]
    InvalidRegion(String),

    /// The resource graph could not be declared; the composition is
    /// abandoned whole.
    #[error(transparent)]
    Template(#[from] TemplateError),
}
