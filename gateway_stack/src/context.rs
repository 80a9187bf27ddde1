//! Environment-derived inputs of a stack composition.

use crate::regions;
use crate::StackError;

/// The inputs one composition runs against. Everything else the stack needs
/// is resolved from the parameter store by the provisioning engine.
///
/// Construction validates eagerly: a missing or unknown region fails here,
/// before any resource is declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployContext {
    region: String,
}

impl DeployContext {
    pub fn new(region: &str) -> Result<Self, StackError> {
        if let Some(reason) = regions::verify_region(region) {
            return Err(StackError::InvalidRegion(reason));
        }
        Ok(Self {
            region: region.to_string(),
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}
