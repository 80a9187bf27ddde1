//! The template document: parameters, resources, outputs.
//!
//! A [`Template`] is append-only. Every declaration is validated on entry and
//! immutable afterwards, so a finished template is fully determined by the
//! sequence of declarations that produced it. Sections are kept in ordered
//! maps, which makes repeated serialization byte-identical.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::expr::Expr;

/// The one format version CloudFormation accepts.
pub const TEMPLATE_FORMAT_VERSION: &str = "2010-09-09";

#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("invalid logical id {id:?}: {reason}")]
    InvalidLogicalId { id: String, reason: String },

    #[error("duplicate logical id {0:?}")]
    DuplicateLogicalId(String),

    #[error("validation failed on resource {logical_id:?}: {reason}")]
    InvalidResource { logical_id: String, reason: String },

    #[error("resource {0:?} is not declared in this template")]
    UnknownResource(String),

    #[error("resource {resource:?} depends on {dependency:?}, which is not declared")]
    UnknownDependency { resource: String, dependency: String },

    #[error("invalid stack name {name:?}: {reason}")]
    InvalidStackName { name: String, reason: String },

    #[error("failed to serialize template")]
    Serialize(#[from] serde_json::Error),
}

/// Implemented by every typed resource that can be declared in a template.
///
/// `TYPE` is the CloudFormation resource type string. `validate` runs at
/// declaration time, before the resource is admitted into the template.
pub trait CfnResource: Serialize {
    const TYPE: &'static str;

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// One declared resource: its type string, serialized properties, and any
/// explicit ordering edges.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceEntry {
    #[serde(rename = "Type")]
    pub ty: String,
    #[serde(rename = "Properties")]
    pub properties: serde_json::Value,
    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ParameterType {
    #[serde(rename = "String")]
    String,
    #[serde(rename = "Number")]
    Number,
    /// Resolved by CloudFormation from Systems Manager Parameter Store when
    /// the template is applied. `Default` holds the parameter store name to
    /// read, so the template itself carries only a symbolic reference.
    #[serde(rename = "AWS::SSM::Parameter::Value<String>")]
    SsmString,
}

#[derive(Debug, Clone, Serialize)]
pub struct Parameter {
    #[serde(rename = "Type")]
    pub ty: ParameterType,
    #[serde(rename = "Default", skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    /// A parameter whose value the engine reads from the parameter store.
    pub fn from_ssm(parameter_store_name: impl Into<String>) -> Self {
        Self {
            ty: ParameterType::SsmString,
            default: Some(parameter_store_name.into()),
            description: None,
        }
    }
}

/// A named value the stack publishes once applied.
#[derive(Debug, Clone, Serialize)]
pub struct Output {
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Value")]
    pub value: Expr,
}

#[derive(Debug, Clone, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    version: String,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(rename = "Parameters", skip_serializing_if = "BTreeMap::is_empty")]
    parameters: BTreeMap<String, Parameter>,
    #[serde(rename = "Resources")]
    resources: BTreeMap<String, ResourceEntry>,
    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    outputs: BTreeMap<String, Output>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            version: TEMPLATE_FORMAT_VERSION.to_string(),
            description: None,
            parameters: BTreeMap::new(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    pub fn parameters(&self) -> &BTreeMap<String, Parameter> {
        &self.parameters
    }

    pub fn resources(&self) -> &BTreeMap<String, ResourceEntry> {
        &self.resources
    }

    pub fn outputs(&self) -> &BTreeMap<String, Output> {
        &self.outputs
    }

    pub fn add_parameter(
        &mut self,
        logical_id: &str,
        parameter: Parameter,
    ) -> Result<(), TemplateError> {
        validate_logical_id(logical_id)?;
        if self.parameters.contains_key(logical_id) || self.resources.contains_key(logical_id) {
            return Err(TemplateError::DuplicateLogicalId(logical_id.to_string()));
        }
        self.parameters.insert(logical_id.to_string(), parameter);
        Ok(())
    }

    /// Declares a resource. The logical id must be unique across the
    /// template; the resource's own validation must pass. On any failure
    /// nothing is added.
    pub fn add_resource<R: CfnResource>(
        &mut self,
        logical_id: &str,
        resource: &R,
    ) -> Result<(), TemplateError> {
        validate_logical_id(logical_id)?;
        if self.resources.contains_key(logical_id) || self.parameters.contains_key(logical_id) {
            return Err(TemplateError::DuplicateLogicalId(logical_id.to_string()));
        }
        resource
            .validate()
            .map_err(|reason| TemplateError::InvalidResource {
                logical_id: logical_id.to_string(),
                reason,
            })?;
        let entry = ResourceEntry {
            ty: R::TYPE.to_string(),
            properties: serde_json::to_value(resource)?,
            depends_on: Vec::new(),
        };
        self.resources.insert(logical_id.to_string(), entry);
        Ok(())
    }

    /// Records an explicit ordering edge for dependencies the engine cannot
    /// derive from references alone. Both ends must already be declared.
    pub fn depends_on(&mut self, logical_id: &str, dependency: &str) -> Result<(), TemplateError> {
        if !self.resources.contains_key(dependency) {
            return Err(TemplateError::UnknownDependency {
                resource: logical_id.to_string(),
                dependency: dependency.to_string(),
            });
        }
        let entry = self
            .resources
            .get_mut(logical_id)
            .ok_or_else(|| TemplateError::UnknownResource(logical_id.to_string()))?;
        if !entry.depends_on.iter().any(|d| d == dependency) {
            entry.depends_on.push(dependency.to_string());
        }
        Ok(())
    }

    pub fn add_output(&mut self, logical_id: &str, output: Output) -> Result<(), TemplateError> {
        validate_logical_id(logical_id)?;
        if self.outputs.contains_key(logical_id) {
            return Err(TemplateError::DuplicateLogicalId(logical_id.to_string()));
        }
        self.outputs.insert(logical_id.to_string(), output);
        Ok(())
    }

    /// All declared resources of one CloudFormation type, in logical-id order.
    pub fn resources_of_type<'a>(
        &'a self,
        ty: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a ResourceEntry)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, entry)| entry.ty == ty)
            .map(|(id, entry)| (id.as_str(), entry))
    }

    /// Pretty JSON, so the template stays readable in the CloudFormation
    /// console.
    pub fn to_json(&self) -> Result<String, TemplateError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A logical id names a parameter, resource, or output within the template.
fn validate_logical_id(id: &str) -> Result<(), TemplateError> {
    let reason = if id.is_empty() {
        "must contain at least 1 character"
    } else if id.len() > 255 {
        "must be at most 255 characters"
    } else if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        "must contain only alphanumeric characters [A-Za-z0-9]"
    } else {
        return Ok(());
    };
    Err(TemplateError::InvalidLogicalId {
        id: id.to_string(),
        reason: reason.to_string(),
    })
}

/// CloudFormation stack-name rule: alphanumeric characters and hyphens,
/// starting with an alphabetic character, at most 128 characters.
pub fn validate_stack_name(name: &str) -> Result<(), TemplateError> {
    const RESTRICTION: &str = "must contain only alphanumeric characters and hyphens, \
         must start with an alphabetic character, and cannot be longer than 128 characters";
    let valid = name.len() <= 128
        && name.starts_with(|c: char| c.is_ascii_alphabetic())
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !valid {
        return Err(TemplateError::InvalidStackName {
            name: name.to_string(),
            reason: RESTRICTION.to_string(),
        });
    }
    Ok(())
}
