//! Typed properties for the `AWS::ApiGateway::*` resources.
//!
//! Field names serialize to their CloudFormation spellings. Validation covers
//! the constraints CloudFormation itself enforces; catching them at
//! declaration time beats a failed apply twenty minutes in.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::expr::Expr;
use crate::template::CfnResource;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RestApi {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_configuration: Option<EndpointConfiguration>,
}

impl CfnResource for RestApi {
    const TYPE: &'static str = "AWS::ApiGateway::RestApi";

    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("a REST API must have a name".to_string());
        }
        Ok(())
    }
}

/// A path segment under a REST API. `AWS::ApiGateway::Resource` in
/// CloudFormation; named `ApiResource` here to avoid colliding with the
/// template's own notion of a resource.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApiResource {
    pub rest_api_id: Expr,
    pub parent_id: Expr,
    pub path_part: String,
}

impl CfnResource for ApiResource {
    const TYPE: &'static str = "AWS::ApiGateway::Resource";

    fn validate(&self) -> Result<(), String> {
        validate_path_part(&self.path_part)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Options,
    Head,
    Patch,
    Any,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Any => "ANY",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthorizationType {
    #[serde(rename = "NONE")]
    None,
    #[serde(rename = "AWS_IAM")]
    AwsIam,
    #[serde(rename = "CUSTOM")]
    Custom,
    #[serde(rename = "COGNITO_USER_POOLS")]
    CognitoUserPools,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrationType {
    Mock,
    Aws,
    AwsProxy,
    Http,
    HttpProxy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassthroughBehavior {
    WhenNoMatch,
    WhenNoTemplates,
    Never,
}

/// How the gateway answers a matched method: the backend call (or mock) and
/// the mapping back onto HTTP responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Integration {
    #[serde(rename = "Type")]
    pub ty: IntegrationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration_http_method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passthrough_behavior: Option<PassthroughBehavior>,
    /// Mapping templates keyed by content type.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub request_templates: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub integration_responses: Vec<IntegrationResponse>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct IntegrationResponse {
    pub status_code: String,
    /// Header values keyed by `method.response.header.<Name>`. Values are
    /// mapping expressions, most commonly single-quoted literals.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub response_parameters: BTreeMap<String, Expr>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub response_templates: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MethodResponse {
    pub status_code: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub response_models: BTreeMap<String, String>,
    /// Headers the method may return; `true` marks a header as required.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub response_parameters: BTreeMap<String, bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Method {
    pub rest_api_id: Expr,
    pub resource_id: Expr,
    pub http_method: HttpMethod,
    pub authorization_type: AuthorizationType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub integration: Option<Integration>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub method_responses: Vec<MethodResponse>,
}

impl CfnResource for Method {
    const TYPE: &'static str = "AWS::ApiGateway::Method";

    fn validate(&self) -> Result<(), String> {
        if let Some(integration) = &self.integration {
            for response in &integration.integration_responses {
                validate_status_code(&response.status_code)?;
            }
        }
        for response in &self.method_responses {
            validate_status_code(&response.status_code)?;
        }
        Ok(())
    }
}

/// An immutable snapshot of a REST API's methods. A stage serves exactly one
/// deployment, so rolling out API changes means declaring a new one.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Deployment {
    pub rest_api_id: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CfnResource for Deployment {
    const TYPE: &'static str = "AWS::ApiGateway::Deployment";
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Stage {
    pub rest_api_id: Expr,
    pub deployment_id: Expr,
    pub stage_name: String,
}

impl CfnResource for Stage {
    const TYPE: &'static str = "AWS::ApiGateway::Stage";

    fn validate(&self) -> Result<(), String> {
        validate_stage_name(&self.stage_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EndpointType {
    Edge,
    Regional,
    Private,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct EndpointConfiguration {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<EndpointType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SecurityPolicy {
    #[serde(rename = "TLS_1_0")]
    Tls10,
    #[serde(rename = "TLS_1_2")]
    Tls12,
}

/// A custom domain fronting one or more REST APIs.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainName {
    pub domain_name: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_configuration: Option<EndpointConfiguration>,
    /// Certificate for EDGE domains.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_arn: Option<Expr>,
    /// Certificate for REGIONAL domains. Must live in the same region as the
    /// gateway.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub regional_certificate_arn: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_policy: Option<SecurityPolicy>,
}

impl DomainName {
    fn is_regional(&self) -> bool {
        self.endpoint_configuration
            .as_ref()
            .is_some_and(|ec| ec.types.contains(&EndpointType::Regional))
    }
}

impl CfnResource for DomainName {
    const TYPE: &'static str = "AWS::ApiGateway::DomainName";

    fn validate(&self) -> Result<(), String> {
        if let Some(text) = self.domain_name.text() {
            validate_custom_domain(text)?;
        }
        if self.is_regional() {
            if self.regional_certificate_arn.is_none() {
                return Err("a REGIONAL domain must set RegionalCertificateArn".to_string());
            }
            if self.certificate_arn.is_some() {
                return Err(
                    "a REGIONAL domain must not set CertificateArn, use RegionalCertificateArn"
                        .to_string(),
                );
            }
        } else {
            if self.certificate_arn.is_none() {
                return Err("an EDGE domain must set CertificateArn".to_string());
            }
            if self.regional_certificate_arn.is_some() {
                return Err(
                    "an EDGE domain must not set RegionalCertificateArn, use CertificateArn"
                        .to_string(),
                );
            }
        }
        Ok(())
    }
}

/// Maps one path prefix of a custom domain onto a deployed stage.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BasePathMapping {
    pub domain_name: Expr,
    pub rest_api_id: Expr,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
}

impl CfnResource for BasePathMapping {
    const TYPE: &'static str = "AWS::ApiGateway::BasePathMapping";

    fn validate(&self) -> Result<(), String> {
        if let Some(base_path) = &self.base_path {
            let ok = !base_path.is_empty()
                && base_path
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));
            if !ok {
                return Err(format!(
                    "invalid base path {base_path:?}, only [A-Za-z0-9._-] is allowed"
                ));
            }
        }
        Ok(())
    }
}

fn validate_path_part(part: &str) -> Result<(), String> {
    if part.is_empty() {
        return Err("a resource path part must not be empty".to_string());
    }
    // {param} and {proxy+} placeholders pass through whole
    if part.starts_with('{') && part.ends_with('}') {
        return Ok(());
    }
    for c in part.chars() {
        if !c.is_ascii_alphanumeric() && !matches!(c, '.' | '_' | '-') {
            return Err(format!("invalid character {c:?} in path part {part:?}"));
        }
    }
    Ok(())
}

fn validate_stage_name(name: &str) -> Result<(), String> {
    let ok = !name.is_empty()
        && name.len() <= 128
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'));
    if !ok {
        return Err(format!(
            "invalid stage name {name:?}, must be 1-128 characters of [A-Za-z0-9_-]"
        ));
    }
    Ok(())
}

/// Custom domain names may carry one wildcard, and only as the leading label,
/// e.g. `*.mysite.com`. A trailing dot is not accepted.
fn validate_custom_domain(domain: &str) -> Result<(), String> {
    if domain.is_empty() {
        return Err("a domain name must not be empty".to_string());
    }
    if domain.ends_with('.') {
        return Err(format!("domain name {domain:?} must not end with a dot"));
    }
    if domain.contains('*') {
        if domain.matches('*').count() > 1 {
            return Err(format!(
                "domain name {domain:?} must contain at most one wildcard"
            ));
        }
        if !domain.starts_with("*.") {
            return Err(format!(
                "the wildcard must be the first label of the domain, e.g. \"*.mysite.com\", {domain:?} is invalid"
            ));
        }
    }
    Ok(())
}

/// Three ascii digits, e.g. `"200"`.
fn validate_status_code(code: &str) -> Result<(), String> {
    let ok = code.len() == 3 && code.chars().all(|c| c.is_ascii_digit());
    if !ok {
        return Err(format!(
            "invalid status code {code:?}, must be a 3 digit numeric string"
        ));
    }
    Ok(())
}
