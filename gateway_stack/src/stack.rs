//! The cvbuilder gateway stack.
//!
//! One composition declares the whole resource graph: a REST API with a
//! mock health route, a deployment and `v1` stage, a TLS custom domain with
//! its base path mapping, and the DNS alias pointing at the domain. The
//! hosted zone id, zone name, and certificate ARN come from the parameter
//! store; the template only carries their names, and the provisioning engine
//! resolves them at apply time.

use std::collections::BTreeMap;

use cfn_template::apigateway::{
    ApiResource, AuthorizationType, BasePathMapping, Deployment, DomainName,
    EndpointConfiguration, EndpointType, HttpMethod, Integration, IntegrationResponse,
    IntegrationType, Method, MethodResponse, PassthroughBehavior, RestApi, SecurityPolicy, Stage,
};
use cfn_template::route53::{AliasTarget, RecordSet, RecordType};
use cfn_template::{CfnResource, Expr, Output, Parameter, Template, TemplateError};
use sha2::{Digest, Sha256};

use crate::context::DeployContext;
use crate::cors::CorsOptions;
use crate::StackError;

/// Parameter store names the stack resolves its environment from.
pub const HOSTED_ZONE_ID_PARAM: &str = "/route53/hosted-zone-id";
pub const HOSTED_ZONE_NAME_PARAM: &str = "/route53/hosted-zone-name";
const CERTIFICATE_ARN_PARAM_PREFIX: &str = "/acm/certificate-arn-";

/// The certificate lives in the deployment region, so its parameter store
/// name is region-scoped.
pub fn certificate_arn_param(region: &str) -> String {
    format!("{CERTIFICATE_ARN_PARAM_PREFIX}{region}")
}

pub const API_NAME: &str = "CvBuilderApi";
pub const STAGE_NAME: &str = "v1";
pub const SUBDOMAIN: &str = "cvbuilder";
pub const HEALTH_PATH: &str = "health";

/// Mapping template handed to mock integrations; API Gateway requires a
/// status code to select the integration response.
pub const MOCK_STATUS_OK_TEMPLATE: &str = r#"{"statusCode": 200}"#;

/// Body of the health route, returned verbatim with the caller's request
/// time substituted by the gateway.
pub const HEALTH_RESPONSE_TEMPLATE: &str = r#"{"message":"OK","timestamp":"$context.requestTime"}"#;

/// Template-parameter logical ids.
pub mod params {
    pub const HOSTED_ZONE_ID: &str = "HostedZoneId";
    pub const HOSTED_ZONE_NAME: &str = "HostedZoneName";
    pub const CERTIFICATE_ARN: &str = "CertificateArn";
}

/// Resource logical ids, fixed so that repeated synthesis addresses the same
/// provisioned resources.
pub mod logical {
    pub const REST_API: &str = "CvBuilderApi";
    pub const ROOT_PREFLIGHT: &str = "CvBuilderApiRootPreflight";
    pub const HEALTH_RESOURCE: &str = "CvBuilderHealth";
    pub const HEALTH_GET: &str = "CvBuilderHealthGet";
    pub const HEALTH_PREFLIGHT: &str = "CvBuilderHealthPreflight";
    pub const STAGE: &str = "CvBuilderApiStage";
    pub const DOMAIN_NAME: &str = "CvBuilderDomainName";
    pub const BASE_PATH_MAPPING: &str = "CvBuilderBasePathMapping";
    pub const ALIAS_RECORD: &str = "CvBuilderApiAliasRecord";
    /// Prefix of the deployment's logical id. A digest of the API surface is
    /// appended so that changing the API rolls out a fresh deployment.
    pub const DEPLOYMENT_PREFIX: &str = "CvBuilderApiDeployment";
}

/// Logical ids of the stack's outputs.
pub mod outputs {
    pub const ENDPOINT_URL: &str = "EndpointUrl";
    pub const DOMAIN_NAME: &str = "DomainName";
}

/// Read-only handle to the DNS zone the stack publishes into. The zone is
/// owned elsewhere; only its id and name flow into declarations, as
/// references the engine resolves.
#[derive(Debug, Clone)]
pub struct HostedZoneRef {
    id_param: String,
    name_param: String,
}

impl HostedZoneRef {
    pub fn from_parameters(id_param: &str, name_param: &str) -> Self {
        Self {
            id_param: id_param.to_string(),
            name_param: name_param.to_string(),
        }
    }

    pub fn id(&self) -> Expr {
        Expr::reference(&self.id_param)
    }

    /// `<label>.<zone>` as a substitution over the zone-name parameter.
    pub fn subdomain(&self, label: &str) -> Expr {
        Expr::sub(format!("{label}.${{{}}}", self.name_param))
    }

    /// `https://<label>.<zone>`; the label may be a wildcard.
    pub fn https_subdomain(&self, label: &str) -> Expr {
        Expr::sub(format!("https://{label}.${{{}}}", self.name_param))
    }
}

/// Read-only handle to the TLS certificate covering the gateway's domain.
#[derive(Debug, Clone)]
pub struct CertificateRef {
    arn_param: String,
}

impl CertificateRef {
    pub fn from_parameter(arn_param: &str) -> Self {
        Self {
            arn_param: arn_param.to_string(),
        }
    }

    pub fn arn(&self) -> Expr {
        Expr::reference(&self.arn_param)
    }
}

/// Composes the full gateway stack for one deployment region.
///
/// The same context always yields the same template, byte for byte. Any
/// failure aborts the whole composition; there is no partially declared
/// graph to observe.
pub fn compose(ctx: &DeployContext) -> Result<Template, StackError> {
    let mut template = Template::new("cvbuilder API gateway: REST API, custom domain, DNS alias");

    template.add_parameter(
        params::HOSTED_ZONE_ID,
        Parameter {
            description: Some("Id of the existing hosted zone".to_string()),
            ..Parameter::from_ssm(HOSTED_ZONE_ID_PARAM)
        },
    )?;
    template.add_parameter(
        params::HOSTED_ZONE_NAME,
        Parameter {
            description: Some("Name of the existing hosted zone".to_string()),
            ..Parameter::from_ssm(HOSTED_ZONE_NAME_PARAM)
        },
    )?;
    template.add_parameter(
        params::CERTIFICATE_ARN,
        Parameter {
            description: Some("ARN of the regional TLS certificate".to_string()),
            ..Parameter::from_ssm(certificate_arn_param(ctx.region()))
        },
    )?;

    let zone = HostedZoneRef::from_parameters(params::HOSTED_ZONE_ID, params::HOSTED_ZONE_NAME);
    let certificate = CertificateRef::from_parameter(params::CERTIFICATE_ARN);

    // any subdomain of the zone may call the API
    let api_cors = CorsOptions {
        allow_origin: zone.https_subdomain("*"),
        allow_methods: vec![HttpMethod::Get, HttpMethod::Post, HttpMethod::Options],
        allow_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
    };

    template.add_resource(
        logical::REST_API,
        &RestApi {
            name: API_NAME.to_string(),
            ..Default::default()
        },
    )?;
    template.add_resource(
        logical::ROOT_PREFLIGHT,
        &api_cors.preflight_method(
            Expr::reference(logical::REST_API),
            Expr::get_att(logical::REST_API, "RootResourceId"),
        ),
    )?;

    template.add_resource(
        logical::HEALTH_RESOURCE,
        &ApiResource {
            rest_api_id: Expr::reference(logical::REST_API),
            parent_id: Expr::get_att(logical::REST_API, "RootResourceId"),
            path_part: HEALTH_PATH.to_string(),
        },
    )?;
    template.add_resource(logical::HEALTH_GET, &health_get_method(&zone))?;
    template.add_resource(
        logical::HEALTH_PREFLIGHT,
        &api_cors.preflight_method(
            Expr::reference(logical::REST_API),
            Expr::reference(logical::HEALTH_RESOURCE),
        ),
    )?;

    // the deployment snapshots the methods above; its id tracks them so an
    // API change rolls out a new deployment while an unchanged stack
    // synthesizes identically
    let deployment_id = format!(
        "{}{}",
        logical::DEPLOYMENT_PREFIX,
        api_surface_digest(&template)?
    );
    template.add_resource(
        &deployment_id,
        &Deployment {
            rest_api_id: Expr::reference(logical::REST_API),
            description: None,
        },
    )?;
    for method in [
        logical::ROOT_PREFLIGHT,
        logical::HEALTH_GET,
        logical::HEALTH_PREFLIGHT,
    ] {
        template.depends_on(&deployment_id, method)?;
    }

    template.add_resource(
        logical::STAGE,
        &Stage {
            rest_api_id: Expr::reference(logical::REST_API),
            deployment_id: Expr::reference(deployment_id.as_str()),
            stage_name: STAGE_NAME.to_string(),
        },
    )?;

    template.add_resource(
        logical::DOMAIN_NAME,
        &DomainName {
            domain_name: zone.subdomain(SUBDOMAIN),
            endpoint_configuration: Some(EndpointConfiguration {
                types: vec![EndpointType::Regional],
            }),
            regional_certificate_arn: Some(certificate.arn()),
            security_policy: Some(SecurityPolicy::Tls12),
            ..Default::default()
        },
    )?;
    template.add_resource(
        logical::BASE_PATH_MAPPING,
        &BasePathMapping {
            domain_name: Expr::reference(logical::DOMAIN_NAME),
            rest_api_id: Expr::reference(logical::REST_API),
            base_path: Some(STAGE_NAME.to_string()),
            stage: Some(STAGE_NAME.to_string()),
        },
    )?;
    // the mapping names its stage rather than referencing it
    template.depends_on(logical::BASE_PATH_MAPPING, logical::STAGE)?;

    template.add_resource(
        logical::ALIAS_RECORD,
        &RecordSet {
            name: zone.subdomain(SUBDOMAIN),
            record_type: RecordType::A,
            hosted_zone_id: Some(zone.id()),
            alias_target: Some(AliasTarget {
                dns_name: Expr::get_att(logical::DOMAIN_NAME, "RegionalDomainName"),
                hosted_zone_id: Expr::get_att(logical::DOMAIN_NAME, "RegionalHostedZoneId"),
                evaluate_target_health: None,
            }),
            ..Default::default()
        },
    )?;

    template.add_output(
        outputs::ENDPOINT_URL,
        Output {
            description: "Invoke URL of the deployed stage".to_string(),
            value: Expr::Join(
                String::new(),
                vec![
                    Expr::lit("https://"),
                    Expr::reference(logical::REST_API),
                    Expr::lit(".execute-api."),
                    Expr::reference("AWS::Region"),
                    Expr::lit("."),
                    Expr::reference("AWS::URLSuffix"),
                    Expr::lit("/"),
                    Expr::reference(logical::STAGE),
                    Expr::lit("/"),
                ],
            ),
        },
    )?;
    template.add_output(
        outputs::DOMAIN_NAME,
        Output {
            description: "Custom domain fronting the stage".to_string(),
            value: zone.subdomain(SUBDOMAIN),
        },
    )?;

    Ok(template)
}

/// The health route: a mock `GET` answering with a fixed body and the
/// domain-scoped CORS headers, authorization open.
fn health_get_method(zone: &HostedZoneRef) -> Method {
    let health_cors = CorsOptions {
        allow_origin: zone.https_subdomain(SUBDOMAIN),
        allow_methods: vec![HttpMethod::Get, HttpMethod::Options],
        allow_headers: vec!["Content-Type".to_string(), "Authorization".to_string()],
    };

    let mut request_templates = BTreeMap::new();
    request_templates.insert(
        "application/json".to_string(),
        MOCK_STATUS_OK_TEMPLATE.to_string(),
    );
    let mut response_templates = BTreeMap::new();
    response_templates.insert(
        "application/json".to_string(),
        HEALTH_RESPONSE_TEMPLATE.to_string(),
    );
    let mut response_models = BTreeMap::new();
    response_models.insert("application/json".to_string(), "Empty".to_string());

    Method {
        rest_api_id: Expr::reference(logical::REST_API),
        resource_id: Expr::reference(logical::HEALTH_RESOURCE),
        http_method: HttpMethod::Get,
        authorization_type: AuthorizationType::None,
        integration: Some(Integration {
            ty: IntegrationType::Mock,
            integration_http_method: None,
            passthrough_behavior: Some(PassthroughBehavior::Never),
            request_templates,
            integration_responses: vec![IntegrationResponse {
                status_code: "200".to_string(),
                response_parameters: health_cors.response_parameters(),
                response_templates,
            }],
        }),
        method_responses: vec![MethodResponse {
            status_code: "200".to_string(),
            response_models,
            response_parameters: health_cors.method_response_parameters(),
        }],
    }
}

/// First eight hex characters of a digest over the REST API, its resources,
/// and its methods, in logical-id order.
fn api_surface_digest(template: &Template) -> Result<String, StackError> {
    let mut hasher = Sha256::new();
    for ty in [RestApi::TYPE, ApiResource::TYPE, Method::TYPE] {
        for (logical_id, resource) in template.resources_of_type(ty) {
            hasher.update(logical_id.as_bytes());
            let body = serde_json::to_vec(&resource.properties).map_err(TemplateError::from)?;
            hasher.update(&body);
        }
    }
    let hex = format!("{:x}", hasher.finalize());
    Ok(hex[..8].to_string())
}
