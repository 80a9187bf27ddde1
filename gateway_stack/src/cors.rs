//! Cross-origin policy for the gateway.
//!
//! API Gateway has no CORS switch of its own; the policy is carried by
//! response headers. Preflight `OPTIONS` requests are answered by a mock
//! method declared per resource, and regular methods repeat the headers on
//! their own responses.

use std::collections::BTreeMap;

use cfn_template::apigateway::{
    AuthorizationType, HttpMethod, Integration, IntegrationResponse, IntegrationType, Method,
    MethodResponse, PassthroughBehavior,
};
use cfn_template::Expr;

use crate::stack::MOCK_STATUS_OK_TEMPLATE;

pub const ALLOW_ORIGIN_HEADER: &str = "method.response.header.Access-Control-Allow-Origin";
pub const ALLOW_METHODS_HEADER: &str = "method.response.header.Access-Control-Allow-Methods";
pub const ALLOW_HEADERS_HEADER: &str = "method.response.header.Access-Control-Allow-Headers";

/// Preflight responses carry no body.
const PREFLIGHT_STATUS: &str = "204";

#[derive(Debug, Clone)]
pub struct CorsOptions {
    /// Allowed origin, a literal or a substitution over template parameters
    /// (e.g. a zone-derived wildcard).
    pub allow_origin: Expr,
    pub allow_methods: Vec<HttpMethod>,
    pub allow_headers: Vec<String>,
}

impl CorsOptions {
    /// The mock `OPTIONS` method answering preflight requests for one
    /// gateway resource.
    pub fn preflight_method(&self, rest_api_id: Expr, resource_id: Expr) -> Method {
        let mut request_templates = BTreeMap::new();
        request_templates.insert(
            "application/json".to_string(),
            MOCK_STATUS_OK_TEMPLATE.to_string(),
        );
        Method {
            rest_api_id,
            resource_id,
            http_method: HttpMethod::Options,
            authorization_type: AuthorizationType::None,
            integration: Some(Integration {
                ty: IntegrationType::Mock,
                integration_http_method: None,
                passthrough_behavior: Some(PassthroughBehavior::Never),
                request_templates,
                integration_responses: vec![IntegrationResponse {
                    status_code: PREFLIGHT_STATUS.to_string(),
                    response_parameters: self.response_parameters(),
                    response_templates: BTreeMap::new(),
                }],
            }),
            method_responses: vec![MethodResponse {
                status_code: PREFLIGHT_STATUS.to_string(),
                response_models: BTreeMap::new(),
                response_parameters: self.method_response_parameters(),
            }],
        }
    }

    /// Integration-response header map carrying this policy.
    pub fn response_parameters(&self) -> BTreeMap<String, Expr> {
        let mut parameters = BTreeMap::new();
        parameters.insert(ALLOW_ORIGIN_HEADER.to_string(), quoted(&self.allow_origin));
        parameters.insert(
            ALLOW_METHODS_HEADER.to_string(),
            Expr::lit(format!("'{}'", self.allow_methods_value())),
        );
        parameters.insert(
            ALLOW_HEADERS_HEADER.to_string(),
            Expr::lit(format!("'{}'", self.allow_headers_value())),
        );
        parameters
    }

    /// Method-response declaration of the same headers.
    pub fn method_response_parameters(&self) -> BTreeMap<String, bool> {
        [ALLOW_ORIGIN_HEADER, ALLOW_METHODS_HEADER, ALLOW_HEADERS_HEADER]
            .into_iter()
            .map(|header| (header.to_string(), true))
            .collect()
    }

    fn allow_methods_value(&self) -> String {
        self.allow_methods
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    fn allow_headers_value(&self) -> String {
        self.allow_headers.join(",")
    }
}

/// Header mapping values are literals wrapped in single quotes. Substitution
/// text keeps its placeholders inside the quotes; reference expressions get
/// their quotes joined on.
fn quoted(value: &Expr) -> Expr {
    match value {
        Expr::Lit(text) => Expr::Lit(format!("'{text}'")),
        Expr::Sub(text) => Expr::Sub(format!("'{text}'")),
        other => Expr::Join(
            String::new(),
            vec![Expr::lit("'"), other.clone(), Expr::lit("'")],
        ),
    }
}
