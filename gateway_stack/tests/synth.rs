//! End-to-end assertions on the synthesized gateway template.

use gateway_stack::stack::{self, logical, outputs, params};
use gateway_stack::{compose, DeployContext, StackError};
use serde_json::{json, Value};

fn synth() -> Value {
    let ctx = DeployContext::new("eu-west-1").unwrap();
    let template = compose(&ctx).unwrap();
    serde_json::to_value(&template).unwrap()
}

fn count_of_type(template: &Value, ty: &str) -> usize {
    template["Resources"]
        .as_object()
        .unwrap()
        .values()
        .filter(|resource| resource["Type"] == *ty)
        .count()
}

#[test]
fn declares_each_contract_resource_exactly_once() {
    let template = synth();
    assert_eq!(count_of_type(&template, "AWS::ApiGateway::RestApi"), 1);
    assert_eq!(count_of_type(&template, "AWS::ApiGateway::DomainName"), 1);
    assert_eq!(count_of_type(&template, "AWS::ApiGateway::BasePathMapping"), 1);
    assert_eq!(count_of_type(&template, "AWS::ApiGateway::Deployment"), 1);
    assert_eq!(count_of_type(&template, "AWS::ApiGateway::Stage"), 1);
    assert_eq!(count_of_type(&template, "AWS::Route53::RecordSet"), 1);
    // one path resource (health), one GET, two preflights
    assert_eq!(count_of_type(&template, "AWS::ApiGateway::Resource"), 1);
    assert_eq!(count_of_type(&template, "AWS::ApiGateway::Method"), 3);
}

#[test]
fn parameters_are_symbolic_parameter_store_lookups() {
    let template = synth();
    for (id, store_name) in [
        (params::HOSTED_ZONE_ID, "/route53/hosted-zone-id"),
        (params::HOSTED_ZONE_NAME, "/route53/hosted-zone-name"),
        (params::CERTIFICATE_ARN, "/acm/certificate-arn-eu-west-1"),
    ] {
        let parameter = &template["Parameters"][id];
        assert_eq!(
            parameter["Type"],
            json!("AWS::SSM::Parameter::Value<String>"),
            "{id}"
        );
        assert_eq!(parameter["Default"], json!(store_name), "{id}");
    }
}

#[test]
fn certificate_parameter_tracks_the_deployment_region() {
    let ctx = DeployContext::new("us-east-2").unwrap();
    let template = serde_json::to_value(compose(&ctx).unwrap()).unwrap();
    assert_eq!(
        template["Parameters"][params::CERTIFICATE_ARN]["Default"],
        json!("/acm/certificate-arn-us-east-2")
    );
}

#[test]
fn gateway_is_named_and_staged_per_contract() {
    let template = synth();
    assert_eq!(
        template["Resources"][logical::REST_API]["Properties"]["Name"],
        json!("CvBuilderApi")
    );
    let stage = &template["Resources"][logical::STAGE]["Properties"];
    assert_eq!(stage["StageName"], json!("v1"));
    assert_eq!(stage["RestApiId"], json!({"Ref": "CvBuilderApi"}));
}

#[test]
fn health_route_answers_with_the_literal_body() {
    let template = synth();
    let get = &template["Resources"][logical::HEALTH_GET]["Properties"];
    assert_eq!(get["HttpMethod"], json!("GET"));
    assert_eq!(get["AuthorizationType"], json!("NONE"));

    let integration = &get["Integration"];
    assert_eq!(integration["Type"], json!("MOCK"));
    assert_eq!(integration["PassthroughBehavior"], json!("NEVER"));
    assert_eq!(
        integration["RequestTemplates"]["application/json"],
        json!(r#"{"statusCode": 200}"#)
    );

    let response = &integration["IntegrationResponses"][0];
    assert_eq!(response["StatusCode"], json!("200"));
    assert_eq!(
        response["ResponseTemplates"]["application/json"],
        json!(r#"{"message":"OK","timestamp":"$context.requestTime"}"#)
    );
}

#[test]
fn health_route_carries_the_fixed_cors_headers() {
    let template = synth();
    let response = &template["Resources"][logical::HEALTH_GET]["Properties"]["Integration"]
        ["IntegrationResponses"][0];
    let headers = &response["ResponseParameters"];
    assert_eq!(
        headers["method.response.header.Access-Control-Allow-Origin"],
        json!({"Fn::Sub": "'https://cvbuilder.${HostedZoneName}'"})
    );
    assert_eq!(
        headers["method.response.header.Access-Control-Allow-Methods"],
        json!("'GET,OPTIONS'")
    );
    assert_eq!(
        headers["method.response.header.Access-Control-Allow-Headers"],
        json!("'Content-Type,Authorization'")
    );

    // the method response declares the same three headers
    let declared = &template["Resources"][logical::HEALTH_GET]["Properties"]["MethodResponses"]
        [0]["ResponseParameters"];
    assert_eq!(declared.as_object().unwrap().len(), 3);
    assert_eq!(
        template["Resources"][logical::HEALTH_GET]["Properties"]["MethodResponses"][0]
            ["ResponseModels"]["application/json"],
        json!("Empty")
    );
}

#[test]
fn preflights_allow_the_zone_wildcard_origin() {
    let template = synth();
    for id in [logical::ROOT_PREFLIGHT, logical::HEALTH_PREFLIGHT] {
        let method = &template["Resources"][id]["Properties"];
        assert_eq!(method["HttpMethod"], json!("OPTIONS"), "{id}");
        let headers = &method["Integration"]["IntegrationResponses"][0]["ResponseParameters"];
        assert_eq!(
            headers["method.response.header.Access-Control-Allow-Origin"],
            json!({"Fn::Sub": "'https://*.${HostedZoneName}'"}),
            "{id}"
        );
        assert_eq!(
            headers["method.response.header.Access-Control-Allow-Methods"],
            json!("'GET,POST,OPTIONS'"),
            "{id}"
        );
        assert_eq!(
            headers["method.response.header.Access-Control-Allow-Headers"],
            json!("'Content-Type,Authorization'"),
            "{id}"
        );
    }
}

#[test]
fn custom_domain_is_regional_with_modern_tls() {
    let template = synth();
    let domain = &template["Resources"][logical::DOMAIN_NAME]["Properties"];
    assert_eq!(
        domain["DomainName"],
        json!({"Fn::Sub": "cvbuilder.${HostedZoneName}"})
    );
    assert_eq!(domain["EndpointConfiguration"]["Types"], json!(["REGIONAL"]));
    assert_eq!(
        domain["RegionalCertificateArn"],
        json!({"Ref": "CertificateArn"})
    );
    assert_eq!(domain["SecurityPolicy"], json!("TLS_1_2"));
    assert!(domain.get("CertificateArn").is_none());
}

#[test]
fn base_path_mapping_binds_v1_to_the_stage() {
    let template = synth();
    let mapping = &template["Resources"][logical::BASE_PATH_MAPPING]["Properties"];
    assert_eq!(mapping["BasePath"], json!("v1"));
    assert_eq!(mapping["Stage"], json!("v1"));
    assert_eq!(mapping["DomainName"], json!({"Ref": "CvBuilderDomainName"}));
    assert_eq!(
        template["Resources"][logical::BASE_PATH_MAPPING]["DependsOn"],
        json!(["CvBuilderApiStage"])
    );
}

#[test]
fn alias_record_points_the_subdomain_at_the_domain() {
    let template = synth();
    let record = &template["Resources"][logical::ALIAS_RECORD]["Properties"];
    assert_eq!(
        record["Name"],
        json!({"Fn::Sub": "cvbuilder.${HostedZoneName}"})
    );
    assert_eq!(record["Type"], json!("A"));
    assert_eq!(record["HostedZoneId"], json!({"Ref": "HostedZoneId"}));
    assert_eq!(
        record["AliasTarget"],
        json!({
            "DNSName": {"Fn::GetAtt": ["CvBuilderDomainName", "RegionalDomainName"]},
            "HostedZoneId": {"Fn::GetAtt": ["CvBuilderDomainName", "RegionalHostedZoneId"]},
        })
    );
    assert!(record.get("TTL").is_none());
}

#[test]
fn deployment_waits_for_every_method() {
    let template = synth();
    let resources = template["Resources"].as_object().unwrap();
    let (_, deployment) = resources
        .iter()
        .find(|(_, resource)| resource["Type"] == "AWS::ApiGateway::Deployment")
        .expect("deployment is declared");
    let depends_on = deployment["DependsOn"].as_array().unwrap();
    for method in [
        logical::ROOT_PREFLIGHT,
        logical::HEALTH_GET,
        logical::HEALTH_PREFLIGHT,
    ] {
        assert!(depends_on.contains(&json!(method)), "{method}");
    }
}

#[test]
fn outputs_expose_endpoint_and_domain() {
    let template = synth();
    assert_eq!(
        template["Outputs"][outputs::ENDPOINT_URL]["Value"],
        json!({"Fn::Join": ["", [
            "https://",
            {"Ref": "CvBuilderApi"},
            ".execute-api.",
            {"Ref": "AWS::Region"},
            ".",
            {"Ref": "AWS::URLSuffix"},
            "/",
            {"Ref": "CvBuilderApiStage"},
            "/",
        ]]})
    );
    assert_eq!(
        template["Outputs"][outputs::DOMAIN_NAME]["Value"],
        json!({"Fn::Sub": "cvbuilder.${HostedZoneName}"})
    );
}

#[test]
fn invalid_region_fails_before_anything_is_declared() {
    let err = DeployContext::new("not-a-region").unwrap_err();
    assert!(matches!(err, StackError::InvalidRegion(_)));
    assert!(err.to_string().contains("not-a-region"));
}

#[test]
fn recomposition_is_byte_identical() {
    let ctx = DeployContext::new("eu-west-1").unwrap();
    let first = compose(&ctx).unwrap().to_json().unwrap();
    let second = compose(&ctx).unwrap().to_json().unwrap();
    assert_eq!(first, second);
}

#[test]
fn template_carries_the_format_version() {
    let template = synth();
    assert_eq!(template["AWSTemplateFormatVersion"], json!("2010-09-09"));
}

#[test]
fn health_path_is_declared_under_the_root() {
    let template = synth();
    let resource = &template["Resources"][logical::HEALTH_RESOURCE]["Properties"];
    assert_eq!(resource["PathPart"], json!(stack::HEALTH_PATH));
    assert_eq!(
        resource["ParentId"],
        json!({"Fn::GetAtt": ["CvBuilderApi", "RootResourceId"]})
    );
}
