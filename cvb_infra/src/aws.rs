//! AWS SDK client bundle for the deploy CLI.

use aws_config::{BehaviorVersion, Region};

/// CloudFormation and SSM clients pinned to the deployment region.
///
/// Both clients share the same underlying [`aws_config::SdkConfig`] so that
/// credentials are resolved once and reused.
#[derive(Clone)]
pub struct AwsClients {
    /// Applies and polls the gateway stack.
    pub cloudformation: aws_sdk_cloudformation::Client,
    /// Reads the parameter store entries the stack resolves.
    pub ssm: aws_sdk_ssm::Client,
}

impl AwsClients {
    /// Initialize both clients against the given region. Credentials come
    /// from the standard AWS credential chain.
    pub async fn init(region: &str) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Self {
            cloudformation: aws_sdk_cloudformation::Client::new(&config),
            ssm: aws_sdk_ssm::Client::new(&config),
        }
    }
}
