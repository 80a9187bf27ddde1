//! A small CloudFormation template model.
//!
//! Covers what a declarative stack definition needs: the template document
//! with its parameters, resources, and outputs ([`template`]), the intrinsic
//! expressions resources use to reference each other ([`expr`]), and typed
//! property structs for the resource namespaces in use ([`apigateway`],
//! [`route53`]). The declared graph is serialized to JSON and handed to
//! CloudFormation; all provisioning logic lives on that side of the fence.

pub mod apigateway;
pub mod expr;
pub mod route53;
pub mod template;

pub use expr::Expr;
pub use template::{
    validate_stack_name, CfnResource, Output, Parameter, ParameterType, ResourceEntry, Template,
    TemplateError, TEMPLATE_FORMAT_VERSION,
};
