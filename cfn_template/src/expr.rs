//! CloudFormation intrinsic-function expressions.
//!
//! Most property values in a template are not plain strings: they reference
//! another resource (`Ref`), one of its attributes (`Fn::GetAtt`), or
//! interpolate several values into one string (`Fn::Sub`, `Fn::Join`). The
//! provisioning engine resolves these when the template is applied, which is
//! also how it derives the ordering between resources.

use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// A string-valued CloudFormation expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// A literal string, serialized bare.
    Lit(String),
    /// `{"Ref": "LogicalId"}`. The target's default return value.
    Ref(String),
    /// `{"Fn::GetAtt": ["LogicalId", "Attribute"]}`.
    GetAtt(String, String),
    /// `{"Fn::Sub": "text with ${LogicalId} placeholders"}`.
    Sub(String),
    /// `{"Fn::Join": ["sep", [part, part, ...]]}`.
    Join(String, Vec<Expr>),
}

impl Expr {
    pub fn lit(s: impl Into<String>) -> Self {
        Expr::Lit(s.into())
    }

    pub fn reference(logical_id: impl Into<String>) -> Self {
        Expr::Ref(logical_id.into())
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Expr::GetAtt(logical_id.into(), attribute.into())
    }

    pub fn sub(template: impl Into<String>) -> Self {
        Expr::Sub(template.into())
    }

    /// The textual form of a literal or substitution expression, if it has
    /// one. References have no text until the engine resolves them.
    pub fn text(&self) -> Option<&str> {
        match self {
            Expr::Lit(s) | Expr::Sub(s) => Some(s),
            _ => None,
        }
    }
}

/// An empty literal. Lets property structs derive `Default` so callers can
/// fill only the fields they care about.
impl Default for Expr {
    fn default() -> Self {
        Expr::Lit(String::new())
    }
}

impl From<&str> for Expr {
    fn from(s: &str) -> Self {
        Expr::Lit(s.to_string())
    }
}

impl From<String> for Expr {
    fn from(s: String) -> Self {
        Expr::Lit(s)
    }
}

impl Serialize for Expr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Expr::Lit(s) => serializer.serialize_str(s),
            Expr::Ref(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", id)?;
                map.end()
            }
            Expr::GetAtt(id, attribute) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[id.as_str(), attribute.as_str()])?;
                map.end()
            }
            Expr::Sub(template) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Sub", template)?;
                map.end()
            }
            Expr::Join(separator, parts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &JoinArgs { separator, parts })?;
                map.end()
            }
        }
    }
}

struct JoinArgs<'a> {
    separator: &'a str,
    parts: &'a [Expr],
}

impl Serialize for JoinArgs<'_> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(2))?;
        seq.serialize_element(self.separator)?;
        seq.serialize_element(self.parts)?;
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn to_value(e: &Expr) -> serde_json::Value {
        serde_json::to_value(e).unwrap()
    }

    #[test]
    fn literal_serializes_bare() {
        assert_eq!(to_value(&Expr::lit("v1")), json!("v1"));
    }

    #[test]
    fn reference_serializes_as_ref() {
        assert_eq!(
            to_value(&Expr::reference("MyApi")),
            json!({"Ref": "MyApi"})
        );
    }

    #[test]
    fn get_att_serializes_as_pair() {
        assert_eq!(
            to_value(&Expr::get_att("MyApi", "RootResourceId")),
            json!({"Fn::GetAtt": ["MyApi", "RootResourceId"]})
        );
    }

    #[test]
    fn sub_serializes_template_text() {
        assert_eq!(
            to_value(&Expr::sub("api.${HostedZoneName}")),
            json!({"Fn::Sub": "api.${HostedZoneName}"})
        );
    }

    #[test]
    fn join_serializes_separator_then_parts() {
        let joined = Expr::Join(
            String::new(),
            vec![Expr::lit("https://"), Expr::reference("MyApi")],
        );
        assert_eq!(
            to_value(&joined),
            json!({"Fn::Join": ["", ["https://", {"Ref": "MyApi"}]]})
        );
    }

    #[test]
    fn text_is_only_available_for_literal_forms() {
        assert_eq!(Expr::lit("a").text(), Some("a"));
        assert_eq!(Expr::sub("${X}").text(), Some("${X}"));
        assert_eq!(Expr::reference("X").text(), None);
        assert_eq!(Expr::get_att("X", "Arn").text(), None);
    }
}
