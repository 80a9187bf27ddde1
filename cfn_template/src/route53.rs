//! Typed properties for `AWS::Route53::RecordSet`.

use serde::Serialize;

use crate::expr::Expr;
use crate::template::CfnResource;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordType {
    #[default]
    A,
    Aaaa,
    Cname,
    Mx,
    Ns,
    Ptr,
    Soa,
    Spf,
    Srv,
    Txt,
}

/// Target of an alias record. Unlike a plain record, an alias points at an
/// AWS endpoint and is resolved by Route 53 itself, with no TTL to manage.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AliasTarget {
    // Route 53 spells this one DNSName, not DnsName
    #[serde(rename = "DNSName")]
    pub dns_name: Expr,
    #[serde(rename = "HostedZoneId")]
    pub hosted_zone_id: Expr,
    #[serde(rename = "EvaluateTargetHealth", skip_serializing_if = "Option::is_none")]
    pub evaluate_target_health: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RecordSet {
    pub name: Expr,
    #[serde(rename = "Type")]
    pub record_type: RecordType,
    /// The zone the record lands in, by id. Exactly one of this and
    /// `hosted_zone_name` must be set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_zone_id: Option<Expr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_zone_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_target: Option<AliasTarget>,
    #[serde(rename = "TTL", skip_serializing_if = "Option::is_none")]
    pub ttl: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resource_records: Vec<Expr>,
}

impl CfnResource for RecordSet {
    const TYPE: &'static str = "AWS::Route53::RecordSet";

    fn validate(&self) -> Result<(), String> {
        if self.name.text().is_some_and(str::is_empty) {
            return Err(
                "a record set must have a name, e.g. mysubdomain.mywebsite.com".to_string(),
            );
        }
        match (&self.hosted_zone_id, &self.hosted_zone_name) {
            (None, None) => {
                return Err(
                    "a record set must name its zone via HostedZoneId or HostedZoneName"
                        .to_string(),
                )
            }
            (Some(_), Some(_)) => {
                return Err(
                    "a record set must not set both HostedZoneId and HostedZoneName".to_string(),
                )
            }
            _ => {}
        }
        if let Some(zone_name) = &self.hosted_zone_name {
            // Route 53 zone names are fully qualified
            if !zone_name.ends_with('.') {
                return Err(format!("hosted zone name {zone_name:?} must end with a dot"));
            }
        }
        if self.alias_target.is_some() {
            if self.ttl.is_some() || !self.resource_records.is_empty() {
                return Err("an alias record must not set TTL or ResourceRecords".to_string());
            }
        } else if self.resource_records.is_empty() {
            return Err("a non-alias record must provide ResourceRecords".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn alias_record() -> RecordSet {
        RecordSet {
            name: Expr::sub("cvbuilder.${HostedZoneName}"),
            record_type: RecordType::A,
            hosted_zone_id: Some(Expr::reference("HostedZoneId")),
            alias_target: Some(AliasTarget {
                dns_name: Expr::get_att("Domain", "RegionalDomainName"),
                hosted_zone_id: Expr::get_att("Domain", "RegionalHostedZoneId"),
                evaluate_target_health: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn alias_target_uses_the_dnsname_spelling() {
        let value = serde_json::to_value(alias_record()).unwrap();
        assert_eq!(
            value["AliasTarget"]["DNSName"],
            json!({"Fn::GetAtt": ["Domain", "RegionalDomainName"]})
        );
        assert_eq!(value["Type"], json!("A"));
        assert!(value.get("TTL").is_none());
    }

    #[test]
    fn alias_records_carry_no_ttl_or_records() {
        assert!(alias_record().validate().is_ok());

        let mut record = alias_record();
        record.ttl = Some("300".to_string());
        assert!(record.validate().is_err());

        let mut record = alias_record();
        record.resource_records = vec![Expr::lit("192.0.2.1")];
        assert!(record.validate().is_err());
    }

    #[test]
    fn record_names_exactly_one_zone() {
        let mut record = alias_record();
        record.hosted_zone_name = Some("mywebsite.com.".to_string());
        assert!(record.validate().is_err());

        record.hosted_zone_id = None;
        assert!(record.validate().is_ok());

        record.hosted_zone_name = None;
        assert!(record.validate().is_err());
    }

    #[test]
    fn zone_names_must_be_fully_qualified() {
        let mut record = alias_record();
        record.hosted_zone_id = None;
        record.hosted_zone_name = Some("mywebsite.com".to_string());
        assert!(record.validate().is_err());
    }

    #[test]
    fn plain_records_require_resource_records() {
        let record = RecordSet {
            name: Expr::lit("txt.mywebsite.com"),
            record_type: RecordType::Txt,
            hosted_zone_name: Some("mywebsite.com.".to_string()),
            ..Default::default()
        };
        assert!(record.validate().is_err());

        let record = RecordSet {
            resource_records: vec![Expr::lit("\"v=spf1 -all\"")],
            ttl: Some("300".to_string()),
            ..record
        };
        assert!(record.validate().is_ok());
    }
}
