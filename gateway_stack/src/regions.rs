//! AWS region codes accepted as a deployment target.

pub const VALID_AWS_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    "ca-central-1",
    "ca-west-1",
    "eu-north-1",
    "eu-west-3",
    "eu-west-2",
    "eu-west-1",
    "eu-central-1",
    "eu-central-2",
    "eu-south-1",
    "eu-south-2",
    "ap-south-1",
    "ap-south-2",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ap-east-1",
    "sa-east-1",
    "me-south-1",
    "me-central-1",
    "il-central-1",
    "af-south-1",
    "us-gov-east-1",
    "us-gov-west-1",
];

pub fn is_valid_region(region: &str) -> bool {
    VALID_AWS_REGIONS.contains(&region)
}

/// `None` when the region is usable, otherwise a message naming the problem.
pub fn verify_region(region: &str) -> Option<String> {
    if !is_valid_region(region) {
        Some(format!(
            "unknown AWS region {:?}, must be one of {:?}",
            region, VALID_AWS_REGIONS
        ))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_regions_pass() {
        assert!(is_valid_region("eu-west-1"));
        assert!(verify_region("us-east-1").is_none());
    }

    #[test]
    fn unknown_regions_are_named_in_the_message() {
        let message = verify_region("mars-east-1").unwrap();
        assert!(message.contains("mars-east-1"));
        assert!(verify_region("").is_some());
    }
}
