// ABOUTME: Deployment target names validated against a fixed enumeration.
// ABOUTME: Anything outside the list is rejected before any remote call is made.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Every recognized target, in display order.
pub const TARGET_NAMES: [&str; 9] = [
    "dev", "cd", "test", "feature1", "feature2", "feature3", "feature4", "feature5", "prod",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid target \"{given}\"; target must be one of: {}", TARGET_NAMES.join(", "))]
pub struct TargetNameError {
    pub given: String,
}

/// A named deployment destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetName {
    Dev,
    Cd,
    Test,
    Feature1,
    Feature2,
    Feature3,
    Feature4,
    Feature5,
    Prod,
}

impl TargetName {
    pub const ALL: [TargetName; 9] = [
        TargetName::Dev,
        TargetName::Cd,
        TargetName::Test,
        TargetName::Feature1,
        TargetName::Feature2,
        TargetName::Feature3,
        TargetName::Feature4,
        TargetName::Feature5,
        TargetName::Prod,
    ];

    pub fn parse(value: &str) -> Result<Self, TargetNameError> {
        match value {
            "dev" => Ok(TargetName::Dev),
            "cd" => Ok(TargetName::Cd),
            "test" => Ok(TargetName::Test),
            "feature1" => Ok(TargetName::Feature1),
            "feature2" => Ok(TargetName::Feature2),
            "feature3" => Ok(TargetName::Feature3),
            "feature4" => Ok(TargetName::Feature4),
            "feature5" => Ok(TargetName::Feature5),
            "prod" => Ok(TargetName::Prod),
            other => Err(TargetNameError {
                given: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetName::Dev => "dev",
            TargetName::Cd => "cd",
            TargetName::Test => "test",
            TargetName::Feature1 => "feature1",
            TargetName::Feature2 => "feature2",
            TargetName::Feature3 => "feature3",
            TargetName::Feature4 => "feature4",
            TargetName::Feature5 => "feature5",
            TargetName::Prod => "prod",
        }
    }

    /// Production deploys need confirmation and never get a database refresh.
    pub fn is_production(&self) -> bool {
        matches!(self, TargetName::Prod)
    }
}

impl FromStr for TargetName {
    type Err = TargetNameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TargetName {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TargetName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TargetName::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_and_names_agree() {
        for (target, name) in TargetName::ALL.iter().zip(TARGET_NAMES) {
            assert_eq!(target.as_str(), name);
            assert_eq!(TargetName::parse(name).unwrap(), *target);
        }
    }

    #[test]
    fn only_prod_is_production() {
        let prod: Vec<_> = TargetName::ALL
            .iter()
            .filter(|t| t.is_production())
            .collect();
        assert_eq!(prod, vec![&TargetName::Prod]);
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert!(TargetName::parse("Prod").is_err());
        assert!(TargetName::parse(" prod").is_err());
    }

    #[test]
    fn error_lists_allowed_targets() {
        let err = TargetName::parse("staging").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("staging"));
        assert!(msg.contains("dev, cd, test, feature1"));
    }
}
