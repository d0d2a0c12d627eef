// ABOUTME: Secret and setting values with environment variable interpolation.
// ABOUTME: Handles literal values and references to environment variables.

use crate::error::{Error, Result};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum EnvValue {
    Literal(String),
    FromEnv {
        #[serde(rename = "env")]
        var: String,
        #[serde(default)]
        default: Option<String>,
    },
}

impl EnvValue {
    /// Reference an environment variable with no fallback.
    pub fn env(var: &str) -> Self {
        EnvValue::FromEnv {
            var: var.to_string(),
            default: None,
        }
    }

    /// Resolve the value. Unset and empty variables count as missing.
    pub fn resolve(&self) -> Result<String> {
        match self {
            EnvValue::Literal(s) => Ok(s.clone()),
            EnvValue::FromEnv { var, default } => match std::env::var(var) {
                Ok(val) if !val.is_empty() => Ok(val),
                _ => default
                    .clone()
                    .ok_or_else(|| Error::MissingCredential(var.clone())),
            },
        }
    }
}
