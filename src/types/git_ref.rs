// ABOUTME: Git reference validation for code switch requests.
// ABOUTME: Accepts branch and tag names like develop or tags/build-0.6.1.

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitRefError {
    #[error("git reference cannot be empty")]
    Empty,

    #[error("invalid character in git reference: '{0}'")]
    InvalidChar(char),

    #[error("invalid git reference: {0}")]
    InvalidFormat(String),
}

/// A tag or branch that has been pushed to the hosting git remote.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitRef(String);

impl GitRef {
    pub fn new(value: &str) -> Result<Self, GitRefError> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(GitRefError::Empty);
        }

        for c in trimmed.chars() {
            if c.is_whitespace()
                || c.is_control()
                || matches!(c, '~' | '^' | ':' | '?' | '*' | '[' | '\\')
            {
                return Err(GitRefError::InvalidChar(c));
            }
        }

        if trimmed.starts_with('/')
            || trimmed.ends_with('/')
            || trimmed.ends_with(".lock")
            || trimmed.contains("..")
            || trimmed.contains("//")
        {
            return Err(GitRefError::InvalidFormat(trimmed.to_string()));
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
