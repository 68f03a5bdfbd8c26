use crate::validator::ValidationIssue;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Raised only when a caller turns an outcome into a pass/fail result.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Every error-severity issue of a run, in visitation order.
    #[error("validation failed with {count} error(s): {message}")]
    Combined { count: usize, message: String },

    /// A single error-severity issue.
    #[error("{0}")]
    Issue(ValidationIssue),
}
