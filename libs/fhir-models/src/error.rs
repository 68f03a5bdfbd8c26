//! Error types for FHIR models

use thiserror::Error;

/// Structural failure while decoding a JSON tree into typed values.
///
/// Every variant names the JSON path (`Condition.stage[0].summary`) where the
/// problem was detected.
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object at {path}")]
    ExpectedObject { path: String },

    #[error("expected a JSON array at {path}")]
    ExpectedArray { path: String },

    #[error("missing resourceType at {path}")]
    MissingResourceType { path: String },

    #[error("resourceType mismatch at {path}: expected {expected}, found {found}")]
    ResourceTypeMismatch {
        path: String,
        expected: &'static str,
        found: String,
    },

    #[error("missing required property {path}")]
    MissingRequired { path: String },

    #[error("ambiguous choice at {path}: found {}", keys.join(", "))]
    AmbiguousChoice { path: String, keys: Vec<String> },

    #[error("type {tag} is not allowed for choice {path}")]
    DisallowedChoice { path: String, tag: &'static str },

    #[error("invalid {kind} at {path}: {message}")]
    InvalidPrimitive {
        path: String,
        kind: &'static str,
        message: String,
    },

    #[error("unknown property {path}")]
    UnknownProperty { path: String },

    #[error("{type_name} does not declare property '{property}'")]
    UndeclaredProperty {
        type_name: &'static str,
        property: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
