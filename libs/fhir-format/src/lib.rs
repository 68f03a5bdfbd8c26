//! FHIR JSON text entry points.
//!
//! [`JsonCodec`] parses JSON text or bytes and hands the tree to the
//! structural codec of `tessera-models`, using one injected
//! [`ResourceRegistry`] and one set of [`DecodeOptions`]. Encoding follows the
//! FHIR JSON rules:
//! - `resourceType` comes first, then properties in declaration order.
//! - Empty lists, empty objects and absent values are omitted.
//! - Primitive metadata (`id`, `extension`) is carried through `_field` entries.

use serde_json::Value;
use std::sync::Arc;
use tessera_models::codec::{decode_element, encode_element};
use tessera_models::{AnyResource, DecodeOptions, ResourceRegistry, Structure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("decode error: {0}")]
    Decode(#[from] tessera_models::Error),
}

pub type Result<T> = std::result::Result<T, FormatError>;

/// Decodes and encodes FHIR JSON documents.
#[derive(Debug, Clone)]
pub struct JsonCodec {
    registry: Arc<ResourceRegistry>,
    options: DecodeOptions,
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new(Arc::new(ResourceRegistry::standard()))
    }
}

impl JsonCodec {
    pub fn new(registry: Arc<ResourceRegistry>) -> Self {
        Self {
            registry,
            options: DecodeOptions::default(),
        }
    }

    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn options(&self) -> DecodeOptions {
        self.options
    }

    pub fn decode_str(&self, input: &str) -> Result<AnyResource> {
        let value: Value = serde_json::from_str(input)?;
        self.decode_value(&value)
    }

    pub fn decode_slice(&self, input: &[u8]) -> Result<AnyResource> {
        let value: Value = serde_json::from_slice(input)?;
        self.decode_value(&value)
    }

    pub fn decode_value(&self, value: &Value) -> Result<AnyResource> {
        let resource = self.registry.decode(value, self.options)?;
        tracing::trace!(resource_type = resource.resource_type(), "decoded resource");
        Ok(resource)
    }

    /// Decodes a standalone element or resource of a known shape.
    pub fn decode_element<T: Structure>(&self, input: &str) -> Result<T> {
        let value: Value = serde_json::from_str(input)?;
        Ok(decode_element(&value, &self.registry, self.options)?)
    }

    pub fn encode_value(&self, resource: &AnyResource) -> Value {
        resource.to_json()
    }

    /// Compact JSON text.
    pub fn encode_string(&self, resource: &AnyResource) -> Result<String> {
        Ok(serde_json::to_string(&resource.to_json())?)
    }

    pub fn encode_pretty(&self, resource: &AnyResource) -> Result<String> {
        Ok(serde_json::to_string_pretty(&resource.to_json())?)
    }

    pub fn encode_element<T: Structure>(&self, element: &T) -> Result<String> {
        Ok(serde_json::to_string(&encode_element(element))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn syntax_errors_are_json_errors() {
        let err = JsonCodec::default().decode_str("{ not json").unwrap_err();
        assert!(matches!(err, FormatError::Json(_)));
    }

    #[test]
    fn structural_errors_are_decode_errors() {
        let err = JsonCodec::default().decode_str(r#"{ "id": "x" }"#).unwrap_err();
        assert!(matches!(
            err,
            FormatError::Decode(tessera_models::Error::MissingResourceType { .. })
        ));
    }
}
