//! Resource type registry.
//!
//! Maps the `resourceType` discriminator to the decoder of a declared shape.
//! A registry is built once and passed to every decode call; types it does
//! not know decode as [`UnknownResource`].

use crate::any::{AnyResource, UnknownResource};
use crate::codec::{decode_structure, DecodeContext, DecodeOptions, Manifest, Structure};
use crate::error::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

type DecodeFn = fn(&Value, DecodeContext<'_>, String) -> Result<AnyResource>;

/// Decoder and manifest of one registered resource type.
#[derive(Clone, Copy)]
pub struct RegistryEntry {
    pub resource_type: &'static str,
    pub manifest: &'static Manifest,
    decode: DecodeFn,
}

impl fmt::Debug for RegistryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("resource_type", &self.resource_type)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
pub struct ResourceRegistry {
    entries: HashMap<&'static str, RegistryEntry>,
}

fn decode_as<T>(value: &Value, context: DecodeContext<'_>, path: String) -> Result<AnyResource>
where
    T: Structure + Into<AnyResource>,
{
    decode_structure::<T>(value, context, path).map(Into::into)
}

impl ResourceRegistry {
    /// A registry with no types; everything decodes as unknown.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Process-wide standard registry, built on first use.
    pub fn shared() -> &'static ResourceRegistry {
        static SHARED: OnceLock<ResourceRegistry> = OnceLock::new();
        SHARED.get_or_init(ResourceRegistry::standard)
    }

    pub fn register<T>(&mut self) -> &mut Self
    where
        T: Structure + Into<AnyResource>,
    {
        self.entries.insert(
            T::TYPE_NAME,
            RegistryEntry {
                resource_type: T::TYPE_NAME,
                manifest: T::manifest(),
                decode: decode_as::<T>,
            },
        );
        self
    }

    pub fn get(&self, resource_type: &str) -> Option<&RegistryEntry> {
        self.entries.get(resource_type)
    }

    pub fn contains(&self, resource_type: &str) -> bool {
        self.entries.contains_key(resource_type)
    }

    /// Registered type names, sorted.
    pub fn resource_types(&self) -> Vec<&'static str> {
        let mut types: Vec<_> = self.entries.keys().copied().collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Decodes a top-level resource. Error paths start at its resource type.
    pub fn decode(&self, value: &Value, options: DecodeOptions) -> Result<AnyResource> {
        let path = value
            .get("resourceType")
            .and_then(Value::as_str)
            .unwrap_or("Resource")
            .to_string();
        self.decode_with(value, DecodeContext::new(self, options), path)
    }

    /// Decodes a resource found at `path` inside another document.
    pub fn decode_with(
        &self,
        value: &Value,
        context: DecodeContext<'_>,
        path: String,
    ) -> Result<AnyResource> {
        let Value::Object(object) = value else {
            return Err(Error::ExpectedObject { path });
        };
        let Some(resource_type) = object.get("resourceType").and_then(Value::as_str) else {
            return Err(Error::MissingResourceType { path });
        };
        match self.entries.get(resource_type) {
            Some(entry) => (entry.decode)(value, context, path),
            None => {
                tracing::debug!(resource_type, %path, "no registered shape, keeping resource opaque");
                Ok(AnyResource::Unknown(UnknownResource::from_object(
                    resource_type,
                    object,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{Bundle, Patient};
    use serde_json::json;

    #[test]
    fn standard_registry_lists_declared_resources() {
        let registry = ResourceRegistry::standard();
        assert!(registry.contains("Patient"));
        assert!(registry.contains("Bundle"));
        assert!(!registry.contains("Medication"));
        assert_eq!(registry.resource_types().first(), Some(&"Appointment"));
        assert_eq!(registry.get("Patient").unwrap().manifest.type_name, "Patient");
    }

    #[test]
    fn missing_resource_type_is_structural() {
        let err = ResourceRegistry::standard()
            .decode(&json!({ "id": "x" }), DecodeOptions::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingResourceType { path } if path == "Resource"));
    }

    #[test]
    fn subset_registry_falls_back_for_the_rest() {
        let mut registry = ResourceRegistry::empty();
        registry.register::<Bundle>();
        let input = json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [{ "resource": { "resourceType": "Patient", "id": "p1" } }]
        });
        let AnyResource::Bundle(bundle) = registry.decode(&input, DecodeOptions::default()).unwrap()
        else {
            panic!("expected a bundle");
        };
        let nested = bundle.resources().next().unwrap();
        assert!(nested.is_unknown());
        assert!(nested.downcast_ref::<Patient>().is_none());
        assert_eq!(AnyResource::Bundle(bundle).to_json(), input);
    }

    #[test]
    fn nested_errors_carry_the_full_path() {
        let input = json!({
            "resourceType": "Bundle",
            "type": "collection",
            "entry": [{ "resource": { "resourceType": "Patient", "birthDate": "1990-13-01" } }]
        });
        let err = ResourceRegistry::standard()
            .decode(&input, DecodeOptions::default())
            .unwrap_err();
        match err {
            Error::InvalidPrimitive { path, .. } => {
                assert_eq!(path, "Bundle.entry[0].resource.birthDate")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
