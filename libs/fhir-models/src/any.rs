//! `AnyResource`: the closed set of declared resources plus an opaque
//! fallback for everything else.

use crate::codec::{encode_element, Structure};
use crate::error::Result;
use crate::registry::ResourceRegistry;
use crate::resource::{DomainResource, Meta, Resource};
use crate::resources::*;
use crate::visit::{Visit, Visitor};
use serde_json::{Map, Value};
use std::any::Any;

macro_rules! any_resource {
    (
        domain { $($domain:ident),* $(,)? }
        plain { $($plain:ident),* $(,)? }
    ) => {
        /// A decoded resource of any kind.
        #[derive(Debug, Clone, PartialEq)]
        pub enum AnyResource {
            $($domain(Box<$domain>),)*
            $($plain(Box<$plain>),)*
            /// A resource type with no declared shape, kept verbatim.
            Unknown(UnknownResource),
        }

        impl AnyResource {
            pub fn resource_type(&self) -> &str {
                match self {
                    $(AnyResource::$domain(_) => <$domain as Structure>::TYPE_NAME,)*
                    $(AnyResource::$plain(_) => <$plain as Structure>::TYPE_NAME,)*
                    AnyResource::Unknown(r) => &r.resource_type,
                }
            }

            pub fn id(&self) -> Option<&str> {
                match self {
                    $(AnyResource::$domain(r) => Resource::id(&**r),)*
                    $(AnyResource::$plain(r) => Resource::id(&**r),)*
                    AnyResource::Unknown(r) => r.id.as_deref(),
                }
            }

            /// Metadata of declared resources; unknown resources keep `meta`
            /// as raw JSON in their field map.
            pub fn meta(&self) -> Option<&Meta> {
                match self {
                    $(AnyResource::$domain(r) => Resource::meta(&**r),)*
                    $(AnyResource::$plain(r) => Resource::meta(&**r),)*
                    AnyResource::Unknown(_) => None,
                }
            }

            /// Contained resources of a domain resource.
            pub fn contained(&self) -> &[AnyResource] {
                match self {
                    $(AnyResource::$domain(r) => DomainResource::contained(&**r),)*
                    _ => &[],
                }
            }

            pub fn is_domain_resource(&self) -> bool {
                match self {
                    $(AnyResource::$domain(_) => true,)*
                    _ => false,
                }
            }

            pub fn as_visit(&self) -> &dyn Visit {
                match self {
                    $(AnyResource::$domain(r) => &**r,)*
                    $(AnyResource::$plain(r) => &**r,)*
                    AnyResource::Unknown(r) => r,
                }
            }

            /// Encodes through the structural codec, `resourceType` first.
            pub fn to_json(&self) -> Value {
                match self {
                    $(AnyResource::$domain(r) => encode_element(&**r),)*
                    $(AnyResource::$plain(r) => encode_element(&**r),)*
                    AnyResource::Unknown(r) => r.to_json(),
                }
            }
        }

        $(
            impl From<$domain> for AnyResource {
                fn from(resource: $domain) -> Self {
                    AnyResource::$domain(Box::new(resource))
                }
            }
        )*
        $(
            impl From<$plain> for AnyResource {
                fn from(resource: $plain) -> Self {
                    AnyResource::$plain(Box::new(resource))
                }
            }
        )*

        impl ResourceRegistry {
            /// Registry of every declared resource shape.
            pub fn standard() -> Self {
                let mut registry = Self::empty();
                $(registry.register::<$domain>();)*
                $(registry.register::<$plain>();)*
                registry
            }
        }
    };
}

any_resource! {
    domain { Appointment, Basic, Condition, Observation, OperationOutcome, Patient }
    plain { Bundle }
}

impl AnyResource {
    /// Decodes through the shared standard registry with default options.
    pub fn from_json(value: &Value) -> Result<Self> {
        ResourceRegistry::shared().decode(value, Default::default())
    }

    /// The concrete resource, if it has type `T`.
    pub fn downcast_ref<T: Structure>(&self) -> Option<&T> {
        self.as_visit().as_any().downcast_ref::<T>()
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, AnyResource::Unknown(_))
    }
}

impl From<UnknownResource> for AnyResource {
    fn from(resource: UnknownResource) -> Self {
        AnyResource::Unknown(resource)
    }
}

impl serde::Serialize for AnyResource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&self.to_json(), serializer)
    }
}

impl<'de> serde::Deserialize<'de> for AnyResource {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = <Value as serde::Deserialize>::deserialize(deserializer)?;
        AnyResource::from_json(&value).map_err(serde::de::Error::custom)
    }
}

/// A resource whose type has no registered shape.
///
/// `id` is lifted out when it is a string; every other key, including a
/// non-string `id`, is kept verbatim in `fields`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UnknownResource {
    pub resource_type: String,
    pub id: Option<String>,
    pub fields: Map<String, Value>,
}

impl UnknownResource {
    pub fn new(resource_type: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Default::default()
        }
    }

    pub(crate) fn from_object(resource_type: &str, object: &Map<String, Value>) -> Self {
        let mut id = None;
        let mut fields = Map::new();
        for (key, value) in object {
            match (key.as_str(), value) {
                ("resourceType", _) => {}
                ("id", Value::String(s)) => id = Some(s.clone()),
                _ => {
                    fields.insert(key.clone(), value.clone());
                }
            }
        }
        Self {
            resource_type: resource_type.to_string(),
            id,
            fields,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn to_json(&self) -> Value {
        let mut object = Map::new();
        object.insert(
            "resourceType".to_string(),
            Value::String(self.resource_type.clone()),
        );
        if let Some(id) = &self.id {
            object.insert("id".to_string(), Value::String(id.clone()));
        }
        for (key, value) in &self.fields {
            object.insert(key.clone(), value.clone());
        }
        Value::Object(object)
    }
}

/// Opaque to traversal: nothing below an unknown resource is typed.
impl Visit for UnknownResource {
    fn type_name(&self) -> &'static str {
        "Resource"
    }

    fn walk<'a>(&'a self, _visitor: &mut dyn Visitor<'a>) {}

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn unknown_resource_keeps_every_key() {
        let input = json!({
            "resourceType": "Medication",
            "id": "med-1",
            "code": { "text": "aspirin" },
            "status": "active",
            "_status": { "extension": [{ "url": "http://example.org/x", "valueBoolean": true }] }
        });
        let resource = AnyResource::from_json(&input).unwrap();
        assert!(resource.is_unknown());
        assert_eq!(resource.resource_type(), "Medication");
        assert_eq!(resource.id(), Some("med-1"));
        assert_eq!(resource.to_json(), input);
    }

    #[test]
    fn non_string_id_stays_in_fields() {
        let input = json!({ "resourceType": "Device", "id": 7 });
        let AnyResource::Unknown(unknown) = AnyResource::from_json(&input).unwrap() else {
            panic!("expected an unknown resource");
        };
        assert_eq!(unknown.id, None);
        assert_eq!(unknown.get("id"), Some(&json!(7)));
        assert_eq!(AnyResource::Unknown(unknown).to_json(), input);
    }

    #[test]
    fn downcast_reaches_the_concrete_shape() {
        let resource = AnyResource::from(Patient {
            id: Some("p1".into()),
            ..Default::default()
        });
        assert_eq!(resource.resource_type(), "Patient");
        assert_eq!(resource.downcast_ref::<Patient>().and_then(|p| p.id.as_deref()), Some("p1"));
        assert!(resource.downcast_ref::<Condition>().is_none());
        assert!(resource.is_domain_resource());
    }
}
