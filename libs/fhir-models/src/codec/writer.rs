//! Manifest-ordered encoding into JSON objects.
//!
//! Absent values, empty lists and empty objects are never written.

use super::{Structure, WireList, WireValue};
use crate::any::AnyResource;
use crate::primitive::{Primitive, PrimitiveValue};
use serde_json::{Map, Value};

/// Encodes a declared shape into a JSON object.
pub fn encode_structure<T: Structure>(value: &T) -> Map<String, Value> {
    let mut writer = StructWriter::new();
    value.write(&mut writer);
    writer.into_map()
}

/// Accumulates the keys of one JSON object in insertion order.
#[derive(Debug, Default)]
pub struct StructWriter {
    object: Map<String, Value>,
}

impl StructWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_map(self) -> Map<String, Value> {
        self.object
    }

    pub fn resource_type(&mut self, resource_type: &str) {
        self.insert("resourceType", Value::String(resource_type.to_string()));
    }

    pub fn optional<T: WireValue>(&mut self, name: &'static str, value: &Option<T>) {
        if let Some(value) = value {
            value.encode_property(name, self);
        }
    }

    pub fn required<T: WireValue>(&mut self, name: &'static str, value: &Option<T>) {
        self.optional(name, value);
    }

    pub fn list<T: WireList>(&mut self, name: &'static str, values: &[T]) {
        if !values.is_empty() {
            T::encode_list(values, name, self);
        }
    }

    pub fn required_list<T: WireList>(&mut self, name: &'static str, values: &[T]) {
        self.list(name, values);
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        match &value {
            Value::Null => {}
            Value::Array(items) if items.is_empty() => {}
            Value::Object(map) if map.is_empty() => {}
            _ => {
                self.object.insert(key.into(), value);
            }
        }
    }

    pub fn structure<T: Structure>(&mut self, key: &str, value: &T) {
        self.insert(key, Value::Object(encode_structure(value)));
    }

    /// Items that encode to `{}` are dropped; the key goes when none remain.
    pub fn structure_list<T: Structure>(&mut self, key: &str, values: &[T]) {
        let items = values
            .iter()
            .map(encode_structure)
            .filter(|map| !map.is_empty())
            .map(Value::Object)
            .collect();
        self.insert(key, Value::Array(items));
    }

    pub fn resource(&mut self, key: &str, resource: &AnyResource) {
        self.insert(key, resource.to_json());
    }

    pub fn resource_list(&mut self, key: &str, resources: &[AnyResource]) {
        let items = resources
            .iter()
            .map(AnyResource::to_json)
            .filter(|value| !matches!(value, Value::Object(map) if map.is_empty()))
            .collect();
        self.insert(key, Value::Array(items));
    }

    pub fn string(&mut self, key: &str, value: &str) {
        self.insert(key, Value::String(value.to_string()));
    }

    pub fn string_list(&mut self, key: &str, values: &[String]) {
        let items = values.iter().cloned().map(Value::String).collect();
        self.insert(key, Value::Array(items));
    }

    /// Writes the scalar under `key` and id/extensions under `_key`.
    pub fn primitive<T: PrimitiveValue>(&mut self, key: &str, value: &Primitive<T>) {
        if let Some(scalar) = &value.value {
            self.insert(key, scalar.to_json());
        }
        if value.has_metadata() {
            self.insert(format!("_{key}"), primitive_metadata(value));
        }
    }

    /// Writes aligned `key` / `_key` arrays, using `null` for holes.
    pub fn primitive_list<T: PrimitiveValue>(&mut self, key: &str, values: &[Primitive<T>]) {
        if values.iter().any(Primitive::has_value) {
            let items = values
                .iter()
                .map(|p| p.value.as_ref().map_or(Value::Null, PrimitiveValue::to_json))
                .collect();
            self.object.insert(key.to_string(), Value::Array(items));
        }
        if values.iter().any(Primitive::has_metadata) {
            let items = values
                .iter()
                .map(|p| {
                    if p.has_metadata() {
                        primitive_metadata(p)
                    } else {
                        Value::Null
                    }
                })
                .collect();
            self.object.insert(format!("_{key}"), Value::Array(items));
        }
    }
}

fn primitive_metadata<T>(value: &Primitive<T>) -> Value {
    let mut meta = StructWriter::new();
    if let Some(id) = &value.id {
        meta.string("id", id);
    }
    meta.structure_list("extension", &value.extension);
    Value::Object(meta.into_map())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datatypes::Coding;
    use serde_json::json;

    #[test]
    fn insert_skips_empty_values() {
        let mut writer = StructWriter::new();
        writer.insert("a", Value::Null);
        writer.insert("b", json!([]));
        writer.insert("c", json!({}));
        writer.insert("d", json!("x"));
        assert_eq!(Value::Object(writer.into_map()), json!({ "d": "x" }));
    }

    #[test]
    fn empty_list_items_are_dropped() {
        let values = vec![Coding::default(), Coding::new("http://loinc.org", "1234-5")];
        let mut writer = StructWriter::new();
        writer.structure_list("coding", &values);
        writer.structure_list("empty", &[Coding::default()]);
        assert_eq!(
            Value::Object(writer.into_map()),
            json!({ "coding": [{ "system": "http://loinc.org", "code": "1234-5" }] })
        );
    }

    #[test]
    fn primitive_lists_keep_holes_aligned() {
        let mut annotated = Primitive::<String>::default();
        annotated.id = Some("g2".into());
        let values = vec![Primitive::from("Adam"), annotated];

        let mut writer = StructWriter::new();
        writer.primitive_list("given", &values);
        assert_eq!(
            Value::Object(writer.into_map()),
            json!({ "given": ["Adam", null], "_given": [null, { "id": "g2" }] })
        );
    }
}
