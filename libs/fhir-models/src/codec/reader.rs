//! Manifest-driven decoding of JSON objects.

use super::manifest::{Manifest, PropertyDef};
use super::{Structure, WireList, WireValue};
use crate::any::AnyResource;
use crate::element::Extension;
use crate::error::{Error, Result};
use crate::primitive::{json_kind, Primitive, PrimitiveValue};
use crate::registry::ResourceRegistry;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const NO_VALUES: &[Value] = &[];

/// What to do with object keys no declared property reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownFieldPolicy {
    #[default]
    Ignore,
    /// Log each unknown key through `tracing`.
    Warn,
    /// Fail the decode with [`Error::UnknownProperty`].
    Reject,
}

/// Decoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DecodeOptions {
    /// Treat missing required properties and choice types outside a
    /// property's accepted list as structural errors.
    #[serde(default)]
    pub strict: bool,
    #[serde(default)]
    pub unknown_fields: UnknownFieldPolicy,
}

impl DecodeOptions {
    pub fn strict() -> Self {
        Self {
            strict: true,
            unknown_fields: UnknownFieldPolicy::Reject,
        }
    }
}

/// Registry and options threaded through one decode call.
#[derive(Debug, Clone, Copy)]
pub struct DecodeContext<'a> {
    pub registry: &'a ResourceRegistry,
    pub options: DecodeOptions,
}

impl<'a> DecodeContext<'a> {
    pub fn new(registry: &'a ResourceRegistry, options: DecodeOptions) -> Self {
        Self { registry, options }
    }
}

/// Decodes a JSON value into a declared shape.
pub fn decode_structure<T: Structure>(
    value: &Value,
    context: DecodeContext<'_>,
    path: String,
) -> Result<T> {
    let Value::Object(object) = value else {
        return Err(Error::ExpectedObject { path });
    };
    let reader = StructReader {
        object,
        manifest: T::manifest(),
        context,
        path,
    };
    let decoded = T::read(&reader)?;
    reader.check_unknown_keys()?;
    Ok(decoded)
}

/// Read access to one JSON object being decoded as a declared shape.
pub struct StructReader<'a> {
    object: &'a Map<String, Value>,
    manifest: &'static Manifest,
    context: DecodeContext<'a>,
    path: String,
}

impl<'a> StructReader<'a> {
    pub fn object(&self) -> &'a Map<String, Value> {
        self.object
    }

    pub fn context(&self) -> DecodeContext<'a> {
        self.context
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn child_path(&self, key: &str, index: Option<usize>) -> String {
        match index {
            Some(i) => format!("{}.{}[{}]", self.path, key, i),
            None => format!("{}.{}", self.path, key),
        }
    }

    pub fn optional<T: WireValue>(&self, name: &'static str) -> Result<Option<T>> {
        T::decode_property(self, self.property(name)?)
    }

    pub fn required<T: WireValue>(&self, name: &'static str) -> Result<Option<T>> {
        let value = T::decode_property(self, self.property(name)?)?;
        if value.is_none() && self.context.options.strict {
            return Err(Error::MissingRequired {
                path: self.child_path(name, None),
            });
        }
        Ok(value)
    }

    pub fn list<T: WireList>(&self, name: &'static str) -> Result<Vec<T>> {
        T::decode_list(self, self.property(name)?)
    }

    pub fn required_list<T: WireList>(&self, name: &'static str) -> Result<Vec<T>> {
        let values = T::decode_list(self, self.property(name)?)?;
        if values.is_empty() && self.context.options.strict {
            return Err(Error::MissingRequired {
                path: self.child_path(name, None),
            });
        }
        Ok(values)
    }

    /// Rejects a `resourceType` that names a different resource.
    pub fn expect_resource_type(&self, expected: &'static str) -> Result<()> {
        match self.object.get("resourceType").and_then(Value::as_str) {
            Some(found) if found != expected => Err(Error::ResourceTypeMismatch {
                path: self.path.clone(),
                expected,
                found: found.to_string(),
            }),
            _ => Ok(()),
        }
    }

    pub fn structure<T: Structure>(&self, key: &str) -> Result<Option<T>> {
        match self.object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => {
                decode_structure(value, self.context, self.child_path(key, None)).map(Some)
            }
        }
    }

    pub fn structure_list<T: Structure>(&self, key: &str) -> Result<Vec<T>> {
        self.decode_items(key, |value, path| decode_structure(value, self.context, path))
    }

    pub fn resource(&self, key: &str) -> Result<Option<AnyResource>> {
        match self.object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => self
                .context
                .registry
                .decode_with(value, self.context, self.child_path(key, None))
                .map(Some),
        }
    }

    pub fn resource_list(&self, key: &str) -> Result<Vec<AnyResource>> {
        self.decode_items(key, |value, path| {
            self.context.registry.decode_with(value, self.context, path)
        })
    }

    pub fn string(&self, key: &str) -> Result<Option<String>> {
        match self.object.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => String::from_json(value).map(Some).map_err(|message| {
                Error::InvalidPrimitive {
                    path: self.child_path(key, None),
                    kind: String::KIND,
                    message,
                }
            }),
        }
    }

    pub fn string_list(&self, key: &str) -> Result<Vec<String>> {
        self.decode_items(key, |value, path| {
            String::from_json(value).map_err(|message| Error::InvalidPrimitive {
                path,
                kind: String::KIND,
                message,
            })
        })
    }

    /// Reads `key` and its `_key` metadata sibling.
    pub fn primitive<T: PrimitiveValue>(&self, key: &str) -> Result<Option<Primitive<T>>> {
        let value = self
            .object
            .get(key)
            .filter(|value| !value.is_null())
            .map(|value| self.scalar::<T>(value, self.child_path(key, None)))
            .transpose()?;
        let meta_key = format!("_{key}");
        let (id, extension) = match self.object.get(&meta_key) {
            None | Some(Value::Null) => (None, Vec::new()),
            Some(meta) => self.primitive_metadata(meta, self.child_path(&meta_key, None))?,
        };
        let primitive = Primitive {
            value,
            id,
            extension,
        };
        Ok((!primitive.is_empty()).then_some(primitive))
    }

    /// Reads the aligned `key` / `_key` arrays of a primitive list.
    pub fn primitive_list<T: PrimitiveValue>(&self, key: &str) -> Result<Vec<Primitive<T>>> {
        let meta_key = format!("_{key}");
        let values = self.array(key)?;
        let metas = self.array(&meta_key)?;
        (0..values.len().max(metas.len()))
            .map(|i| {
                let value = values
                    .get(i)
                    .filter(|value| !value.is_null())
                    .map(|value| self.scalar::<T>(value, self.child_path(key, Some(i))))
                    .transpose()?;
                let (id, extension) = match metas.get(i) {
                    None | Some(Value::Null) => (None, Vec::new()),
                    Some(meta) => {
                        self.primitive_metadata(meta, self.child_path(&meta_key, Some(i)))?
                    }
                };
                Ok(Primitive {
                    value,
                    id,
                    extension,
                })
            })
            .collect()
    }

    fn scalar<T: PrimitiveValue>(&self, value: &Value, path: String) -> Result<T> {
        T::from_json(value).map_err(|message| Error::InvalidPrimitive {
            path,
            kind: T::KIND,
            message,
        })
    }

    fn primitive_metadata(
        &self,
        meta: &Value,
        path: String,
    ) -> Result<(Option<String>, Vec<Extension>)> {
        let Value::Object(object) = meta else {
            return Err(Error::ExpectedObject { path });
        };
        let id = match object.get("id") {
            None | Some(Value::Null) => None,
            Some(Value::String(id)) => Some(id.clone()),
            Some(other) => {
                return Err(Error::InvalidPrimitive {
                    path: format!("{path}.id"),
                    kind: String::KIND,
                    message: format!("expected a string, found {}", json_kind(other)),
                })
            }
        };
        let extension = match object.get("extension") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .filter(|(_, item)| !item.is_null())
                .map(|(i, item)| {
                    decode_structure(item, self.context, format!("{path}.extension[{i}]"))
                })
                .collect::<Result<Vec<_>>>()?,
            Some(_) => {
                return Err(Error::ExpectedArray {
                    path: format!("{path}.extension"),
                })
            }
        };
        Ok((id, extension))
    }

    fn array(&self, key: &str) -> Result<&'a [Value]> {
        match self.object.get(key) {
            None | Some(Value::Null) => Ok(NO_VALUES),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(_) => Err(Error::ExpectedArray {
                path: self.child_path(key, None),
            }),
        }
    }

    fn decode_items<T>(
        &self,
        key: &str,
        decode: impl Fn(&'a Value, String) -> Result<T>,
    ) -> Result<Vec<T>> {
        self.array(key)?
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .map(|(i, item)| decode(item, self.child_path(key, Some(i))))
            .collect()
    }

    fn property(&self, name: &'static str) -> Result<&'static PropertyDef> {
        self.manifest
            .property(name)
            .ok_or(Error::UndeclaredProperty {
                type_name: self.manifest.type_name,
                property: name,
            })
    }

    fn check_unknown_keys(&self) -> Result<()> {
        let policy = self.context.options.unknown_fields;
        if policy == UnknownFieldPolicy::Ignore {
            return Ok(());
        }
        for key in self.object.keys() {
            if self.manifest.recognizes(key) {
                continue;
            }
            let path = self.child_path(key, None);
            match policy {
                UnknownFieldPolicy::Reject => return Err(Error::UnknownProperty { path }),
                UnknownFieldPolicy::Warn => tracing::warn!(%path, "ignoring unknown property"),
                UnknownFieldPolicy::Ignore => {}
            }
        }
        Ok(())
    }
}
