//! Generic structural codec.
//!
//! Every declared shape carries a static [`Manifest`]; one reader and one
//! writer walk that manifest to map properties to and from JSON. The
//! per-property behavior (primitive split, nested object, resource dispatch,
//! choice keys) is selected by the property's Rust type through
//! [`WireValue`].

mod manifest;
mod reader;
mod writer;

pub use manifest::{Cardinality, DecodeMode, Manifest, PropertyDef};
pub use reader::{
    decode_structure, DecodeContext, DecodeOptions, StructReader, UnknownFieldPolicy,
};
pub use writer::{encode_structure, StructWriter};

use crate::any::AnyResource;
use crate::error::Result;
use crate::primitive::{Primitive, PrimitiveValue};
use crate::registry::ResourceRegistry;
use crate::visit::{Visit, Visitor};
use serde_json::Value;

/// A declared element or resource shape.
pub trait Structure: Visit + Sized {
    /// FHIR type name (`Period`, `Condition`).
    const TYPE_NAME: &'static str;

    fn manifest() -> &'static Manifest;

    fn read(reader: &StructReader<'_>) -> Result<Self>;

    fn write(&self, writer: &mut StructWriter);
}

/// Property-level wire behavior of a Rust field type.
pub trait WireValue: Sized {
    const MODE: DecodeMode;

    fn decode_property(reader: &StructReader<'_>, def: &'static PropertyDef) -> Result<Option<Self>>;

    fn encode_property(&self, name: &'static str, writer: &mut StructWriter);

    fn walk_property<'a>(
        &'a self,
        def: &'static PropertyDef,
        index: Option<usize>,
        visitor: &mut dyn Visitor<'a>,
    );
}

/// Field types that may back a repeating property.
///
/// Choice values have no impl: a `value[x]` property never repeats, so a
/// repeating choice cannot be declared.
///
/// ```compile_fail
/// fn repeating<T: tessera_models::codec::WireList>() {}
/// repeating::<tessera_models::DynamicValue>();
/// ```
///
/// ```
/// fn repeating<T: tessera_models::codec::WireList>() {}
/// repeating::<tessera_models::Coding>();
/// repeating::<tessera_models::AnyResource>();
/// ```
pub trait WireList: WireValue {
    fn decode_list(reader: &StructReader<'_>, def: &'static PropertyDef) -> Result<Vec<Self>>;

    fn encode_list(values: &[Self], name: &'static str, writer: &mut StructWriter);
}

impl<T: PrimitiveValue> WireValue for Primitive<T> {
    const MODE: DecodeMode = DecodeMode::Primitive;

    fn decode_property(reader: &StructReader<'_>, def: &'static PropertyDef) -> Result<Option<Self>> {
        reader.primitive(def.name)
    }

    fn encode_property(&self, name: &'static str, writer: &mut StructWriter) {
        writer.primitive(name, self);
    }

    fn walk_property<'a>(
        &'a self,
        def: &'static PropertyDef,
        index: Option<usize>,
        visitor: &mut dyn Visitor<'a>,
    ) {
        visitor.enter(def.name, index);
        walk_primitive(self, def, visitor);
        visitor.leave();
    }
}

impl<T: PrimitiveValue> WireList for Primitive<T> {
    fn decode_list(reader: &StructReader<'_>, def: &'static PropertyDef) -> Result<Vec<Self>> {
        reader.primitive_list(def.name)
    }

    fn encode_list(values: &[Self], name: &'static str, writer: &mut StructWriter) {
        writer.primitive_list(name, values);
    }
}

/// Reports a bound code and visits the primitive's extensions.
pub(crate) fn walk_primitive<'a, T: PrimitiveValue>(
    value: &'a Primitive<T>,
    def: &'static PropertyDef,
    visitor: &mut dyn Visitor<'a>,
) {
    if let (Some(_), Some(code)) = (def.binding, value.value.as_ref().and_then(T::as_code)) {
        visitor.code(def, code);
    }
    for (i, extension) in value.extension.iter().enumerate() {
        visitor.enter("extension", Some(i));
        visitor.node(extension);
        visitor.leave();
    }
}

/// Plain string attributes such as `Element.id` and `Extension.url`.
impl WireValue for String {
    const MODE: DecodeMode = DecodeMode::Attribute;

    fn decode_property(reader: &StructReader<'_>, def: &'static PropertyDef) -> Result<Option<Self>> {
        reader.string(def.name)
    }

    fn encode_property(&self, name: &'static str, writer: &mut StructWriter) {
        writer.string(name, self);
    }

    fn walk_property<'a>(
        &'a self,
        def: &'static PropertyDef,
        index: Option<usize>,
        visitor: &mut dyn Visitor<'a>,
    ) {
        if def.binding.is_some() {
            visitor.enter(def.name, index);
            visitor.code(def, self);
            visitor.leave();
        }
    }
}

impl WireList for String {
    fn decode_list(reader: &StructReader<'_>, def: &'static PropertyDef) -> Result<Vec<Self>> {
        reader.string_list(def.name)
    }

    fn encode_list(values: &[Self], name: &'static str, writer: &mut StructWriter) {
        writer.string_list(name, values);
    }
}

impl<T: WireValue> WireValue for Box<T> {
    const MODE: DecodeMode = T::MODE;

    fn decode_property(reader: &StructReader<'_>, def: &'static PropertyDef) -> Result<Option<Self>> {
        T::decode_property(reader, def).map(|value| value.map(Box::new))
    }

    fn encode_property(&self, name: &'static str, writer: &mut StructWriter) {
        self.as_ref().encode_property(name, writer);
    }

    fn walk_property<'a>(
        &'a self,
        def: &'static PropertyDef,
        index: Option<usize>,
        visitor: &mut dyn Visitor<'a>,
    ) {
        self.as_ref().walk_property(def, index, visitor);
    }
}

impl WireValue for AnyResource {
    const MODE: DecodeMode = DecodeMode::Resource;

    fn decode_property(reader: &StructReader<'_>, def: &'static PropertyDef) -> Result<Option<Self>> {
        reader.resource(def.name)
    }

    fn encode_property(&self, name: &'static str, writer: &mut StructWriter) {
        writer.resource(name, self);
    }

    fn walk_property<'a>(
        &'a self,
        def: &'static PropertyDef,
        index: Option<usize>,
        visitor: &mut dyn Visitor<'a>,
    ) {
        visitor.enter(def.name, index);
        visitor.node(self.as_visit());
        visitor.leave();
    }
}

impl WireList for AnyResource {
    fn decode_list(reader: &StructReader<'_>, def: &'static PropertyDef) -> Result<Vec<Self>> {
        reader.resource_list(def.name)
    }

    fn encode_list(values: &[Self], name: &'static str, writer: &mut StructWriter) {
        writer.resource_list(name, values);
    }
}

/// Decodes a resource through `registry`, falling back to
/// [`UnknownResource`](crate::UnknownResource) for unregistered types.
pub fn decode_resource(
    value: &Value,
    registry: &ResourceRegistry,
    options: DecodeOptions,
) -> Result<AnyResource> {
    registry.decode(value, options)
}

/// Decodes a standalone element or resource of a known shape.
pub fn decode_element<T: Structure>(
    value: &Value,
    registry: &ResourceRegistry,
    options: DecodeOptions,
) -> Result<T> {
    decode_structure(
        value,
        DecodeContext::new(registry, options),
        T::TYPE_NAME.to_string(),
    )
}

pub fn encode_element<T: Structure>(value: &T) -> Value {
    Value::Object(encode_structure(value))
}

pub fn encode_resource(resource: &AnyResource) -> Value {
    resource.to_json()
}
