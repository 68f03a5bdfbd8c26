//! Static property tables describing each declared shape.

use crate::bindings::ValueSet;
use crate::choice::TypeTag;

/// How many values a property may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// `0..1`
    Optional,
    /// `1..1`
    Required,
    /// `0..*`
    List,
    /// `1..*`
    RequiredList,
}

impl Cardinality {
    pub fn min(self) -> usize {
        match self {
            Cardinality::Optional | Cardinality::List => 0,
            Cardinality::Required | Cardinality::RequiredList => 1,
        }
    }

    pub fn is_list(self) -> bool {
        matches!(self, Cardinality::List | Cardinality::RequiredList)
    }
}

/// Reading strategy for a property's values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeMode {
    /// Scalar value with optional `_name` metadata.
    Primitive,
    /// Plain string attribute (`id`, `url`); no `_name` sibling.
    Attribute,
    /// Nested element object.
    Element,
    /// Nested resource, dispatched through the registry.
    Resource,
    /// `name[x]` choice, one key per type tag.
    Choice,
}

/// One declared property of a shape.
#[derive(Debug)]
pub struct PropertyDef {
    /// JSON key, or the key prefix for choice properties.
    pub name: &'static str,
    pub cardinality: Cardinality,
    pub mode: DecodeMode,
    /// Accepted type tags for choice properties; empty otherwise.
    pub choices: &'static [TypeTag],
    /// Closed value set a coded value must belong to.
    pub binding: Option<&'static ValueSet>,
}

impl PropertyDef {
    /// Wire key for a choice value of the given type.
    pub fn choice_key(&self, tag: TypeTag) -> String {
        format!("{}{}", self.name, tag.suffix())
    }

    pub fn accepts(&self, tag: TypeTag) -> bool {
        self.choices.contains(&tag)
    }

    /// Type tag encoded by `key` if it is one of this choice's wire keys.
    pub fn choice_tag(&self, key: &str) -> Option<TypeTag> {
        if self.mode != DecodeMode::Choice {
            return None;
        }
        key.strip_prefix(self.name).and_then(TypeTag::from_suffix)
    }
}

/// Ordered property table of a shape, in FHIR declaration order.
#[derive(Debug)]
pub struct Manifest {
    pub type_name: &'static str,
    pub is_resource: bool,
    pub properties: &'static [PropertyDef],
}

impl Manifest {
    pub fn property(&self, name: &str) -> Option<&'static PropertyDef> {
        self.properties.iter().find(|def| def.name == name)
    }

    /// Whether `key` is a wire key some declared property reads.
    ///
    /// A `_name` sibling only exists for primitive properties and primitive
    /// choice tags.
    pub fn recognizes(&self, key: &str) -> bool {
        if key == "resourceType" {
            return self.is_resource;
        }
        match key.strip_prefix('_') {
            Some(bare) => self.properties.iter().any(|def| match def.mode {
                DecodeMode::Primitive => def.name == bare,
                DecodeMode::Choice => def.choice_tag(bare).is_some_and(TypeTag::is_primitive),
                DecodeMode::Attribute | DecodeMode::Element | DecodeMode::Resource => false,
            }),
            None => self.properties.iter().any(|def| match def.mode {
                DecodeMode::Choice => def.choice_tag(key).is_some(),
                _ => def.name == key,
            }),
        }
    }
}
