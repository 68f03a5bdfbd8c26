//! Choice-typed (`value[x]`) properties.
//!
//! [`TypeTag`] enumerates every FHIR R4 open type. [`DynamicValue`] is one
//! global sum type over those tags; its variant is the tag, so a value can
//! never disagree with the tag it is encoded under. Each choice property's
//! manifest entry narrows the universe to its accepted tags.

use crate::codec::{
    walk_primitive, DecodeMode, PropertyDef, StructReader, StructWriter, WireValue,
};
use crate::datatypes::*;
use crate::error::{Error, Result};
use crate::primitive::Primitive;
use crate::reference::Reference;
use crate::resource::Meta;
use crate::temporal::{Date, DateTime, Instant, Time};
use crate::visit::{Visit, Visitor};
use rust_decimal::Decimal;

macro_rules! open_types {
    (
        primitive { $($ptag:ident => $pcode:literal : $pty:ty),* $(,)? }
        complex { $($ctag:ident => $cty:ty),* $(,)? }
    ) => {
        /// Closed enumeration of the datatypes a choice property can carry.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum TypeTag {
            $($ptag,)*
            $($ctag,)*
        }

        impl TypeTag {
            /// Every open type, primitives first.
            pub const ALL: &'static [TypeTag] = &[$(TypeTag::$ptag,)* $(TypeTag::$ctag,)*];

            /// FHIR type code (`dateTime`, `CodeableConcept`).
            pub fn code(self) -> &'static str {
                match self {
                    $(TypeTag::$ptag => $pcode,)*
                    $(TypeTag::$ctag => stringify!($ctag),)*
                }
            }

            /// Wire key suffix (`DateTime`, `CodeableConcept`).
            pub fn suffix(self) -> &'static str {
                match self {
                    $(TypeTag::$ptag => stringify!($ptag),)*
                    $(TypeTag::$ctag => stringify!($ctag),)*
                }
            }

            pub fn is_primitive(self) -> bool {
                match self {
                    $(TypeTag::$ptag => true,)*
                    _ => false,
                }
            }
        }

        /// A value of one of the open types.
        #[derive(Debug, Clone, PartialEq)]
        pub enum DynamicValue {
            $($ptag(Primitive<$pty>),)*
            $($ctag(Box<$cty>),)*
        }

        impl DynamicValue {
            pub fn tag(&self) -> TypeTag {
                match self {
                    $(DynamicValue::$ptag(_) => TypeTag::$ptag,)*
                    $(DynamicValue::$ctag(_) => TypeTag::$ctag,)*
                }
            }

            /// The nested element, for complex types.
            pub fn as_visit(&self) -> Option<&dyn Visit> {
                match self {
                    $(DynamicValue::$ptag(_) => None,)*
                    $(DynamicValue::$ctag(value) => Some(&**value as &dyn Visit),)*
                }
            }

            fn read_tagged(tag: TypeTag, reader: &StructReader<'_>, key: &str) -> Result<Option<Self>> {
                Ok(match tag {
                    $(TypeTag::$ptag => reader.primitive::<$pty>(key)?.map(DynamicValue::$ptag),)*
                    $(TypeTag::$ctag => reader
                        .structure::<$cty>(key)?
                        .map(|value| DynamicValue::$ctag(Box::new(value))),)*
                })
            }

            fn write_tagged(&self, key: &str, writer: &mut StructWriter) {
                match self {
                    $(DynamicValue::$ptag(value) => writer.primitive(key, value),)*
                    $(DynamicValue::$ctag(value) => writer.structure(key, &**value),)*
                }
            }

            fn walk_tagged<'a>(&'a self, def: &'static PropertyDef, visitor: &mut dyn Visitor<'a>) {
                match self {
                    $(DynamicValue::$ptag(value) => walk_primitive(value, def, visitor),)*
                    $(DynamicValue::$ctag(value) => visitor.node(&**value),)*
                }
            }
        }
    };
}

open_types! {
    primitive {
        Base64Binary => "base64Binary": String,
        Boolean => "boolean": bool,
        Canonical => "canonical": String,
        Code => "code": String,
        Date => "date": Date,
        DateTime => "dateTime": DateTime,
        Decimal => "decimal": Decimal,
        Id => "id": String,
        Instant => "instant": Instant,
        Integer => "integer": i32,
        Markdown => "markdown": String,
        Oid => "oid": String,
        PositiveInt => "positiveInt": u32,
        String => "string": String,
        Time => "time": Time,
        UnsignedInt => "unsignedInt": u32,
        Uri => "uri": String,
        Url => "url": String,
        Uuid => "uuid": String,
    }
    complex {
        Address => Address,
        Age => Age,
        Annotation => Annotation,
        Attachment => Attachment,
        CodeableConcept => CodeableConcept,
        Coding => Coding,
        ContactPoint => ContactPoint,
        Count => Count,
        Distance => Distance,
        Duration => Duration,
        HumanName => HumanName,
        Identifier => Identifier,
        Money => Money,
        Period => Period,
        Quantity => Quantity,
        Range => Range,
        Ratio => Ratio,
        Reference => Reference,
        SampledData => SampledData,
        Signature => Signature,
        Timing => Timing,
        ContactDetail => ContactDetail,
        Contributor => Contributor,
        DataRequirement => DataRequirement,
        Expression => Expression,
        ParameterDefinition => ParameterDefinition,
        RelatedArtifact => RelatedArtifact,
        TriggerDefinition => TriggerDefinition,
        UsageContext => UsageContext,
        Dosage => Dosage,
        Meta => Meta,
    }
}

impl TypeTag {
    pub fn from_suffix(suffix: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tag| tag.suffix() == suffix)
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|tag| tag.code() == code)
    }
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl DynamicValue {
    /// The coded text of a `code`, `string` or `uri`-family value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            DynamicValue::Base64Binary(p)
            | DynamicValue::Canonical(p)
            | DynamicValue::Code(p)
            | DynamicValue::Id(p)
            | DynamicValue::Markdown(p)
            | DynamicValue::Oid(p)
            | DynamicValue::String(p)
            | DynamicValue::Uri(p)
            | DynamicValue::Url(p)
            | DynamicValue::Uuid(p) => p.as_str(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            DynamicValue::Boolean(p) => p.value,
            _ => None,
        }
    }

    pub fn as_quantity(&self) -> Option<&Quantity> {
        match self {
            DynamicValue::Quantity(q)
            | DynamicValue::Age(q)
            | DynamicValue::Count(q)
            | DynamicValue::Distance(q)
            | DynamicValue::Duration(q) => Some(&**q),
            _ => None,
        }
    }

    pub fn as_codeable_concept(&self) -> Option<&CodeableConcept> {
        match self {
            DynamicValue::CodeableConcept(c) => Some(&**c),
            _ => None,
        }
    }

    pub fn as_period(&self) -> Option<&Period> {
        match self {
            DynamicValue::Period(p) => Some(&**p),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            DynamicValue::Reference(r) => Some(&**r),
            _ => None,
        }
    }
}

impl WireValue for DynamicValue {
    const MODE: DecodeMode = DecodeMode::Choice;

    /// Scans the object for `name + Suffix` keys (and their `_` metadata
    /// siblings). More than one distinct type is ambiguous.
    fn decode_property(reader: &StructReader<'_>, def: &'static PropertyDef) -> Result<Option<Self>> {
        let mut tags: Vec<TypeTag> = Vec::new();
        let mut keys: Vec<String> = Vec::new();
        for (key, value) in reader.object() {
            if value.is_null() {
                continue;
            }
            let is_metadata = key.starts_with('_');
            let bare = key.strip_prefix('_').unwrap_or(key);
            let Some(tag) = def.choice_tag(bare) else {
                continue;
            };
            if is_metadata && !tag.is_primitive() {
                continue;
            }
            keys.push(key.clone());
            if !tags.contains(&tag) {
                tags.push(tag);
            }
        }

        match tags.as_slice() {
            [] => Ok(None),
            [tag] => {
                if reader.context().options.strict && !def.accepts(*tag) {
                    return Err(Error::DisallowedChoice {
                        path: reader.child_path(&format!("{}[x]", def.name), None),
                        tag: tag.code(),
                    });
                }
                Self::read_tagged(*tag, reader, &def.choice_key(*tag))
            }
            _ => {
                keys.sort();
                Err(Error::AmbiguousChoice {
                    path: reader.child_path(&format!("{}[x]", def.name), None),
                    keys,
                })
            }
        }
    }

    fn encode_property(&self, name: &'static str, writer: &mut StructWriter) {
        self.write_tagged(&format!("{}{}", name, self.tag().suffix()), writer);
    }

    fn walk_property<'a>(
        &'a self,
        def: &'static PropertyDef,
        index: Option<usize>,
        visitor: &mut dyn Visitor<'a>,
    ) {
        visitor.enter(&def.choice_key(self.tag()), index);
        visitor.choice(def, self);
        self.walk_tagged(def, visitor);
        visitor.leave();
    }
}

macro_rules! dynamic_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(
            impl From<$ty> for DynamicValue {
                fn from(value: $ty) -> Self {
                    DynamicValue::$variant(Box::new(value))
                }
            }
        )*
    };
}

dynamic_from!(
    Address(Address),
    Annotation(Annotation),
    Attachment(Attachment),
    CodeableConcept(CodeableConcept),
    Coding(Coding),
    ContactPoint(ContactPoint),
    HumanName(HumanName),
    Identifier(Identifier),
    Money(Money),
    Period(Period),
    Quantity(Quantity),
    Range(Range),
    Ratio(Ratio),
    Reference(Reference),
    SampledData(SampledData),
    Signature(Signature),
    Timing(Timing),
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_cover_the_open_types() {
        assert_eq!(TypeTag::ALL.len(), 50);
        assert_eq!(TypeTag::DateTime.code(), "dateTime");
        assert_eq!(TypeTag::DateTime.suffix(), "DateTime");
        assert_eq!(TypeTag::CodeableConcept.code(), "CodeableConcept");
        assert!(TypeTag::PositiveInt.is_primitive());
        assert!(!TypeTag::Age.is_primitive());
    }

    #[test]
    fn suffix_lookup_is_exact() {
        assert_eq!(TypeTag::from_suffix("Date"), Some(TypeTag::Date));
        assert_eq!(TypeTag::from_suffix("DateTime"), Some(TypeTag::DateTime));
        assert_eq!(TypeTag::from_suffix("Set"), None);
        assert_eq!(TypeTag::from_code("base64Binary"), Some(TypeTag::Base64Binary));
    }

    #[test]
    fn variant_determines_tag() {
        let value = DynamicValue::from(Period::default());
        assert_eq!(value.tag(), TypeTag::Period);
        assert!(value.as_visit().is_some());

        let value = DynamicValue::Code(Primitive::from("active"));
        assert_eq!(value.tag(), TypeTag::Code);
        assert_eq!(value.as_str(), Some("active"));
        assert!(value.as_visit().is_none());
    }
}
