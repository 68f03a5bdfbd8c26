//! Declarative shape definitions.
//!
//! `fhir_type!` turns a property list into a struct, its static manifest, and
//! the codec, traversal and serde glue for it. The inherited base properties
//! of each kind are prepended in FHIR order.
//!
//! ```text
//! fhir_type! {
//!     /// A time period.
//!     element Period = "Period" {
//!         start: optional FhirDateTime => "start";
//!         value: optional DynamicValue => "value", choice [Quantity, Range];
//!         status: required Code => "status", binding bindings::OBSERVATION_STATUS;
//!     }
//! }
//! ```
//!
//! Kinds: `element`, `backbone`, `resource`, `domain_resource`.
//! Cardinalities: `optional`, `required`, `list`, `required_list`.

macro_rules! fhir_type {
    (
        @define $kind:ident
        $(#[$meta:meta])*
        $name:ident = $type_name:literal {
            $(
                $(#[$fmeta:meta])*
                $field:ident : $card:ident $ty:ty => $json:literal
                $(, choice [$($choice:tt)+])?
                $(, binding $binding:path)?
            );* $(;)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name {
            $(
                $(#[$fmeta])*
                pub $field: $crate::macros::fhir_type!(@ty $card $ty),
            )*
        }

        impl $crate::codec::Structure for $name {
            const TYPE_NAME: &'static str = $type_name;

            fn manifest() -> &'static $crate::codec::Manifest {
                static MANIFEST: $crate::codec::Manifest = $crate::codec::Manifest {
                    type_name: $type_name,
                    is_resource: $crate::macros::fhir_type!(@is_resource $kind),
                    properties: &[
                        $(
                            $crate::codec::PropertyDef {
                                name: $json,
                                cardinality: $crate::macros::fhir_type!(@cardinality $card),
                                mode: <$ty as $crate::codec::WireValue>::MODE,
                                choices: $crate::macros::fhir_type!(@choices $($($choice)+)?),
                                binding: $crate::macros::fhir_type!(@binding $($binding)?),
                            },
                        )*
                    ],
                };
                &MANIFEST
            }

            fn read(reader: &$crate::codec::StructReader<'_>) -> $crate::error::Result<Self> {
                $crate::macros::fhir_type!(@read_prelude $kind reader);
                Ok(Self {
                    $($field: reader.$card::<$ty>($json)?,)*
                })
            }

            fn write(&self, writer: &mut $crate::codec::StructWriter) {
                $crate::macros::fhir_type!(@write_prelude $kind writer);
                $(writer.$card($json, &self.$field);)*
            }
        }

        impl $crate::visit::Visit for $name {
            fn type_name(&self) -> &'static str {
                $type_name
            }

            fn walk<'a>(&'a self, visitor: &mut dyn $crate::visit::Visitor<'a>) {
                let mut walker = $crate::visit::Walker::new(
                    <Self as $crate::codec::Structure>::manifest(),
                    visitor,
                );
                $(walker.$card($json, &self.$field);)*
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }

        impl $crate::codec::WireValue for $name {
            const MODE: $crate::codec::DecodeMode = $crate::codec::DecodeMode::Element;

            fn decode_property(
                reader: &$crate::codec::StructReader<'_>,
                def: &'static $crate::codec::PropertyDef,
            ) -> $crate::error::Result<Option<Self>> {
                reader.structure(def.name)
            }

            fn encode_property(&self, name: &'static str, writer: &mut $crate::codec::StructWriter) {
                writer.structure(name, self);
            }

            fn walk_property<'a>(
                &'a self,
                def: &'static $crate::codec::PropertyDef,
                index: Option<usize>,
                visitor: &mut dyn $crate::visit::Visitor<'a>,
            ) {
                visitor.enter(def.name, index);
                visitor.node(self);
                visitor.leave();
            }
        }

        impl $crate::codec::WireList for $name {
            fn decode_list(
                reader: &$crate::codec::StructReader<'_>,
                def: &'static $crate::codec::PropertyDef,
            ) -> $crate::error::Result<Vec<Self>> {
                reader.structure_list(def.name)
            }

            fn encode_list(values: &[Self], name: &'static str, writer: &mut $crate::codec::StructWriter) {
                writer.structure_list(name, values);
            }
        }

        impl ::serde::Serialize for $name {
            fn serialize<S: ::serde::Serializer>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error> {
                ::serde::Serialize::serialize(&$crate::codec::encode_element(self), serializer)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $name {
            fn deserialize<D: ::serde::Deserializer<'de>>(deserializer: D) -> ::std::result::Result<Self, D::Error> {
                let value = <::serde_json::Value as ::serde::Deserialize>::deserialize(deserializer)?;
                $crate::codec::decode_element(
                    &value,
                    $crate::registry::ResourceRegistry::shared(),
                    $crate::codec::DecodeOptions::default(),
                )
                .map_err(::serde::de::Error::custom)
            }
        }

        $crate::macros::fhir_type!(@kind_impls $kind $name);
    };

    (@ty optional $ty:ty) => { Option<$ty> };
    (@ty required $ty:ty) => { Option<$ty> };
    (@ty list $ty:ty) => { Vec<$ty> };
    (@ty required_list $ty:ty) => { Vec<$ty> };

    (@cardinality optional) => { $crate::codec::Cardinality::Optional };
    (@cardinality required) => { $crate::codec::Cardinality::Required };
    (@cardinality list) => { $crate::codec::Cardinality::List };
    (@cardinality required_list) => { $crate::codec::Cardinality::RequiredList };

    (@choices) => { &[] };
    (@choices *) => { $crate::choice::TypeTag::ALL };
    (@choices $($tag:ident),+) => { &[$($crate::choice::TypeTag::$tag),+] };

    (@binding) => { None };
    (@binding $binding:path) => { Some(&$binding) };

    (@is_resource element) => { false };
    (@is_resource backbone) => { false };
    (@is_resource resource) => { true };
    (@is_resource domain_resource) => { true };

    (@read_prelude element $reader:ident) => {};
    (@read_prelude backbone $reader:ident) => {};
    (@read_prelude resource $reader:ident) => {
        $reader.expect_resource_type(<Self as $crate::codec::Structure>::TYPE_NAME)?;
    };
    (@read_prelude domain_resource $reader:ident) => {
        $reader.expect_resource_type(<Self as $crate::codec::Structure>::TYPE_NAME)?;
    };

    (@write_prelude element $writer:ident) => {};
    (@write_prelude backbone $writer:ident) => {};
    (@write_prelude resource $writer:ident) => {
        $writer.resource_type(<Self as $crate::codec::Structure>::TYPE_NAME);
    };
    (@write_prelude domain_resource $writer:ident) => {
        $writer.resource_type(<Self as $crate::codec::Structure>::TYPE_NAME);
    };

    (@kind_impls element $name:ident) => {
        impl $crate::element::Element for $name {
            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn extension(&self) -> &[$crate::element::Extension] {
                &self.extension
            }
        }
    };
    (@kind_impls backbone $name:ident) => {
        $crate::macros::fhir_type!(@kind_impls element $name);

        impl $crate::element::BackboneElement for $name {
            fn modifier_extension(&self) -> &[$crate::element::Extension] {
                &self.modifier_extension
            }
        }
    };
    (@kind_impls resource $name:ident) => {
        impl $crate::resource::Resource for $name {
            fn id(&self) -> Option<&str> {
                self.id.as_deref()
            }

            fn meta(&self) -> Option<&$crate::resource::Meta> {
                self.meta.as_ref()
            }

            fn implicit_rules(&self) -> Option<&str> {
                self.implicit_rules.as_ref().and_then(|p| p.as_str())
            }

            fn language(&self) -> Option<&str> {
                self.language.as_ref().and_then(|p| p.as_str())
            }

            fn with_meta(self, meta: Option<$crate::resource::Meta>) -> Self {
                Self { meta, ..self }
            }
        }
    };
    (@kind_impls domain_resource $name:ident) => {
        $crate::macros::fhir_type!(@kind_impls resource $name);

        impl $crate::resource::DomainResource for $name {
            fn text(&self) -> Option<&$crate::resource::Narrative> {
                self.text.as_ref()
            }

            fn contained(&self) -> &[$crate::any::AnyResource] {
                &self.contained
            }

            fn extension(&self) -> &[$crate::element::Extension] {
                &self.extension
            }

            fn modifier_extension(&self) -> &[$crate::element::Extension] {
                &self.modifier_extension
            }
        }
    };

    (
        $(#[$meta:meta])*
        element $name:ident = $type_name:literal { $($body:tt)* }
    ) => {
        $crate::macros::fhir_type! {
            @define element
            $(#[$meta])*
            $name = $type_name {
                /// Unique id for inter-element referencing
                id: optional String => "id";
                /// Additional content defined by implementations
                extension: list $crate::element::Extension => "extension";
                $($body)*
            }
        }
    };

    (
        $(#[$meta:meta])*
        backbone $name:ident = $type_name:literal { $($body:tt)* }
    ) => {
        $crate::macros::fhir_type! {
            @define backbone
            $(#[$meta])*
            $name = $type_name {
                /// Unique id for inter-element referencing
                id: optional String => "id";
                /// Additional content defined by implementations
                extension: list $crate::element::Extension => "extension";
                /// Extensions that cannot be ignored even if unrecognized
                modifier_extension: list $crate::element::Extension => "modifierExtension";
                $($body)*
            }
        }
    };

    (
        $(#[$meta:meta])*
        resource $name:ident = $type_name:literal { $($body:tt)* }
    ) => {
        $crate::macros::fhir_type! {
            @define resource
            $(#[$meta])*
            $name = $type_name {
                /// Logical id of this artifact
                id: optional String => "id";
                /// Metadata about the resource
                meta: optional $crate::resource::Meta => "meta";
                /// A set of rules under which this content was created
                implicit_rules: optional $crate::primitive::Uri => "implicitRules";
                /// Language of the resource content
                language: optional $crate::primitive::Code => "language";
                $($body)*
            }
        }
    };

    (
        $(#[$meta:meta])*
        domain_resource $name:ident = $type_name:literal { $($body:tt)* }
    ) => {
        $crate::macros::fhir_type! {
            @define domain_resource
            $(#[$meta])*
            $name = $type_name {
                /// Logical id of this artifact
                id: optional String => "id";
                /// Metadata about the resource
                meta: optional $crate::resource::Meta => "meta";
                /// A set of rules under which this content was created
                implicit_rules: optional $crate::primitive::Uri => "implicitRules";
                /// Language of the resource content
                language: optional $crate::primitive::Code => "language";
                /// Text summary of the resource, for human interpretation
                text: optional $crate::resource::Narrative => "text";
                /// Contained, inline Resources
                contained: list $crate::any::AnyResource => "contained";
                /// Additional content defined by implementations
                extension: list $crate::element::Extension => "extension";
                /// Extensions that cannot be ignored
                modifier_extension: list $crate::element::Extension => "modifierExtension";
                $($body)*
            }
        }
    };
}

pub(crate) use fhir_type;
