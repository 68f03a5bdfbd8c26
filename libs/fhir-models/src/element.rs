//! Base element kinds and `Extension`.

use crate::choice::DynamicValue;
use crate::macros::fhir_type;

/// Common accessors of every element.
pub trait Element {
    fn id(&self) -> Option<&str>;

    fn extension(&self) -> &[Extension];

    /// Extensions with the given canonical URL, in order.
    fn extensions_by_url<'a>(&'a self, url: &'a str) -> Box<dyn Iterator<Item = &'a Extension> + 'a> {
        Box::new(
            self.extension()
                .iter()
                .filter(move |ext| ext.url.as_deref() == Some(url)),
        )
    }
}

/// Elements nested inside a resource that may carry modifier extensions.
pub trait BackboneElement: Element {
    fn modifier_extension(&self) -> &[Extension];
}

fhir_type! {
    /// Optional additional information identified by a canonical URL.
    element Extension = "Extension" {
        /// Identifies the meaning of the extension
        url: required String => "url";
        /// Value of extension
        value: optional DynamicValue => "value", choice [*];
    }
}

impl Extension {
    pub fn new(url: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        Self {
            url: Some(url.into()),
            value: Some(value.into()),
            ..Default::default()
        }
    }

    /// An extension carrying nested extensions instead of a value.
    pub fn complex(url: impl Into<String>, extension: Vec<Extension>) -> Self {
        Self {
            url: Some(url.into()),
            extension,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_element, encode_element, DecodeOptions};
    use crate::primitive::Primitive;
    use crate::registry::ResourceRegistry;
    use serde_json::json;

    #[test]
    fn extension_value_roundtrips_under_suffixed_key() {
        let input = json!({
            "url": "http://example.org/birthPlace",
            "valueString": "Utrecht"
        });
        let ext: Extension =
            decode_element(&input, &ResourceRegistry::standard(), DecodeOptions::default())
                .unwrap();
        assert_eq!(ext.url.as_deref(), Some("http://example.org/birthPlace"));
        assert_eq!(ext.value.as_ref().and_then(DynamicValue::as_str), Some("Utrecht"));
        assert_eq!(encode_element(&ext), input);
    }

    #[test]
    fn extensions_are_filtered_by_url() {
        let parent = Extension::complex(
            "http://example.org/parent",
            vec![
                Extension::new("http://example.org/a", DynamicValue::Boolean(Primitive::from(true))),
                Extension::new("http://example.org/b", DynamicValue::Integer(Primitive::from(3))),
            ],
        );
        let found: Vec<_> = parent.extensions_by_url("http://example.org/b").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].value, Some(DynamicValue::Integer(Primitive::from(3))));
    }
}
