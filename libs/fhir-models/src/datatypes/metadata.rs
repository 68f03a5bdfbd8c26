//! Metadata datatypes used by knowledge and definitional resources.

use super::general::{Attachment, ContactPoint, Coding};
use crate::bindings;
use crate::choice::DynamicValue;
use crate::macros::fhir_type;
use crate::primitive::{Canonical, Code, FhirString, Id, Integer, Markdown, PositiveInt, Uri, Url};

fhir_type! {
    /// Contact information.
    element ContactDetail = "ContactDetail" {
        name: optional FhirString => "name";
        telecom: list ContactPoint => "telecom";
    }
}

fhir_type! {
    /// Contributor information.
    element Contributor = "Contributor" {
        /// author | editor | reviewer | endorser
        type_: required Code => "type", binding bindings::CONTRIBUTOR_TYPE;
        name: required FhirString => "name";
        contact: list ContactDetail => "contact";
    }
}

fhir_type! {
    /// Describes a required data item.
    element DataRequirement = "DataRequirement" {
        /// The type of the required data
        type_: required Code => "type";
        profile: list Canonical => "profile";
        subject: optional DynamicValue => "subject", choice [CodeableConcept, Reference];
        must_support: list FhirString => "mustSupport";
        code_filter: list DataRequirementCodeFilter => "codeFilter";
        date_filter: list DataRequirementDateFilter => "dateFilter";
        limit: optional PositiveInt => "limit";
        sort: list DataRequirementSort => "sort";
    }
}

fhir_type! {
    element DataRequirementCodeFilter = "DataRequirement.codeFilter" {
        path: optional FhirString => "path";
        search_param: optional FhirString => "searchParam";
        value_set: optional Canonical => "valueSet";
        code: list Coding => "code";
    }
}

fhir_type! {
    element DataRequirementDateFilter = "DataRequirement.dateFilter" {
        path: optional FhirString => "path";
        search_param: optional FhirString => "searchParam";
        value: optional DynamicValue => "value", choice [DateTime, Period, Duration];
    }
}

fhir_type! {
    element DataRequirementSort = "DataRequirement.sort" {
        path: required FhirString => "path";
        /// ascending | descending
        direction: required Code => "direction", binding bindings::SORT_DIRECTION;
    }
}

fhir_type! {
    /// An expression that can be used to generate a value.
    element Expression = "Expression" {
        description: optional FhirString => "description";
        name: optional Id => "name";
        /// text/cql | text/fhirpath | application/x-fhir-query | etc.
        language: required Code => "language";
        expression: optional FhirString => "expression";
        reference: optional Uri => "reference";
    }
}

fhir_type! {
    /// Definition of a parameter to a module.
    element ParameterDefinition = "ParameterDefinition" {
        name: optional Code => "name";
        /// in | out
        use_: required Code => "use", binding bindings::OPERATION_PARAMETER_USE;
        min: optional Integer => "min";
        max: optional FhirString => "max";
        documentation: optional FhirString => "documentation";
        type_: required Code => "type";
        profile: optional Canonical => "profile";
    }
}

fhir_type! {
    /// Related artifacts for a knowledge resource.
    element RelatedArtifact = "RelatedArtifact" {
        type_: required Code => "type", binding bindings::RELATED_ARTIFACT_TYPE;
        label: optional FhirString => "label";
        display: optional FhirString => "display";
        citation: optional Markdown => "citation";
        url: optional Url => "url";
        document: optional Attachment => "document";
        resource: optional Canonical => "resource";
    }
}

fhir_type! {
    /// Defines an expected trigger for a module.
    element TriggerDefinition = "TriggerDefinition" {
        type_: required Code => "type", binding bindings::TRIGGER_TYPE;
        name: optional FhirString => "name";
        timing: optional DynamicValue => "timing", choice [Timing, Reference, Date, DateTime];
        data: list DataRequirement => "data";
        condition: optional Expression => "condition";
    }
}

fhir_type! {
    /// Describes the context of use for a conformance or knowledge resource.
    element UsageContext = "UsageContext" {
        code: required Coding => "code";
        value: required DynamicValue => "value", choice [CodeableConcept, Quantity, Range, Reference];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::choice::TypeTag;
    use crate::codec::{decode_element, DecodeOptions, Structure};
    use crate::error::Error;
    use crate::registry::ResourceRegistry;
    use serde_json::json;

    #[test]
    fn usage_context_manifest_narrows_choices() {
        let def = UsageContext::manifest().property("value").unwrap();
        assert!(def.accepts(TypeTag::Range));
        assert!(!def.accepts(TypeTag::String));
        assert_eq!(def.cardinality.min(), 1);
    }

    #[test]
    fn strict_decoding_rejects_disallowed_choice() {
        let input = json!({
            "code": { "system": "http://terminology.hl7.org/CodeSystem/usage-context-type", "code": "age" },
            "valueString": "adults"
        });
        let registry = ResourceRegistry::standard();

        let lenient: UsageContext =
            decode_element(&input, &registry, DecodeOptions::default()).unwrap();
        assert_eq!(lenient.value.as_ref().map(DynamicValue::tag), Some(TypeTag::String));

        let err = decode_element::<UsageContext>(&input, &registry, DecodeOptions::strict())
            .unwrap_err();
        assert!(matches!(err, Error::DisallowedChoice { tag: "string", .. }));
    }

    #[test]
    fn strict_decoding_requires_mandatory_properties() {
        let registry = ResourceRegistry::standard();
        let err = decode_element::<Contributor>(&json!({ "type": "author" }), &registry, DecodeOptions::strict())
            .unwrap_err();
        match err {
            Error::MissingRequired { path } => assert_eq!(path, "Contributor.name"),
            other => panic!("unexpected error: {other}"),
        }
        let partial: Contributor =
            decode_element(&json!({ "type": "author" }), &registry, DecodeOptions::default()).unwrap();
        assert!(partial.name.is_none());
    }
}
