use crate::bindings;
use crate::choice::DynamicValue;
use crate::datatypes::{Annotation, CodeableConcept, Identifier, Quantity, Range};
use crate::macros::fhir_type;
use crate::primitive::{Code, FhirInstant, FhirString};
use crate::reference::Reference;

fhir_type! {
    /// Measurements and simple assertions.
    domain_resource Observation = "Observation" {
        identifier: list Identifier => "identifier";
        based_on: list Reference => "basedOn";
        part_of: list Reference => "partOf";
        /// registered | preliminary | final | amended +
        status: required Code => "status", binding bindings::OBSERVATION_STATUS;
        category: list CodeableConcept => "category";
        /// Type of observation (code / type)
        code: required CodeableConcept => "code";
        subject: optional Reference => "subject";
        focus: list Reference => "focus";
        encounter: optional Reference => "encounter";
        effective: optional DynamicValue => "effective", choice [DateTime, Period, Timing, Instant];
        issued: optional FhirInstant => "issued";
        performer: list Reference => "performer";
        value: optional DynamicValue => "value", choice [
            Quantity, CodeableConcept, String, Boolean, Integer, Range, Ratio, SampledData, Time,
            DateTime, Period
        ];
        /// Why the result is missing
        data_absent_reason: optional CodeableConcept => "dataAbsentReason";
        interpretation: list CodeableConcept => "interpretation";
        note: list Annotation => "note";
        body_site: optional CodeableConcept => "bodySite";
        method: optional CodeableConcept => "method";
        specimen: optional Reference => "specimen";
        device: optional Reference => "device";
        reference_range: list ObservationReferenceRange => "referenceRange";
        has_member: list Reference => "hasMember";
        derived_from: list Reference => "derivedFrom";
        component: list ObservationComponent => "component";
    }
}

fhir_type! {
    /// Provides guide for interpretation.
    backbone ObservationReferenceRange = "Observation.referenceRange" {
        low: optional Quantity => "low";
        high: optional Quantity => "high";
        type_: optional CodeableConcept => "type";
        applies_to: list CodeableConcept => "appliesTo";
        age: optional Range => "age";
        text: optional FhirString => "text";
    }
}

fhir_type! {
    /// Component results.
    backbone ObservationComponent = "Observation.component" {
        code: required CodeableConcept => "code";
        value: optional DynamicValue => "value", choice [
            Quantity, CodeableConcept, String, Boolean, Integer, Range, Ratio, SampledData, Time,
            DateTime, Period
        ];
        data_absent_reason: optional CodeableConcept => "dataAbsentReason";
        interpretation: list CodeableConcept => "interpretation";
        reference_range: list ObservationReferenceRange => "referenceRange";
    }
}

impl Observation {
    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().and_then(|p| p.as_str())
    }

    /// Code of the observation, if any coding matches `system`.
    pub fn code_in(&self, system: &str) -> Option<&str> {
        self.code
            .as_ref()?
            .coding
            .iter()
            .find(|c| c.system_str() == Some(system))
            .and_then(|c| c.code_str())
    }
}
