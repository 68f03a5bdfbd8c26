//! General-purpose datatypes.

use crate::bindings;
use crate::choice::DynamicValue;
use crate::macros::fhir_type;
use crate::primitive::{
    Base64Binary, Boolean, Code, FhirDateTime, FhirDecimal, FhirInstant, FhirString, FhirTime,
    Markdown, PositiveInt, UnsignedInt, Uri, Url,
};
use crate::reference::Reference;
use rust_decimal::Decimal;

fhir_type! {
    /// An address expressed using postal conventions.
    element Address = "Address" {
        /// home | work | temp | old | billing
        use_: optional Code => "use", binding bindings::ADDRESS_USE;
        /// postal | physical | both
        type_: optional Code => "type", binding bindings::ADDRESS_TYPE;
        text: optional FhirString => "text";
        line: list FhirString => "line";
        city: optional FhirString => "city";
        district: optional FhirString => "district";
        state: optional FhirString => "state";
        postal_code: optional FhirString => "postalCode";
        country: optional FhirString => "country";
        period: optional Period => "period";
    }
}

fhir_type! {
    /// Text node with attribution.
    element Annotation = "Annotation" {
        author: optional DynamicValue => "author", choice [Reference, String];
        time: optional FhirDateTime => "time";
        text: required Markdown => "text";
    }
}

fhir_type! {
    /// Content in a format defined elsewhere.
    element Attachment = "Attachment" {
        /// Mime type of the content, with charset etc.
        content_type: optional Code => "contentType";
        language: optional Code => "language";
        /// Data inline, base64ed
        data: optional Base64Binary => "data";
        url: optional Url => "url";
        size: optional UnsignedInt => "size";
        hash: optional Base64Binary => "hash";
        title: optional FhirString => "title";
        creation: optional FhirDateTime => "creation";
    }
}

fhir_type! {
    /// Concept, as defined by a terminology system, plus text.
    element CodeableConcept = "CodeableConcept" {
        coding: list Coding => "coding";
        text: optional FhirString => "text";
    }
}

impl CodeableConcept {
    /// True when any coding carries `system` and `code`.
    pub fn has_coding(&self, system: &str, code: &str) -> bool {
        self.coding.iter().any(|c| c.is(system, code))
    }

    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: vec![coding],
            ..Default::default()
        }
    }
}

fhir_type! {
    /// A reference to a code defined by a terminology system.
    element Coding = "Coding" {
        /// Identity of the terminology system
        system: optional Uri => "system";
        version: optional FhirString => "version";
        /// Symbol in syntax defined by the system
        code: optional Code => "code";
        display: optional FhirString => "display";
        user_selected: optional Boolean => "userSelected";
    }
}

impl Coding {
    pub fn new(system: &str, code: &str) -> Self {
        Self {
            system: Some(Uri::from(system)),
            code: Some(Code::from(code)),
            ..Default::default()
        }
    }

    pub fn system_str(&self) -> Option<&str> {
        self.system.as_ref().and_then(|p| p.as_str())
    }

    pub fn code_str(&self) -> Option<&str> {
        self.code.as_ref().and_then(|p| p.as_str())
    }

    pub fn is(&self, system: &str, code: &str) -> bool {
        self.system_str() == Some(system) && self.code_str() == Some(code)
    }
}

fhir_type! {
    /// Details of a technology-mediated contact point (phone, fax, email).
    element ContactPoint = "ContactPoint" {
        /// phone | fax | email | pager | url | sms | other
        system: optional Code => "system", binding bindings::CONTACT_POINT_SYSTEM;
        value: optional FhirString => "value";
        /// home | work | temp | old | mobile
        use_: optional Code => "use", binding bindings::CONTACT_POINT_USE;
        rank: optional PositiveInt => "rank";
        period: optional Period => "period";
    }
}

fhir_type! {
    /// Name of a human, with text, parts and usage information.
    element HumanName = "HumanName" {
        use_: optional Code => "use", binding bindings::NAME_USE;
        text: optional FhirString => "text";
        family: optional FhirString => "family";
        given: list FhirString => "given";
        prefix: list FhirString => "prefix";
        suffix: list FhirString => "suffix";
        period: optional Period => "period";
    }
}

fhir_type! {
    /// An identifier intended for computation.
    element Identifier = "Identifier" {
        /// usual | official | temp | secondary | old
        use_: optional Code => "use", binding bindings::IDENTIFIER_USE;
        type_: optional CodeableConcept => "type";
        /// The namespace for the identifier value
        system: optional Uri => "system";
        value: optional FhirString => "value";
        period: optional Period => "period";
        /// Organization that issued id
        assigner: optional Box<Reference> => "assigner";
    }
}

impl Identifier {
    pub fn new(system: &str, value: &str) -> Self {
        Self {
            system: Some(Uri::from(system)),
            value: Some(FhirString::from(value)),
            ..Default::default()
        }
    }
}

fhir_type! {
    /// An amount of economic utility in some recognized currency.
    element Money = "Money" {
        value: optional FhirDecimal => "value";
        /// ISO 4217 Currency Code
        currency: optional Code => "currency";
    }
}

fhir_type! {
    /// Time range defined by start and end date/time.
    element Period = "Period" {
        start: optional FhirDateTime => "start";
        end: optional FhirDateTime => "end";
    }
}

fhir_type! {
    /// A measured or measurable amount.
    element Quantity = "Quantity" {
        /// Numerical value (with implicit precision)
        value: optional FhirDecimal => "value";
        /// < | <= | >= | > - how to understand the value
        comparator: optional Code => "comparator", binding bindings::QUANTITY_COMPARATOR;
        /// Unit representation
        unit: optional FhirString => "unit";
        /// System that defines coded unit form
        system: optional Uri => "system";
        /// Coded form of the unit
        code: optional Code => "code";
    }
}

impl Quantity {
    pub fn new(value: Decimal, unit: &str) -> Self {
        Self {
            value: Some(FhirDecimal::from(value)),
            unit: Some(FhirString::from(unit)),
            ..Default::default()
        }
    }

    /// A UCUM-coded quantity.
    pub fn ucum(value: Decimal, code: &str) -> Self {
        Self {
            value: Some(FhirDecimal::from(value)),
            unit: Some(FhirString::from(code)),
            system: Some(Uri::from("http://unitsofmeasure.org")),
            code: Some(Code::from(code)),
            ..Default::default()
        }
    }

    pub fn decimal(&self) -> Option<Decimal> {
        self.value.as_ref().and_then(|p| p.value)
    }

    pub fn code_str(&self) -> Option<&str> {
        self.code.as_ref().and_then(|p| p.as_str())
    }
}

/// A duration of time during which an organism has existed.
pub type Age = Quantity;
/// A measured amount of discrete entities.
pub type Count = Quantity;
/// A length, a value with a unit that is a physical distance.
pub type Distance = Quantity;
/// A length of time.
pub type Duration = Quantity;
/// A Quantity without a comparator.
pub type SimpleQuantity = Quantity;

fhir_type! {
    /// Set of values bounded by low and high.
    element Range = "Range" {
        low: optional Quantity => "low";
        high: optional Quantity => "high";
    }
}

fhir_type! {
    /// A ratio of two Quantity values, a numerator and a denominator.
    element Ratio = "Ratio" {
        numerator: optional Quantity => "numerator";
        denominator: optional Quantity => "denominator";
    }
}

fhir_type! {
    /// A series of measurements taken by a device.
    element SampledData = "SampledData" {
        /// Zero value and units
        origin: required Quantity => "origin";
        /// Number of milliseconds between samples
        period: required FhirDecimal => "period";
        factor: optional FhirDecimal => "factor";
        lower_limit: optional FhirDecimal => "lowerLimit";
        upper_limit: optional FhirDecimal => "upperLimit";
        /// Number of sample points at each time point
        dimensions: required PositiveInt => "dimensions";
        data: optional FhirString => "data";
    }
}

fhir_type! {
    /// A digital signature along with supporting context.
    element Signature = "Signature" {
        /// Indication of the reason the entity signed the object(s)
        type_: required_list Coding => "type";
        when: required FhirInstant => "when";
        who: required Reference => "who";
        on_behalf_of: optional Reference => "onBehalfOf";
        target_format: optional Code => "targetFormat";
        sig_format: optional Code => "sigFormat";
        data: optional Base64Binary => "data";
    }
}

fhir_type! {
    /// An event that may occur multiple times.
    backbone Timing = "Timing" {
        /// When the event occurs
        event: list FhirDateTime => "event";
        repeat: optional TimingRepeat => "repeat";
        /// BID | TID | QID | AM | PM | QD | QOD | +
        code: optional CodeableConcept => "code";
    }
}

fhir_type! {
    /// When the event is to occur.
    element TimingRepeat = "Timing.repeat" {
        bounds: optional DynamicValue => "bounds", choice [Duration, Range, Period];
        count: optional PositiveInt => "count";
        count_max: optional PositiveInt => "countMax";
        duration: optional FhirDecimal => "duration";
        duration_max: optional FhirDecimal => "durationMax";
        duration_unit: optional Code => "durationUnit", binding bindings::UNITS_OF_TIME;
        frequency: optional PositiveInt => "frequency";
        frequency_max: optional PositiveInt => "frequencyMax";
        period: optional FhirDecimal => "period";
        period_max: optional FhirDecimal => "periodMax";
        period_unit: optional Code => "periodUnit", binding bindings::UNITS_OF_TIME;
        day_of_week: list Code => "dayOfWeek", binding bindings::DAYS_OF_WEEK;
        time_of_day: list FhirTime => "timeOfDay";
        when: list Code => "when", binding bindings::EVENT_TIMING;
        offset: optional UnsignedInt => "offset";
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{decode_element, encode_element, DecodeOptions};
    use crate::error::Error;
    use crate::registry::ResourceRegistry;
    use serde_json::json;
    use std::str::FromStr;

    fn decode<T: crate::codec::Structure>(value: serde_json::Value) -> crate::Result<T> {
        decode_element(&value, ResourceRegistry::shared(), DecodeOptions::default())
    }

    #[test]
    fn quantity_preserves_decimal_scale() {
        let input = serde_json::from_str(
            r#"{"value":5.40,"unit":"mg","system":"http://unitsofmeasure.org","code":"mg"}"#,
        )
        .unwrap();
        let quantity: Quantity = decode(input).unwrap();
        assert_eq!(quantity.decimal(), Some(Decimal::from_str("5.40").unwrap()));
        assert_eq!(
            serde_json::to_string(&encode_element(&quantity)).unwrap(),
            r#"{"value":5.40,"unit":"mg","system":"http://unitsofmeasure.org","code":"mg"}"#
        );
    }

    #[test]
    fn identifier_assigner_nests_reference() {
        let input = json!({
            "system": "urn:oid:1.2.36.146.595.217.0.1",
            "value": "12345",
            "assigner": { "reference": "Organization/1", "display": "Acme Healthcare" }
        });
        let identifier: Identifier = decode(input.clone()).unwrap();
        let assigner = identifier.assigner.as_deref().unwrap();
        assert_eq!(assigner.target_type(), Some("Organization"));
        assert_eq!(encode_element(&identifier), input);
    }

    #[test]
    fn annotation_author_choice() {
        let annotation: Annotation = decode(json!({ "authorString": "Dr. Who", "text": "note" })).unwrap();
        assert_eq!(annotation.author.as_ref().and_then(DynamicValue::as_str), Some("Dr. Who"));

        let err = decode::<Annotation>(json!({
            "authorString": "Dr. Who",
            "authorReference": { "reference": "Practitioner/1" }
        }))
        .unwrap_err();
        assert!(matches!(err, Error::AmbiguousChoice { .. }));
    }

    #[test]
    fn timing_repeat_reads_bounds_and_codes() {
        let timing: Timing = decode(json!({
            "repeat": {
                "boundsPeriod": { "start": "2020-01-01" },
                "frequency": 2,
                "period": 1,
                "periodUnit": "d",
                "dayOfWeek": ["mon", "fri"]
            }
        }))
        .unwrap();
        let repeat = timing.repeat.unwrap();
        assert!(repeat.bounds.as_ref().and_then(DynamicValue::as_period).is_some());
        assert_eq!(repeat.day_of_week.len(), 2);
        assert_eq!(repeat.frequency.and_then(|p| p.value), Some(2));
    }

    #[test]
    fn wrong_scalar_kind_names_the_path() {
        let err = decode::<Period>(json!({ "start": 2020 })).unwrap_err();
        match err {
            Error::InvalidPrimitive { path, kind, .. } => {
                assert_eq!(path, "Period.start");
                assert_eq!(kind, "dateTime");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
