use std::sync::Arc;
use tessera_format::{FormatError, JsonCodec};
use tessera_models::{
    AnyResource, DecodeOptions, Patient, Period, ResourceRegistry, UnknownFieldPolicy,
};

const PATIENT: &str = r#"{"resourceType":"Patient","id":"p1","active":true,"name":[{"family":"Lee","given":["Ann"]}],"birthDate":"1980-02"}"#;

#[test]
fn text_roundtrip_is_byte_identical_for_canonical_input() {
    let codec = JsonCodec::default();
    let resource = codec.decode_str(PATIENT).unwrap();
    assert_eq!(codec.encode_string(&resource).unwrap(), PATIENT);
}

#[test]
fn bytes_and_text_agree() {
    let codec = JsonCodec::default();
    let from_str = codec.decode_str(PATIENT).unwrap();
    let from_slice = codec.decode_slice(PATIENT.as_bytes()).unwrap();
    assert_eq!(from_str, from_slice);
}

#[test]
fn pretty_output_parses_back() {
    let codec = JsonCodec::default();
    let resource = codec.decode_str(PATIENT).unwrap();
    let pretty = codec.encode_pretty(&resource).unwrap();
    assert!(pretty.contains('\n'));
    assert_eq!(codec.decode_str(&pretty).unwrap(), resource);
}

#[test]
fn decimals_keep_their_lexical_form() {
    let input = r#"{"resourceType":"Observation","status":"final","code":{"text":"weight"},"valueQuantity":{"value":72.50,"unit":"kg"}}"#;
    let codec = JsonCodec::default();
    let resource = codec.decode_str(input).unwrap();
    assert_eq!(codec.encode_string(&resource).unwrap(), input);
}

#[test]
fn injected_registry_controls_dispatch() {
    let codec = JsonCodec::new(Arc::new(ResourceRegistry::empty()));
    let resource = codec.decode_str(PATIENT).unwrap();
    assert!(resource.is_unknown());
    assert!(resource.downcast_ref::<Patient>().is_none());
    assert_eq!(codec.encode_value(&resource), serde_json::from_str::<serde_json::Value>(PATIENT).unwrap());
}

#[test]
fn options_are_applied_to_every_decode() {
    let codec = JsonCodec::default().with_options(DecodeOptions {
        strict: false,
        unknown_fields: UnknownFieldPolicy::Reject,
    });
    let err = codec
        .decode_str(r#"{"resourceType":"Patient","colour":"blue"}"#)
        .unwrap_err();
    assert!(matches!(err, FormatError::Decode(_)));
}

#[test]
fn elements_decode_without_resource_type() {
    let codec = JsonCodec::default();
    let period: Period = codec
        .decode_element(r#"{"start":"2020-01-01","end":"2020-12-31"}"#)
        .unwrap();
    assert_eq!(period.start.as_ref().and_then(|p| p.value.as_ref()).map(|d| d.as_str()), Some("2020-01-01"));
    assert_eq!(
        codec.encode_element(&period).unwrap(),
        r#"{"start":"2020-01-01","end":"2020-12-31"}"#
    );
}

#[test]
fn bundle_with_unknown_entry_roundtrips() {
    let input = r#"{"resourceType":"Bundle","type":"collection","entry":[{"fullUrl":"urn:uuid:1","resource":{"resourceType":"Device","id":"d1","status":"active"}},{"resource":{"resourceType":"Patient","id":"p1"}}]}"#;
    let codec = JsonCodec::default();
    let resource: AnyResource = codec.decode_str(input).unwrap();
    assert_eq!(codec.encode_string(&resource).unwrap(), input);
}
