use serde_json::{json, Value};
use std::sync::Arc;
use tessera_models::{
    decode_element, AnyResource, DecodeOptions, Patient, Period, ResourceRegistry,
};
use tessera_validator::{
    BestPracticeMode, IssueCode, IssueLevel, IssueSeverity, LocationContext, Preset, RuleSet,
    ValidationError, ValidationIssue, Validator, ValidatorConfig,
};

fn resource(value: Value) -> AnyResource {
    AnyResource::from_json(&value).unwrap()
}

fn validator() -> Validator {
    Validator::from_config(&ValidatorConfig::default()).unwrap()
}

fn summary(outcome: &tessera_validator::ValidationOutcome) -> Vec<(&'static str, String)> {
    outcome
        .issues
        .iter()
        .map(|i| (i.key, i.location.clone().unwrap_or_default()))
        .collect()
}

/// Five independent problems: obs-6, a status outside its value set, a
/// missing code, a reversed effective period and a coded quantity without a
/// system.
fn faulty_observation() -> AnyResource {
    resource(json!({
        "resourceType": "Observation",
        "status": "bogus",
        "effectivePeriod": { "start": "2020-01-02", "end": "2020-01-01" },
        "valueQuantity": { "value": 5, "unit": "mg", "code": "mg" },
        "dataAbsentReason": { "text": "not measured" }
    }))
}

#[test]
fn reversed_period_is_one_error_at_the_period() {
    let period: Period = decode_element(
        &json!({ "start": "2020-01-02", "end": "2020-01-01" }),
        ResourceRegistry::shared(),
        DecodeOptions::default(),
    )
    .unwrap();

    let outcome = validator().validate_element(&period);
    assert!(!outcome.valid);
    assert_eq!(outcome.issues.len(), 1);
    let issue = &outcome.issues[0];
    assert_eq!(issue.key, "per-1");
    assert_eq!(issue.severity, IssueSeverity::Error);
    assert_eq!(issue.code, IssueCode::Invariant);
    assert_eq!(issue.location.as_deref(), Some("Period"));
}

#[test]
fn appointment_without_participants_is_one_required_error() {
    let appointment = resource(json!({
        "resourceType": "Appointment",
        "status": "proposed"
    }));

    let outcome = validator().validate(&appointment);
    assert_eq!(
        summary(&outcome),
        vec![("required", "Appointment.participant".to_string())]
    );
    assert_eq!(outcome.issues[0].code, IssueCode::Required);
}

#[test]
fn ratio_without_denominator_is_one_error() {
    let observation = resource(json!({
        "resourceType": "Observation",
        "status": "final",
        "code": { "text": "titer" },
        "valueRatio": { "numerator": { "value": 1 } }
    }));

    let outcome = validator().validate(&observation);
    assert_eq!(
        summary(&outcome),
        vec![("rat-1", "Observation.valueRatio".to_string())]
    );
    assert!(outcome.issues[0].diagnostics.contains("denominator"));
}

#[test]
fn independent_violations_are_all_reported_in_visit_order() {
    let outcome = validator().validate(&faulty_observation());
    assert_eq!(
        summary(&outcome),
        vec![
            ("obs-6", "Observation".to_string()),
            ("code-invalid", "Observation.status".to_string()),
            ("required", "Observation.code".to_string()),
            ("per-1", "Observation.effectivePeriod".to_string()),
            ("qty-3", "Observation.valueQuantity".to_string()),
        ]
    );
    assert_eq!(outcome.error_count(), 5);
}

#[test]
fn fail_fast_stops_at_the_first_error() {
    let config = ValidatorConfig::builder().fail_fast(true).build();
    let outcome = Validator::from_config(&config)
        .unwrap()
        .validate(&faulty_observation());
    assert_eq!(summary(&outcome), vec![("obs-6", "Observation".to_string())]);
}

#[test]
fn max_issues_caps_the_report() {
    let config = ValidatorConfig::builder().max_issues(2).build();
    let outcome = Validator::from_config(&config)
        .unwrap()
        .validate(&faulty_observation());
    assert_eq!(outcome.issues.len(), 2);
    assert_eq!(outcome.issues[1].key, "code-invalid");
}

#[test]
fn suppression_and_level_overrides_apply_per_key() {
    let config = ValidatorConfig::builder()
        .suppress("obs-6")
        .override_level("qty-3", IssueLevel::Warning)
        .build();
    let outcome = Validator::from_config(&config)
        .unwrap()
        .validate(&faulty_observation());
    assert_eq!(outcome.issues.len(), 4);
    assert!(outcome.with_key("obs-6").next().is_none());
    let qty = outcome.with_key("qty-3").next().unwrap();
    assert_eq!(qty.severity, IssueSeverity::Warning);
    assert_eq!(outcome.error_count(), 3);

    let quiet = ValidatorConfig::builder()
        .override_level("qty-3", IssueLevel::Warning)
        .include_warnings(false)
        .build();
    let outcome = Validator::from_config(&quiet)
        .unwrap()
        .validate(&faulty_observation());
    assert!(outcome.with_key("qty-3").next().is_none());
}

#[test]
fn disabled_steps_skip_their_checks() {
    let config = ValidatorConfig::preset(Preset::Ingestion);
    let outcome = Validator::from_config(&config)
        .unwrap()
        .validate(&faulty_observation());
    assert_eq!(
        summary(&outcome),
        vec![("required", "Observation.code".to_string())]
    );
}

#[test]
fn disallowed_choice_type_is_reported_at_its_key() {
    let observation = resource(json!({
        "resourceType": "Observation",
        "status": "final",
        "code": { "text": "home address" },
        "valueAddress": { "city": "Berlin" }
    }));
    let outcome = validator().validate(&observation);
    assert_eq!(
        summary(&outcome),
        vec![("choice-type", "Observation.valueAddress".to_string())]
    );
    assert!(outcome.issues[0].diagnostics.contains("Quantity"));
}

#[test]
fn contained_resources_are_visited_with_their_path() {
    let condition = resource(json!({
        "resourceType": "Condition",
        "contained": [{
            "resourceType": "Patient",
            "id": "p1",
            "gender": "unknown-ish",
            "contained": [{ "resourceType": "Basic", "code": { "text": "nested" } }]
        }],
        "subject": { "reference": "#p1" }
    }));

    let outcome = validator().validate(&condition);
    assert_eq!(
        summary(&outcome),
        vec![
            ("dom-2", "Condition".to_string()),
            ("code-invalid", "Condition.contained[0].gender".to_string()),
        ]
    );
}

#[test]
fn abated_condition_needs_an_inactive_status() {
    let condition = resource(json!({
        "resourceType": "Condition",
        "clinicalStatus": {
            "coding": [{
                "system": "http://terminology.hl7.org/CodeSystem/condition-clinical",
                "code": "active"
            }]
        },
        "subject": { "reference": "Patient/p1" },
        "abatementDateTime": "2021-03-01"
    }));
    let outcome = validator().validate(&condition);
    assert_eq!(summary(&outcome), vec![("con-4", "Condition".to_string())]);
}

#[test]
fn duplicate_full_urls_are_reported_per_entry() {
    let bundle = resource(json!({
        "resourceType": "Bundle",
        "type": "collection",
        "entry": [
            { "fullUrl": "urn:uuid:1", "resource": { "resourceType": "Basic", "code": { "text": "a" } } },
            { "fullUrl": "urn:uuid:1", "resource": { "resourceType": "Basic", "code": { "text": "b" } } },
            { "fullUrl": "urn:uuid:2", "resource": { "resourceType": "Basic", "code": { "text": "c" } } }
        ]
    }));
    let outcome = validator().validate(&bundle);
    assert_eq!(summary(&outcome), vec![("bdl-7", "Bundle.entry[1]".to_string())]);

    let invariants_only = ValidatorConfig::builder()
        .constraints_mode(tessera_validator::ConstraintsMode::InvariantsOnly)
        .build();
    let outcome = Validator::from_config(&invariants_only)
        .unwrap()
        .validate(&bundle);
    assert!(outcome.valid);
}

#[test]
fn best_practice_rules_follow_the_preset() {
    let patient = resource(json!({ "resourceType": "Patient", "id": "p1" }));
    assert!(validator().validate(&patient).issues.is_empty());

    let authoring = Validator::from_config(&ValidatorConfig::preset(Preset::Authoring)).unwrap();
    let outcome = authoring.validate(&patient);
    assert!(outcome.valid);
    assert_eq!(summary(&outcome), vec![("dom-6", "Patient".to_string())]);
    assert_eq!(outcome.issues[0].severity, IssueSeverity::Warning);

    let strict = ValidatorConfig::builder()
        .best_practice(BestPracticeMode::Error)
        .build();
    let outcome = Validator::from_config(&strict).unwrap().validate(&patient);
    assert!(!outcome.valid);
}

#[test]
fn ensure_valid_combines_errors_in_order() {
    let outcome = validator().validate(&faulty_observation());
    match outcome.ensure_valid() {
        Err(ValidationError::Combined { count, message }) => {
            assert_eq!(count, 5);
            let obs6 = message.find("obs-6").unwrap();
            let qty3 = message.find("qty-3").unwrap();
            assert!(obs6 < qty3);
        }
        other => panic!("unexpected result: {other:?}"),
    }

    match outcome.first_error() {
        Err(ValidationError::Issue(issue)) => assert_eq!(issue.key, "obs-6"),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn outcome_exports_as_operation_outcome() {
    let outcome = validator().validate(&faulty_observation());
    let exported = AnyResource::from(outcome.to_operation_outcome()).to_json();
    assert_eq!(exported["resourceType"], "OperationOutcome");
    assert_eq!(exported["issue"].as_array().unwrap().len(), 5);
    assert_eq!(exported["issue"][3]["severity"], "error");
    assert_eq!(exported["issue"][3]["code"], "invariant");
    assert_eq!(exported["issue"][3]["expression"], json!(["Observation.effectivePeriod"]));

    // The exported outcome is itself a valid resource.
    let reexported = resource(exported);
    assert!(validator().validate(&reexported).valid);
}

#[test]
fn unknown_resources_pass_untouched() {
    let medication = resource(json!({ "resourceType": "Medication", "status": "nonsense" }));
    let outcome = validator().validate(&medication);
    assert!(outcome.valid);
    assert_eq!(outcome.resource_type.as_deref(), Some("Medication"));
}

#[test]
fn batches_validate_each_resource() {
    let resources = vec![
        resource(json!({ "resourceType": "Patient", "gender": "female" })),
        faulty_observation(),
    ];
    let outcomes = validator().validate_batch(&resources);
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].valid);
    assert_eq!(outcomes[1].error_count(), 5);
}

#[test]
fn validate_json_uses_the_configured_decoder() {
    let input = json!({ "resourceType": "Patient", "favouriteColour": "green" });
    assert!(validator().validate_json(&input).valid);

    let strict = ValidatorConfig::builder()
        .decode_options(DecodeOptions::strict())
        .build();
    let outcome = Validator::from_config(&strict).unwrap().validate_json(&input);
    assert_eq!(outcome.issues.len(), 1);
    assert_eq!(outcome.issues[0].key, "structure");
    assert_eq!(outcome.issues[0].severity, IssueSeverity::Fatal);
}

fn no_test_names(patient: &Patient, location: &LocationContext, out: &mut Vec<ValidationIssue>) {
    for (i, name) in patient.name.iter().enumerate() {
        if name.family.as_ref().and_then(|f| f.as_str()) == Some("Test") {
            out.push(
                ValidationIssue::warning(IssueCode::BusinessRule, "no-test-names", "test patient")
                    .with_location(format!("{}.name[{i}]", location)),
            );
        }
    }
}

#[test]
fn custom_rule_sets_can_be_injected() {
    let mut rules = RuleSet::standard();
    rules.add_custom::<Patient>(no_test_names);

    let validator = validator().with_rules(Arc::new(rules));
    let patient = resource(json!({
        "resourceType": "Patient",
        "name": [{ "family": "Smith" }, { "family": "Test" }]
    }));
    let outcome = validator.validate(&patient);
    assert_eq!(summary(&outcome), vec![("no-test-names", "Patient.name[1]".to_string())]);
}

#[test]
fn validators_are_shareable_across_threads() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Validator>();

    let validator = Arc::new(validator());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let validator = Arc::clone(&validator);
            std::thread::spawn(move || validator.validate(&faulty_observation()).error_count())
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 5);
    }
}
