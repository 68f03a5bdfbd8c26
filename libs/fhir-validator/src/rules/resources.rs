//! Invariants of the declared resources.

use super::{Rule, RuleSet};
use crate::location::LocationContext;
use crate::terminology::{
    clinical_status, condition_category, verification_status, CONDITION_CATEGORY,
    CONDITION_CLINICAL, CONDITION_VER_STATUS,
};
use crate::validator::{IssueCode, ValidationIssue};
use serde_json::Value;
use std::collections::HashMap;
use tessera_models::{
    AnyResource, Appointment, AppointmentParticipant, Basic, Bundle, BundleEntry, CodeableConcept,
    Condition, DomainResource, Meta, Observation, ObservationComponent, ObservationReferenceRange,
    OperationOutcome, OperationOutcomeIssue, Patient, PatientContact,
};

pub(super) fn register(set: &mut RuleSet) {
    register_domain::<Appointment>(set);
    register_domain::<Basic>(set);
    register_domain::<Condition>(set);
    register_domain::<Observation>(set);
    register_domain::<OperationOutcome>(set);
    register_domain::<Patient>(set);

    set.add::<PatientContact>(vec![Rule::error(
        "pat-1",
        "SHALL at least contain a contact's details or a reference to an organization",
        |c: &PatientContact| {
            c.name.is_some() || !c.telecom.is_empty() || c.address.is_some() || c.organization.is_some()
        },
    )]);

    set.add::<Condition>(vec![
        Rule::warning(
            "con-3",
            "Condition.clinicalStatus SHALL be present if verificationStatus is not entered-in-error and category is problem-list-item",
            |c: &Condition| {
                c.clinical_status.is_some()
                    || entered_in_error(c)
                    || !c.category.iter().any(|category| {
                        category.has_coding(CONDITION_CATEGORY, condition_category::PROBLEM_LIST_ITEM)
                    })
            },
        ),
        Rule::error(
            "con-4",
            "If condition is abated, then clinicalStatus must be either inactive, resolved, or remission",
            |c: &Condition| {
                c.abatement.is_none()
                    || c.clinical_status.as_ref().is_some_and(|status| {
                        clinical_status::ABATED
                            .iter()
                            .any(|code| status.has_coding(CONDITION_CLINICAL, code))
                    })
            },
        ),
        Rule::error(
            "con-5",
            "Condition.clinicalStatus SHALL NOT be present if verification Status is entered-in-error",
            |c: &Condition| c.clinical_status.is_none() || !entered_in_error(c),
        ),
    ]);

    set.add::<Observation>(vec![
        Rule::error(
            "obs-6",
            "dataAbsentReason SHALL only be present if Observation.value[x] is not present",
            |o: &Observation| o.data_absent_reason.is_none() || o.value.is_none(),
        ),
        Rule::error(
            "obs-7",
            "If Observation.code is the same as an Observation.component.code then the value element associated with the code SHALL NOT be present",
            component_codes_differ,
        ),
    ]);
    set.add::<ObservationComponent>(vec![Rule::error(
        "obs-6",
        "dataAbsentReason SHALL only be present if Observation.value[x] is not present",
        |c: &ObservationComponent| c.data_absent_reason.is_none() || c.value.is_none(),
    )]);
    set.add::<ObservationReferenceRange>(vec![Rule::error(
        "obs-3",
        "Must have at least a low or a high or text",
        |r: &ObservationReferenceRange| r.low.is_some() || r.high.is_some() || r.text.is_some(),
    )]);

    set.add::<AppointmentParticipant>(vec![Rule::error(
        "app-1",
        "Either the type or actor on the participant SHALL be specified",
        |p: &AppointmentParticipant| !p.type_.is_empty() || p.actor.is_some(),
    )]);
    set.add::<Appointment>(vec![
        Rule::error(
            "app-2",
            "Either start and end are specified, or neither",
            |a: &Appointment| a.start.is_some() == a.end.is_some(),
        ),
        Rule::error(
            "app-3",
            "Only proposed or cancelled appointments can be missing start/end dates",
            |a: &Appointment| {
                (a.start.is_some() && a.end.is_some())
                    || status_in(a.status_str(), &["proposed", "cancelled", "waitlist"])
            },
        ),
        Rule::error(
            "app-4",
            "Cancelation reason is only used for appointments that have been cancelled, or no-show",
            |a: &Appointment| {
                a.cancelation_reason.is_none() || status_in(a.status_str(), &["noshow", "cancelled"])
            },
        ),
    ]);

    set.add::<Bundle>(vec![
        Rule::error(
            "bdl-1",
            "total only when a search or history",
            |b: &Bundle| b.total.is_none() || status_in(b.type_str(), &["searchset", "history"]),
        ),
        Rule::error(
            "bdl-2",
            "entry.search only when a search",
            |b: &Bundle| {
                b.entry.iter().all(|e| e.search.is_none()) || status_in(b.type_str(), &["searchset"])
            },
        ),
        Rule::error(
            "bdl-3",
            "entry.request mandatory for batch/transaction/history, otherwise prohibited",
            |b: &Bundle| {
                entries_follow_type(b, &["batch", "transaction", "history"], |e| {
                    e.request.is_some()
                })
            },
        ),
        Rule::error(
            "bdl-4",
            "entry.response mandatory for batch-response/transaction-response/history, otherwise prohibited",
            |b: &Bundle| {
                entries_follow_type(
                    b,
                    &["batch-response", "transaction-response", "history"],
                    |e| e.response.is_some(),
                )
            },
        ),
        Rule::error(
            "bdl-9",
            "A document must have an identifier with a system and a value",
            |b: &Bundle| {
                b.type_str() != Some("document")
                    || b.identifier
                        .as_ref()
                        .is_some_and(|id| id.system.is_some() && id.value.is_some())
            },
        ),
        Rule::error(
            "bdl-10",
            "A document must have a date",
            |b: &Bundle| {
                b.type_str() != Some("document")
                    || b.timestamp.as_ref().is_some_and(|t| t.has_value())
            },
        ),
        Rule::error(
            "bdl-11",
            "A document must have a Composition as the first resource",
            |b: &Bundle| b.type_str() != Some("document") || first_resource_is(b, "Composition"),
        ),
        Rule::error(
            "bdl-12",
            "A message must have a MessageHeader as the first resource",
            |b: &Bundle| b.type_str() != Some("message") || first_resource_is(b, "MessageHeader"),
        ),
    ]);
    set.add_custom::<Bundle>(full_urls_unique);
    set.add::<BundleEntry>(vec![
        Rule::error(
            "bdl-5",
            "must be a resource unless there's a request or response",
            |e: &BundleEntry| e.resource.is_some() || e.request.is_some() || e.response.is_some(),
        ),
        Rule::error(
            "bdl-8",
            "fullUrl cannot be a version specific reference",
            |e: &BundleEntry| !e.full_url_str().is_some_and(|url| url.contains("/_history/")),
        ),
    ]);

    set.add::<OperationOutcomeIssue>(vec![Rule::warning(
        "opo-1",
        "An issue should carry diagnostics or details",
        |i: &OperationOutcomeIssue| i.diagnostics.is_some() || i.details.is_some(),
    )]);
}

fn register_domain<T: DomainResource>(set: &mut RuleSet) {
    set.add::<T>(vec![
        Rule::error(
            "dom-2",
            "If the resource is contained in another resource, it SHALL NOT contain nested Resources",
            |r: &T| r.contained().iter().all(|c| !has_nested_contained(c)),
        ),
        Rule::error(
            "dom-4",
            "If a resource is contained in another resource, it SHALL NOT have a meta.versionId or a meta.lastUpdated",
            |r: &T| {
                r.contained().iter().all(|c| {
                    !meta_has(c, "versionId", |m| m.version_id.is_some())
                        && !meta_has(c, "lastUpdated", |m| m.last_updated.is_some())
                })
            },
        ),
        Rule::error(
            "dom-5",
            "If a resource is contained in another resource, it SHALL NOT have a security label",
            |r: &T| {
                r.contained()
                    .iter()
                    .all(|c| !meta_has(c, "security", |m| !m.security.is_empty()))
            },
        ),
        Rule::warning(
            "dom-6",
            "A resource should have narrative for robust management",
            |r: &T| {
                r.text()
                    .and_then(|text| text.div.as_deref())
                    .is_some_and(|div| !div.trim().is_empty())
            },
        )
        .best_practice(),
    ]);
}

fn has_nested_contained(resource: &AnyResource) -> bool {
    if !resource.contained().is_empty() {
        return true;
    }
    match resource {
        AnyResource::Unknown(unknown) => unknown
            .get("contained")
            .and_then(Value::as_array)
            .is_some_and(|nested| !nested.is_empty()),
        _ => false,
    }
}

/// Whether a contained resource's `meta` carries `key`; typed resources
/// answer through `typed`, opaque ones through their raw JSON.
fn meta_has(
    resource: &AnyResource,
    key: &str,
    typed: fn(&Meta) -> bool,
) -> bool {
    match resource {
        AnyResource::Unknown(unknown) => unknown
            .get("meta")
            .and_then(|meta| meta.get(key))
            .is_some_and(|value| !value.is_null()),
        _ => resource.meta().is_some_and(typed),
    }
}

fn entered_in_error(condition: &Condition) -> bool {
    condition.verification_status.as_ref().is_some_and(|status| {
        status.has_coding(CONDITION_VER_STATUS, verification_status::ENTERED_IN_ERROR)
    })
}

fn shares_coding(a: &CodeableConcept, b: &CodeableConcept) -> bool {
    a.coding.iter().any(|x| {
        b.coding
            .iter()
            .any(|y| x.system_str() == y.system_str() && x.code_str() == y.code_str())
    })
}

fn component_codes_differ(observation: &Observation) -> bool {
    let (Some(_), Some(code)) = (&observation.value, &observation.code) else {
        return true;
    };
    observation
        .component
        .iter()
        .filter_map(|component| component.code.as_ref())
        .all(|component_code| !shares_coding(code, component_code))
}

/// An absent status passes: the required-field check already reports it.
fn status_in(status: Option<&str>, allowed: &[&str]) -> bool {
    status.map_or(true, |status| allowed.contains(&status))
}

/// Every entry has the part exactly when the bundle type is one of `types`.
fn entries_follow_type(bundle: &Bundle, types: &[&str], has_part: fn(&BundleEntry) -> bool) -> bool {
    let Some(bundle_type) = bundle.type_str() else {
        return true;
    };
    let expected = types.contains(&bundle_type);
    bundle.entry.iter().all(|entry| has_part(entry) == expected)
}

fn first_resource_is(bundle: &Bundle, resource_type: &str) -> bool {
    bundle
        .entry
        .first()
        .and_then(|entry| entry.resource.as_ref())
        .is_some_and(|resource| resource.resource_type() == resource_type)
}

fn version_id(resource: &AnyResource) -> Option<&str> {
    match resource {
        AnyResource::Unknown(unknown) => unknown
            .get("meta")
            .and_then(|meta| meta.get("versionId"))
            .and_then(Value::as_str),
        _ => resource
            .meta()
            .and_then(|meta| meta.version_id.as_ref())
            .and_then(|v| v.as_str()),
    }
}

/// bdl-7: the `(fullUrl, meta.versionId)` pairs must be distinct, except in
/// history bundles. An absent version is a value of its own.
fn full_urls_unique(bundle: &Bundle, location: &LocationContext, out: &mut Vec<ValidationIssue>) {
    if bundle.type_str() == Some("history") {
        return;
    }

    let mut seen: HashMap<&str, Vec<Option<&str>>> = HashMap::new();
    for (i, entry) in bundle.entry.iter().enumerate() {
        let Some(url) = entry.full_url_str() else {
            continue;
        };
        let version = entry.resource.as_ref().and_then(version_id);
        let versions = seen.entry(url).or_default();
        let clash = versions.contains(&version);
        if clash {
            out.push(
                ValidationIssue::error(
                    IssueCode::Invariant,
                    "bdl-7",
                    format!(
                        "Constraint 'bdl-7' failed: FullUrl must be unique in a bundle, or else entries with the same fullUrl must have different meta.versionId (except in history bundles) (duplicate fullUrl '{url}')"
                    ),
                )
                .with_location(location.child(&format!("entry[{i}]"))),
            );
        }
        versions.push(version);
    }
}
