use crate::choice::DynamicValue;
use crate::datatypes::{Annotation, CodeableConcept, Identifier};
use crate::macros::fhir_type;
use crate::primitive::FhirDateTime;
use crate::reference::Reference;

fhir_type! {
    /// A clinical condition, problem, diagnosis, or other event, situation,
    /// issue, or clinical concept that has risen to a level of concern.
    domain_resource Condition = "Condition" {
        identifier: list Identifier => "identifier";
        /// active | recurrence | relapse | inactive | remission | resolved
        clinical_status: optional CodeableConcept => "clinicalStatus";
        /// unconfirmed | provisional | differential | confirmed | refuted | entered-in-error
        verification_status: optional CodeableConcept => "verificationStatus";
        /// problem-list-item | encounter-diagnosis
        category: list CodeableConcept => "category";
        severity: optional CodeableConcept => "severity";
        code: optional CodeableConcept => "code";
        body_site: list CodeableConcept => "bodySite";
        subject: required Reference => "subject";
        encounter: optional Reference => "encounter";
        onset: optional DynamicValue => "onset", choice [DateTime, Age, Period, Range, String];
        abatement: optional DynamicValue => "abatement", choice [DateTime, Age, Period, Range, String];
        recorded_date: optional FhirDateTime => "recordedDate";
        recorder: optional Reference => "recorder";
        asserter: optional Reference => "asserter";
        stage: list ConditionStage => "stage";
        evidence: list ConditionEvidence => "evidence";
        note: list Annotation => "note";
    }
}

fhir_type! {
    /// Stage/grade, usually assessed formally.
    backbone ConditionStage = "Condition.stage" {
        summary: optional CodeableConcept => "summary";
        assessment: list Reference => "assessment";
        type_: optional CodeableConcept => "type";
    }
}

fhir_type! {
    /// Supporting evidence.
    backbone ConditionEvidence = "Condition.evidence" {
        code: list CodeableConcept => "code";
        detail: list Reference => "detail";
    }
}
