use crate::bindings;
use crate::datatypes::CodeableConcept;
use crate::macros::fhir_type;
use crate::primitive::{Code, FhirString};

fhir_type! {
    /// Information about the success/failure of an action.
    domain_resource OperationOutcome = "OperationOutcome" {
        /// A single issue associated with the action
        issue: required_list OperationOutcomeIssue => "issue";
    }
}

fhir_type! {
    backbone OperationOutcomeIssue = "OperationOutcome.issue" {
        /// fatal | error | warning | information
        severity: required Code => "severity", binding bindings::ISSUE_SEVERITY;
        /// Error or warning code
        code: required Code => "code", binding bindings::ISSUE_TYPE;
        details: optional CodeableConcept => "details";
        /// Additional diagnostic information about the issue
        diagnostics: optional FhirString => "diagnostics";
        location: list FhirString => "location";
        /// FHIRPath of element(s) related to issue
        expression: list FhirString => "expression";
    }
}

impl OperationOutcomeIssue {
    pub fn new(severity: &str, code: &str, diagnostics: impl Into<String>) -> Self {
        Self {
            severity: Some(Code::from(severity)),
            code: Some(Code::from(code)),
            diagnostics: Some(FhirString::from(diagnostics.into())),
            ..Default::default()
        }
    }

    pub fn severity_str(&self) -> Option<&str> {
        self.severity.as_ref().and_then(|p| p.as_str())
    }
}
