use crate::datatypes::{CodeableConcept, Identifier};
use crate::macros::fhir_type;
use crate::primitive::FhirDate;
use crate::reference::Reference;

fhir_type! {
    /// Resource for non-supported content.
    domain_resource Basic = "Basic" {
        identifier: list Identifier => "identifier";
        /// Kind of Resource
        code: required CodeableConcept => "code";
        /// Identifies the focus of this resource
        subject: optional Reference => "subject";
        created: optional FhirDate => "created";
        author: optional Reference => "author";
    }
}
