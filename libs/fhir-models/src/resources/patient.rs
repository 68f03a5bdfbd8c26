use crate::bindings;
use crate::choice::DynamicValue;
use crate::datatypes::{
    Address, Attachment, CodeableConcept, ContactPoint, HumanName, Identifier, Period,
};
use crate::macros::fhir_type;
use crate::primitive::{Boolean, Code, FhirDate};
use crate::reference::Reference;

fhir_type! {
    /// Information about an individual receiving health care services.
    domain_resource Patient = "Patient" {
        /// An identifier for this patient
        identifier: list Identifier => "identifier";
        /// Whether this patient's record is in active use
        active: optional Boolean => "active";
        name: list HumanName => "name";
        telecom: list ContactPoint => "telecom";
        /// male | female | other | unknown
        gender: optional Code => "gender", binding bindings::ADMINISTRATIVE_GENDER;
        birth_date: optional FhirDate => "birthDate";
        deceased: optional DynamicValue => "deceased", choice [Boolean, DateTime];
        address: list Address => "address";
        marital_status: optional CodeableConcept => "maritalStatus";
        multiple_birth: optional DynamicValue => "multipleBirth", choice [Boolean, Integer];
        photo: list Attachment => "photo";
        /// A contact party (e.g. guardian, partner, friend) for the patient
        contact: list PatientContact => "contact";
        communication: list PatientCommunication => "communication";
        general_practitioner: list Reference => "generalPractitioner";
        managing_organization: optional Reference => "managingOrganization";
        link: list PatientLink => "link";
    }
}

fhir_type! {
    backbone PatientContact = "Patient.contact" {
        relationship: list CodeableConcept => "relationship";
        name: optional HumanName => "name";
        telecom: list ContactPoint => "telecom";
        address: optional Address => "address";
        gender: optional Code => "gender", binding bindings::ADMINISTRATIVE_GENDER;
        organization: optional Reference => "organization";
        period: optional Period => "period";
    }
}

fhir_type! {
    backbone PatientCommunication = "Patient.communication" {
        language: required CodeableConcept => "language";
        preferred: optional Boolean => "preferred";
    }
}

fhir_type! {
    /// Link to another patient resource that concerns the same actual person.
    backbone PatientLink = "Patient.link" {
        other: required Reference => "other";
        /// replaced-by | replaces | refer | seealso
        type_: required Code => "type", binding bindings::LINK_TYPE;
    }
}

impl Patient {
    pub fn gender_str(&self) -> Option<&str> {
        self.gender.as_ref().and_then(|p| p.as_str())
    }
}
