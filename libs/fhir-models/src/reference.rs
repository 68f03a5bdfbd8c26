//! `Reference` and RESTful reference decomposition.

use crate::datatypes::Identifier;
use crate::macros::fhir_type;
use crate::primitive::{FhirString, Uri};
use phf::phf_set;

/// Every resource type name defined by FHIR R4.
pub static RESOURCE_TYPES: phf::Set<&'static str> = phf_set! {
    "Account", "ActivityDefinition", "AdverseEvent", "AllergyIntolerance", "Appointment",
    "AppointmentResponse", "AuditEvent", "Basic", "Binary", "BiologicallyDerivedProduct",
    "BodyStructure", "Bundle", "CapabilityStatement", "CarePlan", "CareTeam", "CatalogEntry",
    "ChargeItem", "ChargeItemDefinition", "Claim", "ClaimResponse", "ClinicalImpression",
    "CodeSystem", "Communication", "CommunicationRequest", "CompartmentDefinition",
    "Composition", "ConceptMap", "Condition", "Consent", "Contract", "Coverage",
    "CoverageEligibilityRequest", "CoverageEligibilityResponse", "DetectedIssue", "Device",
    "DeviceDefinition", "DeviceMetric", "DeviceRequest", "DeviceUseStatement",
    "DiagnosticReport", "DocumentManifest", "DocumentReference", "EffectEvidenceSynthesis",
    "Encounter", "Endpoint", "EnrollmentRequest", "EnrollmentResponse", "EpisodeOfCare",
    "EventDefinition", "Evidence", "EvidenceVariable", "ExampleScenario",
    "ExplanationOfBenefit", "FamilyMemberHistory", "Flag", "Goal", "GraphDefinition", "Group",
    "GuidanceResponse", "HealthcareService", "ImagingStudy", "Immunization",
    "ImmunizationEvaluation", "ImmunizationRecommendation", "ImplementationGuide",
    "InsurancePlan", "Invoice", "Library", "Linkage", "List", "Location", "Measure",
    "MeasureReport", "Media", "Medication", "MedicationAdministration", "MedicationDispense",
    "MedicationKnowledge", "MedicationRequest", "MedicationStatement", "MedicinalProduct",
    "MedicinalProductAuthorization", "MedicinalProductContraindication",
    "MedicinalProductIndication", "MedicinalProductIngredient", "MedicinalProductInteraction",
    "MedicinalProductManufactured", "MedicinalProductPackaged",
    "MedicinalProductPharmaceutical", "MedicinalProductUndesirableEffect", "MessageDefinition",
    "MessageHeader", "MolecularSequence", "NamingSystem", "NutritionOrder", "Observation",
    "ObservationDefinition", "OperationDefinition", "OperationOutcome", "Organization",
    "OrganizationAffiliation", "Parameters", "Patient", "PaymentNotice",
    "PaymentReconciliation", "Person", "PlanDefinition", "Practitioner", "PractitionerRole",
    "Procedure", "Provenance", "Questionnaire", "QuestionnaireResponse", "RelatedPerson",
    "RequestGroup", "ResearchDefinition", "ResearchElementDefinition", "ResearchStudy",
    "ResearchSubject", "RiskAssessment", "RiskEvidenceSynthesis", "Schedule",
    "SearchParameter", "ServiceRequest", "Slot", "Specimen", "SpecimenDefinition",
    "StructureDefinition", "StructureMap", "Subscription", "Substance",
    "SubstanceNucleicAcid", "SubstancePolymer", "SubstanceProtein",
    "SubstanceReferenceInformation", "SubstanceSourceMaterial", "SubstanceSpecification",
    "SupplyDelivery", "SupplyRequest", "Task", "TerminologyCapabilities", "TestReport",
    "TestScript", "ValueSet", "VerificationResult", "VisionPrescription",
};

pub fn is_resource_type(name: &str) -> bool {
    RESOURCE_TYPES.contains(name)
}

fhir_type! {
    /// A reference from one resource to another.
    element Reference = "Reference" {
        /// Literal reference, Relative, internal or absolute URL
        reference: optional FhirString => "reference";
        /// Type the reference refers to (e.g. "Patient")
        type_: optional Uri => "type";
        /// Logical reference, when literal reference is not known
        identifier: optional Box<Identifier> => "identifier";
        /// Text alternative for the resource
        display: optional FhirString => "display";
    }
}

/// The parts of a RESTful literal reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceTarget<'a> {
    /// Service base URL, for absolute references.
    pub base: Option<&'a str>,
    pub resource_type: &'a str,
    pub id: &'a str,
    pub version: Option<&'a str>,
}

impl Reference {
    /// A relative reference `Type/id`.
    pub fn to(resource_type: &str, id: &str) -> Self {
        Self::new(format!("{resource_type}/{id}"))
    }

    pub fn new(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(FhirString::from(reference.into())),
            ..Default::default()
        }
    }

    pub fn reference_str(&self) -> Option<&str> {
        self.reference.as_ref().and_then(|r| r.as_str())
    }

    /// True for `#id` references into the containing resource.
    pub fn is_local(&self) -> bool {
        self.reference_str().is_some_and(|r| r.starts_with('#'))
    }

    /// Id of the contained resource a local reference points at.
    pub fn local_id(&self) -> Option<&str> {
        self.reference_str().and_then(|r| r.strip_prefix('#'))
    }

    /// Splits `[base/]Type/id[/_history/version]`. The type segment must be
    /// a FHIR R4 resource type name.
    pub fn target(&self) -> Option<ReferenceTarget<'_>> {
        parse_target(self.reference_str()?)
    }

    /// Resource type this reference declares or implies, preferring the
    /// explicit `type` over the literal reference.
    pub fn target_type(&self) -> Option<&str> {
        self.type_
            .as_ref()
            .and_then(|t| t.as_str())
            .map(|t| t.rsplit('/').next().unwrap_or(t))
            .or_else(|| self.target().map(|t| t.resource_type))
    }
}

fn parse_target(reference: &str) -> Option<ReferenceTarget<'_>> {
    if reference.starts_with('#') || reference.starts_with("urn:") {
        return None;
    }
    let reference = reference.split(['?', '#']).next().unwrap_or(reference);
    let (path, version) = match reference.split_once("/_history/") {
        Some((path, version)) if is_id(version) => (path, Some(version)),
        Some(_) => return None,
        None => (reference, None),
    };
    let (rest, id) = path.rsplit_once('/')?;
    let (base, resource_type) = match rest.rsplit_once('/') {
        Some((base, resource_type)) => (Some(base), resource_type),
        None => (None, rest),
    };
    if !is_resource_type(resource_type) || !is_id(id) {
        return None;
    }
    Some(ReferenceTarget {
        base: base.filter(|b| !b.is_empty()),
        resource_type,
        id,
        version,
    })
}

/// FHIR `id` lexical rule: 1-64 of `[A-Za-z0-9\-\.]`.
fn is_id(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= 64
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_reference_splits_type_and_id() {
        let reference = Reference::to("Patient", "123");
        let target = reference.target().unwrap();
        assert_eq!(target.resource_type, "Patient");
        assert_eq!(target.id, "123");
        assert_eq!(target.base, None);
        assert_eq!(target.version, None);
    }

    #[test]
    fn absolute_reference_with_history() {
        let r = Reference::new("http://example.org/fhir/Observation/abc.1/_history/2");
        let target = r.target().unwrap();
        assert_eq!(target.base, Some("http://example.org/fhir"));
        assert_eq!(target.resource_type, "Observation");
        assert_eq!(target.id, "abc.1");
        assert_eq!(target.version, Some("2"));
    }

    #[test]
    fn unknown_type_or_local_reference_has_no_target() {
        assert!(Reference::new("Foo/1").target().is_none());
        let local = Reference::new("#p1");
        assert!(local.is_local());
        assert_eq!(local.local_id(), Some("p1"));
        assert!(local.target().is_none());
        assert!(Reference::new("urn:uuid:0c3151bd").target().is_none());
    }

    #[test]
    fn explicit_type_wins() {
        let r = Reference {
            type_: Some(Uri::from("Organization")),
            ..Reference::to("Patient", "1")
        };
        assert_eq!(r.target_type(), Some("Organization"));
        assert_eq!(Reference::to("Patient", "1").target_type(), Some("Patient"));
    }
}
