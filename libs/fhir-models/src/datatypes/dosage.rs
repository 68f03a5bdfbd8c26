use super::general::{CodeableConcept, Quantity, Ratio, Timing};
use crate::choice::DynamicValue;
use crate::macros::fhir_type;
use crate::primitive::{FhirString, Integer};

fhir_type! {
    /// How the medication is/was taken or should be taken.
    backbone Dosage = "Dosage" {
        /// The order of the dosage instructions
        sequence: optional Integer => "sequence";
        text: optional FhirString => "text";
        additional_instruction: list CodeableConcept => "additionalInstruction";
        patient_instruction: optional FhirString => "patientInstruction";
        timing: optional Timing => "timing";
        /// Take "as needed" (for x)
        as_needed: optional DynamicValue => "asNeeded", choice [Boolean, CodeableConcept];
        site: optional CodeableConcept => "site";
        route: optional CodeableConcept => "route";
        method: optional CodeableConcept => "method";
        dose_and_rate: list DosageDoseAndRate => "doseAndRate";
        max_dose_per_period: optional Ratio => "maxDosePerPeriod";
        max_dose_per_administration: optional Quantity => "maxDosePerAdministration";
        max_dose_per_lifetime: optional Quantity => "maxDosePerLifetime";
    }
}

fhir_type! {
    /// Amount of medication administered.
    element DosageDoseAndRate = "Dosage.doseAndRate" {
        type_: optional CodeableConcept => "type";
        dose: optional DynamicValue => "dose", choice [Range, Quantity];
        rate: optional DynamicValue => "rate", choice [Ratio, Range, Quantity];
    }
}
