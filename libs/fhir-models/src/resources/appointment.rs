use crate::bindings;
use crate::datatypes::{CodeableConcept, Identifier, Period};
use crate::macros::fhir_type;
use crate::primitive::{Code, FhirDateTime, FhirInstant, FhirString, PositiveInt, UnsignedInt};
use crate::reference::Reference;

fhir_type! {
    /// A booking of a healthcare event among patient(s), practitioner(s),
    /// related person(s) and/or device(s) for a specific date/time.
    domain_resource Appointment = "Appointment" {
        identifier: list Identifier => "identifier";
        /// proposed | pending | booked | arrived | fulfilled | cancelled | noshow |
        /// entered-in-error | checked-in | waitlist
        status: required Code => "status", binding bindings::APPOINTMENT_STATUS;
        /// The coded reason for the appointment being cancelled
        cancelation_reason: optional CodeableConcept => "cancelationReason";
        service_category: list CodeableConcept => "serviceCategory";
        service_type: list CodeableConcept => "serviceType";
        specialty: list CodeableConcept => "specialty";
        appointment_type: optional CodeableConcept => "appointmentType";
        reason_code: list CodeableConcept => "reasonCode";
        reason_reference: list Reference => "reasonReference";
        priority: optional UnsignedInt => "priority";
        description: optional FhirString => "description";
        supporting_information: list Reference => "supportingInformation";
        /// When appointment is to take place
        start: optional FhirInstant => "start";
        /// When appointment is to conclude
        end: optional FhirInstant => "end";
        minutes_duration: optional PositiveInt => "minutesDuration";
        slot: list Reference => "slot";
        created: optional FhirDateTime => "created";
        comment: optional FhirString => "comment";
        patient_instruction: optional FhirString => "patientInstruction";
        based_on: list Reference => "basedOn";
        /// Participants involved in appointment
        participant: required_list AppointmentParticipant => "participant";
        requested_period: list Period => "requestedPeriod";
    }
}

fhir_type! {
    backbone AppointmentParticipant = "Appointment.participant" {
        /// Role of participant in the appointment
        type_: list CodeableConcept => "type";
        actor: optional Reference => "actor";
        /// required | optional | information-only
        required: optional Code => "required", binding bindings::PARTICIPANT_REQUIRED;
        /// accepted | declined | tentative | needs-action
        status: required Code => "status", binding bindings::PARTICIPATION_STATUS;
        period: optional Period => "period";
    }
}

impl Appointment {
    pub fn status_str(&self) -> Option<&str> {
        self.status.as_ref().and_then(|p| p.as_str())
    }
}
