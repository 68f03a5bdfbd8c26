//! Declared resource shapes.
//!
//! Resource kinds not listed here decode as
//! [`UnknownResource`](crate::UnknownResource).

mod appointment;
mod basic;
mod bundle;
mod condition;
mod observation;
mod operation_outcome;
mod patient;

pub use appointment::{Appointment, AppointmentParticipant};
pub use basic::Basic;
pub use bundle::{
    Bundle, BundleEntry, BundleEntryRequest, BundleEntryResponse, BundleEntrySearch, BundleLink,
};
pub use condition::{Condition, ConditionEvidence, ConditionStage};
pub use observation::{Observation, ObservationComponent, ObservationReferenceRange};
pub use operation_outcome::{OperationOutcome, OperationOutcomeIssue};
pub use patient::{Patient, PatientCommunication, PatientContact, PatientLink};
