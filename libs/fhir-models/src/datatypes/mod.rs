//! Complex datatypes: every open type a choice property may carry.

mod dosage;
mod general;
mod metadata;

pub use dosage::{Dosage, DosageDoseAndRate};
pub use general::{
    Address, Age, Annotation, Attachment, CodeableConcept, Coding, ContactPoint, Count, Distance,
    Duration, HumanName, Identifier, Money, Period, Quantity, Range, Ratio, SampledData,
    Signature, SimpleQuantity, Timing, TimingRepeat,
};
pub use metadata::{
    ContactDetail, Contributor, DataRequirement, DataRequirementCodeFilter,
    DataRequirementDateFilter, DataRequirementSort, Expression, ParameterDefinition,
    RelatedArtifact, TriggerDefinition, UsageContext,
};
