//! Code systems and well-known codes referenced by the resource invariants.

pub const CONDITION_CLINICAL: &str = "http://terminology.hl7.org/CodeSystem/condition-clinical";
pub const CONDITION_VER_STATUS: &str =
    "http://terminology.hl7.org/CodeSystem/condition-ver-status";
pub const CONDITION_CATEGORY: &str = "http://terminology.hl7.org/CodeSystem/condition-category";

/// `Condition.clinicalStatus` codes.
pub mod clinical_status {
    pub const ACTIVE: &str = "active";
    pub const RECURRENCE: &str = "recurrence";
    pub const RELAPSE: &str = "relapse";
    pub const INACTIVE: &str = "inactive";
    pub const REMISSION: &str = "remission";
    pub const RESOLVED: &str = "resolved";

    /// Statuses compatible with an abatement.
    pub const ABATED: &[&str] = &[INACTIVE, REMISSION, RESOLVED];
}

/// `Condition.verificationStatus` codes.
pub mod verification_status {
    pub const UNCONFIRMED: &str = "unconfirmed";
    pub const PROVISIONAL: &str = "provisional";
    pub const DIFFERENTIAL: &str = "differential";
    pub const CONFIRMED: &str = "confirmed";
    pub const REFUTED: &str = "refuted";
    pub const ENTERED_IN_ERROR: &str = "entered-in-error";
}

/// `Condition.category` codes.
pub mod condition_category {
    pub const PROBLEM_LIST_ITEM: &str = "problem-list-item";
    pub const ENCOUNTER_DIAGNOSIS: &str = "encounter-diagnosis";
}
