//! Required value-set bindings of the modelled shapes.
//!
//! Only closed, required-strength bindings are listed. Extensible and
//! preferred bindings are left to terminology services.

/// A closed set of codes from one code system.
#[derive(Debug)]
pub struct ValueSet {
    pub url: &'static str,
    pub codes: &'static [&'static str],
}

impl ValueSet {
    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains(&code)
    }
}

macro_rules! value_sets {
    ($($name:ident = $url:literal [$($code:literal),+ $(,)?];)*) => {
        $(
            pub static $name: ValueSet = ValueSet {
                url: $url,
                codes: &[$($code),+],
            };
        )*

        /// Every value set declared here, for lookup by canonical URL.
        pub static ALL: &[&ValueSet] = &[$(&$name),*];
    };
}

value_sets! {
    ADMINISTRATIVE_GENDER = "http://hl7.org/fhir/ValueSet/administrative-gender"
        ["male", "female", "other", "unknown"];
    ADDRESS_USE = "http://hl7.org/fhir/ValueSet/address-use"
        ["home", "work", "temp", "old", "billing"];
    ADDRESS_TYPE = "http://hl7.org/fhir/ValueSet/address-type"
        ["postal", "physical", "both"];
    CONTACT_POINT_SYSTEM = "http://hl7.org/fhir/ValueSet/contact-point-system"
        ["phone", "fax", "email", "pager", "url", "sms", "other"];
    CONTACT_POINT_USE = "http://hl7.org/fhir/ValueSet/contact-point-use"
        ["home", "work", "temp", "old", "mobile"];
    NAME_USE = "http://hl7.org/fhir/ValueSet/name-use"
        ["usual", "official", "temp", "nickname", "anonymous", "old", "maiden"];
    IDENTIFIER_USE = "http://hl7.org/fhir/ValueSet/identifier-use"
        ["usual", "official", "temp", "secondary", "old"];
    QUANTITY_COMPARATOR = "http://hl7.org/fhir/ValueSet/quantity-comparator"
        ["<", "<=", ">=", ">"];
    NARRATIVE_STATUS = "http://hl7.org/fhir/ValueSet/narrative-status"
        ["generated", "extensions", "additional", "empty"];
    LINK_TYPE = "http://hl7.org/fhir/ValueSet/link-type"
        ["replaced-by", "replaces", "refer", "seealso"];
    DAYS_OF_WEEK = "http://hl7.org/fhir/ValueSet/days-of-week"
        ["mon", "tue", "wed", "thu", "fri", "sat", "sun"];
    UNITS_OF_TIME = "http://hl7.org/fhir/ValueSet/units-of-time"
        ["s", "min", "h", "d", "wk", "mo", "a"];
    EVENT_TIMING = "http://hl7.org/fhir/ValueSet/event-timing"
        [
            "MORN", "MORN.early", "MORN.late", "NOON", "AFT", "AFT.early", "AFT.late",
            "EVE", "EVE.early", "EVE.late", "NIGHT", "PHS", "HS", "WAKE", "C", "CM",
            "CD", "CV", "AC", "ACM", "ACD", "ACV", "PC", "PCM", "PCD", "PCV",
        ];
    OBSERVATION_STATUS = "http://hl7.org/fhir/ValueSet/observation-status"
        [
            "registered", "preliminary", "final", "amended", "corrected",
            "cancelled", "entered-in-error", "unknown",
        ];
    APPOINTMENT_STATUS = "http://hl7.org/fhir/ValueSet/appointmentstatus"
        [
            "proposed", "pending", "booked", "arrived", "fulfilled", "cancelled",
            "noshow", "entered-in-error", "checked-in", "waitlist",
        ];
    PARTICIPANT_REQUIRED = "http://hl7.org/fhir/ValueSet/participantrequired"
        ["required", "optional", "information-only"];
    PARTICIPATION_STATUS = "http://hl7.org/fhir/ValueSet/participationstatus"
        ["accepted", "declined", "tentative", "needs-action"];
    BUNDLE_TYPE = "http://hl7.org/fhir/ValueSet/bundle-type"
        [
            "document", "message", "transaction", "transaction-response", "batch",
            "batch-response", "history", "searchset", "collection",
        ];
    SEARCH_ENTRY_MODE = "http://hl7.org/fhir/ValueSet/search-entry-mode"
        ["match", "include", "outcome"];
    HTTP_VERB = "http://hl7.org/fhir/ValueSet/http-verb"
        ["GET", "HEAD", "POST", "PUT", "DELETE", "PATCH"];
    ISSUE_SEVERITY = "http://hl7.org/fhir/ValueSet/issue-severity"
        ["fatal", "error", "warning", "information"];
    ISSUE_TYPE = "http://hl7.org/fhir/ValueSet/issue-type"
        [
            "invalid", "structure", "required", "value", "invariant", "security",
            "login", "unknown", "expired", "forbidden", "suppressed", "processing",
            "not-supported", "duplicate", "multiple-matches", "not-found", "deleted",
            "too-long", "code-invalid", "extension", "too-costly", "business-rule",
            "conflict", "transient", "lock-error", "no-store", "exception", "timeout",
            "incomplete", "throttled", "informational",
        ];
    RELATED_ARTIFACT_TYPE = "http://hl7.org/fhir/ValueSet/related-artifact-type"
        [
            "documentation", "justification", "citation", "predecessor", "successor",
            "derived-from", "depends-on", "composed-of",
        ];
    CONTRIBUTOR_TYPE = "http://hl7.org/fhir/ValueSet/contributor-type"
        ["author", "editor", "reviewer", "endorser"];
    OPERATION_PARAMETER_USE = "http://hl7.org/fhir/ValueSet/operation-parameter-use"
        ["in", "out"];
    SORT_DIRECTION = "http://hl7.org/fhir/ValueSet/sort-direction"
        ["ascending", "descending"];
    TRIGGER_TYPE = "http://hl7.org/fhir/ValueSet/trigger-type"
        [
            "named-event", "periodic", "data-changed", "data-added", "data-modified",
            "data-removed", "data-accessed", "data-access-ended",
        ];
}

/// Finds a declared value set by canonical URL (version suffix ignored).
pub fn lookup(url: &str) -> Option<&'static ValueSet> {
    let url = url.split('|').next().unwrap_or(url);
    ALL.iter().copied().find(|vs| vs.url == url)
}
