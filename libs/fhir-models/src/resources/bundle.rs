use crate::any::AnyResource;
use crate::bindings;
use crate::datatypes::{Identifier, Signature};
use crate::macros::fhir_type;
use crate::primitive::{Code, FhirDecimal, FhirInstant, FhirString, UnsignedInt, Uri};

fhir_type! {
    /// Contains a collection of resources.
    resource Bundle = "Bundle" {
        /// Persistent identifier for the bundle
        identifier: optional Identifier => "identifier";
        /// document | message | transaction | transaction-response | batch |
        /// batch-response | history | searchset | collection
        type_: required Code => "type", binding bindings::BUNDLE_TYPE;
        /// When the bundle was assembled
        timestamp: optional FhirInstant => "timestamp";
        /// If search, the total number of matches
        total: optional UnsignedInt => "total";
        link: list BundleLink => "link";
        entry: list BundleEntry => "entry";
        signature: optional Signature => "signature";
    }
}

fhir_type! {
    /// Links related to this Bundle.
    backbone BundleLink = "Bundle.link" {
        relation: required FhirString => "relation";
        url: required Uri => "url";
    }
}

fhir_type! {
    /// Entry in the bundle - will have a resource or information.
    backbone BundleEntry = "Bundle.entry" {
        link: list BundleLink => "link";
        /// URI for resource (Absolute URL server address or URI for UUID/OID)
        full_url: optional Uri => "fullUrl";
        resource: optional AnyResource => "resource";
        search: optional BundleEntrySearch => "search";
        request: optional BundleEntryRequest => "request";
        response: optional BundleEntryResponse => "response";
    }
}

fhir_type! {
    backbone BundleEntrySearch = "Bundle.entry.search" {
        /// match | include | outcome
        mode: optional Code => "mode", binding bindings::SEARCH_ENTRY_MODE;
        score: optional FhirDecimal => "score";
    }
}

fhir_type! {
    /// Additional execution information (transaction/batch/history).
    backbone BundleEntryRequest = "Bundle.entry.request" {
        /// GET | HEAD | POST | PUT | DELETE | PATCH
        method: required Code => "method", binding bindings::HTTP_VERB;
        url: required Uri => "url";
        if_none_match: optional FhirString => "ifNoneMatch";
        if_modified_since: optional FhirInstant => "ifModifiedSince";
        if_match: optional FhirString => "ifMatch";
        if_none_exist: optional FhirString => "ifNoneExist";
    }
}

fhir_type! {
    /// Results of execution (transaction/batch/history).
    backbone BundleEntryResponse = "Bundle.entry.response" {
        status: required FhirString => "status";
        location: optional Uri => "location";
        etag: optional FhirString => "etag";
        last_modified: optional FhirInstant => "lastModified";
        /// OperationOutcome with hints and warnings (for batch/transaction)
        outcome: optional AnyResource => "outcome";
    }
}

impl Bundle {
    pub fn type_str(&self) -> Option<&str> {
        self.type_.as_ref().and_then(|p| p.as_str())
    }

    /// A collection bundle of the given resources.
    pub fn collection(resources: impl IntoIterator<Item = AnyResource>) -> Self {
        Self {
            type_: Some(Code::from("collection")),
            entry: resources
                .into_iter()
                .map(|resource| BundleEntry {
                    resource: Some(resource),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    /// Resources of every entry, in order.
    pub fn resources(&self) -> impl Iterator<Item = &AnyResource> {
        self.entry.iter().filter_map(|entry| entry.resource.as_ref())
    }
}

impl BundleEntry {
    pub fn full_url_str(&self) -> Option<&str> {
        self.full_url.as_ref().and_then(|p| p.as_str())
    }
}
