//! Resource base kinds, `Meta` and `Narrative`.

use crate::any::AnyResource;
use crate::bindings;
use crate::codec::Structure;
use crate::datatypes::Coding;
use crate::element::Extension;
use crate::macros::fhir_type;
use crate::primitive::{Canonical, Code, FhirInstant, Id, Uri};

/// Accessors shared by every resource.
pub trait Resource: Structure {
    /// The `resourceType` discriminator.
    fn resource_type(&self) -> &'static str {
        Self::TYPE_NAME
    }

    fn id(&self) -> Option<&str>;

    fn meta(&self) -> Option<&Meta>;

    fn implicit_rules(&self) -> Option<&str>;

    fn language(&self) -> Option<&str>;

    /// Returns the resource with its metadata replaced.
    fn with_meta(self, meta: Option<Meta>) -> Self;
}

/// Resources that carry narrative, contained resources and extensions.
pub trait DomainResource: Resource {
    fn text(&self) -> Option<&Narrative>;

    fn contained(&self) -> &[AnyResource];

    fn extension(&self) -> &[Extension];

    fn modifier_extension(&self) -> &[Extension];
}

fhir_type! {
    /// Metadata about a resource.
    element Meta = "Meta" {
        /// Version specific identifier
        version_id: optional Id => "versionId";
        /// When the resource version last changed
        last_updated: optional FhirInstant => "lastUpdated";
        /// Identifies where the resource comes from
        source: optional Uri => "source";
        /// Profiles this resource claims to conform to
        profile: list Canonical => "profile";
        /// Security Labels applied to this resource
        security: list Coding => "security";
        /// Tags applied to this resource
        tag: list Coding => "tag";
    }
}

impl Meta {
    /// True when no property beyond extensions is populated.
    pub fn is_empty(&self) -> bool {
        self.version_id.is_none()
            && self.last_updated.is_none()
            && self.source.is_none()
            && self.profile.is_empty()
            && self.security.is_empty()
            && self.tag.is_empty()
    }
}

fhir_type! {
    /// Human-readable summary of the resource.
    element Narrative = "Narrative" {
        /// generated | extensions | additional | empty
        status: required Code => "status", binding bindings::NARRATIVE_STATUS;
        /// Limited xhtml content
        div: required String => "div";
    }
}

impl Narrative {
    pub fn generated(div: impl Into<String>) -> Self {
        Self {
            status: Some(Code::from("generated")),
            div: Some(div.into()),
            ..Default::default()
        }
    }
}
