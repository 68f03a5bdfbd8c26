//! FHIR R4 data model and JSON codec
//!
//! This crate provides strongly-typed Rust structures for FHIR resources and a
//! single manifest-driven codec that maps them to and from FHIR JSON.
//!
//! # Module Organization
//!
//! - `primitive`, `temporal`: primitive elements (`Primitive<T>`) and the
//!   lexically preserved date/time kinds
//! - `element`, `resource`: base kinds and their traits
//! - `choice`: `TypeTag` / `DynamicValue` for `value[x]` properties
//! - `datatypes`, `resources`: declared shapes
//! - `any`, `registry`: `AnyResource`, the `resourceType` dispatch table and
//!   the `UnknownResource` fallback
//! - `codec`: the structural reader/writer every shape goes through
//! - `visit`: depth-first traversal used by the validator
//!
//! # Wire rules
//!
//! - `resourceType` is written first, then properties in FHIR order
//! - absent values, empty lists and empty objects are never written
//! - primitive metadata goes under `_name`, choice values under `nameType`
//!
//! # Example
//!
//! ```rust
//! use tessera_models::{AnyResource, Patient};
//! use serde_json::json;
//!
//! let input = json!({
//!     "resourceType": "Patient",
//!     "id": "example",
//!     "gender": "female",
//!     "deceasedBoolean": false
//! });
//!
//! let resource = AnyResource::from_json(&input).unwrap();
//! let patient = resource.downcast_ref::<Patient>().unwrap();
//! assert_eq!(patient.gender_str(), Some("female"));
//! assert_eq!(resource.to_json(), input);
//! ```

pub(crate) mod macros;

pub mod any;
pub mod bindings;
pub mod choice;
pub mod codec;
pub mod datatypes;
pub mod element;
pub mod error;
pub mod primitive;
pub mod reference;
pub mod registry;
pub mod resource;
pub mod resources;
pub mod temporal;
pub mod visit;

// Re-export commonly used types
pub use any::{AnyResource, UnknownResource};
pub use choice::{DynamicValue, TypeTag};
pub use codec::{
    decode_element, decode_resource, encode_element, encode_resource, DecodeOptions, Structure,
    UnknownFieldPolicy,
};
pub use datatypes::*;
pub use element::{BackboneElement, Element, Extension};
pub use error::{Error, Result};
pub use primitive::*;
pub use reference::{Reference, ReferenceTarget};
pub use registry::ResourceRegistry;
pub use resource::{DomainResource, Meta, Narrative, Resource};
pub use resources::*;
pub use temporal::{Date, DateTime, Instant, Precision, Time};
pub use visit::{Visit, Visitor};
