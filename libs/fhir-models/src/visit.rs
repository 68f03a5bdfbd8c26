//! Depth-first traversal over decoded value trees.
//!
//! Each declared shape walks its manifest in order and reports properties to
//! a [`Visitor`]. `enter`/`leave` bracket every visited property so a visitor
//! can track its location; nested elements and resources are handed over
//! through `node`, and the visitor decides whether to descend by calling
//! [`Visit::walk`] on them.

use crate::choice::DynamicValue;
use crate::codec::{Manifest, PropertyDef, WireList, WireValue};
use std::any::Any;

/// An element or resource that can be walked.
pub trait Visit: Any {
    /// FHIR type name of the node.
    fn type_name(&self) -> &'static str;

    fn walk<'a>(&'a self, visitor: &mut dyn Visitor<'a>);

    fn as_any(&self) -> &dyn Any;
}

/// Callbacks invoked while walking a tree. Every method defaults to a no-op.
pub trait Visitor<'a> {
    /// Descend into property `name` (list position `index`).
    fn enter(&mut self, _name: &str, _index: Option<usize>) {}

    fn leave(&mut self) {}

    /// A nested element or resource at the current location.
    fn node(&mut self, _node: &'a dyn Visit) {}

    /// Number of values present for `def`, reported from the owning node.
    fn cardinality(&mut self, _def: &'static PropertyDef, _count: usize) {}

    /// A coded value at the current location whose property has a binding.
    fn code(&mut self, _def: &'static PropertyDef, _code: &'a str) {}

    /// A choice value at the current location.
    fn choice(&mut self, _def: &'static PropertyDef, _value: &'a DynamicValue) {}
}

/// Reports the properties of one node to a visitor, in manifest order.
pub struct Walker<'v, 'a> {
    manifest: &'static Manifest,
    visitor: &'v mut dyn Visitor<'a>,
}

impl<'v, 'a> Walker<'v, 'a> {
    pub fn new(manifest: &'static Manifest, visitor: &'v mut dyn Visitor<'a>) -> Self {
        Self { manifest, visitor }
    }

    pub fn optional<T: WireValue>(&mut self, name: &'static str, value: &'a Option<T>) {
        let Some(def) = self.manifest.property(name) else {
            return;
        };
        self.visitor.cardinality(def, usize::from(value.is_some()));
        if let Some(value) = value {
            value.walk_property(def, None, &mut *self.visitor);
        }
    }

    pub fn required<T: WireValue>(&mut self, name: &'static str, value: &'a Option<T>) {
        self.optional(name, value);
    }

    pub fn list<T: WireList>(&mut self, name: &'static str, values: &'a [T]) {
        let Some(def) = self.manifest.property(name) else {
            return;
        };
        self.visitor.cardinality(def, values.len());
        for (i, value) in values.iter().enumerate() {
            value.walk_property(def, Some(i), &mut *self.visitor);
        }
    }

    pub fn required_list<T: WireList>(&mut self, name: &'static str, values: &'a [T]) {
        self.list(name, values);
    }
}
