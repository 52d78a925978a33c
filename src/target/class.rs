//! Concrete runtime class model.
//!
//! A [`Class`] carries its own prototype (instance) and static member
//! tables, an optional parent class, and a constructibility flag. Instance
//! lookups always walk the parent chain; static lookups walk it while the
//! static-inheritance consult is enabled, which it is by default.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::descriptor::MemberDescriptor;
use crate::token::{CapabilityToken, MemberKey};

use super::TargetType;

// ---------------------------------------------------------------------------
// MemberTable
// ---------------------------------------------------------------------------

/// Insertion-ordered member table keyed by [`MemberKey`].
#[derive(Clone, Debug, Default)]
pub struct MemberTable {
    members: IndexMap<MemberKey, MemberDescriptor>,
}

impl MemberTable {
    /// An empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Define (or redefine) a member under `key`.
    pub fn define(&mut self, key: impl Into<MemberKey>, descriptor: MemberDescriptor) {
        self.members.insert(key.into(), descriptor);
    }

    /// Whether the table holds a member under `key`.
    pub fn contains(&self, key: &MemberKey) -> bool {
        self.members.contains_key(key)
    }

    /// The descriptor stored under `key`.
    pub fn get(&self, key: &MemberKey) -> Option<&MemberDescriptor> {
        self.members.get(key)
    }

    /// Keys in definition order.
    pub fn keys(&self) -> impl Iterator<Item = &MemberKey> {
        self.members.keys()
    }

    /// Number of members in the table.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Class
// ---------------------------------------------------------------------------

/// A runtime class: named member namespaces with single inheritance.
///
/// Parents are shared immutably; applying a protocol mutates only the class
/// it is applied to, never anything up the chain.
#[derive(Clone, Debug)]
pub struct Class {
    name: String,
    parent: Option<Arc<Class>>,
    constructible: bool,
    /// Whether static presence queries consult the parent chain, mirroring
    /// the instance side.
    inherit_statics: bool,
    prototype: MemberTable,
    statics: MemberTable,
}

impl Class {
    /// A constructible class with empty namespaces and no parent.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            constructible: true,
            inherit_statics: true,
            prototype: MemberTable::new(),
            statics: MemberTable::new(),
        }
    }

    /// Set the parent class.
    pub fn with_parent(mut self, parent: Arc<Class>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Set whether the class can be constructed.
    pub fn with_constructible(mut self, constructible: bool) -> Self {
        self.constructible = constructible;
        self
    }

    /// Set whether static presence queries consult the parent chain.
    pub fn with_inherit_statics(mut self, inherit_statics: bool) -> Self {
        self.inherit_statics = inherit_statics;
        self
    }

    /// Author an instance member under `key`.
    pub fn with_instance_member(
        mut self,
        key: impl Into<MemberKey>,
        descriptor: MemberDescriptor,
    ) -> Self {
        self.prototype.define(key, descriptor);
        self
    }

    /// Author a static member under `key`.
    pub fn with_static_member(
        mut self,
        key: impl Into<MemberKey>,
        descriptor: MemberDescriptor,
    ) -> Self {
        self.statics.define(key, descriptor);
        self
    }

    /// The class's own instance member table.
    pub fn prototype(&self) -> &MemberTable {
        &self.prototype
    }

    /// The class's own static member table.
    pub fn statics(&self) -> &MemberTable {
        &self.statics
    }

    /// The descriptor defined directly on this class's instance namespace.
    pub fn own_instance_member(&self, key: &MemberKey) -> Option<&MemberDescriptor> {
        self.prototype.get(key)
    }

    /// The descriptor defined directly on this class's static namespace.
    pub fn own_static_member(&self, key: &MemberKey) -> Option<&MemberDescriptor> {
        self.statics.get(key)
    }

    /// The instance member under `key`, walking the parent chain.
    pub fn instance_member(&self, key: &MemberKey) -> Option<&MemberDescriptor> {
        match self.prototype.get(key) {
            Some(descriptor) => Some(descriptor),
            None => self
                .parent
                .as_deref()
                .and_then(|parent| parent.instance_member(key)),
        }
    }

    /// The static member under `key`. Walks the parent chain only while the
    /// static-inheritance consult is enabled.
    pub fn static_member(&self, key: &MemberKey) -> Option<&MemberDescriptor> {
        match self.statics.get(key) {
            Some(descriptor) => Some(descriptor),
            None if self.inherit_statics => self
                .parent
                .as_deref()
                .and_then(|parent| parent.static_member(key)),
            None => None,
        }
    }
}

impl TargetType for Class {
    fn type_name(&self) -> &str {
        &self.name
    }

    fn is_constructible(&self) -> bool {
        self.constructible
    }

    fn has_instance_member(&self, key: &MemberKey) -> bool {
        self.instance_member(key).is_some()
    }

    fn has_static_member(&self, key: &MemberKey) -> bool {
        self.static_member(key).is_some()
    }

    fn define_instance_member(&mut self, token: CapabilityToken, descriptor: MemberDescriptor) {
        self.prototype.define(token, descriptor);
    }

    fn define_static_member(&mut self, token: CapabilityToken, descriptor: MemberDescriptor) {
        self.statics.define(token, descriptor);
    }
}
