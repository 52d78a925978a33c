//! Target type model: what the engine queries and augments.
//!
//! The engine never creates target types. It works against anything that
//! exposes an instance-member namespace, a static-member namespace, presence
//! queries that reflect the target's own inheritance, and a constructibility
//! tag. [`Class`] is the concrete model shipped with the crate; hosts with
//! their own type representation implement [`TargetType`] instead.

pub mod class;

pub use class::{Class, MemberTable};

use crate::descriptor::MemberDescriptor;
use crate::token::{CapabilityToken, MemberKey};

/// Reserved instance member name: the constructing operation of a type.
/// Protocols may not provide an instance member under it.
pub const CONSTRUCTOR_MEMBER: &str = "constructor";

/// Reserved static member name: the instance-member namespace of a type.
/// Protocols may not provide a static member under it.
pub const PROTOTYPE_MEMBER: &str = "prototype";

/// A type that protocols can be applied to.
///
/// Presence queries must reflect members inherited through whatever
/// inheritance or composition the implementing model supports; the engine
/// never assumes a flat namespace. Defined members always land under token
/// keys and must be visible to subsequent presence queries.
pub trait TargetType {
    /// Name identifying the target in error messages.
    fn type_name(&self) -> &str;

    /// Whether the target can be constructed. Protocol application rejects
    /// targets without this capability.
    fn is_constructible(&self) -> bool;

    /// Whether the instance namespace already defines `key`, inherited
    /// members included.
    fn has_instance_member(&self, key: &MemberKey) -> bool;

    /// Whether the static namespace already defines `key`. Inherited
    /// members count according to the model's own static-inheritance
    /// semantics.
    fn has_static_member(&self, key: &MemberKey) -> bool;

    /// Define a member on the instance namespace under `token`.
    fn define_instance_member(&mut self, token: CapabilityToken, descriptor: MemberDescriptor);

    /// Define a member on the static namespace under `token`.
    fn define_static_member(&mut self, token: CapabilityToken, descriptor: MemberDescriptor);
}
