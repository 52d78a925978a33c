//! # Protocols
//!
//! First-class protocols for Rust object models: named, composable bundles
//! of required and provided capabilities.
//!
//! A protocol declares the members a conforming type must define and the
//! default members it gains in return, at both the instance and the static
//! level. Protocols extend other protocols, forming graphs that may share
//! ancestors, and every declared entry resolves to a collision-free
//! capability token at definition time. Applying a protocol to a target
//! type checks the whole graph's requirements, then copies the missing
//! defaults onto the target without ever replacing what the target already
//! defines.

pub mod descriptor;
pub mod engine;
pub mod errors;
pub mod protocol;
pub mod target;
pub mod token;

mod compose;

// Core surface
pub use descriptor::{MemberDescriptor, MemberFn, MemberValue};
pub use errors::{DefinitionError, ImplementError};
pub use protocol::{Protocol, ProtocolConfig};
pub use token::{CapabilityToken, MemberKey};

// Target-type plumbing
pub use target::{Class, MemberTable, TargetType, CONSTRUCTOR_MEMBER, PROTOTYPE_MEMBER};

// Engine installation
pub use engine::{
    default_implementation, install, install_globally, NativeEngine, ProtocolEngine,
};

/// Library version
pub const VERSION: &str = "0.1.0";
