//! Error types for protocol definition and application.

use thiserror::Error;

/// Errors raised while constructing a protocol.
///
/// Construction fails fast; a protocol is never partially constructed.
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// The same key appears in more than one of the four capability
    /// categories.
    #[error("conflicting protocol entry names: `{name}` is declared more than once")]
    ConflictingEntryNames { name: String },

    /// A provided instance member uses a name reserved for the constructing
    /// operation of a type.
    #[error("illegal instance member named {name:?}")]
    ReservedInstanceMember { name: String },

    /// A provided static member uses a name reserved for the instance-member
    /// namespace of a type.
    #[error("illegal static member named {name:?}")]
    ReservedStaticMember { name: String },
}

/// Errors raised while applying protocols to a target type.
///
/// Application has no rollback: a failure on one protocol leaves members
/// already copied by earlier protocols in the same call in place.
#[derive(Debug, Error)]
pub enum ImplementError {
    /// The target lacks the capability to be constructed.
    #[error("target type `{target}` is not constructible")]
    NotConstructible { target: String },

    /// Required capabilities remain unsatisfied after accounting for
    /// everything the composition graph provides.
    #[error("{} not implemented by `{target}`", .capabilities.join(", "))]
    Unimplemented {
        target: String,
        /// Labels of the unsatisfied capabilities, in traversal order.
        capabilities: Vec<String>,
    },
}
