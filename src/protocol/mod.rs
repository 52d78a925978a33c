//! Protocol definitions.
//!
//! A protocol is a named bundle of capabilities split across four disjoint
//! categories: instance requirements, static requirements, instance
//! defaults, and static defaults. Protocols may extend other protocols,
//! forming a composition graph that is resolved as a whole when the protocol
//! is applied to a target type.
//!
//! Construction goes through [`ProtocolConfig`], a consuming builder;
//! [`Protocol::new`] validates the configuration, resolves every declared
//! entry to a capability key, and freezes the result. Protocols are
//! immutable afterwards and safe to share.

pub mod config;
pub mod definition;

pub use config::ProtocolConfig;
pub use definition::Protocol;
