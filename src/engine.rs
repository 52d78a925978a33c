//! Process-wide engine installation.
//!
//! A host application may swap in its own [`ProtocolEngine`] before any
//! protocol work happens. The slot is write-once: the first installation
//! wins and stays for the life of the process, and everything that resolves
//! the engine through [`default_implementation`] sees the same instance.

use std::sync::{Arc, OnceLock};

use crate::errors::{DefinitionError, ImplementError};
use crate::protocol::{Protocol, ProtocolConfig};
use crate::target::TargetType;

static PROTOCOL_ENGINE: OnceLock<Arc<dyn ProtocolEngine>> = OnceLock::new();
static NATIVE_ENGINE: OnceLock<Arc<dyn ProtocolEngine>> = OnceLock::new();

// ---------------------------------------------------------------------------
// ProtocolEngine
// ---------------------------------------------------------------------------

/// The two operations a protocol engine supplies: turning configurations
/// into protocols and applying protocols to targets.
pub trait ProtocolEngine: Send + Sync {
    /// Validate `config` and produce a protocol.
    fn define(&self, config: ProtocolConfig) -> Result<Protocol, DefinitionError>;

    /// Apply `protocols` to `target`, in order.
    fn implement(
        &self,
        target: &mut dyn TargetType,
        protocols: &[&Protocol],
    ) -> Result<(), ImplementError>;
}

/// The built-in engine. Delegates straight to [`Protocol`].
#[derive(Debug, Default)]
pub struct NativeEngine;

impl ProtocolEngine for NativeEngine {
    fn define(&self, config: ProtocolConfig) -> Result<Protocol, DefinitionError> {
        Protocol::new(config)
    }

    fn implement(
        &self,
        target: &mut dyn TargetType,
        protocols: &[&Protocol],
    ) -> Result<(), ImplementError> {
        Protocol::implement(target, protocols)
    }
}

fn native_engine() -> Arc<dyn ProtocolEngine> {
    NATIVE_ENGINE.get_or_init(|| Arc::new(NativeEngine)).clone()
}

// ---------------------------------------------------------------------------
// Global slot
// ---------------------------------------------------------------------------

/// The engine to use: the globally installed one when present, the built-in
/// [`NativeEngine`] otherwise.
pub fn default_implementation() -> Arc<dyn ProtocolEngine> {
    PROTOCOL_ENGINE.get().cloned().unwrap_or_else(native_engine)
}

/// Install `engine` into the global slot and return the slot's content.
///
/// Only the first installation takes effect. Later calls leave the slot
/// untouched and hand back whatever engine won.
pub fn install(engine: Arc<dyn ProtocolEngine>) -> Arc<dyn ProtocolEngine> {
    PROTOCOL_ENGINE
        .get_or_init(|| {
            log::debug!("[ProtocolEngine] global engine installed");
            engine
        })
        .clone()
}

/// Fill the global slot with [`default_implementation`]. Idempotent: once a
/// process has an engine, repeated calls return it unchanged.
pub fn install_globally() -> Arc<dyn ProtocolEngine> {
    install(default_implementation())
}
