//! Protocol configuration builder.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::descriptor::MemberDescriptor;
use crate::protocol::definition::Protocol;
use crate::token::MemberKey;

/// Configuration consumed by [`Protocol::new`].
///
/// All fields are optional. Requirement entries may name an existing
/// capability (a token, or a literal name for string-keyed requirements) or
/// leave it open, in which case construction generates a fresh token labeled
/// from the protocol and member names. The display name is kept
/// lazily-stringifiable and is coerced to text at most once, during
/// construction.
#[derive(Default)]
pub struct ProtocolConfig {
    pub(crate) name: Option<Box<dyn fmt::Display + Send + Sync>>,
    pub(crate) extends: Vec<Arc<Protocol>>,
    pub(crate) requires: IndexMap<MemberKey, Option<MemberKey>>,
    pub(crate) static_requires: IndexMap<MemberKey, Option<MemberKey>>,
    pub(crate) provides: IndexMap<MemberKey, MemberDescriptor>,
    pub(crate) static_provides: IndexMap<MemberKey, MemberDescriptor>,
}

impl ProtocolConfig {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the protocol's display name.
    pub fn with_name(mut self, name: impl fmt::Display + Send + Sync + 'static) -> Self {
        self.name = Some(Box::new(name));
        self
    }

    /// Add parent protocols, in declaration order.
    pub fn extends(mut self, parents: impl IntoIterator<Item = Arc<Protocol>>) -> Self {
        self.extends.extend(parents);
        self
    }

    /// Require an instance capability under `key`, generating a token for it
    /// when `key` is a literal name.
    pub fn require(mut self, key: impl Into<MemberKey>) -> Self {
        self.requires.insert(key.into(), None);
        self
    }

    /// Require an instance capability under `key`, resolving it to an
    /// existing `capability` key instead of generating one.
    pub fn require_as(
        mut self,
        key: impl Into<MemberKey>,
        capability: impl Into<MemberKey>,
    ) -> Self {
        self.requires.insert(key.into(), Some(capability.into()));
        self
    }

    /// Require a static capability under `key`, generating a token for it
    /// when `key` is a literal name.
    pub fn static_require(mut self, key: impl Into<MemberKey>) -> Self {
        self.static_requires.insert(key.into(), None);
        self
    }

    /// Require a static capability under `key`, resolving it to an existing
    /// `capability` key instead of generating one.
    pub fn static_require_as(
        mut self,
        key: impl Into<MemberKey>,
        capability: impl Into<MemberKey>,
    ) -> Self {
        self.static_requires
            .insert(key.into(), Some(capability.into()));
        self
    }

    /// Provide a default instance member under `key`.
    pub fn provide(mut self, key: impl Into<MemberKey>, descriptor: MemberDescriptor) -> Self {
        self.provides.insert(key.into(), descriptor);
        self
    }

    /// Provide a default static member under `key`.
    pub fn static_provide(
        mut self,
        key: impl Into<MemberKey>,
        descriptor: MemberDescriptor,
    ) -> Self {
        self.static_provides.insert(key.into(), descriptor);
        self
    }
}

impl fmt::Debug for ProtocolConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The name stays unstringified until construction.
        f.debug_struct("ProtocolConfig")
            .field("name", &self.name.as_ref().map(|_| ".."))
            .field("extends", &self.extends.len())
            .field("requires", &self.requires.keys().collect::<Vec<_>>())
            .field(
                "static_requires",
                &self.static_requires.keys().collect::<Vec<_>>(),
            )
            .field("provides", &self.provides.keys().collect::<Vec<_>>())
            .field(
                "static_provides",
                &self.static_provides.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}
