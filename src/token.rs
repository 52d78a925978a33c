//! Capability tokens and member keys.
//!
//! A capability token is an opaque, globally-unique identity under which a
//! capability is required or provided. Tokens optionally carry a
//! human-readable label for diagnostics; equality and hashing consider the
//! identity only, so two tokens with identical labels remain distinct.

use std::fmt;
use std::sync::Arc;

use uuid::Uuid;

// ---------------------------------------------------------------------------
// CapabilityToken
// ---------------------------------------------------------------------------

/// Opaque unique identity used as a member key.
///
/// Tokens are either supplied by the caller (for example to force two
/// protocols to designate the same capability) or generated during protocol
/// construction with a label derived from the protocol and member names.
/// Immutable once created; cloning preserves identity.
#[derive(Clone)]
pub struct CapabilityToken {
    /// Unique identity.
    id: Uuid,
    /// Optional human-readable label, e.g. `"Monad.join"`.
    label: Option<Arc<str>>,
}

impl CapabilityToken {
    /// Create a fresh anonymous token.
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            label: None,
        }
    }

    /// Create a fresh token carrying a human-readable label.
    pub fn labeled(label: impl Into<Arc<str>>) -> Self {
        Self {
            id: Uuid::new_v4(),
            label: Some(label.into()),
        }
    }

    /// The token's label, if it carries one.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl Default for CapabilityToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => f.write_str(label),
            None => write!(f, "#{}", &self.id.simple().to_string()[..8]),
        }
    }
}

impl fmt::Debug for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CapabilityToken({}:{})",
            &self.id.simple().to_string()[..8],
            self.label.as_deref().unwrap_or("")
        )
    }
}

impl PartialEq for CapabilityToken {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
impl Eq for CapabilityToken {}

impl std::hash::Hash for CapabilityToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

// ---------------------------------------------------------------------------
// MemberKey
// ---------------------------------------------------------------------------

/// A key under which a capability is required or provided: an opaque token
/// or a literal member name.
///
/// Literal names support string-keyed requirements, where a protocol demands
/// that a member exist under a plain name rather than under a token.
/// Provided defaults always materialize under token keys.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MemberKey {
    /// An opaque capability token.
    Token(CapabilityToken),
    /// A literal member name.
    Name(String),
}

impl MemberKey {
    /// The token inside this key, when it is one.
    pub fn as_token(&self) -> Option<&CapabilityToken> {
        match self {
            MemberKey::Token(token) => Some(token),
            MemberKey::Name(_) => None,
        }
    }

    /// The literal name inside this key, when it is one.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            MemberKey::Token(_) => None,
            MemberKey::Name(name) => Some(name),
        }
    }
}

impl From<CapabilityToken> for MemberKey {
    fn from(token: CapabilityToken) -> Self {
        MemberKey::Token(token)
    }
}

impl From<&CapabilityToken> for MemberKey {
    fn from(token: &CapabilityToken) -> Self {
        MemberKey::Token(token.clone())
    }
}

impl From<String> for MemberKey {
    fn from(name: String) -> Self {
        MemberKey::Name(name)
    }
}

impl From<&str> for MemberKey {
    fn from(name: &str) -> Self {
        MemberKey::Name(name.to_string())
    }
}

impl From<&MemberKey> for MemberKey {
    fn from(key: &MemberKey) -> Self {
        key.clone()
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberKey::Token(token) => token.fmt(f),
            MemberKey::Name(name) => f.write_str(name),
        }
    }
}
