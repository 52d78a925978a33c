//! Member descriptors for protocol-provided defaults.
//!
//! A descriptor is data: it records what a default member looks like (a
//! plain value or an accessor pair) together with visibility and mutability
//! flags, and is copied onto the target verbatim when a protocol is applied.
//! The engine never invokes callable payloads; they ride along as opaque
//! values compared by identity.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::token::CapabilityToken;

// ---------------------------------------------------------------------------
// MemberValue
// ---------------------------------------------------------------------------

/// An opaque callable payload carried by a member.
///
/// Compared by pointer identity; two separately-built closures are never
/// equal even when behaviorally identical.
pub type MemberFn = Arc<dyn Fn(&[MemberValue]) -> MemberValue + Send + Sync>;

/// The value carried by a provided member.
#[derive(Clone)]
pub enum MemberValue {
    /// Plain JSON data.
    Data(Value),
    /// A capability token, commonly used to surface one protocol's token as
    /// another member's value.
    Token(CapabilityToken),
    /// An opaque callable.
    Function(MemberFn),
}

impl MemberValue {
    /// Build a data value from any serializable payload. Payloads that
    /// cannot be represented as JSON fall back to null.
    pub fn data<T: Serialize>(payload: T) -> Self {
        MemberValue::Data(serde_json::to_value(payload).unwrap_or(Value::Null))
    }

    /// Wrap a callable.
    pub fn function<F>(f: F) -> Self
    where
        F: Fn(&[MemberValue]) -> MemberValue + Send + Sync + 'static,
    {
        MemberValue::Function(Arc::new(f))
    }

    /// The token inside this value, when it is one.
    pub fn as_token(&self) -> Option<&CapabilityToken> {
        match self {
            MemberValue::Token(token) => Some(token),
            _ => None,
        }
    }
}

impl PartialEq for MemberValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (MemberValue::Data(a), MemberValue::Data(b)) => a == b,
            (MemberValue::Token(a), MemberValue::Token(b)) => a == b,
            (MemberValue::Function(a), MemberValue::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Debug for MemberValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MemberValue::Data(value) => f.debug_tuple("Data").field(value).finish(),
            MemberValue::Token(token) => f.debug_tuple("Token").field(token).finish(),
            MemberValue::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<Value> for MemberValue {
    fn from(value: Value) -> Self {
        MemberValue::Data(value)
    }
}

impl From<CapabilityToken> for MemberValue {
    fn from(token: CapabilityToken) -> Self {
        MemberValue::Token(token)
    }
}

impl From<&CapabilityToken> for MemberValue {
    fn from(token: &CapabilityToken) -> Self {
        MemberValue::Token(token.clone())
    }
}

// ---------------------------------------------------------------------------
// MemberDescriptor
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, PartialEq)]
enum DescriptorKind {
    Data {
        value: MemberValue,
        writable: bool,
    },
    Accessor {
        get: Option<MemberValue>,
        set: Option<MemberValue>,
    },
}

/// How a provided member is defined on a target: a data member or an
/// accessor pair, plus flags carried as plain data.
///
/// Completion defaults mirror ordinary descriptor completion: data members
/// are writable unless stated otherwise, and members are non-enumerable and
/// non-configurable unless stated otherwise. Accessor members carry no
/// writability.
#[derive(Clone, Debug, PartialEq)]
pub struct MemberDescriptor {
    kind: DescriptorKind,
    /// Whether the member shows up when the target's namespace is
    /// enumerated.
    pub enumerable: bool,
    /// Whether the member may be redefined after it lands on the target.
    pub configurable: bool,
}

impl MemberDescriptor {
    /// A data member holding `value`.
    pub fn value(value: impl Into<MemberValue>) -> Self {
        Self {
            kind: DescriptorKind::Data {
                value: value.into(),
                writable: true,
            },
            enumerable: false,
            configurable: false,
        }
    }

    /// A data member holding a callable.
    pub fn method<F>(f: F) -> Self
    where
        F: Fn(&[MemberValue]) -> MemberValue + Send + Sync + 'static,
    {
        Self::value(MemberValue::function(f))
    }

    /// A read-only accessor member.
    pub fn getter(get: impl Into<MemberValue>) -> Self {
        Self {
            kind: DescriptorKind::Accessor {
                get: Some(get.into()),
                set: None,
            },
            enumerable: false,
            configurable: false,
        }
    }

    /// A write-only accessor member.
    pub fn setter(set: impl Into<MemberValue>) -> Self {
        Self {
            kind: DescriptorKind::Accessor {
                get: None,
                set: Some(set.into()),
            },
            enumerable: false,
            configurable: false,
        }
    }

    /// An accessor member with both a getter and a setter.
    pub fn accessor(get: impl Into<MemberValue>, set: impl Into<MemberValue>) -> Self {
        Self {
            kind: DescriptorKind::Accessor {
                get: Some(get.into()),
                set: Some(set.into()),
            },
            enumerable: false,
            configurable: false,
        }
    }

    /// Set the writability of a data member. Ignored for accessors.
    pub fn with_writable(mut self, writable: bool) -> Self {
        if let DescriptorKind::Data { writable: w, .. } = &mut self.kind {
            *w = writable;
        }
        self
    }

    /// Set whether the member is enumerable.
    pub fn with_enumerable(mut self, enumerable: bool) -> Self {
        self.enumerable = enumerable;
        self
    }

    /// Set whether the member stays configurable once defined.
    pub fn with_configurable(mut self, configurable: bool) -> Self {
        self.configurable = configurable;
        self
    }

    /// The data value, when this is a data member.
    pub fn data_value(&self) -> Option<&MemberValue> {
        match &self.kind {
            DescriptorKind::Data { value, .. } => Some(value),
            DescriptorKind::Accessor { .. } => None,
        }
    }

    /// The getter, when this is an accessor member with one.
    pub fn get(&self) -> Option<&MemberValue> {
        match &self.kind {
            DescriptorKind::Accessor { get, .. } => get.as_ref(),
            DescriptorKind::Data { .. } => None,
        }
    }

    /// The setter, when this is an accessor member with one.
    pub fn set(&self) -> Option<&MemberValue> {
        match &self.kind {
            DescriptorKind::Accessor { set, .. } => set.as_ref(),
            DescriptorKind::Data { .. } => None,
        }
    }

    /// Writability of a data member; accessors carry none.
    pub fn writable(&self) -> Option<bool> {
        match &self.kind {
            DescriptorKind::Data { writable, .. } => Some(*writable),
            DescriptorKind::Accessor { .. } => None,
        }
    }
}
