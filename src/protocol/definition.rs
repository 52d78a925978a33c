//! Protocol definition and construction-time capability resolution.

use std::fmt;
use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};

use crate::compose;
use crate::descriptor::{MemberDescriptor, MemberValue};
use crate::errors::{DefinitionError, ImplementError};
use crate::protocol::config::ProtocolConfig;
use crate::target::{TargetType, CONSTRUCTOR_MEMBER, PROTOTYPE_MEMBER};
use crate::token::{CapabilityToken, MemberKey};

// ---------------------------------------------------------------------------
// Protocol
// ---------------------------------------------------------------------------

/// A named bundle of required and provided capabilities.
///
/// Requirements state what a conforming target must already define; defaults
/// state what the protocol defines on the target's behalf when applied. Both
/// exist separately at the instance and the static level, and both resolve
/// to capability keys at construction time. Every resolved key is exposed
/// through [`Protocol::token`], addressable by the key it was declared
/// under.
///
/// Protocols are immutable once constructed. Generated tokens are stable for
/// the lifetime of the instance.
pub struct Protocol {
    name: Option<String>,
    extends: Vec<Arc<Protocol>>,
    /// Declared key to resolved requirement key.
    requires: IndexMap<MemberKey, MemberKey>,
    static_requires: IndexMap<MemberKey, MemberKey>,
    /// Declared key to the token the default lands under, plus the default
    /// itself.
    provides: IndexMap<MemberKey, (CapabilityToken, MemberDescriptor)>,
    static_provides: IndexMap<MemberKey, (CapabilityToken, MemberDescriptor)>,
    /// Declared key to resolved key, across all four categories.
    attributes: IndexMap<MemberKey, MemberKey>,
}

impl Protocol {
    /// Validate `config` and construct the protocol.
    ///
    /// The four category key-sets must be pairwise disjoint, provided
    /// instance members may not use [`CONSTRUCTOR_MEMBER`], and provided
    /// static members may not use [`PROTOTYPE_MEMBER`]. The display name is
    /// stringified exactly once, regardless of how many members are
    /// declared.
    pub fn new(config: ProtocolConfig) -> Result<Self, DefinitionError> {
        let ProtocolConfig {
            name,
            extends,
            requires,
            static_requires,
            provides,
            static_provides,
        } = config;

        let mut seen: IndexSet<&MemberKey> = IndexSet::new();
        for key in requires
            .keys()
            .chain(static_requires.keys())
            .chain(provides.keys())
            .chain(static_provides.keys())
        {
            if !seen.insert(key) {
                return Err(DefinitionError::ConflictingEntryNames {
                    name: key.to_string(),
                });
            }
        }

        if provides
            .keys()
            .any(|key| key.as_name() == Some(CONSTRUCTOR_MEMBER))
        {
            return Err(DefinitionError::ReservedInstanceMember {
                name: CONSTRUCTOR_MEMBER.to_string(),
            });
        }
        if static_provides
            .keys()
            .any(|key| key.as_name() == Some(PROTOTYPE_MEMBER))
        {
            return Err(DefinitionError::ReservedStaticMember {
                name: PROTOTYPE_MEMBER.to_string(),
            });
        }

        let name = name.map(|name| name.to_string());

        let mut attributes = IndexMap::new();
        let requires = resolve_requirements(name.as_deref(), requires, &mut attributes);
        let static_requires =
            resolve_requirements(name.as_deref(), static_requires, &mut attributes);
        let provides = resolve_defaults(name.as_deref(), provides, &mut attributes);
        let static_provides = resolve_defaults(name.as_deref(), static_provides, &mut attributes);

        let protocol = Self {
            name,
            extends,
            requires,
            static_requires,
            provides,
            static_provides,
            attributes,
        };
        log::debug!(
            "[Protocol] defined `{}`: {} requires, {} static requires, {} provides, {} static provides, extends {}",
            protocol.display_name(),
            protocol.requires.len(),
            protocol.static_requires.len(),
            protocol.provides.len(),
            protocol.static_provides.len(),
            protocol.extends.len(),
        );
        Ok(protocol)
    }

    /// The protocol's display name, if one was configured.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Parent protocols, in declaration order.
    pub fn extends(&self) -> &[Arc<Protocol>] {
        &self.extends
    }

    /// The resolved capability key declared under `key`.
    ///
    /// Returns the generated or reused token for provided members and
    /// open requirements, the literal name for string-keyed requirements,
    /// and the token itself when a token was the declared key. Repeated
    /// access returns identical keys.
    pub fn token(&self, key: impl Into<MemberKey>) -> Option<MemberKey> {
        self.attributes.get(&key.into()).cloned()
    }

    /// Apply `protocols` to `target`, in order.
    ///
    /// The target must be constructible. Each protocol's requirements are
    /// checked against the target and the protocol's whole extends graph
    /// before any of its defaults are copied; a failure stops that protocol
    /// and the rest of the list, while defaults copied by earlier protocols
    /// in the same call remain in place.
    pub fn implement(
        target: &mut dyn TargetType,
        protocols: &[&Protocol],
    ) -> Result<(), ImplementError> {
        compose::mixin::implement(target, protocols)
    }

    /// Whether `target` already defines every capability this protocol
    /// itself declares: resolved requirements and provided tokens, at both
    /// levels, inherited members included.
    ///
    /// Parent protocols are not consulted; probe each one directly.
    pub fn is_implemented_by(&self, target: &dyn TargetType) -> bool {
        self.requires
            .values()
            .all(|key| target.has_instance_member(key))
            && self
                .provides
                .values()
                .all(|(token, _)| target.has_instance_member(&MemberKey::from(token)))
            && self
                .static_requires
                .values()
                .all(|key| target.has_static_member(key))
            && self
                .static_provides
                .values()
                .all(|(token, _)| target.has_static_member(&MemberKey::from(token)))
    }

    pub(crate) fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }

    pub(crate) fn requirement_keys(&self) -> impl Iterator<Item = &MemberKey> {
        self.requires.values()
    }

    pub(crate) fn static_requirement_keys(&self) -> impl Iterator<Item = &MemberKey> {
        self.static_requires.values()
    }

    pub(crate) fn provided_entries(
        &self,
    ) -> impl Iterator<Item = (&CapabilityToken, &MemberDescriptor)> {
        self.provides
            .values()
            .map(|(token, descriptor)| (token, descriptor))
    }

    pub(crate) fn static_provided_entries(
        &self,
    ) -> impl Iterator<Item = (&CapabilityToken, &MemberDescriptor)> {
        self.static_provides
            .values()
            .map(|(token, descriptor)| (token, descriptor))
    }
}

impl fmt::Debug for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Protocol")
            .field("name", &self.name)
            .field("extends", &self.extends.len())
            .field("requires", &self.requires.len())
            .field("static_requires", &self.static_requires.len())
            .field("provides", &self.provides.len())
            .field("static_provides", &self.static_provides.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Capability resolution
// ---------------------------------------------------------------------------

/// Generate a token for the member `name`, labeled
/// `"<protocol name.>member name"`. Tokens generated for accessor-only
/// defaults carry a `"get "` or `"set "` marker.
fn generate_token(
    protocol_name: Option<&str>,
    member: &str,
    descriptor: Option<&MemberDescriptor>,
) -> CapabilityToken {
    let qualified = match protocol_name {
        Some(protocol) => format!("{protocol}.{member}"),
        None => member.to_string(),
    };
    let label = match descriptor {
        Some(descriptor) if descriptor.get().is_some() && descriptor.set().is_none() => {
            format!("get {qualified}")
        }
        Some(descriptor) if descriptor.get().is_none() && descriptor.set().is_some() => {
            format!("set {qualified}")
        }
        _ => qualified,
    };
    CapabilityToken::labeled(label)
}

fn resolve_requirements(
    protocol_name: Option<&str>,
    declared: IndexMap<MemberKey, Option<MemberKey>>,
    attributes: &mut IndexMap<MemberKey, MemberKey>,
) -> IndexMap<MemberKey, MemberKey> {
    declared
        .into_iter()
        .map(|(key, requirement)| {
            let resolved = match requirement {
                Some(existing) => existing,
                // A token key already is the capability; a name key gets a
                // fresh token labeled after it.
                None => match &key {
                    MemberKey::Token(token) => MemberKey::from(token),
                    MemberKey::Name(member) => {
                        MemberKey::from(generate_token(protocol_name, member, None))
                    }
                },
            };
            attributes.insert(key.clone(), resolved.clone());
            (key, resolved)
        })
        .collect()
}

fn resolve_defaults(
    protocol_name: Option<&str>,
    declared: IndexMap<MemberKey, MemberDescriptor>,
    attributes: &mut IndexMap<MemberKey, MemberKey>,
) -> IndexMap<MemberKey, (CapabilityToken, MemberDescriptor)> {
    declared
        .into_iter()
        .map(|(key, descriptor)| {
            let token = match &key {
                MemberKey::Token(token) => token.clone(),
                MemberKey::Name(member) => match descriptor.data_value() {
                    // A token-valued default designates that token as the
                    // capability instead of generating a new one.
                    Some(MemberValue::Token(token)) => token.clone(),
                    _ => generate_token(protocol_name, member, Some(&descriptor)),
                },
            };
            attributes.insert(key.clone(), MemberKey::from(&token));
            (key, (token, descriptor))
        })
        .collect()
}
