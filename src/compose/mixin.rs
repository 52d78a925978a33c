//! Mixin application: copying protocol defaults onto target types.

use indexmap::IndexMap;

use super::resolver;
use crate::descriptor::MemberDescriptor;
use crate::errors::ImplementError;
use crate::protocol::Protocol;
use crate::target::TargetType;
use crate::token::{CapabilityToken, MemberKey};

/// Apply each protocol in `protocols` to `target`, in order.
///
/// Application is sequential. A protocol that fails its requirement check
/// aborts the call; members copied by protocols earlier in the list stay
/// defined.
pub fn implement(
    target: &mut dyn TargetType,
    protocols: &[&Protocol],
) -> Result<(), ImplementError> {
    if !target.is_constructible() {
        return Err(ImplementError::NotConstructible {
            target: target.type_name().to_string(),
        });
    }
    for protocol in protocols {
        mix_into(target, protocol)?;
    }
    Ok(())
}

/// Copy the defaults of `protocol`'s graph onto `target`, instance members
/// first, then statics.
///
/// Members the target already defines, own or inherited, are left alone.
/// When several protocols in the graph provide the same capability, the one
/// closest to the front of the traversal wins.
pub fn mix_into(target: &mut dyn TargetType, protocol: &Protocol) -> Result<(), ImplementError> {
    let missing = resolver::unimplemented_capabilities(protocol, target);
    if !missing.is_empty() {
        log::warn!(
            "[Protocol] `{}` does not satisfy `{}`: missing {}",
            target.type_name(),
            protocol.display_name(),
            missing.len(),
        );
        return Err(ImplementError::Unimplemented {
            target: target.type_name().to_string(),
            capabilities: missing.iter().map(|key| key.to_string()).collect(),
        });
    }

    let instance = fold_batch(resolver::collect(protocol, &mut |node| {
        node.provided_entries()
            .filter(|&(token, _)| !target.has_instance_member(&MemberKey::from(token)))
            .map(|(token, descriptor)| (token.clone(), descriptor.clone()))
            .collect()
    }));
    let statics = fold_batch(resolver::collect(protocol, &mut |node| {
        node.static_provided_entries()
            .filter(|&(token, _)| !target.has_static_member(&MemberKey::from(token)))
            .map(|(token, descriptor)| (token.clone(), descriptor.clone()))
            .collect()
    }));

    log::debug!(
        "[Protocol] mixing `{}` into `{}`: {} instance members, {} static members",
        protocol.display_name(),
        target.type_name(),
        instance.len(),
        statics.len(),
    );
    for (token, descriptor) in instance {
        target.define_instance_member(token, descriptor);
    }
    for (token, descriptor) in statics {
        target.define_static_member(token, descriptor);
    }
    Ok(())
}

/// Reduce collected defaults to one entry per token. Folding from the back
/// lets earlier entries overwrite later ones, so a protocol's own default
/// beats anything deeper in its graph.
fn fold_batch(
    entries: Vec<(CapabilityToken, MemberDescriptor)>,
) -> IndexMap<CapabilityToken, MemberDescriptor> {
    let mut batch = IndexMap::new();
    for (token, descriptor) in entries.into_iter().rev() {
        batch.insert(token, descriptor);
    }
    batch
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::descriptor::MemberValue;
    use crate::protocol::ProtocolConfig;
    use crate::target::Class;
    use crate::token::CapabilityToken;

    fn method() -> MemberDescriptor {
        MemberDescriptor::method(|_| MemberValue::data(()))
    }

    fn value(n: i64) -> MemberDescriptor {
        MemberDescriptor::value(MemberValue::data(n))
    }

    #[test]
    fn test_rejects_non_constructible_targets() {
        let p = Protocol::new(ProtocolConfig::new().with_name("P")).unwrap();
        let mut abstract_class = Class::new("AbstractWidget").with_constructible(false);

        let err = Protocol::implement(&mut abstract_class, &[&p]).err().unwrap();
        assert_eq!(
            err.to_string(),
            "target type `AbstractWidget` is not constructible"
        );
        // The gate applies even to an empty protocol list.
        assert!(Protocol::implement(&mut abstract_class, &[]).is_err());
    }

    #[test]
    fn test_implementing_no_protocols_is_a_no_op() {
        let mut c = Class::new("C");
        Protocol::implement(&mut c, &[]).unwrap();
        assert!(c.prototype().is_empty());
        assert!(c.statics().is_empty());
    }

    #[test]
    fn test_provided_members_materialize_on_the_target() {
        let p = Protocol::new(
            ProtocolConfig::new()
                .with_name("P")
                .provide("a", method())
                .static_provide("s", method()),
        )
        .unwrap();
        let a = p.token("a").unwrap();
        let s = p.token("s").unwrap();

        let mut c = Class::new("C");
        assert!(c.own_instance_member(&a).is_none());
        assert!(c.own_static_member(&s).is_none());

        Protocol::implement(&mut c, &[&p]).unwrap();
        assert!(c.own_instance_member(&a).is_some());
        assert!(c.own_static_member(&s).is_some());
        assert!(p.is_implemented_by(&c));
    }

    #[test]
    fn test_descriptors_are_copied_verbatim() {
        let getter = MemberValue::function(|_| MemberValue::data(1));
        let setter = MemberValue::function(|_| MemberValue::data(2));
        let a = MemberDescriptor::value(MemberValue::data("a")).with_enumerable(true);
        let b = MemberDescriptor::value(MemberValue::data("b"))
            .with_writable(false)
            .with_configurable(true);
        let c = MemberDescriptor::method(|_| MemberValue::data(3));
        let d = MemberDescriptor::getter(getter.clone());
        let e = MemberDescriptor::setter(setter.clone());
        let f = MemberDescriptor::accessor(getter.clone(), setter.clone());

        let p = Protocol::new(
            ProtocolConfig::new()
                .with_name("P")
                .provide("a", a.clone())
                .provide("b", b.clone())
                .provide("c", c.clone())
                .provide("d", d.clone())
                .static_provide("e", e.clone())
                .static_provide("f", f.clone()),
        )
        .unwrap();

        let mut target = Class::new("target");
        Protocol::implement(&mut target, &[&p]).unwrap();

        let own = |key: &str| target.own_instance_member(&p.token(key).unwrap()).cloned();
        assert_eq!(own("a"), Some(a));
        assert_eq!(own("b"), Some(b));
        assert_eq!(own("c"), Some(c));
        assert_eq!(own("d"), Some(d));
        let own_static = |key: &str| target.own_static_member(&p.token(key).unwrap()).cloned();
        assert_eq!(own_static("e"), Some(e));
        assert_eq!(own_static("f"), Some(f));
    }

    #[test]
    fn test_requirements_must_be_present_on_the_target() {
        let p = Protocol::new(ProtocolConfig::new().with_name("P").require("a")).unwrap();

        let mut bare = Class::new("bare");
        assert!(Protocol::implement(&mut bare, &[&p]).is_err());

        let mut conforming =
            Class::new("conforming").with_instance_member(p.token("a").unwrap(), method());
        Protocol::implement(&mut conforming, &[&p]).unwrap();
        assert!(p.is_implemented_by(&conforming));
    }

    #[test]
    fn test_inherited_members_satisfy_requirements() {
        let p = Protocol::new(ProtocolConfig::new().with_name("P").require("a")).unwrap();
        let parent =
            Arc::new(Class::new("parent").with_instance_member(p.token("a").unwrap(), method()));

        let mut child = Class::new("child").with_parent(parent);
        Protocol::implement(&mut child, &[&p]).unwrap();
        assert!(p.is_implemented_by(&child));
    }

    #[test]
    fn test_static_requirements_honor_static_inheritance() {
        let p = Protocol::new(ProtocolConfig::new().with_name("P").static_require("s")).unwrap();
        let parent =
            Arc::new(Class::new("parent").with_static_member(p.token("s").unwrap(), method()));

        let mut inheriting = Class::new("inheriting").with_parent(parent.clone());
        assert!(Protocol::implement(&mut inheriting, &[&p]).is_ok());

        let mut detached = Class::new("detached")
            .with_parent(parent)
            .with_inherit_statics(false);
        assert!(Protocol::implement(&mut detached, &[&p]).is_err());
    }

    #[test]
    fn test_multiple_protocols_apply_in_order() {
        let p = Protocol::new(ProtocolConfig::new().with_name("P").provide("a", value(1))).unwrap();
        let q = Protocol::new(ProtocolConfig::new().with_name("Q").provide("b", value(2))).unwrap();

        let mut c = Class::new("C");
        Protocol::implement(&mut c, &[&p, &q]).unwrap();

        assert_ne!(p.token("a"), q.token("b"));
        assert_eq!(c.prototype().len(), 2);
        assert!(p.is_implemented_by(&c));
        assert!(q.is_implemented_by(&c));

        // Without a shared capability the order does not matter.
        let mut reversed = Class::new("C");
        Protocol::implement(&mut reversed, &[&q, &p]).unwrap();
        let a = p.token("a").unwrap();
        let b = q.token("b").unwrap();
        assert_eq!(reversed.own_instance_member(&a), c.own_instance_member(&a));
        assert_eq!(reversed.own_instance_member(&b), c.own_instance_member(&b));
    }

    #[test]
    fn test_a_failing_protocol_stops_the_rest_of_the_list() {
        let p = Protocol::new(ProtocolConfig::new().with_name("P").provide("a", value(1))).unwrap();
        let q = Protocol::new(ProtocolConfig::new().with_name("Q").require("r")).unwrap();
        let r = Protocol::new(ProtocolConfig::new().with_name("R").provide("b", value(2))).unwrap();

        let mut c = Class::new("C");
        let err = Protocol::implement(&mut c, &[&p, &q, &r]).err().unwrap();
        assert!(err.to_string().contains("Q.r"));

        // P landed before the failure; R never ran.
        assert!(c.own_instance_member(&p.token("a").unwrap()).is_some());
        assert!(c.own_instance_member(&r.token("b").unwrap()).is_none());
    }

    #[test]
    fn test_first_protocol_wins_a_shared_capability() {
        let shared = CapabilityToken::labeled("shared");
        let p =
            Protocol::new(ProtocolConfig::new().with_name("P").provide(&shared, value(1))).unwrap();
        let q =
            Protocol::new(ProtocolConfig::new().with_name("Q").provide(&shared, value(2))).unwrap();
        let key = MemberKey::from(&shared);

        let mut first_p = Class::new("first_p");
        Protocol::implement(&mut first_p, &[&p, &q]).unwrap();
        assert_eq!(first_p.own_instance_member(&key), Some(&value(1)));

        let mut first_q = Class::new("first_q");
        Protocol::implement(&mut first_q, &[&q, &p]).unwrap();
        assert_eq!(first_q.own_instance_member(&key), Some(&value(2)));
    }

    #[test]
    fn test_defaults_flow_down_from_extended_protocols() {
        let base = Arc::new(
            Protocol::new(
                ProtocolConfig::new()
                    .with_name("Base")
                    .provide("a", value(1))
                    .static_provide("s", value(2)),
            )
            .unwrap(),
        );
        let derived = Protocol::new(
            ProtocolConfig::new()
                .with_name("Derived")
                .extends([base.clone()]),
        )
        .unwrap();

        let mut c = Class::new("C");
        Protocol::implement(&mut c, &[&derived]).unwrap();
        assert_eq!(
            c.own_instance_member(&base.token("a").unwrap()),
            Some(&value(1))
        );
        assert_eq!(
            c.own_static_member(&base.token("s").unwrap()),
            Some(&value(2))
        );
    }

    #[test]
    fn test_own_defaults_shadow_ancestor_defaults_for_the_same_capability() {
        let shared = CapabilityToken::labeled("shared");
        let parent = Arc::new(
            Protocol::new(
                ProtocolConfig::new()
                    .with_name("Parent")
                    .provide(&shared, value(1)),
            )
            .unwrap(),
        );
        let child = Protocol::new(
            ProtocolConfig::new()
                .with_name("Child")
                .extends([parent.clone()])
                .provide(&shared, value(2)),
        )
        .unwrap();
        let key = MemberKey::from(&shared);

        // The extending protocol sits nearer than its ancestor, so its
        // descriptor wins the shared capability.
        let mut target = Class::new("target");
        Protocol::implement(&mut target, &[&child]).unwrap();
        assert_eq!(target.own_instance_member(&key), Some(&value(2)));

        // Applied on its own, the ancestor's default still lands.
        let mut plain = Class::new("plain");
        Protocol::implement(&mut plain, &[&parent]).unwrap();
        assert_eq!(plain.own_instance_member(&key), Some(&value(1)));
    }

    #[test]
    fn test_existing_target_members_are_never_replaced() {
        let p = Protocol::new(ProtocolConfig::new().with_name("P").provide("a", value(1))).unwrap();
        let key = p.token("a").unwrap();
        let existing = value(99).with_enumerable(true);

        let mut c = Class::new("C").with_instance_member(key.clone(), existing.clone());
        Protocol::implement(&mut c, &[&p]).unwrap();
        assert_eq!(c.own_instance_member(&key), Some(&existing));
    }

    #[test]
    fn test_same_name_members_do_not_mask_capabilities() {
        let p = Protocol::new(ProtocolConfig::new().with_name("P").provide("a", value(1))).unwrap();

        // A member under the plain name "a" is unrelated to the capability
        // resolved for the protocol's entry "a". Both coexist.
        let mut c = Class::new("C").with_instance_member("a", value(99));
        Protocol::implement(&mut c, &[&p]).unwrap();
        assert_eq!(
            c.own_instance_member(&MemberKey::from("a")),
            Some(&value(99))
        );
        assert_eq!(
            c.own_instance_member(&p.token("a").unwrap()),
            Some(&value(1))
        );
    }

    #[test]
    fn test_diamond_graphs_prefer_the_earlier_branch() {
        let a = Arc::new(Protocol::new(ProtocolConfig::new().with_name("A").require("a")).unwrap());
        let capability = a.token("a").unwrap();
        let b0 = Arc::new(
            Protocol::new(
                ProtocolConfig::new()
                    .with_name("B0")
                    .extends([a.clone()])
                    .provide(capability.clone(), value(10)),
            )
            .unwrap(),
        );
        let b1 = Arc::new(
            Protocol::new(
                ProtocolConfig::new()
                    .with_name("B1")
                    .extends([a.clone()])
                    .provide(capability.clone(), value(20)),
            )
            .unwrap(),
        );

        let c = Protocol::new(
            ProtocolConfig::new()
                .with_name("C")
                .extends([b0.clone(), b1.clone()]),
        )
        .unwrap();
        let mut target = Class::new("left_leaning");
        Protocol::implement(&mut target, &[&c]).unwrap();
        assert_eq!(target.own_instance_member(&capability), Some(&value(10)));

        let flipped = Protocol::new(ProtocolConfig::new().with_name("C").extends([b1, b0])).unwrap();
        let mut target = Class::new("right_leaning");
        Protocol::implement(&mut target, &[&flipped]).unwrap();
        assert_eq!(target.own_instance_member(&capability), Some(&value(20)));
    }

    #[test]
    fn test_minimal_implementations_combine_defaults_and_requirements() {
        let functor =
            Arc::new(Protocol::new(ProtocolConfig::new().with_name("Functor").require("map")).unwrap());
        let map = functor.token("map").unwrap();
        let applicative = Arc::new(
            Protocol::new(
                ProtocolConfig::new()
                    .with_name("Applicative")
                    .extends([functor.clone()])
                    .require("pure")
                    .require("apply")
                    .provide(map.clone(), method()),
            )
            .unwrap(),
        );
        let monad = Arc::new(
            Protocol::new(
                ProtocolConfig::new()
                    .with_name("Monad")
                    .extends([applicative.clone()])
                    .require("bind")
                    .require("join"),
            )
            .unwrap(),
        );
        let bind = monad.token("bind").unwrap();
        let join = monad.token("join").unwrap();
        let monad_via_bind = Protocol::new(
            ProtocolConfig::new()
                .with_name("MonadViaBind")
                .extends([monad.clone()])
                .provide(join.clone(), method()),
        )
        .unwrap();

        // `pure`, `apply` and `bind` are enough: `map` and `join` arrive as
        // defaults from the graph.
        let mut minimal = Class::new("minimal")
            .with_instance_member(applicative.token("pure").unwrap(), method())
            .with_instance_member(applicative.token("apply").unwrap(), method())
            .with_instance_member(bind.clone(), method());
        Protocol::implement(&mut minimal, &[&monad_via_bind]).unwrap();
        assert!(minimal.own_instance_member(&map).is_some());
        assert!(minimal.own_instance_member(&join).is_some());
        assert!(functor.is_implemented_by(&minimal));
        assert!(monad.is_implemented_by(&minimal));

        let mut incomplete = Class::new("incomplete")
            .with_instance_member(applicative.token("pure").unwrap(), method())
            .with_instance_member(applicative.token("apply").unwrap(), method());
        let err = Protocol::implement(&mut incomplete, &[&monad_via_bind])
            .err()
            .unwrap();
        assert!(err.to_string().contains("Monad.bind"));

        // The abstract protocol itself carries no default for `join`, so
        // even the three-member target falls short of it.
        let mut two_of_three = Class::new("two_of_three")
            .with_instance_member(applicative.token("pure").unwrap(), method())
            .with_instance_member(applicative.token("apply").unwrap(), method())
            .with_instance_member(bind.clone(), method());
        let err = Protocol::implement(&mut two_of_three, &[&monad]).err().unwrap();
        assert!(err.to_string().contains("Monad.join"));

        // The complementary direction: `join` given, `bind` defaulted.
        let monad_via_join = Protocol::new(
            ProtocolConfig::new()
                .with_name("MonadViaJoin")
                .extends([monad.clone()])
                .provide(bind.clone(), method()),
        )
        .unwrap();

        let mut join_based = Class::new("join_based")
            .with_instance_member(applicative.token("pure").unwrap(), method())
            .with_instance_member(applicative.token("apply").unwrap(), method())
            .with_instance_member(join.clone(), method());
        Protocol::implement(&mut join_based, &[&monad_via_join]).unwrap();
        assert!(join_based.own_instance_member(&map).is_some());
        assert!(join_based.own_instance_member(&bind).is_some());
        assert!(monad.is_implemented_by(&join_based));

        let mut missing_join = Class::new("missing_join")
            .with_instance_member(applicative.token("pure").unwrap(), method())
            .with_instance_member(applicative.token("apply").unwrap(), method());
        let err = Protocol::implement(&mut missing_join, &[&monad_via_join])
            .err()
            .unwrap();
        assert!(err.to_string().contains("Monad.join"));
    }

    #[test]
    fn test_unimplemented_errors_list_missing_capabilities() {
        let p = Protocol::new(
            ProtocolConfig::new()
                .with_name("P")
                .require("a")
                .static_require("b"),
        )
        .unwrap();

        let mut widget = Class::new("Widget");
        let err = Protocol::implement(&mut widget, &[&p]).err().unwrap();
        assert_eq!(err.to_string(), "P.a, P.b not implemented by `Widget`");
        assert!(widget.prototype().is_empty());
    }
}
