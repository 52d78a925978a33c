//! Extends-graph traversal and requirement satisfiability.

use indexmap::IndexSet;

use crate::protocol::Protocol;
use crate::target::TargetType;
use crate::token::MemberKey;

/// Accumulate `selector` output over `protocol` and its whole extends
/// graph, the protocol's own entries first, then each parent subtree in
/// declaration order.
///
/// Protocols reachable along several paths contribute once per path. The
/// order is load-bearing for mixin application, where earlier entries win
/// conflicts.
pub fn collect<T, F>(protocol: &Protocol, selector: &mut F) -> Vec<T>
where
    F: FnMut(&Protocol) -> Vec<T>,
{
    let mut collected = selector(protocol);
    for parent in protocol.extends() {
        collected.extend(collect(parent, selector));
    }
    collected
}

/// Capabilities of `protocol`'s graph that `target` leaves unsatisfied.
///
/// A requirement is satisfied when the target defines the resolved key
/// itself or when any protocol anywhere in the graph provides it as a
/// default. Returns the resolved requirement keys that fail, in graph
/// order, one entry per unsatisfied declaration.
pub fn unimplemented_capabilities(protocol: &Protocol, target: &dyn TargetType) -> Vec<MemberKey> {
    let provided: IndexSet<MemberKey> = collect(protocol, &mut |node| {
        node.provided_entries()
            .map(|(token, _)| MemberKey::from(token))
            .collect()
    })
    .into_iter()
    .collect();
    let static_provided: IndexSet<MemberKey> = collect(protocol, &mut |node| {
        node.static_provided_entries()
            .map(|(token, _)| MemberKey::from(token))
            .collect()
    })
    .into_iter()
    .collect();

    collect(protocol, &mut |node| {
        let mut missing: Vec<MemberKey> = node
            .requirement_keys()
            .filter(|key| !provided.contains(*key) && !target.has_instance_member(key))
            .cloned()
            .collect();
        missing.extend(
            node.static_requirement_keys()
                .filter(|key| !static_provided.contains(*key) && !target.has_static_member(key))
                .cloned(),
        );
        missing
    })
}
