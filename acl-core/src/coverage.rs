//! Rule coverage relations.
//!
//! `covers(A, B)` holds when A matches every packet B matches and both take
//! the same action. It is a non-strict partial order: reflexive and
//! transitive, but not total.

use crate::port::ports_cover;
use crate::rule::{AclRule, Protocol};

/// `ip` covers every protocol except ARP; other protocols only cover
/// themselves.
pub fn protocol_covers(outer: &Protocol, inner: &Protocol) -> bool {
    match (outer, inner) {
        (Protocol::Ip, Protocol::Arp) => false,
        (Protocol::Ip, _) => true,
        (a, b) => a == b,
    }
}

/// Match-set containment ignoring the action.
pub fn matches_superset(a: &AclRule, b: &AclRule) -> bool {
    protocol_covers(&a.protocol, &b.protocol)
        && a.source.contains(&b.source)
        && a.destination.contains(&b.destination)
        && ports_cover(&a.src_ports, &b.src_ports)
        && ports_cover(&a.dst_ports, &b.dst_ports)
}

pub fn covers(a: &AclRule, b: &AclRule) -> bool {
    a.action == b.action && matches_superset(a, b)
}

/// Same action and same match set.
pub fn equivalent(a: &AclRule, b: &AclRule) -> bool {
    covers(a, b) && covers(b, a)
}

/// Both the source and destination networks share addresses.
pub fn addresses_overlap(a: &AclRule, b: &AclRule) -> bool {
    a.source.intersects(&b.source) && a.destination.intersects(&b.destination)
}
