//! ARP liveness check.
//!
//! A rule whose networks hold no address with a resolved ARP entry most
//! likely protects hosts that no longer exist. The check only looks at
//! networks inside the device's configured platform networks, and it skips
//! networks whose third octet is on the ignore list unless they also fall
//! in a known-unused range.

use std::collections::BTreeSet;
use std::net::IpAddr;

use acl_core::{AclRule, Network};
use tracing::debug;

use crate::blocks::ParsedDevice;
use crate::config::ArpSettings;
use crate::finding::{Finding, FindingKind, Severity};

/// Addresses with a resolved MAC in an ARP table dump.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArpTable {
    live: BTreeSet<IpAddr>,
}

impl ArpTable {
    /// Parse `show ip arp` style output.
    ///
    /// Each entry is `ADDRESS AGE MAC|INCOMPLETE [INTERFACE]`, optionally
    /// preceded by the IOS `Internet` protocol column. Headers and other
    /// lines that do not start with an address are ignored, as are
    /// `INCOMPLETE` entries and IPv4 addresses whose third octet is listed
    /// in `ignore_third_octet`.
    pub fn parse(text: &str, ignore_third_octet: &BTreeSet<u8>) -> Self {
        let mut live = BTreeSet::new();
        let mut incomplete = 0usize;
        for line in text.lines() {
            let mut tokens = line.split_whitespace().peekable();
            if tokens
                .peek()
                .is_some_and(|t| t.eq_ignore_ascii_case("internet"))
            {
                tokens.next();
            }
            let (Some(addr), Some(_age), Some(state)) =
                (tokens.next(), tokens.next(), tokens.next())
            else {
                continue;
            };
            let Ok(addr) = addr.parse::<IpAddr>() else {
                continue;
            };
            if state.eq_ignore_ascii_case("incomplete") {
                incomplete += 1;
                continue;
            }
            if let IpAddr::V4(v4) = addr {
                if ignore_third_octet.contains(&v4.octets()[2]) {
                    continue;
                }
            }
            live.insert(addr);
        }
        debug!(live = live.len(), incomplete, "parsed ARP table");
        Self { live }
    }

    pub fn len(&self) -> usize {
        self.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }

    /// True when some live address lies inside `network`.
    pub fn has_live_address(&self, network: &Network) -> bool {
        let net = network.net();
        self.live
            .range(net.network()..=net.broadcast())
            .next()
            .is_some()
    }
}

/// Per-side facts the liveness decision is made from.
struct Side {
    any: bool,
    live: bool,
    unused: bool,
    ignored: bool,
    in_platform: bool,
}

impl Side {
    fn of(
        network: &Network,
        table: &ArpTable,
        settings: &ArpSettings,
        platform: &[Network],
    ) -> Self {
        Self {
            any: network.is_any(),
            live: table.has_live_address(network),
            unused: settings.is_unused(network),
            ignored: settings.ignores_octet(network),
            in_platform: platform.iter().any(|p| p.intersects(network)),
        }
    }

    fn stale(&self) -> bool {
        self.in_platform && !self.live
    }
}

fn needs_review(src: &Side, dst: &Side) -> bool {
    if src.ignored || dst.ignored {
        return src.unused || dst.unused;
    }
    match (src.any, dst.any) {
        (true, true) => false,
        (true, false) => dst.stale(),
        (false, true) => src.stale(),
        (false, false) => src.stale() || dst.stale(),
    }
}

/// Flag the rules of `device` whose platform networks have no live ARP
/// entry.
///
/// # Arguments
///
/// * `device` - parsed device whose rules are checked
/// * `table` - live addresses from the ARP table dump
/// * `settings` - platform networks, unused ranges and ignored octets
///
/// # Returns
///
/// One `AnyRuleAnomaly` finding per flagged rule: `unused_range` when
/// either side falls in a known-unused range, `no_arp_match` otherwise.
/// ARP rules are not checked.
pub fn no_arp_findings(
    device: &ParsedDevice,
    table: &ArpTable,
    settings: &ArpSettings,
) -> Vec<Finding> {
    let platform = settings.platform_networks(&device.device);
    if platform.is_empty() {
        debug!(device = %device.device, "no platform networks, skipping ARP liveness");
        return Vec::new();
    }
    device
        .rules()
        .filter(|rule| !rule.is_arp())
        .filter_map(|rule| {
            let src = Side::of(&rule.source, table, settings, platform);
            let dst = Side::of(&rule.destination, table, settings, platform);
            needs_review(&src, &dst).then(|| finding(device, rule, &src, &dst))
        })
        .collect()
}

fn finding(device: &ParsedDevice, rule: &AclRule, src: &Side, dst: &Side) -> Finding {
    let sides = [(&rule.source, src), (&rule.destination, dst)];
    if src.unused || dst.unused {
        let nets: Vec<String> = sides
            .iter()
            .filter(|(_, side)| side.unused)
            .map(|(net, _)| net.to_string())
            .collect();
        return Finding::new(
            Severity::Warning,
            FindingKind::AnyRuleAnomaly,
            "unused_range",
            device.rule_ref(rule),
            None,
            format!("rule references unused range {}", nets.join(", ")),
        );
    }
    let nets: Vec<String> = sides
        .iter()
        .filter(|(_, side)| !side.any && !side.live)
        .map(|(net, _)| net.to_string())
        .collect();
    Finding::new(
        Severity::Warning,
        FindingKind::AnyRuleAnomaly,
        "no_arp_match",
        device.rule_ref(rule),
        None,
        format!("no live ARP entry in {}", nets.join(", ")),
    )
}
