//! ARP and any-address rule review.
//!
//! Every ARP rule is reported. Every rule with `any` as source or
//! destination is reported unless the device, or its category, is on the
//! configured ignore-any list. Coverage relations with other rules play no
//! part.

use crate::blocks::ParsedDevice;
use crate::config::IgnoreAny;
use crate::finding::{Finding, FindingKind, Severity};

/// Flag ARP rules and rules with an any-address side.
///
/// # Arguments
///
/// * `device` - parsed device whose rules are checked
/// * `ignore` - devices and categories exempt from `any_rule` findings
///
/// # Returns
///
/// An `arp_rule` finding per ARP rule and, unless `ignore` applies to the
/// device, an `any_rule` finding per rule matching any address.
pub fn any_rule_findings(device: &ParsedDevice, ignore: &IgnoreAny) -> Vec<Finding> {
    let ignored = ignore.applies(&device.device, device.category);
    let mut out = Vec::new();
    for rule in device.rules() {
        if rule.is_arp() {
            out.push(Finding::new(
                Severity::Warning,
                FindingKind::AnyRuleAnomaly,
                "arp_rule",
                device.rule_ref(rule),
                None,
                format!("ARP rule for {} needs manual review", rule.source),
            ));
            continue;
        }
        if ignored || !rule.has_any_address() {
            continue;
        }
        let side = match (rule.source.is_any(), rule.destination.is_any()) {
            (true, true) => "source and destination",
            (true, false) => "source",
            _ => "destination",
        };
        let mut message = format!("{} rule with any {side} needs manual review", rule.action);
        if rule.has_non_contiguous_mask() {
            message.push_str(" (non-contiguous mask, network is approximate)");
        }
        out.push(Finding::new(
            Severity::Warning,
            FindingKind::AnyRuleAnomaly,
            "any_rule",
            device.rule_ref(rule),
            None,
            message,
        ));
    }
    out
}
