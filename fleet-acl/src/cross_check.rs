//! Conflict detection across device categories.
//!
//! Every rule of every device in the two compared categories is a node.
//! Two rules are joined when both their source and destination networks
//! share addresses. Inside each connected component, every pair drawn from
//! different categories where one rule's match set contains the other's
//! yields one finding: `Conflict` if the actions differ, `Duplicate`
//! otherwise.

use acl_core::{addresses_overlap, connected_components, matches_superset, AclRule};
use tracing::{debug, warn};

use crate::blocks::ParsedDevice;
use crate::category::DeviceCategory;
use crate::config::CrossCheckPair;
use crate::finding::{Finding, FindingKind, Severity};

struct Node<'a> {
    device: &'a ParsedDevice,
    category: DeviceCategory,
    rule: &'a AclRule,
}

/// Compare the rules of the two categories named by `pair`.
///
/// # Arguments
///
/// * `devices` - every parsed device; devices outside the pair are ignored
/// * `pair` - categories to compare, left side first
///
/// # Returns
///
/// One finding per cross-category rule pair with containment in either
/// direction, the left category's rule as `rule_a`. Empty when both sides
/// name the same category.
pub fn cross_check(devices: &[ParsedDevice], pair: CrossCheckPair) -> Vec<Finding> {
    if pair.left == pair.right {
        warn!(category = %pair.left, "cross-check pair names the same category twice, skipping");
        return Vec::new();
    }

    let nodes: Vec<Node<'_>> = devices
        .iter()
        .filter_map(|d| match d.category {
            Some(c) if c == pair.left || c == pair.right => Some((d, c)),
            _ => None,
        })
        .flat_map(|(device, category)| {
            device.rules().map(move |rule| Node {
                device,
                category,
                rule,
            })
        })
        .collect();

    let mut edges = Vec::new();
    for i in 0..nodes.len() {
        for j in i + 1..nodes.len() {
            if addresses_overlap(nodes[i].rule, nodes[j].rule) {
                edges.push((i, j));
            }
        }
    }
    let components = connected_components(nodes.len(), edges);
    debug!(
        left = %pair.left,
        right = %pair.right,
        rules = nodes.len(),
        components = components.len(),
        "cross-check clusters built"
    );

    let mut out = Vec::new();
    for members in components.iter().filter(|m| m.len() > 1) {
        for (pos, &i) in members.iter().enumerate() {
            for &j in &members[pos + 1..] {
                let (a, b) = (&nodes[i], &nodes[j]);
                if a.category == b.category {
                    continue;
                }
                // report the left-category rule first
                let (a, b) = if a.category == pair.left { (a, b) } else { (b, a) };
                if let Some(finding) = compare(a, b) {
                    out.push(finding);
                }
            }
        }
    }
    out
}

fn compare(a: &Node<'_>, b: &Node<'_>) -> Option<Finding> {
    let a_wider = matches_superset(a.rule, b.rule);
    let b_wider = matches_superset(b.rule, a.rule);
    if !a_wider && !b_wider {
        return None;
    }
    let relation = match (a_wider, b_wider) {
        (true, true) => "match the same traffic",
        (true, false) => "left rule contains right rule",
        _ => "right rule contains left rule",
    };
    let rule_a = a.device.rule_ref(a.rule);
    let rule_b = b.device.rule_ref(b.rule);
    let finding = if a.rule.action != b.rule.action {
        Finding::new(
            Severity::Error,
            FindingKind::Conflict,
            "cross_category_conflict",
            rule_a,
            Some(rule_b),
            format!(
                "{} {} ({}) and {} {} ({}) {relation} with opposite actions",
                a.category, a.device.device, a.rule.action, b.category, b.device.device, b.rule.action
            ),
        )
    } else {
        Finding::new(
            Severity::Warning,
            FindingKind::Duplicate,
            "cross_category_duplicate",
            rule_a,
            Some(rule_b),
            format!(
                "{} {} and {} {} {relation} with the same action",
                a.category, a.device.device, b.category, b.device.device
            ),
        )
    };
    Some(finding)
}
