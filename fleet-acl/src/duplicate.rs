//! Duplicate and shadowed rule detection inside one ACL block.
//!
//! ## Pairwise findings
//!
//! For every ordered pair `(A, B)` with A earlier in the block, when A's
//! match set contains B's:
//! - same action: `Duplicate`, B is redundant;
//! - different action: `Conflict`, A shadows B and B never takes effect.
//!
//! ## Coverage groups
//!
//! Rules joined by same-action coverage form groups. A rule covered by more
//! than one earlier-or-later rule is attached only to its first coverer, so
//! unrelated wide rules are not chained together through it. In each group
//! the first rule that nothing else in the group covers is kept; every other
//! member is recyclable.

use std::collections::BTreeMap;

use acl_core::{connected_components, covers, matches_superset};
use serde::Serialize;

use crate::blocks::{AclBlock, ParsedDevice};
use crate::finding::{Finding, FindingKind, RuleRef, Severity};

/// Compare every rule of `block` with each later rule of the same block.
///
/// # Arguments
///
/// * `device` - device the block belongs to, used for rule references
/// * `block` - one parsed ACL block
///
/// # Returns
///
/// One finding per ordered pair where the earlier rule matches everything
/// the later one matches: `redundant_rule` for equal actions,
/// `shadowed_rule` otherwise.
pub fn duplicate_findings(device: &ParsedDevice, block: &AclBlock) -> Vec<Finding> {
    let rules = &block.rules;
    let mut out = Vec::new();
    for (i, earlier) in rules.iter().enumerate() {
        for later in &rules[i + 1..] {
            if !matches_superset(earlier, later) {
                continue;
            }
            let a = device.rule_ref(earlier);
            let b = device.rule_ref(later);
            if earlier.action == later.action {
                out.push(Finding::new(
                    Severity::Warning,
                    FindingKind::Duplicate,
                    "redundant_rule",
                    a,
                    Some(b),
                    format!(
                        "{} is redundant: {} already matches everything it matches",
                        later.location, earlier.location
                    ),
                ));
            } else {
                out.push(Finding::new(
                    Severity::Error,
                    FindingKind::Conflict,
                    "shadowed_rule",
                    a,
                    Some(b),
                    format!(
                        "{} never takes effect: earlier {} rule at {} matches all of its traffic",
                        later.location, earlier.action, earlier.location
                    ),
                ));
            }
        }
    }
    out
}

/// One group of rules joined by coverage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverageGroup {
    pub device: String,
    pub acl: Option<String>,
    pub keep: RuleRef,
    pub recycle: Vec<RuleRef>,
}

impl CoverageGroup {
    pub fn total(&self) -> usize {
        1 + self.recycle.len()
    }
}

/// Totals over all coverage groups of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupSummary {
    pub groups: usize,
    pub keep: usize,
    pub recycle: usize,
    pub total_in_groups: usize,
}

impl GroupSummary {
    pub fn from_groups(groups: &[CoverageGroup]) -> Self {
        let recycle: usize = groups.iter().map(|g| g.recycle.len()).sum();
        Self {
            groups: groups.len(),
            keep: groups.len(),
            recycle,
            total_in_groups: groups.len() + recycle,
        }
    }
}

/// Group the rules of `block` that cover one another.
///
/// # Arguments
///
/// * `device` - device the block belongs to
/// * `block` - one parsed ACL block
///
/// # Returns
///
/// Groups of two or more rules, each with one rule to keep and the rules
/// it makes unnecessary. A rule covered by several rules joins the group
/// of its first coverer only.
pub fn coverage_groups(device: &ParsedDevice, block: &AclBlock) -> Vec<CoverageGroup> {
    let rules = &block.rules;
    let mut directed: Vec<(usize, usize)> = Vec::new();
    let mut undirected: Vec<(usize, usize)> = Vec::new();
    for i in 0..rules.len() {
        for j in i + 1..rules.len() {
            let i_covers_j = covers(&rules[i], &rules[j]);
            let j_covers_i = covers(&rules[j], &rules[i]);
            if i_covers_j {
                directed.push((i, j));
            }
            if j_covers_i {
                directed.push((j, i));
            }
            if i_covers_j || j_covers_i {
                undirected.push((i, j));
            }
        }
    }
    if undirected.is_empty() {
        return Vec::new();
    }

    let first_coverer = first_coverer_of_multi_covered(&directed);
    let edges = undirected.into_iter().filter(|&(u, v)| {
        if let Some(&owner) = first_coverer.get(&v) {
            u == owner
        } else if let Some(&owner) = first_coverer.get(&u) {
            v == owner
        } else {
            true
        }
    });

    connected_components(rules.len(), edges)
        .into_iter()
        .filter(|members| members.len() > 1)
        .map(|members| build_group(device, block, &members, &directed))
        .collect()
}

/// For every rule covered by two or more others, the lowest-index coverer.
fn first_coverer_of_multi_covered(directed: &[(usize, usize)]) -> BTreeMap<usize, usize> {
    let mut coverers: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for &(from, to) in directed {
        coverers.entry(to).or_default().push(from);
    }
    coverers
        .into_iter()
        .filter(|(_, from)| from.len() > 1)
        .filter_map(|(to, from)| from.into_iter().min().map(|owner| (to, owner)))
        .collect()
}

fn build_group(
    device: &ParsedDevice,
    block: &AclBlock,
    members: &[usize],
    directed: &[(usize, usize)],
) -> CoverageGroup {
    let covered_inside = |node: usize| {
        directed
            .iter()
            .any(|&(from, to)| to == node && members.contains(&from))
    };
    // members are ascending, so the first hit is the earliest rule
    let keep = members
        .iter()
        .copied()
        .find(|&m| !covered_inside(m))
        .unwrap_or(members[0]);
    let rule_ref = |idx: usize| device.rule_ref(&block.rules[idx]);
    CoverageGroup {
        device: device.device.clone(),
        acl: block.name.clone(),
        keep: rule_ref(keep),
        recycle: members
            .iter()
            .copied()
            .filter(|&m| m != keep)
            .map(rule_ref)
            .collect(),
    }
}

/// All duplicate findings and coverage groups for one device.
///
/// # Arguments
///
/// * `device` - parsed device with its ACL blocks
///
/// # Returns
///
/// The findings of [`duplicate_findings`] and the groups of
/// [`coverage_groups`] over every block, in block order.
pub fn analyze_device(device: &ParsedDevice) -> (Vec<Finding>, Vec<CoverageGroup>) {
    let mut findings = Vec::new();
    let mut groups = Vec::new();
    for block in &device.scan.blocks {
        findings.extend(duplicate_findings(device, block));
        groups.extend(coverage_groups(device, block));
    }
    (findings, groups)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{analyze_device, coverage_groups, duplicate_findings, GroupSummary};
    use crate::blocks::{BlockExtractor, ParsedDevice};
    use crate::config::EngineConfig;
    use crate::finding::FindingKind;
    use crate::input::DeviceColumn;

    fn device(lines: &[&str]) -> ParsedDevice {
        let config = EngineConfig::minimal();
        let column = DeviceColumn {
            device: "dev".to_string(),
            category: None,
            cells: lines.iter().map(|l| l.to_string()).collect(),
        };
        BlockExtractor::new(&config).parse_device(&column, 1)
    }

    #[test]
    fn narrower_later_rule_is_redundant() {
        let dev = device(&[
            "permit tcp 10.0.0.0/8 any eq 80",
            "permit tcp 10.0.1.0/24 any eq 80",
        ]);
        let findings = duplicate_findings(&dev, &dev.scan.blocks[0]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::Duplicate);
        assert_eq!(findings[0].rule_a.location.start_row, 1);
        assert_eq!(
            findings[0].rule_b.as_ref().map(|r| r.location.start_row),
            Some(2)
        );
    }

    #[test]
    fn wider_later_rule_is_not_flagged() {
        let dev = device(&[
            "permit tcp 10.0.1.0/24 any eq 80",
            "permit tcp 10.0.0.0/8 any eq 80",
        ]);
        assert!(duplicate_findings(&dev, &dev.scan.blocks[0]).is_empty());
    }

    #[test]
    fn shadowing_with_other_action_is_conflict() {
        let dev = device(&["permit ip any any", "deny tcp 192.168.1.0/24 any eq 22"]);
        let findings = duplicate_findings(&dev, &dev.scan.blocks[0]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].kind, FindingKind::Conflict);
        assert_eq!(findings[0].code, "shadowed_rule");
    }

    #[test]
    fn groups_keep_widest_rule() {
        let dev = device(&[
            "permit tcp 10.0.1.0/24 any eq 80",
            "permit tcp 10.0.0.0/8 any eq 80",
            "permit tcp 10.0.2.0/24 any eq 80",
            "permit udp 172.16.0.0/12 any eq 53",
        ]);
        let groups = coverage_groups(&dev, &dev.scan.blocks[0]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].keep.location.start_row, 2);
        let recycled: Vec<_> = groups[0]
            .recycle
            .iter()
            .map(|r| r.location.start_row)
            .collect();
        assert_eq!(recycled, vec![1, 3]);
    }

    #[test]
    fn multi_covered_rule_joins_first_coverer_only() {
        // row 3 is covered by rows 1 and 2, which do not cover each other
        let dev = device(&[
            "permit tcp 10.0.0.0/8 10.1.0.0/16 eq 80",
            "permit tcp 10.2.0.0/16 10.0.0.0/8 eq 80",
            "permit tcp 10.2.1.0/24 10.1.1.0/24 eq 80",
        ]);
        let groups = coverage_groups(&dev, &dev.scan.blocks[0]);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].keep.location.start_row, 1);
        assert_eq!(groups[0].total(), 2);
    }

    #[test]
    fn equivalent_rules_keep_the_first() {
        let (findings, groups) = analyze_device(&device(&[
            "permit ip 10.0.0.0/8 any",
            "permit ip 10.0.0.0 0.255.255.255 any",
        ]));
        assert_eq!(findings.len(), 1);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].keep.location.start_row, 1);
        assert_eq!(
            GroupSummary::from_groups(&groups),
            GroupSummary {
                groups: 1,
                keep: 1,
                recycle: 1,
                total_in_groups: 2
            }
        );
    }
}
