//! Task orchestration and report assembly.
//!
//! Every task parses all device columns first and only then analyses them,
//! so cross-check clustering always sees every participating category.
//! Parse findings from block extraction lead the report, followed by task
//! findings in task order.

use acl_core::ParseMode;
use serde::Serialize;
use tracing::{debug, info};

use crate::any_rules::any_rule_findings;
use crate::arp::{no_arp_findings, ArpTable};
use crate::blocks::{BlockExtractor, ParsedDevice};
use crate::config::{CrossCheckPair, EngineConfig};
use crate::cross_check::cross_check;
use crate::duplicate::{analyze_device, CoverageGroup, GroupSummary};
use crate::finding::{Finding, Severity};
use crate::input::DeviceColumn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Task {
    Duplicate,
    CrossCheck,
    AnyRules,
    /// All three tasks.
    Check,
}

impl Task {
    pub fn name(&self) -> &'static str {
        match self {
            Task::Duplicate => "dup",
            Task::CrossCheck => "cross-check",
            Task::AnyRules => "any-rules",
            Task::Check => "check",
        }
    }

    fn runs_duplicate(&self) -> bool {
        matches!(self, Task::Duplicate | Task::Check)
    }

    fn runs_cross_check(&self) -> bool {
        matches!(self, Task::CrossCheck | Task::Check)
    }

    fn runs_any_rules(&self) -> bool {
        matches!(self, Task::AnyRules | Task::Check)
    }

    /// Any-rule review only needs addresses.
    fn parse_mode(&self) -> ParseMode {
        match self {
            Task::AnyRules => ParseMode::NetworkOnly,
            _ => ParseMode::Full,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub task: String,
    pub config_source: String,
    pub devices: usize,
    pub blocks: usize,
    pub rules: usize,
    pub skipped_blocks: usize,
    pub errors: usize,
    pub warnings: usize,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<GroupSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub coverage_groups: Vec<CoverageGroup>,
    /// Live addresses in the ARP table, when one was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arp_entries: Option<usize>,
}

/// Run block extraction on every column.
///
/// # Arguments
///
/// * `columns` - device columns in input order
/// * `config` - engine configuration (grammar overlays, skip patterns)
/// * `mode` - full parse or addresses only
///
/// # Returns
///
/// One [`ParsedDevice`] per column; column numbers are 1-based in input
/// order.
pub fn parse_devices(
    columns: &[DeviceColumn],
    config: &EngineConfig,
    mode: ParseMode,
) -> Vec<ParsedDevice> {
    let extractor = BlockExtractor::new(config).mode(mode);
    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| extractor.parse_device(column, idx + 1))
        .collect()
}

/// Parse `columns` and run `task` over them.
///
/// # Arguments
///
/// * `columns` - device columns with categories already assigned
/// * `config` - engine configuration
/// * `task` - which analyses to run
///
/// # Returns
///
/// A [`Report`] with parse findings first, then task findings in task
/// order. No ARP liveness check runs.
pub fn build_report(columns: &[DeviceColumn], config: &EngineConfig, task: Task) -> Report {
    build_report_with_arp(columns, config, task, None)
}

/// Like [`build_report`], adding ARP liveness findings to the any-rule
/// task when `arp` is given.
pub fn build_report_with_arp(
    columns: &[DeviceColumn],
    config: &EngineConfig,
    task: Task,
    arp: Option<&ArpTable>,
) -> Report {
    let devices = parse_devices(columns, config, task.parse_mode());
    build_report_for(&devices, config, task, arp)
}

/// Run `task` over already parsed devices.
///
/// # Arguments
///
/// * `devices` - parsed devices, typically from [`parse_devices`]
/// * `config` - engine configuration (cross-check pairs, ignore-any, ARP)
/// * `task` - which analyses to run
/// * `arp` - live ARP table for the liveness check, if any
///
/// # Returns
///
/// The assembled [`Report`] with error and warning counts.
pub fn build_report_for(
    devices: &[ParsedDevice],
    config: &EngineConfig,
    task: Task,
    arp: Option<&ArpTable>,
) -> Report {
    let mut findings: Vec<Finding> = devices
        .iter()
        .flat_map(|d| d.scan.findings.iter().cloned())
        .collect();

    let mut groups = None;
    let mut coverage_groups = Vec::new();
    if task.runs_duplicate() {
        for device in devices {
            let (dup, dev_groups) = analyze_device(device);
            findings.extend(dup);
            coverage_groups.extend(dev_groups);
        }
        groups = Some(GroupSummary::from_groups(&coverage_groups));
    }
    if task.runs_cross_check() {
        for pair in unique_pairs(&config.cross_check) {
            findings.extend(cross_check(devices, pair));
        }
    }
    if task.runs_any_rules() {
        for device in devices {
            findings.extend(any_rule_findings(device, &config.ignore_any));
            if let Some(table) = arp {
                findings.extend(no_arp_findings(device, table, &config.arp));
            }
        }
    }

    let errors = findings
        .iter()
        .filter(|f| f.severity == Severity::Error)
        .count();
    let warnings = findings
        .iter()
        .filter(|f| f.severity == Severity::Warning)
        .count();
    let report = Report {
        task: task.name().to_string(),
        config_source: config.source.clone(),
        devices: devices.len(),
        blocks: devices.iter().map(|d| d.scan.blocks.len()).sum(),
        rules: devices.iter().map(|d| d.rules().count()).sum(),
        skipped_blocks: devices.iter().map(|d| d.scan.skipped).sum(),
        errors,
        warnings,
        findings,
        groups,
        coverage_groups,
        arp_entries: arp.map(ArpTable::len),
    };
    info!(
        task = %report.task,
        devices = report.devices,
        rules = report.rules,
        findings = report.findings.len(),
        "analysis finished"
    );
    report
}

/// Pairs in first-seen order, with repeats and reversed repeats dropped.
fn unique_pairs(pairs: &[CrossCheckPair]) -> Vec<CrossCheckPair> {
    let mut unique: Vec<CrossCheckPair> = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let seen = unique.iter().any(|u| {
            (u.left == pair.left && u.right == pair.right)
                || (u.left == pair.right && u.right == pair.left)
        });
        if seen {
            debug!(left = %pair.left, right = %pair.right, "dropping repeated cross-check pair");
        } else {
            unique.push(*pair);
        }
    }
    unique
}
