use colored::Colorize;

use crate::blocks::ParsedDevice;
use crate::category::CategoryRules;
use crate::check::Report;
use crate::duplicate::CoverageGroup;
use crate::finding::{Finding, Severity};

/// Render a task report for terminal output.
pub fn render_report(report: &Report, verbose: bool) -> String {
    let mut out = Vec::new();
    out.push(format!(
        "{} devices={} blocks={} rules={} skipped_blocks={}",
        report.task, report.devices, report.blocks, report.rules, report.skipped_blocks
    ));
    if verbose {
        out.push(format!("Using config: {}", report.config_source));
    }
    out.push(
        format!(
            "result errors={} warnings={}",
            report.errors, report.warnings
        )
        .cyan()
        .to_string(),
    );

    if let Some(entries) = report.arp_entries {
        out.push(format!("arp live_entries={entries}"));
    }

    if let Some(groups) = report.groups {
        out.push(format!(
            "coverage groups={} keep={} recycle={} total_in_groups={}",
            groups.groups, groups.keep, groups.recycle, groups.total_in_groups
        ));
        if verbose {
            for group in &report.coverage_groups {
                out.extend(render_group(group));
            }
        }
    }

    out.push("findings".to_string());
    if report.findings.is_empty() {
        out.push("- none".to_string());
        return out.join("\n");
    }
    for finding in &report.findings {
        out.extend(render_finding(finding));
    }
    out.join("\n")
}

fn render_finding(finding: &Finding) -> Vec<String> {
    let tag = match finding.severity {
        Severity::Error => "error".red().to_string(),
        Severity::Warning => "warning".yellow().to_string(),
    };
    let mut lines = vec![format!(
        "- [{tag}] {} {}: {}",
        finding.kind, finding.code, finding.message
    )];
    lines.push(format!("    a: {}", finding.rule_a));
    if let Some(rule_b) = &finding.rule_b {
        lines.push(format!("    b: {rule_b}"));
    }
    lines
}

fn render_group(group: &CoverageGroup) -> Vec<String> {
    let mut lines = vec![format!(
        "  group {} {} rules={} keep {}",
        group.device,
        group.acl.as_deref().unwrap_or("-"),
        group.total(),
        group.keep.location
    )
    .green()
    .to_string()];
    for member in &group.recycle {
        lines.push(format!("    recycle {} '{}'", member.location, member.raw));
    }
    lines
}

/// Render parsed blocks and rules per device. Categories carry their
/// configured display name when `categories` has one.
pub fn render_inspect(devices: &[ParsedDevice], categories: &CategoryRules) -> String {
    let mut out = Vec::new();
    for device in devices {
        let category = match device.category {
            None => "uncategorized".to_string(),
            Some(c) => match categories.display_name(c).filter(|n| !n.is_empty()) {
                Some(name) => format!("{c} {name}"),
                None => c.to_string(),
            },
        };
        out.push(
            format!("{} [{category}] col{}", device.device, device.column)
                .bold()
                .to_string(),
        );
        if device.scan.blocks.is_empty() {
            out.push("  no ACL blocks".to_string());
        }
        for block in &device.scan.blocks {
            out.push(format!(
                "  block {} dialect={} rows {}-{} rules={}",
                block.name.as_deref().unwrap_or("(unnamed)"),
                block
                    .dialect
                    .map_or_else(|| "-".to_string(), |d| d.to_string()),
                block.start_row,
                block.end_row,
                block.rules.len()
            ));
            for rule in &block.rules {
                out.push(format!("    row{:<5} {rule}", rule.location.start_row));
                for warning in &rule.warnings {
                    out.push(format!("             ! {warning}").yellow().to_string());
                }
            }
        }
        if device.scan.skipped > 0 {
            out.push(format!("  skipped blocks: {}", device.scan.skipped));
        }
        for finding in &device.scan.findings {
            out.push(format!(
                "  {} {}: {}",
                "parse".red(),
                finding.rule_a.location,
                finding.message
            ));
        }
    }
    out.join("\n")
}
