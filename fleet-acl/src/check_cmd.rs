use anyhow::{bail, Context, Result};
use fleet_acl::arp::ArpTable;
use fleet_acl::check::{build_report_with_arp, Task};
use fleet_acl::config::{load_config, EngineConfig};
use fleet_acl::input::{assign_categories, load_arp_table, load_inputs, DeviceColumn};
use fleet_acl::report::render_report;
use tracing::{info, warn};

use crate::cli::{AnyRulesArgs, CrossCheckArgs, InputArgs, OutputFormat, TaskArgs};

pub fn run_task(task: Task, args: TaskArgs, verbose: bool) -> Result<()> {
    let (config, columns) = load_columns(&args.input)?;
    run_with(task, &args, &config, &columns, None, verbose)
}

/// Any-rule and full check runs, with the optional ARP liveness input.
pub fn run_any_rules(task: Task, args: AnyRulesArgs, verbose: bool) -> Result<()> {
    let (config, columns) = load_columns(&args.task.input)?;
    let arp = match &args.arp {
        Some(path) => Some(
            load_arp_table(path, &config.arp)
                .with_context(|| format!("failed to load ARP table {}", path.display()))?,
        ),
        None => None,
    };
    if arp.is_some() && config.arp.platform_networks.is_empty() {
        warn!("ARP table given but no [arp.platform_networks] configured; nothing will be checked");
    }
    run_with(task, &args.task, &config, &columns, arp.as_ref(), verbose)
}

pub fn run_cross_check(args: CrossCheckArgs, verbose: bool) -> Result<()> {
    let (mut config, columns) = load_columns(&args.task.input)?;
    if !args.pair.is_empty() {
        config.cross_check = args.pair;
    }
    if config.cross_check.is_empty() {
        bail!("cross-check needs at least one category pair (--pair or [[cross_check]] in config)");
    }
    run_with(Task::CrossCheck, &args.task, &config, &columns, None, verbose)
}

fn run_with(
    task: Task,
    args: &TaskArgs,
    config: &EngineConfig,
    columns: &[DeviceColumn],
    arp: Option<&ArpTable>,
    verbose: bool,
) -> Result<()> {
    let report = build_report_with_arp(columns, config, task, arp);
    match args.input.format {
        OutputFormat::Text => println!("{}", render_report(&report, verbose)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if args.strict && !report.findings.is_empty() {
        bail!(
            "{} failed in strict mode: {} findings",
            report.task,
            report.findings.len()
        );
    }
    Ok(())
}

/// Load configuration and device columns, then assign categories.
pub fn load_columns(args: &InputArgs) -> Result<(EngineConfig, Vec<DeviceColumn>)> {
    let config = load_config(args.config.as_deref()).with_context(|| match &args.config {
        Some(path) => format!("failed to load config {}", path.display()),
        None => "failed to load embedded config".to_string(),
    })?;
    let mut columns = load_inputs(&args.inputs).context("failed to load device inputs")?;
    if config.categories.is_empty() && args.category.is_none() {
        warn!("no category rules configured; devices stay uncategorized");
    }
    assign_categories(&mut columns, &config.categories, args.category);
    info!(
        config = %config.source,
        devices = columns.len(),
        "inputs loaded"
    );
    Ok((config, columns))
}
