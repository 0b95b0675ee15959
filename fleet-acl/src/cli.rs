use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use fleet_acl::category::DeviceCategory;
use fleet_acl::config::CrossCheckPair;

#[derive(Parser, Debug)]
#[command(name = "fleet-acl")]
#[command(about = "Find duplicate, conflicting and any-address ACL rules across a device fleet")]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Show extracted ACL blocks and parsed rules per device.
    Inspect(InspectArgs),
    /// Report redundant and shadowed rules inside each ACL block.
    Dup(TaskArgs),
    /// Compare rules between two device categories.
    CrossCheck(CrossCheckArgs),
    /// Flag ARP rules, rules matching any address and, given an ARP table,
    /// rules without live hosts.
    AnyRules(AnyRulesArgs),
    /// Run duplicate, cross-check and any-rule analysis in one report.
    Check(AnyRulesArgs),
}

#[derive(clap::Args, Debug, Clone)]
pub struct InputArgs {
    /// Device config files, JSON column files or directories of them.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,
    /// TOML configuration overriding the built-in defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Assign this category to every input device.
    #[arg(long)]
    pub category: Option<DeviceCategory>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Parser, Debug)]
pub struct TaskArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Exit non-zero when any finding is reported.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser, Debug)]
pub struct CrossCheckArgs {
    #[command(flatten)]
    pub task: TaskArgs,
    /// Category pair to compare, e.g. cat1:cat2. Repeatable; replaces the
    /// configured pairs.
    #[arg(long, value_parser = parse_pair)]
    pub pair: Vec<CrossCheckPair>,
}

#[derive(Parser, Debug)]
pub struct AnyRulesArgs {
    #[command(flatten)]
    pub task: TaskArgs,
    /// `show ip arp` dump; flags rules whose platform networks have no live
    /// entry.
    #[arg(long)]
    pub arp: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

fn parse_pair(raw: &str) -> Result<CrossCheckPair, String> {
    let (left, right) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected LEFT:RIGHT, got '{raw}'"))?;
    let left = left.trim().parse::<DeviceCategory>().map_err(|e| e.to_string())?;
    let right = right.trim().parse::<DeviceCategory>().map_err(|e| e.to_string())?;
    Ok(CrossCheckPair { left, right })
}
