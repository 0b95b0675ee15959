use anyhow::Result;
use clap::Parser;
use fleet_acl::check::Task;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

mod check_cmd;
mod cli;
mod inspect_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let verbose = cli.verbose > 0;

    match cli.command {
        Command::Inspect(args) => inspect_cmd::run_inspect(args),
        Command::Dup(args) => check_cmd::run_task(Task::Duplicate, args, verbose),
        Command::CrossCheck(args) => check_cmd::run_cross_check(args, verbose),
        Command::AnyRules(args) => check_cmd::run_any_rules(Task::AnyRules, args, verbose),
        Command::Check(args) => check_cmd::run_any_rules(Task::Check, args, verbose),
    }
}

/// Logs go to stderr so JSON on stdout stays clean.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
