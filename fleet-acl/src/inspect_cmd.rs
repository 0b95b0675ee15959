use acl_core::ParseMode;
use anyhow::Result;
use fleet_acl::check::parse_devices;
use fleet_acl::report::render_inspect;

use crate::check_cmd::load_columns;
use crate::cli::{InspectArgs, OutputFormat};

pub fn run_inspect(args: InspectArgs) -> Result<()> {
    let (config, columns) = load_columns(&args.input)?;
    let devices = parse_devices(&columns, &config, ParseMode::Full);
    match args.input.format {
        OutputFormat::Text => println!("{}", render_inspect(&devices, &config.categories)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&devices)?),
    }
    Ok(())
}
