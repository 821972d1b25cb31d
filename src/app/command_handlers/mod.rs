use crate::app::cli::{help_text, parse_cli_verb, CliVerb};
use crate::app::command_support::extract_config_dir;

pub mod calibration;
pub mod progress;
pub mod serve;
pub mod work_package;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let (config_dir, args) = extract_config_dir(&args)?;
    if args.is_empty() {
        return Ok(help_text());
    }

    match parse_cli_verb(args[0].as_str()) {
        CliVerb::WorkPackage => work_package::cmd_work_package(&config_dir, &args[1..]),
        CliVerb::Calibration => calibration::cmd_calibration(&config_dir, &args[1..]),
        CliVerb::Serve => serve::cmd_serve(&config_dir, &args[1..]),
        CliVerb::Unknown => Err(format!("unknown command `{}`", args[0])),
    }
}
