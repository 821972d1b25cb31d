#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliVerb {
    WorkPackage,
    Calibration,
    Serve,
    Unknown,
}

pub fn parse_cli_verb(input: &str) -> CliVerb {
    match input {
        "work-package" => CliVerb::WorkPackage,
        "calibration" => CliVerb::Calibration,
        "serve" => CliVerb::Serve,
        _ => CliVerb::Unknown,
    }
}

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Commands:".to_string(),
        "  work-package run <kind> [name] [--configuration <file>]".to_string(),
        "                                       Submit a run configuration (kind: forecast, feeder-override, intervention)".to_string(),
        "  work-package cancel <id>             Cancel a running work package".to_string(),
        "  work-package progress [--poll]       Show current progress, optionally polling until ENTER".to_string(),
        "  calibration run [--configuration <file>] [--tx-tap-settings <file>]".to_string(),
        "                                       Submit a network calibration run".to_string(),
        "  calibration show <id>                Show one calibration run".to_string(),
        "  calibration sets                     List available calibration sets".to_string(),
        "  calibration watch <id>               Poll a calibration run until it settles".to_string(),
        "  serve [--bind <addr>]                Run the websocket progress bridge".to_string(),
        String::new(),
        "Options:".to_string(),
        "  --config-dir <dir>                   Directory holding auth_config.json, config.json,".to_string(),
        "                                       and run_configurations/ (default: current directory)".to_string(),
    ]
}

pub(crate) fn help_text() -> String {
    cli_help_lines().join("\n")
}
