use super::progress::{wait_for_work_package, watch_progress, WATCH_INTERVAL};
use crate::app::command_support::{client_for, map_config_err, take_flag};
use crate::client::{ClientError, EasClient};
use crate::config::{load_run_configuration, load_run_settings, run_configuration_path};
use crate::progress::render_progress;
use crate::work_package::WorkPackageConfig;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunKind {
    Forecast,
    FeederOverride,
    Intervention,
}

impl RunKind {
    fn parse(input: &str) -> Option<Self> {
        match input {
            "forecast" => Some(Self::Forecast),
            "feeder-override" => Some(Self::FeederOverride),
            "intervention" => Some(Self::Intervention),
            _ => None,
        }
    }

    fn default_configuration(self) -> &'static str {
        match self {
            Self::Forecast => "forecast/example.yaml",
            Self::FeederOverride => "feeder_override/example.yaml",
            Self::Intervention => "intervention/example.yaml",
        }
    }
}

pub fn cmd_work_package(config_dir: &Path, args: &[String]) -> Result<String, String> {
    match args.first().map(String::as_str) {
        Some("run") => cmd_run(config_dir, &args[1..]),
        Some("cancel") => cmd_cancel(config_dir, &args[1..]),
        Some("progress") => cmd_progress(config_dir, &args[1..]),
        Some(other) => Err(format!("unknown work-package subcommand `{other}`")),
        None => Err("usage: work-package run|cancel|progress ...".to_string()),
    }
}

fn cmd_run(config_dir: &Path, args: &[String]) -> Result<String, String> {
    let mut args = args.to_vec();
    let configuration = take_flag(&mut args, "--configuration")?;
    let kind = match args.first() {
        Some(raw) => RunKind::parse(raw)
            .ok_or_else(|| format!("unknown run kind `{raw}` (expected forecast, feeder-override, or intervention)"))?,
        None => {
            return Err(
                "usage: work-package run <kind> [name] [--configuration <file>]".to_string(),
            )
        }
    };
    let name_override = args.get(1).cloned();
    if args.len() > 2 {
        return Err(format!("unexpected argument `{}`", args[2]));
    }

    let path = match configuration {
        Some(file) => run_configuration_path(config_dir, &file),
        None => run_configuration_path(config_dir, kind.default_configuration()),
    };
    // Templates usually leave the name to config.json's work_package_name.
    let fallback_name = load_run_settings(config_dir)
        .ok()
        .and_then(|settings| settings.work_package_name);
    let config = load_run_configuration(&path, name_override.as_deref(), fallback_name.as_deref())
        .map_err(map_config_err)?;

    let client = client_for(config_dir)?;
    match kind {
        RunKind::Intervention => run_intervention(&client, config),
        RunKind::Forecast | RunKind::FeederOverride => run_and_monitor(&client, &config),
    }
}

fn run_and_monitor(client: &EasClient, config: &WorkPackageConfig) -> Result<String, String> {
    let id = client
        .run_work_package(config)
        .map_err(|err| err.to_string())?;
    println!("Submitted work package `{}` as {id}", config.name);
    wait_for_work_package(client, &id, WATCH_INTERVAL)?;
    Ok(format!("Work package {id} submitted"))
}

/// Intervention runs need a finished base run to draw candidates from. The
/// base configuration is submitted first, and the intervention is attached to
/// its id once it completes.
fn run_intervention(client: &EasClient, mut config: WorkPackageConfig) -> Result<String, String> {
    let Some(mut intervention) = config.intervention.take() else {
        return Err("intervention run configuration is missing an `intervention` section".to_string());
    };

    let base = config.without_intervention();
    let base_id = client
        .run_work_package(&base)
        .map_err(|err| err.to_string())?;
    println!("Submitted base work package `{}` as {base_id}", base.name);

    if !wait_for_work_package(client, &base_id, WATCH_INTERVAL)? {
        return Ok(format!(
            "Base work package {base_id} is still running; rerun once it finishes"
        ));
    }

    intervention.base_work_package_id = base_id.clone();
    config.intervention = Some(intervention);
    let intervention_id = client
        .run_work_package(&config)
        .map_err(|err| err.to_string())?;
    println!("Submitted intervention work package as {intervention_id}");
    wait_for_work_package(client, &intervention_id, WATCH_INTERVAL)?;
    Ok(format!(
        "Intervention work package {intervention_id} submitted on base {base_id}"
    ))
}

fn cmd_cancel(config_dir: &Path, args: &[String]) -> Result<String, String> {
    let Some(work_package_id) = args.first() else {
        return Err("usage: work-package cancel <id>".to_string());
    };
    let client = client_for(config_dir)?;
    match client.cancel_work_package(work_package_id) {
        Ok(response) => Ok(response),
        Err(ClientError::NoSuchWorkPackage) => {
            Ok("No work package running with provided ID".to_string())
        }
        Err(err) => Err(err.to_string()),
    }
}

fn cmd_progress(config_dir: &Path, args: &[String]) -> Result<String, String> {
    let mut args = args.to_vec();
    let poll = if let Some(position) = args.iter().position(|arg| arg == "--poll") {
        args.remove(position);
        true
    } else {
        false
    };
    if let Some(extra) = args.first() {
        return Err(format!("unexpected argument `{extra}`"));
    }

    let client = client_for(config_dir)?;
    if poll {
        watch_progress(&client, WATCH_INTERVAL, |_| false)?;
        Ok("Progress polling stopped".to_string())
    } else {
        let snapshot = client
            .work_packages_progress()
            .map_err(|err| err.to_string())?;
        Ok(render_progress(&snapshot))
    }
}
