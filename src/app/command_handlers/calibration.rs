use super::progress::spawn_enter_watcher;
use crate::app::command_support::{client_for, map_config_err, take_flag};
use crate::bridge::sleep_with_stop;
use crate::client::EasClient;
use crate::config::{load_calibration_request, run_configuration_path};
use serde_json::Value;
use std::path::Path;
use std::sync::atomic::Ordering;
use std::time::Duration;

const DEFAULT_CALIBRATION_CONFIGURATION: &str = "calibration/example.yaml";
const CALIBRATION_WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Run states the service reports once a calibration stops moving.
const SETTLED_STATUSES: [&str; 3] = ["COMPLETED", "FAILED", "CANCELLED"];

pub fn cmd_calibration(config_dir: &Path, args: &[String]) -> Result<String, String> {
    match args.first().map(String::as_str) {
        Some("run") => cmd_run(config_dir, &args[1..]),
        Some("show") => cmd_show(config_dir, &args[1..]),
        Some("sets") => cmd_sets(config_dir, &args[1..]),
        Some("watch") => cmd_watch(config_dir, &args[1..]),
        Some(other) => Err(format!("unknown calibration subcommand `{other}`")),
        None => Err("usage: calibration run|show|sets|watch ...".to_string()),
    }
}

fn cmd_run(config_dir: &Path, args: &[String]) -> Result<String, String> {
    let mut args = args.to_vec();
    let configuration = take_flag(&mut args, "--configuration")?;
    let tap_settings = take_flag(&mut args, "--tx-tap-settings")?;
    if let Some(extra) = args.first() {
        return Err(format!("unexpected argument `{extra}`"));
    }

    let path = match configuration {
        Some(name) => run_configuration_path(config_dir, &name),
        None => run_configuration_path(config_dir, DEFAULT_CALIBRATION_CONFIGURATION),
    };
    let mut request = load_calibration_request(&path).map_err(map_config_err)?;

    if let Some(settings_file) = tap_settings {
        let raw = std::fs::read_to_string(&settings_file)
            .map_err(|err| format!("failed to read {settings_file}: {err}"))?;
        let settings: Value = serde_json::from_str(&raw)
            .map_err(|err| format!("failed to parse {settings_file}: {err}"))?;
        request.transformer_tap_settings = Some(settings);
    }

    let client = client_for(config_dir)?;
    let id = client
        .run_calibration(&request)
        .map_err(|err| err.to_string())?;
    println!(
        "Submitted calibration `{}` as {id}",
        request.calibration_name
    );
    watch_calibration(&client, &id)
}

fn cmd_show(config_dir: &Path, args: &[String]) -> Result<String, String> {
    let Some(id) = args.first() else {
        return Err("usage: calibration show <id>".to_string());
    };
    let client = client_for(config_dir)?;
    let run = client.calibration_run(id).map_err(|err| err.to_string())?;
    render_value(&run)
}

fn cmd_sets(config_dir: &Path, args: &[String]) -> Result<String, String> {
    if let Some(extra) = args.first() {
        return Err(format!("unexpected argument `{extra}`"));
    }
    let client = client_for(config_dir)?;
    let sets = client.calibration_sets().map_err(|err| err.to_string())?;
    render_value(&sets)
}

fn cmd_watch(config_dir: &Path, args: &[String]) -> Result<String, String> {
    let Some(id) = args.first() else {
        return Err("usage: calibration watch <id>".to_string());
    };
    let client = client_for(config_dir)?;
    watch_calibration(&client, id)
}

fn watch_calibration(client: &EasClient, id: &str) -> Result<String, String> {
    println!(
        "Polling calibration {id} every {}s; press ENTER to stop.",
        CALIBRATION_WATCH_INTERVAL.as_secs()
    );
    let stop = spawn_enter_watcher();
    loop {
        let run = client.calibration_run(id).map_err(|err| err.to_string())?;
        println!("{}", render_value(&run)?);
        let status = run.get("status").and_then(Value::as_str);
        if let Some(status) = status {
            if SETTLED_STATUSES.contains(&status) {
                return Ok(format!("Calibration {id} finished with status {status}"));
            }
        }
        sleep_with_stop(CALIBRATION_WATCH_INTERVAL, &stop);
        if stop.load(Ordering::SeqCst) {
            return Ok(format!("Stopped watching calibration {id}"));
        }
    }
}

fn render_value(value: &Value) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|err| err.to_string())
}
