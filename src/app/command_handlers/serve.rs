use crate::app::command_support::{client_for, take_flag};
use crate::bridge::{server, ProgressMonitor};
use std::path::Path;
use std::sync::Arc;

const DEFAULT_BIND: &str = "127.0.0.1:8700";

pub fn cmd_serve(config_dir: &Path, args: &[String]) -> Result<String, String> {
    let mut args = args.to_vec();
    let bind = take_flag(&mut args, "--bind")?.unwrap_or_else(|| DEFAULT_BIND.to_string());
    if let Some(extra) = args.first() {
        return Err(format!("unexpected argument `{extra}`"));
    }

    let client = client_for(config_dir)?;
    let monitor = Arc::new(ProgressMonitor::new(
        Arc::new(client),
        config_dir.to_path_buf(),
    ));
    server::serve(monitor, &bind).map_err(|err| err.to_string())?;
    Ok("Progress bridge stopped".to_string())
}
