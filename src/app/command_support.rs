use crate::client::EasClient;
use crate::config::{load_connection_config, ConfigError};
use std::path::PathBuf;

pub fn map_config_err(err: ConfigError) -> String {
    err.to_string()
}

/// Pulls a global `--config-dir <dir>` option out of the argument list,
/// returning the directory (default: current directory) and the remaining
/// arguments.
pub fn extract_config_dir(args: &[String]) -> Result<(PathBuf, Vec<String>), String> {
    let mut config_dir = PathBuf::from(".");
    let mut rest = Vec::with_capacity(args.len());
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if arg == "--config-dir" {
            let value = iter
                .next()
                .ok_or_else(|| "`--config-dir` requires a directory".to_string())?;
            config_dir = PathBuf::from(value);
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((config_dir, rest))
}

/// Pulls `<flag> <value>` out of the argument list if present.
pub fn take_flag(args: &mut Vec<String>, flag: &str) -> Result<Option<String>, String> {
    let Some(position) = args.iter().position(|arg| arg == flag) else {
        return Ok(None);
    };
    if position + 1 >= args.len() {
        return Err(format!("`{flag}` requires a value"));
    }
    let value = args.remove(position + 1);
    args.remove(position);
    Ok(Some(value))
}

pub fn client_for(config_dir: &std::path::Path) -> Result<EasClient, String> {
    let connection = load_connection_config(config_dir).map_err(map_config_err)?;
    Ok(EasClient::new(&connection))
}
