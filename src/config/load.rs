use super::{ConfigError, ConnectionConfig, RunSettings};
use crate::work_package::{CalibrationRequest, WorkPackageConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Loads and validates the server connection details from
/// `<config_dir>/auth_config.json`.
pub fn load_connection_config(config_dir: &Path) -> Result<ConnectionConfig, ConfigError> {
    let path = config_dir.join("auth_config.json");
    let config = ConnectionConfig::from_path(&path)?;
    config.validate()?;
    Ok(config)
}

/// Loads and validates the study settings from `<config_dir>/config.json`.
pub fn load_run_settings(config_dir: &Path) -> Result<RunSettings, ConfigError> {
    let path = config_dir.join("config.json");
    let settings = RunSettings::from_path(&path)?;
    settings.validate()?;
    Ok(settings)
}

/// Run configuration templates live under `<config_dir>/run_configurations/`,
/// addressed by a relative name such as `forecast/example.yaml`.
pub fn run_configuration_path(config_dir: &Path, name: &str) -> PathBuf {
    config_dir.join("run_configurations").join(name)
}

/// Loads a work package template. `name_override` always wins; `fallback_name`
/// fills in only when the template itself carries no name (templates are
/// usually name-less and rely on `work_package_name` from `config.json`).
pub fn load_run_configuration(
    path: &Path,
    name_override: Option<&str>,
    fallback_name: Option<&str>,
) -> Result<WorkPackageConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mut config: WorkPackageConfig =
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::ParseYaml {
            path: path.display().to_string(),
            source,
        })?;
    if let Some(name) = name_override {
        config.name = name.to_string();
    } else if config.name.trim().is_empty() {
        if let Some(name) = fallback_name {
            config.name = name.to_string();
        }
    }
    config.validate().map_err(ConfigError::Settings)?;
    Ok(config)
}

pub fn load_calibration_request(path: &Path) -> Result<CalibrationRequest, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let request: CalibrationRequest =
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::ParseYaml {
            path: path.display().to_string(),
            source,
        })?;
    request.validate().map_err(ConfigError::Settings)?;
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_auth_config_reports_the_path() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = load_connection_config(dir.path()).expect_err("missing file must fail");
        assert!(err.to_string().contains("auth_config.json"));
    }

    #[test]
    fn run_configuration_path_joins_name_under_run_configurations() {
        let path = run_configuration_path(Path::new("/tmp/study"), "forecast/example.yaml");
        assert_eq!(
            path,
            Path::new("/tmp/study/run_configurations/forecast/example.yaml")
        );
    }

    #[test]
    fn invalid_run_configuration_is_rejected_on_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("bad.yaml");
        fs::write(
            &path,
            r#"
name: ""
syf_config:
  feeders: ["FDR-001"]
  years: [2026]
  scenarios: ["base"]
  load_time:
    time: 2024-06-01T12:00:00
"#,
        )
        .expect("write config");
        let err =
            load_run_configuration(&path, None, None).expect_err("blank name must fail");
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn run_configuration_name_falls_back_then_yields_to_override() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("run.yaml");
        fs::write(
            &path,
            r#"
syf_config:
  feeders: ["FDR-001"]
  years: [2026]
  scenarios: ["base"]
  load_time:
    time: 2024-06-01T12:00:00
"#,
        )
        .expect("write config");

        let fallback = load_run_configuration(&path, None, Some("northern-study"))
            .expect("fallback name applies");
        assert_eq!(fallback.name, "northern-study");

        let overridden =
            load_run_configuration(&path, Some("one-off"), Some("northern-study"))
                .expect("override wins");
        assert_eq!(overridden.name, "one-off");
    }
}
