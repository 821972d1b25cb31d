use super::ConfigError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::hash::Hash;
use std::path::Path;

/// Per-study settings loaded from `config.json` in the config directory.
///
/// Feeders, forecast years, and scenarios are deduplicated on load while
/// preserving first-occurrence order, so repeated entries in hand-edited
/// config files are harmless.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RunSettings {
    pub feeders: Vec<String>,
    pub forecast_years: Vec<i32>,
    pub scenarios: Vec<String>,
    #[serde(default)]
    pub work_package_name: Option<String>,
    #[serde(default)]
    pub load_time: LoadTimeWindows,
    #[serde(default)]
    pub default_load_watts: Option<Vec<f64>>,
    #[serde(default)]
    pub default_gen_watts: Option<Vec<f64>>,
    #[serde(default)]
    pub default_load_var: Option<Vec<f64>>,
    #[serde(default)]
    pub default_gen_var: Option<Vec<f64>>,
}

/// Named historical load windows referenced by run configurations.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LoadTimeWindows {
    #[serde(default)]
    pub start1: Option<NaiveDateTime>,
    #[serde(default)]
    pub end1: Option<NaiveDateTime>,
    #[serde(default)]
    pub start2: Option<NaiveDateTime>,
    #[serde(default)]
    pub end2: Option<NaiveDateTime>,
}

pub(crate) fn dedup_preserving_order<T: Eq + Hash + Clone>(values: &mut Vec<T>) {
    let mut seen = HashSet::new();
    values.retain(|value| seen.insert(value.clone()));
}

impl RunSettings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut settings: RunSettings =
            serde_json::from_str(&raw).map_err(|source| ConfigError::ParseJson {
                path: path.display().to_string(),
                source,
            })?;
        dedup_preserving_order(&mut settings.feeders);
        dedup_preserving_order(&mut settings.forecast_years);
        dedup_preserving_order(&mut settings.scenarios);
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.feeders.iter().any(|f| f.trim().is_empty()) {
            return Err(ConfigError::Settings(
                "`feeders` entries must be non-empty".to_string(),
            ));
        }
        if self.feeders.is_empty() {
            return Err(ConfigError::Settings(
                "`feeders` must be non-empty".to_string(),
            ));
        }
        if self.forecast_years.is_empty() {
            return Err(ConfigError::Settings(
                "`forecast_years` must be non-empty".to_string(),
            ));
        }
        if self.scenarios.is_empty() {
            return Err(ConfigError::Settings(
                "`scenarios` must be non-empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "feeders": ["FDR-001", "FDR-002", "FDR-001"],
        "forecast_years": [2026, 2027, 2026],
        "scenarios": ["base", "high-ev", "base"],
        "work_package_name": "northern-study",
        "load_time": {
            "start1": "2024-01-01T00:00:00",
            "end1": "2024-12-31T23:30:00"
        }
    }"#;

    fn parse(raw: &str) -> RunSettings {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("config.json");
        fs::write(&path, raw).expect("write config");
        RunSettings::from_path(&path).expect("parse settings")
    }

    #[test]
    fn dedup_preserves_first_occurrence_order() {
        let settings = parse(SAMPLE);
        assert_eq!(settings.feeders, vec!["FDR-001", "FDR-002"]);
        assert_eq!(settings.forecast_years, vec![2026, 2027]);
        assert_eq!(settings.scenarios, vec!["base", "high-ev"]);
    }

    #[test]
    fn load_windows_parse_iso_timestamps() {
        let settings = parse(SAMPLE);
        let start = settings.load_time.start1.expect("start1");
        assert_eq!(start.format("%Y-%m-%d %H:%M").to_string(), "2024-01-01 00:00");
        assert!(settings.load_time.start2.is_none());
    }

    #[test]
    fn empty_feeder_list_fails_validation() {
        let settings = parse(
            r#"{"feeders": [], "forecast_years": [2026], "scenarios": ["base"]}"#,
        );
        let err = settings.validate().expect_err("empty feeders must fail");
        assert!(err.to_string().contains("feeders"));
    }
}
