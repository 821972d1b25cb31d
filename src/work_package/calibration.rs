use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A request to calibrate network models against measured data at one local
/// timestamp.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct CalibrationRequest {
    pub calibration_name: String,
    pub calibration_time_local: String,
    pub feeders: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformer_tap_settings: Option<Value>,
}

impl CalibrationRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.calibration_name.trim().is_empty() {
            return Err("`calibration_name` must be non-empty".to_string());
        }
        if self.calibration_time_local.trim().is_empty() {
            return Err("`calibration_time_local` must be non-empty".to_string());
        }
        if self.feeders.is_empty() || self.feeders.iter().any(|f| f.trim().is_empty()) {
            return Err("calibration requires a non-empty feeder list".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml_request_with_tap_settings() {
        let parsed: CalibrationRequest = serde_yaml::from_str(
            r#"
calibration_name: winter-peak
calibration_time_local: 2024-07-15T18:00:00
feeders: ["FDR-001", "FDR-002"]
transformer_tap_settings:
  TX-1: 3
"#,
        )
        .expect("parse calibration request");
        assert_eq!(parsed.calibration_name, "winter-peak");
        assert!(parsed.transformer_tap_settings.is_some());
        assert!(parsed.validate().is_ok());
    }

    #[test]
    fn empty_feeder_list_is_rejected() {
        let request = CalibrationRequest {
            calibration_name: "winter-peak".to_string(),
            calibration_time_local: "2024-07-15T18:00:00".to_string(),
            feeders: vec![],
            transformer_tap_settings: None,
        };
        let err = request.validate().expect_err("must fail");
        assert!(err.contains("feeder"));
    }
}
