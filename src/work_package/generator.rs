use serde::{Deserialize, Serialize};

/// Model generation and solver settings passed through to the remote
/// service. Every knob is optional; unset fields fall back to server-side
/// defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct GeneratorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<ModelConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solve: Option<SolveConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_results: Option<RawResultsConfig>,
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(model) = &self.model {
            model.validate()?;
        }
        if let Some(solve) = &self.solve {
            if let Some(step) = solve.step_size_minutes {
                if step <= 0.0 {
                    return Err("`solve.step_size_minutes` must be > 0".to_string());
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeederScenarioAllocationStrategy {
    Additive,
    Replacement,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmax_pu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vmin_pu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_vmax_pu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_vmin_pu: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_factor_base_exports: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_factor_base_imports: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub p_factor_forecast_pv: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_single_phase_loads: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_single_phase_load: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_load_service_line_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_load_lv_line_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_load_tx_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_gen_tx_ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_overloading_consumers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_undersized_service_lines: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feeder_scenario_allocation_strategy: Option<FeederScenarioAllocationStrategy>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_loop_v_reg_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closed_loop_v_reg_set_point: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplify_network: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_span_level_threshold: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplify_plsi_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emerg_amp_scaling: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_interval_length_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_load_watts: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_gen_watts: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_load_var: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_gen_var: Option<Vec<f64>>,
}

/// Entry counts expected for default profiles per interval length: a daily or
/// yearly profile at the configured resolution.
fn default_profile_lengths(interval_hours: f64) -> Option<(usize, usize)> {
    if (interval_hours - 0.25).abs() < f64::EPSILON {
        Some((96, 35040))
    } else if (interval_hours - 0.5).abs() < f64::EPSILON {
        Some((48, 17520))
    } else if (interval_hours - 1.0).abs() < f64::EPSILON {
        Some((24, 8760))
    } else {
        None
    }
}

impl ModelConfig {
    fn default_profiles(&self) -> impl Iterator<Item = (&'static str, &Vec<f64>)> {
        [
            ("default_load_watts", &self.default_load_watts),
            ("default_gen_watts", &self.default_gen_watts),
            ("default_load_var", &self.default_load_var),
            ("default_gen_var", &self.default_gen_var),
        ]
        .into_iter()
        .filter_map(|(name, profile)| profile.as_ref().map(|p| (name, p)))
    }

    pub fn validate(&self) -> Result<(), String> {
        if let (Some(vmin), Some(vmax)) = (self.vmin_pu, self.vmax_pu) {
            if vmin >= vmax {
                return Err(format!(
                    "`vmin_pu` ({vmin}) must be below `vmax_pu` ({vmax})"
                ));
            }
        }
        if let (Some(vmin), Some(vmax)) = (self.load_vmin_pu, self.load_vmax_pu) {
            if vmin >= vmax {
                return Err(format!(
                    "`load_vmin_pu` ({vmin}) must be below `load_vmax_pu` ({vmax})"
                ));
            }
        }

        let interval = self.load_interval_length_hours.unwrap_or(0.5);
        let Some((daily, yearly)) = default_profile_lengths(interval) else {
            if self.load_interval_length_hours.is_some() {
                return Err(format!(
                    "`load_interval_length_hours` must be one of 0.25, 0.5, 1.0 (got {interval})"
                ));
            }
            return Ok(());
        };
        for (name, profile) in self.default_profiles() {
            if profile.len() != daily && profile.len() != yearly {
                return Err(format!(
                    "`{name}` must have {daily} (daily) or {yearly} (yearly) entries for a {interval}h interval, got {}",
                    profile.len()
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct SolveConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_size_minutes: Option<f64>,
}

/// Which raw solver outputs the service should retain for the run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct RawResultsConfig {
    #[serde(default)]
    pub energy_meter_voltages: bool,
    #[serde(default)]
    pub energy_meters: bool,
    #[serde(default)]
    pub results_per_meter: bool,
    #[serde(default)]
    pub overloaded_network: bool,
    #[serde(default)]
    pub network_summary: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocation_strategy_serializes_screaming_snake() {
        let encoded = serde_json::to_string(&FeederScenarioAllocationStrategy::Additive)
            .expect("encode strategy");
        assert_eq!(encoded, "\"ADDITIVE\"");
    }

    #[test]
    fn default_profile_length_must_match_interval() {
        let model = ModelConfig {
            load_interval_length_hours: Some(1.0),
            default_load_watts: Some(vec![0.0; 24]),
            ..ModelConfig::default()
        };
        assert!(model.validate().is_ok());

        let wrong = ModelConfig {
            load_interval_length_hours: Some(1.0),
            default_load_watts: Some(vec![0.0; 48]),
            ..ModelConfig::default()
        };
        let err = wrong.validate().expect_err("wrong length must fail");
        assert!(err.contains("default_load_watts"));
    }

    #[test]
    fn unknown_interval_length_is_rejected() {
        let model = ModelConfig {
            load_interval_length_hours: Some(0.75),
            ..ModelConfig::default()
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn inverted_voltage_band_is_rejected() {
        let model = ModelConfig {
            vmin_pu: Some(1.2),
            vmax_pu: Some(0.8),
            ..ModelConfig::default()
        };
        assert!(model.validate().is_err());
    }

    #[test]
    fn unset_model_fields_are_omitted_from_payload() {
        let model = ModelConfig {
            seed: Some(123),
            ..ModelConfig::default()
        };
        let value = serde_json::to_value(&model).expect("encode model");
        let object = value.as_object().expect("object");
        assert_eq!(object.len(), 1);
        assert_eq!(object["seed"], 123);
    }
}
