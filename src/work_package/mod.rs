pub mod calibration;
pub mod generator;
pub mod intervention;
pub mod results;
pub mod syf;

pub use calibration::CalibrationRequest;
pub use generator::{
    FeederScenarioAllocationStrategy, GeneratorConfig, ModelConfig, RawResultsConfig, SolveConfig,
};
pub use intervention::{
    CandidateGenerationConfig, CandidateGenerationType, DvmsConfig, InterventionClass,
    InterventionConfig, PhaseRebalanceProportions, RegulatorConfig, YearRange,
};
pub use results::{
    EnhancedMetricsConfig, MetricsResultsConfig, ResultProcessorConfig, StoredResultsConfig,
    WriterConfig, WriterOutputConfig,
};
pub use syf::{FeederConfig, FeederConfigs, ForecastConfig, LoadOverride, LoadTime, SyfConfig};

use serde::{Deserialize, Serialize};

/// A complete submission for the remote hosting-capacity service: which
/// feeders/years/scenarios to solve, how to generate and solve the model,
/// what results to keep, and an optional intervention layered on a previous
/// work package's results.
///
/// Configuration files stay snake_case; the service's GraphQL schema is
/// camelCase, so serialization renames on the way out.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct WorkPackageConfig {
    #[serde(default)]
    pub name: String,
    pub syf_config: SyfConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generator_config: Option<GeneratorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_processor_config: Option<ResultProcessorConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention: Option<InterventionConfig>,
    #[serde(default)]
    pub quality_assurance_processing: bool,
}

impl WorkPackageConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("work package `name` must be non-empty".to_string());
        }
        self.syf_config.validate()?;
        if let Some(generator) = &self.generator_config {
            generator.validate()?;
        }
        if let Some(intervention) = &self.intervention {
            intervention.validate()?;
        }
        Ok(())
    }

    /// The same submission without its intervention section. The intervention
    /// flow submits this first, then resubmits with the intervention attached
    /// once the base run has finished.
    pub fn without_intervention(&self) -> WorkPackageConfig {
        let mut base = self.clone();
        base.intervention = None;
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_forecast() -> WorkPackageConfig {
        serde_yaml::from_str(
            r#"
name: study-1
syf_config:
  feeders: ["FDR-001"]
  years: [2026]
  scenarios: ["base"]
  load_time:
    start_time: 2024-01-01T00:00:00
    end_time: 2024-12-31T23:30:00
"#,
        )
        .expect("parse work package")
    }

    #[test]
    fn minimal_forecast_package_is_valid() {
        assert!(minimal_forecast().validate().is_ok());
    }

    #[test]
    fn blank_name_is_rejected() {
        let mut config = minimal_forecast();
        config.name = String::new();
        let err = config.validate().expect_err("blank name must fail");
        assert!(err.contains("name"));
    }

    #[test]
    fn without_intervention_strips_only_the_intervention() {
        let mut config = minimal_forecast();
        config.intervention = Some(InterventionConfig {
            base_work_package_id: "wp-1".to_string(),
            year_range: YearRange {
                min_year: 2026,
                max_year: 2030,
            },
            allocation_limit_per_year: 0,
            intervention_type: InterventionClass::TariffReform,
            candidate_generation: None,
            allocation_criteria: Some("load_reshape_strategy_1".to_string()),
            specific_allocation_instance: None,
            phase_rebalance_proportions: None,
            dvms: None,
        });

        let base = config.without_intervention();
        assert!(base.intervention.is_none());
        assert_eq!(base.name, config.name);
        assert!(config.intervention.is_some());
    }
}
