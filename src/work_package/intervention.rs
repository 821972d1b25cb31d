use serde::{Deserialize, Serialize};

/// An intervention run layered on the results of a previously completed base
/// work package: allocate network remediation measures year by year and
/// re-solve with them in place.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct InterventionConfig {
    pub base_work_package_id: String,
    pub year_range: YearRange,
    pub allocation_limit_per_year: u32,
    pub intervention_type: InterventionClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub candidate_generation: Option<CandidateGenerationConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocation_criteria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_allocation_instance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase_rebalance_proportions: Option<PhaseRebalanceProportions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dvms: Option<DvmsConfig>,
}

impl InterventionConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.base_work_package_id.trim().is_empty() {
            return Err("intervention `base_work_package_id` must be non-empty".to_string());
        }
        self.year_range.validate()?;
        if let Some(candidates) = &self.candidate_generation {
            candidates.validate()?;
        }
        if let Some(proportions) = &self.phase_rebalance_proportions {
            proportions.validate()?;
        }
        if let Some(dvms) = &self.dvms {
            dvms.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterventionClass {
    TariffReform,
    ControlledLoadHotWater,
    CommunityBess,
    DistributionTxOltc,
    LvStatcoms,
    Dvms,
    PhaseRebalancing,
    DistributionTapOptimization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct YearRange {
    pub min_year: i32,
    pub max_year: i32,
}

impl YearRange {
    pub fn validate(&self) -> Result<(), String> {
        if self.min_year > self.max_year {
            return Err(format!(
                "intervention year range min ({}) must not exceed max ({})",
                self.min_year, self.max_year
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CandidateGenerationType {
    Criteria,
    TapOptimization,
}

/// How candidate sites for the intervention are selected from the base run's
/// results.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct CandidateGenerationConfig {
    #[serde(rename = "type")]
    pub generation_type: CandidateGenerationType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intervention_criteria_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_delta_avg_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_under_limit_hours_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voltage_over_limit_hours_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap_weighting_factor_lower_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tap_weighting_factor_upper_threshold: Option<f64>,
}

impl CandidateGenerationConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.generation_type == CandidateGenerationType::Criteria
            && self
                .intervention_criteria_name
                .as_deref()
                .map_or(true, |name| name.trim().is_empty())
        {
            return Err(
                "criteria candidate generation requires `intervention_criteria_name`".to_string(),
            );
        }
        Ok(())
    }
}

/// Dynamic voltage management system tuning for DVMS interventions.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct DvmsConfig {
    pub lower_limit: f64,
    pub upper_limit: f64,
    pub lower_percentile: f64,
    pub upper_percentile: f64,
    pub max_iterations: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulator_config: Option<RegulatorConfig>,
}

impl DvmsConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.lower_limit >= self.upper_limit {
            return Err(format!(
                "DVMS lower limit ({}) must be below upper limit ({})",
                self.lower_limit, self.upper_limit
            ));
        }
        for (name, pct) in [
            ("lower_percentile", self.lower_percentile),
            ("upper_percentile", self.upper_percentile),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(format!("DVMS `{name}` must be within 0..=100, got {pct}"));
            }
        }
        if self.max_iterations == 0 {
            return Err("DVMS `max_iterations` must be > 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct RegulatorConfig {
    pub pu_target: f64,
    pub pu_deadband_percent: f64,
    pub max_tap_change_per_step: u32,
    pub allow_push_to_limit: bool,
}

/// Target share of single-phase load per phase after rebalancing. The shares
/// are relative weights, not percentages.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct PhaseRebalanceProportions {
    pub a: f64,
    pub b: f64,
    pub c: f64,
}

impl PhaseRebalanceProportions {
    pub fn validate(&self) -> Result<(), String> {
        if self.a < 0.0 || self.b < 0.0 || self.c < 0.0 {
            return Err("phase rebalance proportions must be non-negative".to_string());
        }
        if self.a + self.b + self.c <= 0.0 {
            return Err("phase rebalance proportions must sum to a positive value".to_string());
        }
        Ok(())
    }
}
