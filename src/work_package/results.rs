use serde::{Deserialize, Serialize};

/// What the service should compute and persist once solving finishes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ResultProcessorConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub writer_config: Option<WriterConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stored_results: Option<StoredResultsConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<MetricsResultsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct WriterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_writer_config: Option<WriterOutputConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct WriterOutputConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhanced_metrics_config: Option<EnhancedMetricsConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct EnhancedMetricsConfig {
    #[serde(default)]
    pub populate_enhanced_metrics: bool,
    #[serde(default)]
    pub populate_enhanced_metrics_profile: bool,
    #[serde(default)]
    pub populate_duration_curves: bool,
    #[serde(default)]
    pub populate_constraints: bool,
    #[serde(default)]
    pub populate_weekly_reports: bool,
    #[serde(default)]
    pub calculate_normal_for_load_thermal: bool,
    #[serde(default)]
    pub calculate_emerg_for_load_thermal: bool,
    #[serde(default)]
    pub calculate_normal_for_gen_thermal: bool,
    #[serde(default)]
    pub calculate_emerg_for_gen_thermal: bool,
    #[serde(default)]
    pub calculate_co2: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct StoredResultsConfig {
    #[serde(default)]
    pub energy_meter_voltages_raw: bool,
    #[serde(default)]
    pub energy_meters_raw: bool,
    #[serde(default)]
    pub results_per_meter: bool,
    #[serde(default)]
    pub overloaded_network_raw: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct MetricsResultsConfig {
    #[serde(default)]
    pub calculate_performance_metrics: bool,
}
