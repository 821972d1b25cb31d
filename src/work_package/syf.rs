use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Profile lengths accepted for time-period load overrides: the override must
/// cover a single day or a full year at 15/30/60-minute resolution.
const TIME_PERIOD_OVERRIDE_LENGTHS: [usize; 6] = [24, 48, 96, 8760, 17520, 35040];

/// Scenario/year/feeder selection for a work package: either one forecast
/// block applied to every feeder, or per-feeder configuration entries.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum SyfConfig {
    Feeders(FeederConfigs),
    Forecast(ForecastConfig),
}

impl SyfConfig {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Forecast(forecast) => forecast.validate(),
            Self::Feeders(feeders) => feeders.validate(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct ForecastConfig {
    pub feeders: Vec<String>,
    pub years: Vec<i32>,
    pub scenarios: Vec<String>,
    pub load_time: LoadTime,
}

impl ForecastConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.feeders.is_empty() || self.feeders.iter().any(|f| f.trim().is_empty()) {
            return Err("forecast config requires a non-empty feeder list".to_string());
        }
        if self.years.is_empty() {
            return Err("forecast config requires at least one year".to_string());
        }
        if self.scenarios.is_empty() {
            return Err("forecast config requires at least one scenario".to_string());
        }
        self.load_time.validate()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct FeederConfigs {
    pub configs: Vec<FeederConfig>,
}

impl FeederConfigs {
    pub fn validate(&self) -> Result<(), String> {
        if self.configs.is_empty() {
            return Err("feeder configs require at least one entry".to_string());
        }
        for config in &self.configs {
            config.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct FeederConfig {
    pub feeder: String,
    pub years: Vec<i32>,
    pub scenarios: Vec<String>,
    pub load_time: LoadTime,
}

impl FeederConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.feeder.trim().is_empty() {
            return Err("feeder config requires a non-empty feeder id".to_string());
        }
        if self.years.is_empty() {
            return Err(format!("feeder `{}` requires at least one year", self.feeder));
        }
        if self.scenarios.is_empty() {
            return Err(format!(
                "feeder `{}` requires at least one scenario",
                self.feeder
            ));
        }
        self.load_time.validate()
    }
}

/// Which historical load to solve against: a time period or a single fixed
/// timestep, optionally overriding the load profiles of specific connection
/// points.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum LoadTime {
    #[serde(rename_all(serialize = "camelCase"))]
    TimePeriod {
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        load_overrides: BTreeMap<String, LoadOverride>,
    },
    #[serde(rename_all(serialize = "camelCase"))]
    FixedTime {
        time: NaiveDateTime,
        #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
        load_overrides: BTreeMap<String, LoadOverride>,
    },
}

impl LoadTime {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::TimePeriod {
                start_time,
                end_time,
                load_overrides,
            } => {
                if start_time >= end_time {
                    return Err(format!(
                        "load time period start `{start_time}` must be before end `{end_time}`"
                    ));
                }
                for (load_id, overrides) in load_overrides {
                    overrides.validate(load_id)?;
                    if let Some(len) = overrides.profile_len() {
                        if !TIME_PERIOD_OVERRIDE_LENGTHS.contains(&len) {
                            return Err(format!(
                                "load override for `{load_id}` has {len} entries; time period overrides must cover a single day or a year"
                            ));
                        }
                    }
                }
                Ok(())
            }
            Self::FixedTime { load_overrides, .. } => {
                for (load_id, overrides) in load_overrides {
                    overrides.validate(load_id)?;
                }
                Ok(())
            }
        }
    }
}

/// Replacement load/generation profiles for one connection point. All
/// supplied profiles in one override must have the same number of entries.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all(serialize = "camelCase"))]
pub struct LoadOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_watts: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub load_var: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gen_watts: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gen_var: Option<Vec<f64>>,
}

impl LoadOverride {
    fn profiles(&self) -> impl Iterator<Item = &Vec<f64>> {
        [&self.load_watts, &self.load_var, &self.gen_watts, &self.gen_var]
            .into_iter()
            .flatten()
    }

    pub fn profile_len(&self) -> Option<usize> {
        self.profiles().next().map(Vec::len)
    }

    pub fn validate(&self, load_id: &str) -> Result<(), String> {
        let mut lengths = self.profiles().map(Vec::len);
        // An override with no profiles set is a no-op, not an error.
        let Some(first) = lengths.next() else {
            return Ok(());
        };
        if first == 0 {
            return Err(format!(
                "load override profiles for `{load_id}` must be non-empty"
            ));
        }
        if lengths.any(|len| len != first) {
            return Err(format!(
                "load override profiles for `{load_id}` must all have the same number of entries"
            ));
        }
        Ok(())
    }
}
