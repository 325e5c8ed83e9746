use crate::errors::{TerritoryError, TerritoryResult, io_err};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// Miles to kilometres, as the territory tooling has always converted.
pub const MILES_TO_KM: f64 = 1.6;

/// Tunables for one clustering run. Passed by reference into every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Neighbourhood radius in miles.
    pub radius_mi: f64,
    /// Stores with fewer in-range neighbours than this never seed a territory.
    pub min_size: usize,
    /// Candidates with more neighbours than this only need `radius_km` of
    /// separation from existing centres instead of `2 * radius_km`.
    pub max_size: usize,
    /// Territory size thresholds for the successive split passes.
    pub split_schedule: Vec<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            radius_mi: 200.0,
            min_size: 80,
            max_size: 150,
            split_schedule: vec![250, 160, 120],
        }
    }
}

impl EngineConfig {
    pub fn radius_km(&self) -> f64 {
        self.radius_mi * MILES_TO_KM
    }

    pub fn validate(&self) -> TerritoryResult<()> {
        if !self.radius_mi.is_finite() || self.radius_mi <= 0.0 {
            return Err(TerritoryError::InvalidConfig(format!(
                "radius_mi must be a positive number, got {}",
                self.radius_mi
            )));
        }

        // every eligible seed lands in the single-radius tier
        if self.min_size > self.max_size {
            warn!(
                "min_size ({}) is larger than max_size ({})",
                self.min_size, self.max_size
            );
        }

        Ok(())
    }

    pub fn from_ron_str(contents: &str, path: &Path) -> TerritoryResult<Self> {
        let config: EngineConfig =
            ron::from_str(contents).map_err(|source| TerritoryError::ConfigParse {
                path: path.to_path_buf(),
                source,
            })?;

        config.validate()?;

        Ok(config)
    }

    pub fn load(path: &Path) -> TerritoryResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| io_err!(path, e))?;
        Self::from_ron_str(&contents, path)
    }
}
