use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{AnalysisError, Result};

/// Thresholds shared by the four analyses. Every field falls back to its default when absent
/// from the TOML file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Highest championship position kept in the fastest-lap consistency analysis.
    pub max_standing_position: i64,
    /// Finishing positions at or below this count as a podium.
    pub podium_cutoff: i64,
    /// Qualifying position that counts as pole.
    pub pole_position: i64,
    /// Grid slots at or below this count as a front-row start.
    pub front_row_cutoff: i64,
    pub top_deviation_count: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_standing_position: 20,
            podium_cutoff: 3,
            pole_position: 1,
            front_row_cutoff: 3,
            top_deviation_count: 10,
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        let config: AnalysisConfig =
            toml::from_str(content).map_err(|err| AnalysisError::Config {
                path: origin.to_path_buf(),
                message: err.to_string(),
            })?;
        config.validate(origin)?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content, path)?;
        info!(path = %path.display(), ?config, "loaded analysis configuration");
        Ok(config)
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        let invalid = |message: &str| AnalysisError::Config {
            path: origin.to_path_buf(),
            message: message.to_string(),
        };

        if self.max_standing_position < 1 {
            return Err(invalid("max_standing_position must be at least 1"));
        }
        if self.pole_position < 1 {
            return Err(invalid("pole_position must be at least 1"));
        }
        if self.podium_cutoff < 1 {
            return Err(invalid("podium_cutoff must be at least 1"));
        }
        if self.front_row_cutoff < 1 {
            return Err(invalid("front_row_cutoff must be at least 1"));
        }
        if self.top_deviation_count == 0 {
            return Err(invalid("top_deviation_count must be positive"));
        }
        Ok(())
    }
}
