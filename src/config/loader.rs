//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading liquidation
//! rules from YAML files.

use std::fs;
use std::path::Path;

use crate::error::{EngineError, EngineResult};

use super::types::{LiquidationRules, PresentismoConfig, RulesFile};

/// Loads and provides access to liquidation rules.
///
/// # Directory Structure
///
/// The configuration directory should have the following structure:
/// ```text
/// config/default/
/// ├── rules.yaml        # Day window, overtime, weeks, signing, worker pool
/// └── presentismo.yaml  # Base score and deduction ladder
/// ```
///
/// # Example
///
/// ```no_run
/// use liquidation_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/default").unwrap();
/// println!("Night starts at {}:00", loader.rules().day_window.night_start_hour);
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    rules: LiquidationRules,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// Returns an error if either file is missing, contains invalid YAML, or
    /// holds values outside their valid ranges.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let rules_file = Self::load_yaml::<RulesFile>(&path.join("rules.yaml"))?;
        let presentismo = Self::load_yaml::<PresentismoConfig>(&path.join("presentismo.yaml"))?;

        let rules = LiquidationRules::new(rules_file, presentismo);
        Self::validate(&rules)?;

        Ok(Self { rules })
    }

    /// Wraps already-built rules, validating them first.
    pub fn from_rules(rules: LiquidationRules) -> EngineResult<Self> {
        Self::validate(&rules)?;
        Ok(Self { rules })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    fn validate(rules: &LiquidationRules) -> EngineResult<()> {
        let window = rules.day_window;
        if window.day_start_hour >= 24 || window.night_start_hour >= 24 {
            return Err(EngineError::validation(
                "day_window",
                "hours must be between 0 and 23",
            ));
        }
        if window.day_start_hour >= window.night_start_hour {
            return Err(EngineError::validation(
                "day_window",
                "day_start_hour must be before night_start_hour",
            ));
        }
        if rules.overtime.weekly_threshold_hours < 0 {
            return Err(EngineError::validation(
                "overtime.weekly_threshold_hours",
                "must not be negative",
            ));
        }
        if rules.weeks.length_days == 0 {
            return Err(EngineError::validation("weeks.length_days", "must be positive"));
        }
        if rules.liquidation.worker_pool_size == 0 {
            return Err(EngineError::validation(
                "liquidation.worker_pool_size",
                "must be positive",
            ));
        }
        let base = rules.presentismo.base_score;
        if base > 100 || rules.presentismo.deductions.iter().any(|d| d.deduction > base) {
            return Err(EngineError::validation(
                "presentismo",
                "scores must stay between 0 and 100",
            ));
        }
        Ok(())
    }

    /// Returns the loaded rules.
    pub fn rules(&self) -> &LiquidationRules {
        &self.rules
    }
}
