//! Configuration types for liquidation rules.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every section has a
//! `Default` matching the shipped `config/default` files.

use serde::Deserialize;

/// Boundaries of the day window; everything else is night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct DayWindowConfig {
    /// Hour at which day time starts (inclusive).
    pub day_start_hour: u32,
    /// Hour at which night time starts (inclusive).
    pub night_start_hour: u32,
}

impl Default for DayWindowConfig {
    fn default() -> Self {
        Self {
            day_start_hour: 6,
            night_start_hour: 21,
        }
    }
}

/// Weekly overtime configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OvertimeConfig {
    /// Hours per week above which time counts as overtime.
    pub weekly_threshold_hours: i64,
}

impl Default for OvertimeConfig {
    fn default() -> Self {
        Self {
            weekly_threshold_hours: 48,
        }
    }
}

/// Week bucketing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WeeksConfig {
    /// Calendar days per bucket.
    pub length_days: u32,
}

impl Default for WeeksConfig {
    fn default() -> Self {
        Self { length_days: 7 }
    }
}

/// Signal matching configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SigningConfig {
    /// Days into a new cycle during which the preceding period is also searched.
    pub lookback_days: u32,
    /// Days on either side of the signal date searched for candidate events.
    pub adjacent_days: u32,
}

impl Default for SigningConfig {
    fn default() -> Self {
        Self {
            lookback_days: 3,
            adjacent_days: 1,
        }
    }
}

/// Liquidation run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LiquidationRunConfig {
    /// Maximum number of employees aggregated concurrently.
    pub worker_pool_size: usize,
}

impl Default for LiquidationRunConfig {
    fn default() -> Self {
        Self {
            worker_pool_size: 8,
        }
    }
}

/// Rules file structure (`rules.yaml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RulesFile {
    /// Day window boundaries.
    #[serde(default)]
    pub day_window: DayWindowConfig,
    /// Weekly overtime.
    #[serde(default)]
    pub overtime: OvertimeConfig,
    /// Week bucketing.
    #[serde(default)]
    pub weeks: WeeksConfig,
    /// Signal matching.
    #[serde(default)]
    pub signing: SigningConfig,
    /// Liquidation runs.
    #[serde(default)]
    pub liquidation: LiquidationRunConfig,
}

/// One step of the presentismo deduction ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PresentismoDeduction {
    /// Minimum number of justified-leave working days for this step.
    pub min_days: usize,
    /// Points deducted from the base score.
    pub deduction: u8,
}

/// Presentismo scoring configuration (`presentismo.yaml`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PresentismoConfig {
    /// Score before deductions.
    pub base_score: u8,
    /// Deduction ladder; the step with the highest satisfied `min_days` applies.
    pub deductions: Vec<PresentismoDeduction>,
}

impl Default for PresentismoConfig {
    fn default() -> Self {
        Self {
            base_score: 100,
            deductions: vec![
                PresentismoDeduction {
                    min_days: 2,
                    deduction: 10,
                },
                PresentismoDeduction {
                    min_days: 3,
                    deduction: 20,
                },
                PresentismoDeduction {
                    min_days: 4,
                    deduction: 30,
                },
            ],
        }
    }
}

/// The complete set of liquidation rules.
///
/// This struct aggregates all configuration loaded from the YAML files in a
/// configuration directory.
///
/// # Example
///
/// ```
/// use liquidation_engine::config::LiquidationRules;
///
/// let rules = LiquidationRules::default();
/// assert_eq!(rules.overtime.weekly_threshold_hours, 48);
/// assert_eq!(rules.presentismo.base_score, 100);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiquidationRules {
    /// Day window boundaries.
    pub day_window: DayWindowConfig,
    /// Weekly overtime.
    pub overtime: OvertimeConfig,
    /// Week bucketing.
    pub weeks: WeeksConfig,
    /// Signal matching.
    pub signing: SigningConfig,
    /// Liquidation runs.
    pub liquidation: LiquidationRunConfig,
    /// Presentismo scoring.
    pub presentismo: PresentismoConfig,
}

impl LiquidationRules {
    /// Creates rules from the two configuration files.
    pub fn new(rules: RulesFile, presentismo: PresentismoConfig) -> Self {
        let mut presentismo = presentismo;
        presentismo.deductions.sort_by_key(|d| d.min_days);
        Self {
            day_window: rules.day_window,
            overtime: rules.overtime,
            weeks: rules.weeks,
            signing: rules.signing,
            liquidation: rules.liquidation,
            presentismo,
        }
    }
}
