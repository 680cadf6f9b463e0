//! Configuration loading and management for the Liquidation Engine.
//!
//! This module provides functionality to load liquidation rules from YAML
//! files: day/night boundaries, weekly overtime threshold, week length,
//! signal matching tolerances, worker pool size and presentismo deductions.
//!
//! # Example
//!
//! ```no_run
//! use liquidation_engine::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Overtime after {}h", config.rules().overtime.weekly_threshold_hours);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    DayWindowConfig, LiquidationRules, LiquidationRunConfig, OvertimeConfig, PresentismoConfig,
    PresentismoDeduction, RulesFile, SigningConfig, WeeksConfig,
};
