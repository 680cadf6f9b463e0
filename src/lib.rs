//! Shift Signing and Payroll Liquidation Engine
//!
//! This crate reconciles guards' clock signals against their scheduled shifts
//! and settles payroll over a date range: day/night hour splits, weekly
//! overtime, leave and bonus proration, and the presentismo score.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
