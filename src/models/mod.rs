//! Core data models for the Liquidation Engine.
//!
//! This module contains all the domain models used throughout the engine.

mod date_window;
mod employee;
mod event;
mod news;
mod period;
mod settlement;

pub use date_window::DateWindow;
pub use employee::{Employee, EmployeeProfile, EmployeeStatus};
pub use event::{CorrectionFlags, Event, EventDisplay, EventPatch, EventWithObjective};
pub use news::{LeaveReason, News, NewsAccrual, NewsCategory};
pub use period::{Period, Shift};
pub use settlement::{
    DayNightHours, HourTotals, Liquidation, NewsSummary, Settlement, SignedByPeriod, Week,
};
