//! Calculation logic for the Liquidation Engine.
//!
//! This module contains the pure functions behind signing and liquidation:
//! calendar arithmetic (day/night split, week bucketing, the three-case
//! overlap rule), matching a clock signal to its event, news proration with
//! presentismo scoring, and the per-employee settlement aggregation.
//!
//! Nothing here touches a store; see [`crate::service`] for the async use
//! cases built on top.

mod news_proration;
mod period_aggregator;
mod signing;
mod time_window;

pub use news_proration::{NewsProration, presentismo_score, prorate_news};
pub use period_aggregator::{EmployeeAggregate, aggregate_employee};
pub use signing::{Candidate, SigningKind, apply_signal, collect_candidates, select_closest_event};
pub use time_window::{
    DEFAULT_WEEK_LENGTH_DAYS, DayNightSplit, DayWindow, OverlapCase, bucket_by_days,
    bucket_into_weeks, clamp_overlap_minutes, duration_minutes, floor_minute, minutes_to_hours,
    overlap_case, overlaps, round_hours, split_day_night, whole_hours,
};
