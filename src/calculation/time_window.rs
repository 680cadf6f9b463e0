//! Calendar arithmetic shared by every calculation.
//!
//! This module provides the day/night split of an interval, the bucketing of
//! a settlement range into weeks, and the three-case overlap rule used to
//! prorate news against events.
//!
//! All functions are total: inverted or empty intervals yield zeroed results.
//! Instants are truncated to whole minutes before any arithmetic so that
//! every split adds up exactly.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::DayWindowConfig;
use crate::models::{DateWindow, Week};

/// Default number of days per week bucket.
pub const DEFAULT_WEEK_LENGTH_DAYS: u32 = 7;

/// Minutes of an interval split into day and night time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayNightSplit {
    /// Minutes inside the day window.
    pub day_minutes: i64,
    /// Minutes inside the night window.
    pub night_minutes: i64,
}

impl DayNightSplit {
    /// Total minutes of the split interval.
    pub fn total_minutes(&self) -> i64 {
        self.day_minutes + self.night_minutes
    }
}

/// The daily boundaries between day and night time.
///
/// Day time is `[day_start, night_start)`; night time is the complement,
/// wrapping over midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    day_start: NaiveTime,
    night_start: NaiveTime,
}

impl Default for DayWindow {
    fn default() -> Self {
        Self::from_config(&DayWindowConfig::default())
    }
}

impl DayWindow {
    /// Builds the window from validated configuration.
    pub fn from_config(config: &DayWindowConfig) -> Self {
        Self {
            day_start: NaiveTime::from_hms_opt(config.day_start_hour, 0, 0)
                .unwrap_or(NaiveTime::MIN),
            night_start: NaiveTime::from_hms_opt(config.night_start_hour, 0, 0)
                .unwrap_or(NaiveTime::MIN),
        }
    }

    /// Returns true if the given time of day falls in day time.
    pub fn is_day(&self, time: NaiveTime) -> bool {
        time >= self.day_start && time < self.night_start
    }

    /// Splits `[from, to)` into day and night minutes.
    ///
    /// The interval is cut at every day/night boundary it crosses, so a shift
    /// starting in the evening yields night, then day, then night again if it
    /// runs long enough. Spans longer than a day are handled the same way.
    ///
    /// # Example
    ///
    /// ```
    /// use liquidation_engine::calculation::DayWindow;
    /// use chrono::NaiveDateTime;
    ///
    /// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    /// let split = DayWindow::default().split(at("2024-03-04 18:00:00"), at("2024-03-05 08:00:00"));
    ///
    /// assert_eq!(split.day_minutes, 5 * 60); // 18-21 and 06-08
    /// assert_eq!(split.night_minutes, 9 * 60); // 21-06
    /// ```
    pub fn split(&self, from: NaiveDateTime, to: NaiveDateTime) -> DayNightSplit {
        let mut split = DayNightSplit::default();
        let mut cursor = floor_minute(from);
        let end = floor_minute(to);

        while cursor < end {
            let segment_end = self.next_boundary(cursor).min(end);
            let minutes = (segment_end - cursor).num_minutes();
            if self.is_day(cursor.time()) {
                split.day_minutes += minutes;
            } else {
                split.night_minutes += minutes;
            }
            cursor = segment_end;
        }

        split
    }

    /// The first day/night boundary strictly after `instant`.
    fn next_boundary(&self, instant: NaiveDateTime) -> NaiveDateTime {
        let date = instant.date();
        let next_day = date.checked_add_days(Days::new(1)).unwrap_or(date);
        [
            date.and_time(self.day_start),
            date.and_time(self.night_start),
            next_day.and_time(self.day_start),
        ]
        .into_iter()
        .find(|boundary| *boundary > instant)
        .unwrap_or(NaiveDateTime::MAX)
    }
}

/// Splits an interval with the default 06:00/21:00 boundaries.
///
/// # Example
///
/// ```
/// use liquidation_engine::calculation::split_day_night;
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let split = split_day_night(at("2024-03-04 22:00:00"), at("2024-03-05 06:00:00"));
///
/// assert_eq!(split.day_minutes, 0);
/// assert_eq!(split.night_minutes, 8 * 60);
/// ```
pub fn split_day_night(from: NaiveDateTime, to: NaiveDateTime) -> DayNightSplit {
    DayWindow::default().split(from, to)
}

/// Truncates an instant to the start of its minute.
pub fn floor_minute(instant: NaiveDateTime) -> NaiveDateTime {
    instant
        .with_nanosecond(0)
        .and_then(|t| t.with_second(0))
        .unwrap_or(instant)
}

/// Whole minutes in `[from, to)`, or zero if the interval is empty or inverted.
pub fn duration_minutes(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (floor_minute(to) - floor_minute(from)).num_minutes().max(0)
}

/// Whole hours in a number of minutes, truncated.
pub fn whole_hours(minutes: i64) -> Decimal {
    Decimal::from(minutes / 60)
}

/// Minutes converted to hours, rounded half-up to whole hours.
pub fn round_hours(minutes: i64) -> Decimal {
    (Decimal::from(minutes) / Decimal::from(60))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Minutes converted to hours with two decimals.
pub fn minutes_to_hours(minutes: i64) -> Decimal {
    (Decimal::from(minutes) / Decimal::from(60))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Partitions `[from, to]` into consecutive 7-day buckets starting at `from`.
///
/// # Example
///
/// ```
/// use liquidation_engine::calculation::bucket_into_weeks;
/// use chrono::NaiveDate;
///
/// let weeks = bucket_into_weeks(
///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 3, 16).unwrap(),
/// );
///
/// assert_eq!(weeks.len(), 3);
/// assert_eq!(weeks[2].from, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
/// assert_eq!(weeks[2].to, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
/// ```
pub fn bucket_into_weeks(from: NaiveDate, to: NaiveDate) -> Vec<Week> {
    bucket_by_days(from, to, DEFAULT_WEEK_LENGTH_DAYS)
}

/// Partitions `[from, to]` into consecutive buckets of `length_days` days.
///
/// The last bucket is truncated to `to`. An inverted range or a zero length
/// yields no buckets.
pub fn bucket_by_days(from: NaiveDate, to: NaiveDate, length_days: u32) -> Vec<Week> {
    let mut weeks = Vec::new();
    if from > to || length_days == 0 {
        return weeks;
    }

    let mut start = from;
    loop {
        let full_end = start
            .checked_add_days(Days::new(u64::from(length_days) - 1))
            .unwrap_or(to);
        let end = full_end.min(to);
        weeks.push(Week::new(start, end));

        match end.checked_add_days(Days::new(1)) {
            Some(next) if end < to => start = next,
            _ => break,
        }
    }
    weeks
}

/// How an interval relates to an enclosing date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlapCase {
    /// Both endpoints inside: the full duration counts.
    Inside,
    /// Only the start inside: count up to the end of the window's last day.
    StartInside,
    /// Only the end inside: count from the start of the window's first day.
    EndInside,
}

/// Classifies `[from, to]` against `outer` by which endpoints fall inside it.
///
/// Returns `None` when neither endpoint is inside.
pub fn overlap_case(
    outer: &DateWindow,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Option<OverlapCase> {
    match (outer.contains_instant(from), outer.contains_instant(to)) {
        (true, true) => Some(OverlapCase::Inside),
        (true, false) => Some(OverlapCase::StartInside),
        (false, true) => Some(OverlapCase::EndInside),
        (false, false) => None,
    }
}

/// Minutes of `[from, to]` that count against `outer` under the three-case rule.
///
/// # Example
///
/// ```
/// use liquidation_engine::calculation::clamp_overlap_minutes;
/// use liquidation_engine::models::DateWindow;
/// use chrono::{NaiveDate, NaiveDateTime};
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let news = DateWindow::new(
///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
/// );
///
/// let minutes = clamp_overlap_minutes(&news, at("2024-03-04 08:00:00"), at("2024-03-04 20:00:00"));
/// assert_eq!(minutes, 12 * 60);
/// ```
pub fn clamp_overlap_minutes(outer: &DateWindow, from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    if to <= from {
        return 0;
    }
    match overlap_case(outer, from, to) {
        Some(OverlapCase::Inside) => duration_minutes(from, to),
        Some(OverlapCase::StartInside) => duration_minutes(from, outer.end_exclusive()),
        Some(OverlapCase::EndInside) => duration_minutes(outer.start(), to),
        None => 0,
    }
}

/// Returns true if two date ranges overlap.
///
/// Matches when `inner` lies within `outer`, starts inside it, ends inside it,
/// or encloses it entirely.
pub fn overlaps(outer: &DateWindow, inner: &DateWindow) -> bool {
    if !outer.is_valid() || !inner.is_valid() {
        return false;
    }
    let start_inside = outer.contains_date(inner.from);
    let end_inside = outer.contains_date(inner.to);
    let encloses = inner.from <= outer.from && inner.to >= outer.to;
    start_inside || end_inside || encloses
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn window(from: &str, to: &str) -> DateWindow {
        DateWindow::new(date(from), date(to))
    }

    #[test]
    fn test_split_within_day_window() {
        let split = split_day_night(at("2024-03-04 08:00:00"), at("2024-03-04 20:00:00"));
        assert_eq!(split.day_minutes, 12 * 60);
        assert_eq!(split.night_minutes, 0);
    }

    #[test]
    fn test_split_single_day_across_both_boundaries() {
        let split = split_day_night(at("2024-03-04 04:00:00"), at("2024-03-04 23:00:00"));
        assert_eq!(split.night_minutes, 4 * 60);
        assert_eq!(split.day_minutes, 15 * 60);
    }

    #[test]
    fn test_split_day_night_day_across_midnight() {
        let split = split_day_night(at("2024-03-04 14:00:00"), at("2024-03-05 10:00:00"));
        assert_eq!(split.day_minutes, 7 * 60 + 4 * 60);
        assert_eq!(split.night_minutes, 9 * 60);
    }

    #[test]
    fn test_split_night_day_night() {
        let split = split_day_night(at("2024-03-04 02:00:00"), at("2024-03-05 01:00:00"));
        assert_eq!(split.night_minutes, 4 * 60 + 4 * 60);
        assert_eq!(split.day_minutes, 15 * 60);
    }

    #[test]
    fn test_split_keeps_minutes() {
        let split = split_day_night(at("2024-03-04 20:30:00"), at("2024-03-04 21:45:00"));
        assert_eq!(split.day_minutes, 30);
        assert_eq!(split.night_minutes, 45);
    }

    #[test]
    fn test_split_ignores_seconds() {
        let split = split_day_night(at("2024-03-04 08:00:59"), at("2024-03-04 09:00:30"));
        assert_eq!(split.total_minutes(), 60);
    }

    #[test]
    fn test_split_degenerate_intervals_are_zero() {
        let same = at("2024-03-04 08:00:00");
        assert_eq!(split_day_night(same, same), DayNightSplit::default());
        assert_eq!(
            split_day_night(at("2024-03-04 10:00:00"), at("2024-03-04 08:00:00")),
            DayNightSplit::default()
        );
    }

    #[test]
    fn test_configured_window() {
        let window = DayWindow::from_config(&DayWindowConfig {
            day_start_hour: 7,
            night_start_hour: 19,
        });
        let split = window.split(at("2024-03-04 06:00:00"), at("2024-03-04 20:00:00"));
        assert_eq!(split.night_minutes, 2 * 60);
        assert_eq!(split.day_minutes, 12 * 60);
    }

    #[test]
    fn test_hour_conversions() {
        assert_eq!(whole_hours(89), Decimal::from(1));
        assert_eq!(round_hours(89), Decimal::from(1));
        assert_eq!(round_hours(90), Decimal::from(2));
        assert_eq!(minutes_to_hours(90), Decimal::new(150, 2));
        assert_eq!(minutes_to_hours(20), Decimal::new(33, 2));
    }

    #[test]
    fn test_bucket_exact_weeks() {
        let weeks = bucket_into_weeks(date("2024-03-01"), date("2024-03-14"));
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].from, date("2024-03-01"));
        assert_eq!(weeks[0].to, date("2024-03-07"));
        assert_eq!(weeks[1].from, date("2024-03-08"));
        assert_eq!(weeks[1].to, date("2024-03-14"));
    }

    #[test]
    fn test_bucket_truncates_last_week() {
        let weeks = bucket_into_weeks(date("2024-03-01"), date("2024-03-31"));
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[4].from, date("2024-03-29"));
        assert_eq!(weeks[4].to, date("2024-03-31"));
    }

    #[test]
    fn test_bucket_single_day() {
        let weeks = bucket_into_weeks(date("2024-03-01"), date("2024-03-01"));
        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].from, weeks[0].to);
    }

    #[test]
    fn test_bucket_inverted_range_is_empty() {
        assert!(bucket_into_weeks(date("2024-03-02"), date("2024-03-01")).is_empty());
        assert!(bucket_by_days(date("2024-03-01"), date("2024-03-09"), 0).is_empty());
    }

    #[test]
    fn test_overlap_event_fully_inside_news() {
        let news = window("2024-03-01", "2024-03-05");
        let minutes =
            clamp_overlap_minutes(&news, at("2024-03-04 08:00:00"), at("2024-03-04 20:00:00"));
        assert_eq!(minutes, 12 * 60);
        assert_eq!(
            overlap_case(&news, at("2024-03-04 08:00:00"), at("2024-03-04 20:00:00")),
            Some(OverlapCase::Inside)
        );
    }

    #[test]
    fn test_overlap_event_starting_inside_counts_to_end_of_last_day() {
        let news = window("2024-03-01", "2024-03-05");
        let minutes =
            clamp_overlap_minutes(&news, at("2024-03-05 22:00:00"), at("2024-03-06 06:00:00"));
        assert_eq!(minutes, 2 * 60);
    }

    #[test]
    fn test_overlap_event_ending_inside_counts_from_first_day() {
        let news = window("2024-03-01", "2024-03-05");
        let minutes =
            clamp_overlap_minutes(&news, at("2024-02-29 22:00:00"), at("2024-03-01 06:00:00"));
        assert_eq!(minutes, 6 * 60);
    }

    #[test]
    fn test_overlap_event_ending_at_midnight_after_last_day_is_inside() {
        let news = window("2024-03-05", "2024-03-05");
        let minutes =
            clamp_overlap_minutes(&news, at("2024-03-05 16:00:00"), at("2024-03-06 00:00:00"));
        assert_eq!(minutes, 8 * 60);
    }

    #[test]
    fn test_overlap_event_outside_contributes_nothing() {
        let news = window("2024-03-01", "2024-03-05");
        assert_eq!(
            clamp_overlap_minutes(&news, at("2024-03-10 08:00:00"), at("2024-03-10 20:00:00")),
            0
        );
        assert_eq!(
            clamp_overlap_minutes(&news, at("2024-03-04 20:00:00"), at("2024-03-04 08:00:00")),
            0
        );
    }

    #[test]
    fn test_overlaps_date_ranges() {
        let range = window("2024-03-01", "2024-03-31");
        assert!(overlaps(&range, &window("2024-03-05", "2024-03-10")));
        assert!(overlaps(&range, &window("2024-03-25", "2024-04-10")));
        assert!(overlaps(&range, &window("2024-02-20", "2024-03-01")));
        assert!(overlaps(&range, &window("2024-02-01", "2024-04-30")));
        assert!(!overlaps(&range, &window("2024-04-01", "2024-04-30")));
        assert!(!overlaps(&range, &window("2024-03-10", "2024-03-05")));
    }
}
