//! Inclusive calendar date ranges.
//!
//! This module contains the [`DateWindow`] type used for settlement ranges,
//! period ranges and news ranges. All three are stored as whole calendar
//! days with an inclusive end date.

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// An inclusive range of calendar dates.
///
/// # Example
///
/// ```
/// use liquidation_engine::models::DateWindow;
/// use chrono::NaiveDate;
///
/// let window = DateWindow::new(
///     NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
/// );
///
/// assert!(window.contains_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
/// assert_eq!(window.days(), 15);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    /// The first day of the range (inclusive).
    pub from: NaiveDate,
    /// The last day of the range (inclusive).
    pub to: NaiveDate,
}

impl DateWindow {
    /// Creates a window from its two inclusive bounds.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// Returns true if `to` is not before `from`.
    pub fn is_valid(&self) -> bool {
        self.from <= self.to
    }

    /// Checks if a given date falls within this window, inclusive of both ends.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.from && date <= self.to
    }

    /// Midnight at the start of the first day.
    pub fn start(&self) -> NaiveDateTime {
        self.from.and_time(NaiveTime::MIN)
    }

    /// Midnight after the last day, so the whole terminal day is covered.
    pub fn end_exclusive(&self) -> NaiveDateTime {
        self.to
            .checked_add_days(Days::new(1))
            .unwrap_or(self.to)
            .and_time(NaiveTime::MIN)
    }

    /// Checks if an instant falls within the window.
    ///
    /// The instant exactly at [`DateWindow::end_exclusive`] counts as inside so
    /// that an interval ending at midnight after the last day is still
    /// considered to end within the window.
    pub fn contains_instant(&self, instant: NaiveDateTime) -> bool {
        instant >= self.start() && instant <= self.end_exclusive()
    }

    /// Number of calendar days covered, or zero for an inverted window.
    pub fn days(&self) -> i64 {
        if !self.is_valid() {
            return 0;
        }
        (self.to - self.from).num_days() + 1
    }

    /// Number of days shared with another window, or zero if they are disjoint.
    pub fn overlap_days(&self, other: &DateWindow) -> i64 {
        let from = self.from.max(other.from);
        let to = self.to.min(other.to);
        DateWindow::new(from, to).days()
    }
}
