//! Period and shift models.
//!
//! A [`Period`] is one scheduling cycle for one objective (work site). It
//! owns one [`Shift`] per assigned employee, and each shift owns its events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DateWindow, Event};

/// One employee's ordered events within a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// The employee this shift belongs to.
    pub employee_id: String,
    /// Events ordered by scheduled start.
    #[serde(default)]
    pub events: Vec<Event>,
    /// Calendar dates on which the employee signed at least once.
    #[serde(default)]
    pub signed_dates: Vec<NaiveDate>,
}

impl Shift {
    /// Returns true if a signal was recorded on `date`.
    pub fn has_signed_on(&self, date: NaiveDate) -> bool {
        self.signed_dates.contains(&date)
    }

    /// Records `date` as signed. Returns false if it was already recorded.
    pub fn record_signed_date(&mut self, date: NaiveDate) -> bool {
        if self.has_signed_on(date) {
            return false;
        }
        self.signed_dates.push(date);
        true
    }

    /// Looks up an event by id.
    pub fn event_mut(&mut self, event_id: &str) -> Option<&mut Event> {
        self.events.iter_mut().find(|e| e.id == event_id)
    }
}

/// A scheduling window for one objective.
///
/// # Example
///
/// ```
/// use liquidation_engine::models::{Period, Shift};
/// use chrono::NaiveDate;
///
/// let period = Period {
///     id: "per_2024_03".to_string(),
///     objective_id: "obj_harbour".to_string(),
///     from_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     to_date: NaiveDate::from_ymd_opt(2024, 3, 31).unwrap(),
///     shifts: vec![Shift {
///         employee_id: "emp_001".to_string(),
///         events: vec![],
///         signed_dates: vec![],
///     }],
/// };
///
/// assert!(period.contains_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()));
/// assert!(period.shift_for("emp_001").is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Unique identifier for the period.
    pub id: String,
    /// The objective (work site) this period schedules.
    pub objective_id: String,
    /// First day of the cycle (inclusive).
    pub from_date: NaiveDate,
    /// Last day of the cycle (inclusive).
    pub to_date: NaiveDate,
    /// One shift per assigned employee.
    #[serde(default)]
    pub shifts: Vec<Shift>,
}

impl Period {
    /// The period's date range.
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.from_date, self.to_date)
    }

    /// Checks if a date falls inside the period, inclusive of both ends.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        self.window().contains_date(date)
    }

    /// The shift of the given employee, if assigned.
    pub fn shift_for(&self, employee_id: &str) -> Option<&Shift> {
        self.shifts.iter().find(|s| s.employee_id == employee_id)
    }

    /// Mutable access to the shift of the given employee.
    pub fn shift_for_mut(&mut self, employee_id: &str) -> Option<&mut Shift> {
        self.shifts.iter_mut().find(|s| s.employee_id == employee_id)
    }
}
