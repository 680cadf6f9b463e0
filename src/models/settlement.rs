//! Settlement models for the Liquidation Engine.
//!
//! This module contains the [`Settlement`] type and its associated structures
//! that capture everything a liquidation run derives for one employee: hour
//! totals for scheduled and signed time, weekly overtime, news totals and the
//! presentismo score. It also holds the run record, [`Liquidation`].

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{DateWindow, Employee, EventWithObjective, LeaveReason, NewsCategory};

/// One 7-day bucket of a settlement range.
///
/// Hours are accumulated in minutes while events are attributed and turned
/// into hours once the week is closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Week {
    /// First day of the bucket (inclusive).
    pub from: NaiveDate,
    /// Last day of the bucket (inclusive).
    pub to: NaiveDate,
    /// Minutes attributed so far.
    #[serde(default)]
    pub total_minutes: i64,
    /// Hours attributed, set when the week is closed.
    #[serde(default)]
    pub total_hours: Decimal,
    /// Hours above the weekly threshold, set when the week is closed.
    #[serde(default)]
    pub total_extra_hours: Decimal,
    /// Events whose start fell inside this bucket.
    #[serde(default)]
    pub events: Vec<EventWithObjective>,
}

impl Week {
    /// Creates an empty bucket.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self {
            from,
            to,
            total_minutes: 0,
            total_hours: Decimal::ZERO,
            total_extra_hours: Decimal::ZERO,
            events: Vec::new(),
        }
    }

    /// The bucket's date range.
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.from, self.to)
    }
}

/// Day and night split of a total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayNightHours {
    /// Hours inside the day window.
    pub day: Decimal,
    /// Hours inside the night window.
    pub night: Decimal,
}

/// Hour totals for one kind of time (scheduled or signed).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourTotals {
    /// Total whole hours.
    pub total: Decimal,
    /// Day/night split of the total.
    pub by: DayNightHours,
    /// Sum of weekly overtime.
    pub extras: Decimal,
    /// Per-week breakdown.
    pub by_week: Vec<Week>,
}

/// Everything derived from the news records for one employee.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsSummary {
    /// Overlap hours per hour-prorated category.
    pub hours_by_category: BTreeMap<NewsCategory, Decimal>,
    /// Distinct working days with any overlap, per hour-prorated category.
    pub working_days_by_category: BTreeMap<NewsCategory, Vec<NaiveDate>>,
    /// Summed amounts per monetary category.
    pub amounts: BTreeMap<NewsCategory, Decimal>,
    /// Overlap days per day-prorated category.
    pub days_by_category: BTreeMap<NewsCategory, i64>,
    /// Justified-leave hours grouped by reason.
    pub leave_by_reason: BTreeMap<LeaveReason, Decimal>,
    /// Training hours attended.
    pub training_hours: Decimal,
    /// Number of signed-in events.
    pub viaticos: u32,
    /// Attendance score from 0 to 100.
    pub presentismo: u8,
    /// Ids of every news record consumed, in first-seen order.
    pub news_ids: Vec<String>,
}

impl NewsSummary {
    /// Overlap hours for a category, zero if none.
    pub fn hours(&self, category: NewsCategory) -> Decimal {
        self.hours_by_category
            .get(&category)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }

    /// Number of distinct working days with overlap for a category.
    pub fn working_days(&self, category: NewsCategory) -> usize {
        self.working_days_by_category
            .get(&category)
            .map(Vec::len)
            .unwrap_or(0)
    }
}

/// The settlement of one employee within one liquidation run.
///
/// # Example
///
/// ```
/// use liquidation_engine::models::{
///     Employee, EmployeeProfile, EmployeeStatus, HourTotals, NewsSummary, Settlement,
/// };
/// use uuid::Uuid;
///
/// let settlement = Settlement {
///     id: Uuid::new_v4(),
///     liquidation_id: Uuid::new_v4(),
///     employee: Employee {
///         id: "emp_001".to_string(),
///         enrollment: "1042".to_string(),
///         badge_id: "badge-77".to_string(),
///         profile: EmployeeProfile::default(),
///         status: EmployeeStatus::Activo,
///     },
///     signed: HourTotals::default(),
///     scheduled: HourTotals::default(),
///     news: NewsSummary::default(),
/// };
/// assert_eq!(settlement.news.presentismo, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    /// Unique identifier for this settlement.
    pub id: Uuid,
    /// The run this settlement belongs to.
    pub liquidation_id: Uuid,
    /// Snapshot of the employee at liquidation time.
    pub employee: Employee,
    /// Totals computed from check-in/check-out.
    pub signed: HourTotals,
    /// Totals computed from the schedule.
    pub scheduled: HourTotals,
    /// News totals, viaticos and presentismo.
    #[serde(flatten)]
    pub news: NewsSummary,
}

/// Hours one period contributed to one employee's settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedByPeriod {
    /// The run this record belongs to.
    pub liquidation_id: Uuid,
    /// The employee.
    pub employee_id: String,
    /// The contributing period.
    pub period_id: String,
    /// The period's objective.
    pub objective_id: String,
    /// Scheduled whole hours from this period.
    pub scheduled_hours: Decimal,
    /// Signed hours from this period.
    pub signed_hours: Decimal,
}

/// A liquidation run: the parent record of a set of settlements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liquidation {
    /// Unique identifier for the run; kept across recomputations.
    pub id: Uuid,
    /// The settled range.
    pub window: DateWindow,
    /// Employees included, in request order.
    pub employee_ids: Vec<String>,
    /// Settlements produced, in the same order as `employee_ids`.
    pub settlement_ids: Vec<Uuid>,
    /// The user who requested the run.
    pub created_by: String,
    /// When the run was first computed.
    pub created_at: DateTime<Utc>,
    /// When the run was last recomputed, if ever.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recomputed_at: Option<DateTime<Utc>>,
    /// The version of the engine that computed the run.
    pub engine_version: String,
}
