//! Per-employee settlement aggregation.
//!
//! This module walks every Period in which an employee has events inside the
//! settlement range and produces the hour totals of one [`Settlement`]:
//!
//! - **Scheduled time**: each event's duration and day/night split, truncated
//!   to whole hours per event, both in the totals and in the weeks.
//! - **Signed time**: the checkin/checkout interval of each signed event,
//!   summed in minutes and rounded to whole hours once at the end.
//! - **Weeks**: every event is attributed in full to the week containing its
//!   start. A week above the overtime threshold carries the excess as extras.
//!
//! Leave adjustments come from [`prorate_news`] and are merged into the
//! settlement unchanged.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::config::LiquidationRules;
use crate::models::{
    DateWindow, DayNightHours, Employee, Event, EventWithObjective, HourTotals, News,
    NewsAccrual, Period, Settlement, SignedByPeriod, Week,
};

use super::news_proration::prorate_news;
use super::time_window::{
    DayNightSplit, DayWindow, duration_minutes, minutes_to_hours, round_hours, whole_hours,
};

/// Everything one employee contributes to a liquidation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeAggregate {
    /// The employee's settlement.
    pub settlement: Settlement,
    /// Scheduled and signed hours contributed by each Period.
    pub signed_by_period: Vec<SignedByPeriod>,
    /// Derived hours per consumed news id, applied once the run succeeds.
    pub accruals: BTreeMap<String, NewsAccrual>,
}

/// Running totals for one kind of time (scheduled or signed).
struct HourAccumulator {
    weeks: Vec<Week>,
    total: Decimal,
    day: Decimal,
    night: Decimal,
    total_minutes: i64,
    day_minutes: i64,
    night_minutes: i64,
}

impl HourAccumulator {
    fn new(weeks: &[Week]) -> Self {
        Self {
            weeks: weeks.to_vec(),
            total: Decimal::ZERO,
            day: Decimal::ZERO,
            night: Decimal::ZERO,
            total_minutes: 0,
            day_minutes: 0,
            night_minutes: 0,
        }
    }

    /// Adds an interval truncated to whole hours.
    fn add_whole_hours(&mut self, minutes: i64, split: DayNightSplit) {
        self.total += whole_hours(minutes);
        self.day += whole_hours(split.day_minutes);
        self.night += whole_hours(split.night_minutes);
    }

    /// Adds an interval at minute precision.
    fn add_minutes(&mut self, minutes: i64, split: DayNightSplit) {
        self.total_minutes += minutes;
        self.day_minutes += split.day_minutes;
        self.night_minutes += split.night_minutes;
    }

    /// Attributes an event to the week containing `date`, if any.
    fn attribute(&mut self, date: NaiveDate, minutes: i64, event: &EventWithObjective) {
        if let Some(week) = self
            .weeks
            .iter_mut()
            .find(|week| week.window().contains_date(date))
        {
            week.total_minutes += minutes;
            week.events.push(event.clone());
        }
    }

    fn has_week_for(&self, date: NaiveDate) -> bool {
        self.weeks
            .iter()
            .any(|week| week.window().contains_date(date))
    }

    /// Closes every week and builds the totals.
    ///
    /// With `from_minutes` the totals come from the minute sums, rounded once;
    /// otherwise from the whole-hour sums.
    fn finish(mut self, threshold_hours: i64, from_minutes: bool) -> HourTotals {
        let threshold_minutes = threshold_hours.saturating_mul(60);
        let mut extras = Decimal::ZERO;

        for week in &mut self.weeks {
            week.total_hours = minutes_to_hours(week.total_minutes);
            week.total_extra_hours =
                minutes_to_hours((week.total_minutes - threshold_minutes).max(0));
            extras += week.total_extra_hours;
        }

        let (total, day, night) = if from_minutes {
            (
                round_hours(self.total_minutes),
                round_hours(self.day_minutes),
                round_hours(self.night_minutes),
            )
        } else {
            (self.total, self.day, self.night)
        };

        HourTotals {
            total,
            by: DayNightHours { day, night },
            extras,
            by_week: self.weeks,
        }
    }
}

/// Scheduled and signed minutes one Period contributed.
#[derive(Default)]
struct PeriodContribution {
    objective_id: String,
    scheduled_hours: Decimal,
    signed_minutes: i64,
}

/// Aggregates one employee's events and news into a settlement.
///
/// `weeks` is the bucket skeleton for `window`; it is copied so callers can
/// share one skeleton across employees. Only events whose scheduled start
/// falls inside `window` are counted.
///
/// # Example
///
/// ```
/// use liquidation_engine::calculation::{aggregate_employee, bucket_into_weeks};
/// use liquidation_engine::config::LiquidationRules;
/// use liquidation_engine::models::{
///     DateWindow, Employee, EmployeeProfile, EmployeeStatus, Event, Period, Shift,
/// };
/// use chrono::{NaiveDate, NaiveDateTime};
/// use rust_decimal::Decimal;
/// use uuid::Uuid;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let day = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
///
/// let employee = Employee {
///     id: "emp_001".to_string(),
///     enrollment: "1001".to_string(),
///     badge_id: "badge_001".to_string(),
///     profile: EmployeeProfile::default(),
///     status: EmployeeStatus::Activo,
/// };
/// let period = Period {
///     id: "per_1".to_string(),
///     objective_id: "obj_1".to_string(),
///     from_date: day("2024-03-01"),
///     to_date: day("2024-03-31"),
///     shifts: vec![Shift {
///         employee_id: "emp_001".to_string(),
///         events: vec![Event::scheduled("ev_1", at("2024-03-04 18:00:00"), at("2024-03-05 02:00:00"))],
///         signed_dates: vec![],
///     }],
/// };
/// let window = DateWindow::new(day("2024-03-01"), day("2024-03-31"));
/// let weeks = bucket_into_weeks(window.from, window.to);
///
/// let aggregate = aggregate_employee(
///     Uuid::new_v4(),
///     &employee,
///     &window,
///     &[period],
///     &weeks,
///     &[],
///     &LiquidationRules::default(),
/// );
///
/// assert_eq!(aggregate.settlement.scheduled.total, Decimal::from(8));
/// assert_eq!(aggregate.settlement.scheduled.by.day, Decimal::from(3));
/// assert_eq!(aggregate.settlement.scheduled.by.night, Decimal::from(5));
/// ```
pub fn aggregate_employee(
    liquidation_id: Uuid,
    employee: &Employee,
    window: &DateWindow,
    periods: &[Period],
    weeks: &[Week],
    news: &[News],
    rules: &LiquidationRules,
) -> EmployeeAggregate {
    let day_window = DayWindow::from_config(&rules.day_window);
    let mut scheduled = HourAccumulator::new(weeks);
    let mut signed = HourAccumulator::new(weeks);
    let mut contributions: Vec<(String, PeriodContribution)> = Vec::new();
    let mut events: Vec<Event> = Vec::new();

    for period in periods {
        let Some(shift) = period.shift_for(&employee.id) else {
            continue;
        };
        let qualifying: Vec<&Event> = shift
            .events
            .iter()
            .filter(|event| window.contains_date(event.scheduled_from.date()))
            .collect();
        if qualifying.is_empty() {
            continue;
        }

        let mut contribution = PeriodContribution {
            objective_id: period.objective_id.clone(),
            ..PeriodContribution::default()
        };

        for event in qualifying {
            let tagged = EventWithObjective {
                objective_id: period.objective_id.clone(),
                period_id: period.id.clone(),
                event: event.clone(),
            };

            let minutes = duration_minutes(event.scheduled_from, event.scheduled_to);
            let split = day_window.split(event.scheduled_from, event.scheduled_to);
            scheduled.add_whole_hours(minutes, split);
            scheduled.attribute(event.scheduled_from.date(), minutes / 60 * 60, &tagged);
            contribution.scheduled_hours += whole_hours(minutes);

            if let Some((checkin, checkout)) = event.signed_interval() {
                let minutes = duration_minutes(checkin, checkout);
                let split = day_window.split(checkin, checkout);
                signed.add_minutes(minutes, split);
                let week_date = if signed.has_week_for(checkin.date()) {
                    checkin.date()
                } else {
                    event.scheduled_from.date()
                };
                signed.attribute(week_date, minutes, &tagged);
                contribution.signed_minutes += minutes;
            }

            events.push(event.clone());
        }

        contributions.push((period.id.clone(), contribution));
    }

    let threshold = rules.overtime.weekly_threshold_hours;
    let proration = prorate_news(&employee.id, window, &events, news, &rules.presentismo);

    let signed_by_period = contributions
        .into_iter()
        .map(|(period_id, contribution)| SignedByPeriod {
            liquidation_id,
            employee_id: employee.id.clone(),
            period_id,
            objective_id: contribution.objective_id,
            scheduled_hours: contribution.scheduled_hours,
            signed_hours: round_hours(contribution.signed_minutes),
        })
        .collect();

    let settlement = Settlement {
        id: Uuid::new_v4(),
        liquidation_id,
        employee: employee.clone(),
        signed: signed.finish(threshold, true),
        scheduled: scheduled.finish(threshold, false),
        news: proration.summary,
    };

    EmployeeAggregate {
        settlement,
        signed_by_period,
        accruals: proration.accruals,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculation::bucket_into_weeks;
    use crate::models::{EmployeeProfile, EmployeeStatus, NewsCategory, Shift};
    use chrono::NaiveDateTime;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn employee() -> Employee {
        Employee {
            id: "emp_001".to_string(),
            enrollment: "1001".to_string(),
            badge_id: "badge_001".to_string(),
            profile: EmployeeProfile::default(),
            status: EmployeeStatus::Activo,
        }
    }

    fn period(id: &str, employee_id: &str, events: Vec<Event>) -> Period {
        Period {
            id: id.to_string(),
            objective_id: format!("obj_{}", id),
            from_date: date("2024-03-01"),
            to_date: date("2024-03-31"),
            shifts: vec![Shift {
                employee_id: employee_id.to_string(),
                events,
                signed_dates: vec![],
            }],
        }
    }

    fn signed(mut event: Event, checkin: &str, checkout: &str) -> Event {
        event.checkin = Some(at(checkin));
        event.checkout = Some(at(checkout));
        event
    }

    fn two_weeks() -> DateWindow {
        DateWindow::new(date("2024-03-01"), date("2024-03-14"))
    }

    fn run(periods: &[Period], news: &[News]) -> EmployeeAggregate {
        let window = two_weeks();
        let weeks = bucket_into_weeks(window.from, window.to);
        aggregate_employee(
            Uuid::nil(),
            &employee(),
            &window,
            periods,
            &weeks,
            news,
            &LiquidationRules::default(),
        )
    }

    #[test]
    fn test_day_shift_scheduled_totals() {
        let periods = vec![period(
            "p1",
            "emp_001",
            vec![Event::scheduled("a", at("2024-03-04 08:00:00"), at("2024-03-04 20:00:00"))],
        )];

        let result = run(&periods, &[]);
        let scheduled = &result.settlement.scheduled;
        assert_eq!(scheduled.total, Decimal::from(12));
        assert_eq!(scheduled.by.day, Decimal::from(12));
        assert_eq!(scheduled.by.night, Decimal::ZERO);
        assert_eq!(result.settlement.signed.total, Decimal::ZERO);
    }

    #[test]
    fn test_overnight_shift_is_night_time() {
        let periods = vec![period(
            "p1",
            "emp_001",
            vec![Event::scheduled("n", at("2024-03-04 22:00:00"), at("2024-03-05 06:00:00"))],
        )];

        let result = run(&periods, &[]);
        assert_eq!(result.settlement.scheduled.by.night, Decimal::from(8));
        assert_eq!(result.settlement.scheduled.by.day, Decimal::ZERO);
    }

    #[test]
    fn test_shift_crossing_week_boundary_stays_in_start_week() {
        let periods = vec![period(
            "p1",
            "emp_001",
            vec![Event::scheduled("n", at("2024-03-07 22:00:00"), at("2024-03-08 06:00:00"))],
        )];

        let result = run(&periods, &[]);
        let weeks = &result.settlement.scheduled.by_week;
        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].total_hours, Decimal::from(8));
        assert_eq!(weeks[0].events.len(), 1);
        assert_eq!(weeks[1].total_hours, Decimal::ZERO);
        assert!(weeks[1].events.is_empty());
    }

    #[test]
    fn test_weekly_overtime_above_threshold() {
        let events = (4..=8)
            .map(|d| {
                Event::scheduled(
                    &format!("e{}", d),
                    at(&format!("2024-03-0{} 08:00:00", d)),
                    at(&format!("2024-03-0{} 20:00:00", d)),
                )
            })
            .collect();
        let periods = vec![period("p1", "emp_001", events)];

        let result = run(&periods, &[]);
        let scheduled = &result.settlement.scheduled;
        // 4-7 March in week one (48h), 8 March alone in week two
        assert_eq!(scheduled.by_week[0].total_hours, Decimal::from(48));
        assert_eq!(scheduled.by_week[0].total_extra_hours, Decimal::ZERO);
        assert_eq!(scheduled.by_week[1].total_hours, Decimal::from(12));
        assert_eq!(scheduled.extras, Decimal::ZERO);
        assert_eq!(scheduled.total, Decimal::from(60));
    }

    #[test]
    fn test_weekly_overtime_counts_excess() {
        let events = (1..=5)
            .map(|d| {
                Event::scheduled(
                    &format!("e{}", d),
                    at(&format!("2024-03-0{} 08:00:00", d)),
                    at(&format!("2024-03-0{} 20:00:00", d)),
                )
            })
            .collect();
        let periods = vec![period("p1", "emp_001", events)];

        let result = run(&periods, &[]);
        let scheduled = &result.settlement.scheduled;
        assert_eq!(scheduled.by_week[0].total_hours, Decimal::from(60));
        assert_eq!(scheduled.by_week[0].total_extra_hours, Decimal::from(12));
        assert_eq!(scheduled.extras, Decimal::from(12));
    }

    #[test]
    fn test_scheduled_weeks_use_whole_hours() {
        let events = (1..=5)
            .map(|d| {
                Event::scheduled(
                    &format!("e{}", d),
                    at(&format!("2024-03-0{} 08:00:00", d)),
                    at(&format!("2024-03-0{} 18:30:00", d)),
                )
            })
            .collect();
        let periods = vec![period("p1", "emp_001", events)];

        let result = run(&periods, &[]);
        let scheduled = &result.settlement.scheduled;
        // 5 x 10h30 counts as 5 x 10h
        assert_eq!(scheduled.total, Decimal::from(50));
        assert_eq!(scheduled.by_week[0].total_hours, scheduled.total);
        assert_eq!(scheduled.by_week[0].total_extra_hours, Decimal::from(2));
        assert_eq!(scheduled.extras, Decimal::from(2));
    }

    #[test]
    fn test_signed_time_rounded_once() {
        let events = vec![
            signed(
                Event::scheduled("a", at("2024-03-04 08:00:00"), at("2024-03-04 20:00:00")),
                "2024-03-04 08:00:00",
                "2024-03-04 20:20:00",
            ),
            signed(
                Event::scheduled("b", at("2024-03-05 08:00:00"), at("2024-03-05 20:00:00")),
                "2024-03-05 08:00:00",
                "2024-03-05 20:20:00",
            ),
        ];
        let periods = vec![period("p1", "emp_001", events)];

        let result = run(&periods, &[]);
        let totals = &result.settlement.signed;
        // 12h20 + 12h20 = 24h40, rounded once
        assert_eq!(totals.total, Decimal::from(25));
        assert_eq!(totals.by_week[0].total_hours, Decimal::new(2467, 2));
        assert_eq!(result.settlement.news.viaticos, 2);
    }

    #[test]
    fn test_signed_week_falls_back_to_scheduled_start() {
        let event = signed(
            Event::scheduled("a", at("2024-03-01 00:00:00"), at("2024-03-01 08:00:00")),
            "2024-02-29 23:50:00",
            "2024-03-01 08:00:00",
        );
        let periods = vec![period("p1", "emp_001", vec![event])];

        let result = run(&periods, &[]);
        let week = &result.settlement.signed.by_week[0];
        assert_eq!(week.events.len(), 1);
        assert_eq!(week.total_minutes, 490);
    }

    #[test]
    fn test_events_outside_range_and_other_employees_ignored() {
        let periods = vec![
            period(
                "p1",
                "emp_001",
                vec![
                    Event::scheduled("in", at("2024-03-04 08:00:00"), at("2024-03-04 16:00:00")),
                    Event::scheduled("out", at("2024-03-20 08:00:00"), at("2024-03-20 16:00:00")),
                ],
            ),
            period(
                "p2",
                "emp_002",
                vec![Event::scheduled("x", at("2024-03-04 08:00:00"), at("2024-03-04 16:00:00"))],
            ),
        ];

        let result = run(&periods, &[]);
        assert_eq!(result.settlement.scheduled.total, Decimal::from(8));
        assert_eq!(result.signed_by_period.len(), 1);
    }

    #[test]
    fn test_signed_by_period_per_period() {
        let periods = vec![
            period(
                "p1",
                "emp_001",
                vec![signed(
                    Event::scheduled("a", at("2024-03-04 08:00:00"), at("2024-03-04 16:00:00")),
                    "2024-03-04 08:05:00",
                    "2024-03-04 16:00:00",
                )],
            ),
            period(
                "p2",
                "emp_001",
                vec![Event::scheduled("b", at("2024-03-05 08:00:00"), at("2024-03-05 12:00:00"))],
            ),
        ];

        let result = run(&periods, &[]);
        let records = &result.signed_by_period;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].period_id, "p1");
        assert_eq!(records[0].objective_id, "obj_p1");
        assert_eq!(records[0].scheduled_hours, Decimal::from(8));
        assert_eq!(records[0].signed_hours, Decimal::from(8));
        assert_eq!(records[1].scheduled_hours, Decimal::from(4));
        assert_eq!(records[1].signed_hours, Decimal::ZERO);
    }

    #[test]
    fn test_news_summary_is_merged() {
        let periods = vec![period(
            "p1",
            "emp_001",
            vec![Event::scheduled("a", at("2024-03-04 08:00:00"), at("2024-03-04 20:00:00"))],
        )];
        let holiday = News {
            id: "h1".to_string(),
            category: NewsCategory::Feriado,
            date_from: date("2024-03-04"),
            date_to: date("2024-03-04"),
            employee_id: None,
            employee_ids: vec![],
            reason: None,
            amount: None,
            training_hours: None,
            worked_hours: Decimal::ZERO,
            assigned_hours: Decimal::ZERO,
        };

        let result = run(&periods, &[holiday]);
        assert_eq!(
            result.settlement.news.hours(NewsCategory::Feriado),
            Decimal::from(12)
        );
        assert!(result.accruals.contains_key("h1"));
        assert_eq!(result.settlement.news.presentismo, 100);
    }

    #[test]
    fn test_skeleton_is_not_shared() {
        let window = two_weeks();
        let weeks = bucket_into_weeks(window.from, window.to);
        let periods = vec![period(
            "p1",
            "emp_001",
            vec![Event::scheduled("a", at("2024-03-04 08:00:00"), at("2024-03-04 20:00:00"))],
        )];

        let _ = aggregate_employee(
            Uuid::nil(),
            &employee(),
            &window,
            &periods,
            &weeks,
            &[],
            &LiquidationRules::default(),
        );
        assert!(weeks.iter().all(|w| w.total_minutes == 0 && w.events.is_empty()));
    }
}
