//! News proration and presentismo scoring.
//!
//! This module turns the news records applicable to one employee into the
//! totals a settlement needs:
//!
//! - **Hour categories** (holiday, suspension, justified and unjustified
//!   leave, workers' comp): overlap hours between each news and each event,
//!   using the three-case rule of [`clamp_overlap_minutes`]. Holidays are
//!   summed in minutes and rounded once; the others are truncated to whole
//!   hours per news/event pair.
//! - **Working days**: the distinct event start dates with any overlap.
//! - **Amounts** (advance, responsibility bonus, garnishment): summed when the
//!   news starts inside the range.
//! - **Day categories** (vacation, unpaid leave): days shared with the range.
//! - **Leave by reason**, **training hours**, **viaticos** and **presentismo**.
//!
//! Nothing is mutated: the per-news hour accruals are returned alongside the
//! summary and applied by the caller once the whole run has succeeded.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::config::PresentismoConfig;
use crate::models::{
    DateWindow, Event, LeaveReason, News, NewsAccrual, NewsCategory, NewsSummary,
};

use super::time_window::{
    clamp_overlap_minutes, minutes_to_hours, overlaps, round_hours, whole_hours,
};

/// The outcome of prorating one employee's news.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewsProration {
    /// Totals to embed in the settlement.
    pub summary: NewsSummary,
    /// Derived hours per consumed news id.
    pub accruals: BTreeMap<String, NewsAccrual>,
}

/// Tracks consumed news ids in first-seen order.
#[derive(Default)]
struct Consumed {
    ids: Vec<String>,
    seen: BTreeSet<String>,
}

impl Consumed {
    fn mark(&mut self, news: &News) {
        if self.seen.insert(news.id.clone()) {
            self.ids.push(news.id.clone());
        }
    }
}

/// Prorates every applicable news record against the employee's events.
///
/// `events` are the employee's events already restricted to the settlement
/// range; `news` may contain records for other employees or outside the
/// range, which are ignored.
///
/// # Example
///
/// ```
/// use liquidation_engine::calculation::prorate_news;
/// use liquidation_engine::config::PresentismoConfig;
/// use liquidation_engine::models::{DateWindow, Event, News, NewsCategory};
/// use chrono::{NaiveDate, NaiveDateTime};
/// use rust_decimal::Decimal;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let day = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
///
/// let holiday = News {
///     id: "news_1".to_string(),
///     category: NewsCategory::Feriado,
///     date_from: day("2024-03-01"),
///     date_to: day("2024-03-05"),
///     employee_id: None,
///     employee_ids: vec![],
///     reason: None,
///     amount: None,
///     training_hours: None,
///     worked_hours: Decimal::ZERO,
///     assigned_hours: Decimal::ZERO,
/// };
/// let events = vec![Event::scheduled("ev_1", at("2024-03-04 08:00:00"), at("2024-03-04 20:00:00"))];
///
/// let result = prorate_news(
///     "emp_001",
///     &DateWindow::new(day("2024-03-01"), day("2024-03-31")),
///     &events,
///     &[holiday],
///     &PresentismoConfig::default(),
/// );
/// assert_eq!(result.summary.hours(NewsCategory::Feriado), Decimal::from(12));
/// ```
pub fn prorate_news(
    employee_id: &str,
    window: &DateWindow,
    events: &[Event],
    news: &[News],
    presentismo: &PresentismoConfig,
) -> NewsProration {
    let applicable: Vec<&News> = news
        .iter()
        .filter(|n| n.applies_to(employee_id) && overlaps(window, &n.window()))
        .collect();

    let mut summary = empty_summary();
    let mut accruals: BTreeMap<String, NewsAccrual> = BTreeMap::new();
    let mut consumed = Consumed::default();

    for category in NewsCategory::HOUR_PRORATED {
        let mut category_minutes = 0i64;
        let mut category_hours = Decimal::ZERO;
        let mut days = BTreeSet::new();

        for record in applicable.iter().filter(|n| n.category == category) {
            let news_window = record.window();
            for event in events {
                let minutes =
                    clamp_overlap_minutes(&news_window, event.scheduled_from, event.scheduled_to);
                if minutes == 0 {
                    continue;
                }

                category_minutes += minutes;
                category_hours += whole_hours(minutes);
                days.insert(event.scheduled_from.date());

                if let (NewsCategory::LicJustificada, Some(reason)) = (category, record.reason) {
                    *summary
                        .leave_by_reason
                        .entry(reason)
                        .or_insert(Decimal::ZERO) += whole_hours(minutes);
                }

                let worked_minutes = event
                    .signed_interval()
                    .map(|(checkin, checkout)| {
                        clamp_overlap_minutes(&news_window, checkin, checkout)
                    })
                    .unwrap_or(0);
                *accruals.entry(record.id.clone()).or_default() += NewsAccrual {
                    assigned_hours: minutes_to_hours(minutes),
                    worked_hours: minutes_to_hours(worked_minutes),
                };
                consumed.mark(record);
            }
        }

        let hours = if category == NewsCategory::Feriado {
            round_hours(category_minutes)
        } else {
            category_hours
        };
        summary.hours_by_category.insert(category, hours);
        summary
            .working_days_by_category
            .insert(category, days.into_iter().collect());
    }

    for category in NewsCategory::AMOUNT {
        let mut total = Decimal::ZERO;
        for record in applicable
            .iter()
            .filter(|n| n.category == category && window.contains_date(n.date_from))
        {
            total += record.amount.unwrap_or(Decimal::ZERO);
            consumed.mark(record);
        }
        summary.amounts.insert(category, total);
    }

    for category in NewsCategory::DAY_PRORATED {
        let mut total = 0i64;
        for record in applicable.iter().filter(|n| n.category == category) {
            let days = record.window().overlap_days(window);
            if days > 0 {
                total += days;
                consumed.mark(record);
            }
        }
        summary.days_by_category.insert(category, total);
    }

    for record in applicable
        .iter()
        .filter(|n| n.category == NewsCategory::Capacitaciones)
    {
        summary.training_hours += record.training_hours.unwrap_or(Decimal::ZERO);
        consumed.mark(record);
    }

    let voided = applicable.iter().any(|n| n.category.voids_presentismo());
    summary.viaticos = events.iter().filter(|e| e.is_signed_in()).count() as u32;
    summary.presentismo = presentismo_score(
        presentismo,
        voided,
        summary.working_days(NewsCategory::LicJustificada),
    );
    summary.news_ids = consumed.ids;

    NewsProration { summary, accruals }
}

/// Computes the presentismo score.
///
/// Any suspension or unjustified leave zeroes the score. Otherwise the base
/// score is reduced by the deduction of the highest step whose `min_days` is
/// reached by the number of justified-leave working days.
///
/// # Example
///
/// ```
/// use liquidation_engine::calculation::presentismo_score;
/// use liquidation_engine::config::PresentismoConfig;
///
/// let config = PresentismoConfig::default();
/// assert_eq!(presentismo_score(&config, false, 1), 100);
/// assert_eq!(presentismo_score(&config, false, 3), 80);
/// assert_eq!(presentismo_score(&config, true, 0), 0);
/// ```
pub fn presentismo_score(config: &PresentismoConfig, voided: bool, justified_days: usize) -> u8 {
    if voided {
        return 0;
    }
    let deduction = config
        .deductions
        .iter()
        .filter(|step| justified_days >= step.min_days)
        .map(|step| step.deduction)
        .max()
        .unwrap_or(0);
    config.base_score.saturating_sub(deduction)
}

/// A summary with every category and reason present at zero.
fn empty_summary() -> NewsSummary {
    let mut summary = NewsSummary::default();
    for reason in LeaveReason::ALL {
        summary.leave_by_reason.insert(reason, Decimal::ZERO);
    }
    summary
}
