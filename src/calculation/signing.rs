//! Matching clock signals to scheduled events.
//!
//! This module holds the pure part of signing: gathering the events a
//! signal could belong to, choosing the closest one, and deciding whether the
//! signal is a check-in or a check-out. Store access lives in
//! [`crate::service::SigningReconciler`].

use std::fmt;

use chrono::{Days, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{CorrectionFlags, Event, EventPatch, Period};

/// Whether a signal was recorded as an entry or an exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SigningKind {
    /// The signal set the event's check-in.
    #[serde(rename = "Entrada")]
    CheckIn,
    /// The signal set the event's check-out.
    #[serde(rename = "Salida")]
    CheckOut,
}

impl fmt::Display for SigningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SigningKind::CheckIn => write!(f, "Entrada"),
            SigningKind::CheckOut => write!(f, "Salida"),
        }
    }
}

/// An event a signal may resolve to, with the period that owns it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// The owning period.
    pub period_id: String,
    /// The owning period's objective.
    pub objective_id: String,
    /// The event.
    pub event: Event,
}

/// Collects the employee's events whose scheduled interval touches the
/// signal's date or one of the `adjacent_days` around it.
///
/// Candidates are returned ordered by scheduled start.
pub fn collect_candidates(
    periods: &[Period],
    employee_id: &str,
    timestamp: NaiveDateTime,
    adjacent_days: u32,
) -> Vec<Candidate> {
    let date = timestamp.date();
    let margin = Days::new(u64::from(adjacent_days));
    let earliest = date.checked_sub_days(margin).unwrap_or(date);
    let latest = date.checked_add_days(margin).unwrap_or(date);

    let mut candidates: Vec<Candidate> = periods
        .iter()
        .filter_map(|period| period.shift_for(employee_id).map(|shift| (period, shift)))
        .flat_map(|(period, shift)| {
            shift
                .events
                .iter()
                .filter(move |event| {
                    event.scheduled_from.date() <= latest && event.scheduled_to.date() >= earliest
                })
                .map(move |event| Candidate {
                    period_id: period.id.clone(),
                    objective_id: period.objective_id.clone(),
                    event: event.clone(),
                })
        })
        .collect();

    candidates.sort_by_key(|c| c.event.scheduled_from);
    candidates
}

/// Chooses the candidate a signal belongs to.
///
/// Candidates are walked in order while tracking the current best and its
/// distance from the signal to its scheduled end. A later candidate takes over
/// when its distance to its scheduled start is less than or equal to that
/// distance, so a signal equidistant between the end of one shift and the
/// start of the next is taken as an entry into the next.
///
/// # Example
///
/// ```
/// use liquidation_engine::calculation::{select_closest_event, Candidate};
/// use liquidation_engine::models::Event;
/// use chrono::NaiveDateTime;
///
/// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
/// let candidate = |id: &str, from: &str, to: &str| Candidate {
///     period_id: "per_1".to_string(),
///     objective_id: "obj_1".to_string(),
///     event: Event::scheduled(id, at(from), at(to)),
/// };
/// let candidates = vec![
///     candidate("night", "2024-03-03 22:00:00", "2024-03-04 06:00:00"),
///     candidate("morning", "2024-03-04 06:30:00", "2024-03-04 14:00:00"),
/// ];
///
/// let chosen = select_closest_event(&candidates, at("2024-03-04 06:10:00")).unwrap();
/// assert_eq!(chosen.event.id, "night");
/// ```
pub fn select_closest_event(
    candidates: &[Candidate],
    timestamp: NaiveDateTime,
) -> Option<&Candidate> {
    let mut best: Option<(&Candidate, i64)> = None;

    for candidate in candidates {
        let to_start = (timestamp - candidate.event.scheduled_from)
            .num_seconds()
            .abs();
        let to_end = (timestamp - candidate.event.scheduled_to).num_seconds().abs();

        match best {
            Some((_, best_to_end)) if to_start > best_to_end => {}
            _ => best = Some((candidate, to_end)),
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// Decides how a signal changes the chosen event.
///
/// An event without check-in gets one. Otherwise the signal becomes the
/// check-out when none is recorded or when it is at or after the recorded one;
/// overwriting a check-out marks it as corrected. A signal earlier than the
/// recorded check-out is rejected with [`EngineError::StaleSignal`].
pub fn apply_signal(
    event: &Event,
    timestamp: NaiveDateTime,
) -> EngineResult<(EventPatch, SigningKind)> {
    if event.checkin.is_none() {
        let patch = EventPatch {
            checkin: Some(timestamp),
            ..EventPatch::default()
        };
        return Ok((patch, SigningKind::CheckIn));
    }

    match event.checkout {
        None => Ok((
            EventPatch {
                checkout: Some(timestamp),
                ..EventPatch::default()
            },
            SigningKind::CheckOut,
        )),
        Some(checkout) if timestamp >= checkout => Ok((
            EventPatch {
                checkout: Some(timestamp),
                corrections: Some(CorrectionFlags {
                    checkout: true,
                    ..event.corrections
                }),
                ..EventPatch::default()
            },
            SigningKind::CheckOut,
        )),
        Some(_) => Err(EngineError::StaleSignal {
            event_id: event.id.clone(),
            timestamp,
        }),
    }
}
