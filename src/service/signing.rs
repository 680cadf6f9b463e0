//! The signing use case: one clock signal, one event update.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculation::{SigningKind, apply_signal, collect_candidates, select_closest_event};
use crate::config::SigningConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, Event, Period};
use crate::store::{EmployeeDirectory, Notification, Notifier, PeriodStore};

/// A physical clock signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningSignal {
    /// The work site the reader belongs to.
    pub objective_id: String,
    /// The badge that was read.
    pub badge_id: String,
    /// When the badge was read, in local time.
    pub timestamp: NaiveDateTime,
}

/// The result of a successful signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningOutcome {
    /// The event after the update.
    pub event: Event,
    /// Whether the signal was recorded as check-in or check-out.
    pub kind: SigningKind,
    /// The period owning the event.
    pub period_id: String,
    /// The employee the badge belongs to.
    pub employee_id: String,
}

/// Matches clock signals to scheduled events and records them.
///
/// Two signals for the same employee processed at the same time may both
/// read the event before either writes; the last write wins.
pub struct SigningReconciler {
    periods: Arc<dyn PeriodStore>,
    employees: Arc<dyn EmployeeDirectory>,
    notifier: Arc<dyn Notifier>,
    config: SigningConfig,
}

impl SigningReconciler {
    /// Creates a reconciler over the given ports.
    pub fn new(
        periods: Arc<dyn PeriodStore>,
        employees: Arc<dyn EmployeeDirectory>,
        notifier: Arc<dyn Notifier>,
        config: SigningConfig,
    ) -> Self {
        Self {
            periods,
            employees,
            notifier,
            config,
        }
    }

    /// Records a signal on the closest scheduled event of the badge's owner.
    ///
    /// Exactly one event is updated on success; none on failure. Both
    /// outcomes are sent to the notifier.
    pub async fn sign(&self, signal: &SigningSignal) -> EngineResult<SigningOutcome> {
        let result = self.reconcile(signal).await;

        match &result {
            Ok(outcome) => {
                info!(
                    objective_id = %signal.objective_id,
                    employee_id = %outcome.employee_id,
                    event_id = %outcome.event.id,
                    kind = %outcome.kind,
                    "Signal recorded"
                );
                self.send(Notification::EventUpdated {
                    event: outcome.event.clone(),
                })
                .await;
                self.send(Notification::SigningResult(Ok(outcome.kind))).await;
            }
            Err(err) => {
                warn!(
                    objective_id = %signal.objective_id,
                    badge_id = %signal.badge_id,
                    timestamp = %signal.timestamp,
                    error = %err,
                    "Signal rejected"
                );
                self.send(Notification::SigningResult(Err(err.to_string())))
                    .await;
            }
        }

        result
    }

    async fn reconcile(&self, signal: &SigningSignal) -> EngineResult<SigningOutcome> {
        let employee = self
            .employees
            .find_by_badge(&signal.badge_id)
            .await?
            .ok_or_else(|| EngineError::not_found("badge", &signal.badge_id))?;

        let periods = self
            .candidate_periods(&signal.objective_id, signal.timestamp.date())
            .await?;
        let no_schedule = || no_schedule_found(&employee, signal.timestamp);

        let candidates = collect_candidates(
            &periods,
            &employee.id,
            signal.timestamp,
            self.config.adjacent_days,
        );
        let chosen = select_closest_event(&candidates, signal.timestamp).ok_or_else(no_schedule)?;

        let (patch, kind) = apply_signal(&chosen.event, signal.timestamp)?;
        let event = self
            .periods
            .update_event_in_shift(&chosen.period_id, &employee.id, &chosen.event.id, &patch)
            .await?;
        self.periods
            .record_signed_date(&chosen.period_id, &employee.id, signal.timestamp.date())
            .await?;

        Ok(SigningOutcome {
            event,
            kind,
            period_id: chosen.period_id.clone(),
            employee_id: employee.id,
        })
    }

    /// The period covering `date` and, early in a cycle or when nothing covers
    /// `date`, the period right before it.
    async fn candidate_periods(
        &self,
        objective_id: &str,
        date: NaiveDate,
    ) -> EngineResult<Vec<Period>> {
        let covering = self.periods.find_covering(objective_id, date).await?;

        let lookback = i64::from(self.config.lookback_days);
        let preceding_before = match &covering {
            None => Some(date),
            Some(period) if (date - period.from_date).num_days() < lookback => {
                Some(period.from_date)
            }
            Some(_) => None,
        };
        let preceding = match preceding_before {
            Some(before) => self.periods.find_preceding(objective_id, before).await?,
            None => None,
        };

        Ok(preceding.into_iter().chain(covering).collect())
    }

    async fn send(&self, notification: Notification) {
        if let Err(err) = self.notifier.notify(notification).await {
            warn!(error = %err, "Notification not delivered");
        }
    }
}

fn no_schedule_found(employee: &Employee, timestamp: NaiveDateTime) -> EngineError {
    EngineError::NoScheduleFound {
        employee_id: employee.id.clone(),
        timestamp,
    }
}
