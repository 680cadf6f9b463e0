//! Event model and related types.
//!
//! An [`Event`] is one scheduled guard duty occurrence. It carries the
//! scheduled interval and, once the guard has signed, the actual check-in
//! and check-out instants.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Marks which signed instants were overwritten after first being recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionFlags {
    /// The check-in was corrected by an operator edit made outside signing.
    ///
    /// Signals never overwrite a recorded check-in, so only stored events set
    /// this flag; signing carries it over unchanged.
    #[serde(default)]
    pub checkin: bool,
    /// The check-out was corrected by a later signal.
    #[serde(default)]
    pub checkout: bool,
}

/// Presentation data carried along for calendar views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDisplay {
    /// Short label shown on the calendar.
    #[serde(default)]
    pub title: String,
    /// Optional colour used to render the event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Represents one scheduled occurrence of a guard shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Stable identifier used for targeted updates.
    pub id: String,
    /// Scheduled start.
    pub scheduled_from: NaiveDateTime,
    /// Scheduled end.
    pub scheduled_to: NaiveDateTime,
    /// Actual entry, absent until signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkin: Option<NaiveDateTime>,
    /// Actual exit, absent until signed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout: Option<NaiveDateTime>,
    /// Which signed instants were corrected.
    #[serde(default)]
    pub corrections: CorrectionFlags,
    /// Calendar presentation data.
    #[serde(default)]
    pub display: EventDisplay,
}

impl Event {
    /// Creates an unsigned event for the given scheduled interval.
    pub fn scheduled(
        id: impl Into<String>,
        scheduled_from: NaiveDateTime,
        scheduled_to: NaiveDateTime,
    ) -> Self {
        Self {
            id: id.into(),
            scheduled_from,
            scheduled_to,
            checkin: None,
            checkout: None,
            corrections: CorrectionFlags::default(),
            display: EventDisplay::default(),
        }
    }

    /// Returns the signed interval if both check-in and check-out are present.
    ///
    /// # Examples
    ///
    /// ```
    /// use liquidation_engine::models::Event;
    /// use chrono::NaiveDateTime;
    ///
    /// let at = |s: &str| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    /// let mut event = Event::scheduled("ev_1", at("2024-03-04 08:00:00"), at("2024-03-04 20:00:00"));
    /// assert!(event.signed_interval().is_none());
    ///
    /// event.checkin = Some(at("2024-03-04 07:55:00"));
    /// event.checkout = Some(at("2024-03-04 20:05:00"));
    /// assert_eq!(
    ///     event.signed_interval(),
    ///     Some((at("2024-03-04 07:55:00"), at("2024-03-04 20:05:00")))
    /// );
    /// ```
    pub fn signed_interval(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.checkin, self.checkout) {
            (Some(checkin), Some(checkout)) => Some((checkin, checkout)),
            _ => None,
        }
    }

    /// Returns true once the guard has checked in.
    pub fn is_signed_in(&self) -> bool {
        self.checkin.is_some()
    }
}

/// A partial update to an [`Event`], applied atomically by the period store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    /// New check-in, if it changes.
    pub checkin: Option<NaiveDateTime>,
    /// New check-out, if it changes.
    pub checkout: Option<NaiveDateTime>,
    /// Replacement correction flags, if they change.
    pub corrections: Option<CorrectionFlags>,
}

impl EventPatch {
    /// Writes the present fields onto `event`.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(checkin) = self.checkin {
            event.checkin = Some(checkin);
        }
        if let Some(checkout) = self.checkout {
            event.checkout = Some(checkout);
        }
        if let Some(corrections) = self.corrections {
            event.corrections = corrections;
        }
    }
}

/// An event annotated with the work site and period it belongs to.
///
/// Settlement weeks keep these so a reader can trace every hour back to its
/// origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventWithObjective {
    /// The objective (work site) of the owning period.
    pub objective_id: String,
    /// The owning period.
    pub period_id: String,
    /// The event itself.
    #[serde(flatten)]
    pub event: Event,
}
