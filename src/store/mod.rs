//! Ports to the persistence layer and the outside collaborators.
//!
//! The engine never talks to a database, a broadcast channel or an audit
//! sink directly. It codes against the traits below and receives concrete
//! implementations as `Arc<dyn ...>` at construction time.
//!
//! [`in_memory`] provides `RwLock`-backed implementations for tests and
//! local runs.

pub mod in_memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::calculation::SigningKind;
use crate::models::{
    DateWindow, Employee, Event, EventPatch, Liquidation, News, NewsAccrual, Period, Settlement,
    SignedByPeriod,
};

pub use in_memory::{
    InMemoryAuditLog, InMemoryEmployeeDirectory, InMemoryLiquidationStore, InMemoryNewsStore,
    InMemoryPeriodStore, RecordingNotifier,
};

/// Failures reported by a port implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The targeted event does not exist in the given period and shift.
    #[error("event '{event_id}' not found for employee '{employee_id}' in period '{period_id}'")]
    MissingEvent {
        /// The period searched.
        period_id: String,
        /// The employee whose shift was searched.
        employee_id: String,
        /// The event that was not found.
        event_id: String,
    },

    /// The backend failed.
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Periods with their shifts and events.
#[async_trait]
pub trait PeriodStore: Send + Sync {
    /// Every period whose date range overlaps `window`, across all objectives.
    async fn find_overlapping(&self, window: &DateWindow) -> Result<Vec<Period>, StoreError>;

    /// The period of an objective whose range contains `date`.
    async fn find_covering(
        &self,
        objective_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Period>, StoreError>;

    /// The latest period of an objective that ends before `date`.
    async fn find_preceding(
        &self,
        objective_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Period>, StoreError>;

    /// Applies `patch` to one event of one employee's shift, atomically, and
    /// returns the updated event.
    async fn update_event_in_shift(
        &self,
        period_id: &str,
        employee_id: &str,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<Event, StoreError>;

    /// Adds `date` to the shift's signed dates unless already present.
    async fn record_signed_date(
        &self,
        period_id: &str,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<(), StoreError>;

    /// Stores a new period.
    async fn insert(&self, period: Period) -> Result<(), StoreError>;
}

/// News records.
#[async_trait]
pub trait NewsStore: Send + Sync {
    /// News applicable to the employee whose range overlaps `window`.
    async fn find_for_employee(
        &self,
        employee_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<News>, StoreError>;

    /// Sets the derived hours of every listed news record in one step.
    ///
    /// Existing values are replaced, not added to.
    async fn apply_accruals(
        &self,
        accruals: &BTreeMap<String, NewsAccrual>,
    ) -> Result<(), StoreError>;

    /// Stores a new news record.
    async fn insert(&self, news: News) -> Result<(), StoreError>;
}

/// Read-only employee lookups.
#[async_trait]
pub trait EmployeeDirectory: Send + Sync {
    /// Looks up an employee by id.
    async fn find_by_id(&self, employee_id: &str) -> Result<Option<Employee>, StoreError>;

    /// Looks up an employee by badge id.
    async fn find_by_badge(&self, badge_id: &str) -> Result<Option<Employee>, StoreError>;
}

/// Liquidation runs and their dependent records.
#[async_trait]
pub trait LiquidationStore: Send + Sync {
    /// Looks up a run by id.
    async fn find_run(&self, id: Uuid) -> Result<Option<Liquidation>, StoreError>;

    /// Stores a run together with its settlements and signed-by-period records.
    async fn insert_run(
        &self,
        run: Liquidation,
        settlements: Vec<Settlement>,
        signed_by_period: Vec<SignedByPeriod>,
    ) -> Result<(), StoreError>;

    /// Deletes a run, its settlements and its signed-by-period records.
    async fn delete_run_cascade(&self, id: Uuid) -> Result<(), StoreError>;

    /// The settlements of a run, in insertion order.
    async fn settlements_for_run(&self, id: Uuid) -> Result<Vec<Settlement>, StoreError>;

    /// The signed-by-period records of a run.
    async fn signed_by_period_for_run(&self, id: Uuid)
    -> Result<Vec<SignedByPeriod>, StoreError>;
}

/// A message for the real-time fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Notification {
    /// An event changed after a signal.
    EventUpdated {
        /// The event after the change.
        event: Event,
    },
    /// The outcome of a signal: the kind recorded or an error message.
    SigningResult(Result<SigningKind, String>),
}

/// Delivers notifications.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Sends one notification.
    async fn notify(&self, notification: Notification) -> Result<(), StoreError>;
}

/// One audit log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The user who performed the operation.
    pub actor_user_id: String,
    /// What was done, e.g. `create`.
    pub verb: String,
    /// The kind of resource affected.
    pub resource_type: String,
    /// Free-text description.
    pub description: String,
}

/// Records audit entries.
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Records one entry.
    async fn record(&self, entry: AuditEntry) -> Result<(), StoreError>;
}
