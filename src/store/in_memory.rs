//! In-memory implementations of the store ports.
//!
//! Every adapter keeps its data behind a `tokio::sync::RwLock`. A write lock
//! is held for the whole of each mutating call, so each call is atomic with
//! respect to the others on the same adapter.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::calculation::overlaps;
use crate::models::{
    DateWindow, Employee, Event, EventPatch, Liquidation, News, NewsAccrual, Period, Settlement,
    SignedByPeriod,
};

use super::{
    AuditEntry, AuditLog, EmployeeDirectory, LiquidationStore, NewsStore, Notification, Notifier,
    PeriodStore, StoreError,
};

/// Periods kept in a vector.
#[derive(Debug, Default)]
pub struct InMemoryPeriodStore {
    periods: RwLock<Vec<Period>>,
}

impl InMemoryPeriodStore {
    /// Creates a store holding the given periods.
    pub fn with_periods(periods: Vec<Period>) -> Self {
        Self {
            periods: RwLock::new(periods),
        }
    }

    /// Returns a copy of a period by id.
    pub async fn get(&self, period_id: &str) -> Option<Period> {
        self.periods
            .read()
            .await
            .iter()
            .find(|p| p.id == period_id)
            .cloned()
    }
}

#[async_trait]
impl PeriodStore for InMemoryPeriodStore {
    async fn find_overlapping(&self, window: &DateWindow) -> Result<Vec<Period>, StoreError> {
        let guard = self.periods.read().await;
        Ok(guard
            .iter()
            .filter(|p| overlaps(window, &p.window()))
            .cloned()
            .collect())
    }

    async fn find_covering(
        &self,
        objective_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Period>, StoreError> {
        let guard = self.periods.read().await;
        Ok(guard
            .iter()
            .find(|p| p.objective_id == objective_id && p.contains_date(date))
            .cloned())
    }

    async fn find_preceding(
        &self,
        objective_id: &str,
        date: NaiveDate,
    ) -> Result<Option<Period>, StoreError> {
        let guard = self.periods.read().await;
        Ok(guard
            .iter()
            .filter(|p| p.objective_id == objective_id && p.to_date < date)
            .max_by_key(|p| p.to_date)
            .cloned())
    }

    async fn update_event_in_shift(
        &self,
        period_id: &str,
        employee_id: &str,
        event_id: &str,
        patch: &EventPatch,
    ) -> Result<Event, StoreError> {
        let mut guard = self.periods.write().await;
        let event = guard
            .iter_mut()
            .find(|p| p.id == period_id)
            .and_then(|p| p.shift_for_mut(employee_id))
            .and_then(|s| s.event_mut(event_id))
            .ok_or_else(|| StoreError::MissingEvent {
                period_id: period_id.to_string(),
                employee_id: employee_id.to_string(),
                event_id: event_id.to_string(),
            })?;
        patch.apply_to(event);
        Ok(event.clone())
    }

    async fn record_signed_date(
        &self,
        period_id: &str,
        employee_id: &str,
        date: NaiveDate,
    ) -> Result<(), StoreError> {
        let mut guard = self.periods.write().await;
        let shift = guard
            .iter_mut()
            .find(|p| p.id == period_id)
            .and_then(|p| p.shift_for_mut(employee_id))
            .ok_or_else(|| {
                StoreError::Backend(format!(
                    "no shift for employee '{}' in period '{}'",
                    employee_id, period_id
                ))
            })?;
        shift.record_signed_date(date);
        Ok(())
    }

    async fn insert(&self, period: Period) -> Result<(), StoreError> {
        self.periods.write().await.push(period);
        Ok(())
    }
}

/// News records kept in a vector.
#[derive(Debug, Default)]
pub struct InMemoryNewsStore {
    news: RwLock<Vec<News>>,
}

impl InMemoryNewsStore {
    /// Creates a store holding the given news.
    pub fn with_news(news: Vec<News>) -> Self {
        Self {
            news: RwLock::new(news),
        }
    }

    /// Returns a copy of a news record by id.
    pub async fn get(&self, news_id: &str) -> Option<News> {
        self.news
            .read()
            .await
            .iter()
            .find(|n| n.id == news_id)
            .cloned()
    }
}

#[async_trait]
impl NewsStore for InMemoryNewsStore {
    async fn find_for_employee(
        &self,
        employee_id: &str,
        window: &DateWindow,
    ) -> Result<Vec<News>, StoreError> {
        let guard = self.news.read().await;
        Ok(guard
            .iter()
            .filter(|n| n.applies_to(employee_id) && overlaps(window, &n.window()))
            .cloned()
            .collect())
    }

    async fn apply_accruals(
        &self,
        accruals: &BTreeMap<String, NewsAccrual>,
    ) -> Result<(), StoreError> {
        let mut guard = self.news.write().await;
        for news in guard.iter_mut() {
            if let Some(accrual) = accruals.get(&news.id) {
                news.assigned_hours = accrual.assigned_hours;
                news.worked_hours = accrual.worked_hours;
            }
        }
        Ok(())
    }

    async fn insert(&self, news: News) -> Result<(), StoreError> {
        self.news.write().await.push(news);
        Ok(())
    }
}

/// Employees indexed by id.
#[derive(Debug, Default)]
pub struct InMemoryEmployeeDirectory {
    employees: RwLock<HashMap<String, Employee>>,
}

impl InMemoryEmployeeDirectory {
    /// Creates a directory holding the given employees.
    pub fn with_employees(employees: Vec<Employee>) -> Self {
        Self {
            employees: RwLock::new(employees.into_iter().map(|e| (e.id.clone(), e)).collect()),
        }
    }
}

#[async_trait]
impl EmployeeDirectory for InMemoryEmployeeDirectory {
    async fn find_by_id(&self, employee_id: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self.employees.read().await.get(employee_id).cloned())
    }

    async fn find_by_badge(&self, badge_id: &str) -> Result<Option<Employee>, StoreError> {
        Ok(self
            .employees
            .read()
            .await
            .values()
            .find(|e| e.badge_id == badge_id)
            .cloned())
    }
}

#[derive(Debug, Default)]
struct LiquidationTables {
    runs: HashMap<Uuid, Liquidation>,
    settlements: Vec<Settlement>,
    signed_by_period: Vec<SignedByPeriod>,
}

/// Liquidation runs and their dependent records.
#[derive(Debug, Default)]
pub struct InMemoryLiquidationStore {
    tables: RwLock<LiquidationTables>,
}

impl InMemoryLiquidationStore {
    /// Total settlements across all runs.
    pub async fn settlement_count(&self) -> usize {
        self.tables.read().await.settlements.len()
    }

    /// Total signed-by-period records across all runs.
    pub async fn signed_by_period_count(&self) -> usize {
        self.tables.read().await.signed_by_period.len()
    }
}

#[async_trait]
impl LiquidationStore for InMemoryLiquidationStore {
    async fn find_run(&self, id: Uuid) -> Result<Option<Liquidation>, StoreError> {
        Ok(self.tables.read().await.runs.get(&id).cloned())
    }

    async fn insert_run(
        &self,
        run: Liquidation,
        settlements: Vec<Settlement>,
        signed_by_period: Vec<SignedByPeriod>,
    ) -> Result<(), StoreError> {
        let mut guard = self.tables.write().await;
        if guard.runs.contains_key(&run.id) {
            return Err(StoreError::Backend(format!(
                "liquidation '{}' already exists",
                run.id
            )));
        }
        guard.settlements.extend(settlements);
        guard.signed_by_period.extend(signed_by_period);
        guard.runs.insert(run.id, run);
        Ok(())
    }

    async fn delete_run_cascade(&self, id: Uuid) -> Result<(), StoreError> {
        let mut guard = self.tables.write().await;
        guard.runs.remove(&id);
        guard.settlements.retain(|s| s.liquidation_id != id);
        guard.signed_by_period.retain(|r| r.liquidation_id != id);
        Ok(())
    }

    async fn settlements_for_run(&self, id: Uuid) -> Result<Vec<Settlement>, StoreError> {
        let guard = self.tables.read().await;
        Ok(guard
            .settlements
            .iter()
            .filter(|s| s.liquidation_id == id)
            .cloned()
            .collect())
    }

    async fn signed_by_period_for_run(
        &self,
        id: Uuid,
    ) -> Result<Vec<SignedByPeriod>, StoreError> {
        let guard = self.tables.read().await;
        Ok(guard
            .signed_by_period
            .iter()
            .filter(|r| r.liquidation_id == id)
            .cloned()
            .collect())
    }
}

/// Keeps every notification it receives.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: RwLock<Vec<Notification>>,
}

impl RecordingNotifier {
    /// Notifications received so far, oldest first.
    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.read().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), StoreError> {
        self.sent.write().await.push(notification);
        Ok(())
    }
}

/// Keeps every audit entry it receives.
#[derive(Debug, Default)]
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditLog {
    /// Entries recorded so far, oldest first.
    pub async fn entries(&self) -> Vec<AuditEntry> {
        self.entries.read().await.clone()
    }
}

#[async_trait]
impl AuditLog for InMemoryAuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<(), StoreError> {
        self.entries.write().await.push(entry);
        Ok(())
    }
}
