//! The liquidation use case: settle a set of employees over a date range.
//!
//! A run resolves every Period overlapping the range, aggregates each
//! employee on its own task (bounded by the configured worker pool), and
//! persists the run only after every employee succeeded. Recomputing a run
//! deletes the previous settlements and signed-by-period records before the
//! new ones are inserted under the same run id.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::calculation::{EmployeeAggregate, aggregate_employee, bucket_by_days};
use crate::config::{ConfigLoader, LiquidationRules};
use crate::error::{EngineError, EngineResult};
use crate::models::{DateWindow, Liquidation, NewsAccrual, Settlement, SignedByPeriod};
use crate::store::{
    AuditEntry, AuditLog, EmployeeDirectory, LiquidationStore, NewsStore, PeriodStore,
};

/// A request to settle employees over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationRequest {
    /// First day of the range (inclusive).
    pub date_from: NaiveDate,
    /// Last day of the range (inclusive).
    pub date_to: NaiveDate,
    /// Employees to settle.
    pub employee_ids: Vec<String>,
    /// The user requesting the run.
    pub actor_user_id: String,
}

/// A persisted run and its settlements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationOutcome {
    /// The run record.
    pub liquidation: Liquidation,
    /// One settlement per employee, in request order.
    pub settlements: Vec<Settlement>,
}

/// The ports a [`LiquidationOrchestrator`] works against.
#[derive(Clone)]
pub struct LiquidationPorts {
    /// Periods and their events.
    pub periods: Arc<dyn PeriodStore>,
    /// News records.
    pub news: Arc<dyn NewsStore>,
    /// Employee lookups.
    pub employees: Arc<dyn EmployeeDirectory>,
    /// Runs and their dependent records.
    pub liquidations: Arc<dyn LiquidationStore>,
    /// Audit sink.
    pub audit: Arc<dyn AuditLog>,
}

/// Runs and recomputes liquidations.
pub struct LiquidationOrchestrator {
    ports: LiquidationPorts,
    rules: Arc<LiquidationRules>,
    recomputing: Mutex<HashSet<Uuid>>,
}

/// Marks a run id as being recomputed until dropped.
struct RecomputeClaim<'a> {
    set: &'a Mutex<HashSet<Uuid>>,
    id: Uuid,
}

impl Drop for RecomputeClaim<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

impl LiquidationOrchestrator {
    /// Creates an orchestrator over the given ports.
    ///
    /// Takes the rules from a [`ConfigLoader`], which only holds rules that
    /// passed validation, so the worker pool always has at least one permit.
    pub fn new(ports: LiquidationPorts, config: &ConfigLoader) -> Self {
        Self {
            ports,
            rules: Arc::new(config.rules().clone()),
            recomputing: Mutex::new(HashSet::new()),
        }
    }

    /// Settles the requested employees as a new run.
    pub async fn liquidate(&self, request: LiquidationRequest) -> EngineResult<LiquidationOutcome> {
        let (window, employee_ids) = validate(&request)?;
        let id = Uuid::new_v4();
        let settled = self.settle(id, window, &employee_ids).await;
        let (settlements, records) = self.collect_records(id, settled)?;

        let liquidation = Liquidation {
            id,
            window,
            employee_ids,
            settlement_ids: settlements.iter().map(|s| s.id).collect(),
            created_by: request.actor_user_id.clone(),
            created_at: Utc::now(),
            recomputed_at: None,
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        };

        self.persist(&liquidation, &settlements, records).await?;
        self.audit(&request.actor_user_id, "create", &liquidation).await;
        info!(
            liquidation_id = %id,
            employees = settlements.len(),
            date_from = %window.from,
            date_to = %window.to,
            "Liquidation completed"
        );

        Ok(LiquidationOutcome {
            liquidation,
            settlements,
        })
    }

    /// Recomputes an existing run, replacing its settlements.
    ///
    /// Fails with [`EngineError::NotFound`] if the run does not exist and with
    /// [`EngineError::Conflict`] if it is already being recomputed.
    pub async fn recompute(
        &self,
        id: Uuid,
        request: LiquidationRequest,
    ) -> EngineResult<LiquidationOutcome> {
        let (window, employee_ids) = validate(&request)?;
        let _claim = self.claim(id)?;

        let previous = self
            .ports
            .liquidations
            .find_run(id)
            .await?
            .ok_or_else(|| EngineError::not_found("liquidation", id.to_string()))?;

        let settled = self.settle(id, window, &employee_ids).await;
        let (settlements, records) = self.collect_records(id, settled)?;

        let liquidation = Liquidation {
            id,
            window,
            employee_ids,
            settlement_ids: settlements.iter().map(|s| s.id).collect(),
            created_by: previous.created_by,
            created_at: previous.created_at,
            recomputed_at: Some(Utc::now()),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
        };

        self.ports.liquidations.delete_run_cascade(id).await?;
        self.persist(&liquidation, &settlements, records).await?;
        self.audit(&request.actor_user_id, "update", &liquidation).await;
        info!(
            liquidation_id = %id,
            employees = settlements.len(),
            date_from = %window.from,
            date_to = %window.to,
            "Liquidation recomputed"
        );

        Ok(LiquidationOutcome {
            liquidation,
            settlements,
        })
    }

    fn claim(&self, id: Uuid) -> EngineResult<RecomputeClaim<'_>> {
        let mut set = self
            .recomputing
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !set.insert(id) {
            warn!(liquidation_id = %id, "Recompute already in progress");
            return Err(EngineError::Conflict {
                resource: "liquidation".to_string(),
                id: id.to_string(),
            });
        }
        Ok(RecomputeClaim {
            set: &self.recomputing,
            id,
        })
    }

    /// Aggregates every employee, one task each, returning aggregates in
    /// request order. The first failure aborts the remaining tasks.
    async fn settle(
        &self,
        liquidation_id: Uuid,
        window: DateWindow,
        employee_ids: &[String],
    ) -> EngineResult<Vec<EmployeeAggregate>> {
        let periods = Arc::new(self.ports.periods.find_overlapping(&window).await?);
        let weeks = Arc::new(bucket_by_days(
            window.from,
            window.to,
            self.rules.weeks.length_days,
        ));
        let pool = Arc::new(Semaphore::new(self.rules.liquidation.worker_pool_size));

        let mut tasks = JoinSet::new();
        for (index, employee_id) in employee_ids.iter().cloned().enumerate() {
            let pool = pool.clone();
            let periods = periods.clone();
            let weeks = weeks.clone();
            let rules = self.rules.clone();
            let employees = self.ports.employees.clone();
            let news = self.ports.news.clone();

            tasks.spawn(async move {
                let _permit = pool
                    .acquire_owned()
                    .await
                    .map_err(|e| EngineError::TaskFailed {
                        message: e.to_string(),
                    })?;

                let employee = employees
                    .find_by_id(&employee_id)
                    .await?
                    .ok_or_else(|| EngineError::not_found("employee", &employee_id))?;
                if employee.is_discharged() {
                    warn!(employee_id = %employee.id, "Settling a discharged employee");
                }
                let news = news.find_for_employee(&employee_id, &window).await?;

                let aggregate = aggregate_employee(
                    liquidation_id,
                    &employee,
                    &window,
                    &periods,
                    &weeks,
                    &news,
                    &rules,
                );
                debug!(
                    liquidation_id = %liquidation_id,
                    employee_id = %employee_id,
                    scheduled_hours = %aggregate.settlement.scheduled.total,
                    signed_hours = %aggregate.settlement.signed.total,
                    presentismo = aggregate.settlement.news.presentismo,
                    "Employee aggregated"
                );
                Ok::<_, EngineError>((index, aggregate))
            });
        }

        let mut slots: Vec<Option<EmployeeAggregate>> = vec![None; employee_ids.len()];
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(|e| EngineError::TaskFailed {
                message: e.to_string(),
            })?;
            match outcome {
                Ok((index, aggregate)) => slots[index] = Some(aggregate),
                Err(err) => {
                    tasks.abort_all();
                    return Err(err);
                }
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Splits aggregates into settlements and the rest of the run's records,
    /// logging a failed run.
    fn collect_records(
        &self,
        id: Uuid,
        settled: EngineResult<Vec<EmployeeAggregate>>,
    ) -> EngineResult<(Vec<Settlement>, RunRecords)> {
        let aggregates = settled.inspect_err(|err| {
            warn!(liquidation_id = %id, error = %err, "Liquidation aborted");
        })?;

        let mut settlements = Vec::with_capacity(aggregates.len());
        let mut records = RunRecords::default();
        for aggregate in aggregates {
            settlements.push(aggregate.settlement);
            records.signed_by_period.extend(aggregate.signed_by_period);
            for (news_id, accrual) in aggregate.accruals {
                *records.accruals.entry(news_id).or_default() += accrual;
            }
        }
        Ok((settlements, records))
    }

    async fn persist(
        &self,
        liquidation: &Liquidation,
        settlements: &[Settlement],
        records: RunRecords,
    ) -> EngineResult<()> {
        self.ports
            .liquidations
            .insert_run(
                liquidation.clone(),
                settlements.to_vec(),
                records.signed_by_period,
            )
            .await?;
        self.ports.news.apply_accruals(&records.accruals).await?;
        Ok(())
    }

    async fn audit(&self, actor_user_id: &str, verb: &str, liquidation: &Liquidation) {
        let entry = AuditEntry {
            actor_user_id: actor_user_id.to_string(),
            verb: verb.to_string(),
            resource_type: "liquidation".to_string(),
            description: format!(
                "Liquidation {} from {} to {} for {} employees",
                liquidation.id,
                liquidation.window.from,
                liquidation.window.to,
                liquidation.employee_ids.len()
            ),
        };
        if let Err(err) = self.ports.audit.record(entry).await {
            warn!(liquidation_id = %liquidation.id, error = %err, "Audit entry not recorded");
        }
    }
}

/// Everything a run persists besides its settlements.
#[derive(Default)]
struct RunRecords {
    signed_by_period: Vec<SignedByPeriod>,
    accruals: BTreeMap<String, NewsAccrual>,
}

/// Checks the range and employee set; returns the window and the employee
/// ids with duplicates removed, in first-seen order.
fn validate(request: &LiquidationRequest) -> EngineResult<(DateWindow, Vec<String>)> {
    let window = DateWindow::new(request.date_from, request.date_to);
    if !window.is_valid() {
        return Err(EngineError::validation(
            "date_range",
            format!(
                "date_from {} is after date_to {}",
                request.date_from, request.date_to
            ),
        ));
    }
    if request.employee_ids.is_empty() {
        return Err(EngineError::validation(
            "employee_ids",
            "at least one employee is required",
        ));
    }
    if request.employee_ids.iter().any(|id| id.trim().is_empty()) {
        return Err(EngineError::validation(
            "employee_ids",
            "employee ids must not be blank",
        ));
    }

    let mut seen = HashSet::new();
    let employee_ids = request
        .employee_ids
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .cloned()
        .collect();
    Ok((window, employee_ids))
}
