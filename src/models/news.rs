//! News model: leave, absence, bonus and deduction records.
//!
//! A [`News`] applies to one employee, to a list of employees, or (for
//! holidays without a list) to everyone, over an inclusive date range.

use std::ops::AddAssign;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::DateWindow;
use crate::error::EngineError;

/// The category of a news record.
///
/// Serialized with the keys used by the scheduling front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NewsCategory {
    /// Public holiday.
    Feriado,
    /// Disciplinary suspension.
    Suspension,
    /// Justified leave.
    LicJustificada,
    /// Unjustified leave.
    LicNoJustificada,
    /// Workers' compensation leave.
    Art,
    /// Salary advance.
    Adelanto,
    /// Responsibility bonus.
    PlusResponsabilidad,
    /// Wage garnishment.
    Embargo,
    /// Vacation.
    Vacaciones,
    /// Unpaid leave.
    LicSinSueldo,
    /// Training sessions.
    Capacitaciones,
    /// Employee discharged.
    Baja,
    /// Employee hired.
    Alta,
    /// Employee back to active.
    Activo,
}

impl NewsCategory {
    /// Categories whose hours are prorated against the employee's events.
    pub const HOUR_PRORATED: [NewsCategory; 5] = [
        NewsCategory::Feriado,
        NewsCategory::Suspension,
        NewsCategory::LicJustificada,
        NewsCategory::LicNoJustificada,
        NewsCategory::Art,
    ];

    /// Categories carrying a monetary amount.
    pub const AMOUNT: [NewsCategory; 3] = [
        NewsCategory::Adelanto,
        NewsCategory::PlusResponsabilidad,
        NewsCategory::Embargo,
    ];

    /// Categories prorated by whole days.
    pub const DAY_PRORATED: [NewsCategory; 2] =
        [NewsCategory::Vacaciones, NewsCategory::LicSinSueldo];

    /// Returns true for categories addressed to a list of employees.
    pub fn is_multi_employee(self) -> bool {
        matches!(self, NewsCategory::Feriado | NewsCategory::Capacitaciones)
    }

    /// Returns true for categories that zero the presentismo score.
    pub fn voids_presentismo(self) -> bool {
        matches!(
            self,
            NewsCategory::Suspension | NewsCategory::LicNoJustificada
        )
    }
}

/// The reason code of a justified leave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LeaveReason {
    /// Death of a spouse or child.
    FallecimientoConyugeHijo,
    /// Death of a parent.
    FallecimientoPadres,
    /// Death of a sibling.
    FallecimientoHermano,
    /// Birth or adoption of a child.
    NacimientoAdopcion,
    /// The employee's marriage.
    Matrimonio,
    /// Academic examination.
    Examen,
    /// Illness.
    Enfermedad,
}

impl LeaveReason {
    /// Every reason bucket, in reporting order.
    pub const ALL: [LeaveReason; 7] = [
        LeaveReason::FallecimientoConyugeHijo,
        LeaveReason::FallecimientoPadres,
        LeaveReason::FallecimientoHermano,
        LeaveReason::NacimientoAdopcion,
        LeaveReason::Matrimonio,
        LeaveReason::Examen,
        LeaveReason::Enfermedad,
    ];

    /// The wire key of this reason.
    pub fn key(self) -> &'static str {
        match self {
            LeaveReason::FallecimientoConyugeHijo => "FALLECIMIENTO_CONYUGE_HIJO",
            LeaveReason::FallecimientoPadres => "FALLECIMIENTO_PADRES",
            LeaveReason::FallecimientoHermano => "FALLECIMIENTO_HERMANO",
            LeaveReason::NacimientoAdopcion => "NACIMIENTO_ADOPCION",
            LeaveReason::Matrimonio => "MATRIMONIO",
            LeaveReason::Examen => "EXAMEN",
            LeaveReason::Enfermedad => "ENFERMEDAD",
        }
    }
}

impl FromStr for LeaveReason {
    type Err = EngineError;

    /// Parses a reason key, rejecting unknown codes.
    ///
    /// ```
    /// use liquidation_engine::models::LeaveReason;
    ///
    /// assert_eq!("EXAMEN".parse::<LeaveReason>().unwrap(), LeaveReason::Examen);
    /// assert!("VACATION_DAY".parse::<LeaveReason>().is_err());
    /// ```
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LeaveReason::ALL
            .into_iter()
            .find(|reason| reason.key() == s)
            .ok_or_else(|| {
                EngineError::validation("reason", format!("unknown leave reason '{}'", s))
            })
    }
}

/// A leave, absence, bonus or deduction over a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    /// Unique identifier for the record.
    pub id: String,
    /// What kind of news this is.
    pub category: NewsCategory,
    /// First day covered (inclusive).
    pub date_from: NaiveDate,
    /// Last day covered (inclusive).
    pub date_to: NaiveDate,
    /// Target employee for single-employee categories.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    /// Target employees for multi-employee categories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub employee_ids: Vec<String>,
    /// Reason code of a justified leave.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<LeaveReason>,
    /// Monetary amount for advances, bonuses and garnishments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Hours of training for training news.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_hours: Option<Decimal>,
    /// Signed hours that fell inside this news in the latest liquidation.
    #[serde(default)]
    pub worked_hours: Decimal,
    /// Scheduled hours that fell inside this news in the latest liquidation.
    #[serde(default)]
    pub assigned_hours: Decimal,
}

impl News {
    /// The news's date range.
    pub fn window(&self) -> DateWindow {
        DateWindow::new(self.date_from, self.date_to)
    }

    /// Returns true if this news concerns the given employee.
    ///
    /// Holidays without an explicit list apply to everyone; training applies
    /// only to listed employees; every other category targets one employee.
    pub fn applies_to(&self, employee_id: &str) -> bool {
        match self.category {
            NewsCategory::Feriado if self.employee_ids.is_empty() => true,
            category if category.is_multi_employee() => {
                self.employee_ids.iter().any(|id| id == employee_id)
            }
            _ => self.employee_id.as_deref() == Some(employee_id),
        }
    }
}

/// Derived hour totals for one news record, produced by proration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsAccrual {
    /// Scheduled hours overlapping the news.
    pub assigned_hours: Decimal,
    /// Signed hours overlapping the news.
    pub worked_hours: Decimal,
}

impl AddAssign for NewsAccrual {
    fn add_assign(&mut self, other: Self) {
        self.assigned_hours += other.assigned_hours;
        self.worked_hours += other.worked_hours;
    }
}
