//! Employee model and related types.
//!
//! This module defines the Employee struct and EmployeeStatus enum for
//! representing guards in the liquidation system. Status is maintained by
//! an external module from ALTA/ACTIVO/BAJA news and is only read here.

use serde::{Deserialize, Serialize};

/// The employment status of a guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EmployeeStatus {
    /// Newly hired.
    Alta,
    /// Active.
    Activo,
    /// Discharged.
    Baja,
    /// Discharge in progress.
    PreBaja,
}

/// Personal data shown on settlement reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeProfile {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// National identity document, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document: Option<String>,
}

/// Represents a guard subject to signing and liquidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Payroll enrollment number.
    pub enrollment: String,
    /// Identifier of the badge presented at the clock.
    pub badge_id: String,
    /// Personal data.
    #[serde(default)]
    pub profile: EmployeeProfile,
    /// Current employment status.
    pub status: EmployeeStatus,
}

impl Employee {
    /// Returns true if the employee has been discharged or is being discharged.
    ///
    /// # Examples
    ///
    /// ```
    /// use liquidation_engine::models::{Employee, EmployeeProfile, EmployeeStatus};
    ///
    /// let guard = Employee {
    ///     id: "emp_001".to_string(),
    ///     enrollment: "1042".to_string(),
    ///     badge_id: "badge-77".to_string(),
    ///     profile: EmployeeProfile::default(),
    ///     status: EmployeeStatus::PreBaja,
    /// };
    /// assert!(guard.is_discharged());
    /// ```
    pub fn is_discharged(&self) -> bool {
        matches!(self.status, EmployeeStatus::Baja | EmployeeStatus::PreBaja)
    }
}
