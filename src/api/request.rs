//! Request types for the Liquidation Engine API.
//!
//! This module defines the JSON request structures for the `/signings` and
//! `/liquidations` endpoints.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::service::{LiquidationRequest, SigningSignal};

/// Request body for the `/signings` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SigningRequest {
    /// The work site the reader belongs to.
    pub objective_id: String,
    /// The badge that was read.
    pub badge_id: String,
    /// When the badge was read, in local time (e.g. `2024-03-04T06:10:00`).
    pub timestamp: NaiveDateTime,
}

impl From<SigningRequest> for SigningSignal {
    fn from(req: SigningRequest) -> Self {
        SigningSignal {
            objective_id: req.objective_id,
            badge_id: req.badge_id,
            timestamp: req.timestamp,
        }
    }
}

/// Request body for `POST /liquidations` and `PUT /liquidations/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LiquidationRunRequest {
    /// First day of the range (inclusive).
    pub date_from: NaiveDate,
    /// Last day of the range (inclusive).
    pub date_to: NaiveDate,
    /// Employees to settle.
    pub employee_ids: Vec<String>,
    /// The user requesting the run.
    pub actor_user_id: String,
}

impl From<LiquidationRunRequest> for LiquidationRequest {
    fn from(req: LiquidationRunRequest) -> Self {
        LiquidationRequest {
            date_from: req.date_from,
            date_to: req.date_to,
            employee_ids: req.employee_ids,
            actor_user_id: req.actor_user_id,
        }
    }
}
