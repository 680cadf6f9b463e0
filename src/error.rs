//! Error types for the Liquidation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while reconciling signals and
//! settling payroll.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::store::StoreError;

/// The main error type for the Liquidation Engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use liquidation_engine::error::EngineError;
///
/// let error = EngineError::NotFound {
///     resource: "employee".to_string(),
///     id: "badge-77".to_string(),
/// };
/// assert_eq!(error.to_string(), "employee not found: badge-77");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// A referenced employee, badge, period or liquidation run does not exist.
    #[error("{resource} not found: {id}")]
    NotFound {
        /// The kind of resource that was looked up.
        resource: String,
        /// The identifier that was not found.
        id: String,
    },

    /// A signal could not be matched to any scheduled event.
    #[error("No schedule found for employee '{employee_id}' at {timestamp}")]
    NoScheduleFound {
        /// The employee the signal belongs to.
        employee_id: String,
        /// The instant of the signal.
        timestamp: NaiveDateTime,
    },

    /// Input failed validation.
    #[error("Invalid {field}: {message}")]
    ValidationFailed {
        /// The field or parameter that was invalid.
        field: String,
        /// A description of what made it invalid.
        message: String,
    },

    /// The resource is already being modified by another operation.
    #[error("Conflict on {resource} '{id}'")]
    Conflict {
        /// The kind of resource in conflict.
        resource: String,
        /// The identifier of the resource.
        id: String,
    },

    /// A signal arrived earlier than the checkout already recorded on the event.
    #[error("Signal at {timestamp} precedes the recorded checkout of event '{event_id}'")]
    StaleSignal {
        /// The event the signal resolved to.
        event_id: String,
        /// The instant of the signal.
        timestamp: NaiveDateTime,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A background aggregation task panicked or was cancelled.
    #[error("Aggregation task failed: {message}")]
    TaskFailed {
        /// A description of the failure.
        message: String,
    },

    /// A store or collaborator port failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EngineError {
    /// Shorthand for a [`EngineError::NotFound`].
    pub fn not_found(resource: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.into(),
        }
    }

    /// Shorthand for a [`EngineError::ValidationFailed`].
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
