//! Error types for the payroll engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every error condition that can occur while managing payroll periods,
//! running payroll and querying payslips.

use chrono::NaiveDate;
use thiserror::Error;

use crate::models::PeriodStatus;

/// The main error type for the payroll engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use payroll_engine::error::EngineError;
///
/// let error = EngineError::PeriodNotFound {
///     id: "period-001".to_string(),
/// };
/// assert_eq!(error.to_string(), "Payroll period not found: period-001");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed or held invalid values.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A payroll period was requested with its start after its end.
    #[error("Invalid payroll period: start date {start} is after end date {end}")]
    InvalidPeriod {
        /// The requested start date.
        start: NaiveDate,
        /// The requested end date.
        end: NaiveDate,
    },

    /// Overtime hours outside the accepted 1 to 3 hour range.
    #[error("Invalid overtime: {hours} hours (must be between 1 and 3)")]
    InvalidOvertime {
        /// The rejected number of hours.
        hours: u32,
    },

    /// A reimbursement entry was invalid.
    #[error("Invalid reimbursement field '{field}': {message}")]
    InvalidReimbursement {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },

    /// No payroll period exists with the given id.
    #[error("Payroll period not found: {id}")]
    PeriodNotFound {
        /// The id that was looked up.
        id: String,
    },

    /// Payroll for the period has already been run.
    #[error("Payroll for period '{id}' has already been run")]
    PeriodAlreadyCompleted {
        /// The period id.
        id: String,
    },

    /// A payroll run for the period is already in progress.
    #[error("Payroll for period '{id}' is already being processed")]
    PeriodAlreadyProcessing {
        /// The period id.
        id: String,
    },

    /// A conditional status write found the period in an unexpected status.
    #[error("Status conflict for period '{id}': expected {expected}, found {actual}")]
    StatusConflict {
        /// The period id.
        id: String,
        /// The status the writer expected.
        expected: PeriodStatus,
        /// The status actually stored.
        actual: PeriodStatus,
    },

    /// A status write asked for a step outside the period lifecycle.
    #[error("Invalid status transition for period '{id}': {from} -> {to}")]
    InvalidTransition {
        /// The period id.
        id: String,
        /// The status the writer expected to leave.
        from: PeriodStatus,
        /// The requested status.
        to: PeriodStatus,
    },

    /// No payslip exists for the employee in the period.
    #[error("Payslip not found for employee '{employee_id}' in period '{period_id}'")]
    PayslipNotFound {
        /// The employee id.
        employee_id: String,
        /// The period id.
        period_id: String,
    },

    /// The run was cancelled before every employee was processed.
    #[error("Payroll run for period '{period_id}' cancelled after {processed} employees")]
    Cancelled {
        /// The period id.
        period_id: String,
        /// Number of employees iterated before cancellation was observed.
        processed: usize,
    },

    /// A pay calculation could not be carried out.
    #[error("Calculation error: {message}")]
    CalculationError {
        /// A description of the calculation error.
        message: String,
    },

    /// An underlying storage or collaborator call failed.
    #[error("Storage error: {message}")]
    Storage {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Builds a [`EngineError::Storage`] from anything displayable.
    pub fn storage(message: impl std::fmt::Display) -> Self {
        EngineError::Storage {
            message: message.to_string(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
