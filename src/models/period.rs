//! Payroll period model and its lifecycle status.
//!
//! This module contains the [`PayrollPeriod`] and [`PeriodStatus`] types. A period is
//! an inclusive calendar date range for which payroll is computed exactly once.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Lifecycle status of a payroll period.
///
/// Periods start as `Pending`, move to `Processing` while a run is active and end
/// as `Completed`. A cancelled or failed run moves the period back to `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodStatus {
    /// Created and not yet run (or rolled back).
    Pending,
    /// A run is in progress.
    Processing,
    /// Payroll has been run. Terminal.
    Completed,
}

impl PeriodStatus {
    /// Returns true if moving from `self` to `next` is a legal lifecycle step.
    ///
    /// # Example
    ///
    /// ```
    /// use payroll_engine::models::PeriodStatus;
    ///
    /// assert!(PeriodStatus::Pending.can_transition_to(PeriodStatus::Processing));
    /// assert!(PeriodStatus::Processing.can_transition_to(PeriodStatus::Pending));
    /// assert!(!PeriodStatus::Completed.can_transition_to(PeriodStatus::Processing));
    /// ```
    pub fn can_transition_to(self, next: PeriodStatus) -> bool {
        matches!(
            (self, next),
            (PeriodStatus::Pending, PeriodStatus::Processing)
                | (PeriodStatus::Processing, PeriodStatus::Completed)
                | (PeriodStatus::Processing, PeriodStatus::Pending)
        )
    }
}

impl std::fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PeriodStatus::Pending => write!(f, "pending"),
            PeriodStatus::Processing => write!(f, "processing"),
            PeriodStatus::Completed => write!(f, "completed"),
        }
    }
}

/// Represents a payroll period with its date range and lifecycle status.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{PayrollPeriod, PeriodStatus};
/// use chrono::NaiveDate;
///
/// let period = PayrollPeriod::new(
///     NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 9, 5).unwrap(),
///     "admin-001",
/// )
/// .unwrap();
///
/// assert_eq!(period.status, PeriodStatus::Pending);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollPeriod {
    /// Opaque unique identifier.
    pub id: String,
    /// The start date of the period (inclusive).
    pub start_date: NaiveDate,
    /// The end date of the period (inclusive).
    pub end_date: NaiveDate,
    /// Current lifecycle status.
    pub status: PeriodStatus,
    /// Who created the period.
    pub created_by: String,
    /// Who last changed the status.
    pub updated_by: String,
    /// When the period was created.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
}

impl PayrollPeriod {
    /// Creates a new pending period, rejecting a start date after the end date.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidPeriod`] when `start_date > end_date`.
    pub fn new(
        start_date: NaiveDate,
        end_date: NaiveDate,
        created_by: impl Into<String>,
    ) -> EngineResult<Self> {
        if start_date > end_date {
            return Err(EngineError::InvalidPeriod {
                start: start_date,
                end: end_date,
            });
        }

        let created_by = created_by.into();
        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            start_date,
            end_date,
            status: PeriodStatus::Pending,
            updated_by: created_by.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        })
    }
}
