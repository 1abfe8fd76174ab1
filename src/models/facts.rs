//! Fact records consumed by a payroll run.
//!
//! Attendance days, overtime entries and reimbursement entries are produced by
//! other subsystems. The constructors here enforce the payload contract the pay
//! calculation relies on, so invalid records are rejected at submission time.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Smallest number of overtime hours accepted in one entry.
pub const MIN_OVERTIME_HOURS: u32 = 1;

/// Largest number of overtime hours accepted in one entry.
pub const MAX_OVERTIME_HOURS: u32 = 3;

/// One day of attendance for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    /// Unique identifier for the record.
    pub id: String,
    /// The employee who attended.
    pub employee_id: String,
    /// The attended date.
    pub date: NaiveDate,
}

impl AttendanceRecord {
    /// Creates an attendance record for the given employee and date.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.into(),
            date,
        }
    }
}

/// Overtime worked by an employee on a single date.
///
/// # Example
///
/// ```
/// use payroll_engine::models::OvertimeEntry;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap();
/// assert!(OvertimeEntry::new("user-001", date, 2).is_ok());
/// assert!(OvertimeEntry::new("user-001", date, 4).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OvertimeEntry {
    /// Unique identifier for the entry.
    pub id: String,
    /// The employee who worked overtime.
    pub employee_id: String,
    /// The date the overtime was worked.
    pub date: NaiveDate,
    /// Whole hours of overtime, 1 to 3.
    pub hours: u32,
}

impl OvertimeEntry {
    /// Creates an overtime entry, rejecting hours outside 1 to 3.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidOvertime`] for 0 or more than 3 hours.
    pub fn new(employee_id: impl Into<String>, date: NaiveDate, hours: u32) -> EngineResult<Self> {
        if !(MIN_OVERTIME_HOURS..=MAX_OVERTIME_HOURS).contains(&hours) {
            return Err(EngineError::InvalidOvertime { hours });
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.into(),
            date,
            hours,
        })
    }
}

/// An expense claimed back by an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReimbursementEntry {
    /// Unique identifier for the entry.
    pub id: String,
    /// The employee claiming the expense.
    pub employee_id: String,
    /// The date of the expense.
    pub date: NaiveDate,
    /// What the expense was for.
    pub description: String,
    /// The claimed amount. Always positive.
    pub amount: Decimal,
}

impl ReimbursementEntry {
    /// Creates a reimbursement entry.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidReimbursement`] if the amount is not positive
    /// or the description is blank.
    pub fn new(
        employee_id: impl Into<String>,
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
    ) -> EngineResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(EngineError::InvalidReimbursement {
                field: "amount".to_string(),
                message: "must be positive".to_string(),
            });
        }

        let description = description.into();
        if description.trim().is_empty() {
            return Err(EngineError::InvalidReimbursement {
                field: "description".to_string(),
                message: "is required".to_string(),
            });
        }

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.into(),
            date,
            description,
            amount,
        })
    }
}
