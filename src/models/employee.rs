//! Employee model as seen by the payroll engine.
//!
//! The engine only needs an identifier and the monthly base salary; everything
//! else about an employee belongs to the roster provider.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Represents an employee on the payroll roster.
///
/// # Example
///
/// ```
/// use payroll_engine::models::Employee;
/// use rust_decimal::Decimal;
///
/// let employee = Employee::new("user-001", Decimal::from(5_000_000));
/// assert_eq!(employee.id, "user-001");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: String,
    /// Base salary for a full period of attendance.
    pub base_salary: Decimal,
}

impl Employee {
    /// Creates an employee with the given id and base salary.
    pub fn new(id: impl Into<String>, base_salary: Decimal) -> Self {
        Self {
            id: id.into(),
            base_salary,
        }
    }
}
