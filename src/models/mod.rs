//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod employee;
mod facts;
mod payslip;
mod period;

pub use employee::Employee;
pub use facts::{
    AttendanceRecord, MAX_OVERTIME_HOURS, MIN_OVERTIME_HOURS, OvertimeEntry, ReimbursementEntry,
};
pub use payslip::{EmployeePay, PayrollSummary, Payslip};
pub use period::{PayrollPeriod, PeriodStatus};
