//! Repository abstractions consumed by the payroll engine.
//!
//! The engine never talks to a database directly. Periods, the employee roster,
//! the three fact sources and payslips are reached through the traits in this
//! module, so any backend can be plugged in. [`MemoryStore`] implements all of
//! them in memory, and [`seed_roster`] fills it with a demo roster.

mod memory;
mod seed;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::EngineResult;
use crate::models::{
    AttendanceRecord, Employee, OvertimeEntry, PayrollPeriod, Payslip, PeriodStatus,
    ReimbursementEntry,
};

pub use memory::MemoryStore;
pub use seed::seed_roster;

/// Outcome of writing a payslip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayslipWrite {
    /// The payslip was stored.
    Created,
    /// A payslip for the same (employee, period) already existed; nothing was written.
    AlreadyExists,
}

/// Durable record of payroll periods.
#[async_trait]
pub trait PeriodRepository: Send + Sync {
    /// Stores a new period.
    async fn create(&self, period: &PayrollPeriod) -> EngineResult<()>;

    /// Loads a period by id.
    async fn get(&self, id: &str) -> EngineResult<Option<PayrollPeriod>>;

    /// Atomically moves a period from `expected` to `next`.
    ///
    /// Fails with [`crate::error::EngineError::InvalidTransition`] if `expected ->
    /// next` is not a lifecycle step, with
    /// [`crate::error::EngineError::StatusConflict`] if the stored status is not
    /// `expected`, and with [`crate::error::EngineError::PeriodNotFound`] if the
    /// period does not exist. Returns the updated period.
    async fn transition_status(
        &self,
        id: &str,
        expected: PeriodStatus,
        next: PeriodStatus,
        updated_by: &str,
    ) -> EngineResult<PayrollPeriod>;
}

/// Source of the employees to pay.
#[async_trait]
pub trait EmployeeRoster: Send + Sync {
    /// Lists every employee on the payroll, in roster order.
    async fn list_employees(&self) -> EngineResult<Vec<Employee>>;
}

/// Attendance records, read-only.
#[async_trait]
pub trait AttendanceSource: Send + Sync {
    /// Attendance of `employee_id` dated within `[start, end]`.
    async fn attendance_in_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>>;
}

/// Overtime entries, read-only.
#[async_trait]
pub trait OvertimeSource: Send + Sync {
    /// Overtime of `employee_id` dated within `[start, end]`.
    async fn overtime_in_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<OvertimeEntry>>;
}

/// Reimbursement entries, read-only.
#[async_trait]
pub trait ReimbursementSource: Send + Sync {
    /// Reimbursements of `employee_id` dated within `[start, end]`.
    async fn reimbursements_in_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<ReimbursementEntry>>;
}

/// Append-only payslip storage, unique on (employee, period).
#[async_trait]
pub trait PayslipRepository: Send + Sync {
    /// Stores a payslip unless one already exists for its (employee, period).
    async fn create(&self, payslip: &Payslip) -> EngineResult<PayslipWrite>;

    /// Loads the payslip of an employee for a period.
    async fn get(&self, employee_id: &str, period_id: &str) -> EngineResult<Option<Payslip>>;

    /// Every payslip of a period, in the order they were written.
    async fn list_by_period(&self, period_id: &str) -> EngineResult<Vec<Payslip>>;
}
