//! Outcome of a payroll run.

use serde::{Deserialize, Serialize};

use crate::models::PayrollPeriod;

/// Where a single employee's processing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureStage {
    /// Fetching attendance records.
    Attendance,
    /// Fetching overtime entries.
    Overtime,
    /// Fetching reimbursement entries.
    Reimbursement,
    /// Deriving the pay breakdown.
    Calculation,
    /// Writing the payslip.
    PayslipWrite,
}

/// A per-employee failure recorded during a run. The run continues past it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFailure {
    /// The affected employee.
    pub employee_id: String,
    /// The step that failed.
    pub stage: FailureStage,
    /// The underlying error.
    pub message: String,
}

/// Summary of what a completed run did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// The period that was run.
    pub period_id: String,
    /// Working days in the period.
    pub working_days: u32,
    /// Employees on the roster.
    pub employees: usize,
    /// Employees iterated.
    pub processed: usize,
    /// Payslips newly written.
    pub payslips_created: usize,
    /// Employees that already had a payslip for the period.
    pub payslips_skipped: usize,
    /// Per-employee failures, in roster order.
    pub failures: Vec<EmployeeFailure>,
    /// True once the period has been marked completed.
    pub completed: bool,
}

impl RunReport {
    pub(crate) fn new(period: &PayrollPeriod, working_days: u32, employees: usize) -> Self {
        Self {
            period_id: period.id.clone(),
            working_days,
            employees,
            processed: 0,
            payslips_created: 0,
            payslips_skipped: 0,
            failures: Vec::new(),
            completed: false,
        }
    }

    pub(crate) fn record_failure(
        &mut self,
        employee_id: &str,
        stage: FailureStage,
        message: impl Into<String>,
    ) {
        self.failures.push(EmployeeFailure {
            employee_id: employee_id.to_string(),
            stage,
            message: message.into(),
        });
    }
}
