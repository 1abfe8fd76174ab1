//! In-memory implementation of every repository trait.
//!
//! Backs the demo server, the integration tests and the benchmarks. Records are
//! kept in insertion order; each collection sits behind its own lock.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::RwLock;

use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendanceRecord, Employee, OvertimeEntry, PayrollPeriod, Payslip, PeriodStatus,
    ReimbursementEntry,
};

use super::{
    AttendanceSource, EmployeeRoster, OvertimeSource, PayslipRepository, PayslipWrite,
    PeriodRepository, ReimbursementSource,
};

/// Memory-backed store for periods, roster, facts and payslips.
///
/// # Example
///
/// ```
/// use payroll_engine::store::{EmployeeRoster, MemoryStore};
/// use payroll_engine::models::Employee;
/// use rust_decimal::Decimal;
///
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryStore::new();
/// store.add_employee(Employee::new("user-001", Decimal::from(5_000_000))).await;
/// assert_eq!(store.list_employees().await.unwrap().len(), 1);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    periods: RwLock<HashMap<String, PayrollPeriod>>,
    employees: RwLock<Vec<Employee>>,
    attendance: RwLock<Vec<AttendanceRecord>>,
    overtime: RwLock<Vec<OvertimeEntry>>,
    reimbursements: RwLock<Vec<ReimbursementEntry>>,
    payslips: RwLock<Vec<Payslip>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an employee to the roster.
    pub async fn add_employee(&self, employee: Employee) {
        self.employees.write().await.push(employee);
    }

    /// Stores an attendance record.
    pub async fn record_attendance(&self, record: AttendanceRecord) {
        self.attendance.write().await.push(record);
    }

    /// Stores an overtime entry.
    pub async fn record_overtime(&self, entry: OvertimeEntry) {
        self.overtime.write().await.push(entry);
    }

    /// Stores a reimbursement entry.
    pub async fn record_reimbursement(&self, entry: ReimbursementEntry) {
        self.reimbursements.write().await.push(entry);
    }

    /// Number of employees on the roster.
    pub async fn employee_count(&self) -> usize {
        self.employees.read().await.len()
    }

    /// Number of periods stored.
    pub async fn period_count(&self) -> usize {
        self.periods.read().await.len()
    }

    /// Number of payslips stored across all periods.
    pub async fn payslip_count(&self) -> usize {
        self.payslips.read().await.len()
    }
}

fn in_range(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    date >= start && date <= end
}

#[async_trait]
impl PeriodRepository for MemoryStore {
    async fn create(&self, period: &PayrollPeriod) -> EngineResult<()> {
        let mut periods = self.periods.write().await;
        if periods.contains_key(&period.id) {
            return Err(EngineError::storage(format!(
                "period '{}' already exists",
                period.id
            )));
        }
        periods.insert(period.id.clone(), period.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> EngineResult<Option<PayrollPeriod>> {
        Ok(self.periods.read().await.get(id).cloned())
    }

    async fn transition_status(
        &self,
        id: &str,
        expected: PeriodStatus,
        next: PeriodStatus,
        updated_by: &str,
    ) -> EngineResult<PayrollPeriod> {
        if !expected.can_transition_to(next) {
            return Err(EngineError::InvalidTransition {
                id: id.to_string(),
                from: expected,
                to: next,
            });
        }

        let mut periods = self.periods.write().await;
        let period = periods
            .get_mut(id)
            .ok_or_else(|| EngineError::PeriodNotFound { id: id.to_string() })?;

        if period.status != expected {
            return Err(EngineError::StatusConflict {
                id: id.to_string(),
                expected,
                actual: period.status,
            });
        }

        period.status = next;
        period.updated_by = updated_by.to_string();
        period.updated_at = Utc::now();
        Ok(period.clone())
    }
}

#[async_trait]
impl EmployeeRoster for MemoryStore {
    async fn list_employees(&self) -> EngineResult<Vec<Employee>> {
        Ok(self.employees.read().await.clone())
    }
}

#[async_trait]
impl AttendanceSource for MemoryStore {
    async fn attendance_in_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<AttendanceRecord>> {
        Ok(self
            .attendance
            .read()
            .await
            .iter()
            .filter(|r| r.employee_id == employee_id && in_range(r.date, start, end))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OvertimeSource for MemoryStore {
    async fn overtime_in_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<OvertimeEntry>> {
        Ok(self
            .overtime
            .read()
            .await
            .iter()
            .filter(|e| e.employee_id == employee_id && in_range(e.date, start, end))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReimbursementSource for MemoryStore {
    async fn reimbursements_in_range(
        &self,
        employee_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Vec<ReimbursementEntry>> {
        Ok(self
            .reimbursements
            .read()
            .await
            .iter()
            .filter(|e| e.employee_id == employee_id && in_range(e.date, start, end))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PayslipRepository for MemoryStore {
    async fn create(&self, payslip: &Payslip) -> EngineResult<PayslipWrite> {
        let mut payslips = self.payslips.write().await;
        let exists = payslips
            .iter()
            .any(|p| p.employee_id == payslip.employee_id && p.period_id == payslip.period_id);
        if exists {
            return Ok(PayslipWrite::AlreadyExists);
        }
        payslips.push(payslip.clone());
        Ok(PayslipWrite::Created)
    }

    async fn get(&self, employee_id: &str, period_id: &str) -> EngineResult<Option<Payslip>> {
        Ok(self
            .payslips
            .read()
            .await
            .iter()
            .find(|p| p.employee_id == employee_id && p.period_id == period_id)
            .cloned())
    }

    async fn list_by_period(&self, period_id: &str) -> EngineResult<Vec<Payslip>> {
        Ok(self
            .payslips
            .read()
            .await
            .iter()
            .filter(|p| p.period_id == period_id)
            .cloned()
            .collect())
    }
}
