//! The payroll run engine.
//!
//! [`PayrollEngine`] owns the collaborators a run needs (period store, roster,
//! fact sources, payslip store) and exposes the operations callers use: creating
//! periods, running payroll, and querying payslips and summaries.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use payroll_engine::config::EngineConfig;
//! use payroll_engine::engine::PayrollEngine;
//! use payroll_engine::models::{Employee, PeriodStatus};
//! use payroll_engine::store::MemoryStore;
//! use rust_decimal::Decimal;
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), payroll_engine::error::EngineError> {
//! let store = Arc::new(MemoryStore::new());
//! store.add_employee(Employee::new("user-001", Decimal::from(5_000_000))).await;
//!
//! let engine = PayrollEngine::with_store(store, EngineConfig::default());
//! let period = engine
//!     .create_period(
//!         NaiveDate::from_ymd_opt(2025, 9, 1).unwrap(),
//!         NaiveDate::from_ymd_opt(2025, 9, 5).unwrap(),
//!         "admin-001",
//!     )
//!     .await?;
//!
//! let report = engine
//!     .run_payroll(&period.id, "admin-001", &CancellationToken::new())
//!     .await?;
//! assert_eq!(report.payslips_created, 1);
//! assert_eq!(engine.get_period(&period.id).await?.status, PeriodStatus::Completed);
//! # Ok(())
//! # }
//! ```

mod report;
mod run;
mod summary;

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::info;

use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::models::PayrollPeriod;
use crate::store::{
    AttendanceSource, EmployeeRoster, MemoryStore, OvertimeSource, PayslipRepository,
    PeriodRepository, ReimbursementSource,
};

pub use report::{EmployeeFailure, FailureStage, RunReport};

/// The collaborators a [`PayrollEngine`] reads from and writes to.
#[derive(Clone)]
pub struct Collaborators {
    /// Period store.
    pub periods: Arc<dyn PeriodRepository>,
    /// Employee roster.
    pub roster: Arc<dyn EmployeeRoster>,
    /// Attendance fact source.
    pub attendance: Arc<dyn AttendanceSource>,
    /// Overtime fact source.
    pub overtime: Arc<dyn OvertimeSource>,
    /// Reimbursement fact source.
    pub reimbursements: Arc<dyn ReimbursementSource>,
    /// Payslip store.
    pub payslips: Arc<dyn PayslipRepository>,
}

impl Collaborators {
    /// Uses one [`MemoryStore`] for every collaborator.
    pub fn from_memory(store: Arc<MemoryStore>) -> Self {
        Self {
            periods: store.clone(),
            roster: store.clone(),
            attendance: store.clone(),
            overtime: store.clone(),
            reimbursements: store.clone(),
            payslips: store,
        }
    }
}

/// Orchestrates payroll periods, runs and queries.
pub struct PayrollEngine {
    periods: Arc<dyn PeriodRepository>,
    roster: Arc<dyn EmployeeRoster>,
    attendance: Arc<dyn AttendanceSource>,
    overtime: Arc<dyn OvertimeSource>,
    reimbursements: Arc<dyn ReimbursementSource>,
    payslips: Arc<dyn PayslipRepository>,
    config: EngineConfig,
}

impl PayrollEngine {
    /// Creates an engine over the given collaborators.
    pub fn new(collaborators: Collaborators, config: EngineConfig) -> Self {
        Self {
            periods: collaborators.periods,
            roster: collaborators.roster,
            attendance: collaborators.attendance,
            overtime: collaborators.overtime,
            reimbursements: collaborators.reimbursements,
            payslips: collaborators.payslips,
            config,
        }
    }

    /// Creates an engine backed entirely by a [`MemoryStore`].
    pub fn with_store(store: Arc<MemoryStore>, config: EngineConfig) -> Self {
        Self::new(Collaborators::from_memory(store), config)
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creates a new pending payroll period.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidPeriod`] if `start > end`; nothing is persisted.
    /// - Any error from the period store.
    pub async fn create_period(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        created_by: &str,
    ) -> EngineResult<PayrollPeriod> {
        let period = PayrollPeriod::new(start, end, created_by)?;
        self.periods.create(&period).await?;

        info!(
            period_id = %period.id,
            start_date = %period.start_date,
            end_date = %period.end_date,
            created_by = %created_by,
            "Payroll period created"
        );
        Ok(period)
    }

    /// Loads a payroll period.
    ///
    /// # Errors
    ///
    /// [`EngineError::PeriodNotFound`] if no period has the id.
    pub async fn get_period(&self, period_id: &str) -> EngineResult<PayrollPeriod> {
        self.periods
            .get(period_id)
            .await?
            .ok_or_else(|| EngineError::PeriodNotFound {
                id: period_id.to_string(),
            })
    }
}
