//! Payslip and payroll summary models.
//!
//! This module contains the [`Payslip`] type written once per employee per period,
//! and the [`PayrollSummary`] derived from all payslips of a period.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculation::PayBreakdown;
use crate::error::{EngineError, EngineResult};

/// The immutable computed-pay record for one employee in one period.
///
/// `base_salary` is a snapshot taken when the payslip was calculated, not a
/// reference to the employee's current salary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique identifier for the payslip.
    pub id: String,
    /// The employee this payslip belongs to.
    pub employee_id: String,
    /// The period this payslip was computed for.
    pub period_id: String,
    /// Base salary at calculation time.
    pub base_salary: Decimal,
    /// Base salary scaled by attended working days.
    pub prorated_salary: Decimal,
    /// Pay for overtime hours.
    pub overtime_pay: Decimal,
    /// Sum of reimbursement claims.
    pub reimbursement_total: Decimal,
    /// prorated_salary + overtime_pay + reimbursement_total.
    pub total_pay: Decimal,
    /// Who triggered the run that created this payslip.
    pub created_by: String,
    /// Same as `created_by`; payslips are never updated.
    pub updated_by: String,
    /// When the payslip was written.
    pub created_at: DateTime<Utc>,
    /// Same as `created_at`; payslips are never updated.
    pub updated_at: DateTime<Utc>,
}

impl Payslip {
    /// Builds a payslip from a calculated [`PayBreakdown`].
    pub fn from_breakdown(
        employee_id: impl Into<String>,
        period_id: impl Into<String>,
        breakdown: &PayBreakdown,
        created_by: impl Into<String>,
    ) -> Self {
        let created_by = created_by.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            employee_id: employee_id.into(),
            period_id: period_id.into(),
            base_salary: breakdown.base_salary,
            prorated_salary: breakdown.prorated_salary,
            overtime_pay: breakdown.overtime_pay,
            reimbursement_total: breakdown.reimbursement_total,
            total_pay: breakdown.total_pay,
            updated_by: created_by.clone(),
            created_by,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Take-home pay for one employee in a summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeePay {
    /// The employee.
    pub employee_id: String,
    /// The payslip's total pay.
    pub take_home_pay: Decimal,
}

/// Aggregate of every payslip in a period.
///
/// # Example
///
/// ```
/// use payroll_engine::models::PayrollSummary;
/// use rust_decimal::Decimal;
///
/// let summary = PayrollSummary::from_payslips("period-001", &[]).unwrap();
/// assert_eq!(summary.total_payout, Decimal::ZERO);
/// assert!(summary.employee_pays.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollSummary {
    /// The summarized period.
    pub period_id: String,
    /// Per-employee take-home pay, in stored payslip order.
    pub employee_pays: Vec<EmployeePay>,
    /// Sum of every take-home pay.
    pub total_payout: Decimal,
}

impl PayrollSummary {
    /// Derives a summary from the payslips of a period, preserving their order.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::CalculationError`] if the payout total overflows.
    pub fn from_payslips(period_id: impl Into<String>, payslips: &[Payslip]) -> EngineResult<Self> {
        let employee_pays: Vec<EmployeePay> = payslips
            .iter()
            .map(|p| EmployeePay {
                employee_id: p.employee_id.clone(),
                take_home_pay: p.total_pay,
            })
            .collect();
        let total_payout = employee_pays
            .iter()
            .try_fold(Decimal::ZERO, |acc, e| acc.checked_add(e.take_home_pay))
            .ok_or_else(|| EngineError::CalculationError {
                message: "total payout exceeds the representable amount".to_string(),
            })?;

        Ok(Self {
            period_id: period_id.into(),
            employee_pays,
            total_payout,
        })
    }
}
