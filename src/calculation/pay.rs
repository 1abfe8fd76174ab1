//! Per-employee pay calculation.
//!
//! This module turns an employee's base salary and the fact records of a period
//! into a [`PayBreakdown`]: prorated salary, overtime pay, reimbursement total and
//! take-home pay.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::models::{AttendanceRecord, Employee, OvertimeEntry, ReimbursementEntry};

use super::rates::{DEFAULT_HOURS_PER_DAY, daily_rate, default_overtime_multiplier, hourly_rate};

/// Tunable parameters of the pay calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayPolicy {
    /// Divisor turning the daily rate into an hourly rate.
    pub hours_per_day: u32,
    /// Multiple of the hourly rate paid per overtime hour.
    pub overtime_multiplier: Decimal,
    /// Round the payslip figures to cents.
    pub round_to_cents: bool,
}

impl Default for PayPolicy {
    fn default() -> Self {
        Self {
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            overtime_multiplier: default_overtime_multiplier(),
            round_to_cents: false,
        }
    }
}

/// The facts of one employee within one period.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFacts {
    /// Attended days.
    pub attendance: Vec<AttendanceRecord>,
    /// Overtime entries.
    pub overtime: Vec<OvertimeEntry>,
    /// Reimbursement claims.
    pub reimbursements: Vec<ReimbursementEntry>,
}

/// Every figure derived while calculating one employee's pay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayBreakdown {
    /// Base salary snapshot.
    pub base_salary: Decimal,
    /// Working days in the period.
    pub working_days: u32,
    /// base_salary / working_days.
    pub daily_rate: Decimal,
    /// daily_rate / hours_per_day.
    pub hourly_rate: Decimal,
    /// Number of attendance records counted.
    pub attendance_days: u32,
    /// Total overtime hours counted.
    pub overtime_hours: u32,
    /// daily_rate * attendance_days.
    pub prorated_salary: Decimal,
    /// Sum of hours * hourly_rate * overtime multiplier.
    pub overtime_pay: Decimal,
    /// Sum of reimbursement amounts.
    pub reimbursement_total: Decimal,
    /// prorated_salary + overtime_pay + reimbursement_total.
    pub total_pay: Decimal,
}

/// Prorated salary: one daily rate per attendance record.
///
/// Records are not de-duplicated; two records on the same date both count.
pub fn prorated_salary(daily_rate: Decimal, attendance: &[AttendanceRecord]) -> EngineResult<Decimal> {
    daily_rate
        .checked_mul(Decimal::from(attendance.len()))
        .ok_or_else(|| overflow("prorated salary"))
}

/// Overtime pay: `Σ hours * hourly_rate * multiplier`.
pub fn overtime_pay(
    hourly_rate: Decimal,
    multiplier: Decimal,
    overtime: &[OvertimeEntry],
) -> EngineResult<Decimal> {
    overtime.iter().try_fold(Decimal::ZERO, |acc, entry| {
        Decimal::from(entry.hours)
            .checked_mul(hourly_rate)
            .and_then(|pay| pay.checked_mul(multiplier))
            .and_then(|pay| acc.checked_add(pay))
            .ok_or_else(|| overflow("overtime pay"))
    })
}

/// Sum of all reimbursement amounts.
pub fn reimbursement_total(reimbursements: &[ReimbursementEntry]) -> EngineResult<Decimal> {
    reimbursements.iter().try_fold(Decimal::ZERO, |acc, r| {
        acc.checked_add(r.amount)
            .ok_or_else(|| overflow("reimbursement total"))
    })
}

fn overflow(figure: &str) -> EngineError {
    EngineError::CalculationError {
        message: format!("{} exceeds the representable amount", figure),
    }
}

/// Calculates an employee's pay for a period.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] if `working_days` is 0, the policy
/// has zero hours per day, or a figure overflows.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::{calculate_pay, EmployeeFacts, PayPolicy};
/// use payroll_engine::models::{AttendanceRecord, Employee, OvertimeEntry, ReimbursementEntry};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let day = NaiveDate::from_ymd_opt(2025, 9, 2).unwrap();
/// let employee = Employee::new("user-001", Decimal::from(5_000_000));
/// let facts = EmployeeFacts {
///     attendance: (0..4).map(|_| AttendanceRecord::new("user-001", day)).collect(),
///     overtime: vec![OvertimeEntry::new("user-001", day, 2).unwrap()],
///     reimbursements: vec![
///         ReimbursementEntry::new("user-001", day, "Taxi", Decimal::from(50_000)).unwrap(),
///     ],
/// };
///
/// let breakdown = calculate_pay(&employee, 5, &facts, &PayPolicy::default()).unwrap();
/// assert_eq!(breakdown.total_pay, Decimal::from(4_550_000));
/// ```
pub fn calculate_pay(
    employee: &Employee,
    working_days: u32,
    facts: &EmployeeFacts,
    policy: &PayPolicy,
) -> EngineResult<PayBreakdown> {
    let daily = daily_rate(employee.base_salary, working_days)?;
    let hourly = hourly_rate(daily, policy.hours_per_day)?;

    let mut prorated = prorated_salary(daily, &facts.attendance)?;
    let mut overtime = overtime_pay(hourly, policy.overtime_multiplier, &facts.overtime)?;
    let mut reimbursed = reimbursement_total(&facts.reimbursements)?;

    if policy.round_to_cents {
        prorated = to_cents(prorated);
        overtime = to_cents(overtime);
        reimbursed = to_cents(reimbursed);
    }

    let total = prorated
        .checked_add(overtime)
        .and_then(|sum| sum.checked_add(reimbursed))
        .ok_or_else(|| overflow("total pay"))?;

    Ok(PayBreakdown {
        base_salary: employee.base_salary,
        working_days,
        daily_rate: daily,
        hourly_rate: hourly,
        attendance_days: facts.attendance.len() as u32,
        overtime_hours: facts.overtime.iter().map(|e| e.hours).sum(),
        prorated_salary: prorated,
        overtime_pay: overtime,
        reimbursement_total: reimbursed,
        total_pay: total,
    })
}

fn to_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
