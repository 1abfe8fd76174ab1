//! Daily and hourly rate derivation.
//!
//! Rates are derived from the employee's base salary and the working-day count
//! of the period: the daily rate spreads the salary over the working days, and
//! the hourly rate spreads the daily rate over a standard working day.

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};

/// Standard working hours per day.
pub const DEFAULT_HOURS_PER_DAY: u32 = 8;

/// Overtime is paid at this multiple of the hourly rate.
pub fn default_overtime_multiplier() -> Decimal {
    Decimal::from(2)
}

/// Computes the daily rate: `base_salary / working_days`.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] when `working_days` is 0.
///
/// # Example
///
/// ```
/// use payroll_engine::calculation::daily_rate;
/// use rust_decimal::Decimal;
///
/// let rate = daily_rate(Decimal::from(5_000_000), 5).unwrap();
/// assert_eq!(rate, Decimal::from(1_000_000));
/// ```
pub fn daily_rate(base_salary: Decimal, working_days: u32) -> EngineResult<Decimal> {
    if working_days == 0 {
        return Err(EngineError::CalculationError {
            message: "cannot derive a daily rate for a period with no working days".to_string(),
        });
    }
    Ok(base_salary / Decimal::from(working_days))
}

/// Computes the hourly rate: `daily_rate / hours_per_day`.
///
/// # Errors
///
/// Returns [`EngineError::CalculationError`] when `hours_per_day` is 0.
pub fn hourly_rate(daily_rate: Decimal, hours_per_day: u32) -> EngineResult<Decimal> {
    if hours_per_day == 0 {
        return Err(EngineError::CalculationError {
            message: "hours per day must be positive".to_string(),
        });
    }
    Ok(daily_rate / Decimal::from(hours_per_day))
}
