//! Calculation logic for the payroll engine.
//!
//! This module contains the pure calculation functions used by a payroll run:
//! working-day counting, daily and hourly rate derivation, and the per-employee
//! pay breakdown (proration, overtime and reimbursements).

mod pay;
mod rates;
mod working_days;

pub use pay::{
    EmployeeFacts, PayBreakdown, PayPolicy, calculate_pay, overtime_pay, prorated_salary,
    reimbursement_total,
};
pub use rates::{DEFAULT_HOURS_PER_DAY, daily_rate, default_overtime_multiplier, hourly_rate};
pub use working_days::{count_working_days, is_working_day};
