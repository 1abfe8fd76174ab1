//! Configuration types for the payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from the YAML configuration file. Every field has a
//! default, so an empty file yields a working configuration.

use std::time::Duration;

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculation::{DEFAULT_HOURS_PER_DAY, PayPolicy, default_overtime_multiplier};

/// What a run does when fetching an employee's facts fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactFetchPolicy {
    /// Log a warning and treat the failed source as having no records.
    #[default]
    TreatAsEmpty,
    /// Skip the employee's payslip and record the failure in the run report.
    FailEmployee,
}

/// Demo roster generated when the server starts.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    /// Employees to generate; 0 disables seeding.
    pub employees: usize,
    /// Lowest generated monthly salary.
    pub min_salary: u64,
    /// Highest generated monthly salary.
    pub max_salary: u64,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            employees: 0,
            min_salary: 4_000_000,
            max_salary: 10_000_000,
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Working hours in a day; divides the daily rate into an hourly rate.
    pub hours_per_day: u32,
    /// Multiple of the hourly rate paid for each overtime hour.
    pub overtime_multiplier: Decimal,
    /// Round payslip figures to two decimal places.
    pub round_to_cents: bool,
    /// Behaviour when an attendance, overtime or reimbursement fetch fails.
    pub fact_fetch_policy: FactFetchPolicy,
    /// Attempts made for a rollback status write before giving up.
    pub rollback_attempts: u32,
    /// Delay between rollback attempts, in milliseconds.
    pub rollback_backoff_ms: u64,
    /// Deadline for a run triggered over HTTP, in seconds.
    pub run_timeout_secs: Option<u64>,
    /// Address the HTTP server binds to.
    pub bind_address: String,
    /// Demo roster seeding for the in-memory store.
    pub seed: SeedConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hours_per_day: DEFAULT_HOURS_PER_DAY,
            overtime_multiplier: default_overtime_multiplier(),
            round_to_cents: false,
            fact_fetch_policy: FactFetchPolicy::default(),
            rollback_attempts: 3,
            rollback_backoff_ms: 100,
            run_timeout_secs: None,
            bind_address: "127.0.0.1:8080".to_string(),
            seed: SeedConfig::default(),
        }
    }
}

impl EngineConfig {
    /// The pay calculation parameters carried by this configuration.
    pub fn pay_policy(&self) -> PayPolicy {
        PayPolicy {
            hours_per_day: self.hours_per_day,
            overtime_multiplier: self.overtime_multiplier,
            round_to_cents: self.round_to_cents,
        }
    }

    /// The delay between rollback attempts.
    pub fn rollback_backoff(&self) -> Duration {
        Duration::from_millis(self.rollback_backoff_ms)
    }

    /// Checks the values serde cannot, returning a description of the first problem.
    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.hours_per_day == 0 {
            return Err("hours_per_day must be positive".to_string());
        }
        if self.overtime_multiplier <= Decimal::ZERO {
            return Err("overtime_multiplier must be positive".to_string());
        }
        if self.rollback_attempts == 0 {
            return Err("rollback_attempts must be at least 1".to_string());
        }
        if self.seed.min_salary > self.seed.max_salary {
            return Err("seed.min_salary must not exceed seed.max_salary".to_string());
        }
        Ok(())
    }
}
