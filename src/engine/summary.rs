//! Payslip and summary queries.

use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{PayrollSummary, Payslip};

use super::PayrollEngine;

impl PayrollEngine {
    /// Loads the payslip of an employee for a period.
    ///
    /// # Errors
    ///
    /// [`EngineError::PayslipNotFound`] if none was written for the pair.
    pub async fn get_payslip(&self, employee_id: &str, period_id: &str) -> EngineResult<Payslip> {
        self.payslips
            .get(employee_id, period_id)
            .await?
            .ok_or_else(|| EngineError::PayslipNotFound {
                employee_id: employee_id.to_string(),
                period_id: period_id.to_string(),
            })
    }

    /// Summarizes every payslip written for a period.
    ///
    /// An unknown period, or one not yet run, yields an empty summary.
    ///
    /// # Errors
    ///
    /// A payslip store error, or [`EngineError::CalculationError`] if the total
    /// payout overflows.
    pub async fn get_payroll_summary(&self, period_id: &str) -> EngineResult<PayrollSummary> {
        let payslips = self.payslips.list_by_period(period_id).await?;
        let summary = PayrollSummary::from_payslips(period_id, &payslips)?;

        debug!(
            period_id = %period_id,
            payslips = payslips.len(),
            total_payout = %summary.total_payout,
            "Payroll summary computed"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tokio_util::sync::CancellationToken;

    use crate::config::EngineConfig;
    use crate::engine::PayrollEngine;
    use crate::error::EngineError;
    use crate::models::{AttendanceRecord, Employee};
    use crate::store::MemoryStore;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    #[tokio::test]
    async fn test_missing_payslip_not_found() {
        let engine = PayrollEngine::with_store(Arc::new(MemoryStore::new()), EngineConfig::default());
        match engine.get_payslip("user-001", "period-001").await {
            Err(EngineError::PayslipNotFound {
                employee_id,
                period_id,
            }) => {
                assert_eq!(employee_id, "user-001");
                assert_eq!(period_id, "period-001");
            }
            other => panic!("Expected PayslipNotFound, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_summary_of_unknown_period_is_empty() {
        let engine = PayrollEngine::with_store(Arc::new(MemoryStore::new()), EngineConfig::default());
        let summary = engine.get_payroll_summary("nope").await.unwrap();
        assert_eq!(summary.period_id, "nope");
        assert!(summary.employee_pays.is_empty());
        assert_eq!(summary.total_payout, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_summary_total_equals_sum_of_payslips() {
        let store = Arc::new(MemoryStore::new());
        store.add_employee(Employee::new("e1", Decimal::from(5_000_000))).await;
        store.add_employee(Employee::new("e2", Decimal::from(2_500_000))).await;
        store.add_employee(Employee::new("e3", Decimal::from(7_000_000))).await;
        for d in 1..=3 {
            store.record_attendance(AttendanceRecord::new("e1", date(d))).await;
        }
        store.record_attendance(AttendanceRecord::new("e3", date(4))).await;

        let engine = PayrollEngine::with_store(store, EngineConfig::default());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();
        engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await
            .unwrap();

        let summary = engine.get_payroll_summary(&period.id).await.unwrap();
        let ids: Vec<&str> = summary
            .employee_pays
            .iter()
            .map(|e| e.employee_id.as_str())
            .collect();
        assert_eq!(ids, vec!["e1", "e2", "e3"]);

        let mut expected = Decimal::ZERO;
        for id in ["e1", "e2", "e3"] {
            expected += engine.get_payslip(id, &period.id).await.unwrap().total_pay;
        }
        assert_eq!(summary.total_payout, expected);
        assert_eq!(summary.total_payout, Decimal::from(4_400_000));
    }
}
