//! Payroll run orchestration.
//!
//! A run moves the period `pending -> processing`, iterates the roster in order,
//! writes one payslip per employee and finally marks the period `completed`. A
//! cancelled run, or one whose roster cannot be loaded, reverts the period to
//! `pending`. Per-employee failures are recorded and never stop the run.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::runtime::Handle;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::calculation::{EmployeeFacts, calculate_pay, count_working_days};
use crate::config::FactFetchPolicy;
use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, PayrollPeriod, Payslip, PeriodStatus};
use crate::store::{PayslipWrite, PeriodRepository};

use super::report::{FailureStage, RunReport};
use super::PayrollEngine;

impl PayrollEngine {
    /// Runs payroll for a period.
    ///
    /// The cancellation token is checked once before each employee. When it is
    /// cancelled the run stops, the period is reverted to `pending` and
    /// [`EngineError::Cancelled`] is returned. Payslips already written stay.
    ///
    /// Dropping the returned future after the period entered `processing` also
    /// reverts it: the revert is spawned onto the current tokio runtime, with
    /// the same retries as any other rollback.
    ///
    /// # Errors
    ///
    /// - [`EngineError::PeriodNotFound`] if the period does not exist.
    /// - [`EngineError::PeriodAlreadyCompleted`] if payroll was already run.
    /// - [`EngineError::PeriodAlreadyProcessing`] if another run holds the period.
    /// - [`EngineError::Cancelled`] if the token was cancelled mid-run.
    /// - Any roster or status-write error, after reverting the period.
    pub async fn run_payroll(
        &self,
        period_id: &str,
        actor: &str,
        cancel: &CancellationToken,
    ) -> EngineResult<RunReport> {
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        let period = self.get_period(period_id).await?;
        match period.status {
            PeriodStatus::Completed => {
                return Err(EngineError::PeriodAlreadyCompleted { id: period.id });
            }
            PeriodStatus::Processing => {
                return Err(EngineError::PeriodAlreadyProcessing { id: period.id });
            }
            PeriodStatus::Pending => {}
        }

        self.periods
            .transition_status(
                &period.id,
                PeriodStatus::Pending,
                PeriodStatus::Processing,
                actor,
            )
            .await
            .map_err(|err| match err {
                EngineError::StatusConflict {
                    id,
                    actual: PeriodStatus::Completed,
                    ..
                } => EngineError::PeriodAlreadyCompleted { id },
                EngineError::StatusConflict { id, .. } => {
                    EngineError::PeriodAlreadyProcessing { id }
                }
                other => other,
            })?;
        info!(run_id = %run_id, period_id = %period.id, actor = %actor, "Payroll run started");

        let guard = ProcessingGuard {
            periods: self.periods.clone(),
            period_id: period.id.clone(),
            actor: actor.to_string(),
            attempts: self.config.rollback_attempts,
            backoff: self.config.rollback_backoff(),
            armed: true,
        };
        let result = self.run_claimed(&period, actor, cancel, run_id, started).await;
        guard.disarm();
        result
    }

    /// The body of a run, once the period is held in `processing`.
    ///
    /// Every early return has already completed or reverted the period.
    async fn run_claimed(
        &self,
        period: &PayrollPeriod,
        actor: &str,
        cancel: &CancellationToken,
        run_id: Uuid,
        started: Instant,
    ) -> EngineResult<RunReport> {
        let employees = match self.roster.list_employees().await {
            Ok(employees) => employees,
            Err(err) => {
                error!(run_id = %run_id, period_id = %period.id, error = %err, "Failed to load roster");
                self.rollback(&period.id, actor).await;
                return Err(err);
            }
        };

        let working_days = count_working_days(period.start_date, period.end_date);
        let mut report = RunReport::new(period, working_days, employees.len());

        if working_days == 0 {
            self.finalize(&period.id, actor).await?;
            report.completed = true;
            info!(
                run_id = %run_id,
                period_id = %period.id,
                "No working days in the period; marked completed without payslips"
            );
            return Ok(report);
        }

        for employee in &employees {
            if cancel.is_cancelled() {
                warn!(
                    run_id = %run_id,
                    period_id = %period.id,
                    processed = report.processed,
                    remaining = employees.len() - report.processed,
                    "Payroll run cancelled"
                );
                self.rollback(&period.id, actor).await;
                return Err(EngineError::Cancelled {
                    period_id: period.id.clone(),
                    processed: report.processed,
                });
            }

            self.process_employee(period, employee, working_days, actor, &mut report)
                .await;
            report.processed += 1;
        }

        self.finalize(&period.id, actor).await?;
        report.completed = true;

        info!(
            run_id = %run_id,
            period_id = %period.id,
            employees = report.employees,
            payslips_created = report.payslips_created,
            payslips_skipped = report.payslips_skipped,
            failures = report.failures.len(),
            duration_us = started.elapsed().as_micros() as u64,
            "Payroll run completed"
        );
        Ok(report)
    }

    /// Calculates and writes one employee's payslip, recording any failure.
    async fn process_employee(
        &self,
        period: &PayrollPeriod,
        employee: &Employee,
        working_days: u32,
        actor: &str,
        report: &mut RunReport,
    ) {
        let Some(facts) = self.fetch_facts(period, employee, report).await else {
            return;
        };

        let breakdown = match calculate_pay(employee, working_days, &facts, &self.config.pay_policy())
        {
            Ok(breakdown) => breakdown,
            Err(err) => {
                warn!(employee_id = %employee.id, error = %err, "Pay calculation failed");
                report.record_failure(&employee.id, FailureStage::Calculation, err.to_string());
                return;
            }
        };

        let payslip = Payslip::from_breakdown(&employee.id, &period.id, &breakdown, actor);
        match self.payslips.create(&payslip).await {
            Ok(PayslipWrite::Created) => {
                report.payslips_created += 1;
                debug!(
                    employee_id = %employee.id,
                    period_id = %period.id,
                    total_pay = %payslip.total_pay,
                    "Payslip written"
                );
            }
            Ok(PayslipWrite::AlreadyExists) => {
                report.payslips_skipped += 1;
                info!(
                    employee_id = %employee.id,
                    period_id = %period.id,
                    "Payslip already exists; skipped"
                );
            }
            Err(err) => {
                warn!(
                    employee_id = %employee.id,
                    period_id = %period.id,
                    error = %err,
                    "Failed to create payslip"
                );
                report.record_failure(&employee.id, FailureStage::PayslipWrite, err.to_string());
            }
        }
    }

    /// Pulls the three fact sources for an employee.
    ///
    /// Returns `None` when a fetch failed under [`FactFetchPolicy::FailEmployee`].
    async fn fetch_facts(
        &self,
        period: &PayrollPeriod,
        employee: &Employee,
        report: &mut RunReport,
    ) -> Option<EmployeeFacts> {
        let (start, end) = (period.start_date, period.end_date);

        let attendance = self.attendance.attendance_in_range(&employee.id, start, end).await;
        let attendance = self.tolerate(attendance, &employee.id, FailureStage::Attendance, report)?;

        let overtime = self.overtime.overtime_in_range(&employee.id, start, end).await;
        let overtime = self.tolerate(overtime, &employee.id, FailureStage::Overtime, report)?;

        let reimbursements = self
            .reimbursements
            .reimbursements_in_range(&employee.id, start, end)
            .await;
        let reimbursements =
            self.tolerate(reimbursements, &employee.id, FailureStage::Reimbursement, report)?;

        Some(EmployeeFacts {
            attendance,
            overtime,
            reimbursements,
        })
    }

    /// Applies the configured [`FactFetchPolicy`] to a fetch result.
    fn tolerate<T>(
        &self,
        result: EngineResult<Vec<T>>,
        employee_id: &str,
        stage: FailureStage,
        report: &mut RunReport,
    ) -> Option<Vec<T>> {
        match result {
            Ok(records) => Some(records),
            Err(err) => match self.config.fact_fetch_policy {
                FactFetchPolicy::TreatAsEmpty => {
                    warn!(
                        employee_id = %employee_id,
                        stage = ?stage,
                        error = %err,
                        "Fact fetch failed; treating as no records"
                    );
                    Some(Vec::new())
                }
                FactFetchPolicy::FailEmployee => {
                    warn!(
                        employee_id = %employee_id,
                        stage = ?stage,
                        error = %err,
                        "Fact fetch failed; skipping employee"
                    );
                    report.record_failure(employee_id, stage, err.to_string());
                    None
                }
            },
        }
    }

    /// Marks the period completed; on failure reverts it to pending.
    async fn finalize(&self, period_id: &str, actor: &str) -> EngineResult<()> {
        let result = self
            .periods
            .transition_status(
                period_id,
                PeriodStatus::Processing,
                PeriodStatus::Completed,
                actor,
            )
            .await;

        if let Err(err) = result {
            error!(period_id = %period_id, error = %err, "Failed to mark period completed");
            self.rollback(period_id, actor).await;
            return Err(err);
        }
        Ok(())
    }

    /// Reverts a processing period to pending.
    async fn rollback(&self, period_id: &str, actor: &str) {
        revert_to_pending(
            self.periods.as_ref(),
            period_id,
            actor,
            self.config.rollback_attempts,
            self.config.rollback_backoff(),
        )
        .await;
    }
}

/// Moves a period from `processing` back to `pending`.
///
/// Never observes a run's cancellation token, so it still runs after the
/// triggering caller has gone. Retries transient failures up to `attempts`
/// times; a status conflict ends the retries since the period is no longer
/// ours to revert.
async fn revert_to_pending(
    periods: &dyn PeriodRepository,
    period_id: &str,
    actor: &str,
    attempts: u32,
    backoff: Duration,
) {
    let attempts = attempts.max(1);

    for attempt in 1..=attempts {
        let result = periods
            .transition_status(
                period_id,
                PeriodStatus::Processing,
                PeriodStatus::Pending,
                actor,
            )
            .await;

        match result {
            Ok(_) => {
                info!(period_id = %period_id, attempt, "Period reverted to pending");
                return;
            }
            Err(err @ (EngineError::StatusConflict { .. } | EngineError::PeriodNotFound { .. })) => {
                warn!(period_id = %period_id, error = %err, "Rollback skipped");
                return;
            }
            Err(err) if attempt < attempts => {
                warn!(period_id = %period_id, attempt, error = %err, "Rollback failed; retrying");
                sleep(backoff).await;
            }
            Err(err) => {
                error!(
                    period_id = %period_id,
                    attempts,
                    error = %err,
                    "Rollback failed; period left in processing"
                );
            }
        }
    }
}

/// Reverts the period if a run is dropped while holding it in `processing`.
struct ProcessingGuard {
    periods: Arc<dyn PeriodRepository>,
    period_id: String,
    actor: String,
    attempts: u32,
    backoff: Duration,
    armed: bool,
}

impl ProcessingGuard {
    /// The run finished on its own terms; nothing to revert.
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let Ok(handle) = Handle::try_current() else {
            error!(
                period_id = %self.period_id,
                "Payroll run dropped outside a runtime; period left in processing"
            );
            return;
        };

        warn!(period_id = %self.period_id, "Payroll run dropped mid-run; reverting period");
        let periods = self.periods.clone();
        let period_id = std::mem::take(&mut self.period_id);
        let actor = std::mem::take(&mut self.actor);
        let (attempts, backoff) = (self.attempts, self.backoff);
        handle.spawn(async move {
            revert_to_pending(periods.as_ref(), &period_id, &actor, attempts, backoff).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::Collaborators;
    use crate::models::{AttendanceRecord, OvertimeEntry, ReimbursementEntry};
    use crate::store::{
        AttendanceSource, EmployeeRoster, MemoryStore, PayslipRepository, PeriodRepository,
    };

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, d).unwrap()
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn fast_config() -> EngineConfig {
        EngineConfig {
            rollback_backoff_ms: 1,
            ..Default::default()
        }
    }

    async fn seeded_store(employees: &[&str]) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for id in employees {
            store
                .add_employee(Employee::new(*id, dec("5000000")))
                .await;
        }
        store
    }

    /// Roster that always fails.
    struct BrokenRoster;

    #[async_trait]
    impl EmployeeRoster for BrokenRoster {
        async fn list_employees(&self) -> EngineResult<Vec<Employee>> {
            Err(EngineError::storage("roster unavailable"))
        }
    }

    /// Attendance source that fails for one employee.
    struct FlakyAttendance {
        inner: Arc<MemoryStore>,
        failing_employee: String,
    }

    #[async_trait]
    impl AttendanceSource for FlakyAttendance {
        async fn attendance_in_range(
            &self,
            employee_id: &str,
            start: NaiveDate,
            end: NaiveDate,
        ) -> EngineResult<Vec<AttendanceRecord>> {
            if employee_id == self.failing_employee {
                return Err(EngineError::storage("attendance timeout"));
            }
            self.inner.attendance_in_range(employee_id, start, end).await
        }
    }

    /// Payslip store that rejects one employee and cancels a token after N writes.
    struct ScriptedPayslips {
        inner: Arc<MemoryStore>,
        reject_employee: Option<String>,
        cancel_after: Option<(usize, CancellationToken)>,
        writes: AtomicUsize,
    }

    #[async_trait]
    impl PayslipRepository for ScriptedPayslips {
        async fn create(&self, payslip: &Payslip) -> EngineResult<PayslipWrite> {
            if self.reject_employee.as_deref() == Some(payslip.employee_id.as_str()) {
                return Err(EngineError::storage("disk full"));
            }
            let outcome = PayslipRepository::create(self.inner.as_ref(), payslip).await?;
            let writes = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some((limit, token)) = &self.cancel_after {
                if writes == *limit {
                    token.cancel();
                }
            }
            Ok(outcome)
        }

        async fn get(&self, employee_id: &str, period_id: &str) -> EngineResult<Option<Payslip>> {
            PayslipRepository::get(self.inner.as_ref(), employee_id, period_id).await
        }

        async fn list_by_period(&self, period_id: &str) -> EngineResult<Vec<Payslip>> {
            self.inner.list_by_period(period_id).await
        }
    }

    /// Payslip store that takes a while per write.
    struct SlowPayslips {
        inner: Arc<MemoryStore>,
        delay: Duration,
    }

    #[async_trait]
    impl PayslipRepository for SlowPayslips {
        async fn create(&self, payslip: &Payslip) -> EngineResult<PayslipWrite> {
            sleep(self.delay).await;
            PayslipRepository::create(self.inner.as_ref(), payslip).await
        }

        async fn get(&self, employee_id: &str, period_id: &str) -> EngineResult<Option<Payslip>> {
            PayslipRepository::get(self.inner.as_ref(), employee_id, period_id).await
        }

        async fn list_by_period(&self, period_id: &str) -> EngineResult<Vec<Payslip>> {
            self.inner.list_by_period(period_id).await
        }
    }

    /// Period store whose rollback writes fail a fixed number of times.
    struct StubbornPeriods {
        inner: Arc<MemoryStore>,
        failures_left: AtomicUsize,
    }

    #[async_trait]
    impl PeriodRepository for StubbornPeriods {
        async fn create(&self, period: &PayrollPeriod) -> EngineResult<()> {
            PeriodRepository::create(self.inner.as_ref(), period).await
        }

        async fn get(&self, id: &str) -> EngineResult<Option<PayrollPeriod>> {
            PeriodRepository::get(self.inner.as_ref(), id).await
        }

        async fn transition_status(
            &self,
            id: &str,
            expected: PeriodStatus,
            next: PeriodStatus,
            updated_by: &str,
        ) -> EngineResult<PayrollPeriod> {
            if next == PeriodStatus::Pending
                && self
                    .failures_left
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
            {
                return Err(EngineError::storage("write conflict, retry"));
            }
            self.inner
                .transition_status(id, expected, next, updated_by)
                .await
        }
    }

    #[tokio::test]
    async fn test_reference_scenario_writes_expected_payslip() {
        let store = seeded_store(&["user-001"]).await;
        for d in 1..=4 {
            store.record_attendance(AttendanceRecord::new("user-001", date(d))).await;
        }
        store
            .record_overtime(OvertimeEntry::new("user-001", date(2), 2).unwrap())
            .await;
        store
            .record_reimbursement(
                ReimbursementEntry::new("user-001", date(3), "Taxi", dec("50000")).unwrap(),
            )
            .await;

        let engine = PayrollEngine::with_store(store.clone(), fast_config());
        let period = engine.create_period(date(1), date(5), "admin-001").await.unwrap();
        let report = engine
            .run_payroll(&period.id, "admin-001", &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.completed);
        assert_eq!(report.working_days, 5);
        assert_eq!(report.payslips_created, 1);

        let payslip = engine.get_payslip("user-001", &period.id).await.unwrap();
        assert_eq!(payslip.base_salary, dec("5000000"));
        assert_eq!(payslip.prorated_salary, dec("4000000"));
        assert_eq!(payslip.overtime_pay, dec("500000"));
        assert_eq!(payslip.reimbursement_total, dec("50000"));
        assert_eq!(payslip.total_pay, dec("4550000"));
        assert_eq!(payslip.created_by, "admin-001");

        let period = engine.get_period(&period.id).await.unwrap();
        assert_eq!(period.status, PeriodStatus::Completed);
        assert_eq!(period.updated_by, "admin-001");
    }

    #[tokio::test]
    async fn test_facts_outside_period_are_ignored() {
        let store = seeded_store(&["user-001"]).await;
        store.record_attendance(AttendanceRecord::new("user-001", date(8))).await;
        store.record_attendance(AttendanceRecord::new("user-001", date(5))).await;

        let engine = PayrollEngine::with_store(store, fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();
        engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await
            .unwrap();

        let payslip = engine.get_payslip("user-001", &period.id).await.unwrap();
        assert_eq!(payslip.prorated_salary, dec("1000000"));
    }

    #[tokio::test]
    async fn test_completed_period_cannot_be_rerun() {
        let store = seeded_store(&["user-001"]).await;
        let engine = PayrollEngine::with_store(store.clone(), fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();
        engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await
            .unwrap();
        let before = store.payslip_count().await;

        let result = engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(EngineError::PeriodAlreadyCompleted { .. })));
        assert_eq!(store.payslip_count().await, before);
    }

    #[tokio::test]
    async fn test_processing_period_is_rejected_not_restarted() {
        let store = seeded_store(&["user-001"]).await;
        let engine = PayrollEngine::with_store(store.clone(), fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();
        store
            .transition_status(&period.id, PeriodStatus::Pending, PeriodStatus::Processing, "other")
            .await
            .unwrap();

        let result = engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(EngineError::PeriodAlreadyProcessing { .. })));
        assert_eq!(store.payslip_count().await, 0);
        assert_eq!(
            engine.get_period(&period.id).await.unwrap().status,
            PeriodStatus::Processing
        );
    }

    #[tokio::test]
    async fn test_missing_period_not_found() {
        let store = seeded_store(&[]).await;
        let engine = PayrollEngine::with_store(store, fast_config());
        let result = engine
            .run_payroll("missing", "admin", &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(EngineError::PeriodNotFound { .. })));
    }

    #[tokio::test]
    async fn test_zero_working_days_completes_without_payslips() {
        let store = seeded_store(&["user-001", "user-002"]).await;
        store.record_attendance(AttendanceRecord::new("user-001", date(6))).await;
        let engine = PayrollEngine::with_store(store.clone(), fast_config());
        // Saturday and Sunday
        let period = engine.create_period(date(6), date(7), "admin").await.unwrap();

        let report = engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.completed);
        assert_eq!(report.working_days, 0);
        assert_eq!(report.processed, 0);
        assert_eq!(store.payslip_count().await, 0);
        assert_eq!(
            engine.get_period(&period.id).await.unwrap().status,
            PeriodStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_roster_failure_reverts_to_pending() {
        let store = seeded_store(&[]).await;
        let mut collaborators = Collaborators::from_memory(store.clone());
        collaborators.roster = Arc::new(BrokenRoster);
        let engine = PayrollEngine::new(collaborators, fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();

        let result = engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await;

        match result {
            Err(EngineError::Storage { message }) => assert_eq!(message, "roster unavailable"),
            other => panic!("Expected Storage error, got {:?}", other),
        }
        assert_eq!(
            engine.get_period(&period.id).await.unwrap().status,
            PeriodStatus::Pending
        );
        assert_eq!(store.payslip_count().await, 0);
    }

    #[tokio::test]
    async fn test_cancellation_after_n_employees_reverts_and_keeps_written_payslips() {
        let store = seeded_store(&["e1", "e2", "e3", "e4", "e5"]).await;
        let token = CancellationToken::new();
        let mut collaborators = Collaborators::from_memory(store.clone());
        collaborators.payslips = Arc::new(ScriptedPayslips {
            inner: store.clone(),
            reject_employee: None,
            cancel_after: Some((2, token.clone())),
            writes: AtomicUsize::new(0),
        });
        let engine = PayrollEngine::new(collaborators, fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();

        let result = engine.run_payroll(&period.id, "admin", &token).await;

        match result {
            Err(EngineError::Cancelled { processed, .. }) => assert_eq!(processed, 2),
            other => panic!("Expected Cancelled, got {:?}", other),
        }
        assert_eq!(
            engine.get_period(&period.id).await.unwrap().status,
            PeriodStatus::Pending
        );
        let written: Vec<String> = store
            .list_by_period(&period.id)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.employee_id)
            .collect();
        assert_eq!(written, vec!["e1", "e2"]);
    }

    #[tokio::test]
    async fn test_already_cancelled_token_writes_nothing() {
        let store = seeded_store(&["e1", "e2"]).await;
        let engine = PayrollEngine::with_store(store.clone(), fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();
        let token = CancellationToken::new();
        token.cancel();

        let result = engine.run_payroll(&period.id, "admin", &token).await;

        assert!(matches!(result, Err(EngineError::Cancelled { processed: 0, .. })));
        assert_eq!(store.payslip_count().await, 0);
        assert_eq!(
            engine.get_period(&period.id).await.unwrap().status,
            PeriodStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_rerun_after_cancellation_skips_paid_employees() {
        let store = seeded_store(&["e1", "e2", "e3"]).await;
        let token = CancellationToken::new();
        let mut collaborators = Collaborators::from_memory(store.clone());
        collaborators.payslips = Arc::new(ScriptedPayslips {
            inner: store.clone(),
            reject_employee: None,
            cancel_after: Some((1, token.clone())),
            writes: AtomicUsize::new(0),
        });
        let engine = PayrollEngine::new(collaborators, fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();
        assert!(engine.run_payroll(&period.id, "admin", &token).await.is_err());

        let rerun = PayrollEngine::with_store(store.clone(), fast_config());
        let report = rerun
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.payslips_skipped, 1);
        assert_eq!(report.payslips_created, 2);
        assert_eq!(store.payslip_count().await, 3);
    }

    #[tokio::test]
    async fn test_payslip_write_failure_does_not_stop_run() {
        let store = seeded_store(&["e1", "e2", "e3"]).await;
        let mut collaborators = Collaborators::from_memory(store.clone());
        collaborators.payslips = Arc::new(ScriptedPayslips {
            inner: store.clone(),
            reject_employee: Some("e2".to_string()),
            cancel_after: None,
            writes: AtomicUsize::new(0),
        });
        let engine = PayrollEngine::new(collaborators, fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();

        let report = engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.completed);
        assert_eq!(report.processed, 3);
        assert_eq!(report.payslips_created, 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].employee_id, "e2");
        assert_eq!(report.failures[0].stage, FailureStage::PayslipWrite);
        assert_eq!(
            engine.get_period(&period.id).await.unwrap().status,
            PeriodStatus::Completed
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_treated_as_empty_by_default() {
        let store = seeded_store(&["e1", "e2"]).await;
        store.record_attendance(AttendanceRecord::new("e1", date(1))).await;
        store.record_attendance(AttendanceRecord::new("e2", date(1))).await;
        let mut collaborators = Collaborators::from_memory(store.clone());
        collaborators.attendance = Arc::new(FlakyAttendance {
            inner: store.clone(),
            failing_employee: "e1".to_string(),
        });
        let engine = PayrollEngine::new(collaborators, fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();

        let report = engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.failures.is_empty());
        assert_eq!(report.payslips_created, 2);
        let e1 = engine.get_payslip("e1", &period.id).await.unwrap();
        assert_eq!(e1.prorated_salary, Decimal::ZERO);
        let e2 = engine.get_payslip("e2", &period.id).await.unwrap();
        assert_eq!(e2.prorated_salary, dec("1000000"));
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_employee_when_configured() {
        let store = seeded_store(&["e1", "e2"]).await;
        let mut collaborators = Collaborators::from_memory(store.clone());
        collaborators.attendance = Arc::new(FlakyAttendance {
            inner: store.clone(),
            failing_employee: "e1".to_string(),
        });
        let config = EngineConfig {
            fact_fetch_policy: FactFetchPolicy::FailEmployee,
            ..fast_config()
        };
        let engine = PayrollEngine::new(collaborators, config);
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();

        let report = engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await
            .unwrap();

        assert!(report.completed);
        assert_eq!(report.payslips_created, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].stage, FailureStage::Attendance);
        assert!(matches!(
            engine.get_payslip("e1", &period.id).await,
            Err(EngineError::PayslipNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_rollback_retries_until_write_succeeds() {
        let store = seeded_store(&["e1"]).await;
        let mut collaborators = Collaborators::from_memory(store.clone());
        collaborators.roster = Arc::new(BrokenRoster);
        collaborators.periods = Arc::new(StubbornPeriods {
            inner: store.clone(),
            failures_left: AtomicUsize::new(2),
        });
        let engine = PayrollEngine::new(collaborators, fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();

        assert!(engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await
            .is_err());
        assert_eq!(
            engine.get_period(&period.id).await.unwrap().status,
            PeriodStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_concurrent_runs_only_one_enters_processing() {
        let store = seeded_store(&["e1", "e2", "e3"]).await;
        let engine = Arc::new(PayrollEngine::with_store(store.clone(), fast_config()));
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();

        let a = {
            let engine = engine.clone();
            let id = period.id.clone();
            tokio::spawn(async move {
                engine
                    .run_payroll(&id, "a", &CancellationToken::new())
                    .await
            })
        };
        let b = {
            let engine = engine.clone();
            let id = period.id.clone();
            tokio::spawn(async move {
                engine
                    .run_payroll(&id, "b", &CancellationToken::new())
                    .await
            })
        };
        let results = [a.await.unwrap(), b.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results.iter().any(|r| matches!(
            r,
            Err(EngineError::PeriodAlreadyProcessing { .. })
                | Err(EngineError::PeriodAlreadyCompleted { .. })
        )));
        assert_eq!(store.payslip_count().await, 3);
    }

    #[tokio::test]
    async fn test_dropped_run_reverts_to_pending() {
        let store = seeded_store(&[]).await;
        for i in 1..=20 {
            store
                .add_employee(Employee::new(format!("e{}", i), dec("5000000")))
                .await;
        }
        let mut collaborators = Collaborators::from_memory(store.clone());
        collaborators.payslips = Arc::new(SlowPayslips {
            inner: store.clone(),
            delay: Duration::from_millis(20),
        });
        let engine = PayrollEngine::new(collaborators, fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();

        let outcome = tokio::time::timeout(
            Duration::from_millis(70),
            engine.run_payroll(&period.id, "admin", &CancellationToken::new()),
        )
        .await;
        assert!(outcome.is_err());

        let mut status = PeriodStatus::Processing;
        for _ in 0..100 {
            status = engine.get_period(&period.id).await.unwrap().status;
            if status == PeriodStatus::Pending {
                break;
            }
            sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(status, PeriodStatus::Pending);
        assert!(store.payslip_count().await < 20);
    }

    #[tokio::test]
    async fn test_finished_run_is_not_reverted() {
        let store = seeded_store(&["e1"]).await;
        let engine = PayrollEngine::with_store(store, fast_config());
        let period = engine.create_period(date(1), date(5), "admin").await.unwrap();
        engine
            .run_payroll(&period.id, "admin", &CancellationToken::new())
            .await
            .unwrap();

        sleep(Duration::from_millis(20)).await;
        assert_eq!(
            engine.get_period(&period.id).await.unwrap().status,
            PeriodStatus::Completed
        );
    }
}
