//! Operator control commands against the execution store.
//!
//! Every command yields a [`ControlOutcome`]. Failures the store classifies
//! become `Rejected` with a reason code; only a store that could not be asked
//! at all surfaces as [`ControlError`].

use thiserror::Error;

use batchadmin_core::{AdminError, JobExecutionId, JobInstanceId};
use batchadmin_views::{ExecutionProjector, JobExecutionView};

use crate::execution_store::{ExecutionStore, StoreError};

/// Why a control command was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectionReason {
    NoSuchJobExecution,
    NoSuchJob,
    NoSuchJobInstance,
    /// Stop requested on a finished execution.
    NotRunning,
    /// Abandon requested on a running execution.
    Running,
    /// Restart requested while the instance is still running.
    AlreadyRunning,
    RestartRejected,
    InstanceAlreadyComplete,
    InvalidParameters,
}

impl RejectionReason {
    pub fn code(self) -> &'static str {
        match self {
            RejectionReason::NoSuchJobExecution => "no.such.job.execution",
            RejectionReason::NoSuchJob => "no.such.job",
            RejectionReason::NoSuchJobInstance => "no.such.job.instance",
            RejectionReason::NotRunning => "job.execution.not.running",
            RejectionReason::Running => "job.execution.running",
            RejectionReason::AlreadyRunning => "job.execution.already.running",
            RejectionReason::RestartRejected => "job.restart.exception",
            RejectionReason::InstanceAlreadyComplete => "job.instance.already.complete",
            RejectionReason::InvalidParameters => "job.parameters.invalid",
        }
    }

    pub fn is_not_found(self) -> bool {
        matches!(
            self,
            RejectionReason::NoSuchJobExecution
                | RejectionReason::NoSuchJob
                | RejectionReason::NoSuchJobInstance
        )
    }

    fn classify(command: Command, error: &StoreError) -> Option<Self> {
        let reason = match error {
            StoreError::NoSuchJobExecution(_) => RejectionReason::NoSuchJobExecution,
            StoreError::NoSuchJob(_) => RejectionReason::NoSuchJob,
            StoreError::NoSuchJobInstance(_) => RejectionReason::NoSuchJobInstance,
            StoreError::NotRunning(_) => RejectionReason::NotRunning,
            StoreError::AlreadyRunning(_) => match command {
                Command::Abandon => RejectionReason::Running,
                Command::Stop | Command::Restart => RejectionReason::AlreadyRunning,
            },
            StoreError::RestartRejected(_) => RejectionReason::RestartRejected,
            StoreError::InstanceAlreadyComplete(_) => RejectionReason::InstanceAlreadyComplete,
            StoreError::InvalidParameters(_) => RejectionReason::InvalidParameters,
            StoreError::NoSuchStepExecution { .. } | StoreError::Storage(_) => return None,
        };
        Some(reason)
    }
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Result of a control command.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlOutcome {
    /// The store applied the command; carries the updated execution.
    Applied(JobExecutionView),
    /// The store refused the command. `current` is the execution as it stands,
    /// when it could be re-read.
    Rejected {
        reason: RejectionReason,
        message: String,
        current: Option<JobExecutionView>,
    },
}

impl ControlOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ControlOutcome::Applied(_))
    }

    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            ControlOutcome::Applied(_) => None,
            ControlOutcome::Rejected { reason, .. } => Some(*reason),
        }
    }

    /// The applied view, or the current view attached to a rejection.
    pub fn view(&self) -> Option<&JobExecutionView> {
        match self {
            ControlOutcome::Applied(view) => Some(view),
            ControlOutcome::Rejected { current, .. } => current.as_ref(),
        }
    }
}

/// A control command that could not be attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ControlError> for AdminError {
    fn from(value: ControlError) -> Self {
        match value {
            ControlError::Store(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Command {
    Stop,
    Abandon,
    Restart,
}

impl Command {
    fn as_str(self) -> &'static str {
        match self {
            Command::Stop => "stop",
            Command::Abandon => "abandon",
            Command::Restart => "restart",
        }
    }
}

/// Dispatches stop/abandon/restart to the store and projects the result.
#[derive(Debug, Clone)]
pub struct ExecutionControl<S> {
    store: S,
    projector: ExecutionProjector,
}

impl<S> ExecutionControl<S>
where
    S: ExecutionStore,
{
    pub fn new(store: S, projector: ExecutionProjector) -> Self {
        Self { store, projector }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stop(&self, id: JobExecutionId) -> Result<ControlOutcome, ControlError> {
        match self.store.stop(id) {
            Ok(execution) => Ok(self.applied(Command::Stop, self.projector.job_view(&execution))),
            Err(e) => self.reject(Command::Stop, id, e),
        }
    }

    pub fn abandon(&self, id: JobExecutionId) -> Result<ControlOutcome, ControlError> {
        match self.store.abandon(id) {
            Ok(execution) => Ok(self.applied(Command::Abandon, self.projector.job_view(&execution))),
            Err(e) => self.reject(Command::Abandon, id, e),
        }
    }

    /// Restart the instance that `id` belongs to from its most recent execution.
    pub fn restart(&self, id: JobExecutionId) -> Result<ControlOutcome, ControlError> {
        let execution = match self.store.job_execution(id) {
            Ok(execution) => execution,
            Err(e) => return self.reject(Command::Restart, id, e),
        };
        match &execution.instance {
            Some(instance) => self.restart_instance(&instance.job_name, instance.id),
            None => Ok(self.rejected(
                Command::Restart,
                RejectionReason::NoSuchJob,
                format!("job execution {id} has no resolvable job"),
                None,
            )),
        }
    }

    /// Restart a job instance from its most recent execution.
    ///
    /// An unknown job is rejected before the store is asked to restart
    /// anything, so state conflicts never mask it.
    pub fn restart_instance(
        &self,
        job_name: &str,
        instance_id: JobInstanceId,
    ) -> Result<ControlOutcome, ControlError> {
        let executions = match self.store.job_executions_for_instance(job_name, instance_id) {
            Ok(executions) => executions,
            Err(e) => return self.reject_without_view(Command::Restart, e),
        };
        let Some(latest) = executions.iter().max_by_key(|e| e.id) else {
            return Ok(self.rejected(
                Command::Restart,
                RejectionReason::NoSuchJobExecution,
                format!("job instance {instance_id} of {job_name} has no executions"),
                None,
            ));
        };

        match self.store.restart(latest.id) {
            Ok(execution) => Ok(self.applied(Command::Restart, self.projector.job_view(&execution))),
            Err(e) => self.reject(Command::Restart, latest.id, e),
        }
    }

    /// Stop every running execution; returns how many were stopped.
    pub fn stop_all(&self) -> Result<usize, ControlError> {
        let stopped = self.store.stop_all()?;
        tracing::info!(stopped, "stopped all running job executions");
        Ok(stopped)
    }

    fn applied(&self, command: Command, view: JobExecutionView) -> ControlOutcome {
        tracing::info!(
            command = command.as_str(),
            job_execution_id = %view.id(),
            status = %view.status(),
            "control command applied"
        );
        ControlOutcome::Applied(view)
    }

    fn rejected(
        &self,
        command: Command,
        reason: RejectionReason,
        message: String,
        current: Option<JobExecutionView>,
    ) -> ControlOutcome {
        tracing::warn!(command = command.as_str(), reason = reason.code(), "{message}");
        ControlOutcome::Rejected {
            reason,
            message,
            current,
        }
    }

    fn reject(
        &self,
        command: Command,
        id: JobExecutionId,
        error: StoreError,
    ) -> Result<ControlOutcome, ControlError> {
        let Some(reason) = RejectionReason::classify(command, &error) else {
            return Err(error.into());
        };
        let current = if reason.is_not_found() {
            None
        } else {
            self.current_view(id)
        };
        Ok(self.rejected(command, reason, error.to_string(), current))
    }

    fn reject_without_view(
        &self,
        command: Command,
        error: StoreError,
    ) -> Result<ControlOutcome, ControlError> {
        match RejectionReason::classify(command, &error) {
            Some(reason) => Ok(self.rejected(command, reason, error.to_string(), None)),
            None => Err(error.into()),
        }
    }

    /// Re-read an execution after a rejection. A failed read only drops the view.
    fn current_view(&self, id: JobExecutionId) -> Option<JobExecutionView> {
        match self.store.job_execution(id) {
            Ok(execution) => Some(self.projector.job_view(&execution)),
            Err(e) => {
                tracing::debug!(job_execution_id = %id, "current state unavailable: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use batchadmin_core::{
        BatchStatus, JobExecution, JobInstance, JobParameters, StepExecution, StepExecutionId,
    };

    use crate::execution_store::{InMemoryExecutionStore, JobDefinition};

    fn execution(id: i64, instance: i64, job: &str, status: BatchStatus) -> JobExecution {
        JobExecution::new(
            JobExecutionId::new(id),
            JobInstance::new(JobInstanceId::new(instance), job),
            JobParameters::new().with_long("run.id", instance),
        )
        .with_status(status)
    }

    fn control_with(executions: Vec<JobExecution>) -> ExecutionControl<Arc<InMemoryExecutionStore>> {
        let store = InMemoryExecutionStore::arc();
        store.register_job(JobDefinition::new("payroll")).unwrap();
        for e in executions {
            store.insert_execution(e).unwrap();
        }
        ExecutionControl::new(store, ExecutionProjector::default())
    }

    #[test]
    fn stop_running_execution_is_applied() {
        let control = control_with(vec![execution(17, 1, "payroll", BatchStatus::Started)]);

        let outcome = control.stop(JobExecutionId::new(17)).unwrap();

        assert!(outcome.is_applied());
        let view = outcome.view().unwrap();
        assert_eq!(view.status(), BatchStatus::Stopping);
        assert!(!view.is_stoppable());
    }

    #[test]
    fn stop_finished_execution_is_rejected_with_unchanged_view() {
        let control = control_with(vec![execution(3, 1, "payroll", BatchStatus::Completed)]);

        let outcome = control.stop(JobExecutionId::new(3)).unwrap();

        assert_eq!(outcome.reason(), Some(RejectionReason::NotRunning));
        let current = outcome.view().unwrap();
        assert_eq!(current.id(), JobExecutionId::new(3));
        assert_eq!(current.status(), BatchStatus::Completed);
    }

    #[test]
    fn missing_execution_is_rejected_without_view() {
        let control = control_with(vec![]);

        for outcome in [
            control.stop(JobExecutionId::new(99)).unwrap(),
            control.abandon(JobExecutionId::new(99)).unwrap(),
            control.restart(JobExecutionId::new(99)).unwrap(),
        ] {
            assert_eq!(outcome.reason(), Some(RejectionReason::NoSuchJobExecution));
            assert!(outcome.view().is_none());
        }
    }

    #[test]
    fn abandon_running_execution_uses_running_reason() {
        let control = control_with(vec![execution(5, 1, "payroll", BatchStatus::Started)]);

        let outcome = control.abandon(JobExecutionId::new(5)).unwrap();

        assert_eq!(outcome.reason(), Some(RejectionReason::Running));
        assert_eq!(outcome.reason().map(RejectionReason::code), Some("job.execution.running"));
        assert_eq!(outcome.view().unwrap().status(), BatchStatus::Started);
    }

    #[test]
    fn abandon_failed_execution_is_applied() {
        let control = control_with(vec![execution(22, 1, "payroll", BatchStatus::Failed)]);

        let outcome = control.abandon(JobExecutionId::new(22)).unwrap();

        let view = outcome.view().unwrap();
        assert_eq!(view.status(), BatchStatus::Abandoned);
        assert!(!view.is_restartable());
        assert!(!view.is_abandonable());
        assert!(!view.is_stoppable());
    }

    #[test]
    fn abandonable_flag_matches_abandon_outcome() {
        let statuses = [
            BatchStatus::Starting,
            BatchStatus::Started,
            BatchStatus::Stopping,
            BatchStatus::Stopped,
            BatchStatus::Completed,
            BatchStatus::Failed,
            BatchStatus::Unknown,
        ];
        let control = control_with(
            statuses
                .iter()
                .zip(1..)
                .map(|(&status, id)| execution(id, id, "payroll", status))
                .collect(),
        );

        for (status, id) in statuses.into_iter().zip(1..) {
            let id = JobExecutionId::new(id);
            let advertised = control
                .store()
                .job_execution(id)
                .map(|e| ExecutionProjector::default().job_view(&e).is_abandonable())
                .unwrap();
            let outcome = control.abandon(id).unwrap();
            assert_eq!(outcome.is_applied(), advertised, "{status:?}");
        }
    }

    #[test]
    fn abandon_stopping_execution_is_applied() {
        let control = control_with(vec![execution(8, 1, "payroll", BatchStatus::Stopping)]);

        let outcome = control.abandon(JobExecutionId::new(8)).unwrap();

        assert!(outcome.is_applied());
        assert_eq!(outcome.view().unwrap().status(), BatchStatus::Abandoned);
    }

    #[test]
    fn restart_uses_most_recent_execution_of_instance() {
        let control = control_with(vec![
            execution(1, 4, "payroll", BatchStatus::Failed),
            execution(2, 4, "payroll", BatchStatus::Stopped),
        ]);

        let outcome = control.restart(JobExecutionId::new(1)).unwrap();

        let view = outcome.view().unwrap();
        assert!(outcome.is_applied());
        assert_eq!(view.id(), JobExecutionId::new(3));
        assert_eq!(view.job_instance_id(), Some(JobInstanceId::new(4)));
        assert_eq!(view.status(), BatchStatus::Starting);
    }

    #[test]
    fn restart_of_unknown_job_is_rejected_before_state_checks() {
        // running, so the store would otherwise report a conflict
        let control = control_with(vec![execution(8, 2, "ghost", BatchStatus::Started)]);

        let outcome = control.restart(JobExecutionId::new(8)).unwrap();

        assert_eq!(outcome.reason(), Some(RejectionReason::NoSuchJob));
        assert!(outcome.view().is_none());
    }

    #[test]
    fn restart_of_unresolvable_instance_is_no_such_job() {
        let mut orphan = execution(9, 1, "payroll", BatchStatus::Failed);
        orphan.instance = None;
        let control = control_with(vec![orphan]);

        let outcome = control.restart(JobExecutionId::new(9)).unwrap();

        assert_eq!(outcome.reason(), Some(RejectionReason::NoSuchJob));
    }

    #[test]
    fn restart_conflicts_attach_current_view() {
        let control = control_with(vec![
            execution(1, 1, "payroll", BatchStatus::Completed),
            execution(2, 2, "payroll", BatchStatus::Started),
        ]);

        let complete = control.restart(JobExecutionId::new(1)).unwrap();
        assert_eq!(complete.reason(), Some(RejectionReason::InstanceAlreadyComplete));
        assert_eq!(complete.view().unwrap().status(), BatchStatus::Completed);

        let running = control.restart(JobExecutionId::new(2)).unwrap();
        assert_eq!(running.reason(), Some(RejectionReason::AlreadyRunning));
        assert_eq!(running.view().unwrap().id(), JobExecutionId::new(2));
    }

    #[test]
    fn restart_instance_reports_unknown_instance() {
        let control = control_with(vec![execution(1, 1, "payroll", BatchStatus::Failed)]);

        let outcome = control
            .restart_instance("payroll", JobInstanceId::new(404))
            .unwrap();
        assert_eq!(outcome.reason(), Some(RejectionReason::NoSuchJobInstance));

        let outcome = control.restart_instance("ghost", JobInstanceId::new(1)).unwrap();
        assert_eq!(outcome.reason(), Some(RejectionReason::NoSuchJob));
    }

    #[test]
    fn stop_all_reports_aggregate_count() {
        let control = control_with(vec![
            execution(1, 1, "payroll", BatchStatus::Started),
            execution(2, 2, "payroll", BatchStatus::Starting),
            execution(3, 3, "payroll", BatchStatus::Failed),
        ]);

        assert_eq!(control.stop_all().unwrap(), 2);
    }

    /// Store whose reads fail after rejecting every stop.
    struct UnreadableStore;

    impl ExecutionStore for UnreadableStore {
        fn job_execution(&self, _: JobExecutionId) -> Result<JobExecution, StoreError> {
            Err(StoreError::Storage("read timed out".into()))
        }
        fn list_job_executions(&self, _: usize, _: usize) -> Result<Vec<JobExecution>, StoreError> {
            Err(StoreError::Storage("read timed out".into()))
        }
        fn count_job_executions(&self) -> Result<u64, StoreError> {
            Err(StoreError::Storage("read timed out".into()))
        }
        fn list_job_executions_for_job(
            &self,
            _: &str,
            _: usize,
            _: usize,
        ) -> Result<Vec<JobExecution>, StoreError> {
            Err(StoreError::Storage("read timed out".into()))
        }
        fn count_job_executions_for_job(&self, _: &str) -> Result<u64, StoreError> {
            Err(StoreError::Storage("read timed out".into()))
        }
        fn job_instance(&self, id: JobInstanceId) -> Result<JobInstance, StoreError> {
            Err(StoreError::NoSuchJobInstance(id))
        }
        fn job_executions_for_instance(
            &self,
            _: &str,
            _: JobInstanceId,
        ) -> Result<Vec<JobExecution>, StoreError> {
            Err(StoreError::Storage("read timed out".into()))
        }
        fn step_names_for_job(&self, _: &str) -> Result<Vec<String>, StoreError> {
            Ok(vec![])
        }
        fn step_execution(
            &self,
            job_execution_id: JobExecutionId,
            step: StepExecutionId,
        ) -> Result<StepExecution, StoreError> {
            Err(StoreError::NoSuchStepExecution {
                job_execution: job_execution_id,
                step,
            })
        }
        fn running_job_executions(&self) -> Result<Vec<JobExecution>, StoreError> {
            Err(StoreError::Storage("read timed out".into()))
        }
        fn stop(&self, id: JobExecutionId) -> Result<JobExecution, StoreError> {
            Err(StoreError::NotRunning(id))
        }
        fn abandon(&self, _: JobExecutionId) -> Result<JobExecution, StoreError> {
            Err(StoreError::Storage("write refused".into()))
        }
        fn restart(&self, id: JobExecutionId) -> Result<JobExecution, StoreError> {
            Err(StoreError::NoSuchJobExecution(id))
        }
        fn is_launchable(&self, _: &str) -> bool {
            false
        }
        fn is_incrementable(&self, _: &str) -> bool {
            false
        }
    }

    #[test]
    fn failed_refetch_keeps_rejection() {
        let control = ExecutionControl::new(UnreadableStore, ExecutionProjector::default());

        let outcome = control.stop(JobExecutionId::new(1)).unwrap();

        assert_eq!(outcome.reason(), Some(RejectionReason::NotRunning));
        assert!(outcome.view().is_none());
    }

    #[test]
    fn unavailable_store_is_an_error_not_a_rejection() {
        let control = ExecutionControl::new(UnreadableStore, ExecutionProjector::default());

        let err = control.abandon(JobExecutionId::new(1)).unwrap_err();
        assert_eq!(AdminError::from(err).code(), "store.unavailable");
        assert!(control.stop_all().is_err());
    }

    #[test]
    fn reason_codes_are_stable() {
        let codes: Vec<_> = [
            RejectionReason::NoSuchJobExecution,
            RejectionReason::NoSuchJob,
            RejectionReason::NoSuchJobInstance,
            RejectionReason::NotRunning,
            RejectionReason::Running,
            RejectionReason::AlreadyRunning,
            RejectionReason::RestartRejected,
            RejectionReason::InstanceAlreadyComplete,
            RejectionReason::InvalidParameters,
        ]
        .iter()
        .map(|r| r.code())
        .collect();

        assert_eq!(
            codes,
            vec![
                "no.such.job.execution",
                "no.such.job",
                "no.such.job.instance",
                "job.execution.not.running",
                "job.execution.running",
                "job.execution.already.running",
                "job.restart.exception",
                "job.instance.already.complete",
                "job.parameters.invalid",
            ]
        );
    }
}
