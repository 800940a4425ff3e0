use std::sync::Arc;

use thiserror::Error;

use batchadmin_core::{
    AdminError, JobExecution, JobExecutionId, JobInstance, JobInstanceId, StepExecution,
    StepExecutionId,
};

/// Failure vocabulary of the execution store.
///
/// Each variant is a distinct failure the admin layer classifies; `Storage`
/// covers a backend that could not answer at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no job execution with id={0}")]
    NoSuchJobExecution(JobExecutionId),
    #[error("no job instance with id={0}")]
    NoSuchJobInstance(JobInstanceId),
    #[error("no job named {0}")]
    NoSuchJob(String),
    #[error("no step execution with id={step} in job execution {job_execution}")]
    NoSuchStepExecution {
        job_execution: JobExecutionId,
        step: StepExecutionId,
    },
    #[error("job execution with id={0} is not running")]
    NotRunning(JobExecutionId),
    #[error("job execution with id={0} is running")]
    AlreadyRunning(JobExecutionId),
    #[error("restart rejected: {0}")]
    RestartRejected(String),
    #[error("job instance already complete: {0}")]
    InstanceAlreadyComplete(String),
    #[error("invalid job parameters: {0}")]
    InvalidParameters(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for AdminError {
    fn from(value: StoreError) -> Self {
        let message = value.to_string();
        match value {
            StoreError::NoSuchJobExecution(_) => AdminError::not_found("no.such.job.execution", message),
            StoreError::NoSuchJobInstance(_) => AdminError::not_found("no.such.job.instance", message),
            StoreError::NoSuchJob(_) => AdminError::not_found("no.such.job", message),
            StoreError::NoSuchStepExecution { .. } => {
                AdminError::not_found("no.such.step.execution", message)
            }
            StoreError::NotRunning(_) => AdminError::conflict("job.execution.not.running", message),
            StoreError::AlreadyRunning(_) => {
                AdminError::conflict("job.execution.already.running", message)
            }
            StoreError::RestartRejected(_) => AdminError::conflict("job.restart.exception", message),
            StoreError::InstanceAlreadyComplete(_) => {
                AdminError::conflict("job.instance.already.complete", message)
            }
            StoreError::InvalidParameters(_) => AdminError::conflict("job.parameters.invalid", message),
            StoreError::Storage(msg) => AdminError::unavailable(msg),
        }
    }
}

/// Narrow query/command interface of the external batch engine.
///
/// Implementations own persistence and consistency; every call is one
/// synchronous, independently consistent operation. Listing is ordered
/// newest execution first.
pub trait ExecutionStore: Send + Sync {
    fn job_execution(&self, id: JobExecutionId) -> Result<JobExecution, StoreError>;

    fn list_job_executions(&self, offset: usize, limit: usize) -> Result<Vec<JobExecution>, StoreError>;

    fn count_job_executions(&self) -> Result<u64, StoreError>;

    fn list_job_executions_for_job(
        &self,
        job_name: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<JobExecution>, StoreError>;

    fn count_job_executions_for_job(&self, job_name: &str) -> Result<u64, StoreError>;

    fn job_instance(&self, id: JobInstanceId) -> Result<JobInstance, StoreError>;

    fn job_executions_for_instance(
        &self,
        job_name: &str,
        instance_id: JobInstanceId,
    ) -> Result<Vec<JobExecution>, StoreError>;

    /// Step names the job declares, in declaration order.
    fn step_names_for_job(&self, job_name: &str) -> Result<Vec<String>, StoreError>;

    fn step_execution(
        &self,
        job_execution_id: JobExecutionId,
        step_id: StepExecutionId,
    ) -> Result<StepExecution, StoreError>;

    /// Executions that are currently starting, started or stopping.
    fn running_job_executions(&self) -> Result<Vec<JobExecution>, StoreError>;

    /// Request a running execution to stop.
    fn stop(&self, id: JobExecutionId) -> Result<JobExecution, StoreError>;

    /// Mark a non-running execution as abandoned.
    fn abandon(&self, id: JobExecutionId) -> Result<JobExecution, StoreError>;

    /// Launch a new execution of the same instance with the parameters of `id`.
    fn restart(&self, id: JobExecutionId) -> Result<JobExecution, StoreError>;

    fn is_launchable(&self, job_name: &str) -> bool;

    fn is_incrementable(&self, job_name: &str) -> bool;

    /// Stop every running execution, returning how many were stopped.
    ///
    /// Per-execution failures (e.g. one finished between enumeration and
    /// stop) are not reported; only a failure to enumerate propagates.
    fn stop_all(&self) -> Result<usize, StoreError> {
        let running = self.running_job_executions()?;
        let mut stopped = 0;
        for execution in running {
            match self.stop(execution.id) {
                Ok(_) => stopped += 1,
                Err(e) => tracing::debug!(job_execution_id = %execution.id, "stop skipped: {e}"),
            }
        }
        Ok(stopped)
    }
}

impl<S> ExecutionStore for Arc<S>
where
    S: ExecutionStore + ?Sized,
{
    fn job_execution(&self, id: JobExecutionId) -> Result<JobExecution, StoreError> {
        (**self).job_execution(id)
    }

    fn list_job_executions(&self, offset: usize, limit: usize) -> Result<Vec<JobExecution>, StoreError> {
        (**self).list_job_executions(offset, limit)
    }

    fn count_job_executions(&self) -> Result<u64, StoreError> {
        (**self).count_job_executions()
    }

    fn list_job_executions_for_job(
        &self,
        job_name: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<JobExecution>, StoreError> {
        (**self).list_job_executions_for_job(job_name, offset, limit)
    }

    fn count_job_executions_for_job(&self, job_name: &str) -> Result<u64, StoreError> {
        (**self).count_job_executions_for_job(job_name)
    }

    fn job_instance(&self, id: JobInstanceId) -> Result<JobInstance, StoreError> {
        (**self).job_instance(id)
    }

    fn job_executions_for_instance(
        &self,
        job_name: &str,
        instance_id: JobInstanceId,
    ) -> Result<Vec<JobExecution>, StoreError> {
        (**self).job_executions_for_instance(job_name, instance_id)
    }

    fn step_names_for_job(&self, job_name: &str) -> Result<Vec<String>, StoreError> {
        (**self).step_names_for_job(job_name)
    }

    fn step_execution(
        &self,
        job_execution_id: JobExecutionId,
        step_id: StepExecutionId,
    ) -> Result<StepExecution, StoreError> {
        (**self).step_execution(job_execution_id, step_id)
    }

    fn running_job_executions(&self) -> Result<Vec<JobExecution>, StoreError> {
        (**self).running_job_executions()
    }

    fn stop(&self, id: JobExecutionId) -> Result<JobExecution, StoreError> {
        (**self).stop(id)
    }

    fn abandon(&self, id: JobExecutionId) -> Result<JobExecution, StoreError> {
        (**self).abandon(id)
    }

    fn restart(&self, id: JobExecutionId) -> Result<JobExecution, StoreError> {
        (**self).restart(id)
    }

    fn is_launchable(&self, job_name: &str) -> bool {
        (**self).is_launchable(job_name)
    }

    fn is_incrementable(&self, job_name: &str) -> bool {
        (**self).is_incrementable(job_name)
    }

    fn stop_all(&self) -> Result<usize, StoreError> {
        (**self).stop_all()
    }
}
