use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, TimeDelta, Utc};

use batchadmin_core::{
    BatchStatus, ExitStatus, JobExecution, JobExecutionId, JobInstance, JobInstanceId,
    JobParameters, StepExecution, StepExecutionId,
};

use super::r#trait::{ExecutionStore, StoreError};

/// What the store knows about a job independently of its executions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDefinition {
    pub name: String,
    pub step_names: Vec<String>,
    pub launchable: bool,
    pub incrementable: bool,
    pub restartable: bool,
    /// Parameter names a restart must carry over.
    pub required_parameters: Vec<String>,
}

impl JobDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            step_names: Vec::new(),
            launchable: true,
            incrementable: false,
            restartable: true,
            required_parameters: Vec::new(),
        }
    }

    pub fn with_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.step_names = steps.into_iter().map(Into::into).collect();
        self
    }

    pub fn incrementable(mut self, value: bool) -> Self {
        self.incrementable = value;
        self
    }

    pub fn launchable(mut self, value: bool) -> Self {
        self.launchable = value;
        self
    }

    pub fn restartable(mut self, value: bool) -> Self {
        self.restartable = value;
        self
    }

    pub fn requires(mut self, parameter: impl Into<String>) -> Self {
        self.required_parameters.push(parameter.into());
        self
    }
}

#[derive(Debug, Default)]
struct State {
    jobs: BTreeMap<String, JobDefinition>,
    instances: BTreeMap<JobInstanceId, JobInstance>,
    executions: BTreeMap<JobExecutionId, JobExecution>,
}

impl State {
    fn job(&self, name: &str) -> Result<&JobDefinition, StoreError> {
        self.jobs
            .get(name)
            .ok_or_else(|| StoreError::NoSuchJob(name.to_string()))
    }

    fn execution(&self, id: JobExecutionId) -> Result<&JobExecution, StoreError> {
        self.executions
            .get(&id)
            .ok_or(StoreError::NoSuchJobExecution(id))
    }

    fn execution_mut(&mut self, id: JobExecutionId) -> Result<&mut JobExecution, StoreError> {
        self.executions
            .get_mut(&id)
            .ok_or(StoreError::NoSuchJobExecution(id))
    }

    /// Executions newest first, optionally restricted to one job.
    fn newest_first<'a>(&'a self, job_name: Option<&'a str>) -> impl Iterator<Item = &'a JobExecution> {
        self.executions
            .values()
            .rev()
            .filter(move |e| job_name.is_none_or(|name| e.job_name() == Some(name)))
    }

    fn of_instance(&self, instance_id: JobInstanceId) -> impl Iterator<Item = &JobExecution> {
        self.executions
            .values()
            .filter(move |e| e.instance_id() == Some(instance_id))
    }

    fn next_execution_id(&self) -> JobExecutionId {
        let max = self.executions.keys().next_back().map_or(0, |id| id.get());
        JobExecutionId::new(max + 1)
    }
}

/// In-memory execution store for tests/dev.
///
/// Mirrors the consistency rules of a real job repository closely enough for
/// the admin layers to exercise every rejection path.
#[derive(Debug, Default)]
pub struct InMemoryExecutionStore {
    state: RwLock<State>,
}

impl InMemoryExecutionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::Storage("execution store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::Storage("execution store lock poisoned".to_string()))
    }

    pub fn register_job(&self, definition: JobDefinition) -> Result<(), StoreError> {
        let mut state = self.write()?;
        state.jobs.insert(definition.name.clone(), definition);
        Ok(())
    }

    /// Insert (or replace) an execution record, recording its instance.
    pub fn insert_execution(&self, execution: JobExecution) -> Result<(), StoreError> {
        let mut state = self.write()?;
        if let Some(instance) = &execution.instance {
            state.instances.insert(instance.id, instance.clone());
        }
        state.executions.insert(execution.id, execution);
        Ok(())
    }

    /// Store seeded with a few running and finished executions.
    pub fn with_demo_data() -> Result<Self, StoreError> {
        let store = Self::new();
        store.register_job(
            JobDefinition::new("settlement")
                .with_steps(["extract", "transform", "load"])
                .incrementable(true)
                .requires("business.date"),
        )?;
        store.register_job(
            JobDefinition::new("archive")
                .with_steps(["scan", "compress"])
                .restartable(false),
        )?;

        let base = Utc::now() - TimeDelta::hours(6);
        let demo = [
            (1, 1, "settlement", BatchStatus::Completed, 0, Some(42)),
            (2, 2, "settlement", BatchStatus::Failed, 60, Some(17)),
            (3, 3, "archive", BatchStatus::Stopped, 120, Some(3)),
            (4, 4, "archive", BatchStatus::Abandoned, 180, Some(8)),
            (5, 5, "settlement", BatchStatus::Started, 300, None),
        ];
        for (id, instance, job, status, offset_minutes, run_minutes) in demo {
            let start = base + TimeDelta::minutes(offset_minutes);
            let end = run_minutes.map(|m| start + TimeDelta::minutes(m));
            let params = JobParameters::new()
                .with_long("run.id", id)
                .with_string("business.date", "2024-01-02");
            store.insert_execution(demo_execution(id, instance, job, status, start, end, params))?;
        }
        Ok(store)
    }
}

fn demo_execution(
    id: i64,
    instance_id: i64,
    job: &str,
    status: BatchStatus,
    start: DateTime<Utc>,
    end: Option<DateTime<Utc>>,
    params: JobParameters,
) -> JobExecution {
    let mut execution = JobExecution::new(
        JobExecutionId::new(id),
        JobInstance::new(JobInstanceId::new(instance_id), job),
        params,
    )
    .with_status(status)
    .with_times(Some(start), end);
    execution.exit_status = exit_status_for(status);

    let first_step = if job == "archive" { "scan" } else { "extract" };
    let mut step = StepExecution::new(StepExecutionId::new(id * 10), execution.id, first_step);
    step.status = if status.is_running() { BatchStatus::Started } else { status };
    step.exit_status = exit_status_for(step.status);
    step.start_time = Some(start);
    step.end_time = end;
    step.read_count = 100;
    step.write_count = 100;
    step.commit_count = 1;
    execution.with_step(step)
}

fn exit_status_for(status: BatchStatus) -> ExitStatus {
    match status {
        BatchStatus::Completed => ExitStatus::completed(),
        BatchStatus::Failed => ExitStatus::failed(),
        BatchStatus::Stopped | BatchStatus::Abandoned => ExitStatus::stopped(),
        BatchStatus::Starting | BatchStatus::Started | BatchStatus::Stopping => ExitStatus::executing(),
        BatchStatus::Unknown => ExitStatus::unknown(),
    }
}

impl ExecutionStore for InMemoryExecutionStore {
    fn job_execution(&self, id: JobExecutionId) -> Result<JobExecution, StoreError> {
        self.read()?.execution(id).cloned()
    }

    fn list_job_executions(&self, offset: usize, limit: usize) -> Result<Vec<JobExecution>, StoreError> {
        let state = self.read()?;
        Ok(state.newest_first(None).skip(offset).take(limit).cloned().collect())
    }

    fn count_job_executions(&self) -> Result<u64, StoreError> {
        Ok(self.read()?.executions.len() as u64)
    }

    fn list_job_executions_for_job(
        &self,
        job_name: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<JobExecution>, StoreError> {
        let state = self.read()?;
        state.job(job_name)?;
        Ok(state
            .newest_first(Some(job_name))
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    fn count_job_executions_for_job(&self, job_name: &str) -> Result<u64, StoreError> {
        let state = self.read()?;
        state.job(job_name)?;
        Ok(state.newest_first(Some(job_name)).count() as u64)
    }

    fn job_instance(&self, id: JobInstanceId) -> Result<JobInstance, StoreError> {
        self.read()?
            .instances
            .get(&id)
            .cloned()
            .ok_or(StoreError::NoSuchJobInstance(id))
    }

    fn job_executions_for_instance(
        &self,
        job_name: &str,
        instance_id: JobInstanceId,
    ) -> Result<Vec<JobExecution>, StoreError> {
        let state = self.read()?;
        state.job(job_name)?;
        match state.instances.get(&instance_id) {
            Some(instance) if instance.job_name == job_name => {}
            _ => return Err(StoreError::NoSuchJobInstance(instance_id)),
        }
        let mut executions: Vec<_> = state.of_instance(instance_id).cloned().collect();
        executions.reverse();
        Ok(executions)
    }

    fn step_names_for_job(&self, job_name: &str) -> Result<Vec<String>, StoreError> {
        Ok(self.read()?.job(job_name)?.step_names.clone())
    }

    fn step_execution(
        &self,
        job_execution_id: JobExecutionId,
        step_id: StepExecutionId,
    ) -> Result<StepExecution, StoreError> {
        let state = self.read()?;
        state
            .execution(job_execution_id)?
            .step_executions
            .iter()
            .find(|s| s.id == step_id)
            .cloned()
            .ok_or(StoreError::NoSuchStepExecution {
                job_execution: job_execution_id,
                step: step_id,
            })
    }

    fn running_job_executions(&self) -> Result<Vec<JobExecution>, StoreError> {
        let state = self.read()?;
        Ok(state
            .newest_first(None)
            .filter(|e| e.status.is_running())
            .cloned()
            .collect())
    }

    fn stop(&self, id: JobExecutionId) -> Result<JobExecution, StoreError> {
        let mut state = self.write()?;
        let execution = state.execution_mut(id)?;
        if !execution.status.is_running() {
            return Err(StoreError::NotRunning(id));
        }
        execution.status = BatchStatus::Stopping;
        execution.last_updated = Some(Utc::now());
        Ok(execution.clone())
    }

    fn abandon(&self, id: JobExecutionId) -> Result<JobExecution, StoreError> {
        let mut state = self.write()?;
        let execution = state.execution_mut(id)?;
        // A stopping execution may be abandoned; one still starting or started may not.
        if execution.status < BatchStatus::Stopping {
            return Err(StoreError::AlreadyRunning(id));
        }
        let now = Utc::now();
        execution.status = BatchStatus::Abandoned;
        execution.end_time.get_or_insert(now);
        execution.last_updated = Some(now);
        Ok(execution.clone())
    }

    fn restart(&self, id: JobExecutionId) -> Result<JobExecution, StoreError> {
        let mut state = self.write()?;
        let previous = state.execution(id)?;
        let instance = previous.instance.clone().ok_or_else(|| {
            StoreError::NoSuchJob(format!("<unresolved instance of execution {id}>"))
        })?;
        let job = state.job(&instance.job_name)?;

        if !job.restartable {
            return Err(StoreError::RestartRejected(format!(
                "job {} is not restartable",
                job.name
            )));
        }
        if let Some(running) = state.of_instance(instance.id).find(|e| e.status.is_running()) {
            return Err(StoreError::AlreadyRunning(running.id));
        }
        if state
            .of_instance(instance.id)
            .any(|e| e.status == BatchStatus::Completed)
        {
            return Err(StoreError::InstanceAlreadyComplete(format!(
                "instance {} of job {}",
                instance.id, instance.job_name
            )));
        }
        if previous.status == BatchStatus::Abandoned {
            return Err(StoreError::RestartRejected(format!(
                "job execution {id} was abandoned"
            )));
        }
        let missing: Vec<_> = job
            .required_parameters
            .iter()
            .filter(|name| !previous.parameters.contains(name))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(StoreError::InvalidParameters(format!(
                "missing {}",
                missing.join(", ")
            )));
        }

        let parameters = previous.parameters.clone();
        let restarted = JobExecution::new(state.next_execution_id(), instance.clone(), parameters);
        state.instances.insert(instance.id, instance);
        state.executions.insert(restarted.id, restarted.clone());
        Ok(restarted)
    }

    fn is_launchable(&self, job_name: &str) -> bool {
        self.read()
            .map(|s| s.jobs.get(job_name).is_some_and(|j| j.launchable))
            .unwrap_or(false)
    }

    fn is_incrementable(&self, job_name: &str) -> bool {
        self.read()
            .map(|s| s.jobs.get(job_name).is_some_and(|j| j.incrementable))
            .unwrap_or(false)
    }
}
