//! Request-level use cases over the execution store.
//!
//! Every method does its store reads, projects the records and returns
//! views; assembling resources is left to the route handlers.

use std::sync::Arc;

use batchadmin_core::{
    AdminError, AdminResult, JobExecution, JobExecutionId, JobInstanceId, StepExecutionId,
};
use batchadmin_infra::{
    ControlOutcome, ExecutionControl, ExecutionStore, Page, PageRequest, StoreError, paginate,
};
use batchadmin_views::{
    ExecutionProjector, JobExecutionView, JobInfo, JobInstanceView, ResourceAssembler,
    StepExecutionView,
};

use crate::config::AdminConfig;

pub type SharedStore = Arc<dyn ExecutionStore>;

pub struct AdminServices {
    store: SharedStore,
    control: ExecutionControl<SharedStore>,
    projector: ExecutionProjector,
    assembler: ResourceAssembler,
    page_size: usize,
}

impl AdminServices {
    pub fn new(config: &AdminConfig, store: SharedStore) -> Self {
        let projector = ExecutionProjector::new(config.time_zone);
        Self {
            control: ExecutionControl::new(store.clone(), projector),
            store,
            projector,
            assembler: ResourceAssembler::new(config.base_path.clone()),
            page_size: config.page_size,
        }
    }

    pub fn assembler(&self) -> &ResourceAssembler {
        &self.assembler
    }

    pub fn page_request(&self, offset: Option<usize>, limit: Option<usize>) -> AdminResult<PageRequest> {
        PageRequest::new(offset, limit, self.page_size)
    }

    pub fn list_executions(&self, request: PageRequest) -> AdminResult<Page<JobExecutionView>> {
        let page = paginate(
            request,
            || self.store.count_job_executions(),
            |offset, limit| self.store.list_job_executions(offset, limit),
        )?;
        Ok(self.project_page(page))
    }

    pub fn list_executions_for_job(
        &self,
        job_name: &str,
        request: PageRequest,
    ) -> AdminResult<(JobInfo, Page<JobExecutionView>)> {
        let page = paginate(
            request,
            || self.store.count_job_executions_for_job(job_name),
            |offset, limit| self.store.list_job_executions_for_job(job_name, offset, limit),
        )
        .inspect_err(|e| {
            if matches!(e, StoreError::NoSuchJob(_)) {
                tracing::warn!(job_name, "could not locate job");
            }
        })?;
        let info = self.job_info(job_name, page.window.total);
        Ok((info, self.project_page(page)))
    }

    /// Executions of one instance, newest first.
    ///
    /// The instance is resolved first so that a path naming the wrong job is
    /// reported as such rather than as a missing instance.
    pub fn job_instance(
        &self,
        job_name: &str,
        instance_id: JobInstanceId,
    ) -> AdminResult<(JobInfo, JobInstanceView, Vec<JobExecutionView>)> {
        let instance = self.store.job_instance(instance_id)?;
        if instance.job_name != job_name {
            return Err(AdminError::validation(
                "wrong.job.name",
                format!(
                    "job instance {instance_id} belongs to {}, not {job_name}",
                    instance.job_name
                ),
            ));
        }
        let executions = self.store.job_executions_for_instance(job_name, instance_id)?;
        let views: Vec<_> = executions.iter().map(|e| self.projector.job_view(e)).collect();
        let info = self
            .job_info(job_name, views.len() as u64)
            .for_instance(instance_id);
        Ok((info, JobInstanceView::from(&instance), views))
    }

    /// Execution plus its steps: executed steps by ascending id, then
    /// declared steps that have not run yet.
    pub fn execution_detail(
        &self,
        id: JobExecutionId,
    ) -> AdminResult<(JobExecutionView, Vec<StepExecutionView>)> {
        let execution = self.store.job_execution(id)?;
        let declared = self.declared_steps(&execution)?;
        let view = self.projector.job_view(&execution);
        let steps = self.projector.step_views(&execution, &declared);
        Ok((view, steps))
    }

    pub fn execution_context(&self, id: JobExecutionId) -> AdminResult<serde_json::Value> {
        let execution = self.store.job_execution(id)?;
        serde_json::to_value(&execution.execution_context).map_err(|e| {
            AdminError::serialization(format!("execution context of job execution {id}: {e}"))
        })
    }

    pub fn step_execution(
        &self,
        id: JobExecutionId,
        step_id: StepExecutionId,
    ) -> AdminResult<StepExecutionView> {
        let execution = self.store.job_execution(id)?;
        let step = self.store.step_execution(id, step_id)?;
        Ok(self.projector.step_view(&execution, &step))
    }

    pub fn stop(&self, id: JobExecutionId) -> AdminResult<ControlOutcome> {
        Ok(self.control.stop(id)?)
    }

    pub fn abandon(&self, id: JobExecutionId) -> AdminResult<ControlOutcome> {
        Ok(self.control.abandon(id)?)
    }

    pub fn restart(&self, id: JobExecutionId) -> AdminResult<ControlOutcome> {
        Ok(self.control.restart(id)?)
    }

    pub fn restart_instance(
        &self,
        job_name: &str,
        instance_id: JobInstanceId,
    ) -> AdminResult<ControlOutcome> {
        Ok(self.control.restart_instance(job_name, instance_id)?)
    }

    /// Stop everything running, then list the first page of executions.
    pub fn stop_all(&self, request: PageRequest) -> AdminResult<(usize, Page<JobExecutionView>)> {
        let stopped = self.control.stop_all()?;
        Ok((stopped, self.list_executions(request)?))
    }

    fn job_info(&self, job_name: &str, execution_count: u64) -> JobInfo {
        JobInfo::new(job_name, execution_count).with_flags(
            self.store.is_launchable(job_name),
            self.store.is_incrementable(job_name),
        )
    }

    fn declared_steps(&self, execution: &JobExecution) -> AdminResult<Vec<String>> {
        let Some(job_name) = execution.job_name() else {
            return Ok(Vec::new());
        };
        match self.store.step_names_for_job(job_name) {
            Ok(names) => Ok(names),
            Err(StoreError::NoSuchJob(_)) => {
                tracing::debug!(job_name, "no step declarations for job");
                Ok(Vec::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn project_page(&self, page: Page<JobExecution>) -> Page<JobExecutionView> {
        page.map(|e| self.projector.job_view(&e))
    }
}
