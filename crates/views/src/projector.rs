//! Execution projector: raw records in, presentation views out.
//!
//! Projection is a pure function of the record, the display time zone and
//! (only for executions without an end time) the wall clock. Missing optional
//! fields degrade to defaults; nothing here fails.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use batchadmin_core::{JobExecution, JobExecutionId, StepExecution};

use crate::job::{Capabilities, JobExecutionView};
use crate::step::{NO_TIMING, StepExecutionView};
use crate::timing::Timing;

/// Job name shown when an execution's instance cannot be resolved.
pub const UNKNOWN_JOB_NAME: &str = "?";

/// Projects raw execution records into views for one display time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionProjector {
    time_zone: Tz,
}

impl Default for ExecutionProjector {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl ExecutionProjector {
    pub fn new(time_zone: Tz) -> Self {
        Self { time_zone }
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }

    /// Project a job execution, measuring a running execution against now.
    pub fn job_view(&self, execution: &JobExecution) -> JobExecutionView {
        self.job_view_at(execution, Utc::now())
    }

    /// Project a job execution as of `now`.
    pub fn job_view_at(&self, execution: &JobExecution, now: DateTime<Utc>) -> JobExecutionView {
        // Capabilities are only meaningful once the execution is tied to a job.
        let (job_name, capabilities) = match execution.job_name() {
            Some(name) => (name.to_string(), Capabilities::of(execution.status)),
            None => (UNKNOWN_JOB_NAME.to_string(), Capabilities::none()),
        };

        let timing = Timing::render(execution.start_time, execution.end_time, now, self.time_zone);
        let (start_date, start_time, duration) = match timing {
            Some(t) => (t.start_date, t.start_time, t.duration),
            None => (String::new(), String::new(), String::new()),
        };

        JobExecutionView {
            id: execution.id,
            job_instance_id: execution.instance_id(),
            job_name,
            status: execution.status,
            exit_code: execution.exit_status.exit_code.clone(),
            step_execution_count: execution.step_executions.len(),
            start_date,
            start_time,
            duration,
            job_parameters: execution.parameters.to_properties(),
            job_parameters_string: execution.parameters.to_canonical_string(),
            capabilities,
            time_zone: self.time_zone,
        }
    }

    /// Project one persisted step of `execution`.
    pub fn step_view(&self, execution: &JobExecution, step: &StepExecution) -> StepExecutionView {
        self.step_view_at(execution, step, Utc::now())
    }

    pub fn step_view_at(
        &self,
        execution: &JobExecution,
        step: &StepExecution,
        now: DateTime<Utc>,
    ) -> StepExecutionView {
        let timing = Timing::render(step.start_time, step.end_time, now, self.time_zone);
        let (start_date, start_time, duration, duration_millis) = match timing {
            Some(t) => (t.start_date, t.start_time, t.duration, t.duration_millis),
            None => (
                NO_TIMING.to_string(),
                NO_TIMING.to_string(),
                NO_TIMING.to_string(),
                0,
            ),
        };

        StepExecutionView {
            id: Some(step.id),
            job_execution_id: step.job_execution_id,
            job_name: execution.job_name().unwrap_or(UNKNOWN_JOB_NAME).to_string(),
            name: step.step_name.clone(),
            status: step.status.to_string(),
            exit_code: step.exit_status.exit_code.clone(),
            start_date,
            start_time,
            duration,
            duration_millis,
            read_count: step.read_count,
            write_count: step.write_count,
            commit_count: step.commit_count,
            rollback_count: step.rollback_count,
            skip_count: step.skip_count,
            time_zone: self.time_zone,
        }
    }

    /// View for a declared step that has not run yet.
    pub fn placeholder_step(
        &self,
        job_name: &str,
        job_execution_id: JobExecutionId,
        step_name: &str,
    ) -> StepExecutionView {
        StepExecutionView::placeholder(job_name, job_execution_id, step_name, self.time_zone)
    }

    /// Views for every step of `execution`.
    ///
    /// Persisted steps come first in ascending id order, followed by a
    /// placeholder for each name in `declared_steps` that has no execution,
    /// in declaration order.
    pub fn step_views(&self, execution: &JobExecution, declared_steps: &[String]) -> Vec<StepExecutionView> {
        self.step_views_at(execution, declared_steps, Utc::now())
    }

    pub fn step_views_at(
        &self,
        execution: &JobExecution,
        declared_steps: &[String],
        now: DateTime<Utc>,
    ) -> Vec<StepExecutionView> {
        let mut steps: Vec<&StepExecution> = execution.step_executions.iter().collect();
        steps.sort_by_key(|s| s.id);

        let mut views: Vec<StepExecutionView> = steps
            .into_iter()
            .map(|s| self.step_view_at(execution, s, now))
            .collect();

        let job_name = execution.job_name().unwrap_or(UNKNOWN_JOB_NAME);
        for name in declared_steps {
            let ran = execution.step_executions.iter().any(|s| &s.step_name == name);
            if !ran {
                views.push(self.placeholder_step(job_name, execution.id, name));
            }
        }

        views
    }
}
