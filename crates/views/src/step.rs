//! Step execution view, including the "not yet run" placeholder.

use chrono_tz::Tz;
use serde::Serialize;

use batchadmin_core::{JobExecutionId, StepExecutionId};

/// Status and exit code reported for a step that has no execution record.
pub const NOT_RUN: &str = "NONE";

/// Default for timing fields of a step that never started.
pub(crate) const NO_TIMING: &str = "-";

/// Read-only projection of a step execution.
///
/// `id` is `None` exactly when this is a placeholder for a declared step that
/// has not produced an execution yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepExecutionView {
    pub(crate) id: Option<StepExecutionId>,
    pub(crate) job_execution_id: JobExecutionId,
    pub(crate) job_name: String,
    pub(crate) name: String,
    pub(crate) status: String,
    pub(crate) exit_code: String,
    pub(crate) start_date: String,
    pub(crate) start_time: String,
    pub(crate) duration: String,
    pub(crate) duration_millis: i64,
    pub(crate) read_count: u64,
    pub(crate) write_count: u64,
    pub(crate) commit_count: u64,
    pub(crate) rollback_count: u64,
    pub(crate) skip_count: u64,
    pub(crate) time_zone: Tz,
}

impl StepExecutionView {
    pub(crate) fn placeholder(
        job_name: impl Into<String>,
        job_execution_id: JobExecutionId,
        name: impl Into<String>,
        time_zone: Tz,
    ) -> Self {
        Self {
            id: None,
            job_execution_id,
            job_name: job_name.into(),
            name: name.into(),
            status: NOT_RUN.to_string(),
            exit_code: NOT_RUN.to_string(),
            start_date: NO_TIMING.to_string(),
            start_time: NO_TIMING.to_string(),
            duration: NO_TIMING.to_string(),
            duration_millis: 0,
            read_count: 0,
            write_count: 0,
            commit_count: 0,
            rollback_count: 0,
            skip_count: 0,
            time_zone,
        }
    }

    pub fn id(&self) -> Option<StepExecutionId> {
        self.id
    }

    pub fn is_placeholder(&self) -> bool {
        self.id.is_none()
    }

    pub fn job_execution_id(&self) -> JobExecutionId {
        self.job_execution_id
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Status name, or [`NOT_RUN`] for a placeholder.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// Exit code, or [`NOT_RUN`] for a placeholder.
    pub fn exit_code(&self) -> &str {
        &self.exit_code
    }

    pub fn start_date(&self) -> &str {
        &self.start_date
    }

    pub fn start_time(&self) -> &str {
        &self.start_time
    }

    pub fn duration(&self) -> &str {
        &self.duration
    }

    /// Exact elapsed milliseconds before formatting (0 when never started).
    pub fn duration_millis(&self) -> i64 {
        self.duration_millis
    }

    pub fn read_count(&self) -> u64 {
        self.read_count
    }

    pub fn write_count(&self) -> u64 {
        self.write_count
    }

    pub fn commit_count(&self) -> u64 {
        self.commit_count
    }

    pub fn rollback_count(&self) -> u64 {
        self.rollback_count
    }

    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }
}
