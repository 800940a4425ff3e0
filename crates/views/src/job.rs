//! Job execution view and its capability flags.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use serde::Serialize;

use batchadmin_core::{BatchStatus, JobExecutionId, JobInstanceId};

/// Which control commands are currently valid for an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub restartable: bool,
    pub abandonable: bool,
    pub stoppable: bool,
}

impl Capabilities {
    /// Derive the flags from a status using strict comparisons over the
    /// status order; boundary statuses are not special-cased.
    pub fn of(status: BatchStatus) -> Self {
        Self {
            restartable: status > BatchStatus::Stopping && status < BatchStatus::Abandoned,
            abandonable: status > BatchStatus::Started && status != BatchStatus::Abandoned,
            stoppable: status < BatchStatus::Stopping,
        }
    }

    pub fn none() -> Self {
        Self::default()
    }
}

/// Read-only projection of a job execution at projection time.
///
/// Built fresh from a raw record on every read; a status change requires
/// re-fetching and re-projecting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecutionView {
    pub(crate) id: JobExecutionId,
    pub(crate) job_instance_id: Option<JobInstanceId>,
    pub(crate) job_name: String,
    pub(crate) status: BatchStatus,
    pub(crate) exit_code: String,
    pub(crate) step_execution_count: usize,
    pub(crate) start_date: String,
    pub(crate) start_time: String,
    pub(crate) duration: String,
    pub(crate) job_parameters: BTreeMap<String, String>,
    pub(crate) job_parameters_string: String,
    #[serde(flatten)]
    pub(crate) capabilities: Capabilities,
    pub(crate) time_zone: Tz,
}

impl JobExecutionView {
    pub fn id(&self) -> JobExecutionId {
        self.id
    }

    pub fn job_instance_id(&self) -> Option<JobInstanceId> {
        self.job_instance_id
    }

    /// Job name, or `?` when the owning instance is unknown.
    pub fn job_name(&self) -> &str {
        &self.job_name
    }

    pub fn status(&self) -> BatchStatus {
        self.status
    }

    pub fn exit_code(&self) -> &str {
        &self.exit_code
    }

    pub fn step_execution_count(&self) -> usize {
        self.step_execution_count
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

    pub fn job_parameters(&self) -> &BTreeMap<String, String> {
        &self.job_parameters
    }

    pub fn job_parameters_string(&self) -> &str {
        &self.job_parameters_string
    }

    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    pub fn is_restartable(&self) -> bool {
        self.capabilities.restartable
    }

    pub fn is_abandonable(&self) -> bool {
        self.capabilities.abandonable
    }

    pub fn is_stoppable(&self) -> bool {
        self.capabilities.stoppable
    }

    pub fn time_zone(&self) -> Tz {
        self.time_zone
    }
}
