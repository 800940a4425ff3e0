//! Job-level summaries shown alongside execution listings.

use serde::Serialize;

use batchadmin_core::{JobInstance, JobInstanceId};

/// Summary of a job for listing pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInfo {
    pub name: String,
    pub execution_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_instance_id: Option<JobInstanceId>,
    pub launchable: bool,
    pub incrementable: bool,
}

impl JobInfo {
    pub fn new(name: impl Into<String>, execution_count: u64) -> Self {
        Self {
            name: name.into(),
            execution_count,
            job_instance_id: None,
            launchable: false,
            incrementable: false,
        }
    }

    pub fn for_instance(mut self, id: JobInstanceId) -> Self {
        self.job_instance_id = Some(id);
        self
    }

    pub fn with_flags(mut self, launchable: bool, incrementable: bool) -> Self {
        self.launchable = launchable;
        self.incrementable = incrementable;
        self
    }
}

/// Identity of a job instance as shown to operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInstanceView {
    id: JobInstanceId,
    job_name: String,
}

impl JobInstanceView {
    pub fn id(&self) -> JobInstanceId {
        self.id
    }

    pub fn job_name(&self) -> &str {
        &self.job_name
    }
}

impl From<&JobInstance> for JobInstanceView {
    fn from(instance: &JobInstance) -> Self {
        Self {
            id: instance.id,
            job_name: instance.job_name.clone(),
        }
    }
}
