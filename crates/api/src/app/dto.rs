use serde::{Deserialize, Serialize};

use batchadmin_infra::Page;
use batchadmin_views::{
    JobExecutionView, JobInfo, JobInstanceView, Resource, StepExecutionView,
};

// -------------------------
// Request DTOs
// -------------------------

/// Paging parameters shared by every listing endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub start_job_execution: Option<usize>,
    pub page_size: Option<usize>,
}

/// `DELETE /jobs/executions/:id?abandon` abandons instead of stopping.
#[derive(Debug, Default, Deserialize)]
pub struct StopQuery {
    pub abandon: Option<String>,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse<T> {
    pub items: Vec<T>,
    pub page_offset: usize,
    pub page_size: usize,
    pub total_count: u64,
}

impl<T> From<Page<T>> for PageResponse<T> {
    fn from(page: Page<T>) -> Self {
        Self {
            items: page.items,
            page_offset: page.window.offset,
            page_size: page.window.limit,
            total_count: page.window.total,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecutionsResponse {
    pub job: JobInfo,
    #[serde(flatten)]
    pub page: PageResponse<Resource<JobExecutionView>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobInstanceResponse {
    pub job: JobInfo,
    pub job_instance: Resource<JobInstanceView, JobExecutionView>,
}

/// A step row in execution detail. Steps that have not run have no address.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum StepEntry {
    Executed(Resource<StepExecutionView>),
    NotRun(StepExecutionView),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecutionDetailResponse {
    pub job_execution: Resource<JobExecutionView>,
    pub step_executions: Vec<StepEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExecutionResponse {
    pub job_execution: Resource<JobExecutionView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionContextResponse {
    pub job_execution_id: i64,
    pub execution_context: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopAllResponse {
    pub stopped_count: usize,
    #[serde(flatten)]
    pub page: PageResponse<Resource<JobExecutionView>>,
}
