//! `/jobs/:job_name/...` endpoints: executions of one job or job instance.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use batchadmin_core::JobInstanceId;

use crate::app::routes::executions::outcome_to_response;
use crate::app::{dto, errors, services::AdminServices};

pub fn router() -> Router {
    Router::new()
        .route("/jobs/:job_name/executions", get(list_for_job))
        .route("/jobs/:job_name/:instance_id", get(job_instance))
        .route(
            "/jobs/:job_name/:instance_id/executions",
            get(job_instance).post(restart_instance),
        )
}

/// GET /jobs/:job_name/executions?startJobExecution=0&pageSize=20
pub async fn list_for_job(
    Extension(services): Extension<Arc<AdminServices>>,
    Path(job_name): Path<String>,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    let (job, page) = match services
        .page_request(query.start_job_execution, query.page_size)
        .and_then(|request| services.list_executions_for_job(&job_name, request))
    {
        Ok(v) => v,
        Err(e) => return errors::admin_error_to_response(e),
    };

    let page = page.map(|view| services.assembler().job_execution(&view));
    Json(dto::JobExecutionsResponse {
        job,
        page: page.into(),
    })
    .into_response()
}

/// GET /jobs/:job_name/:instance_id[/executions]
pub async fn job_instance(
    Extension(services): Extension<Arc<AdminServices>>,
    Path((job_name, instance_id)): Path<(String, String)>,
) -> axum::response::Response {
    let instance_id: JobInstanceId = match errors::parse_id(&instance_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (job, instance, executions) = match services.job_instance(&job_name, instance_id) {
        Ok(v) => v,
        Err(e) => return errors::admin_error_to_response(e),
    };

    Json(dto::JobInstanceResponse {
        job,
        job_instance: services.assembler().job_instance(&instance, &executions),
    })
    .into_response()
}

/// POST /jobs/:job_name/:instance_id/executions restarts the latest execution.
pub async fn restart_instance(
    Extension(services): Extension<Arc<AdminServices>>,
    Path((job_name, instance_id)): Path<(String, String)>,
) -> axum::response::Response {
    let instance_id: JobInstanceId = match errors::parse_id(&instance_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.restart_instance(&job_name, instance_id) {
        Ok(outcome) => outcome_to_response(services.assembler(), outcome, StatusCode::CREATED),
        Err(e) => errors::admin_error_to_response(e),
    }
}
