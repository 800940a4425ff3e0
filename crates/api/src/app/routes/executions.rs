//! `/jobs/executions` endpoints: listing, detail and control by execution id.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use batchadmin_core::{JobExecutionId, StepExecutionId};
use batchadmin_infra::ControlOutcome;
use batchadmin_views::ResourceAssembler;

use crate::app::{dto, errors, services::AdminServices};

pub fn router() -> Router {
    Router::new()
        .route("/jobs/executions", get(list_executions).delete(stop_all))
        .route(
            "/jobs/executions/:id",
            get(execution_detail)
                .delete(stop_execution)
                .post(restart_execution),
        )
        .route("/jobs/executions/:id/execution-context", get(execution_context))
        .route("/jobs/executions/:id/steps/:step_id", get(step_execution))
}

/// GET /jobs/executions?startJobExecution=0&pageSize=20
pub async fn list_executions(
    Extension(services): Extension<Arc<AdminServices>>,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    let page = match services
        .page_request(query.start_job_execution, query.page_size)
        .and_then(|request| services.list_executions(request))
    {
        Ok(page) => page,
        Err(e) => return errors::admin_error_to_response(e),
    };

    let page = page.map(|view| services.assembler().job_execution(&view));
    Json(dto::PageResponse::from(page)).into_response()
}

/// DELETE /jobs/executions
///
/// Stops every running execution and answers with the first page afterwards.
pub async fn stop_all(
    Extension(services): Extension<Arc<AdminServices>>,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    let (stopped_count, page) = match services
        .page_request(query.start_job_execution, query.page_size)
        .and_then(|request| services.stop_all(request))
    {
        Ok(v) => v,
        Err(e) => return errors::admin_error_to_response(e),
    };

    let page = page.map(|view| services.assembler().job_execution(&view));
    Json(dto::StopAllResponse {
        stopped_count,
        page: page.into(),
    })
    .into_response()
}

pub async fn execution_detail(
    Extension(services): Extension<Arc<AdminServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: JobExecutionId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let (view, steps) = match services.execution_detail(id) {
        Ok(v) => v,
        Err(e) => return errors::admin_error_to_response(e),
    };

    let assembler = services.assembler();
    let step_executions = steps
        .into_iter()
        .map(|step| match assembler.step_execution(&step) {
            Some(resource) => dto::StepEntry::Executed(resource),
            None => dto::StepEntry::NotRun(step),
        })
        .collect();

    Json(dto::JobExecutionDetailResponse {
        job_execution: assembler.job_execution(&view),
        step_executions,
    })
    .into_response()
}

/// DELETE /jobs/executions/:id stops; with `?abandon` it abandons.
pub async fn stop_execution(
    Extension(services): Extension<Arc<AdminServices>>,
    Path(id): Path<String>,
    Query(query): Query<dto::StopQuery>,
) -> axum::response::Response {
    let id: JobExecutionId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let outcome = if query.abandon.is_some() {
        services.abandon(id)
    } else {
        services.stop(id)
    };

    match outcome {
        Ok(outcome) => outcome_to_response(services.assembler(), outcome, StatusCode::OK),
        Err(e) => errors::admin_error_to_response(e),
    }
}

/// POST /jobs/executions/:id restarts the instance the execution belongs to.
pub async fn restart_execution(
    Extension(services): Extension<Arc<AdminServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: JobExecutionId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.restart(id) {
        Ok(outcome) => outcome_to_response(services.assembler(), outcome, StatusCode::CREATED),
        Err(e) => errors::admin_error_to_response(e),
    }
}

pub async fn execution_context(
    Extension(services): Extension<Arc<AdminServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: JobExecutionId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.execution_context(id) {
        Ok(execution_context) => Json(dto::ExecutionContextResponse {
            job_execution_id: id.get(),
            execution_context,
        })
        .into_response(),
        Err(e) => errors::admin_error_to_response(e),
    }
}

pub async fn step_execution(
    Extension(services): Extension<Arc<AdminServices>>,
    Path((id, step_id)): Path<(String, String)>,
) -> axum::response::Response {
    let id: JobExecutionId = match errors::parse_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let step_id: StepExecutionId = match errors::parse_id(&step_id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let view = match services.step_execution(id, step_id) {
        Ok(v) => v,
        Err(e) => return errors::admin_error_to_response(e),
    };
    match services.assembler().step_execution(&view) {
        Some(resource) => Json(resource).into_response(),
        None => Json(view).into_response(),
    }
}

/// Applied commands answer with the updated execution; rejections carry
/// their reason code and, when known, the execution as it stands.
pub(crate) fn outcome_to_response(
    assembler: &ResourceAssembler,
    outcome: ControlOutcome,
    applied: StatusCode,
) -> axum::response::Response {
    match outcome {
        ControlOutcome::Applied(view) => (
            applied,
            Json(dto::JobExecutionResponse {
                job_execution: assembler.job_execution(&view),
            }),
        )
            .into_response(),
        ControlOutcome::Rejected {
            reason,
            message,
            current,
        } => errors::rejection_to_response(
            reason,
            message,
            current.map(|view| assembler.job_execution(&view)),
        ),
    }
}
