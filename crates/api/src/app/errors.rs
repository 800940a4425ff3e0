use std::str::FromStr;

use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use batchadmin_core::AdminError;
use batchadmin_infra::RejectionReason;
use batchadmin_views::{JobExecutionView, Resource};

pub fn admin_error_to_response(err: AdminError) -> axum::response::Response {
    let status = match &err {
        AdminError::NotFound { .. } => StatusCode::NOT_FOUND,
        AdminError::StateConflict { .. } => StatusCode::CONFLICT,
        AdminError::Validation { .. } => StatusCode::BAD_REQUEST,
        AdminError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        AdminError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    json_error(status, err.code(), err.to_string())
}

/// A rejected control command, with the execution's current state when known.
pub fn rejection_to_response(
    reason: RejectionReason,
    message: String,
    current: Option<Resource<JobExecutionView>>,
) -> axum::response::Response {
    let status = if reason.is_not_found() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::CONFLICT
    };
    (
        status,
        axum::Json(json!({
            "error": reason.code(),
            "message": message,
            "jobExecution": current,
        })),
    )
        .into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// Parse a path segment into a typed id, answering 400 on failure.
pub fn parse_id<T>(raw: &str) -> Result<T, axum::response::Response>
where
    T: FromStr<Err = AdminError>,
{
    raw.parse().map_err(admin_error_to_response)
}
