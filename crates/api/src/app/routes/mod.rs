use axum::{routing::get, Router};

pub mod executions;
pub mod jobs;
pub mod system;

/// Router for every admin endpoint.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(executions::router())
        .merge(jobs::router())
}
