//! HTTP application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store reads, projection and control per request
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request/response DTOs
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use batchadmin_infra::{InMemoryExecutionStore, StoreError};

use crate::config::AdminConfig;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::{AdminServices, SharedStore};

/// Build the full HTTP router over `store` (public entrypoint used by `main.rs`).
pub fn build_app(config: &AdminConfig, store: SharedStore) -> Router {
    let services = Arc::new(AdminServices::new(config, store));

    routes::router().layer(ServiceBuilder::new().layer(Extension(services)))
}

/// The in-memory store, seeded with demo executions when configured.
pub fn build_store(config: &AdminConfig) -> Result<SharedStore, StoreError> {
    let store = if config.seed_demo {
        tracing::info!("seeding in-memory execution store with demo jobs");
        InMemoryExecutionStore::with_demo_data()?
    } else {
        InMemoryExecutionStore::new()
    };
    Ok(Arc::new(store))
}
