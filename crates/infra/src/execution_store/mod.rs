//! Execution store boundary.
//!
//! The batch engine owns execution records; the admin layers reach it only
//! through the `ExecutionStore` contract defined here.

pub mod in_memory;
pub mod r#trait;

pub use in_memory::{InMemoryExecutionStore, JobDefinition};
pub use r#trait::{ExecutionStore, StoreError};
