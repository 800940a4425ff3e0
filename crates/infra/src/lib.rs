//! Infrastructure layer: the execution store boundary, operator control
//! commands and listing pagination.

pub mod control;
pub mod execution_store;
pub mod pagination;

pub use control::{ControlError, ControlOutcome, ExecutionControl, RejectionReason};
pub use execution_store::{ExecutionStore, InMemoryExecutionStore, JobDefinition, StoreError};
pub use pagination::{DEFAULT_PAGE_SIZE, Page, PageRequest, PageWindow, paginate};
