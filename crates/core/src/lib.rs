//! `batchadmin-core`: execution records, status order and error taxonomy.
//!
//! Plain data and pure rules only; nothing here talks to a store.

pub mod error;
pub mod execution;
pub mod id;
pub mod status;

pub use error::{AdminError, AdminResult};
pub use execution::{
    ExecutionContext, ExitStatus, JobExecution, JobInstance, JobParameter, JobParameters,
    ParameterValue, StepExecution,
};
pub use id::{JobExecutionId, JobInstanceId, StepExecutionId};
pub use status::BatchStatus;
