//! `batchadmin-views`: presentation views of execution records.
//!
//! - `projector`: raw records -> `JobExecutionView` / `StepExecutionView`
//! - `resource`: views -> linkable, identified resources
//! - `timing`: start-time rendering and duration formatting

pub mod info;
pub mod job;
pub mod projector;
pub mod resource;
pub mod step;
pub mod timing;

pub use info::{JobInfo, JobInstanceView};
pub use job::{Capabilities, JobExecutionView};
pub use projector::{ExecutionProjector, UNKNOWN_JOB_NAME};
pub use resource::{Link, Resource, ResourceAssembler};
pub use step::{NOT_RUN, StepExecutionView};
pub use timing::format_duration;
