//! Strongly-typed identifiers for execution records.
//!
//! The execution store assigns numeric, monotonically increasing ids; these
//! newtypes keep job instance, job execution and step execution ids apart.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::AdminError;

/// Identifier of a job instance (a job name plus its identifying parameters).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobInstanceId(i64);

/// Identifier of one run of a job instance.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobExecutionId(i64);

/// Identifier of one run of a step within a job execution.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepExecutionId(i64);

macro_rules! impl_numeric_newtype {
    ($t:ty, $name:literal) => {
        impl $t {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl core::fmt::Display for $t {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl From<i64> for $t {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl From<$t> for i64 {
            fn from(value: $t) -> Self {
                value.0
            }
        }

        impl FromStr for $t {
            type Err = AdminError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let value = i64::from_str(s.trim()).map_err(|e| {
                    AdminError::validation("invalid.id", format!("{}: {}", $name, e))
                })?;
                Ok(Self(value))
            }
        }
    };
}

impl_numeric_newtype!(JobInstanceId, "JobInstanceId");
impl_numeric_newtype!(JobExecutionId, "JobExecutionId");
impl_numeric_newtype!(StepExecutionId, "StepExecutionId");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_numeric_ids() {
        let id: JobExecutionId = "17".parse().unwrap();
        assert_eq!(id, JobExecutionId::new(17));
        assert_eq!(id.to_string(), "17");
    }

    #[test]
    fn rejects_non_numeric_ids() {
        let err = "seventeen".parse::<StepExecutionId>().unwrap_err();
        assert_eq!(err.code(), "invalid.id");
        assert!(err.to_string().contains("StepExecutionId"));
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_value(JobInstanceId::new(3)).unwrap();
        assert_eq!(json, serde_json::json!(3));
    }
}
