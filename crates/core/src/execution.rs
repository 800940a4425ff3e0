//! Raw execution records as held by the execution store.
//!
//! These are plain snapshots: the store owns them, the admin layers only read
//! them while projecting views.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{JobExecutionId, JobInstanceId, StepExecutionId};
use crate::status::BatchStatus;

/// Typed value of a single job parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParameterValue {
    String(String),
    Long(i64),
    Double(f64),
    Date(DateTime<Utc>),
}

impl ParameterValue {
    /// Type suffix used in the canonical `name(type)=value` form; strings have none.
    pub fn type_suffix(&self) -> Option<&'static str> {
        match self {
            ParameterValue::String(_) => None,
            ParameterValue::Long(_) => Some("long"),
            ParameterValue::Double(_) => Some("double"),
            ParameterValue::Date(_) => Some("date"),
        }
    }

    pub fn render(&self) -> String {
        match self {
            ParameterValue::String(s) => s.clone(),
            ParameterValue::Long(v) => v.to_string(),
            ParameterValue::Double(v) => v.to_string(),
            ParameterValue::Date(d) => d.format("%Y/%m/%d").to_string(),
        }
    }
}

/// A job parameter and whether it contributes to the instance identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobParameter {
    pub value: ParameterValue,
    pub identifying: bool,
}

impl JobParameter {
    pub fn identifying(value: ParameterValue) -> Self {
        Self {
            value,
            identifying: true,
        }
    }

    pub fn non_identifying(value: ParameterValue) -> Self {
        Self {
            value,
            identifying: false,
        }
    }
}

/// Ordered set of named job parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobParameters(BTreeMap<String, JobParameter>);

impl JobParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, parameter: JobParameter) -> Self {
        self.0.insert(name.into(), parameter);
        self
    }

    pub fn with_string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.with(name, JobParameter::identifying(ParameterValue::String(value.into())))
    }

    pub fn with_long(self, name: impl Into<String>, value: i64) -> Self {
        self.with(name, JobParameter::identifying(ParameterValue::Long(value)))
    }

    pub fn get(&self, name: &str) -> Option<&JobParameter> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JobParameter)> {
        self.0.iter()
    }

    /// Parameters as a flat `name -> value` map.
    pub fn to_properties(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(name, p)| (name.clone(), p.value.render()))
            .collect()
    }

    /// Canonical comma-separated form, e.g. `run.id(long)=3,input=a.csv,-debug=on`.
    pub fn to_canonical_string(&self) -> String {
        self.0
            .iter()
            .map(|(name, p)| {
                let prefix = if p.identifying { "" } else { "-" };
                match p.value.type_suffix() {
                    Some(ty) => format!("{prefix}{name}({ty})={}", p.value.render()),
                    None => format!("{prefix}{name}={}", p.value.render()),
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Exit code plus free-form description reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitStatus {
    pub exit_code: String,
    pub exit_description: String,
}

impl ExitStatus {
    pub fn new(exit_code: impl Into<String>) -> Self {
        Self {
            exit_code: exit_code.into(),
            exit_description: String::new(),
        }
    }

    pub fn unknown() -> Self {
        Self::new("UNKNOWN")
    }

    pub fn executing() -> Self {
        Self::new("EXECUTING")
    }

    pub fn completed() -> Self {
        Self::new("COMPLETED")
    }

    pub fn failed() -> Self {
        Self::new("FAILED")
    }

    pub fn stopped() -> Self {
        Self::new("STOPPED")
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.exit_description = description.into();
        self
    }
}

impl Default for ExitStatus {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Free-form key/value state persisted alongside an execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExecutionContext(BTreeMap<String, serde_json::Value>);

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.0.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &serde_json::Value)> {
        self.0.iter()
    }
}

/// A job name plus the identifying parameters it was launched with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobInstance {
    pub id: JobInstanceId,
    pub job_name: String,
}

impl JobInstance {
    pub fn new(id: JobInstanceId, job_name: impl Into<String>) -> Self {
        Self {
            id,
            job_name: job_name.into(),
        }
    }
}

/// One run of a step inside a job execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepExecution {
    pub id: StepExecutionId,
    pub job_execution_id: JobExecutionId,
    pub step_name: String,
    pub status: BatchStatus,
    pub exit_status: ExitStatus,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub read_count: u64,
    pub write_count: u64,
    pub commit_count: u64,
    pub rollback_count: u64,
    pub skip_count: u64,
    pub execution_context: ExecutionContext,
}

impl StepExecution {
    pub fn new(
        id: StepExecutionId,
        job_execution_id: JobExecutionId,
        step_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            job_execution_id,
            step_name: step_name.into(),
            status: BatchStatus::Starting,
            exit_status: ExitStatus::executing(),
            start_time: None,
            end_time: None,
            read_count: 0,
            write_count: 0,
            commit_count: 0,
            rollback_count: 0,
            skip_count: 0,
            execution_context: ExecutionContext::new(),
        }
    }
}

/// One run of a job instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobExecution {
    pub id: JobExecutionId,
    /// Absent when the store could not resolve the owning instance.
    pub instance: Option<JobInstance>,
    pub parameters: JobParameters,
    pub status: BatchStatus,
    pub exit_status: ExitStatus,
    pub create_time: DateTime<Utc>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub step_executions: Vec<StepExecution>,
    pub execution_context: ExecutionContext,
}

impl JobExecution {
    pub fn new(id: JobExecutionId, instance: JobInstance, parameters: JobParameters) -> Self {
        Self {
            id,
            instance: Some(instance),
            parameters,
            status: BatchStatus::Starting,
            exit_status: ExitStatus::unknown(),
            create_time: Utc::now(),
            start_time: None,
            end_time: None,
            last_updated: None,
            step_executions: Vec::new(),
            execution_context: ExecutionContext::new(),
        }
    }

    pub fn with_status(mut self, status: BatchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_times(mut self, start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        self.start_time = start;
        self.end_time = end;
        self
    }

    pub fn with_step(mut self, step: StepExecution) -> Self {
        self.step_executions.push(step);
        self
    }

    pub fn job_name(&self) -> Option<&str> {
        self.instance.as_ref().map(|i| i.job_name.as_str())
    }

    pub fn instance_id(&self) -> Option<JobInstanceId> {
        self.instance.as_ref().map(|i| i.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn canonical_parameter_string_marks_types_and_identity() {
        let params = JobParameters::new()
            .with_string("input", "a.csv")
            .with_long("run.id", 3)
            .with(
                "debug",
                JobParameter::non_identifying(ParameterValue::String("on".to_string())),
            )
            .with(
                "business.date",
                JobParameter::identifying(ParameterValue::Date(
                    Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap(),
                )),
            );

        assert_eq!(
            params.to_canonical_string(),
            "business.date(date)=2024/01/02,-debug=on,input=a.csv,run.id(long)=3"
        );
    }

    #[test]
    fn properties_render_plain_values() {
        let params = JobParameters::new().with_long("run.id", 9).with_string("mode", "full");
        let props = params.to_properties();
        assert_eq!(props.get("run.id").map(String::as_str), Some("9"));
        assert_eq!(props.get("mode").map(String::as_str), Some("full"));
    }

    #[test]
    fn empty_parameters_render_empty_string() {
        assert_eq!(JobParameters::new().to_canonical_string(), "");
    }

    #[test]
    fn execution_without_instance_has_no_job_name() {
        let mut exec = JobExecution::new(
            JobExecutionId::new(1),
            JobInstance::new(JobInstanceId::new(1), "payroll"),
            JobParameters::new(),
        );
        assert_eq!(exec.job_name(), Some("payroll"));
        exec.instance = None;
        assert_eq!(exec.job_name(), None);
        assert_eq!(exec.instance_id(), None);
    }
}
