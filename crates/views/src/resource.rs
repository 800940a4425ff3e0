//! Resource assembler: wraps projected views into linkable resources.
//!
//! Resources are addressed by execution id at predictable paths under a
//! configurable base path. Assembly only reshapes views that were already
//! projected; it never touches the store.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;

use crate::info::JobInstanceView;
use crate::job::JobExecutionView;
use crate::step::StepExecutionView;

/// Characters escaped when a job name is placed in a single path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, PATH_SEGMENT).to_string()
}

/// A hypermedia link target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub href: String,
}

/// A view plus its identity, links and (optionally) embedded child resources.
///
/// The serialized `id` comes from the flattened view itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource<T, C = ()> {
    #[serde(skip)]
    id: i64,
    #[serde(rename = "_links")]
    links: BTreeMap<&'static str, Link>,
    #[serde(flatten)]
    content: T,
    #[serde(rename = "_embedded", skip_serializing_if = "BTreeMap::is_empty")]
    embedded: BTreeMap<&'static str, Vec<Resource<C>>>,
}

impl<T, C> Resource<T, C> {
    fn new(id: i64, content: T) -> Self {
        Self {
            id,
            links: BTreeMap::new(),
            content,
            embedded: BTreeMap::new(),
        }
    }

    fn link(mut self, rel: &'static str, href: String) -> Self {
        self.links.insert(rel, Link { href });
        self
    }

    fn embed(mut self, rel: &'static str, children: Vec<Resource<C>>) -> Self {
        self.embedded.insert(rel, children);
        self
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn content(&self) -> &T {
        &self.content
    }

    pub fn links(&self) -> &BTreeMap<&'static str, Link> {
        &self.links
    }

    pub fn href(&self, rel: &str) -> Option<&str> {
        self.links.get(rel).map(|l| l.href.as_str())
    }

    pub fn embedded(&self, rel: &str) -> &[Resource<C>] {
        self.embedded.get(rel).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Builds resources for job executions, step executions and job instances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceAssembler {
    base_path: String,
}

impl ResourceAssembler {
    pub fn new(base_path: impl Into<String>) -> Self {
        let base_path = base_path.into().trim_end_matches('/').to_string();
        Self { base_path }
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn job_execution_href(&self, view: &JobExecutionView) -> String {
        format!("{}/jobs/executions/{}", self.base_path, view.id())
    }

    pub fn job_execution(&self, view: &JobExecutionView) -> Resource<JobExecutionView> {
        let self_href = self.job_execution_href(view);
        let mut resource = Resource::new(view.id().get(), view.clone())
            .link("execution-context", format!("{self_href}/execution-context"))
            .link("self", self_href);
        if let Some(instance_id) = view.job_instance_id() {
            resource = resource.link(
                "job-instance",
                format!(
                    "{}/jobs/{}/{}",
                    self.base_path,
                    segment(view.job_name()),
                    instance_id
                ),
            );
        }
        resource
    }

    pub fn job_executions(&self, views: &[JobExecutionView]) -> Vec<Resource<JobExecutionView>> {
        views.iter().map(|v| self.job_execution(v)).collect()
    }

    /// Resource for a persisted step; placeholders have no address and yield `None`.
    pub fn step_execution(&self, view: &StepExecutionView) -> Option<Resource<StepExecutionView>> {
        let id = view.id()?;
        let parent = format!("{}/jobs/executions/{}", self.base_path, view.job_execution_id());
        Some(
            Resource::new(id.get(), view.clone())
                .link("self", format!("{parent}/steps/{id}"))
                .link("job-execution", parent),
        )
    }

    /// Instance resource with its executions embedded under `executions`.
    ///
    /// Children are assembled independently; nothing on the parent is
    /// derived from them.
    pub fn job_instance(
        &self,
        instance: &JobInstanceView,
        executions: &[JobExecutionView],
    ) -> Resource<JobInstanceView, JobExecutionView> {
        let self_href = format!(
            "{}/jobs/{}/{}",
            self.base_path,
            segment(instance.job_name()),
            instance.id()
        );
        Resource::new(instance.id().get(), instance.clone())
            .link("executions", format!("{self_href}/executions"))
            .link("self", self_href)
            .embed("executions", self.job_executions(executions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projector::ExecutionProjector;
    use batchadmin_core::{
        BatchStatus, JobExecution, JobExecutionId, JobInstance, JobInstanceId, JobParameters,
        StepExecution, StepExecutionId,
    };

    fn instance() -> JobInstance {
        JobInstance::new(JobInstanceId::new(4), "payroll")
    }

    fn execution(id: i64) -> JobExecution {
        JobExecution::new(JobExecutionId::new(id), instance(), JobParameters::new())
            .with_status(BatchStatus::Completed)
    }

    #[test]
    fn job_execution_resource_is_addressed_by_execution_id() {
        let view = ExecutionProjector::default().job_view(&execution(17));
        let resource = ResourceAssembler::new("/admin/").job_execution(&view);

        assert_eq!(resource.id(), 17);
        assert_eq!(resource.href("self"), Some("/admin/jobs/executions/17"));
        assert_eq!(
            resource.href("execution-context"),
            Some("/admin/jobs/executions/17/execution-context")
        );
        assert_eq!(resource.href("job-instance"), Some("/admin/jobs/payroll/4"));
    }

    #[test]
    fn serialized_resource_flattens_view_fields() {
        let view = ExecutionProjector::default().job_view(&execution(5));
        let json = serde_json::to_value(ResourceAssembler::default().job_execution(&view)).unwrap();

        assert_eq!(json["id"], 5);
        assert_eq!(json["jobName"], "payroll");
        assert_eq!(json["restartable"], true);
        assert_eq!(json["_links"]["self"]["href"], "/jobs/executions/5");
        assert!(json.get("_embedded").is_none());
    }

    #[test]
    fn job_name_is_escaped_as_one_path_segment() {
        let instance = JobInstance::new(JobInstanceId::new(6), "month end/eu");
        let exec = JobExecution::new(JobExecutionId::new(9), instance.clone(), JobParameters::new());
        let assembler = ResourceAssembler::new("/admin");

        let view = ExecutionProjector::default().job_view(&exec);
        assert_eq!(
            assembler.job_execution(&view).href("job-instance"),
            Some("/admin/jobs/month%20end%2Feu/6")
        );

        let resource = assembler.job_instance(&JobInstanceView::from(&instance), &[]);
        assert_eq!(resource.href("self"), Some("/admin/jobs/month%20end%2Feu/6"));
        assert_eq!(
            resource.href("executions"),
            Some("/admin/jobs/month%20end%2Feu/6/executions")
        );
    }

    #[test]
    fn placeholder_steps_have_no_resource() {
        let projector = ExecutionProjector::default();
        let exec = execution(8);
        let placeholder = projector.placeholder_step("payroll", exec.id, "archive");
        assert!(ResourceAssembler::default().step_execution(&placeholder).is_none());

        let step = StepExecution::new(StepExecutionId::new(3), exec.id, "load");
        let view = projector.step_view(&exec, &step);
        let resource = ResourceAssembler::default().step_execution(&view).unwrap();
        assert_eq!(resource.id(), 3);
        assert_eq!(resource.href("self"), Some("/jobs/executions/8/steps/3"));
        assert_eq!(resource.href("job-execution"), Some("/jobs/executions/8"));
    }

    #[test]
    fn instance_resource_embeds_children_without_touching_parent() {
        let projector = ExecutionProjector::default();
        let views = vec![projector.job_view(&execution(2)), projector.job_view(&execution(1))];
        let instance = JobInstanceView::from(&instance());

        let resource = ResourceAssembler::default().job_instance(&instance, &views);

        assert_eq!(resource.id(), 4);
        assert_eq!(resource.content(), &instance);
        assert_eq!(resource.href("self"), Some("/jobs/payroll/4"));
        let children = resource.embedded("executions");
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].id(), 2);
        assert_eq!(children[1].href("self"), Some("/jobs/executions/1"));

        let json = serde_json::to_value(&resource).unwrap();
        assert_eq!(json["_embedded"]["executions"][0]["id"], 2);
        assert_eq!(json["jobName"], "payroll");
    }
}
