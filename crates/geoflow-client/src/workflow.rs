//! Task registry and workflow execution endpoint.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

use geoflow_core::{
    Task, TaskDefinition, TaskId, Workflow, WorkflowDefinition, WorkflowId, WorkflowState,
};

use crate::error::ClientError;
use crate::http::HttpClient;
use crate::poll::PollPolicy;

/// Status of a workflow execution.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    /// Workflow identifier.
    pub id: WorkflowId,

    /// Current execution state.
    pub state: WorkflowState,

    /// Most recent engine event, when reported.
    #[serde(default)]
    pub event: Option<String>,
}

/// One entry in a workflow's event log.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowEvent {
    /// Task the event belongs to, absent for workflow-level events.
    #[serde(default)]
    pub task_id: Option<TaskId>,

    /// Event name as reported by the engine.
    pub event: String,

    /// Workflow state after the event, when reported.
    #[serde(default)]
    pub state: Option<WorkflowState>,

    /// When the event occurred.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,

    /// Free-form note attached by the engine.
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EventsResponse {
    events: Vec<WorkflowEvent>,
}

#[derive(Debug, Deserialize)]
struct LaunchResponse {
    id: WorkflowId,
}

/// Options for the process-and-stage convenience pipeline.
#[derive(Debug, Clone)]
pub struct StageToS3Options {
    /// Band selection passed to the processor.
    pub bands: String,

    /// Enable atmospheric compensation.
    pub enable_acomp: bool,

    /// Enable pansharpening.
    pub enable_pansharpen: bool,

    /// Target projection for orthorectification.
    pub ortho_epsg: String,
}

impl Default for StageToS3Options {
    fn default() -> Self {
        Self {
            bands: "Auto".to_string(),
            enable_acomp: false,
            enable_pansharpen: false,
            ortho_epsg: "EPSG:4326".to_string(),
        }
    }
}

fn bool_input(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Client for the task registry and the workflow execution endpoint.
pub struct WorkflowApi {
    http: Arc<HttpClient>,
}

impl WorkflowApi {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self { http }
    }

    /// Fetch a task type's definition from the registry.
    ///
    /// Unknown task types and unreachable registries surface as-is; this
    /// layer does not retry or wrap them.
    pub async fn describe_task(&self, name: &str) -> Result<TaskDefinition, ClientError> {
        self.http
            .get_json(&format!("/workflows/v1/tasks/{name}"))
            .await
    }

    /// Create a [`Task`] for the given task type: one registry round-trip,
    /// then local construction.
    pub async fn task(&self, name: &str) -> Result<Task, ClientError> {
        Ok(Task::new(self.describe_task(name).await?))
    }

    /// Create a [`Task`] and bind its input ports in one call.
    ///
    /// Binding is atomic: an unknown port name fails the whole call and
    /// leaves no binding applied.
    pub async fn build_task<I, K, V>(&self, name: &str, bindings: I) -> Result<Task, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<geoflow_core::InputValue>,
    {
        let mut task = self.task(name).await?;
        task.bind_all(bindings)?;
        Ok(task)
    }

    /// Submit a workflow graph for execution.
    pub async fn launch(&self, workflow: &Workflow) -> Result<WorkflowId, ClientError> {
        self.launch_definition(workflow.definition()).await
    }

    /// Submit a raw workflow definition for execution.
    pub async fn launch_definition(
        &self,
        definition: &WorkflowDefinition,
    ) -> Result<WorkflowId, ClientError> {
        debug!(workflow = %definition.name, tasks = definition.tasks.len(), "Launching workflow");
        let launched: LaunchResponse = self
            .http
            .post_json("/workflows/v1/workflows", definition)
            .await?;
        info!(workflow_id = %launched.id, "Workflow launched");
        Ok(launched.id)
    }

    /// Current status of a workflow execution.
    pub async fn status(&self, id: &WorkflowId) -> Result<WorkflowStatus, ClientError> {
        self.http
            .get_json(&format!("/workflows/v1/workflows/{id}"))
            .await
    }

    /// Event log of a workflow execution.
    pub async fn events(&self, id: &WorkflowId) -> Result<Vec<WorkflowEvent>, ClientError> {
        let response: EventsResponse = self
            .http
            .get_json(&format!("/workflows/v1/workflows/{id}/events"))
            .await?;
        Ok(response.events)
    }

    /// Cancel a workflow execution.
    pub async fn cancel(&self, id: &WorkflowId) -> Result<(), ClientError> {
        self.http
            .post_empty(&format!("/workflows/v1/workflows/{id}/cancel"))
            .await
    }

    /// Poll a workflow under the given policy until it reaches a terminal
    /// state.
    pub async fn wait_until_complete(
        &self,
        id: &WorkflowId,
        policy: &PollPolicy,
    ) -> Result<WorkflowStatus, ClientError> {
        let mut backoff = policy.backoff();
        loop {
            let status = self.status(id).await?;
            if status.state.is_terminal() {
                info!(workflow_id = %id, state = ?status.state, "Workflow reached terminal state");
                return Ok(status);
            }
            debug!(workflow_id = %id, state = ?status.state, "Workflow still running");
            backoff.wait().await?;
        }
    }

    /// Launch the standard process-and-stage pipeline: run the strip
    /// processor over `source_location` and stage its output under
    /// `destination` in object storage.
    pub async fn stage_to_s3(
        &self,
        source_location: &str,
        destination: &str,
        options: &StageToS3Options,
    ) -> Result<WorkflowId, ClientError> {
        let mut processor = self
            .build_task("AOP_Strip_Processor", [("data", source_location)])
            .await?;
        processor.bind_all([
            ("bands", options.bands.as_str()),
            ("enable_acomp", bool_input(options.enable_acomp)),
            ("enable_pansharpen", bool_input(options.enable_pansharpen)),
            ("ortho_epsg", options.ortho_epsg.as_str()),
        ])?;

        let processed = processor.output_reference("data")?;
        let stage = self
            .build_task(
                "StageDataToS3",
                [("data", processed.as_str()), ("destination", destination)],
            )
            .await?;

        self.launch(&Workflow::new([&processor, &stage])).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::StaticToken;
    use mockito::Matcher;
    use serde_json::json;

    const AOP_DEFINITION: &str = r#"{
        "name": "AOP_Strip_Processor",
        "properties": {"timeout": 36000},
        "inputPortDescriptors": [
            {"name": "data", "required": true},
            {"name": "bands"},
            {"name": "enable_acomp"},
            {"name": "enable_pansharpen"},
            {"name": "ortho_epsg"}
        ],
        "outputPortDescriptors": [{"name": "data"}, {"name": "log"}],
        "containerDescriptors": [{"properties": {"domain": "raid"}}]
    }"#;

    const STAGE_DEFINITION: &str = r#"{
        "name": "StageDataToS3",
        "properties": {},
        "inputPortDescriptors": [{"name": "data"}, {"name": "destination"}],
        "outputPortDescriptors": [],
        "containerDescriptors": []
    }"#;

    fn api(url: &str) -> WorkflowApi {
        WorkflowApi::new(Arc::new(HttpClient::new(
            url,
            Arc::new(StaticToken::new("test-token")),
        )))
    }

    #[tokio::test]
    async fn test_describe_task_fetches_definition() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/workflows/v1/tasks/AOP_Strip_Processor")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(AOP_DEFINITION)
            .create_async()
            .await;

        let definition = api(&server.url())
            .describe_task("AOP_Strip_Processor")
            .await
            .unwrap();
        assert_eq!(definition.name, "AOP_Strip_Processor");
        assert_eq!(definition.domain(), "raid");
        assert_eq!(definition.input_port_descriptors.len(), 5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unknown_task_type_propagates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/workflows/v1/tasks/NoSuchTask")
            .with_status(404)
            .create_async()
            .await;

        let err = api(&server.url()).describe_task("NoSuchTask").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_build_task_binds_and_validates() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/workflows/v1/tasks/AOP_Strip_Processor")
            .with_status(200)
            .with_body(AOP_DEFINITION)
            .expect(2)
            .create_async()
            .await;

        let task = api(&server.url())
            .build_task("AOP_Strip_Processor", [("data", "s3://bucket/strip")])
            .await
            .unwrap();
        assert!(task.id().as_str().starts_with("AOP_Strip_Processor_"));
        assert_eq!(task.input_data().len(), 1);

        let err = api(&server.url())
            .build_task("AOP_Strip_Processor", [("bogus", "x")])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Core(_)));
    }

    #[tokio::test]
    async fn test_launch_posts_graph_and_parses_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/workflows/v1/workflows")
            .match_body(Matcher::PartialJson(json!({"name": "StageToS3"})))
            .with_status(200)
            .with_body(r#"{"id": "wf-42"}"#)
            .create_async()
            .await;

        let id = api(&server.url()).launch(&Workflow::default()).await.unwrap();
        assert_eq!(id.as_str(), "wf-42");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_status_and_events_parse() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/workflows/v1/workflows/wf-42")
            .with_status(200)
            .with_body(r#"{"id": "wf-42", "state": "running", "event": "started"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/workflows/v1/workflows/wf-42/events")
            .with_status(200)
            .with_body(
                r#"{"events": [
                    {"event": "submitted", "timestamp": "2026-08-06T12:00:00Z"},
                    {"event": "scheduled", "taskId": "AOP_1", "state": "scheduled"}
                ]}"#,
            )
            .create_async()
            .await;

        let api = api(&server.url());
        let id = WorkflowId::new("wf-42");

        let status = api.status(&id).await.unwrap();
        assert_eq!(status.state, WorkflowState::Running);
        assert_eq!(status.event.as_deref(), Some("started"));

        let events = api.events(&id).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].timestamp.is_some());
        assert_eq!(events[1].task_id.as_ref().map(|t| t.as_str()), Some("AOP_1"));
    }

    #[tokio::test]
    async fn test_cancel_posts() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/workflows/v1/workflows/wf-42/cancel")
            .with_status(200)
            .create_async()
            .await;

        api(&server.url())
            .cancel(&WorkflowId::new("wf-42"))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_wait_until_complete_stops_on_terminal_state() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/workflows/v1/workflows/wf-42")
            .with_status(200)
            .with_body(r#"{"id": "wf-42", "state": "complete"}"#)
            .create_async()
            .await;

        let status = api(&server.url())
            .wait_until_complete(&WorkflowId::new("wf-42"), &PollPolicy::default())
            .await
            .unwrap();
        assert!(status.state.is_complete());
    }

    #[tokio::test]
    async fn test_stage_to_s3_chains_processor_into_stage() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/workflows/v1/tasks/AOP_Strip_Processor")
            .with_status(200)
            .with_body(AOP_DEFINITION)
            .create_async()
            .await;
        server
            .mock("GET", "/workflows/v1/tasks/StageDataToS3")
            .with_status(200)
            .with_body(STAGE_DEFINITION)
            .create_async()
            .await;
        let launch = server
            .mock("POST", "/workflows/v1/workflows")
            .match_body(Matcher::Regex(
                "source:AOP_Strip_Processor_[0-9a-f-]+:data".to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"id": "wf-7"}"#)
            .create_async()
            .await;

        let id = api(&server.url())
            .stage_to_s3(
                "s3://receiving/strip",
                "my_directory",
                &StageToS3Options::default(),
            )
            .await
            .unwrap();
        assert_eq!(id.as_str(), "wf-7");
        launch.assert_async().await;
    }
}
