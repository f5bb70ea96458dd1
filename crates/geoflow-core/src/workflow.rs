//! Workflow graph builder.
//!
//! A workflow is a named, ordered collection of tasks submitted together as
//! a processing graph. Composition is one-directional: the workflow records
//! each task's graph entry at construction time, and tasks are unaware of
//! which workflows reference them.

use crate::task::{ContainerDescriptor, InputValue, Task};
use serde::{Deserialize, Serialize};

/// Default name for the graph skeleton.
pub const DEFAULT_WORKFLOW_NAME: &str = "StageToS3";

/// Input entry in a submitted graph: a literal value or an upstream source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowInput {
    /// Input port name.
    pub name: String,

    /// Literal value, mutually exclusive with `source`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    /// Output reference `source:<task-id>:<port>`, mutually exclusive
    /// with `value`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Output entry in a submitted graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowOutput {
    /// Output port name.
    pub name: String,
}

/// One task entry in the submitted graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowTask {
    /// The task's generated unique identifier.
    pub name: String,

    /// Task type name, resolved by the execution engine's registry.
    pub task_type: String,

    /// Input bindings, in the order they were applied to the task.
    pub inputs: Vec<WorkflowInput>,

    /// Declared outputs, available to downstream tasks.
    pub outputs: Vec<WorkflowOutput>,

    /// Container descriptors carried over from the task definition.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub container_descriptors: Vec<ContainerDescriptor>,
}

impl WorkflowTask {
    fn from_task(task: &Task) -> Self {
        let inputs = task
            .input_data()
            .iter()
            .map(|binding| match &binding.value {
                InputValue::Value(value) => WorkflowInput {
                    name: binding.port.clone(),
                    value: Some(value.clone()),
                    source: None,
                },
                InputValue::Source(source) => WorkflowInput {
                    name: binding.port.clone(),
                    value: None,
                    source: Some(source.clone()),
                },
            })
            .collect();

        let outputs = task
            .output_ports()
            .iter()
            .map(|port| WorkflowOutput {
                name: port.name.clone(),
            })
            .collect();

        Self {
            name: task.id().to_string(),
            task_type: task.name().to_string(),
            inputs,
            outputs,
            container_descriptors: task.definition().container_descriptors.clone(),
        }
    }
}

/// Submission payload for the workflow endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    /// Workflow name.
    pub name: String,

    /// Task entries in input order.
    pub tasks: Vec<WorkflowTask>,
}

/// A named, ordered collection of tasks assembled for submission.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    definition: WorkflowDefinition,
}

impl Workflow {
    /// Assemble a workflow from the given tasks, in input order.
    pub fn new<'a, I>(tasks: I) -> Self
    where
        I: IntoIterator<Item = &'a Task>,
    {
        Self {
            definition: WorkflowDefinition {
                name: DEFAULT_WORKFLOW_NAME.to_string(),
                tasks: tasks.into_iter().map(WorkflowTask::from_task).collect(),
            },
        }
    }

    /// Builder method to override the workflow name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.definition.name = name.into();
        self
    }

    /// Append another task to the graph.
    pub fn add_task(&mut self, task: &Task) {
        self.definition.tasks.push(WorkflowTask::from_task(task));
    }

    /// The submission payload.
    pub fn definition(&self) -> &WorkflowDefinition {
        &self.definition
    }

    /// Workflow name.
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Recorded task identifiers, in input order.
    pub fn task_ids(&self) -> Vec<&str> {
        self.definition
            .tasks
            .iter()
            .map(|t| t.name.as_str())
            .collect()
    }
}

impl Default for Workflow {
    fn default() -> Self {
        Self {
            definition: WorkflowDefinition {
                name: DEFAULT_WORKFLOW_NAME.to_string(),
                tasks: Vec::new(),
            },
        }
    }
}
