//! Task definitions and the task graph node type.

use crate::{CoreError, TaskId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A declared named slot (input or output) on a task type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortDescriptor {
    /// Port name, unique within its direction.
    pub name: String,

    /// Port value type as declared by the registry.
    #[serde(rename = "type", default = "default_port_type")]
    pub port_type: String,

    /// Whether the port must be bound before submission.
    #[serde(default)]
    pub required: bool,

    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_port_type() -> String {
    "string".to_string()
}

impl PortDescriptor {
    /// Create a string-typed, optional port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            port_type: default_port_type(),
            required: false,
            description: None,
        }
    }
}

/// Container/execution metadata for a task type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerDescriptor {
    /// Container type (e.g. "DOCKER").
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub container_type: Option<String>,

    /// Execution properties; `domain` selects the deployment pool.
    #[serde(default)]
    pub properties: HashMap<String, Value>,
}

/// A task type definition as returned by the remote registry.
///
/// This is also the wire format for a serialized task: exactly these five
/// fields, all required on deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDefinition {
    /// Task type name.
    pub name: String,

    /// Task-level properties (timeout, visibility, ...).
    #[serde(default)]
    pub properties: HashMap<String, Value>,

    /// Declared input ports.
    #[serde(default)]
    pub input_port_descriptors: Vec<PortDescriptor>,

    /// Declared output ports.
    #[serde(default)]
    pub output_port_descriptors: Vec<PortDescriptor>,

    /// Container descriptors; the first one carries the execution domain.
    #[serde(default)]
    pub container_descriptors: Vec<ContainerDescriptor>,
}

/// Wire-format fields that must all be present on deserialize.
const REQUIRED_FIELDS: [&str; 5] = [
    "name",
    "properties",
    "inputPortDescriptors",
    "outputPortDescriptors",
    "containerDescriptors",
];

impl TaskDefinition {
    /// Parse the wire format, requiring all five descriptor fields.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        let value: Value = serde_json::from_str(text)?;
        for field in REQUIRED_FIELDS {
            if value.get(field).map_or(true, Value::is_null) {
                return Err(CoreError::IncompleteTaskDescriptor { missing: field });
            }
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Serialize to the wire format.
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Execution domain from the first container descriptor, `"default"`
    /// when unspecified.
    pub fn domain(&self) -> &str {
        self.container_descriptors
            .first()
            .and_then(|c| c.properties.get("domain"))
            .and_then(Value::as_str)
            .unwrap_or("default")
    }

    fn input_port_names(&self) -> Vec<String> {
        self.input_port_descriptors
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    fn output_port_names(&self) -> Vec<String> {
        self.output_port_descriptors
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }
}

/// Value bound to an input port: either a literal value or a reference to
/// another task's output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputValue {
    /// Literal value passed to the task.
    Value(String),
    /// Output reference of the form `source:<task-id>:<port>`.
    Source(String),
}

impl InputValue {
    const SOURCE_PREFIX: &'static str = "source:";

    /// Classify a raw string: strings shaped like an output reference are
    /// recorded as sources, everything else as literal values.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        if raw.starts_with(Self::SOURCE_PREFIX) {
            Self::Source(raw)
        } else {
            Self::Value(raw)
        }
    }

    /// The raw string, whichever side it is.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Value(s) | Self::Source(s) => s,
        }
    }

    /// Returns true for output references.
    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }
}

impl From<&str> for InputValue {
    fn from(raw: &str) -> Self {
        Self::from_raw(raw)
    }
}

impl From<String> for InputValue {
    fn from(raw: String) -> Self {
        Self::from_raw(raw)
    }
}

/// One input port binding. Bindings are an append-only log; rebinding a
/// port appends another entry rather than replacing the first.
#[derive(Debug, Clone, PartialEq)]
pub struct InputBinding {
    /// Input port name.
    pub port: String,
    /// Bound value or source.
    pub value: InputValue,
}

/// One unit of work in a processing graph.
///
/// A `Task` pairs a registry definition with a locally generated unique id
/// and the input bindings accumulated before submission. Ports are derived
/// from the definition and cannot be set independently.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    id: TaskId,
    name: String,
    definition: TaskDefinition,
    domain: String,
    input_data: Vec<InputBinding>,
}

impl Task {
    /// Create a Task from a registry definition, generating its id.
    pub fn new(definition: TaskDefinition) -> Self {
        Self {
            id: TaskId::for_task_type(&definition.name),
            name: definition.name.clone(),
            domain: definition.domain().to_string(),
            definition,
            input_data: Vec::new(),
        }
    }

    /// Construct from the wire format, bypassing any registry lookup.
    /// All five descriptor fields must be present.
    pub fn from_json(text: &str) -> Result<Self, CoreError> {
        Ok(Self::new(TaskDefinition::from_json(text)?))
    }

    /// Serialize the task's definition to the wire format.
    pub fn to_json(&self) -> Result<String, CoreError> {
        self.definition.to_json()
    }

    /// Builder method to set a specific id (useful for testing).
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = id;
        self
    }

    /// Unique task identifier, `<task_type>_<uuid>`.
    pub fn id(&self) -> &TaskId {
        &self.id
    }

    /// Task type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Execution domain of the task's container.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The registry definition this task was built from.
    pub fn definition(&self) -> &TaskDefinition {
        &self.definition
    }

    /// Declared input ports (read-only view over the definition).
    pub fn input_ports(&self) -> &[PortDescriptor] {
        &self.definition.input_port_descriptors
    }

    /// Declared output ports (read-only view over the definition).
    pub fn output_ports(&self) -> &[PortDescriptor] {
        &self.definition.output_port_descriptors
    }

    /// Input bindings in the order they were applied.
    pub fn input_data(&self) -> &[InputBinding] {
        &self.input_data
    }

    /// Bind one input port to a value or source.
    pub fn bind(
        &mut self,
        port: impl Into<String>,
        value: impl Into<InputValue>,
    ) -> Result<(), CoreError> {
        self.bind_all([(port.into(), value.into())])
    }

    /// Bind a sequence of input ports.
    ///
    /// Every port name is validated against the declared input ports before
    /// any binding is applied, so a failed call leaves `input_data`
    /// untouched. On success the bindings are appended in input order.
    pub fn bind_all<I, K, V>(&mut self, bindings: I) -> Result<(), CoreError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<InputValue>,
    {
        let bindings: Vec<InputBinding> = bindings
            .into_iter()
            .map(|(port, value)| InputBinding {
                port: port.into(),
                value: value.into(),
            })
            .collect();

        for binding in &bindings {
            if !self
                .definition
                .input_port_descriptors
                .iter()
                .any(|p| p.name == binding.port)
            {
                return Err(CoreError::UnknownInputPort {
                    port: binding.port.clone(),
                    task: self.name.clone(),
                    valid: self.definition.input_port_names(),
                });
            }
        }

        self.input_data.extend(bindings);
        Ok(())
    }

    /// Reference to one of this task's output ports, usable as a
    /// downstream task's input: `source:<task-id>:<port>`.
    pub fn output_reference(&self, port: &str) -> Result<String, CoreError> {
        if !self
            .definition
            .output_port_descriptors
            .iter()
            .any(|p| p.name == port)
        {
            return Err(CoreError::UnknownOutputPort {
                port: port.to_string(),
                task: self.name.clone(),
                valid: self.definition.output_port_names(),
            });
        }

        Ok(format!("source:{}:{}", self.id, port))
    }
}
