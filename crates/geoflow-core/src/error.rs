//! Core domain errors.

use thiserror::Error;

/// Core domain errors for the geoflow task/workflow model.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Input port name not declared by the task definition.
    #[error("invalid input port '{port}' for task '{task}'; valid input ports are: {valid:?}")]
    UnknownInputPort {
        port: String,
        task: String,
        valid: Vec<String>,
    },

    /// Output port name not declared by the task definition.
    #[error("invalid output port '{port}' for task '{task}'; valid output ports are: {valid:?}")]
    UnknownOutputPort {
        port: String,
        task: String,
        valid: Vec<String>,
    },

    /// Task descriptor missing a required field.
    #[error("incomplete task descriptor: missing '{missing}'")]
    IncompleteTaskDescriptor { missing: &'static str },

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
