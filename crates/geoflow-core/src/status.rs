//! Status enums for orders and workflow executions.

use serde::{Deserialize, Serialize};

/// State of an imagery order as reported by the ordering endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderState {
    /// Order accepted but not yet placed with the provider.
    #[default]
    Submitted,
    /// Order placed with the imagery provider.
    Placed,
    /// Imagery delivered to object storage.
    Delivered,
    /// Order failed.
    Failed,
    /// State string not recognized by this client version.
    #[serde(other)]
    Unknown,
}

impl OrderState {
    /// Returns true if the imagery has landed in object storage.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Returns true if the order will not progress further.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Failed)
    }
}

/// State of a workflow execution as reported by the workflow endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkflowState {
    /// Workflow accepted, not yet scheduled.
    #[default]
    Pending,
    /// Workflow submitted to the execution engine.
    Submitted,
    /// Workflow scheduled onto a domain.
    Scheduled,
    /// At least one task is executing.
    Running,
    /// All tasks finished successfully.
    Complete,
    /// A task failed.
    Failed,
    /// Workflow was canceled.
    Canceled,
    /// Workflow exceeded its execution timeout.
    Timedout,
    /// State string not recognized by this client version.
    #[serde(other)]
    Unknown,
}

impl WorkflowState {
    /// Returns true if the workflow will not progress further.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Complete | Self::Failed | Self::Canceled | Self::Timedout
        )
    }

    /// Returns true if the workflow finished successfully.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_state_terminal() {
        assert!(WorkflowState::Complete.is_terminal());
        assert!(WorkflowState::Timedout.is_terminal());
        assert!(!WorkflowState::Running.is_terminal());
    }

    #[test]
    fn test_state_parse() {
        let state: WorkflowState = serde_json::from_str("\"complete\"").unwrap();
        assert!(state.is_complete());

        let order: OrderState = serde_json::from_str("\"delivered\"").unwrap();
        assert!(order.is_delivered());
    }

    #[test]
    fn test_unknown_state_does_not_fail_parse() {
        let state: WorkflowState = serde_json::from_str("\"resubmitting\"").unwrap();
        assert_eq!(state, WorkflowState::Unknown);
        assert!(!state.is_terminal());
    }
}
