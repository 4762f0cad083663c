//! Workflow errors

use crate::engine::WorkflowState;
use gbp_common::{PolicyError, ValidationErrors};
use thiserror::Error;

/// Errors raised while driving a workflow
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Step input rejected locally; the workflow stays on the same step
    #[error("{0}")]
    Validation(ValidationErrors),

    /// Operation not allowed in the current state
    #[error("workflow is {state}, cannot {operation}")]
    InvalidState {
        /// Current state
        state: WorkflowState,
        /// Attempted operation
        operation: &'static str,
    },

    /// A workflow with no steps cannot be run
    #[error("workflow \"{workflow}\" has no steps")]
    NoSteps {
        /// Workflow slug
        workflow: &'static str,
    },

    /// Finalize requested before every step was submitted
    #[error("step \"{step}\" has not been completed")]
    Incomplete {
        /// First incomplete step
        step: &'static str,
    },

    /// A finalize call failed; earlier calls are not undone
    #[error("{message}")]
    Finalize {
        /// Rendered failure message
        message: String,
        /// Underlying store error
        #[source]
        source: PolicyError,
    },
}

impl WorkflowError {
    /// Field errors, when the error is a local validation failure
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Result type for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;
