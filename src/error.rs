//! Engine error taxonomy.
//!
//! Every failure is detected by local validation before an algorithm runs.
//! The engine never retries: the same input always yields the same error.

use thiserror::Error;

use crate::models::TaskId;
use crate::validation::ValidationError;

/// Result alias used by all engine entry points.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Typed failures surfaced by the allocation engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// The snapshot contains no employees.
    #[error("No employees available")]
    NoEmployeesAvailable,

    /// Workload balancing needs at least two employees.
    #[error("Insufficient employees for balancing: need at least 2, found {found}")]
    InsufficientEmployees { found: usize },

    /// The operation is not allowed for the task's current state.
    #[error("Invalid state for task {task_id}: {reason}")]
    InvalidTaskState { task_id: TaskId, reason: String },

    /// The snapshot (or configuration) is malformed.
    #[error("Invalid input: {}", summarize(.errors))]
    InvalidInput { errors: Vec<ValidationError> },
}

impl EngineError {
    pub(crate) fn invalid_state(task_id: TaskId, reason: impl Into<String>) -> Self {
        Self::InvalidTaskState {
            task_id,
            reason: reason.into(),
        }
    }
}

impl From<Vec<ValidationError>> for EngineError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::InvalidInput { errors }
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    match errors {
        [] => "no details".to_string(),
        [only] => only.message.clone(),
        [first, rest @ ..] => format!("{} (and {} more)", first.message, rest.len()),
    }
}
