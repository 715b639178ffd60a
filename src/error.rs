// Error taxonomy for task list operations

use thiserror::Error;

/// Errors reported by the task list store and its backends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// No task with the given id exists in the collection
    #[error("Task not found: {id}")]
    NotFound { id: String },

    /// Input rejected before any state was touched
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },
}

impl StoreError {
    pub fn not_found(id: impl Into<String>) -> Self {
        StoreError::NotFound { id: id.into() }
    }

    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        StoreError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}
