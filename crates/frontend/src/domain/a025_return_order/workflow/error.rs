use contracts::domain::a025_return_order::status::StatusError;
use contracts::shared::api_response::EnvelopeError;
use thiserror::Error;

use super::state::Step;

/// Failure of a workflow operation.
///
/// `Display` is the message shown to the user and stored in `WorkflowState::error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Client-side precondition, never sent to the backend
    #[error("{0}")]
    Validation(String),
    /// Search found nothing; carries the backend message
    #[error("{0}")]
    NotFound(String),
    #[error("Network error: {0}")]
    Network(String),
    /// Backend answered `success: false`
    #[error("{0}")]
    Domain(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error(transparent)]
    InvalidRole(#[from] StatusError),
    /// Another request for this order is still in flight
    #[error("Another operation is still in progress")]
    Busy,
    #[error("Cannot move from '{}' to '{}'", .from.code(), .to.code())]
    TransitionDenied { from: Step, to: Step },
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        WorkflowError::Validation(message.into())
    }

    /// Busy rejections are silent: they must not overwrite the state of the request in flight
    pub fn is_silent(&self) -> bool {
        matches!(self, WorkflowError::Busy)
    }
}

impl From<EnvelopeError> for WorkflowError {
    fn from(err: EnvelopeError) -> Self {
        match err {
            EnvelopeError::Domain(message) => WorkflowError::Domain(message),
            other @ EnvelopeError::MissingData => WorkflowError::Server(other.to_string()),
        }
    }
}
