use thiserror::Error;

/// A business rule rejected the input; the message is shown to API clients.
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("{message}")]
    Validation { message: String },
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
