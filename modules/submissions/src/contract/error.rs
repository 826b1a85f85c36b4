use thiserror::Error;

/// Failure of the persistence collaborator's append operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    #[error("document store rejected the write (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("document store unreachable: {0}")]
    Transport(String),

    #[error("document store authorization failed: {0}")]
    Auth(String),

    #[error("{0}")]
    Unavailable(String),
}

impl SinkError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }
}
