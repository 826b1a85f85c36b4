use thiserror::Error;

use crate::contract::SinkError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("No data provided")]
    MissingData,

    #[error("Missing required field(s): {}", .fields.join(", "))]
    MissingFields { fields: Vec<String> },

    #[error("Field '{field}' must be a string")]
    InvalidField { field: String },

    #[error("{message}")]
    Persistence { message: String },
}

impl DomainError {
    pub fn missing_data() -> Self {
        Self::MissingData
    }

    pub fn missing_fields(fields: Vec<String>) -> Self {
        Self::MissingFields { fields }
    }

    pub fn invalid_field(field: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// Rejected before anything was written.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Self::Persistence { .. })
    }
}

impl From<SinkError> for DomainError {
    fn from(e: SinkError) -> Self {
        Self::persistence(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(DomainError::missing_data().to_string(), "No data provided");
        assert_eq!(
            DomainError::missing_fields(vec!["email".into(), "name".into()]).to_string(),
            "Missing required field(s): email, name"
        );
        assert_eq!(
            DomainError::invalid_field("age").to_string(),
            "Field 'age' must be a string"
        );
    }

    #[test]
    fn sink_errors_keep_their_description() {
        let e: DomainError = SinkError::unavailable("quota exceeded").into();
        assert_eq!(e, DomainError::persistence("quota exceeded"));
        assert!(!e.is_validation());
        assert!(DomainError::missing_data().is_validation());
    }
}
