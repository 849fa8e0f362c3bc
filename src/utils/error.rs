use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParcelError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    #[error("Validation error on {field}: {message}")]
    ValidationError { field: String, message: String },

    #[error("Invalid status transition: {from} -> {event}")]
    InvalidTransition { from: String, event: String },

    #[error("{collaborator} failed: {message}")]
    CollaboratorError {
        collaborator: String,
        message: String,
    },

    #[error("Persistence error: {message}")]
    PersistenceError { message: String },

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    NotFound,
    Validation,
    Collaborator,
    Persistence,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ParcelError {
    pub fn not_found(entity: &str, key: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            key: key.to_string(),
        }
    }

    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn collaborator(collaborator: &str, message: impl Into<String>) -> Self {
        Self::CollaboratorError {
            collaborator: collaborator.to_string(),
            message: message.into(),
        }
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        Self::PersistenceError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::ValidationError { .. } | Self::InvalidTransition { .. } => {
                ErrorCategory::Validation
            }
            Self::CollaboratorError { .. } | Self::ApiError(_) => ErrorCategory::Collaborator,
            Self::PersistenceError { .. } | Self::SerializationError(_) => {
                ErrorCategory::Persistence
            }
            Self::ConfigValidationError { .. } | Self::InvalidConfigValueError { .. } => {
                ErrorCategory::Configuration
            }
            Self::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::NotFound | ErrorCategory::Validation => ErrorSeverity::Low,
            ErrorCategory::Collaborator => ErrorSeverity::Medium,
            ErrorCategory::Persistence | ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::NotFound => "Check the tracking code or parcel id and try again",
            ErrorCategory::Validation => "Fix the highlighted input and resubmit the request",
            ErrorCategory::Collaborator => {
                "Check connectivity to the postal lookup and freight services"
            }
            ErrorCategory::Persistence => {
                "Nothing was saved; check the data file permissions and retry"
            }
            ErrorCategory::Configuration => "Review the configuration file and CLI flags",
            ErrorCategory::System => "Check disk space and file permissions",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::NotFound { entity, key } => format!("No {} found for '{}'", entity, key),
            Self::ValidationError { field, message } => format!("Invalid {}: {}", field, message),
            Self::InvalidTransition { from, event } => {
                format!("A parcel in status {} cannot {}", from, event)
            }
            Self::CollaboratorError { collaborator, .. } => {
                format!("The {} service is not available right now", collaborator)
            }
            Self::ApiError(_) => "A remote service could not be reached".to_string(),
            Self::PersistenceError { .. } | Self::SerializationError(_) => {
                "The operation could not be saved and was rolled back".to_string()
            }
            Self::IoError(e) => format!("File system error: {}", e),
            Self::ConfigValidationError { field, message } => {
                format!("Configuration problem in {}: {}", field, message)
            }
            Self::InvalidConfigValueError { field, reason, .. } => {
                format!("Configuration problem in {}: {}", field, reason)
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, ParcelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_and_severity() {
        let err = ParcelError::not_found("parcel", "CE999999");
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.to_string(), "parcel not found: CE999999");

        let err = ParcelError::persistence("disk full");
        assert_eq!(err.category(), ErrorCategory::Persistence);
        assert_eq!(err.severity(), ErrorSeverity::High);
    }

    #[test]
    fn test_user_friendly_message() {
        let err = ParcelError::validation("reason", "must not be blank");
        assert_eq!(err.user_friendly_message(), "Invalid reason: must not be blank");
    }
}
