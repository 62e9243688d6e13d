use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Entity not found: {0}")]
    EntityNotFound(Uuid),

    #[error("Setting not found: {0}")]
    SettingNotFound(Uuid),

    #[error("Import not found: {0}")]
    ImportNotFound(Uuid),

    #[error("Variable not found: {0}")]
    VariableNotFound(Uuid),

    #[error("Invalid variable name '{name}': {reason}")]
    InvalidVariableName { name: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),
}

pub type Result<T> = std::result::Result<T, SuiteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_variable_name_display() {
        let err = SuiteError::InvalidVariableName {
            name: "${x".to_string(),
            reason: "must be in format ${name}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid variable name '${x': must be in format ${name}"
        );
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: SuiteError = io_err.into();
        assert!(matches!(err, SuiteError::Io(_)));
    }
}
