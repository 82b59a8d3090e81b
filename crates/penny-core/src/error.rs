//! Error types for Penny

use thiserror::Error;

/// Rejected expense input
///
/// Returned by [`crate::store::ExpenseStore::append`]; the store is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Amount must be a positive number (got \"{0}\")")]
    InvalidAmount(String),

    #[error("Category cannot be empty")]
    EmptyCategory,
}

impl ValidationError {
    /// Which input field failed validation
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidAmount(_) => "amount",
            Self::EmptyCategory => "category",
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Savings advice unavailable: {0}")]
    AdvisoryUnavailable(String),

    #[error("AI service unavailable: {0}")]
    CollaboratorUnavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_field() {
        assert_eq!(ValidationError::InvalidAmount("abc".into()).field(), "amount");
        assert_eq!(ValidationError::EmptyCategory.field(), "category");
    }

    #[test]
    fn test_validation_error_converts() {
        let err: Error = ValidationError::EmptyCategory.into();
        assert!(matches!(err, Error::Validation(ValidationError::EmptyCategory)));
        assert_eq!(err.to_string(), "Validation error: Category cannot be empty");
    }
}
