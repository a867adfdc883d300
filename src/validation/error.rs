//! Validation error types

/// Validation error type
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty required field: {0}")]
    EmptyRequiredField(String),

    #[error("Invalid range for {field}: {value} (expected {constraint})")]
    InvalidRange {
        field: String,
        value: String,
        constraint: String,
    },

    #[error("Mutually exclusive fields specified: {field1} and {field2}")]
    MutuallyExclusive { field1: String, field2: String },

    #[error("Invalid value for {field}: '{value}' (valid: {valid})")]
    InvalidChoice {
        field: String,
        value: String,
        valid: String,
    },

    #[error("File for {field} does not exist: {path}")]
    FileNotFound { field: String, path: String },

    #[error(
        "!LoadSerialized at {path} refers to {filename}, which neither exists nor is the model \
         file of an earlier experiment"
    )]
    UnresolvableLoad { path: String, filename: String },

    #[error("Dependency error: {0}")]
    DependencyError(String),
}
