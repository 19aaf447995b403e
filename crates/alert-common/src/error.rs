//! Error types for the alert-mapping pipeline.

use thiserror::Error;

/// Result type alias using AlertMapError.
pub type AlertMapResult<T> = Result<T, AlertMapError>;

/// How far a failure reaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureScope {
    /// Nothing downstream can proceed; the whole run stops.
    Run,
    /// Only the artifact for the current hazard definition is lost.
    Iteration,
}

/// Primary error type for alert-mapping operations.
#[derive(Debug, Error)]
pub enum AlertMapError {
    // === Input Errors ===
    #[error("Failed to download {url}: {reason}")]
    Download { url: String, reason: String },

    #[error("Failed to extract archive: {0}")]
    Archive(String),

    #[error("Failed to load layer '{layer}' from {path}: {reason}")]
    LayerLoad {
        layer: String,
        path: String,
        reason: String,
    },

    #[error("Projection error: {0}")]
    Projection(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    // === Definition Errors ===
    #[error("Hazard definition '{definition}' is missing required field '{field}'")]
    MissingDefinitionField { definition: String, field: String },

    #[error("Hazard definition '{definition}' has invalid {field}: '{value}'")]
    InvalidDefinitionField {
        definition: String,
        field: String,
        value: String,
    },

    // === Output Errors ===
    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl AlertMapError {
    /// Whether this error ends the run or only the current iteration.
    pub fn scope(&self) -> FailureScope {
        match self {
            AlertMapError::Download { .. }
            | AlertMapError::Archive(_)
            | AlertMapError::LayerLoad { .. }
            | AlertMapError::Projection(_)
            | AlertMapError::Config(_) => FailureScope::Run,

            AlertMapError::MissingDefinitionField { .. }
            | AlertMapError::InvalidDefinitionField { .. }
            | AlertMapError::Render(_)
            | AlertMapError::Io(_) => FailureScope::Iteration,
        }
    }

    pub fn missing_field(definition: &str, field: &str) -> Self {
        AlertMapError::MissingDefinitionField {
            definition: definition.to_string(),
            field: field.to_string(),
        }
    }
}

impl From<std::io::Error> for AlertMapError {
    fn from(err: std::io::Error) -> Self {
        AlertMapError::Io(err.to_string())
    }
}
