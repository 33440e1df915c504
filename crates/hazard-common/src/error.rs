//! Error types for hazard-map crates.

use thiserror::Error;

/// Result type alias using HazardError.
pub type HazardResult<T> = Result<T, HazardError>;

/// Primary error type for grid, payload and rendering operations.
#[derive(Debug, Error)]
pub enum HazardError {
    // === Input Errors ===
    #[error("Invalid bounds: {0}")]
    InvalidBounds(String),

    #[error("Invalid grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Data Errors ===
    #[error("Heatmap data error: {0}")]
    DataError(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    // === Infrastructure Errors ===
    #[error("I/O error: {0}")]
    Io(String),
}

impl HazardError {
    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        HazardError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by the input rather than the environment.
    ///
    /// Input errors are not worth retrying with the same data.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            HazardError::InvalidBounds(_)
                | HazardError::InvalidGrid(_)
                | HazardError::InvalidParameter { .. }
                | HazardError::DataError(_)
        )
    }
}

impl From<std::io::Error> for HazardError {
    fn from(err: std::io::Error) -> Self {
        HazardError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for HazardError {
    fn from(err: serde_json::Error) -> Self {
        HazardError::DataError(format!("JSON error: {}", err))
    }
}
