use thiserror::Error;

/// Errors that can occur on the file-loading and rendering surfaces.
///
/// The core `build()` entry point is infallible: malformed steps degrade
/// inside the interpreter instead of surfacing here.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Invalid trace file contents
    #[error("Invalid trace format: {0}")]
    InvalidFormat(String),
}

impl LayoutError {
    /// Create a new invalid-format error
    pub fn invalid_format(msg: impl Into<String>) -> Self {
        Self::InvalidFormat(msg.into())
    }
}

/// Result type for fallible layout-crate operations
pub type Result<T> = std::result::Result<T, LayoutError>;
