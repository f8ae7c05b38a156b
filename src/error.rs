//! Error types for the emergency classifier

use thiserror::Error;

/// Result type alias for classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Main error type, one variant per failure kind
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// Model artifact missing, malformed, or declaring an unusable shape.
    /// Fatal at startup.
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// Request rejected before processing (e.g. missing image field)
    #[error("{0}")]
    Validation(String),

    #[error("Image decode error: {0}")]
    ImageDecode(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    Shape { expected: String, actual: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClassifierError {
    /// Whether the error was caused by the request rather than by the service
    pub fn is_client_error(&self) -> bool {
        matches!(self, ClassifierError::Validation(_))
    }
}

impl From<image::ImageError> for ClassifierError {
    fn from(err: image::ImageError) -> Self {
        ClassifierError::ImageDecode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_is_verbatim() {
        let err = ClassifierError::Validation("No image provided".to_string());
        assert_eq!(err.to_string(), "No image provided");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_shape_error_display() {
        let err = ClassifierError::Shape {
            expected: "[1, 224, 224, 3]".to_string(),
            actual: "[1, 32, 32, 3]".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid shape: expected [1, 224, 224, 3], got [1, 32, 32, 3]"
        );
        assert!(!err.is_client_error());
    }
}
