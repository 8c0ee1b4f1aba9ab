//! Error types for the scan_idcard library

use thiserror::Error;

/// Result type alias for scan_idcard operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Error types surfaced by card scanning operations
///
/// Detection misses, degenerate regions and missing codes are not errors: they are
/// recorded inside [`crate::PageResult`]. Only a buffer that cannot be decoded at all
/// reaches the caller as a hard failure.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Image file or byte buffer could not be decoded
    #[error("Failed to decode image: {message}")]
    ImageDecode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Text recognition backend failed for one region
    #[error("Text recognition failed: {message}")]
    Recognition { message: String },

    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },
}

impl ScanError {
    /// Create an image decode error with context
    pub fn image_decode<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageDecode {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Config {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Check if this error indicates a condition the pipeline degrades around
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScanError::Recognition { .. })
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            ScanError::ImageDecode { .. } => {
                "Unable to decode one of the provided images.".to_string()
            }
            ScanError::Recognition { .. } => {
                "Text could not be read from part of the card.".to_string()
            }
            ScanError::Config { .. } | ScanError::InvalidParameter { .. } => {
                "The scanner configuration is invalid.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err = ScanError::image_decode("front.jpg", io);

        assert_eq!(err.to_string(), "Failed to decode image: front.jpg");
        assert!(std::error::Error::source(&err).is_some());
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_recognition_error_is_recoverable() {
        let err = ScanError::Recognition {
            message: "tesseract exited with 1".into(),
        };
        assert!(err.is_recoverable());
        assert_eq!(err.user_message(), "Text could not be read from part of the card.");
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = ScanError::invalid_parameter("min_area_ratio", 1.5);
        assert_eq!(err.to_string(), "Invalid parameter: min_area_ratio = 1.5");
    }
}
