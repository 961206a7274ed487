//! Error types for the nutriscan library

use thiserror::Error;

/// Result type alias for nutriscan operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error kinds surfaced by the analysis pipeline.
///
/// Adapter failures and low-confidence recognitions never show up here: the
/// detectors degrade to `None` and the ensemble falls back to a generic label.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Payload could not be decoded into an image (bad base64 or unknown format)
    #[error("Failed to decode image: {message}")]
    ImageDecodeError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Image is smaller than the minimum analysable size
    #[error("Image too small: {width}x{height} (minimum {minimum}x{minimum})")]
    ImageTooSmall { width: u32, height: u32, minimum: u32 },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Reference data (nutrition database, canonical foods) could not be read
    #[error("Failed to load reference data: {message}")]
    DataLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration file or client construction failed
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Generic processing error
    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

impl AnalysisError {
    /// Create an image decode error with context
    pub fn image_decode<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageDecodeError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a reference data error with context
    pub fn data_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::DataLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a processing error from a message
    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }

    /// HTTP status a request handler should answer with.
    ///
    /// Undecodable payloads and bad parameters are 400, images under the
    /// minimum size are 422, everything else is 500.
    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::ImageDecodeError { .. } | AnalysisError::InvalidParameter { .. } => 400,
            AnalysisError::ImageTooSmall { .. } => 422,
            _ => 500,
        }
    }

    /// Check if the caller can fix this error by changing the request
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::ImageDecodeError { .. } => {
                "Could not read the photo. Please upload a JPEG or PNG image.".to_string()
            }
            AnalysisError::ImageTooSmall { minimum, .. } => format!(
                "The photo is too small to analyze. Please use an image of at least {0}x{0} pixels.",
                minimum
            ),
            AnalysisError::InvalidParameter { parameter, .. } => {
                format!("The value given for '{}' is not valid.", parameter)
            }
            _ => "Food analysis failed. Please try again later.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let decode = AnalysisError::ImageDecodeError {
            message: "bad".into(),
            source: None,
        };
        let small = AnalysisError::ImageTooSmall {
            width: 10,
            height: 80,
            minimum: 50,
        };
        let internal = AnalysisError::processing("boom");

        assert_eq!(decode.status_code(), 400);
        assert_eq!(small.status_code(), 422);
        assert_eq!(internal.status_code(), 500);
        assert!(decode.is_client_error());
        assert!(small.is_client_error());
        assert!(!internal.is_client_error());
    }

    #[test]
    fn test_user_message_mentions_minimum() {
        let small = AnalysisError::ImageTooSmall {
            width: 10,
            height: 10,
            minimum: 50,
        };
        assert!(small.user_message().contains("50x50"));
        assert!(small.to_string().contains("10x10"));
    }
}
