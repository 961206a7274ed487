//! Framework-agnostic request handlers
//!
//! An HTTP layer maps `POST /analyze` and `POST /verify` onto these
//! functions and turns [`ApiError`] into a response with its status code.

use crate::error::AnalysisError;
use crate::nutrition::NutritionProfile;
use crate::pipeline::{AnalysisOptions, FoodAnalyzer, Recommendation};
use crate::verify::VerificationReport;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{error, warn};

/// Body of an analyze request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub image_b64: String,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub serving_grams: Option<f64>,
}

/// Error answer with the HTTP status it maps to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.status, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        let status = err.status_code();
        if err.is_client_error() {
            warn!(status, error = %err, "rejected request");
        } else {
            error!(status, error = %err, "request failed");
        }
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// `POST /analyze`: photo in, nutrition profile and recipes out
pub fn handle_analyze(
    analyzer: &FoodAnalyzer,
    request: &AnalyzeRequest,
) -> Result<Recommendation, ApiError> {
    let options = AnalysisOptions {
        notes: request.notes.clone(),
        serving_grams: request.serving_grams,
    };
    Ok(analyzer.analyze_base64(&request.image_b64, &options)?)
}

/// `POST /verify`: profile in, verification report out
pub fn handle_verify(analyzer: &FoodAnalyzer, profile: &NutritionProfile) -> VerificationReport {
    analyzer.verify(profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;

    #[test]
    fn test_error_mapping() {
        let err: ApiError = AnalysisError::ImageTooSmall {
            width: 20,
            height: 20,
            minimum: 50,
        }
        .into();
        assert_eq!(err.status, 422);
        assert!(err.message.contains("20x20"));

        let err: ApiError = AnalysisError::processing("disk on fire").into();
        assert_eq!(err.status, 500);
        assert_eq!(err.to_string(), "500 Processing error: disk on fire");
    }

    #[test]
    fn test_bad_payload_is_400() {
        let analyzer = FoodAnalyzer::new(AnalyzerConfig::offline()).unwrap();
        let request = AnalyzeRequest {
            image_b64: "%%%".to_string(),
            notes: None,
            serving_grams: None,
        };
        assert_eq!(handle_analyze(&analyzer, &request).unwrap_err().status, 400);
    }

    #[test]
    fn test_request_defaults() {
        let request: AnalyzeRequest = serde_json::from_str(r#"{"image_b64": "abc"}"#).unwrap();
        assert_eq!(request.notes, None);
        assert_eq!(request.serving_grams, None);
    }
}
