//! Food detection methods and their common interface
//!
//! Every recognition method, local or remote, answers the same question:
//! given one photo (and its precomputed features), which food is it and how
//! sure are you? Remote adapters may fail for any reason; they report that by
//! returning `None`, never by raising an error.

pub mod google_vision;
pub mod hugging_face;
pub mod labels;

pub use google_vision::GoogleVisionDetector;
pub use hugging_face::HuggingFaceDetector;

use crate::error::{AnalysisError, Result};
use crate::features::ImageFeatures;
use crate::image_loader::FoodImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Recognition method that produced a detection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    GoogleVision,
    ColorHistogram,
    HuggingFace,
    FeatureMatching,
}

impl DetectionMethod {
    /// All methods in voting order
    pub const ALL: [DetectionMethod; 4] = [
        DetectionMethod::GoogleVision,
        DetectionMethod::ColorHistogram,
        DetectionMethod::HuggingFace,
        DetectionMethod::FeatureMatching,
    ];

    /// Method key used in configuration and reports
    pub fn name(&self) -> &'static str {
        match self {
            DetectionMethod::GoogleVision => "google_vision",
            DetectionMethod::ColorHistogram => "color_histogram",
            DetectionMethod::HuggingFace => "hugging_face",
            DetectionMethod::FeatureMatching => "feature_matching",
        }
    }

    /// True for methods that call a remote service
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            DetectionMethod::GoogleVision | DetectionMethod::HuggingFace
        )
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One method's answer for one photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Food name as reported by the method
    pub food_label: String,
    /// Confidence in 0..=1
    pub confidence: f32,
    pub source_method: DetectionMethod,
    /// Method-specific evidence (vendor labels, scores, matched rule)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, serde_json::Value>,
}

impl Detection {
    /// Create a detection; the confidence is clamped to 0..=1 and NaN becomes 0
    pub fn new(
        food_label: impl Into<String>,
        confidence: f32,
        source_method: DetectionMethod,
    ) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            food_label: food_label.into(),
            confidence,
            source_method,
            details: BTreeMap::new(),
        }
    }

    /// Attach a piece of evidence
    pub fn with_detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Everything a detector may look at for one photo
#[derive(Debug, Clone, Copy)]
pub struct DetectionInput<'a> {
    pub image: &'a FoodImage,
    pub features: &'a ImageFeatures,
}

/// A food recognition method.
///
/// Implementations must be safe to share across requests; they hold no
/// per-request state.
pub trait FoodDetector: Send + Sync {
    /// Which ensemble slot this detector votes in
    fn method(&self) -> DetectionMethod;

    /// Recognize the food in one photo, or `None` if the method has no answer
    fn detect(&self, input: &DetectionInput<'_>) -> Option<Detection>;
}

/// Reasons a remote adapter produced no detection
#[derive(Debug, Error)]
pub(crate) enum AdapterFailure {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service answered with HTTP {0}")]
    Status(u16),

    #[error("service reported an error: {0}")]
    Service(String),

    #[error("unexpected response: {0}")]
    Malformed(String),

    #[error("no usable food label in response")]
    NoFoodLabel,
}

/// Build the blocking HTTP client shared by one adapter
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .user_agent(concat!("nutriscan/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AnalysisError::config("failed to build HTTP client", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_clamps_confidence() {
        assert_eq!(Detection::new("pizza", 1.4, DetectionMethod::GoogleVision).confidence, 1.0);
        assert_eq!(Detection::new("pizza", -0.2, DetectionMethod::GoogleVision).confidence, 0.0);
        assert_eq!(
            Detection::new("pizza", f32::NAN, DetectionMethod::GoogleVision).confidence,
            0.0
        );
    }

    #[test]
    fn test_method_names_match_serde() {
        for method in DetectionMethod::ALL {
            let json = serde_json::to_string(&method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.name()));
        }
        assert!(DetectionMethod::HuggingFace.is_remote());
        assert!(!DetectionMethod::FeatureMatching.is_remote());
    }

    #[test]
    fn test_detection_details_serialization() {
        let detection = Detection::new("salad", 0.8, DetectionMethod::ColorHistogram)
            .with_detail("signature", "salad");
        let json = serde_json::to_value(&detection).unwrap();
        assert_eq!(json["source_method"], "color_histogram");
        assert_eq!(json["details"]["signature"], "salad");

        let bare = Detection::new("salad", 0.8, DetectionMethod::ColorHistogram);
        let json = serde_json::to_value(&bare).unwrap();
        assert!(json.get("details").is_none());
    }
}
