//! Hugging Face inference adapter
//!
//! Posts the raw photo bytes to hosted image-classification models. Models
//! are tried in configured order and the first one that answers decides;
//! each model gets exactly one attempt.

use super::labels::map_model_label;
use super::{http_client, AdapterFailure, Detection, DetectionInput, DetectionMethod, FoodDetector};
use crate::config::HuggingFaceConfig;
use crate::error::Result;
use crate::image_loader::FoodImage;
use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, warn};

/// Model scores above this are not trusted as-is
const CONFIDENCE_CEILING: f32 = 0.95;

/// One class prediction from an image-classification model
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Predictions(Vec<Prediction>),
    Failure { error: String },
}

/// Pick the top prediction and map it onto a dish name
pub(crate) fn interpret_predictions(
    predictions: &[Prediction],
    model: &str,
) -> std::result::Result<Detection, AdapterFailure> {
    let top = predictions
        .iter()
        .filter(|p| !p.label.trim().is_empty())
        .max_by(|a, b| a.score.total_cmp(&b.score))
        .ok_or(AdapterFailure::NoFoodLabel)?;

    Ok(Detection::new(
        map_model_label(&top.label),
        top.score.min(CONFIDENCE_CEILING),
        DetectionMethod::HuggingFace,
    )
    .with_detail("model", model)
    .with_detail("raw_label", top.label.as_str()))
}

/// Hugging Face inference detector
pub struct HuggingFaceDetector {
    client: reqwest::blocking::Client,
    base_url: String,
    models: Vec<String>,
    api_token: Option<String>,
}

impl HuggingFaceDetector {
    /// Create a detector from its configuration section
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::ConfigError` if the HTTP client cannot be built.
    pub fn new(config: &HuggingFaceConfig) -> Result<Self> {
        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            models: config.models.clone(),
            api_token: config.api_token.clone().filter(|t| !t.trim().is_empty()),
        })
    }

    fn classify(
        &self,
        model: &str,
        image: &FoodImage,
    ) -> std::result::Result<Detection, AdapterFailure> {
        let mut request = self
            .client
            .post(format!("{}/{}", self.base_url, model))
            .header(CONTENT_TYPE, image.format().mime_type())
            .body(image.bytes().to_vec());
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(AdapterFailure::Status(status.as_u16()));
        }

        match response
            .json::<InferenceResponse>()
            .map_err(|e| AdapterFailure::Malformed(e.to_string()))?
        {
            InferenceResponse::Predictions(predictions) => {
                interpret_predictions(&predictions, model)
            }
            InferenceResponse::Failure { error } => Err(AdapterFailure::Service(error)),
        }
    }
}

impl FoodDetector for HuggingFaceDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::HuggingFace
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Option<Detection> {
        for model in &self.models {
            match self.classify(model, input.image) {
                Ok(detection) => {
                    debug!(
                        model = %model,
                        food = %detection.food_label,
                        confidence = detection.confidence,
                        "hugging face detection"
                    );
                    return Some(detection);
                }
                Err(failure) => {
                    warn!(
                        method = "hugging_face",
                        model = %model,
                        error = %failure,
                        "model produced no detection"
                    );
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_prediction_is_mapped() {
        let predictions: Vec<Prediction> = serde_json::from_str(
            r#"[
                {"label": "hamburger", "score": 0.91},
                {"label": "hot_dog", "score": 0.05}
            ]"#,
        )
        .unwrap();
        let detection = interpret_predictions(&predictions, "nateraw/food").unwrap();
        assert_eq!(detection.food_label, "burger");
        assert!((detection.confidence - 0.91).abs() < 1e-6);
        assert_eq!(detection.details["raw_label"], "hamburger");
    }

    #[test]
    fn test_unsorted_predictions_use_best_score() {
        let predictions = vec![
            Prediction { label: "ramen".into(), score: 0.2 },
            Prediction { label: "fruit_salad".into(), score: 0.99 },
        ];
        let detection = interpret_predictions(&predictions, "m").unwrap();
        assert_eq!(detection.food_label, "fruit bowl");
        assert!((detection.confidence - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_empty_predictions() {
        assert!(matches!(
            interpret_predictions(&[], "m"),
            Err(AdapterFailure::NoFoodLabel)
        ));
    }

    #[test]
    fn test_error_payload_parses() {
        let parsed: InferenceResponse =
            serde_json::from_str(r#"{"error": "Model is currently loading", "estimated_time": 20.0}"#)
                .unwrap();
        assert!(matches!(parsed, InferenceResponse::Failure { .. }));
    }

    #[test]
    fn test_detector_without_models_returns_none() {
        use crate::features::FeatureExtractor;
        use image::{DynamicImage, ImageBuffer, Rgb};
        use std::io::Cursor;

        let config = HuggingFaceConfig {
            models: Vec::new(),
            ..HuggingFaceConfig::default()
        };
        let detector = HuggingFaceDetector::new(&config).unwrap();

        let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(64, 64, Rgb([10u8, 200, 10])));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, image::ImageFormat::Png).unwrap();
        let photo = crate::image_loader::decode_bytes(out.into_inner()).unwrap();
        let features = FeatureExtractor::new().extract(photo.image());

        let input = DetectionInput { image: &photo, features: &features };
        assert!(detector.detect(&input).is_none());
    }
}
