//! Google Cloud Vision adapter
//!
//! Sends the photo to `images:annotate` with label, object and web detection
//! in a single request and folds the answer into one [`Detection`]. One
//! attempt per photo with a fixed timeout; any failure yields `None`.

use super::labels::{clean_food_name, is_food_related, map_to_known_food};
use super::{http_client, AdapterFailure, Detection, DetectionInput, DetectionMethod, FoodDetector};
use crate::config::GoogleVisionConfig;
use crate::error::{AnalysisError, Result};
use crate::image_loader::FoodImage;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

const MAX_LABELS: u32 = 25;
const MAX_OBJECTS: u32 = 15;
const MAX_WEB_ENTITIES: u32 = 15;

/// Web entities considered, best first
const WEB_ENTITIES_USED: usize = 5;

/// Web entities come without a score now and then
const DEFAULT_WEB_SCORE: f32 = 0.8;

/// Boost applied when a label maps onto a known dish, and its ceiling
const MAPPED_BOOST: f32 = 1.1;
const MAPPED_CEILING: f32 = 0.95;

/// Discount for answers taken from non-food labels
const GENERAL_LABEL_FACTOR: f32 = 0.7;

#[derive(Debug, Default, Deserialize)]
struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateImageResponse>,
}

/// One image's annotations as returned by the service
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotateImageResponse {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<LocalizedObject>,
    #[serde(default)]
    web_detection: Option<WebDetection>,
    #[serde(default)]
    error: Option<ServiceStatus>,
}

#[derive(Debug, Default, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Default, Deserialize)]
struct LocalizedObject {
    #[serde(default)]
    name: String,
    #[serde(default)]
    score: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WebDetection {
    #[serde(default)]
    web_entities: Vec<WebEntity>,
}

#[derive(Debug, Default, Deserialize)]
struct WebEntity {
    #[serde(default)]
    description: String,
    score: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceStatus {
    #[serde(default)]
    message: String,
}

struct Candidate<'a> {
    name: String,
    score: f32,
    kind: &'a str,
}

/// Turn one image's annotations into a detection.
///
/// Food-related labels, objects and the top web entities compete on score.
/// The best one that maps onto a known dish wins with a small boost; failing
/// that the best food-related name is used as is, and failing that the top
/// general label at a discount.
pub(crate) fn interpret_annotations(
    response: &AnnotateImageResponse,
) -> std::result::Result<Detection, AdapterFailure> {
    if let Some(status) = &response.error {
        return Err(AdapterFailure::Service(status.message.clone()));
    }

    let mut candidates: Vec<Candidate<'_>> = Vec::new();
    for label in &response.label_annotations {
        if is_food_related(&label.description) {
            candidates.push(Candidate {
                name: label.description.to_lowercase(),
                score: label.score,
                kind: "label",
            });
        }
    }
    for object in &response.localized_object_annotations {
        if is_food_related(&object.name) {
            candidates.push(Candidate {
                name: object.name.to_lowercase(),
                score: object.score,
                kind: "object",
            });
        }
    }
    if let Some(web) = &response.web_detection {
        for entity in web.web_entities.iter().take(WEB_ENTITIES_USED) {
            if is_food_related(&entity.description) {
                candidates.push(Candidate {
                    name: entity.description.to_lowercase(),
                    score: entity.score.unwrap_or(DEFAULT_WEB_SCORE),
                    kind: "web",
                });
            }
        }
    }

    candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

    let label_names: Vec<&str> = response
        .label_annotations
        .iter()
        .take(10)
        .map(|l| l.description.as_str())
        .collect();

    let detection = if let Some((candidate, food)) = candidates
        .iter()
        .find_map(|c| map_to_known_food(&c.name).map(|food| (c, food)))
    {
        Detection::new(
            food,
            (candidate.score * MAPPED_BOOST).min(MAPPED_CEILING),
            DetectionMethod::GoogleVision,
        )
        .with_detail("matched", candidate.name.as_str())
        .with_detail("match_kind", candidate.kind)
    } else if let Some(best) = candidates.first() {
        Detection::new(
            clean_food_name(&best.name),
            best.score,
            DetectionMethod::GoogleVision,
        )
        .with_detail("matched", best.name.as_str())
        .with_detail("match_kind", best.kind)
    } else if let Some(top) = response.label_annotations.first() {
        Detection::new(
            clean_food_name(&top.description),
            top.score * GENERAL_LABEL_FACTOR,
            DetectionMethod::GoogleVision,
        )
        .with_detail("matched", top.description.as_str())
        .with_detail("match_kind", "general")
    } else {
        return Err(AdapterFailure::NoFoodLabel);
    };

    Ok(detection.with_detail("labels", label_names))
}

/// Google Cloud Vision detector
pub struct GoogleVisionDetector {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl GoogleVisionDetector {
    /// Create a detector from its configuration section
    ///
    /// # Errors
    ///
    /// Returns `AnalysisError::ConfigError` when no API key is configured or
    /// the HTTP client cannot be built.
    pub fn new(config: &GoogleVisionConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalysisError::ConfigError {
                message: "google_vision.api_key is not set".to_string(),
                source: None,
            })?;

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            endpoint: config.endpoint.clone(),
            api_key,
        })
    }

    fn annotate(
        &self,
        image: &FoodImage,
    ) -> std::result::Result<AnnotateImageResponse, AdapterFailure> {
        let body = json!({
            "requests": [{
                "image": { "content": image.to_base64() },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": MAX_LABELS },
                    { "type": "OBJECT_LOCALIZATION", "maxResults": MAX_OBJECTS },
                    { "type": "WEB_DETECTION", "maxResults": MAX_WEB_ENTITIES }
                ]
            }]
        });

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterFailure::Status(status.as_u16()));
        }

        let parsed: AnnotateResponse = response
            .json()
            .map_err(|e| AdapterFailure::Malformed(e.to_string()))?;

        parsed
            .responses
            .into_iter()
            .next()
            .ok_or_else(|| AdapterFailure::Malformed("empty responses array".to_string()))
    }
}

impl FoodDetector for GoogleVisionDetector {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::GoogleVision
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Option<Detection> {
        match self
            .annotate(input.image)
            .and_then(|response| interpret_annotations(&response))
        {
            Ok(detection) => {
                debug!(
                    food = %detection.food_label,
                    confidence = detection.confidence,
                    "google vision detection"
                );
                Some(detection)
            }
            Err(failure) => {
                warn!(method = "google_vision", error = %failure, "adapter produced no detection");
                None
            }
        }
    }
}
