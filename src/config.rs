//! Configuration structures for the nutriscan analysis pipeline.
//!
//! All tunable parameters are grouped by the stage that reads them: feature
//! extraction, ensemble voting, the remote adapters, nutrition resolution and
//! verification.
//!
//! # Configuration Loading
//!
//! ```no_run
//! use nutriscan::AnalyzerConfig;
//! use std::path::Path;
//!
//! // Load from file
//! let config = AnalyzerConfig::from_json_file(Path::new("nutriscan.json"))?;
//!
//! // Or use defaults (local detectors only, built-in reference data)
//! let config = AnalyzerConfig::default();
//! # Ok::<(), nutriscan::AnalysisError>(())
//! ```
//!
//! Every section is `#[serde(default)]`, so a file only needs the keys it
//! changes.

use crate::constants::{ensemble, imaging, nutrition, timeouts, verification};
use crate::detection::DetectionMethod;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Complete analyzer configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Feature extraction settings
    pub features: FeatureConfig,

    /// Ensemble voting settings
    pub ensemble: EnsembleConfig,

    /// Google Cloud Vision adapter
    pub google_vision: GoogleVisionConfig,

    /// Hugging Face inference adapter
    pub hugging_face: HuggingFaceConfig,

    /// USDA FoodData Central nutrition lookup
    pub usda: UsdaConfig,

    /// Nutrition resolver settings
    pub nutrition: NutritionConfig,

    /// Verifier settings
    pub verification: VerificationConfig,
}

/// Feature extraction parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Side of the square working image
    pub analysis_size: u32,

    /// Minimum accepted width/height of the input image
    pub min_dimension: u32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            analysis_size: imaging::ANALYSIS_SIZE,
            min_dimension: imaging::MIN_DIMENSION,
        }
    }
}

/// Per-method voting weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodWeights {
    pub google_vision: f32,
    pub color_histogram: f32,
    pub hugging_face: f32,
    pub feature_matching: f32,
}

impl MethodWeights {
    /// Weight assigned to a detection method
    pub fn weight(&self, method: DetectionMethod) -> f32 {
        match method {
            DetectionMethod::GoogleVision => self.google_vision,
            DetectionMethod::ColorHistogram => self.color_histogram,
            DetectionMethod::HuggingFace => self.hugging_face,
            DetectionMethod::FeatureMatching => self.feature_matching,
        }
    }
}

impl Default for MethodWeights {
    fn default() -> Self {
        Self {
            google_vision: ensemble::GOOGLE_VISION_WEIGHT,
            color_histogram: ensemble::COLOR_HISTOGRAM_WEIGHT,
            hugging_face: ensemble::HUGGING_FACE_WEIGHT,
            feature_matching: ensemble::FEATURE_MATCHING_WEIGHT,
        }
    }
}

/// Ensemble combiner parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnsembleConfig {
    /// Voting weight per method
    pub weights: MethodWeights,

    /// Votes above this confidence count toward agreement
    pub strong_vote_confidence: f32,

    /// Agreement rate for the large bonus
    pub high_agreement_rate: f32,
    pub high_agreement_bonus: f32,

    /// Agreement rate for the small bonus
    pub medium_agreement_rate: f32,
    pub medium_agreement_bonus: f32,

    /// Maximum combined confidence
    pub confidence_cap: f32,

    /// Combined confidence below which a generic category is reported
    pub low_confidence: f32,
}

impl Default for EnsembleConfig {
    fn default() -> Self {
        Self {
            weights: MethodWeights::default(),
            strong_vote_confidence: ensemble::STRONG_VOTE_CONFIDENCE,
            high_agreement_rate: ensemble::HIGH_AGREEMENT_RATE,
            high_agreement_bonus: ensemble::HIGH_AGREEMENT_BONUS,
            medium_agreement_rate: ensemble::MEDIUM_AGREEMENT_RATE,
            medium_agreement_bonus: ensemble::MEDIUM_AGREEMENT_BONUS,
            confidence_cap: ensemble::CONFIDENCE_CAP,
            low_confidence: ensemble::LOW_CONFIDENCE,
        }
    }
}

/// Google Cloud Vision adapter settings.
///
/// The adapter is skipped unless it is enabled and has an API key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleVisionConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for GoogleVisionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            endpoint: "https://vision.googleapis.com/v1/images:annotate".to_string(),
            timeout_secs: timeouts::GOOGLE_VISION_SECS,
        }
    }
}

impl GoogleVisionConfig {
    /// Whether the adapter should be constructed at all
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Hugging Face inference adapter settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HuggingFaceConfig {
    pub enabled: bool,
    pub api_token: Option<String>,
    pub base_url: String,
    /// Models tried in order; the first successful answer is used
    pub models: Vec<String>,
    pub timeout_secs: u64,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_token: None,
            base_url: "https://api-inference.huggingface.co/models".to_string(),
            models: vec![
                "nateraw/food".to_string(),
                "Kaludi/food-category-classification-v2.0".to_string(),
            ],
            timeout_secs: timeouts::HUGGING_FACE_SECS,
        }
    }
}

/// USDA FoodData Central settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsdaConfig {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for UsdaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            base_url: "https://api.nal.usda.gov/fdc/v1".to_string(),
            timeout_secs: timeouts::USDA_SECS,
        }
    }
}

impl UsdaConfig {
    /// Whether remote lookups should be attempted
    pub fn is_active(&self) -> bool {
        self.enabled && self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// Nutrition resolver settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionConfig {
    /// JSON database replacing the built-in table
    pub database_path: Option<PathBuf>,

    /// Serving used for estimates and remote values
    pub default_serving_grams: f64,

    /// Minimum similarity for a fuzzy name match
    pub fuzzy_floor: f64,

    /// Bonus for sharing a key food word
    pub key_word_bonus: f64,
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            default_serving_grams: nutrition::DEFAULT_SERVING_GRAMS,
            fuzzy_floor: nutrition::FUZZY_FLOOR,
            key_word_bonus: nutrition::KEY_WORD_BONUS,
        }
    }
}

/// Verifier settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// CSV reference table replacing the built-in one
    pub reference_path: Option<PathBuf>,

    /// Relative calorie deviation still reported as supported
    pub calorie_tolerance: f64,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            reference_path: None,
            calorie_tolerance: verification::CALORIE_TOLERANCE,
        }
    }
}

impl AnalyzerConfig {
    /// Configuration that never leaves the process: remote adapters and
    /// remote nutrition lookups are disabled.
    pub fn offline() -> Self {
        let mut config = Self::default();
        config.google_vision.enabled = false;
        config.hugging_face.enabled = false;
        config.usda.enabled = false;
        config
    }

    /// Load configuration from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::config(format!("cannot read {}", path.display()), e)
        })?;
        let config: AnalyzerConfig = serde_json::from_str(&content).map_err(|e| {
            AnalysisError::config(format!("invalid config {}", path.display()), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| AnalysisError::config("cannot serialize config", e))?;
        std::fs::write(path, content).map_err(|e| {
            AnalysisError::config(format!("cannot write {}", path.display()), e)
        })?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.features.analysis_size == 0 {
            return Err(invalid("features.analysis_size", self.features.analysis_size));
        }
        if self.features.min_dimension == 0 {
            return Err(invalid("features.min_dimension", self.features.min_dimension));
        }
        let weights = &self.ensemble.weights;
        for (name, weight) in [
            ("google_vision", weights.google_vision),
            ("color_histogram", weights.color_histogram),
            ("hugging_face", weights.hugging_face),
            ("feature_matching", weights.feature_matching),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(invalid(&format!("ensemble.weights.{}", name), weight));
            }
        }
        if !(self.nutrition.default_serving_grams > 0.0) {
            return Err(invalid(
                "nutrition.default_serving_grams",
                self.nutrition.default_serving_grams,
            ));
        }
        if !(0.0..=1.0).contains(&self.nutrition.fuzzy_floor) {
            return Err(invalid("nutrition.fuzzy_floor", self.nutrition.fuzzy_floor));
        }
        if !(self.verification.calorie_tolerance >= 0.0) {
            return Err(invalid(
                "verification.calorie_tolerance",
                self.verification.calorie_tolerance,
            ));
        }
        Ok(())
    }
}

fn invalid(parameter: &str, value: impl ToString) -> AnalysisError {
    AnalysisError::InvalidParameter {
        parameter: parameter.to_string(),
        value: value.to_string(),
    }
}
