//! End-to-end food analysis
//!
//! [`FoodAnalyzer`] owns every long-lived piece of the pipeline (detectors,
//! ensemble, nutrition sources, reference table) and is built once at
//! startup. Each request then runs sequentially:
//!
//! photo → features → per-method detections → ensemble → nutrition →
//! dietary notes → recipes
//!
//! Verification is a separate call on an already produced profile.

use crate::classify::{HistogramClassifier, RuleClassifier};
use crate::config::AnalyzerConfig;
use crate::constants::imaging;
use crate::detection::{
    Detection, DetectionInput, DetectionMethod, FoodDetector, GoogleVisionDetector,
    HuggingFaceDetector,
};
use crate::ensemble::{Consensus, EnsembleCombiner, EnsembleResult, MethodVotes};
use crate::error::Result;
use crate::features::{FeatureExtractor, ImageFeatures};
use crate::image_loader::{decode_base64, FoodImage};
use crate::nutrition::{
    apply_dietary_notes, DietaryNote, NutritionProfile, NutritionResolver, NutritionSourceKind,
};
use crate::recipes::{RecipeCard, RecipeGenerator};
use crate::verify::{VerificationReport, Verifier};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Per-request options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisOptions {
    /// Free-text notes; dietary preferences are read from them
    pub notes: Option<String>,
    /// Serving size override in grams
    pub serving_grams: Option<f64>,
}

/// Features and ensemble outcome for one photo
#[derive(Debug, Clone, Serialize)]
pub struct Recognition {
    pub features: ImageFeatures,
    pub ensemble: EnsembleResult,
}

/// Recognition details reported alongside a recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionSummary {
    pub label: String,
    pub confidence: f32,
    pub primary_method: Option<DetectionMethod>,
    pub consensus: Consensus,
    pub low_confidence: bool,
    pub predictions: Vec<Detection>,
    pub nutrition_source: NutritionSourceKind,
    #[serde(default)]
    pub dietary_notes: Vec<DietaryNote>,
}

/// Full analysis answer: nutrition profile plus recipe suggestions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub profile: NutritionProfile,
    pub recipes: Vec<RecipeCard>,
    pub recognition: RecognitionSummary,
}

/// The analysis pipeline and its process-wide state
pub struct FoodAnalyzer {
    config: AnalyzerConfig,
    extractor: FeatureExtractor,
    detectors: Vec<Box<dyn FoodDetector>>,
    combiner: EnsembleCombiner,
    resolver: NutritionResolver,
    recipes: RecipeGenerator,
    verifier: Verifier,
}

impl std::fmt::Debug for FoodAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FoodAnalyzer")
            .field("detectors", &self.detector_methods())
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

impl FoodAnalyzer {
    /// Build the analyzer with the detectors the configuration enables
    ///
    /// The two local classifiers are always present. Google Vision is added
    /// when enabled with an API key, Hugging Face when enabled with at least
    /// one model.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for an invalid configuration, `DataLoadError` for
    /// unreadable reference data, `ConfigError` when an HTTP client cannot
    /// be built.
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        let detectors = default_detectors(&config)?;
        Self::with_detectors(config, detectors)
    }

    /// Build the analyzer around a caller-chosen set of detectors
    ///
    /// Detectors vote in the given order; when two share a method, the
    /// later one's answer is kept.
    pub fn with_detectors(
        config: AnalyzerConfig,
        detectors: Vec<Box<dyn FoodDetector>>,
    ) -> Result<Self> {
        config.validate()?;
        let extractor =
            FeatureExtractor::with_params(config.features.analysis_size, imaging::BACKGROUND_LEVEL);
        let combiner = EnsembleCombiner::new(config.ensemble.clone());
        let resolver = NutritionResolver::from_config(&config)?;
        let verifier = Verifier::from_config(&config.verification)?;

        let analyzer = Self {
            config,
            extractor,
            detectors,
            combiner,
            resolver,
            recipes: RecipeGenerator::new(),
            verifier,
        };
        info!(detectors = ?analyzer.detector_methods(), "food analyzer ready");
        Ok(analyzer)
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Methods of the installed detectors, in voting order
    pub fn detector_methods(&self) -> Vec<DetectionMethod> {
        self.detectors.iter().map(|d| d.method()).collect()
    }

    /// Recognize the food in a photo
    ///
    /// # Errors
    ///
    /// `ImageTooSmall` when either side is below the configured minimum.
    pub fn recognize(&self, image: &FoodImage) -> Result<Recognition> {
        image.validate_dimensions(self.config.features.min_dimension)?;

        let features = self.extractor.extract(image.image());
        let input = DetectionInput {
            image,
            features: &features,
        };

        let mut votes = MethodVotes::new();
        for detector in &self.detectors {
            let detection = detector.detect(&input);
            debug!(
                method = %detector.method(),
                food = detection.as_ref().map(|d| d.food_label.as_str()),
                confidence = detection.as_ref().map(|d| d.confidence),
                "method vote"
            );
            votes.record(detector.method(), detection);
        }

        let ensemble = self.combiner.combine(&votes, features.dominant_hue);
        Ok(Recognition { features, ensemble })
    }

    /// Recognize a photo and build its nutrition profile and recipes
    ///
    /// # Errors
    ///
    /// `ImageTooSmall` for undersized photos, `InvalidParameter` for a
    /// non-positive serving override.
    pub fn analyze(&self, image: &FoodImage, options: &AnalysisOptions) -> Result<Recommendation> {
        let notes = DietaryNote::parse_notes(options.notes.as_deref().unwrap_or_default());
        let recognition = self.recognize(image)?;
        let ensemble = recognition.ensemble;

        let resolved = self.resolver.resolve(&ensemble.label, options.serving_grams)?;
        let mut profile = resolved.profile;
        apply_dietary_notes(&mut profile, &notes);

        let recipes = self.recipes.generate(&ensemble.label, &notes);

        info!(
            food = %ensemble.label,
            confidence = ensemble.confidence,
            calories = profile.calories,
            source = ?resolved.source,
            "analysis complete"
        );

        Ok(Recommendation {
            profile,
            recipes,
            recognition: RecognitionSummary {
                label: ensemble.label,
                confidence: ensemble.confidence,
                primary_method: ensemble.primary_method,
                consensus: ensemble.consensus,
                low_confidence: ensemble.low_confidence,
                predictions: ensemble.predictions,
                nutrition_source: resolved.source,
                dietary_notes: notes,
            },
        })
    }

    /// Decode a base64 photo and analyze it
    ///
    /// # Errors
    ///
    /// `ImageDecodeError` for undecodable payloads, plus everything
    /// [`FoodAnalyzer::analyze`] returns.
    pub fn analyze_base64(
        &self,
        payload: &str,
        options: &AnalysisOptions,
    ) -> Result<Recommendation> {
        let image = decode_base64(payload)?;
        self.analyze(&image, options)
    }

    /// Check a profile's calories against the reference table
    pub fn verify(&self, profile: &NutritionProfile) -> VerificationReport {
        self.verifier.verify(profile)
    }
}

fn default_detectors(config: &AnalyzerConfig) -> Result<Vec<Box<dyn FoodDetector>>> {
    let mut detectors: Vec<Box<dyn FoodDetector>> = Vec::new();

    if config.google_vision.is_active() {
        detectors.push(Box::new(GoogleVisionDetector::new(&config.google_vision)?));
    } else {
        debug!("google vision adapter disabled");
    }

    detectors.push(Box::new(HistogramClassifier::new()));

    if config.hugging_face.enabled && !config.hugging_face.models.is_empty() {
        detectors.push(Box::new(HuggingFaceDetector::new(&config.hugging_face)?));
    } else {
        debug!("hugging face adapter disabled");
    }

    detectors.push(Box::new(RuleClassifier::new()));
    Ok(detectors)
}
