//! Tunable constants for food recognition and nutrition lookup
//!
//! Every threshold used by the pipeline lives here under a named group so the
//! configuration defaults and the unit tests refer to the same numbers.

/// Image preparation
pub mod imaging {
    /// Side length of the square working image used for feature extraction
    pub const ANALYSIS_SIZE: u32 = 224;

    /// Smallest accepted width or height of an uploaded image
    pub const MIN_DIMENSION: u32 = 50;

    /// Channel level at or above which a pixel counts as plate/background
    pub const BACKGROUND_LEVEL: u8 = 240;
}

/// Hue histogram parameters
pub mod hue {
    /// Number of histogram bins over 360 degrees
    pub const BIN_COUNT: usize = 36;

    /// Width of one bin in degrees
    pub const BIN_WIDTH: f32 = 360.0 / BIN_COUNT as f32;

    /// Pixels below this saturation carry no usable hue
    pub const SATURATION_FLOOR: f32 = 0.15;

    /// Pixels below this value (brightness) carry no usable hue
    pub const VALUE_FLOOR: f32 = 0.15;
}

/// Ensemble voting
pub mod ensemble {
    /// Weight of the Google Vision adapter
    pub const GOOGLE_VISION_WEIGHT: f32 = 0.40;

    /// Weight of the local color histogram matcher
    pub const COLOR_HISTOGRAM_WEIGHT: f32 = 0.25;

    /// Weight of the Hugging Face adapter
    pub const HUGGING_FACE_WEIGHT: f32 = 0.20;

    /// Weight of the local rule-based classifier
    pub const FEATURE_MATCHING_WEIGHT: f32 = 0.15;

    /// A vote counts toward agreement only above this confidence
    pub const STRONG_VOTE_CONFIDENCE: f32 = 0.6;

    /// Agreement rate earning the large bonus
    pub const HIGH_AGREEMENT_RATE: f32 = 0.75;
    pub const HIGH_AGREEMENT_BONUS: f32 = 0.10;

    /// Agreement rate earning the small bonus
    pub const MEDIUM_AGREEMENT_RATE: f32 = 0.50;
    pub const MEDIUM_AGREEMENT_BONUS: f32 = 0.05;

    /// Upper bound on any combined confidence
    pub const CONFIDENCE_CAP: f32 = 0.98;

    /// Below this the label is replaced by a generic category
    pub const LOW_CONFIDENCE: f32 = 0.60;

    /// Confidence reported when no method produced a detection
    pub const FALLBACK_CONFIDENCE: f32 = 0.50;
}

/// Labels with fixed meaning across the crate
pub mod labels {
    /// Label used when nothing could be recognized
    pub const UNIDENTIFIED_FOOD: &str = "unidentified food";

    /// Generic categories chosen from the dominant hue
    pub const VEGETABLE_DISH: &str = "vegetable dish";
    pub const MEAT_DISH: &str = "meat dish";
    pub const GRAIN_DISH: &str = "grain dish";
    pub const MIXED_DISH: &str = "mixed dish";
}

/// Nutrition resolution
pub mod nutrition {
    /// Serving size assumed when neither request nor database gives one
    pub const DEFAULT_SERVING_GRAMS: f64 = 150.0;

    /// Serving size the keyword estimates are expressed for
    pub const ESTIMATE_BASELINE_GRAMS: f64 = 150.0;

    /// Serving size remote per-100 g values are expressed for
    pub const REMOTE_BASIS_GRAMS: f64 = 100.0;

    /// Minimum fuzzy similarity accepted as a match
    pub const FUZZY_FLOOR: f64 = 0.5;

    /// Similarity bonus when the shared tokens include a key food word
    pub const KEY_WORD_BONUS: f64 = 0.2;

    /// Energy per gram of macronutrient (kcal)
    pub const KCAL_PER_GRAM_PROTEIN: f64 = 4.0;
    pub const KCAL_PER_GRAM_CARBS: f64 = 4.0;
    pub const KCAL_PER_GRAM_FAT: f64 = 9.0;
}

/// Claim verification
pub mod verification {
    /// Relative calorie deviation still considered supported
    pub const CALORIE_TOLERANCE: f64 = 0.15;

    pub const SUPPORTED_CONFIDENCE: f64 = 0.85;
    pub const DEVIATING_CONFIDENCE: f64 = 0.45;
    pub const UNKNOWN_FOOD_CONFIDENCE: f64 = 0.30;
}

/// Remote adapter call limits, in seconds. Calls are never retried.
pub mod timeouts {
    pub const GOOGLE_VISION_SECS: u64 = 15;
    pub const HUGGING_FACE_SECS: u64 = 8;
    pub const USDA_SECS: u64 = 10;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensemble_weights_sum_to_one() {
        let total = ensemble::GOOGLE_VISION_WEIGHT
            + ensemble::COLOR_HISTOGRAM_WEIGHT
            + ensemble::HUGGING_FACE_WEIGHT
            + ensemble::FEATURE_MATCHING_WEIGHT;
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_ensemble_thresholds_ordering() {
        assert!(ensemble::HIGH_AGREEMENT_RATE > ensemble::MEDIUM_AGREEMENT_RATE);
        assert!(ensemble::HIGH_AGREEMENT_BONUS > ensemble::MEDIUM_AGREEMENT_BONUS);
        assert!(ensemble::CONFIDENCE_CAP < 1.0);
        assert!(ensemble::FALLBACK_CONFIDENCE < ensemble::LOW_CONFIDENCE);
    }

    #[test]
    fn test_image_limits() {
        assert!(imaging::MIN_DIMENSION < imaging::ANALYSIS_SIZE);
        assert_eq!(hue::BIN_WIDTH, 10.0);
    }

    #[test]
    fn test_verification_confidences_ordering() {
        assert!(verification::SUPPORTED_CONFIDENCE > verification::DEVIATING_CONFIDENCE);
        assert!(verification::DEVIATING_CONFIDENCE > verification::UNKNOWN_FOOD_CONFIDENCE);
    }
}
