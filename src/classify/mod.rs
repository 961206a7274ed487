//! Local food classification
//!
//! Two deterministic classifiers read the same [`ImageFeatures`]: an ordered
//! rule list over color ratios and texture, and a hue-signature matcher over
//! the HSV histogram. Both always produce an answer. Label normalization,
//! shared with the ensemble, also lives here.
//!
//! [`ImageFeatures`]: crate::features::ImageFeatures

pub mod histogram;
pub mod normalize;
pub mod rules;

pub use histogram::HistogramClassifier;
pub use normalize::normalize_label;
pub use rules::RuleClassifier;

use crate::detection::Detection;
use crate::features::FeatureExtractor;
use crate::image_loader::FoodImage;

/// Classify a photo with the rule-based classifier alone.
///
/// Always returns exactly one label with a confidence in 0..=1, and the same
/// photo always yields the same answer.
pub fn classify_image(image: &FoodImage, extractor: &FeatureExtractor) -> Detection {
    let features = extractor.extract(image.image());
    RuleClassifier::new().classify(&features)
}
