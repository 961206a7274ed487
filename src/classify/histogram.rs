//! Hue-signature matcher
//!
//! Compares the photo's hue histogram, mean saturation and mean value against
//! a table of per-dish color signatures. Scores are kept in integer points
//! (tenths) so ties between signatures resolve by table order rather than by
//! floating-point noise.

use crate::color::HueHistogram;
use crate::detection::{Detection, DetectionInput, DetectionMethod, FoodDetector};
use crate::features::ImageFeatures;
use tracing::debug;

/// Points for a hue range hit by one of the top bins
const HUE_POINTS: u32 = 3;
/// Points for mean saturation or mean value within range
const RANGE_POINTS: u32 = 2;
/// Number of most populated hue bins compared against signatures
const TOP_BINS: usize = 3;
/// Confidence floor added to the normalized score, and the overall ceiling
const BASE_CONFIDENCE: f32 = 0.5;
const CONFIDENCE_CEILING: f32 = 0.95;

/// Color signature of one dish
#[derive(Debug, Clone, Copy)]
pub struct ColorSignature {
    pub label: &'static str,
    /// Inclusive hue ranges in degrees
    pub hue_ranges: &'static [(f32, f32)],
    pub saturation: (f32, f32),
    pub value: (f32, f32),
}

/// Built-in signatures, in tie-break order
pub const SIGNATURES: &[ColorSignature] = &[
    ColorSignature {
        label: "pizza",
        hue_ranges: &[(0.0, 10.0), (40.0, 60.0)],
        saturation: (0.3, 0.8),
        value: (0.3, 0.7),
    },
    ColorSignature {
        label: "salad",
        hue_ranges: &[(80.0, 140.0)],
        saturation: (0.3, 0.8),
        value: (0.3, 0.6),
    },
    ColorSignature {
        label: "burger",
        hue_ranges: &[(20.0, 40.0)],
        saturation: (0.2, 0.6),
        value: (0.2, 0.5),
    },
    ColorSignature {
        label: "sushi",
        hue_ranges: &[(0.0, 20.0), (160.0, 200.0)],
        saturation: (0.2, 0.7),
        value: (0.4, 0.8),
    },
    ColorSignature {
        label: "rice",
        hue_ranges: &[(40.0, 60.0)],
        saturation: (0.0, 0.2),
        value: (0.7, 0.95),
    },
    ColorSignature {
        label: "curry",
        hue_ranges: &[(20.0, 40.0)],
        saturation: (0.5, 0.9),
        value: (0.4, 0.7),
    },
    ColorSignature {
        label: "steak",
        hue_ranges: &[(0.0, 20.0), (340.0, 360.0)],
        saturation: (0.3, 0.7),
        value: (0.2, 0.5),
    },
    ColorSignature {
        label: "pasta",
        hue_ranges: &[(40.0, 60.0)],
        saturation: (0.2, 0.6),
        value: (0.5, 0.8),
    },
    ColorSignature {
        label: "fruit",
        hue_ranges: &[(0.0, 60.0), (280.0, 340.0)],
        saturation: (0.5, 0.9),
        value: (0.4, 0.8),
    },
    ColorSignature {
        label: "eggs",
        hue_ranges: &[(40.0, 60.0)],
        saturation: (0.4, 0.8),
        value: (0.7, 0.95),
    },
];

fn within(range: (f32, f32), x: f32) -> bool {
    range.0 <= x && x <= range.1
}

impl ColorSignature {
    /// Points earned against a feature set and the normalizing denominator
    fn score(&self, top_hues: &[f32], features: &ImageFeatures) -> (u32, u32) {
        let mut points = 0;
        for &range in self.hue_ranges {
            if top_hues.iter().any(|&h| within(range, h)) {
                points += HUE_POINTS;
            }
        }
        if within(self.saturation, features.mean_saturation) {
            points += RANGE_POINTS;
        }
        if within(self.value, features.mean_value) {
            points += RANGE_POINTS;
        }
        (points, self.hue_ranges.len() as u32 + 2)
    }
}

/// Color histogram food classifier
#[derive(Debug, Clone)]
pub struct HistogramClassifier {
    signatures: &'static [ColorSignature],
}

impl Default for HistogramClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl HistogramClassifier {
    /// Create a classifier with the built-in signatures
    pub fn new() -> Self {
        Self {
            signatures: SIGNATURES,
        }
    }

    /// Create a classifier with custom signatures
    pub fn with_signatures(signatures: &'static [ColorSignature]) -> Self {
        Self { signatures }
    }

    /// Classify a feature set by color signature
    pub fn classify(&self, features: &ImageFeatures) -> Detection {
        // Step 1: Lower edges of the most populated hue bins
        let top_hues: Vec<f32> = features
            .hue_histogram
            .top_bins(TOP_BINS)
            .into_iter()
            .map(HueHistogram::bin_start)
            .collect();

        // Step 2: Best signature; a later one must score strictly higher
        let mut best: Option<(&ColorSignature, u32, u32)> = None;
        for signature in self.signatures {
            let (points, denom) = signature.score(&top_hues, features);
            if points == 0 {
                continue;
            }
            let better = match best {
                None => true,
                Some((_, best_points, best_denom)) => points * best_denom > best_points * denom,
            };
            if better {
                best = Some((signature, points, denom));
            }
        }

        if let Some((signature, points, denom)) = best {
            let score = points as f32 / (10.0 * denom as f32);
            debug!(signature = signature.label, score, "color signature matched");
            return Detection::new(
                signature.label,
                (BASE_CONFIDENCE + score).min(CONFIDENCE_CEILING),
                DetectionMethod::ColorHistogram,
            )
            .with_detail("signature", signature.label)
            .with_detail("score", score);
        }

        // Step 3: No signature matched, fall back to single-color patterns
        let (label, confidence) = cluster_fallback(features);
        Detection::new(label, confidence, DetectionMethod::ColorHistogram)
            .with_detail("signature", "none")
    }
}

fn cluster_fallback(features: &ImageFeatures) -> (&'static str, f32) {
    let saturation = features.mean_saturation;
    let value = features.mean_value;

    if saturation < 0.2 && value > 0.7 {
        return ("rice", 0.75);
    }
    match features.dominant_hue {
        Some(hue) if (20.0..=40.0).contains(&hue) && saturation > 0.4 => ("curry", 0.72),
        Some(hue) if (80.0..=140.0).contains(&hue) && saturation > 0.3 => ("vegetables", 0.70),
        Some(hue) if !(20.0..=340.0).contains(&hue) => {
            if value < 0.4 {
                ("steak", 0.68)
            } else {
                ("tomato dish", 0.66)
            }
        }
        _ => ("cooked dish", 0.60),
    }
}

impl FoodDetector for HistogramClassifier {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::ColorHistogram
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Option<Detection> {
        Some(self.classify(input.features))
    }
}
