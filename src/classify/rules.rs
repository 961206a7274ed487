//! Ordered rule-based classifier
//!
//! Rules are tried top to bottom and the first match wins, so the order of
//! [`RULES`] is part of the behavior: pizza is checked before salad because a
//! pizza with basil would otherwise read as greens. When no rule matches, the
//! single largest color band picks a generic answer.

use crate::color::ColorBand;
use crate::constants::labels;
use crate::detection::{Detection, DetectionInput, DetectionMethod, FoodDetector};
use crate::features::ImageFeatures;
use tracing::debug;

/// One classification rule
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    /// Rule identifier reported in detection details
    pub name: &'static str,
    pub label: &'static str,
    pub confidence: f32,
    matches: fn(&ImageFeatures) -> bool,
}

impl Rule {
    /// Check the rule against a feature set
    pub fn matches(&self, features: &ImageFeatures) -> bool {
        (self.matches)(features)
    }
}

fn is_pizza(f: &ImageFeatures) -> bool {
    let c = &f.color_ratios;
    c.red > 0.08 && c.white > 0.08 && c.brown > 0.03 && f.texture_complexity > 150.0
}

fn is_salad(f: &ImageFeatures) -> bool {
    f.color_ratios.green > 0.25
}

fn is_burger(f: &ImageFeatures) -> bool {
    let c = &f.color_ratios;
    // layered items are wider than tall (or the reverse), never square
    c.brown > 0.20 && c.green > 0.05 && (f.aspect_ratio - 1.0).abs() > 0.05
}

fn is_rice(f: &ImageFeatures) -> bool {
    f.color_ratios.white > 0.50 && f.texture_complexity < 100.0
}

fn is_pasta(f: &ImageFeatures) -> bool {
    let c = &f.color_ratios;
    (c.yellow > 0.20 || c.red > 0.15) && c.white > 0.20
}

fn is_fries(f: &ImageFeatures) -> bool {
    let c = &f.color_ratios;
    c.yellow > 0.30 && c.brown > 0.05
}

fn is_grilled_chicken(f: &ImageFeatures) -> bool {
    f.color_ratios.brown > 0.25 && f.texture_complexity > 150.0
}

fn is_steak(f: &ImageFeatures) -> bool {
    f.color_ratios.brown > 0.30 && f.color_ratios.black > 0.10
}

fn is_fruit_bowl(f: &ImageFeatures) -> bool {
    let c = &f.color_ratios;
    c.red > 0.10 && (c.green > 0.05 || c.yellow > 0.05)
}

/// Classification rules in evaluation order
pub const RULES: &[Rule] = &[
    Rule {
        name: "pizza",
        label: "pizza",
        confidence: 0.88,
        matches: is_pizza,
    },
    Rule {
        name: "salad",
        label: "mixed salad",
        confidence: 0.85,
        matches: is_salad,
    },
    Rule {
        name: "burger",
        label: "burger",
        confidence: 0.86,
        matches: is_burger,
    },
    Rule {
        name: "rice",
        label: "white rice",
        confidence: 0.82,
        matches: is_rice,
    },
    Rule {
        name: "pasta",
        label: "pasta with sauce",
        confidence: 0.80,
        matches: is_pasta,
    },
    Rule {
        name: "french_fries",
        label: "french fries",
        confidence: 0.79,
        matches: is_fries,
    },
    Rule {
        name: "grilled_chicken",
        label: "grilled chicken breast",
        confidence: 0.78,
        matches: is_grilled_chicken,
    },
    Rule {
        name: "steak",
        label: "steak",
        confidence: 0.76,
        matches: is_steak,
    },
    Rule {
        name: "fruit_bowl",
        label: "fruit bowl",
        confidence: 0.75,
        matches: is_fruit_bowl,
    },
];

/// Answer when no rule matched, keyed by the largest color band
fn default_for(band: ColorBand, ratio: f32) -> (&'static str, f32) {
    if ratio <= 0.0 {
        return (labels::MIXED_DISH, 0.60);
    }
    match band {
        ColorBand::Green => ("vegetables", 0.70),
        ColorBand::Brown => ("grilled meat", 0.72),
        ColorBand::White => ("rice", 0.68),
        ColorBand::Red => ("tomato-based dish", 0.65),
        ColorBand::Yellow => ("grain dish", 0.65),
        ColorBand::Black => (labels::MIXED_DISH, 0.60),
    }
}

/// Rule-based food classifier
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    rules: &'static [Rule],
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleClassifier {
    /// Create a classifier with the built-in rule list
    pub fn new() -> Self {
        Self { rules: RULES }
    }

    /// Create a classifier with a custom rule list
    pub fn with_rules(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// Classify a feature set.
    ///
    /// Deterministic: the same features always give the same label and
    /// confidence.
    pub fn classify(&self, features: &ImageFeatures) -> Detection {
        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(features)) {
            debug!(rule = rule.name, "classification rule matched");
            return Detection::new(rule.label, rule.confidence, DetectionMethod::FeatureMatching)
                .with_detail("rule", rule.name);
        }

        let (band, ratio) = features.color_ratios.largest();
        let (label, confidence) = default_for(band, ratio);
        debug!(band = %band, ratio, "no rule matched, using largest band");
        Detection::new(label, confidence, DetectionMethod::FeatureMatching)
            .with_detail("rule", "default")
            .with_detail("largest_band", band.name())
    }
}

impl FoodDetector for RuleClassifier {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::FeatureMatching
    }

    fn detect(&self, input: &DetectionInput<'_>) -> Option<Detection> {
        Some(self.classify(input.features))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{ColorRatios, FeatureExtractor};
    use image::{DynamicImage, ImageBuffer, Rgb};

    fn features_with(ratios: ColorRatios, texture: f32, aspect: f32) -> ImageFeatures {
        let base = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(8, 8, Rgb([128u8, 128, 128])));
        let mut features = FeatureExtractor::with_params(8, 240).extract(&base);
        features.color_ratios = ratios;
        features.texture_complexity = texture;
        features.aspect_ratio = aspect;
        features
    }

    #[test]
    fn test_solid_green_is_salad() {
        let image = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(224, 224, Rgb([0u8, 255, 0])));
        let features = FeatureExtractor::new().extract(&image);
        let detection = RuleClassifier::new().classify(&features);
        assert_eq!(detection.food_label, "mixed salad");
        assert!(detection.confidence >= 0.85);
        assert_eq!(detection.source_method, DetectionMethod::FeatureMatching);
    }

    #[test]
    fn test_pizza_checked_before_salad() {
        let ratios = ColorRatios {
            red: 0.2,
            green: 0.3,
            brown: 0.1,
            white: 0.2,
            ..ColorRatios::default()
        };
        let detection = RuleClassifier::new().classify(&features_with(ratios, 180.0, 1.0));
        assert_eq!(detection.food_label, "pizza");
        assert_eq!(detection.details["rule"], "pizza");

        // same colors on a smooth surface is no longer pizza
        let detection = RuleClassifier::new().classify(&features_with(ratios, 20.0, 1.0));
        assert_eq!(detection.food_label, "mixed salad");
    }

    #[test]
    fn test_burger_needs_non_square_shape() {
        let ratios = ColorRatios {
            brown: 0.4,
            green: 0.1,
            ..ColorRatios::default()
        };
        let detection = RuleClassifier::new().classify(&features_with(ratios, 50.0, 1.6));
        assert_eq!(detection.food_label, "burger");

        let detection = RuleClassifier::new().classify(&features_with(ratios, 50.0, 1.0));
        assert_ne!(detection.food_label, "burger");
    }

    #[test]
    fn test_rice_and_chicken() {
        let rice = ColorRatios {
            white: 0.7,
            ..ColorRatios::default()
        };
        assert_eq!(
            RuleClassifier::new().classify(&features_with(rice, 30.0, 1.0)).food_label,
            "white rice"
        );

        let chicken = ColorRatios {
            brown: 0.35,
            ..ColorRatios::default()
        };
        let detection = RuleClassifier::new().classify(&features_with(chicken, 200.0, 1.0));
        assert_eq!(detection.food_label, "grilled chicken breast");
        assert!((detection.confidence - 0.78).abs() < 1e-6);
    }

    #[test]
    fn test_default_uses_largest_band() {
        let ratios = ColorRatios {
            brown: 0.2,
            red: 0.05,
            ..ColorRatios::default()
        };
        let detection = RuleClassifier::new().classify(&features_with(ratios, 10.0, 1.0));
        assert_eq!(detection.food_label, "grilled meat");
        assert_eq!(detection.details["largest_band"], "brown");

        let detection =
            RuleClassifier::new().classify(&features_with(ColorRatios::default(), 0.0, 1.0));
        assert_eq!(detection.food_label, "mixed dish");
        assert!((detection.confidence - 0.60).abs() < 1e-6);
    }

    #[test]
    fn test_rule_evaluation_order() {
        let names: Vec<&str> = RULES.iter().map(|rule| rule.name).collect();
        assert_eq!(
            names,
            [
                "pizza",
                "salad",
                "burger",
                "rice",
                "pasta",
                "french_fries",
                "grilled_chicken",
                "steak",
                "fruit_bowl",
            ]
        );
    }

    #[test]
    fn test_confidences_are_probabilities() {
        for rule in RULES {
            assert!((0.0..=1.0).contains(&rule.confidence), "{}", rule.name);
        }
    }

    #[test]
    fn test_custom_rule_list() {
        static ONLY_RICE: &[Rule] = &[Rule {
            name: "rice",
            label: "rice",
            confidence: 0.5,
            matches: is_rice,
        }];
        let classifier = RuleClassifier::with_rules(ONLY_RICE);
        let ratios = ColorRatios {
            green: 0.9,
            ..ColorRatios::default()
        };
        assert_eq!(
            classifier.classify(&features_with(ratios, 0.0, 1.0)).food_label,
            "vegetables"
        );
    }
}
