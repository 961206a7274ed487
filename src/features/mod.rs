//! Visual feature extraction
//!
//! Turns a decoded photo into the fixed feature set every local classifier
//! reads: per-band color ratios, brightness, texture, hue statistics and a
//! coarse shape estimate.

pub mod extractor;

pub use extractor::{ColorRatios, FeatureExtractor, ImageFeatures};
