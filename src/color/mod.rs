//! Color classification primitives
//!
//! Pixel-level color bands used by the food feature extractor, the mean-color
//! summary, and the HSV hue histogram behind the color-signature matcher and
//! the generic fallback categories.

pub mod bands;
pub mod hue;

pub use bands::{ColorBand, DominantColor};
pub use hue::{generic_category, rgb_to_hsv, HueHistogram};
