//! HSV hue statistics
//!
//! Converts 8-bit sRGB pixels to HSV with `palette` and accumulates a
//! ten-degree hue histogram over the chromatic pixels only. Grey, white and
//! near-black pixels have no meaningful hue and are left out.

use crate::constants::{hue, labels};
use palette::{FromColor, Hsv, Srgb};
use serde::{Deserialize, Serialize};

/// Convert an 8-bit RGB pixel to (hue degrees 0..360, saturation 0..1, value 0..1)
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> (f32, f32, f32) {
    let srgb = Srgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
    );
    let hsv: Hsv = Hsv::from_color(srgb);
    (hsv.hue.into_positive_degrees(), hsv.saturation, hsv.value)
}

/// Normalized hue histogram over chromatic pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HueHistogram {
    /// Fraction of chromatic pixels per bin; sums to 1 unless empty
    bins: Vec<f32>,
    /// Fraction of all pixels that were chromatic
    chromatic_fraction: f32,
}

impl Default for HueHistogram {
    fn default() -> Self {
        Self {
            bins: vec![0.0; hue::BIN_COUNT],
            chromatic_fraction: 0.0,
        }
    }
}

impl HueHistogram {
    /// Build a histogram from (hue, saturation, value) samples
    pub fn from_hsv<I>(samples: I) -> Self
    where
        I: IntoIterator<Item = (f32, f32, f32)>,
    {
        let mut counts = vec![0u32; hue::BIN_COUNT];
        let mut total = 0u32;
        let mut chromatic = 0u32;

        for (h, s, v) in samples {
            total += 1;
            if s < hue::SATURATION_FLOOR || v < hue::VALUE_FLOOR {
                continue;
            }
            chromatic += 1;
            counts[Self::bin_of(h)] += 1;
        }

        if chromatic == 0 {
            return Self::default();
        }

        Self {
            bins: counts
                .iter()
                .map(|&c| c as f32 / chromatic as f32)
                .collect(),
            chromatic_fraction: chromatic as f32 / total as f32,
        }
    }

    /// Bin index for a hue in degrees
    pub fn bin_of(hue_degrees: f32) -> usize {
        let wrapped = hue_degrees.rem_euclid(360.0);
        ((wrapped / hue::BIN_WIDTH) as usize).min(hue::BIN_COUNT - 1)
    }

    /// Lower edge of a bin in degrees
    pub fn bin_start(bin: usize) -> f32 {
        bin as f32 * hue::BIN_WIDTH
    }

    pub fn bins(&self) -> &[f32] {
        &self.bins
    }

    pub fn chromatic_fraction(&self) -> f32 {
        self.chromatic_fraction
    }

    /// True when no pixel carried a usable hue
    pub fn is_empty(&self) -> bool {
        self.chromatic_fraction == 0.0
    }

    /// Up to `n` non-empty bins, most populated first (lower bin wins ties)
    pub fn top_bins(&self, n: usize) -> Vec<usize> {
        let mut indexed: Vec<(usize, f32)> = self
            .bins
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, mass)| mass > 0.0)
            .collect();
        indexed.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        indexed.into_iter().take(n).map(|(bin, _)| bin).collect()
    }

    /// Center of the most populated bin, in degrees
    pub fn dominant_hue(&self) -> Option<f32> {
        self.top_bins(1)
            .first()
            .map(|&bin| Self::bin_start(bin) + hue::BIN_WIDTH / 2.0)
    }
}

/// Generic dish category for a dominant hue
///
/// Used when the ensemble is not confident enough to name a specific food.
pub fn generic_category(dominant_hue: Option<f32>) -> &'static str {
    match dominant_hue {
        Some(h) if (80.0..=140.0).contains(&h) => labels::VEGETABLE_DISH,
        Some(h) if h <= 20.0 || h >= 340.0 => labels::MEAT_DISH,
        Some(h) if (40.0..=60.0).contains(&h) => labels::GRAIN_DISH,
        _ => labels::MIXED_DISH,
    }
}
