//! Food feature extractor
//!
//! Works on a square RGB copy of the photo resampled to the analysis size,
//! so ratios and texture values are comparable across input resolutions.
//! Extraction is a pure function of the pixels: the same image always yields
//! the same features.

use crate::color::{rgb_to_hsv, ColorBand, DominantColor, HueHistogram};
use crate::constants::imaging;
use image::imageops::FilterType;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Fraction of pixels in each color band (each in 0..=1, bands overlap)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColorRatios {
    pub red: f32,
    pub green: f32,
    pub brown: f32,
    pub yellow: f32,
    pub white: f32,
    pub black: f32,
}

impl ColorRatios {
    /// Ratio for a single band
    pub fn get(&self, band: ColorBand) -> f32 {
        match band {
            ColorBand::Red => self.red,
            ColorBand::Green => self.green,
            ColorBand::Brown => self.brown,
            ColorBand::Yellow => self.yellow,
            ColorBand::White => self.white,
            ColorBand::Black => self.black,
        }
    }

    fn set(&mut self, band: ColorBand, value: f32) {
        match band {
            ColorBand::Red => self.red = value,
            ColorBand::Green => self.green = value,
            ColorBand::Brown => self.brown = value,
            ColorBand::Yellow => self.yellow = value,
            ColorBand::White => self.white = value,
            ColorBand::Black => self.black = value,
        }
    }

    /// Bands with their ratios in fixed order
    pub fn iter(&self) -> impl Iterator<Item = (ColorBand, f32)> + '_ {
        ColorBand::ALL.iter().map(move |&band| (band, self.get(band)))
    }

    /// Band with the largest ratio; the earlier band wins ties
    pub fn largest(&self) -> (ColorBand, f32) {
        self.iter()
            .fold((ColorBand::Red, f32::MIN), |best, current| {
                if current.1 > best.1 {
                    current
                } else {
                    best
                }
            })
    }

    /// Color-name to ratio mapping
    pub fn to_map(&self) -> BTreeMap<String, f32> {
        self.iter()
            .map(|(band, ratio)| (band.name().to_string(), ratio))
            .collect()
    }
}

/// Features of one photo, computed once per request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageFeatures {
    /// Per-band pixel fractions
    pub color_ratios: ColorRatios,
    /// Mean gray level, 0..=255
    pub brightness: f32,
    /// Mean absolute gray gradient (vertical + horizontal) per pixel
    pub texture_complexity: f32,
    /// Variance of the gray level
    pub gray_variance: f32,
    /// Mean RGB of the working image
    pub mean_rgb: [f32; 3],
    pub mean_saturation: f32,
    pub mean_value: f32,
    /// Coarse name of the mean color
    pub dominant_color: DominantColor,
    /// Center of the most populated hue bin, if any pixel had a hue
    pub dominant_hue: Option<f32>,
    pub hue_histogram: HueHistogram,
    /// Width / height of the non-background region
    pub aspect_ratio: f32,
    /// min(width, height) / max(width, height) of the non-background region
    pub roundness: f32,
}

/// Extracts [`ImageFeatures`] from decoded photos
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    analysis_size: u32,
    background_level: u8,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureExtractor {
    /// Create an extractor with the default working size
    pub fn new() -> Self {
        Self {
            analysis_size: imaging::ANALYSIS_SIZE,
            background_level: imaging::BACKGROUND_LEVEL,
        }
    }

    /// Create an extractor with custom parameters
    pub fn with_params(analysis_size: u32, background_level: u8) -> Self {
        Self {
            analysis_size: analysis_size.max(1),
            background_level,
        }
    }

    pub fn analysis_size(&self) -> u32 {
        self.analysis_size
    }

    /// Compute all features of a photo
    ///
    /// # Arguments
    ///
    /// * `image` - Decoded photo of any size
    ///
    /// # Returns
    ///
    /// Features of the photo resampled to `analysis_size` squared
    pub fn extract(&self, image: &DynamicImage) -> ImageFeatures {
        // Step 1: Resample to the working size
        let size = self.analysis_size;
        let rgb = image.resize_exact(size, size, FilterType::Lanczos3).to_rgb8();
        let (width, height) = rgb.dimensions();
        let total = (width * height) as f32;

        // Step 2: Per-pixel statistics
        let mut band_counts = [0u32; 6];
        let mut gray = Vec::with_capacity((width * height) as usize);
        let mut rgb_sum = [0f64; 3];
        let mut sat_sum = 0f64;
        let mut val_sum = 0f64;
        let mut hsv_samples = Vec::with_capacity((width * height) as usize);
        let mut occupied_rows = vec![false; height as usize];
        let mut occupied_cols = vec![false; width as usize];

        for (x, y, pixel) in rgb.enumerate_pixels() {
            let [r, g, b] = pixel.0;

            for (count, band) in band_counts.iter_mut().zip(ColorBand::ALL) {
                if band.contains(r, g, b) {
                    *count += 1;
                }
            }

            gray.push((f32::from(r) + f32::from(g) + f32::from(b)) / 3.0);
            rgb_sum[0] += f64::from(r);
            rgb_sum[1] += f64::from(g);
            rgb_sum[2] += f64::from(b);

            let hsv = rgb_to_hsv(r, g, b);
            sat_sum += f64::from(hsv.1);
            val_sum += f64::from(hsv.2);
            hsv_samples.push(hsv);

            if r.min(g).min(b) < self.background_level {
                occupied_rows[y as usize] = true;
                occupied_cols[x as usize] = true;
            }
        }

        let mut color_ratios = ColorRatios::default();
        for (count, band) in band_counts.iter().zip(ColorBand::ALL) {
            color_ratios.set(band, *count as f32 / total);
        }

        // Step 3: Gray level statistics
        let brightness = gray.iter().sum::<f32>() / total;
        let gray_variance = gray
            .iter()
            .map(|v| (v - brightness).powi(2))
            .sum::<f32>()
            / total;
        let texture_complexity = texture_complexity(&gray, width as usize, height as usize);

        // Step 4: Color summaries
        let mean_rgb = [
            (rgb_sum[0] / f64::from(total)) as f32,
            (rgb_sum[1] / f64::from(total)) as f32,
            (rgb_sum[2] / f64::from(total)) as f32,
        ];
        let dominant_color = DominantColor::from_mean(mean_rgb[0], mean_rgb[1], mean_rgb[2]);
        let hue_histogram = HueHistogram::from_hsv(hsv_samples);
        let dominant_hue = hue_histogram.dominant_hue();

        // Step 5: Shape of the non-background region
        let (aspect_ratio, roundness) = shape_metrics(&occupied_rows, &occupied_cols);

        let features = ImageFeatures {
            color_ratios,
            brightness,
            texture_complexity,
            gray_variance,
            mean_rgb,
            mean_saturation: (sat_sum / f64::from(total)) as f32,
            mean_value: (val_sum / f64::from(total)) as f32,
            dominant_color,
            dominant_hue,
            hue_histogram,
            aspect_ratio,
            roundness,
        };

        debug!(
            ratios = ?features.color_ratios,
            brightness = features.brightness,
            texture = features.texture_complexity,
            hue = ?features.dominant_hue,
            "extracted image features"
        );

        features
    }
}

/// Sum of absolute vertical and horizontal gray differences per pixel
fn texture_complexity(gray: &[f32], width: usize, height: usize) -> f32 {
    if gray.is_empty() {
        return 0.0;
    }
    let mut edges = 0f64;
    for y in 0..height {
        for x in 0..width {
            let here = gray[y * width + x];
            if x + 1 < width {
                edges += f64::from((gray[y * width + x + 1] - here).abs());
            }
            if y + 1 < height {
                edges += f64::from((gray[(y + 1) * width + x] - here).abs());
            }
        }
    }
    (edges / (width * height) as f64) as f32
}

fn shape_metrics(rows: &[bool], cols: &[bool]) -> (f32, f32) {
    let height = rows.iter().filter(|&&r| r).count() as f32;
    let width = cols.iter().filter(|&&c| c).count() as f32;
    if height == 0.0 || width == 0.0 {
        return (1.0, 0.0);
    }
    (width / height, width.min(height) / width.max(height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageBuffer, Rgb, RgbImage};

    fn solid(r: u8, g: u8, b: u8) -> DynamicImage {
        DynamicImage::ImageRgb8(ImageBuffer::from_pixel(224, 224, Rgb([r, g, b])))
    }

    #[test]
    fn test_extractor_creation() {
        assert_eq!(FeatureExtractor::new().analysis_size(), 224);
        assert_eq!(FeatureExtractor::with_params(64, 230).analysis_size(), 64);
        assert_eq!(FeatureExtractor::with_params(0, 230).analysis_size(), 1);
    }

    #[test]
    fn test_solid_green_features() {
        let features = FeatureExtractor::new().extract(&solid(20, 200, 30));
        assert!((features.color_ratios.green - 1.0).abs() < 1e-6);
        assert_eq!(features.color_ratios.red, 0.0);
        assert!(features.texture_complexity < 1e-3);
        assert_eq!(features.dominant_color, DominantColor::Green);
        let hue = features.dominant_hue.unwrap();
        assert!((80.0..=140.0).contains(&hue));
        assert_eq!(features.color_ratios.largest().0, ColorBand::Green);
    }

    #[test]
    fn test_white_image_has_no_foreground() {
        let features = FeatureExtractor::new().extract(&solid(250, 250, 250));
        assert!((features.color_ratios.white - 1.0).abs() < 1e-6);
        assert_eq!(features.aspect_ratio, 1.0);
        assert_eq!(features.roundness, 0.0);
        assert!(features.hue_histogram.is_empty());
        assert!(features.brightness > 249.0);
    }

    #[test]
    fn test_stripes_raise_texture() {
        let img: RgbImage = ImageBuffer::from_fn(224, 224, |x, _| {
            if x % 2 == 0 {
                Rgb([0, 0, 0])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let features = FeatureExtractor::new().extract(&DynamicImage::ImageRgb8(img));
        assert!(features.texture_complexity > 150.0);
        assert!(features.gray_variance > 1000.0);
    }

    #[test]
    fn test_wide_object_aspect_ratio() {
        // dark band across the middle third of a white plate
        let img: RgbImage = ImageBuffer::from_fn(224, 224, |_, y| {
            if (75..149).contains(&y) {
                Rgb([120, 70, 30])
            } else {
                Rgb([255, 255, 255])
            }
        });
        let features = FeatureExtractor::new().extract(&DynamicImage::ImageRgb8(img));
        assert!(features.aspect_ratio > 2.0);
        assert!(features.roundness < 0.5);
        assert!(features.color_ratios.brown > 0.25);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let img: RgbImage = ImageBuffer::from_fn(300, 180, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        let image = DynamicImage::ImageRgb8(img);
        let extractor = FeatureExtractor::new();
        assert_eq!(extractor.extract(&image), extractor.extract(&image));
    }

    #[test]
    fn test_ratio_map_has_all_bands() {
        let features = FeatureExtractor::new().extract(&solid(220, 30, 30));
        let map = features.color_ratios.to_map();
        assert_eq!(map.len(), 6);
        assert!((map["red"] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_largest_prefers_earlier_band_on_tie() {
        let ratios = ColorRatios::default();
        assert_eq!(ratios.largest(), (ColorBand::Red, 0.0));
    }
}
