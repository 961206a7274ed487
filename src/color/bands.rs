//! Fixed RGB color bands
//!
//! Each band is an independent predicate over an 8-bit RGB pixel, so one
//! pixel may fall into several bands (a pale yellow can be both yellow and
//! white) or into none.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Food-relevant color band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorBand {
    Red,
    Green,
    Brown,
    Yellow,
    White,
    Black,
}

impl ColorBand {
    /// All bands in their fixed reporting order
    pub const ALL: [ColorBand; 6] = [
        ColorBand::Red,
        ColorBand::Green,
        ColorBand::Brown,
        ColorBand::Yellow,
        ColorBand::White,
        ColorBand::Black,
    ];

    /// Lowercase band name used in feature maps
    pub fn name(&self) -> &'static str {
        match self {
            ColorBand::Red => "red",
            ColorBand::Green => "green",
            ColorBand::Brown => "brown",
            ColorBand::Yellow => "yellow",
            ColorBand::White => "white",
            ColorBand::Black => "black",
        }
    }

    /// Test whether an RGB pixel belongs to this band
    pub fn contains(&self, r: u8, g: u8, b: u8) -> bool {
        let (r, g, b) = (i32::from(r), i32::from(g), i32::from(b));
        match self {
            // tomato sauce, peppers, berries
            ColorBand::Red => r > 120 && r > g + 20 && r > b + 20,
            // leafy greens
            ColorBand::Green => g > 150 && g > r + 30 && g > b + 30,
            // crusts, grilled and fried surfaces
            ColorBand::Brown => r > 80 && r < 160 && g > 40 && g < 120 && b < 80 && r > g,
            // cheese, egg yolk, fries
            ColorBand::Yellow => r > 150 && g > 150 && b < 120 && r > b + 30,
            // rice, cream, plates
            ColorBand::White => r > 180 && g > 180 && b > 180 && (r - g).abs() < 30,
            // char and shadows
            ColorBand::Black => r < 70 && g < 70 && b < 70,
        }
    }
}

impl fmt::Display for ColorBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse color name of an image's mean RGB value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DominantColor {
    Red,
    Green,
    Blue,
    Yellow,
    White,
    Dark,
    Brown,
}

impl DominantColor {
    /// Name the mean color of an image.
    ///
    /// A channel that is strictly the largest wins outright; otherwise the
    /// brightness checks decide.
    pub fn from_mean(r: f32, g: f32, b: f32) -> Self {
        if r > g && r > b {
            DominantColor::Red
        } else if g > r && g > b {
            DominantColor::Green
        } else if b > r && b > g {
            DominantColor::Blue
        } else if r > 200.0 && g > 200.0 && b > 200.0 {
            DominantColor::White
        } else if r > 180.0 && g > 180.0 {
            DominantColor::Yellow
        } else if r < 100.0 && g < 100.0 && b < 100.0 {
            DominantColor::Dark
        } else {
            DominantColor::Brown
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_colors() {
        assert!(ColorBand::Red.contains(220, 30, 30));
        assert!(ColorBand::Green.contains(30, 200, 40));
        assert!(!ColorBand::Green.contains(80, 140, 60));
        assert!(ColorBand::Yellow.contains(230, 200, 60));
        assert!(ColorBand::White.contains(245, 240, 235));
        assert!(ColorBand::Black.contains(10, 20, 30));
    }

    #[test]
    fn test_brown_band() {
        assert!(ColorBand::Brown.contains(139, 90, 43));
        assert!(!ColorBand::Brown.contains(90, 100, 40));
        assert!(!ColorBand::Brown.contains(170, 90, 40));
    }

    #[test]
    fn test_bands_are_independent() {
        // pale yellow is both yellow and not white (blue channel too low)
        let hits: Vec<_> = ColorBand::ALL
            .iter()
            .filter(|band| band.contains(240, 230, 100))
            .collect();
        assert_eq!(hits, vec![&ColorBand::Yellow]);

        // pure blue lands in no band
        assert!(ColorBand::ALL.iter().all(|band| !band.contains(20, 40, 220)));
    }

    #[test]
    fn test_dominant_color_from_mean() {
        assert_eq!(DominantColor::from_mean(200.0, 50.0, 50.0), DominantColor::Red);
        assert_eq!(DominantColor::from_mean(20.0, 200.0, 20.0), DominantColor::Green);
        assert_eq!(DominantColor::from_mean(20.0, 20.0, 200.0), DominantColor::Blue);
        assert_eq!(DominantColor::from_mean(230.0, 230.0, 230.0), DominantColor::White);
        assert_eq!(DominantColor::from_mean(30.0, 30.0, 30.0), DominantColor::Dark);
        assert_eq!(DominantColor::from_mean(150.0, 150.0, 150.0), DominantColor::Brown);
    }

    #[test]
    fn test_band_names() {
        let names: Vec<_> = ColorBand::ALL.iter().map(|b| b.to_string()).collect();
        assert_eq!(names, ["red", "green", "brown", "yellow", "white", "black"]);
    }
}
