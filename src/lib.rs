//! # Nutriscan
//!
//! A Rust crate for estimating the nutrition of a meal from a food photo.
//!
//! This library turns one photo into a nutrition profile by:
//! - Extracting color-band ratios, brightness, texture and shape features
//! - Classifying the food with local rules, a hue-signature matcher and
//!   optional remote vision services
//! - Combining every method's answer in a weighted ensemble vote
//! - Resolving nutrition from a database, fuzzy matching, USDA FoodData
//!   Central or keyword estimates
//! - Suggesting recipes and cross-checking calories against reference data
//!
//! ## Example
//!
//! ```rust,no_run
//! use nutriscan::{AnalysisOptions, AnalyzerConfig, FoodAnalyzer};
//! use nutriscan::image_loader::load_image;
//! use std::path::Path;
//!
//! let analyzer = FoodAnalyzer::new(AnalyzerConfig::offline())?;
//! let photo = load_image(Path::new("lunch.jpg"))?;
//! let recommendation = analyzer.analyze(&photo, &AnalysisOptions::default())?;
//! println!(
//!     "{}: {} kcal",
//!     recommendation.profile.name, recommendation.profile.calories
//! );
//! # Ok::<(), nutriscan::AnalysisError>(())
//! ```

pub mod classify;
pub mod color;
pub mod config;
pub mod constants;
pub mod detection;
pub mod ensemble;
pub mod error;
pub mod features;
pub mod image_loader;
pub mod nutrition;
pub mod pipeline;
pub mod recipes;
pub mod service;
pub mod verify;

pub use config::AnalyzerConfig;
pub use detection::{Detection, DetectionMethod, FoodDetector};
pub use ensemble::{Consensus, EnsembleResult};
pub use error::{AnalysisError, Result};
pub use features::ImageFeatures;
pub use nutrition::{Macros, NutritionProfile};
pub use pipeline::{AnalysisOptions, FoodAnalyzer, Recommendation, RecognitionSummary};
pub use recipes::RecipeCard;
pub use verify::{VerificationItem, VerificationReport, VerificationStatus};
