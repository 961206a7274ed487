//! Nutrition resolution for a recognized food label
//!
//! The resolver walks a fixed cascade and stops at the first answer:
//!
//! 1. direct lookup in the nutrition database
//! 2. fuzzy token match against database names
//! 3. remote lookup (USDA FoodData Central), when configured
//! 4. keyword-bucket estimate
//!
//! Values scale linearly with the serving size and are rounded to one
//! decimal. Dietary notes are applied afterwards by
//! [`apply_dietary_notes`].

pub mod database;
pub mod dietary;
pub mod estimate;
pub mod fuzzy;
pub mod usda;

pub use database::{NutritionDatabase, NutritionFacts};
pub use dietary::{apply_dietary_notes, vegan_substitute, DietaryNote};
pub use estimate::FoodCategory;
pub use fuzzy::{best_fuzzy_match, jaccard_similarity, match_score};
pub use usda::{RemoteNutritionSource, UsdaNutritionSource};

use crate::config::{AnalyzerConfig, NutritionConfig};
use crate::constants::nutrition;
use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Macronutrients of one serving, in grams
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Macros {
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

impl Macros {
    /// Energy implied by the macronutrients (4/4/9 kcal per gram)
    pub fn energy_kcal(&self) -> f64 {
        self.protein_g * nutrition::KCAL_PER_GRAM_PROTEIN
            + self.carbs_g * nutrition::KCAL_PER_GRAM_CARBS
            + self.fat_g * nutrition::KCAL_PER_GRAM_FAT
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            protein_g: round1(self.protein_g * factor),
            carbs_g: round1(self.carbs_g * factor),
            fat_g: round1(self.fat_g * factor),
        }
    }
}

/// Nutrition of one serving of a named food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionProfile {
    pub name: String,
    pub serving_grams: f64,
    pub calories: f64,
    pub macros: Macros,
    #[serde(default)]
    pub micronutrients: BTreeMap<String, f64>,
}

impl NutritionProfile {
    /// Profile for `serving_grams` of a food described by `facts`
    pub fn from_facts(name: impl Into<String>, facts: &NutritionFacts, serving_grams: f64) -> Self {
        let factor = if facts.serving_grams > 0.0 {
            serving_grams / facts.serving_grams
        } else {
            0.0
        };
        Self {
            name: name.into(),
            serving_grams: round1(serving_grams),
            calories: round1(facts.calories * factor),
            macros: Macros {
                protein_g: facts.protein_g,
                carbs_g: facts.carbs_g,
                fat_g: facts.fat_g,
            }
            .scaled(factor),
            micronutrients: facts
                .micronutrients
                .iter()
                .map(|(k, v)| (k.clone(), round1(v * factor)))
                .collect(),
        }
    }

    /// Same food, different serving size
    pub fn scaled_to(&self, serving_grams: f64) -> Self {
        let factor = if self.serving_grams > 0.0 {
            serving_grams / self.serving_grams
        } else {
            0.0
        };
        Self {
            name: self.name.clone(),
            serving_grams: round1(serving_grams),
            calories: round1(self.calories * factor),
            macros: self.macros.scaled(factor),
            micronutrients: self
                .micronutrients
                .iter()
                .map(|(k, v)| (k.clone(), round1(v * factor)))
                .collect(),
        }
    }
}

/// Which step of the cascade produced a profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionSourceKind {
    Database,
    FuzzyMatch,
    Remote,
    Estimate,
}

/// A resolved profile and where it came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedNutrition {
    pub profile: NutritionProfile,
    pub source: NutritionSourceKind,
    /// Database entry used by a fuzzy match
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matched_name: Option<String>,
}

/// Lookup-or-estimate cascade over the nutrition sources
pub struct NutritionResolver {
    database: NutritionDatabase,
    remote: Option<Box<dyn RemoteNutritionSource>>,
    config: NutritionConfig,
}

impl std::fmt::Debug for NutritionResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NutritionResolver")
            .field("foods", &self.database.len())
            .field("remote", &self.remote.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl NutritionResolver {
    /// Resolver over a database, without remote lookups
    pub fn new(database: NutritionDatabase, config: NutritionConfig) -> Self {
        Self {
            database,
            remote: None,
            config,
        }
    }

    /// Add a remote source consulted after the database and fuzzy match
    pub fn with_remote(mut self, remote: Box<dyn RemoteNutritionSource>) -> Self {
        self.remote = Some(remote);
        self
    }

    /// Build the resolver described by a full configuration
    ///
    /// Loads `nutrition.database_path` when set (the built-in table
    /// otherwise) and enables the USDA source when it has an API key.
    ///
    /// # Errors
    ///
    /// `DataLoadError` for an unreadable database, `ConfigError` if the
    /// HTTP client cannot be built.
    pub fn from_config(config: &AnalyzerConfig) -> Result<Self> {
        let database = match &config.nutrition.database_path {
            Some(path) => NutritionDatabase::from_json_file(path)?,
            None => NutritionDatabase::builtin()?,
        };
        let resolver = Self::new(database, config.nutrition.clone());
        if config.usda.is_active() {
            let source = UsdaNutritionSource::new(&config.usda)?;
            Ok(resolver.with_remote(Box::new(source)))
        } else {
            Ok(resolver)
        }
    }

    pub fn database(&self) -> &NutritionDatabase {
        &self.database
    }

    /// Resolve a food label to a nutrition profile
    ///
    /// # Arguments
    ///
    /// * `label` - Food name, as produced by recognition
    /// * `serving_grams` - Serving override; the source's own serving
    ///   (or the configured default) when `None`
    ///
    /// # Errors
    ///
    /// `InvalidParameter` when the serving override is not a positive
    /// finite number.
    pub fn resolve(&self, label: &str, serving_grams: Option<f64>) -> Result<ResolvedNutrition> {
        if let Some(grams) = serving_grams {
            if !grams.is_finite() || grams <= 0.0 {
                return Err(AnalysisError::InvalidParameter {
                    parameter: "serving_grams".to_string(),
                    value: grams.to_string(),
                });
            }
        }

        let name = label.trim();
        let key = name.to_lowercase();

        if let Some(facts) = self.database.get(&key) {
            debug!(food = %key, "nutrition database hit");
            let serving = serving_grams.unwrap_or(facts.serving_grams);
            return Ok(ResolvedNutrition {
                profile: NutritionProfile::from_facts(name, facts, serving),
                source: NutritionSourceKind::Database,
                matched_name: None,
            });
        }

        if let Some((matched, score)) = best_fuzzy_match(
            &key,
            self.database.names(),
            self.config.fuzzy_floor,
            self.config.key_word_bonus,
        ) {
            if let Some(facts) = self.database.get(matched) {
                debug!(food = %key, matched, score, "nutrition fuzzy match");
                let serving = serving_grams.unwrap_or(facts.serving_grams);
                return Ok(ResolvedNutrition {
                    profile: NutritionProfile::from_facts(name, facts, serving),
                    source: NutritionSourceKind::FuzzyMatch,
                    matched_name: Some(matched.to_string()),
                });
            }
        }

        if let Some(remote) = &self.remote {
            if let Some(facts) = remote.lookup(name) {
                info!(food = %key, "nutrition from remote source");
                let serving = serving_grams.unwrap_or(self.config.default_serving_grams);
                return Ok(ResolvedNutrition {
                    profile: NutritionProfile::from_facts(name, &facts, serving),
                    source: NutritionSourceKind::Remote,
                    matched_name: None,
                });
            }
        }

        let category = FoodCategory::classify(name);
        info!(food = %key, category = category.name(), "estimating nutrition from keywords");
        let serving = serving_grams.unwrap_or(self.config.default_serving_grams);
        Ok(ResolvedNutrition {
            profile: NutritionProfile::from_facts(name, &category.base_facts(), serving),
            source: NutritionSourceKind::Estimate,
            matched_name: None,
        })
    }
}

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
