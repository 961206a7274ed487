//! Static nutrition database keyed by food name

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

const BUILTIN_DATABASE: &str = include_str!("../../data/nutrition_db.json");

fn default_serving() -> f64 {
    100.0
}

/// Nutrition of one reference serving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionFacts {
    #[serde(default = "default_serving")]
    pub serving_grams: f64,
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    #[serde(default)]
    pub micronutrients: BTreeMap<String, f64>,
}

impl NutritionFacts {
    fn is_valid(&self) -> bool {
        let values = [self.calories, self.protein_g, self.carbs_g, self.fat_g];
        self.serving_grams.is_finite()
            && self.serving_grams > 0.0
            && values.iter().all(|v| v.is_finite() && *v >= 0.0)
            && self.micronutrients.values().all(|v| v.is_finite() && *v >= 0.0)
    }
}

/// Food name → nutrition facts, names stored lowercase
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NutritionDatabase {
    foods: BTreeMap<String, NutritionFacts>,
}

impl NutritionDatabase {
    /// The table shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_DATABASE)
    }

    /// Parse a JSON object mapping food names to facts
    ///
    /// # Errors
    ///
    /// `DataLoadError` for malformed JSON, and for entries with a
    /// non-positive serving or negative/non-finite values.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, NutritionFacts> = serde_json::from_str(json)
            .map_err(|e| AnalysisError::data_load("invalid nutrition database", e))?;

        let mut foods = BTreeMap::new();
        for (name, facts) in raw {
            if !facts.is_valid() {
                return Err(AnalysisError::DataLoadError {
                    message: format!("invalid nutrition values for '{}'", name),
                    source: None,
                });
            }
            foods.insert(name.trim().to_lowercase(), facts);
        }
        Ok(Self { foods })
    }

    /// Load a database file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::data_load(format!("cannot read {}", path.display()), e)
        })?;
        let database = Self::from_json_str(&content)?;
        info!(path = %path.display(), foods = database.len(), "loaded nutrition database");
        Ok(database)
    }

    /// Facts for an exact (case-insensitive) name
    pub fn get(&self, name: &str) -> Option<&NutritionFacts> {
        let key = name.trim();
        self.foods
            .get(key)
            .or_else(|| self.foods.get(&key.to_lowercase()))
    }

    /// Every food name, in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.foods.keys().map(String::as_str)
    }

    pub fn insert(&mut self, name: &str, facts: NutritionFacts) {
        self.foods.insert(name.trim().to_lowercase(), facts);
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}
