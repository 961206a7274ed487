//! Remote nutrition lookup via USDA FoodData Central
//!
//! One `/foods/search` request per food, best hit only. FoodData Central
//! reports search hits per 100 g. Any failure yields `None` and the
//! resolver moves on to its keyword estimate.

use super::database::NutritionFacts;
use crate::config::UsdaConfig;
use crate::constants::nutrition::REMOTE_BASIS_GRAMS;
use crate::detection::{http_client, AdapterFailure};
use crate::error::{AnalysisError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A nutrition source outside the process
pub trait RemoteNutritionSource: Send + Sync {
    /// Facts for a food name, or `None` when the source has no answer
    fn lookup(&self, food: &str) -> Option<NutritionFacts>;
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    foods: Vec<SearchFood>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchFood {
    #[serde(default)]
    description: String,
    #[serde(default)]
    food_nutrients: Vec<FoodNutrient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FoodNutrient {
    #[serde(default)]
    nutrient_number: Option<String>,
    #[serde(default)]
    unit_name: Option<String>,
    #[serde(default)]
    value: Option<f64>,
}

/// FoodData Central nutrient numbers of the micronutrients kept
const MICRONUTRIENTS: &[(&str, &str)] = &[
    ("291", "fiber_g"),
    ("269", "sugar_g"),
    ("307", "sodium_mg"),
    ("301", "calcium_mg"),
    ("303", "iron_mg"),
    ("306", "potassium_mg"),
    ("401", "vitamin_c_mg"),
    ("418", "vitamin_b12_mcg"),
];

const ENERGY: &str = "208";
const PROTEIN: &str = "203";
const FAT: &str = "204";
const CARBS: &str = "205";

/// Per-100 g facts of the first search hit
pub(crate) fn facts_from_search(
    response: &SearchResponse,
) -> std::result::Result<NutritionFacts, AdapterFailure> {
    let food = response
        .foods
        .first()
        .ok_or_else(|| AdapterFailure::Malformed("no matching food".to_string()))?;

    let value_of = |number: &str| -> Option<f64> {
        food.food_nutrients
            .iter()
            .filter(|n| n.nutrient_number.as_deref() == Some(number))
            .filter(|n| {
                number != ENERGY
                    || n.unit_name
                        .as_deref()
                        .is_some_and(|u| u.eq_ignore_ascii_case("kcal"))
            })
            .find_map(|n| n.value)
            .filter(|v| v.is_finite() && *v >= 0.0)
    };

    let calories = value_of(ENERGY).ok_or_else(|| {
        AdapterFailure::Malformed(format!("no energy value for '{}'", food.description))
    })?;

    let micronutrients: BTreeMap<String, f64> = MICRONUTRIENTS
        .iter()
        .filter_map(|(number, key)| value_of(number).map(|v| (key.to_string(), v)))
        .collect();

    debug!(food = %food.description, calories, "usda search hit");

    Ok(NutritionFacts {
        serving_grams: REMOTE_BASIS_GRAMS,
        calories,
        protein_g: value_of(PROTEIN).unwrap_or(0.0),
        carbs_g: value_of(CARBS).unwrap_or(0.0),
        fat_g: value_of(FAT).unwrap_or(0.0),
        micronutrients,
    })
}

/// FoodData Central client
pub struct UsdaNutritionSource {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl UsdaNutritionSource {
    /// Create the client
    ///
    /// # Errors
    ///
    /// `ConfigError` when no API key is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &UsdaConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AnalysisError::ConfigError {
                message: "usda.api_key is not set".to_string(),
                source: None,
            })?;

        Ok(Self {
            client: http_client(config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn search(&self, food: &str) -> std::result::Result<NutritionFacts, AdapterFailure> {
        let response = self
            .client
            .get(format!("{}/foods/search", self.base_url))
            .query(&[
                ("query", food),
                ("pageSize", "1"),
                ("api_key", self.api_key.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(AdapterFailure::Status(status.as_u16()));
        }

        let parsed: SearchResponse = response
            .json()
            .map_err(|e| AdapterFailure::Malformed(e.to_string()))?;
        facts_from_search(&parsed)
    }
}

impl RemoteNutritionSource for UsdaNutritionSource {
    fn lookup(&self, food: &str) -> Option<NutritionFacts> {
        match self.search(food) {
            Ok(facts) => Some(facts),
            Err(failure) => {
                warn!(source = "usda", food, error = %failure, "remote nutrition lookup failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> SearchResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_first_hit_per_100_grams() {
        let response = parse(
            r#"{
                "totalHits": 2,
                "foods": [{
                    "description": "Lentils, cooked",
                    "foodNutrients": [
                        {"nutrientNumber": "208", "nutrientName": "Energy", "unitName": "kJ", "value": 485},
                        {"nutrientNumber": "208", "nutrientName": "Energy", "unitName": "KCAL", "value": 116},
                        {"nutrientNumber": "203", "unitName": "G", "value": 9.0},
                        {"nutrientNumber": "205", "unitName": "G", "value": 20.1},
                        {"nutrientNumber": "204", "unitName": "G", "value": 0.4},
                        {"nutrientNumber": "303", "unitName": "MG", "value": 3.3},
                        {"nutrientNumber": "999", "unitName": "G", "value": 1.0}
                    ]
                }, {
                    "description": "Lentils, raw",
                    "foodNutrients": [{"nutrientNumber": "208", "unitName": "KCAL", "value": 352}]
                }]
            }"#,
        );
        let facts = facts_from_search(&response).unwrap();
        assert_eq!(facts.serving_grams, 100.0);
        assert_eq!(facts.calories, 116.0);
        assert_eq!(facts.protein_g, 9.0);
        assert_eq!(facts.carbs_g, 20.1);
        assert_eq!(facts.micronutrients.get("iron_mg"), Some(&3.3));
        assert_eq!(facts.micronutrients.len(), 1);
    }

    #[test]
    fn test_unusable_responses() {
        assert!(facts_from_search(&parse(r#"{"foods": []}"#)).is_err());
        assert!(facts_from_search(&parse("{}")).is_err());
        let no_energy = parse(
            r#"{"foods": [{"description": "x", "foodNutrients": [{"nutrientNumber": "203", "value": 3}]}]}"#,
        );
        assert!(facts_from_search(&no_energy).is_err());
    }

    #[test]
    fn test_source_requires_api_key() {
        let config = UsdaConfig {
            api_key: None,
            ..UsdaConfig::default()
        };
        assert!(matches!(
            UsdaNutritionSource::new(&config),
            Err(AnalysisError::ConfigError { .. })
        ));
    }
}
