//! Cross-check of produced nutrition numbers against reference calories
//!
//! The reference table is a small CSV of canonical foods
//! (`name,calories,serving_grams`). A profile whose name matches a row is
//! "supported" when its calories are within the tolerance of the reference,
//! "flagged" otherwise. Foods missing from the table are always flagged.

use crate::config::VerificationConfig;
use crate::constants::verification;
use crate::error::{AnalysisError, Result};
use crate::nutrition::NutritionProfile;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info};

const BUILTIN_REFERENCE: &str = include_str!("../data/canonical_foods.csv");

const REQUIRED_COLUMNS: [&str; 3] = ["name", "calories", "serving_grams"];

/// One canonical food
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceFood {
    pub name: String,
    pub calories: f64,
    pub serving_grams: f64,
}

/// Canonical foods keyed by lowercase name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceTable {
    foods: BTreeMap<String, ReferenceFood>,
}

impl ReferenceTable {
    /// The table shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_csv_str(BUILTIN_REFERENCE)
    }

    /// Parse CSV text with a `name,calories,serving_grams` header
    ///
    /// Columns may appear in any order and extra columns are ignored.
    /// Blank lines and lines starting with `#` are skipped. Quoted fields
    /// are not supported. When a name repeats, the first row wins.
    ///
    /// # Errors
    ///
    /// `DataLoadError` for a missing header or column, a short row, or a
    /// value that is not a non-negative number (serving must be positive).
    pub fn from_csv_str(csv: &str) -> Result<Self> {
        let mut lines = csv
            .lines()
            .enumerate()
            .map(|(i, line)| (i + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let (_, header) = lines.next().ok_or_else(|| data_error("reference CSV has no header"))?;
        let columns: Vec<String> = header.split(',').map(|c| c.trim().to_lowercase()).collect();
        let mut index = [0usize; 3];
        for (slot, required) in index.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = columns
                .iter()
                .position(|c| c == required)
                .ok_or_else(|| data_error(format!("reference CSV lacks a '{}' column", required)))?;
        }
        let [name_col, calories_col, serving_col] = index;

        let mut foods = BTreeMap::new();
        for (number, line) in lines {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < columns.len() {
                return Err(data_error(format!(
                    "line {}: expected {} fields, found {}",
                    number,
                    columns.len(),
                    fields.len()
                )));
            }
            let name = fields[name_col];
            if name.is_empty() {
                return Err(data_error(format!("line {}: empty name", number)));
            }
            let calories = parse_number(fields[calories_col], number, "calories")?;
            let serving_grams = parse_number(fields[serving_col], number, "serving_grams")?;
            if serving_grams <= 0.0 {
                return Err(data_error(format!("line {}: serving_grams must be positive", number)));
            }

            foods.entry(name.to_lowercase()).or_insert_with(|| ReferenceFood {
                name: name.to_string(),
                calories,
                serving_grams,
            });
        }
        Ok(Self { foods })
    }

    /// Load a CSV file
    pub fn from_csv_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AnalysisError::data_load(format!("cannot read {}", path.display()), e)
        })?;
        let table = Self::from_csv_str(&content)?;
        info!(path = %path.display(), foods = table.len(), "loaded reference table");
        Ok(table)
    }

    /// Row for a name, compared case-insensitively
    pub fn get(&self, name: &str) -> Option<&ReferenceFood> {
        self.foods.get(&name.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.foods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.foods.is_empty()
    }
}

fn parse_number(field: &str, line: usize, column: &str) -> Result<f64> {
    match field.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(data_error(format!(
            "line {}: invalid {} value '{}'",
            line, column, field
        ))),
    }
}

fn data_error(message: impl Into<String>) -> AnalysisError {
    AnalysisError::DataLoadError {
        message: message.into(),
        source: None,
    }
}

/// Outcome of one claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Supported,
    Flagged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationItem {
    pub claim: String,
    pub status: VerificationStatus,
    #[serde(default)]
    pub evidence: Option<String>,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub items: Vec<VerificationItem>,
    pub overall_confidence: f64,
}

impl VerificationReport {
    /// Report over `items`; overall confidence is their mean
    pub fn from_items(items: Vec<VerificationItem>) -> Self {
        let overall_confidence = if items.is_empty() {
            0.0
        } else {
            items.iter().map(|i| i.confidence).sum::<f64>() / items.len() as f64
        };
        Self {
            items,
            overall_confidence,
        }
    }
}

/// Checks profiles against a reference table
#[derive(Debug, Clone)]
pub struct Verifier {
    table: ReferenceTable,
    calorie_tolerance: f64,
}

impl Verifier {
    pub fn new(table: ReferenceTable, calorie_tolerance: f64) -> Self {
        Self {
            table,
            calorie_tolerance,
        }
    }

    /// Verifier over the configured reference file, or the built-in table
    pub fn from_config(config: &VerificationConfig) -> Result<Self> {
        let table = match &config.reference_path {
            Some(path) => ReferenceTable::from_csv_file(path)?,
            None => ReferenceTable::builtin()?,
        };
        Ok(Self::new(table, config.calorie_tolerance))
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    /// Compare a profile's calories with the reference row of the same name
    pub fn verify(&self, profile: &NutritionProfile) -> VerificationReport {
        let item = match self.table.get(&profile.name) {
            Some(reference) => {
                let deviation =
                    (profile.calories - reference.calories).abs() / reference.calories.max(1.0);
                let supported = deviation <= self.calorie_tolerance;
                debug!(food = %profile.name, deviation, supported, "verified calories");
                VerificationItem {
                    claim: format!("Calories ≈ {}", format_number(profile.calories)),
                    status: if supported {
                        VerificationStatus::Supported
                    } else {
                        VerificationStatus::Flagged
                    },
                    evidence: Some(format!(
                        "Canonical ~ {} kcal per {} g",
                        format_number(reference.calories),
                        reference.serving_grams
                    )),
                    confidence: if supported {
                        verification::SUPPORTED_CONFIDENCE
                    } else {
                        verification::DEVIATING_CONFIDENCE
                    },
                }
            }
            None => {
                debug!(food = %profile.name, "food missing from reference table");
                VerificationItem {
                    claim: format!("Unknown food: {}", profile.name),
                    status: VerificationStatus::Flagged,
                    evidence: Some("Not found in canonical subset".to_string()),
                    confidence: verification::UNKNOWN_FOOD_CONFIDENCE,
                }
            }
        };
        VerificationReport::from_items(vec![item])
    }
}

// Calories always show a decimal part ("280.0", "247.5")
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}
