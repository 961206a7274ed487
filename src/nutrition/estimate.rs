//! Keyword-bucket nutrition estimates for foods no source knows

use super::database::NutritionFacts;
use super::fuzzy::words;
use crate::constants::nutrition::ESTIMATE_BASELINE_GRAMS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Coarse food category used for estimates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Dessert,
    Fruit,
    Protein,
    Carb,
    Vegetable,
    Mixed,
}

/// Buckets in match order; the first bucket with a keyword hit wins
const KEYWORDS: &[(FoodCategory, &[&str])] = &[
    (
        FoodCategory::Dessert,
        &[
            "cake", "cookie", "brownie", "pie", "ice cream", "dessert", "chocolate", "donut",
            "pudding", "cupcake", "muffin", "candy", "tart",
        ],
    ),
    (
        FoodCategory::Fruit,
        &[
            "fruit", "apple", "banana", "orange", "berry", "berries", "strawberry", "grape",
            "mango", "melon", "watermelon", "pineapple", "peach",
        ],
    ),
    (
        FoodCategory::Protein,
        &[
            "chicken", "beef", "steak", "pork", "fish", "salmon", "tuna", "shrimp", "turkey",
            "egg", "meat", "lamb", "tofu", "sausage", "bacon",
        ],
    ),
    (
        FoodCategory::Carb,
        &[
            "rice", "pasta", "noodle", "bread", "pizza", "potato", "fries", "burger", "sandwich",
            "toast", "pancake", "waffle", "oatmeal", "cereal", "quinoa", "grain", "spaghetti",
            "tortilla", "burrito", "taco",
        ],
    ),
    (
        FoodCategory::Vegetable,
        &[
            "vegetable", "salad", "broccoli", "carrot", "spinach", "greens", "lettuce", "kale",
            "bean", "pea", "tomato", "cucumber", "pepper", "zucchini",
        ],
    ),
];

impl FoodCategory {
    /// Bucket for a food name; `Mixed` when no keyword matches
    pub fn classify(label: &str) -> Self {
        let tokens = words(label);
        KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| contains_keyword(&tokens, k)))
            .map(|(category, _)| *category)
            .unwrap_or(FoodCategory::Mixed)
    }

    pub fn name(&self) -> &'static str {
        match self {
            FoodCategory::Dessert => "dessert",
            FoodCategory::Fruit => "fruit",
            FoodCategory::Protein => "protein",
            FoodCategory::Carb => "carb",
            FoodCategory::Vegetable => "vegetable",
            FoodCategory::Mixed => "mixed",
        }
    }

    /// Typical values for a 150 g serving
    pub fn base_facts(&self) -> NutritionFacts {
        let (calories, protein_g, carbs_g, fat_g) = match self {
            FoodCategory::Protein => (250.0, 30.0, 2.0, 12.0),
            FoodCategory::Carb => (300.0, 8.0, 55.0, 6.0),
            FoodCategory::Vegetable => (80.0, 3.0, 12.0, 3.0),
            FoodCategory::Fruit => (90.0, 1.0, 22.0, 0.4),
            FoodCategory::Dessert => (400.0, 5.0, 55.0, 18.0),
            FoodCategory::Mixed => (250.0, 12.0, 30.0, 9.0),
        };
        NutritionFacts {
            serving_grams: ESTIMATE_BASELINE_GRAMS,
            calories,
            protein_g,
            carbs_g,
            fat_g,
            micronutrients: BTreeMap::new(),
        }
    }
}

// Whole-word match with a plural allowance on the last word
fn contains_keyword(tokens: &[String], keyword: &str) -> bool {
    let parts: Vec<&str> = keyword.split(' ').collect();
    if parts.is_empty() || tokens.len() < parts.len() {
        return false;
    }
    tokens.windows(parts.len()).any(|window| {
        window
            .iter()
            .zip(parts.iter())
            .enumerate()
            .all(|(i, (token, &part))| {
                let token = token.as_str();
                if i + 1 == parts.len() {
                    token == part
                        || token.strip_suffix('s') == Some(part)
                        || token.strip_suffix("es") == Some(part)
                } else {
                    token == part
                }
            })
    })
}
