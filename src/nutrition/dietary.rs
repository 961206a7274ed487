//! Dietary-note adjustments applied after a profile is resolved

use super::{round1, NutritionProfile};
use crate::constants::nutrition::{KCAL_PER_GRAM_CARBS, KCAL_PER_GRAM_FAT, KCAL_PER_GRAM_PROTEIN};
use serde::{Deserialize, Serialize};
use tracing::debug;

const KETO_CARB_FACTOR: f64 = 0.3;
const KETO_FAT_FACTOR: f64 = 1.3;
const HIGH_PROTEIN_FACTOR: f64 = 1.25;

/// Micronutrient removed for vegan profiles
const ANIMAL_ONLY_NUTRIENT: &str = "vitamin_b12_mcg";

/// Animal ingredient → plant replacement
const VEGAN_SUBSTITUTES: &[(&str, &str)] = &[
    ("chicken", "tofu"),
    ("beef", "seitan"),
    ("steak", "seitan"),
    ("fish", "tempeh"),
    ("salmon", "tempeh"),
    ("eggs", "tofu scramble"),
    ("egg", "tofu scramble"),
    ("cheese", "vegan cheese"),
];

/// A dietary preference recognized in free-text notes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietaryNote {
    Keto,
    HighProtein,
    Vegan,
}

impl DietaryNote {
    /// Preferences mentioned in `notes`, in a fixed order without repeats
    ///
    /// ```
    /// use nutriscan::nutrition::DietaryNote;
    ///
    /// let notes = DietaryNote::parse_notes("Vegan please, and keto");
    /// assert_eq!(notes, vec![DietaryNote::Keto, DietaryNote::Vegan]);
    /// ```
    pub fn parse_notes(notes: &str) -> Vec<DietaryNote> {
        let text = notes.to_lowercase().replace(['-', '_'], " ");
        let mut found = Vec::new();
        if text.contains("keto") || text.contains("low carb") {
            found.push(DietaryNote::Keto);
        }
        if text.contains("high protein") || text.contains("protein rich") {
            found.push(DietaryNote::HighProtein);
        }
        if text.contains("vegan") || text.contains("plant based") {
            found.push(DietaryNote::Vegan);
        }
        found
    }
}

/// Apply dietary adjustments to a profile in place
///
/// Keto scales carbs by 0.3 and fat by 1.3; high-protein scales protein by
/// 1.25. Calories follow the macro changes at 4/4/9 kcal per gram. Vegan
/// substitutes animal ingredients in the name and drops vitamin B12.
pub fn apply_dietary_notes(profile: &mut NutritionProfile, notes: &[DietaryNote]) {
    for note in notes {
        match note {
            DietaryNote::Keto => {
                let carbs = profile.macros.carbs_g * KETO_CARB_FACTOR;
                let fat = profile.macros.fat_g * KETO_FAT_FACTOR;
                let delta = (carbs - profile.macros.carbs_g) * KCAL_PER_GRAM_CARBS
                    + (fat - profile.macros.fat_g) * KCAL_PER_GRAM_FAT;
                profile.macros.carbs_g = round1(carbs);
                profile.macros.fat_g = round1(fat);
                profile.calories = round1((profile.calories + delta).max(0.0));
            }
            DietaryNote::HighProtein => {
                let protein = profile.macros.protein_g * HIGH_PROTEIN_FACTOR;
                let delta = (protein - profile.macros.protein_g) * KCAL_PER_GRAM_PROTEIN;
                profile.macros.protein_g = round1(protein);
                profile.calories = round1((profile.calories + delta).max(0.0));
            }
            DietaryNote::Vegan => {
                profile.name = vegan_substitute(&profile.name);
                profile.micronutrients.remove(ANIMAL_ONLY_NUTRIENT);
            }
        }
        debug!(?note, calories = profile.calories, "applied dietary note");
    }
}

/// Replace animal ingredients word by word
///
/// ```
/// use nutriscan::nutrition::vegan_substitute;
///
/// assert_eq!(vegan_substitute("grilled chicken"), "grilled tofu");
/// assert_eq!(vegan_substitute("Steak and Eggs"), "seitan and tofu scramble");
/// ```
pub fn vegan_substitute(text: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    for word in text.split_whitespace() {
        let lower = word.to_lowercase();
        let already_vegan = out.last().is_some_and(|prev| prev.eq_ignore_ascii_case("vegan"));
        let replacement = VEGAN_SUBSTITUTES
            .iter()
            .find(|(animal, _)| *animal == lower)
            .map(|(_, plant)| *plant)
            .filter(|_| !(already_vegan && lower == "cheese"));
        match replacement {
            Some(plant) => out.push(plant.to_string()),
            None => out.push(word.to_string()),
        }
    }
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nutrition::Macros;
    use std::collections::BTreeMap;

    fn profile() -> NutritionProfile {
        NutritionProfile {
            name: "chicken with cheese".to_string(),
            serving_grams: 150.0,
            calories: 400.0,
            macros: Macros {
                protein_g: 30.0,
                carbs_g: 40.0,
                fat_g: 10.0,
            },
            micronutrients: BTreeMap::from([
                ("vitamin_b12_mcg".to_string(), 1.0),
                ("iron_mg".to_string(), 2.0),
            ]),
        }
    }

    #[test]
    fn test_parse_notes() {
        assert_eq!(DietaryNote::parse_notes(""), vec![]);
        assert_eq!(
            DietaryNote::parse_notes("high-protein, low-carb"),
            vec![DietaryNote::Keto, DietaryNote::HighProtein]
        );
        assert_eq!(DietaryNote::parse_notes("Plant-based"), vec![DietaryNote::Vegan]);
    }

    #[test]
    fn test_keto_rebalances_calories() {
        let mut p = profile();
        apply_dietary_notes(&mut p, &[DietaryNote::Keto]);
        assert_eq!(p.macros.carbs_g, 12.0);
        assert_eq!(p.macros.fat_g, 13.0);
        // -28 g carbs × 4 + 3 g fat × 9
        assert_eq!(p.calories, 315.0);
    }

    #[test]
    fn test_high_protein() {
        let mut p = profile();
        apply_dietary_notes(&mut p, &[DietaryNote::HighProtein]);
        assert_eq!(p.macros.protein_g, 37.5);
        assert_eq!(p.calories, 430.0);
    }

    #[test]
    fn test_vegan_substitution() {
        let mut p = profile();
        apply_dietary_notes(&mut p, &[DietaryNote::Vegan]);
        assert_eq!(p.name, "tofu with vegan cheese");
        assert!(!p.micronutrients.contains_key("vitamin_b12_mcg"));
        assert!(p.micronutrients.contains_key("iron_mg"));
        assert_eq!(p.calories, 400.0);

        assert_eq!(vegan_substitute("vegan cheese"), "vegan cheese");
        assert_eq!(vegan_substitute("salmon"), "tempeh");
    }
}
