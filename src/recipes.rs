//! Templated recipe suggestions for a recognized food
//!
//! Three cards per food, chosen by the food's category. Step text refers to
//! the ingredients through `{food}` and `{1}`..`{3}` placeholders, so dietary
//! swaps in the ingredient list carry into the steps.

use crate::nutrition::{vegan_substitute, DietaryNote, FoodCategory};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One suggested recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeCard {
    pub title: String,
    pub steps: Vec<String>,
    pub time_minutes: u32,
    pub cost_estimate_usd: f64,
    pub ingredients: Vec<String>,
}

struct RecipeTemplate {
    title: &'static str,
    steps: &'static [&'static str],
    time_minutes: u32,
    cost_estimate_usd: f64,
    extras: [&'static str; 3],
}

const PROTEIN_TEMPLATES: [RecipeTemplate; 3] = [
    RecipeTemplate {
        title: "{Food} Protein Bowl",
        steps: &[
            "Cook the {1} until tender.",
            "Warm the {food} through and slice it.",
            "Steam the {2} for 4 minutes.",
            "Assemble the bowl and finish with {3}.",
        ],
        time_minutes: 20,
        cost_estimate_usd: 6.5,
        extras: ["rice", "broccoli", "soy sauce"],
    },
    RecipeTemplate {
        title: "{Food} Quick Salad",
        steps: &[
            "Slice the {food} into strips.",
            "Toss the {1} with the {2}.",
            "Top with the {food} and dress with {3}.",
        ],
        time_minutes: 12,
        cost_estimate_usd: 5.0,
        extras: ["mixed greens", "cherry tomatoes", "olive oil"],
    },
    RecipeTemplate {
        title: "{Food} Wrap",
        steps: &[
            "Warm the {1} in a dry pan.",
            "Layer the {2} and the {food}.",
            "Add a spoon of {3} and roll tightly.",
        ],
        time_minutes: 15,
        cost_estimate_usd: 4.5,
        extras: ["tortilla", "lettuce", "yogurt sauce"],
    },
];

const CARB_TEMPLATES: [RecipeTemplate; 3] = [
    RecipeTemplate {
        title: "Classic {Food}",
        steps: &[
            "Prepare the {food} as usual.",
            "Soften the {2} in {1} over low heat.",
            "Combine and finish with {3}.",
        ],
        time_minutes: 25,
        cost_estimate_usd: 5.0,
        extras: ["olive oil", "garlic", "cheese"],
    },
    RecipeTemplate {
        title: "{Food} with Roasted Vegetables",
        steps: &[
            "Roast the {1} and {2} at 220 °C for 20 minutes.",
            "Prepare the {food} while the vegetables roast.",
            "Serve together with a drizzle of {3}.",
        ],
        time_minutes: 30,
        cost_estimate_usd: 6.0,
        extras: ["zucchini", "bell pepper", "olive oil"],
    },
    RecipeTemplate {
        title: "{Food} Lunch Box",
        steps: &[
            "Portion the {food} into a container.",
            "Add the {1} and the {2}.",
            "Squeeze over the {3} before eating.",
        ],
        time_minutes: 15,
        cost_estimate_usd: 4.0,
        extras: ["spinach", "chickpeas", "lemon"],
    },
];

const VEGETABLE_TEMPLATES: [RecipeTemplate; 3] = [
    RecipeTemplate {
        title: "{Food} with Lemon Dressing",
        steps: &[
            "Wash and dry the {food}.",
            "Whisk the {1} juice with the {2}.",
            "Dress the {food} and scatter the {3} on top.",
        ],
        time_minutes: 10,
        cost_estimate_usd: 3.5,
        extras: ["lemon", "olive oil", "sunflower seeds"],
    },
    RecipeTemplate {
        title: "Warm {Food} Stir-Fry",
        steps: &[
            "Heat a wok and fry the {1} and {2} for 30 seconds.",
            "Add the {food} and stir-fry for 5 minutes.",
            "Season with {3} and serve hot.",
        ],
        time_minutes: 15,
        cost_estimate_usd: 4.0,
        extras: ["garlic", "ginger", "soy sauce"],
    },
    RecipeTemplate {
        title: "{Food} Grain Bowl",
        steps: &[
            "Cook the {1} and let it cool slightly.",
            "Add the {food} and the {3}.",
            "Crumble the {2} over the bowl.",
        ],
        time_minutes: 20,
        cost_estimate_usd: 5.0,
        extras: ["quinoa", "feta cheese", "chickpeas"],
    },
];

const FRUIT_TEMPLATES: [RecipeTemplate; 3] = [
    RecipeTemplate {
        title: "{Food} Parfait",
        steps: &[
            "Spoon the {1} into a glass.",
            "Layer the {food} and the {2}.",
            "Finish with a little {3}.",
        ],
        time_minutes: 5,
        cost_estimate_usd: 3.0,
        extras: ["greek yogurt", "granola", "honey"],
    },
    RecipeTemplate {
        title: "{Food} Smoothie",
        steps: &[
            "Add the {food}, {1} and {2} to a blender.",
            "Blend with the {3} until smooth.",
        ],
        time_minutes: 5,
        cost_estimate_usd: 2.5,
        extras: ["banana", "milk", "ice"],
    },
    RecipeTemplate {
        title: "{Food} Oat Bowl",
        steps: &[
            "Simmer the {1} with water for 5 minutes.",
            "Stir in the {2}.",
            "Top with the {food} and the {3}.",
        ],
        time_minutes: 10,
        cost_estimate_usd: 2.5,
        extras: ["rolled oats", "cinnamon", "almonds"],
    },
];

const DESSERT_TEMPLATES: [RecipeTemplate; 3] = [
    RecipeTemplate {
        title: "Lighter {Food}",
        steps: &[
            "Mix the {1} with the {2}.",
            "Sweeten with {3} and bake for 25 minutes.",
            "Cool before serving alongside the {food}.",
        ],
        time_minutes: 40,
        cost_estimate_usd: 6.0,
        extras: ["whole wheat flour", "greek yogurt", "honey"],
    },
    RecipeTemplate {
        title: "{Food} Bites",
        steps: &[
            "Pulse the {1} and {3} in a food processor.",
            "Fold in pieces of {food} and melted {2}.",
            "Roll into bites and chill for 20 minutes.",
        ],
        time_minutes: 25,
        cost_estimate_usd: 4.5,
        extras: ["oats", "dark chocolate", "dates"],
    },
    RecipeTemplate {
        title: "{Food} with Fresh Berries",
        steps: &[
            "Plate a small portion of {food}.",
            "Add the {1} and a spoon of {2}.",
            "Garnish with {3}.",
        ],
        time_minutes: 10,
        cost_estimate_usd: 5.0,
        extras: ["mixed berries", "whipped cream", "mint"],
    },
];

const MIXED_TEMPLATES: [RecipeTemplate; 3] = [
    RecipeTemplate {
        title: "Homestyle {Food}",
        steps: &[
            "Soften the {1} and {2} in {3}.",
            "Add the {food} and cook through.",
            "Season to taste and serve.",
        ],
        time_minutes: 30,
        cost_estimate_usd: 6.0,
        extras: ["onion", "garlic", "olive oil"],
    },
    RecipeTemplate {
        title: "{Food} Bowl",
        steps: &[
            "Cook the {1}.",
            "Wilt the {2} in a hot pan and fry the {3}.",
            "Top the bowl with the {food}.",
        ],
        time_minutes: 20,
        cost_estimate_usd: 5.5,
        extras: ["brown rice", "spinach", "egg"],
    },
    RecipeTemplate {
        title: "{Food} Wrap",
        steps: &[
            "Warm the {1}.",
            "Fill with the {food} and {2}.",
            "Add {3} and roll tightly.",
        ],
        time_minutes: 15,
        cost_estimate_usd: 4.5,
        extras: ["tortilla", "lettuce", "salsa"],
    },
];

/// High-carb ingredients and their keto replacements
const KETO_SWAPS: &[(&str, &str)] = &[
    ("rice", "cauliflower rice"),
    ("brown rice", "cauliflower rice"),
    ("quinoa", "cauliflower rice"),
    ("tortilla", "lettuce leaves"),
    ("rolled oats", "chia seeds"),
    ("oats", "chopped nuts"),
    ("granola", "chopped nuts"),
    ("whole wheat flour", "almond flour"),
    ("honey", "erythritol"),
    ("banana", "avocado"),
    ("dates", "coconut flakes"),
];

/// Builds recipe cards from category templates
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeGenerator;

impl RecipeGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Three recipe cards for a food label, adjusted for dietary notes
    pub fn generate(&self, label: &str, notes: &[DietaryNote]) -> Vec<RecipeCard> {
        let category = FoodCategory::classify(label);
        let vegan = notes.contains(&DietaryNote::Vegan);
        let keto = notes.contains(&DietaryNote::Keto);

        let mut food = collapse_whitespace(&label.to_lowercase());
        if food.is_empty() {
            food = crate::constants::labels::UNIDENTIFIED_FOOD.to_string();
        }
        if vegan {
            food = vegan_substitute(&food);
        }

        debug!(food = %food, category = category.name(), "generating recipes");

        templates_for(category)
            .iter()
            .map(|template| {
                let extras: Vec<String> = template
                    .extras
                    .iter()
                    .map(|&extra| adjust_ingredient(extra, vegan, keto))
                    .collect();
                let fill = |text: &str| {
                    let mut out = text
                        .replace("{Food}", &title_case(&food))
                        .replace("{food}", &food);
                    for (i, extra) in extras.iter().enumerate() {
                        out = out.replace(&format!("{{{}}}", i + 1), extra);
                    }
                    out
                };

                let mut ingredients = Vec::with_capacity(extras.len() + 1);
                ingredients.push(food.clone());
                ingredients.extend(extras.iter().cloned());

                RecipeCard {
                    title: fill(template.title),
                    steps: template.steps.iter().map(|&step| fill(step)).collect(),
                    time_minutes: template.time_minutes,
                    cost_estimate_usd: template.cost_estimate_usd,
                    ingredients,
                }
            })
            .collect()
    }
}

fn templates_for(category: FoodCategory) -> &'static [RecipeTemplate; 3] {
    match category {
        FoodCategory::Protein => &PROTEIN_TEMPLATES,
        FoodCategory::Carb => &CARB_TEMPLATES,
        FoodCategory::Vegetable => &VEGETABLE_TEMPLATES,
        FoodCategory::Fruit => &FRUIT_TEMPLATES,
        FoodCategory::Dessert => &DESSERT_TEMPLATES,
        FoodCategory::Mixed => &MIXED_TEMPLATES,
    }
}

fn adjust_ingredient(ingredient: &str, vegan: bool, keto: bool) -> String {
    let mut adjusted = ingredient.to_string();
    if keto {
        if let Some((_, swap)) = KETO_SWAPS.iter().find(|(carb, _)| *carb == ingredient) {
            adjusted = swap.to_string();
        }
    }
    if vegan {
        adjusted = vegan_substitute(&adjusted);
    }
    adjusted
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_cards_with_food_first() {
        let cards = RecipeGenerator::new().generate("Grilled Chicken", &[]);
        assert_eq!(cards.len(), 3);
        assert_eq!(cards[0].title, "Grilled Chicken Protein Bowl");
        for card in &cards {
            assert_eq!(card.ingredients[0], "grilled chicken");
            assert!(!card.steps.is_empty());
            assert!(card.time_minutes > 0);
            assert!(card.cost_estimate_usd > 0.0);
            assert!(card.steps.iter().all(|s| !s.contains('{')));
        }
    }

    #[test]
    fn test_category_templates() {
        let generator = RecipeGenerator::new();
        assert_eq!(generator.generate("salad", &[])[0].title, "Salad with Lemon Dressing");
        assert_eq!(generator.generate("fruit bowl", &[])[1].title, "Fruit Bowl Smoothie");
        assert_eq!(generator.generate("pasta", &[])[0].title, "Classic Pasta");
        assert_eq!(generator.generate("mixed dish", &[])[0].title, "Homestyle Mixed Dish");
    }

    #[test]
    fn test_vegan_substitutes_ingredients() {
        let cards = RecipeGenerator::new().generate("grilled chicken", &[DietaryNote::Vegan]);
        assert_eq!(cards[0].title, "Grilled Tofu Protein Bowl");
        assert_eq!(cards[0].ingredients[0], "grilled tofu");

        let cards = RecipeGenerator::new().generate("pasta", &[DietaryNote::Vegan]);
        assert!(cards[0].ingredients.contains(&"vegan cheese".to_string()));
        assert!(cards[0].steps[2].contains("vegan cheese"));
    }

    #[test]
    fn test_keto_swaps_flow_into_steps() {
        let cards = RecipeGenerator::new().generate("steak", &[DietaryNote::Keto]);
        assert_eq!(cards[0].ingredients[1], "cauliflower rice");
        assert_eq!(cards[0].steps[0], "Cook the cauliflower rice until tender.");
    }

    #[test]
    fn test_empty_label() {
        let cards = RecipeGenerator::new().generate("  ", &[]);
        assert_eq!(cards[0].ingredients[0], "unidentified food");
    }
}
