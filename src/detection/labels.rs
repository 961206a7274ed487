//! Vendor label interpretation
//!
//! Remote vision services answer with open-vocabulary labels ("Fast food",
//! "Cheeseburger", "hot_dog"). These tables decide which of them are about
//! food and fold them onto the dish names the nutrition database knows.

/// Substrings that mark a label as food-related
const FOOD_KEYWORDS: &[&str] = &[
    "food", "dish", "meal", "cuisine", "recipe", "ingredient", "breakfast", "lunch", "dinner",
    "snack", "dessert", "beverage", "fruit", "vegetable", "meat", "seafood", "dairy", "grain",
    "pizza", "burger", "pasta", "salad", "sushi", "rice", "bread", "chicken", "beef", "pork",
    "fish", "egg", "cheese", "soup", "sandwich", "taco", "curry", "noodle", "cake", "cookie",
];

/// Known dishes and the label variations that name them, in priority order
const VISION_FOOD_MAPPINGS: &[(&str, &[&str])] = &[
    ("pizza", &["pizza", "pepperoni pizza", "cheese pizza", "pizza slice"]),
    ("burger", &["hamburger", "burger", "cheeseburger", "beef burger"]),
    ("pasta", &["pasta", "spaghetti", "noodles", "fettuccine", "penne"]),
    ("salad", &["salad", "green salad", "caesar salad", "garden salad"]),
    ("sushi", &["sushi", "sashimi", "maki", "nigiri", "sushi roll"]),
    ("rice", &["rice", "fried rice", "white rice", "brown rice"]),
    ("chicken", &["chicken", "grilled chicken", "fried chicken", "roasted chicken"]),
    ("steak", &["steak", "beef", "ribeye", "sirloin", "grilled beef"]),
    ("fish", &["fish", "grilled fish", "salmon", "tuna", "seafood"]),
    ("sandwich", &["sandwich", "sub", "panini", "wrap"]),
    ("soup", &["soup", "broth", "stew", "chowder"]),
    ("fruit", &["fruit", "fruit salad", "fruit bowl", "apple", "banana"]),
    ("vegetables", &["vegetables", "vegetable", "veggies", "greens"]),
    ("bread", &["bread", "toast", "baguette", "roll"]),
    ("eggs", &["eggs", "egg", "scrambled eggs", "fried egg", "omelet"]),
    ("pancakes", &["pancake", "pancakes", "waffle", "french toast"]),
    ("french fries", &["french fries", "fries", "chips", "potato fries"]),
    ("tacos", &["taco", "tacos", "burrito", "quesadilla"]),
    ("curry", &["curry", "indian food", "masala", "tikka"]),
    ("smoothie", &["smoothie", "juice", "shake", "beverage"]),
];

/// Image-classification model labels and the dish names they stand for
const MODEL_LABEL_MAPPINGS: &[(&str, &str)] = &[
    ("pizza", "pizza"),
    ("hamburger", "burger"),
    ("hot_dog", "hot dog"),
    ("fried_chicken", "fried chicken"),
    ("grilled_chicken", "grilled chicken breast"),
    ("steak", "grilled steak"),
    ("sushi", "sushi"),
    ("pasta", "pasta with sauce"),
    ("salad", "mixed salad"),
    ("soup", "vegetable soup"),
    ("ice_cream", "ice cream"),
    ("cake", "chocolate cake"),
    ("donuts", "donuts"),
    ("french_fries", "french fries"),
    ("sandwich", "sandwich"),
    ("tacos", "tacos"),
    ("burrito", "burrito"),
    ("ramen", "ramen"),
    ("pho", "pho soup"),
    ("curry", "curry"),
    ("rice", "fried rice"),
    ("noodles", "noodles"),
    ("bread", "bread"),
    ("eggs", "scrambled eggs"),
    ("pancakes", "pancakes"),
    ("waffles", "waffles"),
    ("fruit_salad", "fruit bowl"),
    ("smoothie", "smoothie bowl"),
];

/// Descriptor words stripped from vendor labels
const DESCRIPTOR_WORDS: &[&str] = &["food", "dish", "plate", "bowl", "cuisine", "meal", "recipe"];

/// Check if a vendor label is about food
pub fn is_food_related(label: &str) -> bool {
    let lower = label.to_lowercase();
    FOOD_KEYWORDS.iter().any(|keyword| lower.contains(keyword))
}

/// Map a vendor label onto a known dish, if any table entry matches.
///
/// A variation contained in the label (or the label contained in a
/// variation) wins first; otherwise any shared whole word is enough.
/// Labels made only of descriptor words ("food", "dish") map to nothing.
pub fn map_to_known_food(label: &str) -> Option<&'static str> {
    let lower = label.trim().to_lowercase();
    let words: Vec<&str> = lower
        .split_whitespace()
        .filter(|word| !DESCRIPTOR_WORDS.contains(word))
        .collect();
    if words.is_empty() {
        return None;
    }

    for (food, variations) in VISION_FOOD_MAPPINGS {
        if variations
            .iter()
            .any(|v| lower.contains(v) || v.contains(lower.as_str()))
        {
            return Some(food);
        }
    }

    for (food, variations) in VISION_FOOD_MAPPINGS {
        if variations
            .iter()
            .any(|v| v.split_whitespace().any(|vw| words.contains(&vw)))
        {
            return Some(food);
        }
    }

    None
}

/// Strip descriptor words from a vendor label and map it if possible
pub fn clean_food_name(label: &str) -> String {
    let lower = label.to_lowercase();
    let cleaned = lower
        .split_whitespace()
        .filter(|word| !DESCRIPTOR_WORDS.contains(word))
        .collect::<Vec<_>>()
        .join(" ");

    match map_to_known_food(&cleaned) {
        Some(food) => food.to_string(),
        None if cleaned.is_empty() => crate::constants::labels::MIXED_DISH.to_string(),
        None => cleaned,
    }
}

/// Map an image-classification model label onto a dish name
pub fn map_model_label(label: &str) -> String {
    let lower = label.trim().to_lowercase();

    if let Some((_, food)) = MODEL_LABEL_MAPPINGS.iter().find(|(key, _)| *key == lower) {
        return food.to_string();
    }

    if !lower.is_empty() {
        if let Some((_, food)) = MODEL_LABEL_MAPPINGS
            .iter()
            .find(|(key, _)| lower.contains(key) || key.contains(lower.as_str()))
        {
            return food.to_string();
        }
    }

    lower.replace('_', " ").trim().to_string()
}
