//! Food label normalization
//!
//! Different methods name the same dish differently ("Cheeseburger",
//! "beef burger", "hamburger"). Votes are only comparable after folding those
//! names together. Normalization is applied until the label stops changing,
//! so `normalize_label(normalize_label(x)) == normalize_label(x)` always holds.

use crate::constants::labels;

/// Alias phrases and their canonical names; multi-word phrases come first so
/// "beef burger" is a burger before "beef" can make it a steak
const ALIASES: &[(&str, &str)] = &[
    ("beef burger", "burger"),
    ("french fries", "french fries"),
    ("chicken breast", "grilled chicken"),
    ("roasted chicken", "grilled chicken"),
    ("green salad", "salad"),
    ("caesar salad", "salad"),
    ("garden salad", "salad"),
    ("mixed salad", "salad"),
    ("fruit salad", "fruit bowl"),
    ("mixed fruit", "fruit bowl"),
    ("white rice", "rice"),
    ("brown rice", "rice"),
    ("fried rice", "rice"),
    ("pasta with sauce", "pasta"),
    ("grilled steak", "steak"),
    ("hamburger", "burger"),
    ("cheeseburger", "burger"),
    ("fries", "french fries"),
    ("chips", "french fries"),
    ("spaghetti", "pasta"),
    ("noodles", "pasta"),
    ("fettuccine", "pasta"),
    ("linguine", "pasta"),
    ("beef", "steak"),
    ("ribeye", "steak"),
    ("sirloin", "steak"),
];

/// Trailing descriptors dropped from labels
const SUFFIXES: &[&str] = &[" dish", " plate", " item", " food"];

/// Fallback labels passed through untouched
const GENERIC_LABELS: &[&str] = &[
    labels::UNIDENTIFIED_FOOD,
    labels::VEGETABLE_DISH,
    labels::MEAT_DISH,
    labels::GRAIN_DISH,
    labels::MIXED_DISH,
];

/// Normalize a food label to its canonical form
///
/// Lowercases, turns underscores into spaces, collapses whitespace, folds
/// aliases (whole phrase or whole-word sub-phrase) and strips trailing
/// descriptors. Empty input becomes "unidentified food".
pub fn normalize_label(label: &str) -> String {
    // Alias targets are fixed points and suffix stripping only shortens the
    // label, so this reaches a fixed point.
    let mut current = normalize_once(label);
    loop {
        let next = normalize_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn normalize_once(label: &str) -> String {
    let cleaned = label
        .to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if cleaned.is_empty() {
        return labels::UNIDENTIFIED_FOOD.to_string();
    }
    if GENERIC_LABELS.contains(&cleaned.as_str()) {
        return cleaned;
    }

    if let Some((_, canonical)) = ALIASES.iter().find(|(alias, _)| *alias == cleaned) {
        return canonical.to_string();
    }
    if let Some((_, canonical)) = ALIASES
        .iter()
        .find(|(alias, _)| contains_phrase(&cleaned, alias))
    {
        return canonical.to_string();
    }

    for suffix in SUFFIXES {
        if let Some(stripped) = cleaned.strip_suffix(suffix) {
            let stripped = stripped.trim();
            if !stripped.is_empty() {
                return stripped.to_string();
            }
        }
    }

    cleaned
}

/// True when `phrase` occurs in `text` on word boundaries
fn contains_phrase(text: &str, phrase: &str) -> bool {
    let words: Vec<&str> = text.split(' ').collect();
    let needle: Vec<&str> = phrase.split(' ').collect();
    words.windows(needle.len()).any(|window| window == needle.as_slice())
}
