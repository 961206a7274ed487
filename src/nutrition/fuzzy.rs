//! Token-overlap matching of food names

use std::collections::BTreeSet;

/// Words that identify a food on their own; sharing one earns a bonus
pub const KEY_FOOD_WORDS: &[&str] = &[
    "chicken", "beef", "steak", "pork", "fish", "salmon", "tuna", "shrimp", "turkey", "egg",
    "eggs", "tofu", "rice", "pasta", "noodles", "pizza", "burger", "sandwich", "salad", "soup",
    "curry", "sushi", "tacos", "bread", "potato", "fries", "fruit", "apple", "banana", "cake",
    "yogurt", "oatmeal", "pancakes", "vegetables",
];

/// Lowercase alphanumeric words of a name
pub(crate) fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn token_set(text: &str) -> BTreeSet<String> {
    words(text).into_iter().collect()
}

/// Jaccard similarity of the word sets of two names, 0 when both are empty
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let left = token_set(a);
    let right = token_set(b);
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    left.intersection(&right).count() as f64 / union as f64
}

/// Jaccard similarity plus `bonus` when a shared word is a key food word,
/// capped at 1.0
pub fn match_score(query: &str, candidate: &str, bonus: f64) -> f64 {
    let left = token_set(query);
    let right = token_set(candidate);
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }
    let shared: Vec<&String> = left.intersection(&right).collect();
    let mut score = shared.len() as f64 / union as f64;
    if shared.iter().any(|w| KEY_FOOD_WORDS.contains(&w.as_str())) {
        score += bonus;
    }
    score.min(1.0)
}

/// Best-scoring candidate at or above `floor`
///
/// Candidates are visited in the given order and only a strictly better
/// score replaces the current best, so ties go to the earlier candidate.
pub fn best_fuzzy_match<'a>(
    query: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    floor: f64,
    bonus: f64,
) -> Option<(&'a str, f64)> {
    let mut best: Option<(&'a str, f64)> = None;
    for candidate in candidates {
        let score = match_score(query, candidate, bonus);
        if score >= floor && best.map_or(true, |(_, b)| score > b) {
            best = Some((candidate, score));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jaccard() {
        assert_eq!(jaccard_similarity("grilled chicken", "grilled chicken"), 1.0);
        assert!((jaccard_similarity("grilled chicken", "chicken curry") - 1.0 / 3.0).abs() < 1e-9);
        assert_eq!(jaccard_similarity("pizza", "salad"), 0.0);
        assert_eq!(jaccard_similarity("", ""), 0.0);
        assert_eq!(jaccard_similarity("Fried-Rice", "fried rice"), 1.0);
    }

    #[test]
    fn test_key_word_bonus() {
        let plain = match_score("mixed dish", "mixed fruit", 0.2);
        assert!((plain - 1.0 / 3.0).abs() < 1e-9);

        let keyed = match_score("chicken wrap", "grilled chicken", 0.2);
        assert!((keyed - (1.0 / 3.0 + 0.2)).abs() < 1e-9);

        assert_eq!(match_score("pizza", "pizza", 0.2), 1.0);
    }

    #[test]
    fn test_best_match_respects_floor() {
        let names = ["grilled chicken", "grilled salmon", "rice"];
        let (name, score) = best_fuzzy_match("grilled chicken wrap", names, 0.5, 0.2).unwrap();
        assert_eq!(name, "grilled chicken");
        assert!(score > 0.8);

        assert!(best_fuzzy_match("grilled tempeh", names, 0.5, 0.2).is_none());
        assert!(best_fuzzy_match("", names, 0.5, 0.2).is_none());
    }

    #[test]
    fn test_ties_go_to_first_candidate() {
        let names = ["chicken soup", "chicken salad"];
        let (name, _) = best_fuzzy_match("chicken", names, 0.5, 0.2).unwrap();
        assert_eq!(name, "chicken soup");
    }
}
