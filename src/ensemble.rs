//! Weighted-vote ensemble over detection methods
//!
//! Each method that produced a detection votes for its (normalized) label
//! with `confidence × weight`. Scores are divided by the total weight of the
//! methods that answered, so a lone local classifier is not penalized for
//! the remote services being offline. Labels backed by several confident
//! methods earn an agreement bonus.
//!
//! The winning label is the one with the highest score after its bonus,
//! which keeps the final confidence monotonic: raising any single method's
//! confidence never lowers the result. This differs from the literal rule of
//! dividing agreement by the confident methods only and picking the winner
//! before the bonus; that rule lets a method gaining confidence on a rival
//! label lower the final score.

use crate::classify::normalize_label;
use crate::color::generic_category;
use crate::config::EnsembleConfig;
use crate::constants::{ensemble, labels};
use crate::detection::{Detection, DetectionMethod};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Per-method outcomes for one photo; `None` means the method had no answer
#[derive(Debug, Clone, Default)]
pub struct MethodVotes {
    votes: BTreeMap<DetectionMethod, Option<Detection>>,
}

impl MethodVotes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a method's outcome, replacing any earlier one
    pub fn record(&mut self, method: DetectionMethod, detection: Option<Detection>) {
        self.votes.insert(method, detection);
    }

    /// Outcome for one method, if it was consulted
    pub fn get(&self, method: DetectionMethod) -> Option<&Option<Detection>> {
        self.votes.get(&method)
    }

    /// Detections of the methods that answered, in voting order
    pub fn detections(&self) -> impl Iterator<Item = (DetectionMethod, &Detection)> {
        self.votes
            .iter()
            .filter_map(|(method, vote)| vote.as_ref().map(|d| (*method, d)))
    }

    /// Number of methods consulted, answered or not
    pub fn len(&self) -> usize {
        self.votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.votes.is_empty()
    }
}

impl FromIterator<(DetectionMethod, Option<Detection>)> for MethodVotes {
    fn from_iter<I: IntoIterator<Item = (DetectionMethod, Option<Detection>)>>(iter: I) -> Self {
        let mut votes = MethodVotes::new();
        for (method, detection) in iter {
            votes.record(method, detection);
        }
        votes
    }
}

/// How much the confident methods agree with each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Consensus {
    High,
    Medium,
    Low,
}

/// Combined recognition result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleResult {
    /// Winning label, or a generic category when confidence is low
    pub label: String,
    pub confidence: f32,
    /// Most confident method that voted for the winner
    pub primary_method: Option<DetectionMethod>,
    pub consensus: Consensus,
    /// Every answering method's normalized detection, most confident first
    pub predictions: Vec<Detection>,
    /// True when the label is a fallback rather than a recognized food
    pub low_confidence: bool,
}

struct Tally {
    label: String,
    score: f32,
    strong_votes: usize,
}

/// Weighted-vote combiner
#[derive(Debug, Clone)]
pub struct EnsembleCombiner {
    config: EnsembleConfig,
}

impl Default for EnsembleCombiner {
    fn default() -> Self {
        Self::new(EnsembleConfig::default())
    }
}

impl EnsembleCombiner {
    pub fn new(config: EnsembleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EnsembleConfig {
        &self.config
    }

    /// Combine per-method votes into one label and confidence
    ///
    /// # Arguments
    ///
    /// * `votes` - Outcome of every consulted method
    /// * `dominant_hue` - Photo's dominant hue, used to pick a generic
    ///   category when the combined confidence is low
    pub fn combine(&self, votes: &MethodVotes, dominant_hue: Option<f32>) -> EnsembleResult {
        // Step 1: Normalize labels before any comparison
        let predictions: Vec<Detection> = votes
            .detections()
            .map(|(method, detection)| {
                let mut normalized = detection.clone();
                normalized.food_label = normalize_label(&detection.food_label);
                normalized.source_method = method;
                normalized
            })
            .collect();

        if predictions.is_empty() {
            info!("no detection method produced a result");
            return Self::unidentified();
        }

        // Step 2: Weighted scores per label, in order of first vote
        let weights = &self.config.weights;
        let total_weight: f32 = predictions
            .iter()
            .map(|d| weights.weight(d.source_method))
            .sum();

        let mut tallies: Vec<Tally> = Vec::new();
        for detection in &predictions {
            let index = match tallies.iter().position(|t| t.label == detection.food_label) {
                Some(index) => index,
                None => {
                    tallies.push(Tally {
                        label: detection.food_label.clone(),
                        score: 0.0,
                        strong_votes: 0,
                    });
                    tallies.len() - 1
                }
            };
            let tally = &mut tallies[index];
            tally.score += detection.confidence * weights.weight(detection.source_method);
            if detection.confidence > self.config.strong_vote_confidence {
                tally.strong_votes += 1;
            }
        }
        if total_weight > 0.0 {
            for tally in &mut tallies {
                tally.score /= total_weight;
            }
        }

        // Step 3: Agreement bonus and winner
        let responded = predictions.len();
        let mut winner: Option<(&Tally, f32)> = None;
        for tally in &tallies {
            let adjusted = tally.score + self.agreement_bonus(tally.strong_votes, responded);
            debug!(label = %tally.label, score = tally.score, adjusted, "ensemble tally");
            if winner.map_or(true, |(_, best)| adjusted > best) {
                winner = Some((tally, adjusted));
            }
        }
        let Some((winning, adjusted)) = winner else {
            return Self::unidentified();
        };
        let confidence = adjusted.min(self.config.confidence_cap).clamp(0.0, 1.0);

        let primary_method = predictions
            .iter()
            .filter(|d| d.food_label == winning.label)
            .fold(None::<&Detection>, |best, d| match best {
                Some(b) if b.confidence >= d.confidence => Some(b),
                _ => Some(d),
            })
            .map(|d| d.source_method);

        let consensus = self.consensus(&predictions);

        // Step 4: Generic category when not confident enough
        let low_confidence = confidence < self.config.low_confidence;
        let label = if low_confidence {
            generic_category(dominant_hue).to_string()
        } else {
            winning.label.clone()
        };

        let mut sorted = predictions;
        sorted.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

        info!(
            label = %label,
            confidence,
            ?primary_method,
            ?consensus,
            methods = responded,
            "ensemble decision"
        );

        EnsembleResult {
            label,
            confidence,
            primary_method,
            consensus,
            predictions: sorted,
            low_confidence,
        }
    }

    fn unidentified() -> EnsembleResult {
        EnsembleResult {
            label: labels::UNIDENTIFIED_FOOD.to_string(),
            confidence: ensemble::FALLBACK_CONFIDENCE,
            primary_method: None,
            consensus: Consensus::Low,
            predictions: Vec::new(),
            low_confidence: true,
        }
    }

    fn agreement_bonus(&self, strong_votes: usize, responded: usize) -> f32 {
        if responded == 0 {
            return 0.0;
        }
        let rate = strong_votes as f32 / responded as f32;
        if rate >= self.config.high_agreement_rate {
            self.config.high_agreement_bonus
        } else if rate >= self.config.medium_agreement_rate {
            self.config.medium_agreement_bonus
        } else {
            0.0
        }
    }

    fn consensus(&self, predictions: &[Detection]) -> Consensus {
        let confident: Vec<&str> = predictions
            .iter()
            .filter(|d| d.confidence > self.config.strong_vote_confidence)
            .map(|d| d.food_label.as_str())
            .collect();
        if confident.len() < 2 {
            return Consensus::Low;
        }
        let mut unique = confident.clone();
        unique.sort_unstable();
        unique.dedup();
        match unique.len() {
            1 => Consensus::High,
            2 => Consensus::Medium,
            _ => Consensus::Low,
        }
    }
}
