use crate::patterns::{PatternGroup, PatternLibrary};
use serde::{Deserialize, Serialize};
use signalsift_core::SpamConfig;
use std::sync::Arc;

/// Why a text was flagged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SpamVerdict {
    PromotionalPattern,
    PromotionalTerms { terms: Vec<String> },
    Noise,
}

/// Flags promotional or degenerate text, independent of any keyword.
#[derive(Debug, Clone)]
pub struct SpamFilter {
    patterns: Arc<PatternLibrary>,
    promo_terms: Vec<String>,
    promo_term_threshold: usize,
}

impl SpamFilter {
    pub fn new(patterns: Arc<PatternLibrary>, config: &SpamConfig) -> Self {
        let mut promo_terms: Vec<String> = config
            .promo_terms
            .iter()
            .map(|term| term.to_lowercase())
            .filter(|term| !term.is_empty())
            .collect();
        promo_terms.sort();
        promo_terms.dedup();

        Self {
            patterns,
            promo_terms,
            promo_term_threshold: config.promo_term_threshold,
        }
    }

    pub fn is_spam(&self, text: &str) -> bool {
        self.verdict(text).is_some()
    }

    /// Checks run in order: spam patterns, promotional terms, noise.
    pub fn verdict(&self, text: &str) -> Option<SpamVerdict> {
        if self.patterns.any_matches(text, PatternGroup::Spam) {
            return Some(SpamVerdict::PromotionalPattern);
        }

        let lowered = text.to_lowercase();
        let terms: Vec<String> = self
            .promo_terms
            .iter()
            .filter(|term| lowered.contains(term.as_str()))
            .cloned()
            .collect();
        if self.promo_term_threshold > 0 && terms.len() >= self.promo_term_threshold {
            return Some(SpamVerdict::PromotionalTerms { terms });
        }

        if self.patterns.any_matches(text.trim(), PatternGroup::Noise) {
            return Some(SpamVerdict::Noise);
        }

        None
    }
}
