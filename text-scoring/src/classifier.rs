//! Intent classification of matched posts.
//!
//! [`IntentClassifier::classify`] is the three-way bucketing used for intent ratios and views.
//! [`IntentClassifier::is_asking`] and [`IntentClassifier::is_problem`] are looser binary
//! filters: a single pattern hit is enough, and both may be true at once. They are **not**
//! guaranteed to agree with `classify`: a text with one asking hit and two problem hits
//! classifies as `Problems` yet `is_asking` returns true.

use crate::patterns::{PatternGroup, PatternLibrary};
use crate::spam::SpamFilter;
use signalsift_core::{Classification, ClassifierConfig, SpamConfig};
use std::sync::Arc;

/// Raw pattern hits behind a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct IntentScores {
    pub asking: usize,
    pub problem: usize,
}

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    patterns: Arc<PatternLibrary>,
    spam: SpamFilter,
    config: ClassifierConfig,
}

impl IntentClassifier {
    pub fn new(
        patterns: Arc<PatternLibrary>,
        spam_config: &SpamConfig,
        config: ClassifierConfig,
    ) -> Self {
        let spam = SpamFilter::new(Arc::clone(&patterns), spam_config);
        Self {
            patterns,
            spam,
            config,
        }
    }

    pub fn spam_filter(&self) -> &SpamFilter {
        &self.spam
    }

    pub fn scores(&self, text: &str) -> IntentScores {
        IntentScores {
            asking: self.patterns.count_matches(text, PatternGroup::Asking),
            problem: self.patterns.count_matches(text, PatternGroup::Problem),
        }
    }

    /// Spam always classifies as `All`.
    pub fn classify(&self, text: &str) -> Classification {
        if self.spam.is_spam(text) {
            return Classification::All;
        }
        self.classify_unfiltered(text)
    }

    /// Classifies without the spam check, for callers that already ran it.
    pub fn classify_unfiltered(&self, text: &str) -> Classification {
        let IntentScores { asking, problem } = self.scores(text);
        let strong = self.config.strong_signal_hits;
        let weak = self.config.weak_signal_hits;

        if asking >= strong {
            Classification::Asking
        } else if problem >= strong {
            Classification::Problems
        } else if asking >= weak {
            Classification::Asking
        } else if problem >= weak {
            Classification::Problems
        } else {
            Classification::All
        }
    }

    pub fn is_asking(&self, text: &str) -> bool {
        !self.spam.is_spam(text) && self.patterns.any_matches(text, PatternGroup::Asking)
    }

    pub fn is_problem(&self, text: &str) -> bool {
        !self.spam.is_spam(text) && self.patterns.any_matches(text, PatternGroup::Problem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new(
            PatternLibrary::shared(),
            &SpamConfig::default(),
            ClassifierConfig::default(),
        )
    }

    #[test]
    fn test_asking_post() {
        let text = "Looking for a CRM, can anyone recommend something simple?";
        assert_eq!(classifier().classify(text), Classification::Asking);
        assert!(classifier().is_asking(text));
    }

    #[test]
    fn test_problem_post() {
        let text = "Our CRM keeps crashing and support is terrible, so tired of it";
        assert_eq!(classifier().scores(text).asking, 0);
        assert_eq!(classifier().classify(text), Classification::Problems);
        assert!(classifier().is_problem(text));
        assert!(!classifier().is_asking(text));
    }

    #[test]
    fn test_chatter_is_all() {
        let text = "Had a long meeting about the CRM migration timeline today";
        assert_eq!(classifier().classify(text), Classification::All);
    }

    #[test]
    fn test_strong_problem_beats_weak_asking() {
        let text = "This tool is broken and the sync is buggy. Is there a fix planned?";
        let scores = classifier().scores(text);
        assert_eq!(scores, IntentScores { asking: 1, problem: 2 });
        assert_eq!(classifier().classify(text), Classification::Problems);
        // The binary filter still reports the single asking hit
        assert!(classifier().is_asking(text));
    }

    #[test]
    fn test_weak_tie_favors_asking() {
        let text = "The export feature is broken for me, is there a workaround anywhere";
        let scores = classifier().scores(text);
        assert_eq!(scores, IntentScores { asking: 1, problem: 1 });
        assert_eq!(classifier().classify(text), Classification::Asking);
    }

    #[test]
    fn test_spam_is_never_bucketed() {
        let text = "Hey, Sam here! Looking for a CRM? We offer the best one, DM me for a demo.";
        assert!(classifier().spam_filter().is_spam(text));
        assert_eq!(classifier().classify(text), Classification::All);
        assert!(!classifier().is_asking(text));
        assert!(!classifier().is_problem(text));
    }
}
