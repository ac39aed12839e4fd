pub mod classifier;
pub mod matcher;
pub mod patterns;
pub mod scorer;
pub mod spam;

pub use classifier::{IntentClassifier, IntentScores};
pub use matcher::{matches, CompiledKeyword, MatchStrategy};
pub use patterns::{PatternGroup, PatternLibrary, PatternSpec, RuleTable, RULES_VERSION};
pub use scorer::RelevanceScorer;
pub use spam::{SpamFilter, SpamVerdict};

use signalsift_core::{
    Classification, ClassifierConfig, Keyword, ScoreResult, ScoringConfig, SpamConfig,
};

/// Scores `text` against `keyword` with the built-in rules and default weights.
pub fn score(text: &str, keyword: &Keyword) -> ScoreResult {
    RelevanceScorer::new(PatternLibrary::shared(), ScoringConfig::default()).score(text, keyword)
}

/// Spam check with the built-in rules and default promotional terms.
pub fn is_spam(text: &str) -> bool {
    SpamFilter::new(PatternLibrary::shared(), &SpamConfig::default()).is_spam(text)
}

/// Three-way intent classification with the built-in rules.
pub fn classify(text: &str) -> Classification {
    default_classifier().classify(text)
}

/// Single-hit asking check; may disagree with [`classify`].
pub fn is_asking(text: &str) -> bool {
    default_classifier().is_asking(text)
}

/// Single-hit problem check; may disagree with [`classify`].
pub fn is_problem(text: &str) -> bool {
    default_classifier().is_problem(text)
}

fn default_classifier() -> IntentClassifier {
    IntentClassifier::new(
        PatternLibrary::shared(),
        &SpamConfig::default(),
        ClassifierConfig::default(),
    )
}
