//! Keyword mention scoring, intent classification and trend prediction.
//!
//! The member crates do the work; this crate wires them into the per-post pipeline a scanner
//! runs: score every keyword against a post, flag spam, bucket intent, and turn matches into
//! [`MatchEvent`]s for the [`TrendEngine`].

pub use signalsift_core;
pub use text_scoring;
pub use trend_engine;

pub use signalsift_core::{
    Classification, CoreError, EngineConfig, Keyword, KeywordHistory, MatchEvent, Post,
    ScoreResult, TrendLabel, TrendPrediction,
};
pub use text_scoring::{CompiledKeyword, PatternLibrary, RuleTable};
pub use trend_engine::TrendEngine;

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use text_scoring::{IntentClassifier, RelevanceScorer};
use tracing::debug;

/// One keyword matching one post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentionMatch {
    pub post_id: String,
    pub keyword_id: i64,
    pub result: ScoreResult,
    pub is_spam: bool,
    pub classification: Classification,
    pub is_asking: bool,
    pub is_problem: bool,
    pub created_at_utc: DateTime<Utc>,
}

impl MentionMatch {
    pub fn to_event(&self) -> MatchEvent {
        MatchEvent::classified(self.created_at_utc, self.classification)
    }
}

pub struct MentionAnalyzer {
    scorer: RelevanceScorer,
    classifier: IntentClassifier,
    config: EngineConfig,
}

impl MentionAnalyzer {
    pub fn new(patterns: Arc<PatternLibrary>, config: EngineConfig) -> Self {
        let scorer = RelevanceScorer::new(Arc::clone(&patterns), config.scoring.clone());
        let classifier =
            IntentClassifier::new(patterns, &config.spam, config.classifier.clone());
        Self {
            scorer,
            classifier,
            config,
        }
    }

    pub fn from_config_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let config = EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load engine config from {}", path.display()))?;
        Ok(Self::new(PatternLibrary::shared(), config))
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A trend engine sharing this analyzer's configuration.
    pub fn trend_engine(&self) -> TrendEngine {
        TrendEngine::new(self.config.clone())
    }

    /// Scores `post` against every keyword and keeps the matches.
    ///
    /// Spam is detected once per post; spam posts can still match but are flagged and
    /// classified as `All`.
    pub fn analyze_post(&self, post: &Post, keywords: &[CompiledKeyword]) -> Vec<MentionMatch> {
        let text = post.scoring_text();
        let is_spam = self.classifier.spam_filter().is_spam(&text);

        let mut matches = Vec::new();
        let mut intent = None;
        for keyword in keywords {
            let result = self.scorer.score_compiled(&text, keyword);
            if !result.matched {
                continue;
            }
            let (classification, is_asking, is_problem) =
                *intent.get_or_insert_with(|| self.intent(&text, is_spam));
            matches.push(MentionMatch {
                post_id: post.id.clone(),
                keyword_id: keyword.id(),
                result,
                is_spam,
                classification,
                is_asking,
                is_problem,
                created_at_utc: post.created_utc,
            });
        }

        if !matches.is_empty() {
            debug!("Post {} matched {} keyword(s)", post.id, matches.len());
        }
        matches
    }

    /// Compiles `keywords` once and analyzes every post against them.
    pub fn analyze_batch(&self, posts: &[Post], keywords: &[Keyword]) -> Vec<MentionMatch> {
        let compiled: Vec<CompiledKeyword> = keywords.iter().map(CompiledKeyword::compile).collect();
        posts
            .iter()
            .flat_map(|post| self.analyze_post(post, &compiled))
            .collect()
    }

    fn intent(&self, text: &str, is_spam: bool) -> (Classification, bool, bool) {
        if is_spam {
            return (Classification::All, false, false);
        }
        let scores = self.classifier.scores(text);
        (
            self.classifier.classify_unfiltered(text),
            scores.asking > 0,
            scores.problem > 0,
        )
    }
}

impl Default for MentionAnalyzer {
    fn default() -> Self {
        Self::new(PatternLibrary::shared(), EngineConfig::default())
    }
}

/// Groups matches by keyword into histories the trend engine can consume.
///
/// Keywords without any match still get an (empty) history.
pub fn collect_histories(
    keywords: &[Keyword],
    matches: &[MentionMatch],
    scan_dates: &BTreeSet<NaiveDate>,
) -> Vec<KeywordHistory> {
    keywords
        .iter()
        .map(|keyword| {
            let events = matches
                .iter()
                .filter(|m| m.keyword_id == keyword.id)
                .map(MentionMatch::to_event);
            KeywordHistory::new(keyword.clone())
                .with_events(events)
                .with_scan_dates(scan_dates.iter().copied())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_analyze_post_keeps_only_matches() {
        let analyzer = MentionAnalyzer::default();
        let keywords = vec![
            CompiledKeyword::compile(&Keyword::literal(1, "crm", created())),
            CompiledKeyword::compile(&Keyword::literal(2, "invoicing", created())),
        ];
        let post = Post::new("t3_abc", created())
            .with_title("Need a CRM recommendation")
            .with_body("We are a small agency, any suggestions?");

        let matches = analyzer.analyze_post(&post, &keywords);
        assert_eq!(matches.len(), 1);
        let m = &matches[0];
        assert_eq!(m.keyword_id, 1);
        assert_eq!(m.post_id, "t3_abc");
        assert!(!m.is_spam);
        assert_eq!(m.classification, Classification::Asking);
        assert!(m.is_asking);
        assert_eq!(m.created_at_utc, created());
    }

    #[test]
    fn test_match_becomes_classified_event() {
        let analyzer = MentionAnalyzer::default();
        let post = Post::new("t3_def", created()).with_body(
            "Looking for a CRM that handles follow ups, can anyone recommend one please?",
        );
        let matches = analyzer.analyze_batch(&[post], &[Keyword::literal(3, "crm", created())]);
        assert_eq!(matches.len(), 1);

        let event = matches[0].to_event();
        assert_eq!(event.created_at_utc, created());
        assert_eq!(event.classification, Some(Classification::Asking));
    }

    #[test]
    fn test_post_without_text_matches_nothing() {
        let analyzer = MentionAnalyzer::default();
        let post = Post::new("t3_empty", created());
        assert!(analyzer
            .analyze_batch(&[post], &[Keyword::literal(1, "crm", created())])
            .is_empty());
    }

    #[test]
    fn test_histories_group_by_keyword() {
        let keywords = vec![
            Keyword::literal(1, "crm", created()),
            Keyword::literal(2, "erp", created()),
        ];
        let analyzer = MentionAnalyzer::default();
        let posts = vec![
            Post::new("a", created()).with_title("Need a CRM, any recommendations?"),
            Post::new("b", created()).with_title("Looking for a CRM for my team, suggestions?"),
        ];
        let matches = analyzer.analyze_batch(&posts, &keywords);
        let histories = collect_histories(&keywords, &matches, &Default::default());

        assert_eq!(histories.len(), 2);
        assert_eq!(histories[0].events.len(), 2);
        assert!(histories[1].events.is_empty());
    }
}
