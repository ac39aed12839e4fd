use crate::matcher::CompiledKeyword;
use crate::patterns::{PatternGroup, PatternLibrary};
use signalsift_core::{Keyword, ScoreResult, ScoringConfig};
use std::ops::Range;
use std::sync::Arc;

pub const REASON_KEYWORD_FOUND: &str = "Keyword found";
pub const REASON_INTENT_NEAR_KEYWORD: &str = "Intent word near keyword";
pub const REASON_QUESTION_NEAR_KEYWORD: &str = "Question mark near keyword";
pub const REASON_VERY_SHORT_TEXT: &str = "Very short text";
pub const REASON_REQUEST_PATTERN: &str = "Request pattern detected";

/// Scores how relevant a text is to a keyword, 0 to 100, with the rules that fired.
#[derive(Debug, Clone)]
pub struct RelevanceScorer {
    patterns: Arc<PatternLibrary>,
    config: ScoringConfig,
}

impl RelevanceScorer {
    pub fn new(patterns: Arc<PatternLibrary>, config: ScoringConfig) -> Self {
        Self { patterns, config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn score(&self, text: &str, keyword: &Keyword) -> ScoreResult {
        self.score_compiled(text, &CompiledKeyword::compile(keyword))
    }

    pub fn score_compiled(&self, text: &str, keyword: &CompiledKeyword) -> ScoreResult {
        if text.is_empty() || keyword.keyword().phrase().is_empty() || !keyword.is_match(text) {
            return ScoreResult::no_match();
        }

        let config = &self.config;
        let mut score = config.base_score;
        let mut reasons = vec![REASON_KEYWORD_FOUND.to_string()];

        let high_intent = self.patterns.count_matches(text, PatternGroup::HighIntent);
        if high_intent > 0 {
            score = score.saturating_add(weighted(config.high_intent_weight, high_intent));
            reasons.push(format!("{} high-intent signal(s)", high_intent));
        }

        let low_intent = self.patterns.count_matches(text, PatternGroup::LowIntent);
        if low_intent > 0 {
            score = score.saturating_sub(weighted(config.low_intent_penalty, low_intent));
            reasons.push(format!("{} low-intent signal(s)", low_intent));
        }

        let mut intent_signal = high_intent > 0;

        if let Some(span) = keyword.find(text) {
            let intent_window = char_window(text, span.clone(), config.intent_window_chars);
            if self
                .patterns
                .any_matches(intent_window, PatternGroup::HighIntent)
            {
                score = score.saturating_add(config.intent_near_bonus);
                reasons.push(REASON_INTENT_NEAR_KEYWORD.to_string());
                intent_signal = true;
            }

            let question_window = char_window(text, span, config.question_window_chars);
            if question_window.contains('?') {
                score = score.saturating_add(config.question_bonus);
                reasons.push(REASON_QUESTION_NEAR_KEYWORD.to_string());
            }
        }

        if text.chars().count() < config.short_text_chars {
            score = score.saturating_sub(config.short_text_penalty);
            reasons.push(REASON_VERY_SHORT_TEXT.to_string());
        }

        let mentions = keyword.count_occurrences(text);
        if mentions > 1 {
            score = score.saturating_add(weighted(config.repeat_mention_bonus, mentions - 1));
            reasons.push(format!("Keyword mentioned {} times", mentions));
        }

        if self.patterns.any_matches(text, PatternGroup::Request) {
            score = score.saturating_add(config.request_pattern_bonus);
            reasons.push(REASON_REQUEST_PATTERN.to_string());
            intent_signal = true;
        }

        let score = score.clamp(0, 100) as u8;
        let matched = score >= config.match_threshold
            && (!config.require_intent_signal || intent_signal);

        ScoreResult {
            score,
            matched,
            reasons,
        }
    }
}

fn weighted(weight: i32, count: usize) -> i32 {
    weight.saturating_mul(i32::try_from(count).unwrap_or(i32::MAX))
}

/// Slice of `text` reaching `radius` characters before and after `span`.
fn char_window(text: &str, span: Range<usize>, radius: usize) -> &str {
    let start = text[..span.start]
        .char_indices()
        .rev()
        .nth(radius.saturating_sub(1))
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    let start = if radius == 0 { span.start } else { start };
    let end = text[span.end..]
        .char_indices()
        .nth(radius)
        .map(|(idx, _)| span.end + idx)
        .unwrap_or(text.len());
    &text[start..end]
}
