//! Keyword matching.
//!
//! A keyword compiles once into a [`CompiledKeyword`] and is then reused across every post of a
//! scan. Matching never fails: anything that cannot be compiled degrades to case-insensitive
//! substring containment.

use regex::{Regex, RegexBuilder};
use signalsift_core::{Keyword, KeywordTerm};
use std::ops::Range;
use tracing::warn;

/// Separators accepted between the words of a multi-word phrase.
const WORD_SEPARATOR: &str = r"[\s\-_,.;:]+";

#[derive(Debug, Clone)]
pub enum MatchStrategy {
    Regex(Regex),
    /// Lowercased needle compared against lowercased text
    Substring(String),
}

impl MatchStrategy {
    fn is_match(&self, text: &str) -> bool {
        match self {
            MatchStrategy::Regex(re) => re.is_match(text),
            MatchStrategy::Substring(needle) => {
                !needle.is_empty() && text.to_lowercase().contains(needle.as_str())
            }
        }
    }

    fn find(&self, text: &str) -> Option<Range<usize>> {
        match self {
            MatchStrategy::Regex(re) => re.find(text).map(|m| m.range()),
            MatchStrategy::Substring(needle) if needle.is_empty() => None,
            MatchStrategy::Substring(needle) => text
                .char_indices()
                .find_map(|(start, _)| substring_at(text, start, needle)),
        }
    }

    fn count(&self, text: &str) -> usize {
        match self {
            MatchStrategy::Regex(re) => re.find_iter(text).count(),
            MatchStrategy::Substring(needle) if needle.is_empty() => 0,
            MatchStrategy::Substring(needle) => text.to_lowercase().matches(needle.as_str()).count(),
        }
    }
}

/// Span in `text` of a match starting at byte `start`.
///
/// Lowercasing may change byte lengths (`İ` becomes `i̇`), so the needle is compared
/// char by char and the span is reported in the original text's offsets.
fn substring_at(text: &str, start: usize, needle: &str) -> Option<Range<usize>> {
    let mut lowered = String::new();
    for (offset, c) in text[start..].char_indices() {
        lowered.extend(c.to_lowercase());
        if lowered.len() >= needle.len() {
            return (lowered == needle).then(|| start..start + offset + c.len_utf8());
        }
        if !needle.starts_with(lowered.as_str()) {
            return None;
        }
    }
    None
}

/// A keyword with its matchers compiled.
#[derive(Debug, Clone)]
pub struct CompiledKeyword {
    keyword: Keyword,
    strategy: MatchStrategy,
    occurrences: MatchStrategy,
    degraded: bool,
}

impl CompiledKeyword {
    pub fn compile(keyword: &Keyword) -> Self {
        let (strategy, degraded) = match &keyword.term {
            KeywordTerm::Pattern(source) => match case_insensitive(source) {
                Ok(re) => (MatchStrategy::Regex(re), false),
                Err(e) => {
                    warn!(
                        "Keyword {} regex '{}' is invalid, falling back to substring match: {}",
                        keyword.id, source, e
                    );
                    (literal_strategy(source), true)
                }
            },
            KeywordTerm::Literal(phrase) => {
                let words: Vec<&str> = phrase.split_whitespace().collect();
                let pattern = if words.len() > 1 {
                    flexible_phrase_pattern(&words)
                } else {
                    bounded_pattern(phrase.trim())
                };
                match case_insensitive(&pattern) {
                    Ok(re) => (MatchStrategy::Regex(re), false),
                    Err(_) => (literal_strategy(phrase.trim()), true),
                }
            }
        };

        let occurrences = match (&keyword.term, &strategy) {
            (KeywordTerm::Pattern(_), MatchStrategy::Regex(_)) => strategy.clone(),
            _ => literal_strategy(keyword.phrase().trim()),
        };

        Self {
            keyword: keyword.clone(),
            strategy,
            occurrences,
            degraded,
        }
    }

    pub fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    pub fn id(&self) -> i64 {
        self.keyword.id
    }

    /// True when the keyword could not be compiled as intended and matches by containment.
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn is_match(&self, text: &str) -> bool {
        if self.keyword.phrase().trim().is_empty() {
            return false;
        }
        self.strategy.is_match(text)
    }

    /// Byte span of the first match in `text`.
    pub fn find(&self, text: &str) -> Option<Range<usize>> {
        if self.keyword.phrase().trim().is_empty() {
            return None;
        }
        self.strategy.find(text)
    }

    /// Occurrences of the keyword itself: the regex for pattern keywords, the plain phrase otherwise.
    pub fn count_occurrences(&self, text: &str) -> usize {
        if self.keyword.phrase().trim().is_empty() {
            return 0;
        }
        self.occurrences.count(text)
    }
}

/// One-shot match of `text` against `keyword`.
pub fn matches(text: &str, keyword: &Keyword) -> bool {
    CompiledKeyword::compile(keyword).is_match(text)
}

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Case-insensitive containment of the escaped phrase.
fn literal_strategy(phrase: &str) -> MatchStrategy {
    match case_insensitive(&regex::escape(phrase)) {
        Ok(re) if !phrase.is_empty() => MatchStrategy::Regex(re),
        _ => MatchStrategy::Substring(phrase.to_lowercase()),
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Escapes `phrase` and adds `\b` at each edge that is a word character.
fn bounded_pattern(phrase: &str) -> String {
    let leading = phrase.chars().next().is_some_and(is_word_char);
    let trailing = phrase.chars().last().is_some_and(is_word_char);
    format!(
        "{}{}{}",
        if leading { r"\b" } else { "" },
        regex::escape(phrase),
        if trailing { r"\b" } else { "" }
    )
}

fn flexible_phrase_pattern(words: &[&str]) -> String {
    let escaped: Vec<String> = words.iter().map(|w| regex::escape(w)).collect();
    let joined = escaped.join(WORD_SEPARATOR);
    let leading = words.first().and_then(|w| w.chars().next()).is_some_and(is_word_char);
    let trailing = words.last().and_then(|w| w.chars().last()).is_some_and(is_word_char);
    format!(
        "{}{}{}",
        if leading { r"\b" } else { "" },
        joined,
        if trailing { r"\b" } else { "" }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn literal(phrase: &str) -> Keyword {
        Keyword::literal(1, phrase, Utc::now())
    }

    fn pattern(source: &str) -> Keyword {
        Keyword::pattern(2, source, Utc::now())
    }

    #[test]
    fn test_single_word_respects_word_boundaries() {
        let crm = literal("crm");
        assert!(matches("Any CRM suggestions?", &crm));
        assert!(matches("crm.", &crm));
        assert!(!matches("the scrmble", &crm));
        assert!(!matches("crms everywhere", &crm));
    }

    #[test]
    fn test_multi_word_matches_flexible_separators() {
        let tracker = literal("cpa tracker");
        assert!(matches("need a cpa tracker", &tracker));
        assert!(matches("the CPA-tracker app", &tracker));
        assert!(matches("cpa, tracker", &tracker));
        assert!(matches("cpa_tracker", &tracker));
        assert!(matches("cpa  ;  tracker", &tracker));
        assert!(!matches("cpa and tracker", &tracker));
    }

    #[test]
    fn test_literal_metacharacters_are_escaped() {
        let cpp = literal("c++");
        assert!(matches("I write c++ daily", &cpp));
        assert!(!matches("I write c daily", &cpp));

        let dotnet = literal(".net");
        assert!(matches("moving to .NET 8", &dotnet));
        assert!(!matches("a xnet thing", &dotnet));
    }

    #[test]
    fn test_regex_keyword() {
        let re = pattern(r"crm\s+(tool|app)s?");
        assert!(matches("best CRM   apps?", &re));
        assert!(!matches("crm software", &re));
    }

    #[test]
    fn test_invalid_regex_falls_back_to_containment() {
        let broken = pattern("crm(");
        let compiled = CompiledKeyword::compile(&broken);
        assert!(compiled.is_degraded());
        assert!(compiled.is_match("which CRM( is best"));
        assert!(!compiled.is_match("which crm is best"));
    }

    #[test]
    fn test_empty_phrase_never_matches() {
        assert!(!matches("anything at all", &literal("")));
        assert!(!matches("anything at all", &literal("   ")));
        assert!(!matches("anything at all", &pattern("")));
    }

    #[test]
    fn test_find_and_count_occurrences() {
        let compiled = CompiledKeyword::compile(&literal("crm"));
        let text = "My CRM is fine but crm exports and CRM imports fail";
        assert_eq!(compiled.find(text), Some(3..6));
        assert_eq!(compiled.count_occurrences(text), 3);
    }

    #[test]
    fn test_regex_occurrences_use_the_regex() {
        let compiled = CompiledKeyword::compile(&pattern(r"crm\w*"));
        assert_eq!(compiled.count_occurrences("crm, crms and crmify"), 3);
    }

    #[test]
    fn test_substring_span_survives_length_changing_lowercase() {
        let needle = MatchStrategy::Substring("crm".to_string());
        let text = "İSTANBUL crm tools";
        let span = needle.find(text).expect("span");
        assert_eq!(&text[span], "crm");

        let turkish = MatchStrategy::Substring("İstanbul".to_lowercase());
        let text = "visit İSTANBUL soon";
        assert_eq!(turkish.find(text), Some(6..15));
        assert_eq!(turkish.find("visit Ankara"), None);
    }
}
