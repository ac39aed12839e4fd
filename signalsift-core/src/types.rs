use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// What a keyword matches on: a literal phrase or a user-supplied regex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "source", rename_all = "lowercase")]
pub enum KeywordTerm {
    Literal(String),
    Pattern(String),
}

impl KeywordTerm {
    pub fn source(&self) -> &str {
        match self {
            KeywordTerm::Literal(phrase) | KeywordTerm::Pattern(phrase) => phrase,
        }
    }

    pub fn is_regex(&self) -> bool {
        matches!(self, KeywordTerm::Pattern(_))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: i64,
    pub term: KeywordTerm,
    pub created_at: DateTime<Utc>,
}

impl Keyword {
    /// Builds a keyword from the `{phrase, isRegex}` shape used by keyword stores.
    pub fn new(id: i64, phrase: impl Into<String>, is_regex: bool, created_at: DateTime<Utc>) -> Self {
        let phrase = phrase.into();
        let term = if is_regex {
            KeywordTerm::Pattern(phrase)
        } else {
            KeywordTerm::Literal(phrase)
        };
        Self {
            id,
            term,
            created_at,
        }
    }

    pub fn literal(id: i64, phrase: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::new(id, phrase, false, created_at)
    }

    pub fn pattern(id: i64, source: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self::new(id, source, true, created_at)
    }

    pub fn phrase(&self) -> &str {
        self.term.source()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: Option<String>,
    pub body: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub subreddit: Option<String>,
    pub platform: Option<String>,
    pub author: Option<String>,
}

impl Post {
    pub fn new(id: impl Into<String>, created_utc: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: None,
            body: None,
            created_utc,
            subreddit: None,
            platform: None,
            author: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Title and body joined by a single space; missing parts count as empty.
    pub fn scoring_text(&self) -> String {
        format!(
            "{} {}",
            self.title.as_deref().unwrap_or_default(),
            self.body.as_deref().unwrap_or_default()
        )
    }
}

/// Relevance of one post to one keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub matched: bool,
    pub reasons: Vec<String>,
}

impl ScoreResult {
    pub fn no_match() -> Self {
        Self {
            score: 0,
            matched: false,
            reasons: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Asking,
    Problems,
    All,
}

/// A prior keyword match, as recorded by the scan that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub created_at_utc: DateTime<Utc>,
    pub classification: Option<Classification>,
}

impl MatchEvent {
    pub fn new(created_at_utc: DateTime<Utc>) -> Self {
        Self {
            created_at_utc,
            classification: None,
        }
    }

    pub fn classified(created_at_utc: DateTime<Utc>, classification: Classification) -> Self {
        Self {
            created_at_utc,
            classification: Some(classification),
        }
    }
}

/// Event counts per UTC calendar day.
pub type DailyCounts = BTreeMap<NaiveDate, u32>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalBaseline {
    /// Mean events per counted day
    pub baseline: f64,
    /// Population standard deviation of the per-day counts
    pub standard_deviation: f64,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Exploding,
    Rising,
    Emerging,
    Declining,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSignals {
    pub velocity: f64,
    pub acceleration: f64,
    pub asking_ratio: f64,
    pub problem_ratio: f64,
    pub recent_growth_percent: f64,
    pub baseline_deviation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendTimeline {
    /// Historical mentions per day
    pub baseline: f64,
    /// Mentions per day over the recent window
    pub current: f64,
    pub predicted_velocity: f64,
    /// Mentions expected over the next week
    pub predicted_mentions: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPrediction {
    pub keyword_id: i64,
    pub confidence: u8,
    pub label: TrendLabel,
    pub signals: TrendSignals,
    pub timeline: TrendTimeline,
    pub reasons: Vec<String>,
}

/// Everything the trend engine needs to know about one keyword.
#[derive(Debug, Clone)]
pub struct KeywordHistory {
    pub keyword: Keyword,
    pub events: Vec<MatchEvent>,
    /// UTC days on which a scan ran for this keyword
    pub scan_dates: BTreeSet<NaiveDate>,
}

impl KeywordHistory {
    pub fn new(keyword: Keyword) -> Self {
        Self {
            keyword,
            events: Vec::new(),
            scan_dates: BTreeSet::new(),
        }
    }

    pub fn with_events(mut self, events: impl IntoIterator<Item = MatchEvent>) -> Self {
        self.events.extend(events);
        self
    }

    pub fn with_scan_dates(mut self, dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        self.scan_dates.extend(dates);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_keyword_from_store_shape() {
        let literal = Keyword::new(1, "crm", false, ts());
        assert_eq!(literal.term, KeywordTerm::Literal("crm".to_string()));
        assert!(!literal.term.is_regex());

        let pattern = Keyword::new(2, r"crm\s+tool", true, ts());
        assert!(pattern.term.is_regex());
        assert_eq!(pattern.phrase(), r"crm\s+tool");
    }

    #[test]
    fn test_scoring_text_joins_title_and_body() {
        let post = Post::new("p1", ts())
            .with_title("Need a CRM")
            .with_body("for my shop");
        assert_eq!(post.scoring_text(), "Need a CRM for my shop");

        let title_only = Post::new("p2", ts()).with_title("Just a title");
        assert_eq!(title_only.scoring_text(), "Just a title ");

        let empty = Post::new("p3", ts());
        assert_eq!(empty.scoring_text(), " ");
    }

    #[test]
    fn test_labels_serialize_lowercase() {
        assert_eq!(
            serde_json::to_string(&Classification::Problems).unwrap(),
            "\"problems\""
        );
        assert_eq!(
            serde_json::to_string(&TrendLabel::Exploding).unwrap(),
            "\"exploding\""
        );
    }
}
