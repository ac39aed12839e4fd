//! Shared rule table for every matching, spam and intent decision.
//!
//! The built-in table is plain data ([`RuleTable`]); [`PatternLibrary::compile`] turns a table
//! into detectors once, and the compiled library is passed by reference to the scorer, the spam
//! filter and the classifier. Scoring and classification deliberately use separate groups
//! (`HighIntent`/`LowIntent` versus `Asking`/`Problem`) even where the phrases overlap, because
//! the two are tuned independently.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use signalsift_core::{ConfigError, PatternError};
use std::fmt;
use std::ops::Range;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Version tag of the built-in rule table.
pub const RULES_VERSION: &str = "rules_v3";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternGroup {
    HighIntent,
    LowIntent,
    Asking,
    Problem,
    Request,
    Spam,
    Noise,
}

impl PatternGroup {
    pub const ALL: [PatternGroup; 7] = [
        PatternGroup::HighIntent,
        PatternGroup::LowIntent,
        PatternGroup::Asking,
        PatternGroup::Problem,
        PatternGroup::Request,
        PatternGroup::Spam,
        PatternGroup::Noise,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PatternGroup::HighIntent => "high_intent",
            PatternGroup::LowIntent => "low_intent",
            PatternGroup::Asking => "asking",
            PatternGroup::Problem => "problem",
            PatternGroup::Request => "request",
            PatternGroup::Spam => "spam",
            PatternGroup::Noise => "noise",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PatternGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One detector in a rule table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PatternSpec {
    Regex {
        source: String,
        #[serde(default = "default_case_insensitive")]
        case_insensitive: bool,
    },
    /// A single non-whitespace character repeated at least `min_run` times in a row.
    RepeatedChar { min_run: usize },
}

fn default_case_insensitive() -> bool {
    true
}

impl PatternSpec {
    pub fn regex(source: &str) -> Self {
        PatternSpec::Regex {
            source: source.to_string(),
            case_insensitive: true,
        }
    }

    pub fn case_sensitive_regex(source: &str) -> Self {
        PatternSpec::Regex {
            source: source.to_string(),
            case_insensitive: false,
        }
    }
}

const HIGH_INTENT: &[&str] = &[
    r"\b(?:need|needs|needed)\b",
    r"\blooking for\b",
    r"\b(?:recommend|recommends|recommendation|recommendations)\b",
    r"\b(?:suggest|suggestion|suggestions)\b",
    r"\balternatives? (?:to|for)\b",
    r"\b(?:anyone|anybody) (?:know|use|tried|using)\b",
    r"\bwhat(?:'s| is| are) the best\b",
    r"\bhelp (?:me )?(?:with|find|choose|pick)\b",
    r"\b(?:struggling|frustrated) with\b",
    r"\b(?:switching|migrating) (?:from|to|away)\b",
    r"\bhow (?:do|can|should) (?:i|we)\b",
    r"\bwilling to pay\b",
];

const LOW_INTENT: &[&str] = &[
    r"\b(?:bought|purchased|subscribed to)\b",
    r"\blove (?:it|this|using)\b",
    r"\b(?:happy|satisfied) with\b",
    r"\b(?:launched|released|announcing|introducing)\b",
    r"\bcheck out\b",
    r"\bi (?:built|made|created)\b",
    r"\b(?:news|press release|case study)\b",
    r"\b(?:giveaway|for sale)\b",
];

const ASKING: &[&str] = &[
    r"\b(?:any|anyone|anybody|someone) (?:recommend|suggest|know|use|tried)",
    r"\b(?:looking for|searching for|in search of)\b",
    r"\bneed (?:a|an|some|help|advice)\b",
    r"\b(?:recommendations?|suggestions?)\b",
    r"\bwhat(?:'s| is| are) (?:the )?best\b",
    r"\balternatives? (?:to|for)\b",
    r"\bhow (?:do|can|should) (?:i|we)\b",
    r"\bis there (?:a|an|any)\b",
    r"\bwhich (?:one|tool|app|software|service|platform)\b",
    r"\bcan (?:anyone|someone|you) (?:help|recommend|suggest)\b",
];

const PROBLEM: &[&str] = &[
    r"\b(?:frustrated|frustrating|annoyed|annoying)\b",
    r"\b(?:hate|sick of|tired of|fed up)\b",
    r"\b(?:doesn't|does not|won't|can't|cannot|isn't|stopped) work(?:ing|s)?\b",
    r"\bnot working\b",
    r"\b(?:broken|buggy|keeps crashing|crashes|crashing)\b",
    r"\b(?:too expensive|overpriced|price (?:hike|increase))\b",
    r"\b(?:problems?|issues?) with\b",
    r"\b(?:terrible|awful|horrible|worst)\b",
    r"\bcancel(?:ling|ing|led)? (?:my )?subscription\b",
    r"\b(?:moving|migrating|switching) away from\b",
];

const REQUEST: &[&str] = &[
    r"\b(?:need|want|looking for)\b.{0,60}?\b(?:for|that|to)\b",
    r"\b(?:recommend|suggest|advice on|help with|opinion on)",
    r"\b(?:best|top|good|great)\b.{0,40}?\b(?:for|to|at)\b",
];

const SPAM: &[&str] = &[
    // Greeting, self-introduction, then a pitch
    r"(?s)^\s*(?:hey|hi|hello)\b.{0,80}?\bhere\b.{0,160}?\b(?:check out|our service|our services|we offer|i offer|dm me|book a call)",
    r"\b(?:dm|pm|message) me (?:for|to|if)\b",
    r"\b(?:i|we) help (?:businesses|companies|founders|startups|agencies|brands|creators|you)\b",
    r"\b(?:limited time|act now|order now|buy now)\b",
    r"\b(?:use|with) (?:my |our |the )?(?:promo|discount|coupon) code\b",
    r"\b(?:click|tap) (?:the )?link (?:in|below)\b",
    r"\bfollow (?:me|us) (?:on|for)\b",
    r"\b\d{1,3}% off\b",
    r"\bwhat you(?:'ll| will) get\s*:",
];

/// Three or more consecutive lines led by promotional emoji.
const SPAM_EMOJI_LIST: &str = r"(?m)(?:^[ \t]*(?:✅|🚀|🔥|💰|👉|💯)[^\n]*\n){2,}[ \t]*(?:✅|🚀|🔥|💰|👉|💯)";

const NOISE: &[&str] = &[
    r"(?s)^.{0,19}$",
    r"^https?://\S+$",
    r"[!?]{5,}",
];

const NOISE_MIN_CHAR_RUN: usize = 10;

/// Detector sources for every pattern group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default = "default_version")]
    pub version: String,
    pub high_intent: Vec<PatternSpec>,
    pub low_intent: Vec<PatternSpec>,
    pub asking: Vec<PatternSpec>,
    pub problem: Vec<PatternSpec>,
    pub request: Vec<PatternSpec>,
    pub spam: Vec<PatternSpec>,
    pub noise: Vec<PatternSpec>,
}

fn default_version() -> String {
    "custom".to_string()
}

fn regex_specs(sources: &[&str]) -> Vec<PatternSpec> {
    sources.iter().map(|source| PatternSpec::regex(source)).collect()
}

impl RuleTable {
    pub fn builtin() -> Self {
        let mut spam = regex_specs(SPAM);
        spam.push(PatternSpec::case_sensitive_regex(SPAM_EMOJI_LIST));

        let mut noise = regex_specs(NOISE);
        noise.push(PatternSpec::RepeatedChar {
            min_run: NOISE_MIN_CHAR_RUN,
        });

        Self {
            version: RULES_VERSION.to_string(),
            high_intent: regex_specs(HIGH_INTENT),
            low_intent: regex_specs(LOW_INTENT),
            asking: regex_specs(ASKING),
            problem: regex_specs(PROBLEM),
            request: regex_specs(REQUEST),
            spam,
            noise,
        }
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    pub fn specs(&self, group: PatternGroup) -> &[PatternSpec] {
        match group {
            PatternGroup::HighIntent => &self.high_intent,
            PatternGroup::LowIntent => &self.low_intent,
            PatternGroup::Asking => &self.asking,
            PatternGroup::Problem => &self.problem,
            PatternGroup::Request => &self.request,
            PatternGroup::Spam => &self.spam,
            PatternGroup::Noise => &self.noise,
        }
    }
}

#[derive(Debug, Clone)]
enum Detector {
    Regex(Regex),
    RepeatedChar { min_run: usize },
}

impl Detector {
    fn compile(group: PatternGroup, spec: &PatternSpec) -> Result<Self, PatternError> {
        match spec {
            PatternSpec::Regex {
                source,
                case_insensitive,
            } => RegexBuilder::new(source)
                .case_insensitive(*case_insensitive)
                .build()
                .map(Detector::Regex)
                .map_err(|e| PatternError::InvalidRule {
                    group: group.to_string(),
                    pattern: source.clone(),
                    reason: e.to_string(),
                }),
            PatternSpec::RepeatedChar { min_run } if *min_run < 2 => {
                Err(PatternError::InvalidDetector {
                    group: group.to_string(),
                    reason: format!("repeated-char run must be at least 2, got {}", min_run),
                })
            }
            PatternSpec::RepeatedChar { min_run } => Ok(Detector::RepeatedChar {
                min_run: *min_run,
            }),
        }
    }

    fn count(&self, text: &str) -> usize {
        match self {
            Detector::Regex(re) => re.find_iter(text).count(),
            Detector::RepeatedChar { min_run } => char_runs(text, *min_run).count(),
        }
    }

    fn find(&self, text: &str) -> Option<Range<usize>> {
        match self {
            Detector::Regex(re) => re.find(text).map(|m| m.range()),
            Detector::RepeatedChar { min_run } => char_runs(text, *min_run).next(),
        }
    }
}

/// Byte ranges of maximal runs of one non-whitespace character at least `min_run` long.
fn char_runs(text: &str, min_run: usize) -> impl Iterator<Item = Range<usize>> + '_ {
    let mut chars = text.char_indices().peekable();
    std::iter::from_fn(move || {
        while let Some((start, c)) = chars.next() {
            let mut len = 1;
            let mut end = start + c.len_utf8();
            while let Some(&(idx, next)) = chars.peek() {
                if next != c {
                    break;
                }
                len += 1;
                end = idx + next.len_utf8();
                chars.next();
            }
            if len >= min_run && !c.is_whitespace() {
                return Some(start..end);
            }
        }
        None
    })
}

/// A compiled [`RuleTable`], immutable and safe to share across threads.
#[derive(Debug, Clone)]
pub struct PatternLibrary {
    version: String,
    groups: Vec<Vec<Detector>>,
}

static BUILTIN: LazyLock<Arc<PatternLibrary>> = LazyLock::new(|| {
    Arc::new(
        PatternLibrary::compile(&RuleTable::builtin()).expect("built-in rule table compiles"),
    )
});

impl PatternLibrary {
    pub fn compile(table: &RuleTable) -> Result<Self, PatternError> {
        let mut groups = Vec::with_capacity(PatternGroup::ALL.len());
        for group in PatternGroup::ALL {
            let specs = table.specs(group);
            if specs.is_empty() {
                return Err(PatternError::EmptyGroup {
                    group: group.to_string(),
                });
            }
            let detectors = specs
                .iter()
                .map(|spec| Detector::compile(group, spec))
                .collect::<Result<Vec<_>, _>>()?;
            groups.push(detectors);
        }

        debug!(
            "Compiled rule table {} ({} detectors)",
            table.version,
            groups.iter().map(Vec::len).sum::<usize>()
        );

        Ok(Self {
            version: table.version.clone(),
            groups,
        })
    }

    /// The built-in library, compiled on first use.
    pub fn shared() -> Arc<PatternLibrary> {
        Arc::clone(&BUILTIN)
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn group_len(&self, group: PatternGroup) -> usize {
        self.groups[group.slot()].len()
    }

    /// Total matches of every detector in `group`.
    pub fn count_matches(&self, text: &str, group: PatternGroup) -> usize {
        self.groups[group.slot()]
            .iter()
            .map(|detector| detector.count(text))
            .sum()
    }

    pub fn any_matches(&self, text: &str, group: PatternGroup) -> bool {
        self.first_match(text, group).is_some()
    }

    /// Span of the first detector in `group` (in table order) that matches.
    pub fn first_match(&self, text: &str, group: PatternGroup) -> Option<Range<usize>> {
        self.groups[group.slot()]
            .iter()
            .find_map(|detector| detector.find(text))
    }
}
