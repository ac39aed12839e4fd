//! Engine configuration.
//!
//! Every knob of the scoring, classification and trend engines lives here with a default, so a
//! partial TOML file (or no file at all) yields a complete configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming a TOML config file for [`EngineConfig::load`].
pub const CONFIG_PATH_ENV: &str = "SIGNALSIFT_CONFIG";

/// Match threshold used when scoring posts for interactive review.
pub const INTERACTIVE_MATCH_THRESHOLD: u8 = 30;
/// Match threshold of the lenient background scan.
pub const BROAD_SCAN_MATCH_THRESHOLD: u8 = 20;
/// Match threshold of the strict background scan, which also requires an intent signal.
pub const STRICT_SCAN_MATCH_THRESHOLD: u8 = 35;

/// Upper bound for every day-count window, keeping date arithmetic in range.
pub const MAX_WINDOW_DAYS: i64 = 3650;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub scoring: ScoringConfig,
    pub spam: SpamConfig,
    pub classifier: ClassifierConfig,
    pub trend: TrendConfig,
    pub eligibility: EligibilityConfig,
}

/// Weights and windows of the relevance scorer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Awarded as soon as the keyword matches
    pub base_score: i32,
    /// Added per high-intent occurrence
    pub high_intent_weight: i32,
    /// Subtracted per low-intent occurrence
    pub low_intent_penalty: i32,
    pub intent_near_bonus: i32,
    /// Characters either side of the keyword searched for intent words
    pub intent_window_chars: usize,
    pub question_bonus: i32,
    /// Characters either side of the keyword searched for a question mark
    pub question_window_chars: usize,
    pub short_text_chars: usize,
    pub short_text_penalty: i32,
    /// Added per keyword occurrence beyond the first
    pub repeat_mention_bonus: i32,
    pub request_pattern_bonus: i32,
    pub match_threshold: u8,
    /// Require a high-intent, intent-near-keyword or request signal before reporting a match
    pub require_intent_signal: bool,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self::interactive()
    }
}

impl ScoringConfig {
    pub fn interactive() -> Self {
        Self {
            base_score: 20,
            high_intent_weight: 15,
            low_intent_penalty: 10,
            intent_near_bonus: 20,
            intent_window_chars: 50,
            question_bonus: 15,
            question_window_chars: 100,
            short_text_chars: 20,
            short_text_penalty: 10,
            repeat_mention_bonus: 5,
            request_pattern_bonus: 25,
            match_threshold: INTERACTIVE_MATCH_THRESHOLD,
            require_intent_signal: false,
        }
    }

    pub fn broad_scan() -> Self {
        Self {
            match_threshold: BROAD_SCAN_MATCH_THRESHOLD,
            ..Self::interactive()
        }
    }

    pub fn strict_scan() -> Self {
        Self {
            match_threshold: STRICT_SCAN_MATCH_THRESHOLD,
            require_intent_signal: true,
            ..Self::interactive()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpamConfig {
    /// Distinct promotional terms needed to flag a text
    pub promo_term_threshold: usize,
    pub promo_terms: Vec<String>,
}

impl Default for SpamConfig {
    fn default() -> Self {
        let promo_terms = [
            "free", "discount", "dm me", "i help", "perfect for", "what you'll get",
            "are you interested", "limited time", "special offer", "sign up", "link in bio",
            "check out my", "check out our", "promo code", "coupon", "% off", "affiliate",
            "book a call", "hire me", "my services", "our services", "we offer", "i offer",
            "giveaway", "subscribe",
        ];
        Self {
            promo_term_threshold: 2,
            promo_terms: promo_terms.iter().map(|t| t.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Pattern hits that settle a bucket before the other bucket is considered
    pub strong_signal_hits: usize,
    /// Pattern hits that settle a bucket once no bucket has a strong signal
    pub weak_signal_hits: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            strong_signal_hits: 2,
            weak_signal_hits: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    /// History considered when forming the baseline
    pub baseline_days: i64,
    /// Window for current velocity and intent ratios
    pub recent_window_days: i64,
    /// Length of one comparison period (acceleration, growth, weekly velocities)
    pub week_days: i64,
    /// Events needed in the baseline window before a prediction is attempted
    pub min_events: usize,
    pub confidence_threshold: u8,
    /// Deviation reported when the baseline has no variance but velocity exceeds it
    pub deviation_sentinel: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            baseline_days: 60,
            recent_window_days: 14,
            week_days: 7,
            min_events: 10,
            confidence_threshold: 70,
            deviation_sentinel: 999.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EligibilityConfig {
    pub min_age_days: i64,
    /// Days after creation inspected for scan coverage
    pub coverage_window_days: i64,
    pub min_scanned_days: usize,
}

impl Default for EligibilityConfig {
    fn default() -> Self {
        Self {
            min_age_days: 14,
            coverage_window_days: 14,
            min_scanned_days: 10,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config = Self::from_toml_str(&contents)?;
        info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Loads the file named by `SIGNALSIFT_CONFIG`, or the defaults when it is unset.
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(Path::new(&path)),
            Err(_) => {
                debug!("{} not set, using default engine configuration", CONFIG_PATH_ENV);
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let thresholds = [
            ("scoring.match_threshold", self.scoring.match_threshold),
            ("trend.confidence_threshold", self.trend.confidence_threshold),
        ];
        if let Some((field, value)) = thresholds.iter().find(|(_, v)| *v > 100) {
            return Err(invalid(field, value));
        }

        let windows = [
            ("trend.baseline_days", self.trend.baseline_days),
            ("trend.recent_window_days", self.trend.recent_window_days),
            ("trend.week_days", self.trend.week_days),
            ("eligibility.coverage_window_days", self.eligibility.coverage_window_days),
        ];
        if let Some((field, days)) = windows
            .iter()
            .find(|(_, d)| *d <= 0 || *d > MAX_WINDOW_DAYS)
        {
            return Err(invalid(field, days));
        }

        let rules = [
            (
                self.classifier.weak_signal_hits == 0
                    || self.classifier.strong_signal_hits < self.classifier.weak_signal_hits,
                "classifier needs 1 <= weak_signal_hits <= strong_signal_hits",
            ),
            (
                self.trend.baseline_days < self.trend.recent_window_days,
                "trend.baseline_days must cover trend.recent_window_days",
            ),
            (
                self.eligibility.min_scanned_days as i64 > self.eligibility.coverage_window_days,
                "eligibility.min_scanned_days exceeds coverage_window_days",
            ),
            (
                !(0..=MAX_WINDOW_DAYS).contains(&self.eligibility.min_age_days),
                "eligibility.min_age_days out of range",
            ),
            (
                !self.trend.deviation_sentinel.is_finite(),
                "trend.deviation_sentinel must be finite",
            ),
        ];
        match rules.iter().find(|(broken, _)| *broken) {
            Some((_, reason)) => Err(ConfigError::ValidationFailed {
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}

fn invalid(field: &str, value: &impl ToString) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    }
}
