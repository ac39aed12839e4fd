use crate::error::*;
use tracing::{info, warn};

pub trait ErrorExt {
    fn log_warn(&self) -> &Self;
    /// Whether a batch may drop the affected item and carry on with the rest.
    fn is_skippable(&self) -> bool;
    fn user_friendly_message(&self) -> String;
}

impl ErrorExt for CoreError {
    fn log_warn(&self) -> &Self {
        warn!("CoreError (warning): {}", self);
        self
    }

    fn is_skippable(&self) -> bool {
        // A broken rule table or config affects every item, not one
        matches!(
            self,
            CoreError::Prediction(PredictionError::NonFiniteSignal { .. })
                | CoreError::Prediction(PredictionError::TaskFailed { .. })
                | CoreError::Internal { .. }
        )
    }

    fn user_friendly_message(&self) -> String {
        match self {
            CoreError::Pattern(PatternError::InvalidRule { group, pattern, .. }) => format!(
                "The pattern '{}' in group {} is not a valid regular expression.",
                pattern, group
            ),
            CoreError::Pattern(e) => format!("The rule table is unusable: {}", e),
            CoreError::Prediction(PredictionError::TaskFailed { keyword_id, .. }) => format!(
                "Trend prediction for keyword {} failed and was skipped.",
                keyword_id
            ),
            CoreError::Prediction(e) => format!("Trend prediction was skipped: {}", e),
            CoreError::Config(ConfigError::Parse(_)) => {
                "Configuration file could not be parsed. Please check the TOML syntax.".to_string()
            }
            CoreError::Config(e) => format!("Configuration is invalid: {}", e),
            CoreError::Internal { .. } => {
                "An unexpected error occurred while analyzing mentions.".to_string()
            }
        }
    }
}

/// Logs failures of individual batch items without stopping the batch.
#[derive(Debug, Default)]
pub struct ErrorReporter;

impl ErrorReporter {
    pub fn new() -> Self {
        Self
    }

    pub fn report_warning(&self, error: &CoreError) {
        error.log_warn();
        if error.is_skippable() {
            info!("Skipping affected item: {}", error.user_friendly_message());
        }
    }
}
