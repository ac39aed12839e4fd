use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pattern error: {0}")]
    Pattern(#[from] PatternError),

    #[error("Prediction error: {0}")]
    Prediction(#[from] PredictionError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatternError {
    #[error("Invalid rule in {group}: {pattern} ({reason})")]
    InvalidRule {
        group: String,
        pattern: String,
        reason: String,
    },

    #[error("Pattern group is empty: {group}")]
    EmptyGroup { group: String },

    #[error("Invalid detector in {group}: {reason}")]
    InvalidDetector { group: String, reason: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    #[error("Invalid window for {field}: {days} days")]
    InvalidWindow { field: String, days: i64 },

    #[error("Signal {signal} is not a finite number")]
    NonFiniteSignal { signal: String },

    #[error("Prediction task failed for keyword {keyword_id}: {reason}")]
    TaskFailed { keyword_id: i64, reason: String },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Configuration validation failed: {reason}")]
    ValidationFailed { reason: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
