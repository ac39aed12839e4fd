//! Gate deciding whether a keyword has enough history to be predicted at all.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;
use signalsift_core::{EligibilityConfig, Keyword, MAX_WINDOW_DAYS};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    TooYoung { age_days: i64 },
    InsufficientCoverage { scanned_days: usize, required: usize },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::Eligible => write!(f, "eligible"),
            Eligibility::TooYoung { age_days } => {
                write!(f, "keyword is only {} day(s) old", age_days)
            }
            Eligibility::InsufficientCoverage {
                scanned_days,
                required,
            } => write!(
                f,
                "only {} of {} required early days were scanned",
                scanned_days, required
            ),
        }
    }
}

/// A keyword qualifies once it is `min_age_days` old and was scanned on at least
/// `min_scanned_days` distinct days of its coverage window.
///
/// The creation day is day 1 of that window, so with the default 14 days the window runs
/// from the creation date through creation date + 13 days. A scan 14 days after creation
/// falls outside it.
pub fn check_eligibility(
    keyword: &Keyword,
    scan_dates: &BTreeSet<NaiveDate>,
    config: &EligibilityConfig,
    now: DateTime<Utc>,
) -> Eligibility {
    let age_days = (now - keyword.created_at).num_days();
    if age_days < config.min_age_days {
        return Eligibility::TooYoung { age_days };
    }

    let first_day = keyword.created_at.date_naive();
    let window_days = config.coverage_window_days.clamp(0, MAX_WINDOW_DAYS);
    let window_end = first_day + Duration::days(window_days);
    let scanned_days = scan_dates.range(first_day..window_end).count();

    if scanned_days < config.min_scanned_days {
        return Eligibility::InsufficientCoverage {
            scanned_days,
            required: config.min_scanned_days,
        };
    }

    Eligibility::Eligible
}
