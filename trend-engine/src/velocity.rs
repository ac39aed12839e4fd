//! Mention rates over sliding windows ending at a reference instant.
//!
//! The current window is closed at both ends (`[now - period, now]`); earlier windows are
//! half-open (`[start, end)`) so no event lands in two adjacent windows.

use chrono::{DateTime, Duration, Utc};
use signalsift_core::{Classification, MatchEvent};

fn count_between(events: &[DateTime<Utc>], start: DateTime<Utc>, end: DateTime<Utc>) -> usize {
    events.iter().filter(|&&t| t >= start && t < end).count()
}

fn count_recent(events: &[DateTime<Utc>], period_days: i64, now: DateTime<Utc>) -> usize {
    let start = now - Duration::days(period_days);
    events.iter().filter(|&&t| t >= start && t <= now).count()
}

/// Mentions per day over the last `period_days` days.
pub fn velocity_at(events: &[DateTime<Utc>], period_days: i64, now: DateTime<Utc>) -> f64 {
    if period_days <= 0 {
        return 0.0;
    }
    count_recent(events, period_days, now) as f64 / period_days as f64
}

/// Per-day rate of the window `[now - (offset + 1) * week, now - offset * week)`.
fn prior_week_rate(events: &[DateTime<Utc>], week_days: i64, offset: i64, now: DateTime<Utc>) -> f64 {
    if week_days <= 0 {
        return 0.0;
    }
    let end = now - Duration::days(week_days * offset);
    let start = end - Duration::days(week_days);
    count_between(events, start, end) as f64 / week_days as f64
}

/// Change in daily rate between the latest week and the week before it.
pub fn acceleration_at(events: &[DateTime<Utc>], week_days: i64, now: DateTime<Utc>) -> f64 {
    velocity_at(events, week_days, now) - prior_week_rate(events, week_days, 1, now)
}

/// Standard deviations between `current` and `baseline`.
///
/// With zero spread any rise above the baseline reports `sentinel`.
pub fn baseline_deviation(current: f64, baseline: f64, standard_deviation: f64, sentinel: f64) -> f64 {
    if standard_deviation > 0.0 {
        (current - baseline) / standard_deviation
    } else if current > baseline {
        sentinel
    } else {
        0.0
    }
}

/// Week-over-week growth of raw counts, as a percentage.
pub fn recent_growth_percent(events: &[DateTime<Utc>], week_days: i64, now: DateTime<Utc>) -> f64 {
    if week_days <= 0 {
        return 0.0;
    }
    let current = count_recent(events, week_days, now) as f64;
    let start = now - Duration::days(week_days);
    let previous = count_between(events, start - Duration::days(week_days), start) as f64;

    if previous == 0.0 {
        if current > 0.0 {
            100.0
        } else {
            0.0
        }
    } else {
        (current - previous) / previous * 100.0
    }
}

/// Daily rates of the three most recent weeks, newest first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeeklyVelocities {
    pub week1: f64,
    pub week2: f64,
    pub week3: f64,
}

impl WeeklyVelocities {
    pub fn at(events: &[DateTime<Utc>], week_days: i64, now: DateTime<Utc>) -> Self {
        Self {
            week1: velocity_at(events, week_days, now),
            week2: prior_week_rate(events, week_days, 1, now),
            week3: prior_week_rate(events, week_days, 2, now),
        }
    }

    pub fn three_week_growth(&self) -> bool {
        self.week1 > self.week2 && self.week2 > self.week3 && self.week3 > 0.0
    }

    pub fn two_week_growth(&self) -> bool {
        self.week1 > self.week2 && self.week2 > 0.0
    }
}

/// Percentage of events in the last `period_days` days carrying `classification`.
///
/// Unclassified events count toward the total only.
pub fn classification_ratio(
    events: &[MatchEvent],
    classification: Classification,
    period_days: i64,
    now: DateTime<Utc>,
) -> f64 {
    let start = now - Duration::days(period_days);
    let recent: Vec<&MatchEvent> = events
        .iter()
        .filter(|e| e.created_at_utc >= start && e.created_at_utc <= now)
        .collect();
    if recent.is_empty() {
        return 0.0;
    }
    let hits = recent
        .iter()
        .filter(|e| e.classification == Some(classification))
        .count();
    hits as f64 / recent.len() as f64 * 100.0
}
