//! Historical baseline: mean and spread of daily mention counts.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use signalsift_core::{DailyCounts, DateRange, HistoricalBaseline};

/// Buckets events by UTC calendar day. Only days with at least one event get a key.
pub fn daily_counts(events: &[DateTime<Utc>]) -> DailyCounts {
    let mut counts = DailyCounts::new();
    for event in events {
        *counts.entry(event.date_naive()).or_insert(0) += 1;
    }
    counts
}

/// Buckets events into a fixed window of `days` days starting at `start`, seeding every day with
/// zero. Events outside the window are ignored.
pub fn daily_counts_seeded(events: &[DateTime<Utc>], start: NaiveDate, days: u32) -> DailyCounts {
    let mut counts: DailyCounts = (0..days)
        .filter_map(|offset| start.checked_add_signed(Duration::days(i64::from(offset))))
        .map(|day| (day, 0))
        .collect();
    for event in events {
        if let Some(count) = counts.get_mut(&event.date_naive()) {
            *count += 1;
        }
    }
    counts
}

/// Mean per bucket and population standard deviation of the bucket counts.
///
/// `today` is the date range reported when there are no buckets at all.
pub fn baseline_from_counts(counts: &DailyCounts, today: NaiveDate) -> HistoricalBaseline {
    let (Some((&start, _)), Some((&end, _))) = (counts.first_key_value(), counts.last_key_value())
    else {
        return HistoricalBaseline {
            baseline: 0.0,
            standard_deviation: 0.0,
            date_range: DateRange {
                start: today,
                end: today,
            },
        };
    };

    let n = counts.len() as f64;
    let mean = counts.values().map(|&c| f64::from(c)).sum::<f64>() / n;
    let variance = counts
        .values()
        .map(|&c| (f64::from(c) - mean).powi(2))
        .sum::<f64>()
        / n;

    HistoricalBaseline {
        baseline: mean,
        standard_deviation: variance.sqrt(),
        date_range: DateRange { start, end },
    }
}

pub fn build_baseline_at(events: &[DateTime<Utc>], now: DateTime<Utc>) -> HistoricalBaseline {
    baseline_from_counts(&daily_counts(events), now.date_naive())
}

pub fn build_baseline(events: &[DateTime<Utc>]) -> HistoricalBaseline {
    build_baseline_at(events, Utc::now())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap()
    }

    fn events_with_counts(counts: &[u32]) -> Vec<DateTime<Utc>> {
        counts
            .iter()
            .enumerate()
            .flat_map(|(i, &n)| (0..n).map(move |k| at(i as u32 + 1, k)))
            .collect()
    }

    #[test]
    fn test_baseline_mean_and_population_stddev() {
        let events = events_with_counts(&[2, 3, 2, 4, 3]);
        let baseline = build_baseline_at(&events, at(20, 0));

        assert!((baseline.baseline - 2.8).abs() < 1e-9);
        assert!((baseline.standard_deviation - 0.748_331).abs() < 1e-6);
        assert_eq!(baseline.date_range.start, at(1, 0).date_naive());
        assert_eq!(baseline.date_range.end, at(5, 0).date_naive());
    }

    #[test]
    fn test_empty_days_are_not_counted() {
        // Events on the 1st and the 10th only
        let events = vec![at(1, 3), at(1, 4), at(10, 5), at(10, 6)];
        let baseline = build_baseline_at(&events, at(20, 0));
        assert_eq!(baseline.baseline, 2.0);
        assert_eq!(baseline.standard_deviation, 0.0);
    }

    #[test]
    fn test_seeded_window_counts_zero_days() {
        let events = vec![at(1, 3), at(1, 4), at(3, 5), at(9, 1)];
        let counts = daily_counts_seeded(&events, at(1, 0).date_naive(), 4);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts.values().copied().collect::<Vec<_>>(), vec![2, 0, 1, 0]);

        let baseline = baseline_from_counts(&counts, at(20, 0).date_naive());
        assert_eq!(baseline.baseline, 0.75);
    }

    #[test]
    fn test_no_events() {
        let now = at(20, 8);
        let baseline = build_baseline_at(&[], now);
        assert_eq!(baseline.baseline, 0.0);
        assert_eq!(baseline.standard_deviation, 0.0);
        assert_eq!(baseline.date_range.start, now.date_naive());
        assert_eq!(baseline.date_range.end, now.date_naive());
    }

    #[test]
    fn test_buckets_use_utc_dates() {
        let late = Utc.with_ymd_and_hms(2026, 3, 1, 23, 59, 59).unwrap();
        let early = Utc.with_ymd_and_hms(2026, 3, 2, 0, 0, 0).unwrap();
        let counts = daily_counts(&[late, early]);
        assert_eq!(counts.len(), 2);
    }
}
