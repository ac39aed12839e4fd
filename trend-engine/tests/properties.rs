use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use trend_engine::{
    acceleration_at, build_baseline_at, daily_counts, recent_growth_percent, velocity_at,
};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 20, 12, 0, 0).unwrap()
}

fn events_from(offsets: &[i64]) -> Vec<DateTime<Utc>> {
    offsets
        .iter()
        .map(|&minutes| now() - Duration::minutes(minutes))
        .collect()
}

proptest! {
    #[test]
    fn baseline_mean_lies_between_extreme_days(offsets in prop::collection::vec(0i64..86_400, 1..200)) {
        let events = events_from(&offsets);
        let counts = daily_counts(&events);
        let min = f64::from(*counts.values().min().unwrap());
        let max = f64::from(*counts.values().max().unwrap());

        let baseline = build_baseline_at(&events, now());
        prop_assert!(baseline.baseline >= min && baseline.baseline <= max);
        prop_assert!(baseline.standard_deviation >= 0.0);
        prop_assert!(baseline.standard_deviation <= max - min);
    }

    #[test]
    fn rates_are_always_finite(offsets in prop::collection::vec(-10_000i64..60_000, 0..120)) {
        let events = events_from(&offsets);
        prop_assert!(velocity_at(&events, 14, now()).is_finite());
        prop_assert!(acceleration_at(&events, 7, now()).is_finite());
        let growth = recent_growth_percent(&events, 7, now());
        prop_assert!(growth.is_finite());
        prop_assert!(growth >= -100.0);
    }
}
