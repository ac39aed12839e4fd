use crate::baseline::build_baseline_at;
use crate::eligibility::check_eligibility;
use crate::velocity::{
    acceleration_at, baseline_deviation, classification_ratio, recent_growth_percent, velocity_at,
    WeeklyVelocities,
};
use chrono::{DateTime, Duration, Utc};
use signalsift_core::{
    Classification, CoreError, EligibilityConfig, EngineConfig, KeywordHistory, MatchEvent,
    PredictionError, TrendConfig, TrendLabel, TrendPrediction, TrendSignals, TrendTimeline,
    MAX_WINDOW_DAYS,
};
use tracing::debug;

/// Turns a keyword's match history into a [`TrendPrediction`] when enough signals agree.
#[derive(Debug, Clone, Default)]
pub struct TrendEngine {
    trend: TrendConfig,
    eligibility: EligibilityConfig,
}

impl TrendEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            trend: config.trend,
            eligibility: config.eligibility,
        }
    }

    pub fn predict(&self, history: &KeywordHistory) -> Result<Option<TrendPrediction>, CoreError> {
        self.predict_at(history, Utc::now())
    }

    /// Predicts the trend for one keyword as of `now`.
    ///
    /// `Ok(None)` covers every "not enough evidence" outcome: an ineligible keyword, too few
    /// events, an empty baseline or a confidence under the threshold.
    pub fn predict_at(
        &self,
        history: &KeywordHistory,
        now: DateTime<Utc>,
    ) -> Result<Option<TrendPrediction>, CoreError> {
        self.check_windows()?;
        let keyword_id = history.keyword.id;

        let eligibility =
            check_eligibility(&history.keyword, &history.scan_dates, &self.eligibility, now);
        if !eligibility.is_eligible() {
            debug!("Skipping keyword {}: {}", keyword_id, eligibility);
            return Ok(None);
        }

        let window_start = now - Duration::days(self.trend.baseline_days);
        let events: Vec<MatchEvent> = history
            .events
            .iter()
            .filter(|e| e.created_at_utc >= window_start && e.created_at_utc <= now)
            .copied()
            .collect();
        if events.len() < self.trend.min_events {
            debug!(
                "Skipping keyword {}: {} event(s) in the last {} days",
                keyword_id,
                events.len(),
                self.trend.baseline_days
            );
            return Ok(None);
        }

        let timestamps: Vec<DateTime<Utc>> = events.iter().map(|e| e.created_at_utc).collect();
        let baseline = build_baseline_at(&timestamps, now);
        if baseline.baseline <= 0.0 {
            return Ok(None);
        }

        let signals = self.signals(
            &events,
            &timestamps,
            baseline.baseline,
            baseline.standard_deviation,
            now,
        );
        ensure_finite(&signals)?;

        let weeks = WeeklyVelocities::at(&timestamps, self.trend.week_days, now);
        let assessment = assess(&signals, baseline.baseline, &weeks);
        let confidence = assessment.confidence();
        if confidence < self.trend.confidence_threshold {
            debug!(
                "Keyword {} below confidence threshold ({} < {})",
                keyword_id, confidence, self.trend.confidence_threshold
            );
            return Ok(None);
        }

        let week = self.trend.week_days as f64;
        let predicted_velocity = signals.velocity + signals.acceleration * week;
        let timeline = TrendTimeline {
            baseline: baseline.baseline,
            current: signals.velocity,
            predicted_velocity,
            predicted_mentions: (predicted_velocity * week).max(0.0),
        };
        let label = assessment.label.unwrap_or(TrendLabel::Rising);
        debug!(
            "Keyword {} predicted {:?} with confidence {}",
            keyword_id, label, confidence
        );

        Ok(Some(TrendPrediction {
            keyword_id,
            confidence,
            label,
            signals,
            timeline,
            reasons: assessment.reasons,
        }))
    }

    fn check_windows(&self) -> Result<(), PredictionError> {
        let windows = [
            ("trend.baseline_days", self.trend.baseline_days),
            ("trend.recent_window_days", self.trend.recent_window_days),
            ("trend.week_days", self.trend.week_days),
            ("eligibility.coverage_window_days", self.eligibility.coverage_window_days),
        ];
        for (field, days) in windows {
            if days <= 0 || days > MAX_WINDOW_DAYS {
                return Err(PredictionError::InvalidWindow {
                    field: field.to_string(),
                    days,
                });
            }
        }
        Ok(())
    }

    fn signals(
        &self,
        events: &[MatchEvent],
        timestamps: &[DateTime<Utc>],
        baseline: f64,
        standard_deviation: f64,
        now: DateTime<Utc>,
    ) -> TrendSignals {
        let recent = self.trend.recent_window_days;
        let velocity = velocity_at(timestamps, recent, now);

        TrendSignals {
            velocity,
            acceleration: acceleration_at(timestamps, self.trend.week_days, now),
            asking_ratio: classification_ratio(events, Classification::Asking, recent, now),
            problem_ratio: classification_ratio(events, Classification::Problems, recent, now),
            recent_growth_percent: recent_growth_percent(timestamps, self.trend.week_days, now),
            baseline_deviation: baseline_deviation(
                velocity,
                baseline,
                standard_deviation,
                self.trend.deviation_sentinel,
            ),
        }
    }
}

fn ensure_finite(signals: &TrendSignals) -> Result<(), PredictionError> {
    let values = [
        ("velocity", signals.velocity),
        ("acceleration", signals.acceleration),
        ("asking_ratio", signals.asking_ratio),
        ("problem_ratio", signals.problem_ratio),
        ("recent_growth_percent", signals.recent_growth_percent),
        ("baseline_deviation", signals.baseline_deviation),
    ];
    match values.iter().find(|(_, value)| !value.is_finite()) {
        Some((signal, _)) => Err(PredictionError::NonFiniteSignal {
            signal: signal.to_string(),
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Default)]
struct Assessment {
    points: u32,
    label: Option<TrendLabel>,
    reasons: Vec<String>,
}

impl Assessment {
    fn add(&mut self, points: u32, reason: String) {
        self.points += points;
        self.reasons.push(reason);
    }

    /// Sets the label only when no earlier signal chose one.
    fn suggest(&mut self, label: TrendLabel) {
        self.label.get_or_insert(label);
    }

    fn force(&mut self, label: TrendLabel) {
        self.label = Some(label);
    }

    fn confidence(&self) -> u8 {
        self.points.min(100) as u8
    }
}

/// Six independent tiered checks, evaluated in a fixed order so reasons read consistently.
fn assess(signals: &TrendSignals, baseline: f64, weeks: &WeeklyVelocities) -> Assessment {
    let mut a = Assessment::default();

    let deviation = signals.baseline_deviation;
    let deviation_points = if deviation >= 3.0 {
        30
    } else if deviation >= 2.0 {
        20
    } else if deviation >= 1.0 {
        10
    } else {
        0
    };
    if deviation_points > 0 {
        a.add(
            deviation_points,
            format!("Mentions {:.1} standard deviations above baseline", deviation),
        );
    }

    let acceleration = signals.acceleration;
    if acceleration > baseline * 0.5 {
        a.add(
            25,
            format!("Mentions accelerating sharply (+{:.2}/day week over week)", acceleration),
        );
        a.force(TrendLabel::Exploding);
    } else if acceleration > baseline * 0.2 {
        a.add(
            15,
            format!("Mentions accelerating (+{:.2}/day week over week)", acceleration),
        );
        a.suggest(TrendLabel::Rising);
    } else if acceleration < -baseline * 0.2 {
        a.add(
            10,
            format!("Mentions decelerating ({:.2}/day week over week)", acceleration),
        );
        a.force(TrendLabel::Declining);
    }

    let asking = signals.asking_ratio;
    if asking >= 30.0 {
        a.add(20, format!("{:.0}% of recent mentions ask for a solution", asking));
        a.suggest(TrendLabel::Rising);
    } else if asking >= 20.0 {
        a.add(10, format!("{:.0}% of recent mentions ask for a solution", asking));
    }

    let problem = signals.problem_ratio;
    if problem >= 25.0 {
        a.add(15, format!("{:.0}% of recent mentions describe a problem", problem));
        a.suggest(TrendLabel::Emerging);
    } else if problem >= 15.0 {
        a.add(8, format!("{:.0}% of recent mentions describe a problem", problem));
    }

    let growth = signals.recent_growth_percent;
    if growth >= 50.0 {
        a.add(20, format!("Mentions up {:.0}% over the previous week", growth));
        a.suggest(TrendLabel::Rising);
    } else if growth >= 25.0 {
        a.add(10, format!("Mentions up {:.0}% over the previous week", growth));
    } else if growth <= -25.0 {
        a.add(5, format!("Mentions down {:.0}% from the previous week", growth.abs()));
        a.force(TrendLabel::Declining);
    }

    if weeks.three_week_growth() {
        a.add(15, "Three consecutive weeks of growth".to_string());
        a.force(TrendLabel::Exploding);
    } else if weeks.two_week_growth() {
        a.add(8, "Two consecutive weeks of growth".to_string());
        a.suggest(TrendLabel::Rising);
    }

    a
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> TrendSignals {
        TrendSignals {
            velocity: 1.0,
            acceleration: 0.0,
            asking_ratio: 0.0,
            problem_ratio: 0.0,
            recent_growth_percent: 0.0,
            baseline_deviation: 0.0,
        }
    }

    fn flat_weeks() -> WeeklyVelocities {
        WeeklyVelocities {
            week1: 1.0,
            week2: 1.0,
            week3: 1.0,
        }
    }

    #[test]
    fn test_quiet_signals_score_nothing() {
        let a = assess(&quiet(), 1.0, &flat_weeks());
        assert_eq!(a.confidence(), 0);
        assert!(a.label.is_none());
        assert!(a.reasons.is_empty());
    }

    #[test]
    fn test_deviation_tiers() {
        for (deviation, points) in [(0.99, 0), (1.0, 10), (2.5, 20), (3.0, 30), (999.0, 30)] {
            let signals = TrendSignals {
                baseline_deviation: deviation,
                ..quiet()
            };
            assert_eq!(assess(&signals, 1.0, &flat_weeks()).confidence(), points);
        }
    }

    #[test]
    fn test_problem_signal_labels_emerging() {
        let signals = TrendSignals {
            problem_ratio: 40.0,
            ..quiet()
        };
        let a = assess(&signals, 1.0, &flat_weeks());
        assert_eq!(a.confidence(), 15);
        assert_eq!(a.label, Some(TrendLabel::Emerging));
    }

    #[test]
    fn test_first_suggested_label_wins() {
        // Asking suggests rising before problem could suggest emerging
        let signals = TrendSignals {
            asking_ratio: 35.0,
            problem_ratio: 30.0,
            ..quiet()
        };
        let a = assess(&signals, 1.0, &flat_weeks());
        assert_eq!(a.label, Some(TrendLabel::Rising));
        assert_eq!(a.confidence(), 35);
    }

    #[test]
    fn test_three_week_growth_forces_exploding() {
        let signals = TrendSignals {
            problem_ratio: 30.0,
            ..quiet()
        };
        let weeks = WeeklyVelocities {
            week1: 3.0,
            week2: 2.0,
            week3: 1.0,
        };
        let a = assess(&signals, 2.0, &weeks);
        assert_eq!(a.label, Some(TrendLabel::Exploding));
        assert_eq!(a.reasons.last().unwrap(), "Three consecutive weeks of growth");
    }

    #[test]
    fn test_decline_forces_declining() {
        let signals = TrendSignals {
            acceleration: -2.0,
            recent_growth_percent: -60.0,
            asking_ratio: 50.0,
            ..quiet()
        };
        let a = assess(&signals, 4.0, &flat_weeks());
        assert_eq!(a.confidence(), 35);
        assert_eq!(a.label, Some(TrendLabel::Declining));
        assert_eq!(a.reasons[2], "Mentions down 60% from the previous week");
    }

    #[test]
    fn test_confidence_is_clamped() {
        let signals = TrendSignals {
            velocity: 10.0,
            acceleration: 5.0,
            asking_ratio: 60.0,
            problem_ratio: 60.0,
            recent_growth_percent: 200.0,
            baseline_deviation: 5.0,
        };
        let weeks = WeeklyVelocities {
            week1: 9.0,
            week2: 4.0,
            week3: 1.0,
        };
        let a = assess(&signals, 2.0, &weeks);
        assert_eq!(a.points, 125);
        assert_eq!(a.confidence(), 100);
        assert_eq!(a.reasons.len(), 6);
    }

    #[test]
    fn test_non_finite_signal_is_rejected() {
        let signals = TrendSignals {
            acceleration: f64::NAN,
            ..quiet()
        };
        assert_eq!(
            ensure_finite(&signals),
            Err(PredictionError::NonFiniteSignal {
                signal: "acceleration".to_string()
            })
        );
    }

    #[test]
    fn test_invalid_window_is_an_error() {
        let mut config = EngineConfig::default();
        config.trend.week_days = 0;
        let engine = TrendEngine::new(config);
        let history = KeywordHistory::new(signalsift_core::Keyword::literal(1, "crm", Utc::now()));
        let err = engine.predict_at(&history, Utc::now()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Prediction(PredictionError::InvalidWindow { days: 0, .. })
        ));
    }

    #[test]
    fn test_oversized_windows_are_errors_not_panics() {
        let now = Utc::now();
        let keyword = signalsift_core::Keyword::literal(1, "crm", now - Duration::days(30));
        let history = KeywordHistory::new(keyword);

        let mut config = EngineConfig::default();
        config.trend.baseline_days = 1_000_000_000_000_000;
        let err = TrendEngine::new(config).predict_at(&history, now).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Prediction(PredictionError::InvalidWindow { ref field, .. })
                if field == "trend.baseline_days"
        ));

        let mut config = EngineConfig::default();
        config.eligibility.coverage_window_days = i64::MAX;
        assert!(TrendEngine::new(config).predict_at(&history, now).is_err());
    }
}
