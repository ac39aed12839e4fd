pub mod baseline;
pub mod batch;
pub mod eligibility;
pub mod predictor;
pub mod velocity;

pub use baseline::{
    baseline_from_counts, build_baseline, build_baseline_at, daily_counts, daily_counts_seeded,
};
pub use batch::fan_out;
pub use eligibility::{check_eligibility, Eligibility};
pub use predictor::TrendEngine;
pub use velocity::{
    acceleration_at, baseline_deviation, classification_ratio, recent_growth_percent, velocity_at,
    WeeklyVelocities,
};
