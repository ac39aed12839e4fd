//! Parallel trend prediction over a keyword set.

use crate::predictor::TrendEngine;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use signalsift_core::{CoreError, ErrorReporter, KeywordHistory, PredictionError, TrendPrediction};
use std::sync::Arc;
use tracing::info;

/// Runs `task` for every `(keyword_id, item)` on the blocking pool and keeps the successes.
///
/// Errors and panics are reported as warnings and dropped; they never abort the rest of the batch.
pub async fn fan_out<T, R, F>(items: Vec<(i64, T)>, task: F) -> Vec<R>
where
    T: Send + 'static,
    R: Send + 'static,
    F: Fn(T) -> Result<Option<R>, CoreError> + Send + Sync + 'static,
{
    let task = Arc::new(task);
    let handles: Vec<_> = items
        .into_iter()
        .map(|(keyword_id, item)| {
            let task = Arc::clone(&task);
            let handle = tokio::task::spawn_blocking(move || task(item));
            async move { (keyword_id, handle.await) }
        })
        .collect();

    let reporter = ErrorReporter::new();
    let mut results = Vec::new();
    for (keyword_id, outcome) in join_all(handles).await {
        match outcome {
            Ok(Ok(Some(result))) => results.push(result),
            Ok(Ok(None)) => {}
            Ok(Err(e)) => reporter.report_warning(&e),
            Err(join_error) => {
                let e = CoreError::from(PredictionError::TaskFailed {
                    keyword_id,
                    reason: join_error.to_string(),
                });
                reporter.report_warning(&e);
            }
        }
    }
    results
}

impl TrendEngine {
    /// Predicts every keyword in parallel. Ordering follows the input, minus keywords without a
    /// prediction.
    pub async fn predict_batch(
        self: Arc<Self>,
        histories: Vec<KeywordHistory>,
        now: DateTime<Utc>,
    ) -> Vec<TrendPrediction> {
        let total = histories.len();
        info!("Predicting trends for {} keyword(s)", total);

        let items = histories
            .into_iter()
            .map(|history| (history.keyword.id, history))
            .collect();
        let predictions =
            fan_out(items, move |history: KeywordHistory| self.predict_at(&history, now)).await;

        info!(
            "Trend prediction finished: {} of {} keyword(s) trending",
            predictions.len(),
            total
        );
        predictions
    }
}
