//! Ranking, search and filter metrics.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Static recorder for recommendation outcomes.
pub struct RecommenderMetrics;

impl RecommenderMetrics {
    /// A ranked list was returned. `strategy` is `content_based`,
    /// `text_search`, `random` or `filter`.
    pub fn record_served(strategy: &'static str, count: usize, elapsed: Duration) {
        counter!("recommendations_served_total", "strategy" => strategy).increment(1);
        histogram!("recommendation_duration_seconds", "strategy" => strategy)
            .record(elapsed.as_secs_f64());

        tracing::debug!(
            strategy,
            count,
            duration_ms = elapsed.as_millis() as u64,
            "Served ranked results"
        );
    }

    pub fn record_empty(reason: &str) {
        counter!("recommendations_empty_total", "reason" => reason.to_string()).increment(1);
    }

    pub fn record_skipped_vectors(count: usize) {
        if count > 0 {
            counter!("interest_vectors_skipped_total").increment(count as u64);
        }
    }

    /// `dependency` is `catalog_store` or `embedding`.
    pub fn record_upstream_failure(dependency: &'static str) {
        counter!("upstream_failures_total", "dependency" => dependency).increment(1);
    }

    pub fn record_relaxation(steps: usize) {
        if steps > 0 {
            counter!("filter_relaxation_steps_total").increment(steps as u64);
        }
    }

    pub fn set_catalog_size(entries: usize) {
        gauge!("catalog_entries").set(entries as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        RecommenderMetrics::record_served("content_based", 3, Duration::from_millis(12));
        RecommenderMetrics::record_empty("no subscriptions");
        RecommenderMetrics::record_skipped_vectors(0);
        RecommenderMetrics::record_upstream_failure("embedding");
        RecommenderMetrics::record_relaxation(2);
        RecommenderMetrics::set_catalog_size(1000);
    }
}
