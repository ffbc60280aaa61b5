//! In-process prediction statistics.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Per-model counters and latency samples
#[derive(Debug, Default, Clone)]
struct ModelCounters {
    predictions: u64,
    positives: u64,
    latencies_us: Vec<u64>,
}

/// Metrics collector for served predictions
pub struct PredictionMetrics {
    /// Total predictions attempted
    pub requests: AtomicU64,
    /// Total failed predictions
    pub failures: AtomicU64,
    /// Failures by error kind
    failures_by_kind: RwLock<HashMap<String, u64>>,
    /// Per-model successful predictions
    models: RwLock<HashMap<String, ModelCounters>>,
    /// Positive-class probability buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Predictions served without a probability
    unscored: AtomicU64,
    start_time: Instant,
}

impl PredictionMetrics {
    pub fn new() -> Self {
        Self {
            requests: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            failures_by_kind: RwLock::new(HashMap::new()),
            models: RwLock::new(HashMap::new()),
            probability_buckets: RwLock::new([0; 10]),
            unscored: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Record a successful prediction
    pub fn record_prediction(
        &self,
        model: &str,
        latency: Duration,
        positive: bool,
        probability: Option<f64>,
    ) {
        self.requests.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut models) = self.models.write() {
            let counters = models.entry(model.to_string()).or_default();
            counters.predictions += 1;
            if positive {
                counters.positives += 1;
            }
            counters.latencies_us.push(latency.as_micros() as u64);
            // Keep only the most recent samples
            if counters.latencies_us.len() > 1000 {
                counters.latencies_us.drain(0..500);
            }
        }

        match probability {
            Some(p) => {
                let bucket = (p * 10.0).clamp(0.0, 9.0) as usize;
                if let Ok(mut buckets) = self.probability_buckets.write() {
                    buckets[bucket] += 1;
                }
            }
            None => {
                self.unscored.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Record a failed prediction
    pub fn record_failure(&self, kind: &str) {
        self.requests.fetch_add(1, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut by_kind) = self.failures_by_kind.write() {
            *by_kind.entry(kind.to_string()).or_insert(0) += 1;
        }
    }

    /// Latency and outcome statistics per model
    pub fn get_model_stats(&self) -> HashMap<String, ModelStats> {
        let models = match self.models.read() {
            Ok(models) => models,
            Err(_) => return HashMap::new(),
        };

        models
            .iter()
            .filter(|(_, c)| !c.latencies_us.is_empty())
            .map(|(name, counters)| {
                let mut sorted = counters.latencies_us.clone();
                sorted.sort_unstable();
                let count = sorted.len();
                let sum: u64 = sorted.iter().sum();

                (
                    name.clone(),
                    ModelStats {
                        predictions: counters.predictions,
                        positives: counters.positives,
                        mean_us: sum / count as u64,
                        p50_us: sorted[count / 2],
                        p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
                    },
                )
            })
            .collect()
    }

    pub fn get_failures_by_kind(&self) -> HashMap<String, u64> {
        self.failures_by_kind
            .read()
            .map(|m| m.clone())
            .unwrap_or_default()
    }

    pub fn get_probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|b| *b)
            .unwrap_or([0; 10])
    }

    pub fn get_unscored(&self) -> u64 {
        self.unscored.load(Ordering::Relaxed)
    }

    /// Requests per second since startup
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.requests.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let requests = self.requests.load(Ordering::Relaxed);
        let failures = self.failures.load(Ordering::Relaxed);
        let failure_rate = if requests > 0 {
            (failures as f64 / requests as f64) * 100.0
        } else {
            0.0
        };

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║              HEALTH ASSISTANT - PREDICTION SUMMARY           ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Requests: {:>8}  │  Failures: {:>6} ({:>5.1}%)              ║",
            requests, failures, failure_rate
        );
        info!("╠══════════════════════════════════════════════════════════════╣");

        let mut model_stats: Vec<_> = self.get_model_stats().into_iter().collect();
        model_stats.sort_by(|a, b| a.0.cmp(&b.0));
        for (model, stats) in &model_stats {
            info!(
                "║ {:14} n={:>6} positive={:>6} mean={:>6}μs p99={:>6}μs",
                model, stats.predictions, stats.positives, stats.mean_us, stats.p99_us
            );
        }

        let failures_by_kind = self.get_failures_by_kind();
        if !failures_by_kind.is_empty() {
            info!("╠══════════════════════════════════════════════════════════════╣");
            info!("║ Failures by kind:                                            ║");
            for (kind, count) in &failures_by_kind {
                info!("║   {:24}: {:>6}", kind, count);
            }
        }

        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Positive-class probability distribution:                     ║");
        let dist = self.get_probability_distribution();
        let total: u64 = dist.iter().sum();
        for (i, &count) in dist.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("║   unscored: {:>6}", self.get_unscored());
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PredictionMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Model-specific statistics
#[derive(Debug)]
pub struct ModelStats {
    pub predictions: u64,
    pub positives: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p99_us: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = PredictionMetrics::new();

        metrics.record_prediction("diabetes", Duration::from_micros(100), true, Some(0.91));
        metrics.record_prediction("diabetes", Duration::from_micros(300), false, Some(0.12));
        metrics.record_prediction("parkinsons", Duration::from_micros(50), true, None);
        metrics.record_failure("feature_vector_mismatch");

        assert_eq!(metrics.requests.load(Ordering::Relaxed), 4);
        assert_eq!(metrics.failures.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.get_unscored(), 1);

        let stats = metrics.get_model_stats();
        let diabetes = &stats["diabetes"];
        assert_eq!(diabetes.predictions, 2);
        assert_eq!(diabetes.positives, 1);
        assert_eq!(diabetes.mean_us, 200);
    }

    #[test]
    fn test_probability_buckets() {
        let metrics = PredictionMetrics::new();
        metrics.record_prediction("m", Duration::ZERO, true, Some(1.0));
        metrics.record_prediction("m", Duration::ZERO, false, Some(0.0));
        metrics.record_prediction("m", Duration::ZERO, false, Some(0.05));

        let dist = metrics.get_probability_distribution();
        assert_eq!(dist[0], 2);
        assert_eq!(dist[9], 1);
    }

    #[test]
    fn test_failures_by_kind() {
        let metrics = PredictionMetrics::new();
        metrics.record_failure("unexpected_label");
        metrics.record_failure("unexpected_label");
        metrics.record_failure("prediction_failed");

        let by_kind = metrics.get_failures_by_kind();
        assert_eq!(by_kind["unexpected_label"], 2);
        assert_eq!(by_kind["prediction_failed"], 1);
    }
}
