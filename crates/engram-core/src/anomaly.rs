//! Anomaly Detection - Simplified Predictive Coding
//!
//! The brain constantly predicts incoming stimuli; a large deviation from
//! expectation fires a prediction-error signal that attracts attention
//! (Rao & Ballard 1999, Friston 2005). Reduced to univariate Gaussian
//! tracking: a rolling window per metric, with values more than a few
//! standard deviations from the rolling mean flagged as anomalous.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};

/// Baseline statistics for one tracked metric
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Baseline {
    /// Rolling mean
    pub mean: f64,
    /// Sample standard deviation
    pub std: f64,
    /// Observations in the window
    pub n: usize,
}

/// Rolling-window baseline tracker.
///
/// Maintains a bounded window of observations per metric. Larger windows
/// give more stable baselines but adapt more slowly; 100 suits
/// daily-resolution operational metrics.
#[derive(Debug, Clone)]
pub struct BaselineTracker {
    window_size: usize,
    data: HashMap<String, VecDeque<f64>>,
}

impl BaselineTracker {
    /// Create a tracker keeping `window_size` observations per metric
    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
            data: HashMap::new(),
        }
    }

    /// Record an observation for a metric
    pub fn update(&mut self, metric: &str, value: f64) {
        let window = self
            .data
            .entry(metric.to_string())
            .or_insert_with(VecDeque::new);
        if window.len() == self.window_size {
            window.pop_front();
        }
        window.push_back(value);
    }

    /// Current baseline statistics for a metric; zeroed when no data exists
    pub fn baseline(&self, metric: &str) -> Baseline {
        let Some(values) = self.data.get(metric) else {
            return Baseline::default();
        };
        if values.is_empty() {
            return Baseline::default();
        }

        let n = values.len();
        let mean = values.iter().sum::<f64>() / n as f64;
        if n < 2 {
            return Baseline { mean, std: 0.0, n };
        }

        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
        Baseline {
            mean,
            std: variance.sqrt(),
            n,
        }
    }

    /// Whether a value deviates more than `sigma_threshold` standard
    /// deviations from the rolling mean.
    ///
    /// Requires `min_samples` observations first, so warmup never flags.
    /// With zero variance, any deviation from the mean is anomalous.
    pub fn is_anomaly(
        &self,
        metric: &str,
        value: f64,
        sigma_threshold: f64,
        min_samples: usize,
    ) -> bool {
        let baseline = self.baseline(metric);
        if baseline.n < min_samples {
            return false;
        }

        if baseline.std == 0.0 {
            return value != baseline.mean;
        }

        (value - baseline.mean).abs() / baseline.std > sigma_threshold
    }

    /// Z-score of a value against the baseline (0.0 with insufficient data)
    pub fn z_score(&self, metric: &str, value: f64) -> f64 {
        let baseline = self.baseline(metric);
        if baseline.n < 2 || baseline.std == 0.0 {
            return 0.0;
        }
        (value - baseline.mean) / baseline.std
    }

    /// Names of all tracked metrics
    pub fn metrics(&self) -> Vec<String> {
        let mut names: Vec<String> = self.data.keys().cloned().collect();
        names.sort();
        names
    }
}

impl Default for BaselineTracker {
    fn default() -> Self {
        Self::new(100)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_baseline_is_zeroed() {
        let tracker = BaselineTracker::new(10);
        let baseline = tracker.baseline("nothing");
        assert_eq!(baseline.n, 0);
        assert_eq!(baseline.mean, 0.0);
        assert_eq!(baseline.std, 0.0);
    }

    #[test]
    fn test_baseline_uses_sample_variance() {
        let mut tracker = BaselineTracker::new(10);
        for v in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            tracker.update("metric", v);
        }
        let baseline = tracker.baseline("metric");
        assert_eq!(baseline.n, 8);
        assert!((baseline.mean - 5.0).abs() < 1e-9);
        // sample variance of this set is 32/7
        assert!((baseline.std - (32.0f64 / 7.0).sqrt()).abs() < 1e-9);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut tracker = BaselineTracker::new(3);
        for v in [100.0, 1.0, 1.0, 1.0] {
            tracker.update("metric", v);
        }
        let baseline = tracker.baseline("metric");
        assert_eq!(baseline.n, 3);
        assert!((baseline.mean - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_anomaly_requires_min_samples() {
        let mut tracker = BaselineTracker::new(100);
        for _ in 0..4 {
            tracker.update("metric", 10.0);
        }
        // four samples: below the floor, never anomalous
        assert!(!tracker.is_anomaly("metric", 1000.0, 2.0, 5));

        tracker.update("metric", 10.0);
        assert!(tracker.is_anomaly("metric", 1000.0, 2.0, 5));
    }

    #[test]
    fn test_zero_variance_flags_any_deviation() {
        let mut tracker = BaselineTracker::new(100);
        for _ in 0..10 {
            tracker.update("metric", 5.0);
        }
        assert!(tracker.is_anomaly("metric", 5.001, 2.0, 5));
        assert!(!tracker.is_anomaly("metric", 5.0, 2.0, 5));
    }

    #[test]
    fn test_spike_detected_against_noisy_baseline() {
        let mut tracker = BaselineTracker::new(50);
        // steady ~20 with small spread
        for i in 0..30 {
            tracker.update("accesses", 20.0 + (i % 5) as f64 - 2.0);
        }
        assert!(tracker.is_anomaly("accesses", 55.0, 2.0, 5));
        assert!(!tracker.is_anomaly("accesses", 21.0, 2.0, 5));
        assert!(tracker.z_score("accesses", 55.0) > 2.0);
    }

    #[test]
    fn test_metrics_listing() {
        let mut tracker = BaselineTracker::new(10);
        tracker.update("b_metric", 1.0);
        tracker.update("a_metric", 1.0);
        assert_eq!(tracker.metrics(), vec!["a_metric", "b_metric"]);
    }
}
