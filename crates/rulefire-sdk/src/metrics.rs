//! In-process metrics for rule executions
//!
//! Names recorded by the engine:
//! - `fire_rules_total`: calls to `fire_rules` / `fire_rules_with`
//! - `rules_fired_total`: rules fired across all successful calls
//! - `fire_rules_duration`: call latency in seconds
//! - `errors_<kind>`: failed calls by `RulesError::kind`

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

/// Monotonic counter
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn inc(&self) {
        self.add(1);
    }

    pub fn add(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Running aggregates of a histogram; size is fixed whatever the number of
/// observations
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HistogramSummary {
    pub count: u64,
    pub sum: f64,
    pub min: f64,
    pub max: f64,
}

impl HistogramSummary {
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f64
        }
    }
}

/// Histogram keeping only count, sum, min and max
#[derive(Debug, Default)]
pub struct Histogram {
    summary: Mutex<HistogramSummary>,
}

impl Histogram {
    pub fn observe(&self, value: f64) {
        let mut summary = self.summary.lock().unwrap_or_else(PoisonError::into_inner);
        if summary.count == 0 {
            summary.min = value;
            summary.max = value;
        } else {
            summary.min = summary.min.min(value);
            summary.max = summary.max.max(value);
        }
        summary.count += 1;
        summary.sum += value;
    }

    /// Observe a duration in seconds
    pub fn observe_duration(&self, duration: Duration) {
        self.observe(duration.as_secs_f64());
    }

    pub fn count(&self) -> u64 {
        self.summary().count
    }

    pub fn summary(&self) -> HistogramSummary {
        *self.summary.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Metrics sink used by the engine
pub trait Metrics: Send + Sync {
    fn counter(&self, name: &str) -> Arc<Counter>;

    fn histogram(&self, name: &str) -> Arc<Histogram>;

    /// Observe into `<operation>_duration`
    fn record_execution_time(&self, operation: &str, duration: Duration);

    /// Increment `errors_<error_type>`
    fn record_error(&self, error_type: &str);
}

/// Registry of named counters and histograms
#[derive(Debug, Default)]
pub struct MetricsCollector {
    counters: RwLock<HashMap<String, Arc<Counter>>>,
    histograms: RwLock<HashMap<String, Arc<Histogram>>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current value of every counter, sorted by name
    pub fn counter_values(&self) -> BTreeMap<String, u64> {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, counter)| (name.clone(), counter.get()))
            .collect()
    }

    /// Aggregates of every histogram, sorted by name
    pub fn histogram_summaries(&self) -> BTreeMap<String, HistogramSummary> {
        self.histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, histogram)| (name.clone(), histogram.summary()))
            .collect()
    }
}

impl Metrics for MetricsCollector {
    fn counter(&self, name: &str) -> Arc<Counter> {
        self.counters
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn histogram(&self, name: &str) -> Arc<Histogram> {
        self.histograms
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(name.to_string())
            .or_default()
            .clone()
    }

    fn record_execution_time(&self, operation: &str, duration: Duration) {
        self.histogram(&format!("{}_duration", operation))
            .observe_duration(duration);
    }

    fn record_error(&self, error_type: &str) {
        self.counter(&format!("errors_{}", error_type)).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter() {
        let counter = Counter::default();
        assert_eq!(counter.get(), 0);

        counter.inc();
        counter.add(5);
        assert_eq!(counter.get(), 6);
    }

    #[test]
    fn test_histogram_aggregates() {
        let histogram = Histogram::default();
        assert_eq!(histogram.summary().mean(), 0.0);

        histogram.observe(20.0);
        histogram.observe(10.0);
        histogram.observe(30.0);

        let summary = histogram.summary();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.sum, 60.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 30.0);
        assert_eq!(summary.mean(), 20.0);
    }

    #[test]
    fn test_histogram_keeps_aggregates_only() {
        let histogram = Histogram::default();
        for i in 0..100_000 {
            histogram.observe_duration(Duration::from_micros(i));
        }

        let summary = histogram.summary();
        assert_eq!(summary.count, 100_000);
        assert_eq!(summary.min, 0.0);
        assert!((summary.max - 0.099_999).abs() < 1e-9);
    }

    #[test]
    fn test_collector_shares_named_metrics() {
        let collector = MetricsCollector::new();

        collector.counter("rules_fired_total").add(3);
        collector.counter("rules_fired_total").inc();

        assert_eq!(collector.counter("rules_fired_total").get(), 4);
        assert_eq!(
            collector.counter_values().keys().collect::<Vec<_>>(),
            vec!["rules_fired_total"]
        );
    }

    #[test]
    fn test_record_execution_time_and_error() {
        let collector = MetricsCollector::new();

        collector.record_execution_time("fire_rules", Duration::from_millis(100));
        collector.record_error("execution");
        collector.record_error("execution");

        assert_eq!(collector.histogram("fire_rules_duration").count(), 1);
        assert_eq!(collector.counter_values().get("errors_execution"), Some(&2));

        let summaries = collector.histogram_summaries();
        assert!((summaries["fire_rules_duration"].mean() - 0.1).abs() < 1e-9);
    }
}
