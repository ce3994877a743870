use dashmap::DashMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Process-wide metrics for the layout engine.
///
/// Tracks page throughput, what each stage removed or fell back on, and
/// stage durations. Cheap to clone and safe to share across worker threads.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    // Page Metrics
    pages_processed: AtomicUsize,
    pages_failed: AtomicUsize,
    spread_pages: AtomicUsize,

    // Panel Metrics
    panels_detected: AtomicUsize,
    panels_suppressed: AtomicUsize,

    // Region Metrics
    regions_received: AtomicUsize,
    regions_over_cap: AtomicUsize,
    regions_suppressed: AtomicUsize,
    fallback_assignments: AtomicUsize,

    // Translation Metrics
    translations_merged: AtomicUsize,
    translations_missing: AtomicUsize,

    // Stage durations keyed by stage name
    stage_durations_ms: DashMap<&'static str, RwLock<Vec<u64>>>,

    start_time: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                pages_processed: AtomicUsize::new(0),
                pages_failed: AtomicUsize::new(0),
                spread_pages: AtomicUsize::new(0),
                panels_detected: AtomicUsize::new(0),
                panels_suppressed: AtomicUsize::new(0),
                regions_received: AtomicUsize::new(0),
                regions_over_cap: AtomicUsize::new(0),
                regions_suppressed: AtomicUsize::new(0),
                fallback_assignments: AtomicUsize::new(0),
                translations_merged: AtomicUsize::new(0),
                translations_missing: AtomicUsize::new(0),
                stage_durations_ms: DashMap::new(),
                start_time: Instant::now(),
            }),
        }
    }

    // Page Metrics
    pub fn record_page(&self, success: bool) {
        if success {
            self.inner.pages_processed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.inner.pages_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_spread_page(&self) {
        self.inner.spread_pages.fetch_add(1, Ordering::Relaxed);
    }

    // Panel Metrics
    pub fn record_panels(&self, detected: usize, suppressed: usize) {
        self.inner.panels_detected.fetch_add(detected, Ordering::Relaxed);
        self.inner.panels_suppressed.fetch_add(suppressed, Ordering::Relaxed);
    }

    // Region Metrics
    pub fn record_regions(&self, received: usize, over_cap: usize, suppressed: usize, fallbacks: usize) {
        self.inner.regions_received.fetch_add(received, Ordering::Relaxed);
        self.inner.regions_over_cap.fetch_add(over_cap, Ordering::Relaxed);
        self.inner.regions_suppressed.fetch_add(suppressed, Ordering::Relaxed);
        self.inner.fallback_assignments.fetch_add(fallbacks, Ordering::Relaxed);
    }

    // Translation Metrics
    pub fn record_merge(&self, merged: usize, missing: usize) {
        self.inner.translations_merged.fetch_add(merged, Ordering::Relaxed);
        self.inner.translations_missing.fetch_add(missing, Ordering::Relaxed);
    }

    // Stage Metrics
    pub fn record_stage_duration(&self, stage: &'static str, duration: Duration) {
        self.inner
            .stage_durations_ms
            .entry(stage)
            .or_insert_with(|| RwLock::new(Vec::new()))
            .write()
            .push(duration.as_millis() as u64);
    }

    // Get snapshot for reporting
    pub fn snapshot(&self) -> MetricsSnapshot {
        let stage_avg_ms = self
            .inner
            .stage_durations_ms
            .iter()
            .map(|entry| (entry.key().to_string(), avg(&entry.value().read())))
            .collect::<BTreeMap<_, _>>();

        let merged = self.inner.translations_merged.load(Ordering::Relaxed);
        let missing = self.inner.translations_missing.load(Ordering::Relaxed);
        let total = merged + missing;
        let translation_coverage = if total > 0 {
            merged as f64 / total as f64
        } else {
            0.0
        };

        MetricsSnapshot {
            pages_processed: self.inner.pages_processed.load(Ordering::Relaxed),
            pages_failed: self.inner.pages_failed.load(Ordering::Relaxed),
            spread_pages: self.inner.spread_pages.load(Ordering::Relaxed),
            panels_detected: self.inner.panels_detected.load(Ordering::Relaxed),
            panels_suppressed: self.inner.panels_suppressed.load(Ordering::Relaxed),
            regions_received: self.inner.regions_received.load(Ordering::Relaxed),
            regions_over_cap: self.inner.regions_over_cap.load(Ordering::Relaxed),
            regions_suppressed: self.inner.regions_suppressed.load(Ordering::Relaxed),
            fallback_assignments: self.inner.fallback_assignments.load(Ordering::Relaxed),
            translations_merged: merged,
            translations_missing: missing,
            translation_coverage,
            stage_avg_ms,
            uptime_seconds: self.inner.start_time.elapsed().as_secs(),
        }
    }

    /// Generate Prometheus-format metrics
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = format!(
            r#"# HELP pages_processed_total Pages laid out successfully
# TYPE pages_processed_total counter
pages_processed_total {{}} {}

# HELP pages_failed_total Pages rejected by validation or assignment
# TYPE pages_failed_total counter
pages_failed_total {{}} {}

# HELP spread_pages_total Pages ordered as two-page spreads
# TYPE spread_pages_total counter
spread_pages_total {{}} {}

# HELP panels_suppressed_total Panel detections removed as duplicates
# TYPE panels_suppressed_total counter
panels_suppressed_total {{}} {}

# HELP regions_suppressed_total Region detections removed as duplicates
# TYPE regions_suppressed_total counter
regions_suppressed_total {{}} {}

# HELP fallback_assignments_total Regions assigned by nearest centroid
# TYPE fallback_assignments_total counter
fallback_assignments_total {{}} {}

# HELP translations_missing_total Regions merged without a translation
# TYPE translations_missing_total counter
translations_missing_total {{}} {}

# HELP translation_coverage Fraction of merged regions with a translation
# TYPE translation_coverage gauge
translation_coverage {{}} {}

# HELP stage_avg_duration_ms Average stage duration in milliseconds
# TYPE stage_avg_duration_ms gauge
"#,
            snapshot.pages_processed,
            snapshot.pages_failed,
            snapshot.spread_pages,
            snapshot.panels_suppressed,
            snapshot.regions_suppressed,
            snapshot.fallback_assignments,
            snapshot.translations_missing,
            snapshot.translation_coverage,
        );

        for (stage, avg_ms) in &snapshot.stage_avg_ms {
            out.push_str(&format!("stage_avg_duration_ms {{stage=\"{}\"}} {}\n", stage, avg_ms));
        }

        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub pages_processed: usize,
    pub pages_failed: usize,
    pub spread_pages: usize,
    pub panels_detected: usize,
    pub panels_suppressed: usize,
    pub regions_received: usize,
    pub regions_over_cap: usize,
    pub regions_suppressed: usize,
    pub fallback_assignments: usize,
    pub translations_merged: usize,
    pub translations_missing: usize,
    pub translation_coverage: f64,
    pub stage_avg_ms: BTreeMap<String, u64>,
    pub uptime_seconds: u64,
}

fn avg(values: &[u64]) -> u64 {
    if values.is_empty() {
        return 0;
    }
    values.iter().sum::<u64>() / values.len() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = Metrics::new();

        metrics.record_page(true);
        metrics.record_page(false);
        metrics.record_panels(5, 2);
        metrics.record_regions(10, 1, 3, 2);
        metrics.record_merge(3, 1);
        metrics.record_stage_duration("panels", Duration::from_millis(4));
        metrics.record_stage_duration("panels", Duration::from_millis(6));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.pages_processed, 1);
        assert_eq!(snapshot.pages_failed, 1);
        assert_eq!(snapshot.panels_detected, 5);
        assert_eq!(snapshot.panels_suppressed, 2);
        assert_eq!(snapshot.regions_received, 10);
        assert_eq!(snapshot.regions_over_cap, 1);
        assert_eq!(snapshot.regions_suppressed, 3);
        assert_eq!(snapshot.fallback_assignments, 2);
        assert_eq!(snapshot.translation_coverage, 0.75);
        assert_eq!(snapshot.stage_avg_ms.get("panels"), Some(&5));
    }

    #[test]
    fn test_prometheus_format() {
        let metrics = Metrics::new();
        metrics.record_page(true);
        metrics.record_stage_duration("regions", Duration::from_millis(2));

        let prometheus = metrics.to_prometheus();
        assert!(prometheus.contains("pages_processed_total {} 1"));
        assert!(prometheus.contains("stage_avg_duration_ms {stage=\"regions\"} 2"));
    }
}
