// Batch Orchestrator: Main workflow coordinator

use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

use crate::core::config::Config;
use crate::core::errors::{ErrorContext, PipelineError, PipelineResult};
use crate::core::types::{
    BatchResult, ExportPage, PageDetections, PageLayout, PageResult, TranslatedPage,
};
use crate::phases::phase1::Phase1Pipeline;
use crate::phases::phase2::Phase2Pipeline;
use crate::phases::phase3::Phase3Pipeline;
use crate::phases::phase4::Phase4Pipeline;
use crate::services::translation::MergeOutcome;
use crate::utils::Metrics;

/// Main batch orchestrator
pub struct BatchOrchestrator {
    phase1: Phase1Pipeline,
    phase2: Phase2Pipeline,
    phase3: Phase3Pipeline,
    phase4: Phase4Pipeline,
    pool: rayon::ThreadPool,
    metrics: Metrics,
}

impl BatchOrchestrator {
    /// Create new batch orchestrator with its own worker pool
    #[instrument(skip(config, metrics), fields(worker_threads = config.batch.worker_threads))]
    pub fn new(config: Arc<Config>, metrics: Metrics) -> PipelineResult<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.batch.worker_threads)
            .thread_name(|i| format!("layout-worker-{}", i))
            .build()
            .map_err(|e| PipelineError::WorkerPoolFailed(e.to_string()))?;

        info!(
            "✓ Ready (workers: {}, panel order: {:?}, spreads: {})",
            config.batch.worker_threads,
            config.panel.strategy,
            if config.spread.enabled { "on" } else { "off" }
        );

        Ok(Self {
            phase1: Phase1Pipeline::new(Arc::clone(&config)),
            phase2: Phase2Pipeline::new(config),
            phase3: Phase3Pipeline::new(),
            phase4: Phase4Pipeline::new(),
            pool,
            metrics,
        })
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Run phases 1 and 2 on one page
    pub fn process_page(&self, page: &PageDetections) -> PipelineResult<PageLayout> {
        let result = self.layout_page(page);
        self.metrics.record_page(result.is_ok());
        result
    }

    fn layout_page(&self, page: &PageDetections) -> PipelineResult<PageLayout> {
        let phase1_start = Instant::now();
        let phase1_output = self.phase1.execute(page).with_page_context(page.page_index)?;
        self.metrics.record_stage_duration("panels", phase1_start.elapsed());
        self.metrics
            .record_panels(phase1_output.detected, phase1_output.suppressed);
        if phase1_output.spread {
            self.metrics.record_spread_page();
        }

        let phase2_start = Instant::now();
        let phase2_output = self
            .phase2
            .execute(page, phase1_output)
            .with_page_context(page.page_index)?;
        self.metrics.record_stage_duration("regions", phase2_start.elapsed());
        self.metrics.record_regions(
            phase2_output.regions_received,
            phase2_output.regions_over_cap,
            phase2_output.regions_suppressed,
            phase2_output.fallback_assignments,
        );

        Ok(phase2_output.layout)
    }

    /// Process independent pages in parallel, one page per task.
    ///
    /// A failing page is reported in its `PageResult` and never aborts the
    /// rest of the batch. Results keep input order.
    #[instrument(skip(self, pages), fields(total_pages = pages.len()))]
    pub fn process_batch(&self, pages: Vec<PageDetections>) -> BatchResult {
        let start_time = Instant::now();
        let total = pages.len();

        info!("Processing {} pages", total);

        let results: Vec<PageResult> = self.pool.install(|| {
            pages
                .par_iter()
                .map(|page| {
                    let page_start = Instant::now();
                    let outcome = self.process_page(page);
                    let processing_time_ms = page_start.elapsed().as_secs_f64() * 1000.0;

                    match outcome {
                        Ok(layout) => PageResult {
                            index: page.page_index,
                            success: true,
                            processing_time_ms,
                            error: None,
                            layout: Some(layout),
                        },
                        Err(e) => {
                            error!("{}", e);
                            PageResult {
                                index: page.page_index,
                                success: false,
                                processing_time_ms,
                                error: Some(e.to_string()),
                                layout: None,
                            }
                        }
                    }
                })
                .collect()
        });

        let successful = results.iter().filter(|r| r.success).count();
        let failed = total - successful;
        let processing_time_ms = start_time.elapsed().as_secs_f64() * 1000.0;

        info!(
            "✓ Batch complete: {}/{} pages in {:.2}ms ({} failed)",
            successful, total, processing_time_ms, failed
        );

        BatchResult {
            total,
            successful,
            failed,
            processing_time_ms,
            results,
        }
    }

    /// Build the translation request for an ordered page
    pub fn export(&self, layout: &PageLayout) -> ExportPage {
        let start = Instant::now();
        let export = self.phase3.execute(layout);
        self.metrics.record_stage_duration("export", start.elapsed());
        export
    }

    /// Merge a parsed translation result onto an ordered page
    pub fn merge(&self, layout: &PageLayout, translated: &TranslatedPage) -> MergeOutcome {
        let start = Instant::now();
        let outcome = self.phase4.execute(layout, translated);
        self.record_merge(&outcome, start);
        outcome
    }

    /// Merge a raw collaborator payload; unparseable input counts as empty
    pub fn merge_raw(&self, layout: &PageLayout, raw: &str) -> MergeOutcome {
        let start = Instant::now();
        let outcome = self.phase4.execute_raw(layout, raw);
        self.record_merge(&outcome, start);
        outcome
    }

    fn record_merge(&self, outcome: &MergeOutcome, start: Instant) {
        self.metrics.record_stage_duration("merge", start.elapsed());
        self.metrics.record_merge(outcome.merged, outcome.missing);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{BoundingBox, PanelDetection, Region, RegionLabel};

    fn bbox(x1: f64, y1: f64, x2: f64, y2: f64) -> BoundingBox {
        BoundingBox { x1, y1, x2, y2 }
    }

    fn orchestrator() -> BatchOrchestrator {
        let mut config = Config::default();
        config.batch.worker_threads = 2;
        BatchOrchestrator::new(Arc::new(config), Metrics::new()).unwrap()
    }

    fn good_page(page_index: usize) -> PageDetections {
        PageDetections {
            page_index,
            width: 100.0,
            height: 200.0,
            panels: vec![PanelDetection {
                bbox: bbox(0.0, 0.0, 100.0, 100.0),
                confidence: 0.9,
            }],
            regions: vec![Region::new(bbox(10.0, 10.0, 40.0, 40.0), RegionLabel::Bubble, 0.9)],
        }
    }

    #[test]
    fn test_failed_page_does_not_abort_batch() {
        let orchestrator = orchestrator();
        let mut orphan = good_page(1);
        orphan.panels.clear();

        let result = orchestrator.process_batch(vec![good_page(0), orphan, good_page(2)]);
        assert_eq!(result.total, 3);
        assert_eq!(result.successful, 2);
        assert_eq!(result.failed, 1);

        let indices: Vec<usize> = result.results.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);

        let failed = &result.results[1];
        assert!(!failed.success);
        assert!(failed.layout.is_none());
        assert!(failed
            .error
            .as_deref()
            .is_some_and(|e| e.contains("page 1") && e.contains("no panels")));

        let snapshot = orchestrator.metrics().snapshot();
        assert_eq!(snapshot.pages_processed, 2);
        assert_eq!(snapshot.pages_failed, 1);
    }

    #[test]
    fn test_export_and_merge_record_metrics() {
        let orchestrator = orchestrator();
        let layout = orchestrator.process_page(&good_page(0)).unwrap();

        let export = orchestrator.export(&layout);
        assert_eq!(export.panels[0].bubbles[0].bubble_id, 1);

        let outcome = orchestrator.merge_raw(&layout, "");
        assert_eq!(outcome.missing, 1);
        assert_eq!(orchestrator.metrics().snapshot().translations_missing, 1);
    }
}
