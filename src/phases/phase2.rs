// Phase 2: Region Pipeline

use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

use crate::core::config::Config;
use crate::core::errors::LayoutResult;
use crate::core::types::{PageDetections, PageLayout, Panel, Phase1Output, Phase2Output, Region};
use crate::services::assignment::assign_regions;
use crate::services::region_dedup::dedup_regions;
use crate::services::region_order::{order_regions, split_by_label};

/// Phase 2 pipeline: attach regions to panels and order them
pub struct Phase2Pipeline {
    config: Arc<Config>,
}

impl Phase2Pipeline {
    /// Create new Phase 2 pipeline
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Execute Phase 2 on Phase 1 output
    ///
    /// # Steps:
    /// 1. Drop oversized regions (only when an area cap is configured)
    /// 2. Assign every region to one panel
    /// 3. Per panel, in parallel: IoU dedup, row sort, split by label and
    ///    renumber
    ///
    /// # Returns
    /// Phase2Output with the fully ordered page
    #[instrument(skip(self, page, phase1_output), fields(
        page_index = phase1_output.page_index,
        regions = page.regions.len()
    ))]
    pub fn execute(
        &self,
        page: &PageDetections,
        phase1_output: Phase1Output,
    ) -> LayoutResult<Phase2Output> {
        let regions_received = page.regions.len();
        let regions = self.apply_area_cap(page);
        let regions_over_cap = regions_received - regions.len();

        let mut panels = phase1_output.panels;
        let fallback_assignments = assign_regions(
            &mut panels,
            regions,
            self.config.region.assignment_overlap_threshold,
        )?;

        let iou_threshold = self.config.region.dedup_iou_threshold;
        let row_height_ratio = self.config.region.row_height_ratio;

        let regions_suppressed: usize = panels
            .par_iter_mut()
            .map(|panel| order_panel_regions(panel, iou_threshold, row_height_ratio))
            .sum();

        let layout = PageLayout {
            page_index: phase1_output.page_index,
            width: page.width,
            height: page.height,
            spread: phase1_output.spread,
            panels,
        };

        debug!(
            "Phase 2: page {} placed {}/{} regions in {} panels ({} fallback, {} over cap, {} duplicates)",
            layout.page_index,
            layout.region_count(),
            regions_received,
            layout.panels.len(),
            fallback_assignments,
            regions_over_cap,
            regions_suppressed
        );

        Ok(Phase2Output {
            layout,
            regions_received,
            regions_over_cap,
            regions_suppressed,
            fallback_assignments,
        })
    }

    fn apply_area_cap(&self, page: &PageDetections) -> Vec<Region> {
        let Some(fraction) = self.config.region.max_area_fraction else {
            return page.regions.clone();
        };

        let max_area = fraction * page.area();
        page.regions
            .iter()
            .filter(|region| {
                let keep = region.bbox.area() < max_area;
                if !keep {
                    trace!(
                        "Region {:?} exceeds {:.0}% of page area, dropped",
                        region.bbox,
                        fraction * 100.0
                    );
                }
                keep
            })
            .cloned()
            .collect()
    }
}

/// Dedup and order one panel's regions in place, returning how many were
/// dropped as duplicates
fn order_panel_regions(panel: &mut Panel, iou_threshold: f64, row_height_ratio: f64) -> usize {
    let mut combined: Vec<Region> = std::mem::take(&mut panel.bubbles);
    combined.append(&mut panel.outside_text);
    let before = combined.len();

    let kept = dedup_regions(combined, iou_threshold);
    let suppressed = before - kept.len();

    let (bubbles, outside_text) = split_by_label(order_regions(kept, row_height_ratio));
    panel.bubbles = bubbles;
    panel.outside_text = outside_text;

    suppressed
}
