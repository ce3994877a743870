// Phase 1: Panel Pipeline

use std::sync::Arc;
use tracing::{debug, instrument};

use crate::core::config::Config;
use crate::core::errors::LayoutResult;
use crate::core::types::{PageDetections, Panel, Phase1Output};
use crate::services::panel_dedup::dedup_panels;
use crate::services::panel_order::{order_panels, renumber_panels};

/// Phase 1 pipeline: validate, deduplicate and order panels
pub struct Phase1Pipeline {
    config: Arc<Config>,
}

impl Phase1Pipeline {
    /// Create new Phase 1 pipeline
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Execute Phase 1 on a single page
    ///
    /// # Steps:
    /// 1. Validate page size, boxes and confidences
    /// 2. Containment-NMS over panel candidates
    /// 3. Reading-order sort (spread aware)
    /// 4. Renumber panels from 1
    ///
    /// Regions are left untouched; Phase 2 assigns them.
    #[instrument(skip(self, page), fields(
        page_index = page.page_index,
        panels = page.panels.len()
    ))]
    pub fn execute(&self, page: &PageDetections) -> LayoutResult<Phase1Output> {
        page.validate()?;

        let detected = page.panels.len();
        let candidates: Vec<Panel> = page.panels.iter().cloned().map(Panel::from).collect();

        let kept = dedup_panels(candidates, self.config.panel.containment_threshold);
        let suppressed = detected - kept.len();

        let ordering = order_panels(
            kept,
            page.width,
            page.height,
            &self.config.panel,
            &self.config.spread,
        );

        let mut panels = ordering.panels;
        renumber_panels(&mut panels);

        debug!(
            "Phase 1: page {} kept {}/{} panels{}",
            page.page_index,
            panels.len(),
            detected,
            if ordering.spread { " (spread)" } else { "" }
        );

        Ok(Phase1Output {
            page_index: page.page_index,
            panels,
            detected,
            suppressed,
            spread: ordering.spread,
        })
    }
}
