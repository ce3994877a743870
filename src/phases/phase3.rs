// Phase 3: Export Pipeline

use tracing::instrument;

use crate::core::types::{ExportPage, PageLayout};
use crate::services::translation::build_export;

/// Phase 3 pipeline: build the translation request for an ordered page
#[derive(Debug, Default, Clone, Copy)]
pub struct Phase3Pipeline;

impl Phase3Pipeline {
    pub fn new() -> Self {
        Self
    }

    /// Export ids and source text only; geometry stays in the layout
    #[instrument(skip(self, layout), fields(page_index = layout.page_index))]
    pub fn execute(&self, layout: &PageLayout) -> ExportPage {
        build_export(layout)
    }
}
