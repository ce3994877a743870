// Phase 4: Merge Pipeline

use tracing::instrument;

use crate::core::types::{PageLayout, TranslatedPage};
use crate::services::translation::{merge_translation_json, merge_translations, MergeOutcome};

/// Phase 4 pipeline: join translations back onto the ordered page
#[derive(Debug, Default, Clone, Copy)]
pub struct Phase4Pipeline;

impl Phase4Pipeline {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip(self, layout, translated), fields(page_index = layout.page_index))]
    pub fn execute(&self, layout: &PageLayout, translated: &TranslatedPage) -> MergeOutcome {
        merge_translations(layout, translated)
    }

    /// Merge straight from the collaborator's raw JSON answer
    #[instrument(skip(self, layout, raw), fields(page_index = layout.page_index, bytes = raw.len()))]
    pub fn execute_raw(&self, layout: &PageLayout, raw: &str) -> MergeOutcome {
        merge_translation_json(layout, raw)
    }
}
