use tracing::debug;

use crate::core::types::{ExportBubble, ExportPage, ExportPanel, ExportText, PageLayout};
use crate::services::text_order::ordered_text;

/// Build the translation request for an ordered page.
///
/// Ids are taken from the layout as-is, so the layout must already be
/// renumbered. `jp` is the region's OCR words joined in reading order.
pub fn build_export(layout: &PageLayout) -> ExportPage {
    let panels: Vec<ExportPanel> = layout
        .panels
        .iter()
        .map(|panel| ExportPanel {
            panel_id: panel.panel_id,
            bubbles: panel
                .bubbles
                .iter()
                .map(|bubble| ExportBubble {
                    bubble_id: bubble.local_id,
                    jp: ordered_text(&bubble.ocr_words),
                })
                .collect(),
            outside_text: panel
                .outside_text
                .iter()
                .map(|text| ExportText {
                    text_id: text.local_id,
                    jp: ordered_text(&text.ocr_words),
                })
                .collect(),
        })
        .collect();

    debug!(
        "Export page {}: {} panels, {} regions",
        layout.page_index,
        panels.len(),
        layout.region_count()
    );

    ExportPage { panels }
}
