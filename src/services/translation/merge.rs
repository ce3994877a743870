// Translation merge
//
// The collaborator's answer is indexed by (panel_id, kind, local_id) and
// joined back onto the ordered layout. Any key the answer lacks, or any entry
// without target text, becomes MISSING_TRANSLATION for that region only.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::core::errors::MergeError;
use crate::core::types::{
    MergedBubble, MergedPage, MergedPanel, MergedText, PageLayout, Region, RegionLabel,
    TranslatedPage, MISSING_TRANSLATION,
};
use crate::services::text_order::ordered_text;

type TranslationKey = (usize, RegionLabel, usize);

/// Lookup table over a collaborator response
struct TranslationIndex<'a> {
    entries: HashMap<TranslationKey, Option<&'a str>>,
}

impl<'a> TranslationIndex<'a> {
    fn new(translated: &'a TranslatedPage) -> Self {
        let mut entries = HashMap::new();

        for panel in &translated.panels {
            for bubble in &panel.bubbles {
                entries.insert(
                    (panel.panel_id, RegionLabel::Bubble, bubble.bubble_id),
                    bubble.en.as_deref(),
                );
            }
            for text in &panel.outside_text {
                entries.insert(
                    (panel.panel_id, RegionLabel::Outside, text.text_id),
                    text.en.as_deref(),
                );
            }
        }

        Self { entries }
    }

    fn lookup(&self, panel_id: usize, region: &Region) -> Option<&'a str> {
        self.entries
            .get(&(panel_id, region.label, region.local_id))
            .copied()
            .flatten()
    }
}

/// Result of a merge plus how many regions had no translation
#[derive(Debug, Clone, PartialEq)]
pub struct MergeOutcome {
    pub page: MergedPage,
    pub merged: usize,
    pub missing: usize,
}

/// Join a translation result onto an ordered layout.
///
/// Never fails: regions absent from `translated` carry
/// [`MISSING_TRANSLATION`]. `jp` always comes from the layout's own OCR text.
pub fn merge_translations(layout: &PageLayout, translated: &TranslatedPage) -> MergeOutcome {
    let index = TranslationIndex::new(translated);
    let mut merged = 0;
    let mut missing = 0;

    let mut target_for = |panel_id: usize, region: &Region| -> String {
        match index.lookup(panel_id, region) {
            Some(en) => {
                merged += 1;
                en.to_string()
            }
            None => {
                missing += 1;
                MISSING_TRANSLATION.to_string()
            }
        }
    };

    let mut panels = Vec::with_capacity(layout.panels.len());
    for panel in &layout.panels {
        let bubbles = panel
            .bubbles
            .iter()
            .map(|bubble| MergedBubble {
                bubble_id: bubble.local_id,
                bbox: bubble.bbox,
                jp: ordered_text(&bubble.ocr_words),
                en: target_for(panel.panel_id, bubble),
            })
            .collect();

        let outside_text = panel
            .outside_text
            .iter()
            .map(|text| MergedText {
                text_id: text.local_id,
                bbox: text.bbox,
                jp: ordered_text(&text.ocr_words),
                en: target_for(panel.panel_id, text),
            })
            .collect();

        panels.push(MergedPanel {
            panel_id: panel.panel_id,
            bbox: panel.bbox,
            bubbles,
            outside_text,
        });
    }

    if missing > 0 {
        warn!(
            "Page {}: {} of {} regions have no translation",
            layout.page_index,
            missing,
            merged + missing
        );
    } else {
        debug!("Page {}: merged {} translations", layout.page_index, merged);
    }

    MergeOutcome {
        page: MergedPage { panels },
        merged,
        missing,
    }
}

/// Parse a collaborator payload
pub fn parse_translation(raw: &str) -> Result<TranslatedPage, MergeError> {
    Ok(serde_json::from_str(raw)?)
}

/// Merge a raw collaborator payload.
///
/// An unparseable payload is treated as an empty answer, so every region is
/// reported missing instead of failing the page.
pub fn merge_translation_json(layout: &PageLayout, raw: &str) -> MergeOutcome {
    let translated = match parse_translation(raw) {
        Ok(translated) => translated,
        Err(e) => {
            warn!("Page {}: {}", layout.page_index, e);
            TranslatedPage::default()
        }
    };
    merge_translations(layout, &translated)
}
