// Flat (panel, kind, id, source, target) rows for diffing and evaluation

use std::collections::BTreeMap;

use crate::core::types::{
    MergedPage, RegionLabel, TranslatedBubble, TranslatedPage, TranslatedPanel, TranslatedText,
    TranslationRecord, MISSING_TRANSLATION,
};

impl MergedPage {
    /// One record per region, in reading order (bubbles before outside text
    /// within a panel)
    pub fn records(&self) -> Vec<TranslationRecord> {
        let mut records = Vec::new();

        for panel in &self.panels {
            records.extend(panel.bubbles.iter().map(|b| TranslationRecord {
                panel_id: panel.panel_id,
                region_kind: RegionLabel::Bubble,
                local_id: b.bubble_id,
                source_text: b.jp.clone(),
                target_text: b.en.clone(),
            }));
            records.extend(panel.outside_text.iter().map(|t| TranslationRecord {
                panel_id: panel.panel_id,
                region_kind: RegionLabel::Outside,
                local_id: t.text_id,
                source_text: t.jp.clone(),
                target_text: t.en.clone(),
            }));
        }

        records
    }
}

impl TranslatedPage {
    /// Rebuild a collaborator-shaped answer from records.
    ///
    /// Records carrying [`MISSING_TRANSLATION`] become entries without
    /// target text, so merging the result reports them missing again.
    pub fn from_records(records: &[TranslationRecord]) -> Self {
        let mut panels: BTreeMap<usize, TranslatedPanel> = BTreeMap::new();

        for record in records {
            let panel = panels
                .entry(record.panel_id)
                .or_insert_with(|| TranslatedPanel {
                    panel_id: record.panel_id,
                    bubbles: Vec::new(),
                    outside_text: Vec::new(),
                });

            let jp = Some(record.source_text.clone());
            let en = (record.target_text != MISSING_TRANSLATION).then(|| record.target_text.clone());

            match record.region_kind {
                RegionLabel::Bubble => panel.bubbles.push(TranslatedBubble {
                    bubble_id: record.local_id,
                    jp,
                    en,
                }),
                RegionLabel::Outside => panel.outside_text.push(TranslatedText {
                    text_id: record.local_id,
                    jp,
                    en,
                }),
            }
        }

        Self {
            panels: panels.into_values().collect(),
        }
    }
}
