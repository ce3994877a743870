// Data model for the reading-order engine

use serde::{Deserialize, Serialize};

use crate::core::errors::{GeometryError, GeometryResult, LayoutError, LayoutResult};
use crate::utils::geometry;

/// Sentinel written into `en` when the translation collaborator returned
/// nothing for a region
pub const MISSING_TRANSLATION: &str = "<missing>";

/// Axis-aligned box in page pixel coordinates.
///
/// Serialized as `[x1, y1, x2, y2]`. Deserialization rejects reversed or
/// non-finite coordinates; zero-area boxes are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Create a validated box
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> GeometryResult<Self> {
        let bbox = Self { x1, y1, x2, y2 };
        bbox.validate()?;
        Ok(bbox)
    }

    /// Check the ordered-coordinate contract
    pub fn validate(&self) -> GeometryResult<()> {
        let Self { x1, y1, x2, y2 } = *self;
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(GeometryError::NonFinite { x1, y1, x2, y2 });
        }
        if x1 > x2 || y1 > y2 {
            return Err(GeometryError::InvalidCoordinates { x1, y1, x2, y2 });
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f64 {
        geometry::area(self)
    }

    pub fn center_x(&self) -> f64 {
        geometry::centroid(self).0
    }

    pub fn center_y(&self) -> f64 {
        geometry::centroid(self).1
    }
}

impl TryFrom<[f64; 4]> for BoundingBox {
    type Error = GeometryError;

    fn try_from(coords: [f64; 4]) -> Result<Self, Self::Error> {
        Self::new(coords[0], coords[1], coords[2], coords[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.x1, bbox.y1, bbox.x2, bbox.y2]
    }
}

/// Kind of text region produced by the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionLabel {
    /// Speech/thought balloon
    Bubble,
    /// Narration or sound effect outside any balloon
    Outside,
}

impl RegionLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionLabel::Bubble => "bubble",
            RegionLabel::Outside => "outside",
        }
    }
}

/// One recognized word/line inside a region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrWord {
    pub bbox: BoundingBox,
    pub text: String,
}

/// Bubble or outside-text detection with its OCR result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// 1-based position within its panel's list for this label; 0 until assigned
    #[serde(default)]
    pub local_id: usize,
    pub bbox: BoundingBox,
    pub label: RegionLabel,
    #[serde(default = "default_confidence")]
    pub confidence: f32,
    #[serde(default)]
    pub ocr_words: Vec<OcrWord>,
}

impl Region {
    pub fn new(bbox: BoundingBox, label: RegionLabel, confidence: f32) -> Self {
        Self {
            local_id: 0,
            bbox,
            label,
            confidence,
            ocr_words: Vec::new(),
        }
    }

    pub fn with_words(mut self, words: Vec<OcrWord>) -> Self {
        self.ocr_words = words;
        self
    }
}

fn default_confidence() -> f32 {
    1.0
}

/// Raw panel candidate from the panel detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PanelDetection {
    pub bbox: BoundingBox,
    pub confidence: f32,
}

/// Panel with the regions assigned to it, in reading order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// 1-based reading position on the page; 0 until ordered
    #[serde(default)]
    pub panel_id: usize,
    pub bbox: BoundingBox,
    pub confidence: f32,
    #[serde(default)]
    pub bubbles: Vec<Region>,
    #[serde(default)]
    pub outside_text: Vec<Region>,
}

impl Panel {
    pub fn region_count(&self) -> usize {
        self.bubbles.len() + self.outside_text.len()
    }
}

impl From<PanelDetection> for Panel {
    fn from(detection: PanelDetection) -> Self {
        Self {
            panel_id: 0,
            bbox: detection.bbox,
            confidence: detection.confidence,
            bubbles: Vec::new(),
            outside_text: Vec::new(),
        }
    }
}

/// Everything the detector/OCR collaborators produced for one page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDetections {
    #[serde(default)]
    pub page_index: usize,
    pub width: f64,
    pub height: f64,
    pub panels: Vec<PanelDetection>,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl PageDetections {
    /// Fail fast on contract violations before any stage runs
    pub fn validate(&self) -> LayoutResult<()> {
        if !(self.width.is_finite() && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
        {
            return Err(LayoutError::InvalidPageSize {
                width: self.width,
                height: self.height,
            });
        }

        for panel in &self.panels {
            panel.bbox.validate()?;
            validate_confidence(panel.confidence)?;
        }

        for region in &self.regions {
            region.bbox.validate()?;
            validate_confidence(region.confidence)?;
            for word in &region.ocr_words {
                word.bbox.validate()?;
            }
        }

        Ok(())
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

fn validate_confidence(confidence: f32) -> LayoutResult<()> {
    if !(0.0..=1.0).contains(&confidence) {
        return Err(LayoutError::InvalidConfidence(confidence));
    }
    Ok(())
}

/// Phase 1 output: deduplicated panels in reading order
#[derive(Debug, Clone)]
pub struct Phase1Output {
    pub page_index: usize,
    pub panels: Vec<Panel>,
    pub detected: usize,
    pub suppressed: usize,
    pub spread: bool,
}

/// Fully ordered page: panels and their regions, renumbered from 1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    #[serde(default)]
    pub page_index: usize,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub spread: bool,
    pub panels: Vec<Panel>,
}

impl PageLayout {
    pub fn region_count(&self) -> usize {
        self.panels.iter().map(Panel::region_count).sum()
    }
}

/// Phase 2 output: the ordered layout plus region-stage counters
#[derive(Debug, Clone)]
pub struct Phase2Output {
    pub layout: PageLayout,
    pub regions_received: usize,
    pub regions_over_cap: usize,
    pub regions_suppressed: usize,
    pub fallback_assignments: usize,
}

// ---------------------------------------------------------------------------
// Translation collaborator wire format
// ---------------------------------------------------------------------------

/// Request sent to the translation collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPage {
    pub panels: Vec<ExportPanel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportPanel {
    pub panel_id: usize,
    pub bubbles: Vec<ExportBubble>,
    pub outside_text: Vec<ExportText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBubble {
    pub bubble_id: usize,
    pub jp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportText {
    pub text_id: usize,
    pub jp: String,
}

/// Response from the translation collaborator.
///
/// Every list and text field is optional: entries may be missing and must
/// never be assumed complete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranslatedPage {
    #[serde(default)]
    pub panels: Vec<TranslatedPanel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedPanel {
    pub panel_id: usize,
    #[serde(default)]
    pub bubbles: Vec<TranslatedBubble>,
    #[serde(default)]
    pub outside_text: Vec<TranslatedText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedBubble {
    pub bubble_id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jp: Option<String>,
    #[serde(default)]
    pub en: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedText {
    pub text_id: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jp: Option<String>,
    #[serde(default)]
    pub en: Option<String>,
}

/// Final artifact handed to rendering/export collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPage {
    pub panels: Vec<MergedPanel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedPanel {
    pub panel_id: usize,
    pub bbox: BoundingBox,
    pub bubbles: Vec<MergedBubble>,
    pub outside_text: Vec<MergedText>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedBubble {
    pub bubble_id: usize,
    pub bbox: BoundingBox,
    pub jp: String,
    pub en: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedText {
    pub text_id: usize,
    pub bbox: BoundingBox,
    pub jp: String,
    pub en: String,
}

/// One flattened translation row, keyed by its positional identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslationRecord {
    pub panel_id: usize,
    pub region_kind: RegionLabel,
    pub local_id: usize,
    pub source_text: String,
    pub target_text: String,
}

// ---------------------------------------------------------------------------
// Batch results
// ---------------------------------------------------------------------------

/// Individual page result
#[derive(Debug, Clone, Serialize)]
pub struct PageResult {
    pub index: usize,
    pub success: bool,
    pub processing_time_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<PageLayout>,
}

/// Batch processing result
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    pub processing_time_ms: f64,
    pub results: Vec<PageResult>,
}
