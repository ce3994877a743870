pub mod config;
pub mod errors;
pub mod types;

// Re-export commonly used items for convenience
pub use config::{Config, PanelOrderStrategy};
pub use errors::{ConfigError, GeometryError, LayoutError, MergeError, PipelineError};
pub use types::{
    BoundingBox, ExportPage, MergedPage, OcrWord, PageDetections, PageLayout, Panel,
    PanelDetection, Region, RegionLabel, TranslatedPage, TranslationRecord, MISSING_TRANSLATION,
};
