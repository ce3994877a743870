// Library exports for the manga layout engine
//
// Detections in, reading-ordered panels and regions out, plus the export and
// merge steps around the translation collaborator.

// Core modules
pub mod core;
pub mod orchestration;
pub mod phases;
pub mod services;
pub mod utils;

// Re-export commonly used types and functions
pub use crate::core::{
    config::Config,
    errors::{ConfigError, GeometryError, LayoutError, MergeError, PipelineError},
    types::{
        BatchResult, BoundingBox, ExportPage, MergedPage, OcrWord, PageDetections, PageLayout,
        PageResult, Panel, PanelDetection, Phase1Output, Phase2Output, Region, RegionLabel,
        TranslatedPage, TranslationRecord, MISSING_TRANSLATION,
    },
};

pub use orchestration::batch_orchestrator::BatchOrchestrator;

pub use phases::{Phase1Pipeline, Phase2Pipeline, Phase3Pipeline, Phase4Pipeline};

pub use services::translation::MergeOutcome;

pub use utils::{Metrics, MetricsSnapshot};
