// Custom error types for the layout engine
//
// Using thiserror for ergonomic error definitions with:
// - Type-safe error matching
// - Automatic Display/Error trait implementations
// - Source error chaining

use thiserror::Error;

/// Bounding box construction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Invalid box coordinates [{x1}, {y1}, {x2}, {y2}]: expected x1 <= x2 and y1 <= y2")]
    InvalidCoordinates { x1: f64, y1: f64, x2: f64, y2: f64 },

    #[error("Non-finite box coordinate in [{x1}, {y1}, {x2}, {y2}]")]
    NonFinite { x1: f64, y1: f64, x2: f64, y2: f64 },
}

/// Layout stage errors (dedup, ordering, assignment)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Cannot assign {region_count} regions: page has no panels")]
    NoPanels { region_count: usize },

    #[error("Confidence must be in [0.0, 1.0], got {0}")]
    InvalidConfidence(f32),

    #[error("Invalid page dimensions: {width}x{height}")]
    InvalidPageSize { width: f64, height: f64 },

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Translation merge diagnostics
///
/// Merging itself never fails: a payload that cannot be parsed is reported
/// with this error and then treated as an empty translation result.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Translation payload could not be parsed: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Pipeline orchestration errors
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Layout failed on page {page_index}: {source}")]
    LayoutFailed {
        page_index: usize,
        #[source]
        source: LayoutError,
    },

    #[error("Worker pool creation failed: {0}")]
    WorkerPoolFailed(String),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid panel config: {0}")]
    InvalidPanelConfig(String),

    #[error("Invalid spread config: {0}")]
    InvalidSpreadConfig(String),

    #[error("Invalid region config: {0}")]
    InvalidRegionConfig(String),

    #[error("Worker thread count must be > 0, got {0}")]
    InvalidWorkerThreads(usize),

    #[error("Environment variable {name} could not be parsed: {value:?}")]
    EnvVarError { name: String, value: String },
}

// Convenience type aliases for Results
pub type GeometryResult<T> = Result<T, GeometryError>;
pub type LayoutResult<T> = Result<T, LayoutError>;
pub type PipelineResult<T> = Result<T, PipelineError>;
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Helper trait for attaching page context to stage errors
pub trait ErrorContext<T> {
    fn with_page_context(self, page_index: usize) -> Result<T, PipelineError>;
}

impl<T> ErrorContext<T> for LayoutResult<T> {
    fn with_page_context(self, page_index: usize) -> Result<T, PipelineError> {
        self.map_err(|e| PipelineError::LayoutFailed {
            page_index,
            source: e,
        })
    }
}
