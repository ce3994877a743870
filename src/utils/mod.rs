pub mod geometry;
pub mod metrics;

// Re-export commonly used items
pub use geometry::{area, centroid, containment_ratio, intersection_area, iou};
pub use metrics::{Metrics, MetricsSnapshot};
