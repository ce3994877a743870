use crate::core::errors::ConfigError;
use std::env;
use std::str::FromStr;
use tracing::Level;

/// Panel ordering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelOrderStrategy {
    /// Band panels into rows by vertical center, then stacks by horizontal center
    RowBands,
    /// Grow columns from horizontal overlap, order columns by their top panel
    ColumnGroups,
}

impl FromStr for PanelOrderStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rows" | "row_bands" => Ok(Self::RowBands),
            "columns" | "column_groups" => Ok(Self::ColumnGroups),
            other => Err(format!("unknown panel order strategy '{}'", other)),
        }
    }
}

/// Panel deduplication and ordering configuration
#[derive(Debug, Clone)]
pub struct PanelConfig {
    /// Fraction of a candidate covered by a kept panel at which it is discarded
    pub containment_threshold: f64,
    /// Row tolerance as a fraction of the average panel height
    pub row_overlap_ratio: f64,
    /// Stack tolerance as a fraction of the panel width
    pub stack_width_ratio: f64,
    /// Minimum shared width (fraction of the narrower panel) for column grouping
    pub column_overlap_ratio: f64,
    pub strategy: PanelOrderStrategy,
    pub right_to_left: bool,
}

/// Two-page spread configuration
#[derive(Debug, Clone)]
pub struct SpreadConfig {
    pub enabled: bool,
    /// Panels with `x1 >= right_tolerance * mid` belong to the right page
    pub right_tolerance: f64,
    /// Panels with `x2 <= left_tolerance * mid` belong to the left page
    pub left_tolerance: f64,
}

/// Region assignment, deduplication and ordering configuration
#[derive(Debug, Clone)]
pub struct RegionConfig {
    /// Minimum overlap ratio (intersection / region area) for direct assignment
    pub assignment_overlap_threshold: f64,
    /// IoU above which the smaller of two regions is dropped
    pub dedup_iou_threshold: f64,
    /// Row tolerance as a fraction of the previous region's height
    pub row_height_ratio: f64,
    /// Optional intake cap on region area as a fraction of page area
    pub max_area_fraction: Option<f64>,
}

/// Batch processing configuration
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Number of worker threads for page-level parallelism
    pub worker_threads: usize,
}

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub panel: PanelConfig,
    pub spread: SpreadConfig,
    pub region: RegionConfig,
    pub batch: BatchConfig,
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            panel: PanelConfig {
                containment_threshold: 0.75,
                row_overlap_ratio: 0.4,
                stack_width_ratio: 0.5,
                column_overlap_ratio: 0.6,
                strategy: PanelOrderStrategy::RowBands,
                right_to_left: true,
            },
            spread: SpreadConfig {
                enabled: true,
                right_tolerance: 0.9,
                left_tolerance: 1.1,
            },
            region: RegionConfig {
                assignment_overlap_threshold: 0.3,
                dedup_iou_threshold: 0.6,
                row_height_ratio: 0.5,
                max_area_fraction: None,
            },
            batch: BatchConfig {
                worker_threads: num_cpus::get(),
            },
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Load configuration from the environment (and `.env` if present)
    pub fn new() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config = Self::load_from_env()?;
        config.validate()?;
        Ok(config)
    }

    fn load_from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let log_level = env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| match s.to_lowercase().as_str() {
                "trace" => Some(Level::TRACE),
                "debug" => Some(Level::DEBUG),
                "info" => Some(Level::INFO),
                "warn" | "warning" => Some(Level::WARN),
                "error" => Some(Level::ERROR),
                _ => None,
            })
            .unwrap_or(defaults.log_level);

        Ok(Self {
            panel: PanelConfig {
                containment_threshold: env_or(
                    "PANEL_CONTAINMENT_THRESHOLD",
                    defaults.panel.containment_threshold,
                )?,
                row_overlap_ratio: env_or("PANEL_ROW_OVERLAP_RATIO", defaults.panel.row_overlap_ratio)?,
                stack_width_ratio: env_or("PANEL_STACK_WIDTH_RATIO", defaults.panel.stack_width_ratio)?,
                column_overlap_ratio: env_or(
                    "PANEL_COLUMN_OVERLAP_RATIO",
                    defaults.panel.column_overlap_ratio,
                )?,
                strategy: env_or("PANEL_ORDER_STRATEGY", defaults.panel.strategy)?,
                right_to_left: env_or("READING_RIGHT_TO_LEFT", defaults.panel.right_to_left)?,
            },
            spread: SpreadConfig {
                enabled: env_or("SPREAD_DETECTION_ENABLED", defaults.spread.enabled)?,
                right_tolerance: env_or("SPREAD_RIGHT_TOLERANCE", defaults.spread.right_tolerance)?,
                left_tolerance: env_or("SPREAD_LEFT_TOLERANCE", defaults.spread.left_tolerance)?,
            },
            region: RegionConfig {
                assignment_overlap_threshold: env_or(
                    "REGION_ASSIGNMENT_OVERLAP",
                    defaults.region.assignment_overlap_threshold,
                )?,
                dedup_iou_threshold: env_or(
                    "REGION_DEDUP_IOU_THRESHOLD",
                    defaults.region.dedup_iou_threshold,
                )?,
                row_height_ratio: env_or("REGION_ROW_HEIGHT_RATIO", defaults.region.row_height_ratio)?,
                max_area_fraction: env_opt("REGION_MAX_AREA_FRACTION")?,
            },
            batch: BatchConfig {
                worker_threads: env_or("WORKER_THREADS", defaults.batch.worker_threads)?,
            },
            log_level,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = 0.0..=1.0;

        for (name, value) in [
            ("containment_threshold", self.panel.containment_threshold),
            ("row_overlap_ratio", self.panel.row_overlap_ratio),
            ("stack_width_ratio", self.panel.stack_width_ratio),
            ("column_overlap_ratio", self.panel.column_overlap_ratio),
        ] {
            if !unit.contains(&value) {
                return Err(ConfigError::InvalidPanelConfig(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        if !(self.spread.right_tolerance > 0.0 && self.spread.right_tolerance <= 1.0) {
            return Err(ConfigError::InvalidSpreadConfig(format!(
                "right_tolerance must be in (0.0, 1.0], got {}",
                self.spread.right_tolerance
            )));
        }
        if !(1.0..=2.0).contains(&self.spread.left_tolerance) {
            return Err(ConfigError::InvalidSpreadConfig(format!(
                "left_tolerance must be between 1.0 and 2.0, got {}",
                self.spread.left_tolerance
            )));
        }

        for (name, value) in [
            ("assignment_overlap_threshold", self.region.assignment_overlap_threshold),
            ("dedup_iou_threshold", self.region.dedup_iou_threshold),
            ("row_height_ratio", self.region.row_height_ratio),
        ] {
            if !unit.contains(&value) {
                return Err(ConfigError::InvalidRegionConfig(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    name, value
                )));
            }
        }

        if let Some(fraction) = self.region.max_area_fraction {
            if !(fraction > 0.0 && fraction <= 1.0) {
                return Err(ConfigError::InvalidRegionConfig(format!(
                    "max_area_fraction must be in (0.0, 1.0], got {}",
                    fraction
                )));
            }
        }

        if self.batch.worker_threads == 0 {
            return Err(ConfigError::InvalidWorkerThreads(self.batch.worker_threads));
        }

        Ok(())
    }
}

/// Read and parse an env var, keeping the default when it is unset
fn env_or<T: FromStr>(name: &str, default: T) -> Result<T, ConfigError> {
    Ok(env_opt(name)?.unwrap_or(default))
}

fn env_opt<T: FromStr>(name: &str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map(Some)
                .map_err(|_| ConfigError::EnvVarError {
                    name: name.to_string(),
                    value,
                })
        }
        _ => Ok(None),
    }
}
