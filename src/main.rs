// Main entry point for the manga layout CLI

use manga_layout::{
    core::{types::*, Config},
    orchestration::batch_orchestrator::BatchOrchestrator,
    utils::Metrics,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "manga-layout")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manga reading order and translation merge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Write JSON to this file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Print a metrics snapshot to stderr when done
    #[arg(long, global = true)]
    metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Order panels and regions of detected pages
    Process {
        /// Detections JSON (one page object or an array of pages)
        detections: PathBuf,
    },
    /// Build the translation request from ordered layouts
    Export {
        /// Layout JSON produced by `process`
        layout: PathBuf,
    },
    /// Merge a translation result onto ordered layouts
    Merge {
        /// Layout JSON produced by `process`
        layout: PathBuf,
        /// Translation collaborator output
        translation: PathBuf,
    },
    /// Process and merge in one go, or process and export without a translation
    Run {
        /// Detections JSON (one page object or an array of pages)
        detections: PathBuf,
        /// Translation collaborator output; without it the export is printed
        #[arg(long)]
        translation: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Load configuration
    let config = Arc::new(Config::new().context("Failed to load configuration")?);

    // Initialize logging
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::new(format!(
        "manga_layout={}",
        match config.log_level {
            tracing::Level::TRACE => "trace",
            tracing::Level::DEBUG => "debug",
            tracing::Level::INFO => "info",
            tracing::Level::WARN => "warn",
            tracing::Level::ERROR => "error",
        }
    ));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let metrics = Metrics::new();
    let orchestrator = BatchOrchestrator::new(Arc::clone(&config), metrics.clone())?;

    let result = match &cli.command {
        Commands::Process { detections } => {
            let (pages, many) = read_pages::<PageDetections>(detections)?;
            let batch = process_pages(&orchestrator, pages);
            let layouts: Vec<&PageLayout> = batch.layouts.iter().flatten().collect();
            write_partial(&layouts, many, cli.output.as_deref()).and_then(|_| batch.check())
        }
        Commands::Export { layout } => {
            let (layouts, many) = read_pages::<PageLayout>(layout)?;
            let exports: Vec<ExportPage> = layouts.iter().map(|l| orchestrator.export(l)).collect();
            write_pages(&exports, many, cli.output.as_deref())
        }
        Commands::Merge { layout, translation } => {
            let (layouts, many) = read_pages::<PageLayout>(layout)?;
            let layouts: Vec<Option<PageLayout>> = layouts.into_iter().map(Some).collect();
            let merged = merge_pages(&orchestrator, &layouts, translation, many)?;
            write_pages(&merged, many, cli.output.as_deref())
        }
        Commands::Run {
            detections,
            translation,
        } => {
            let (pages, many) = read_pages::<PageDetections>(detections)?;
            let batch = process_pages(&orchestrator, pages);

            let written = match translation {
                Some(translation) => merge_pages(&orchestrator, &batch.layouts, translation, many)
                    .and_then(|merged| write_partial(&merged, many, cli.output.as_deref())),
                None => {
                    let exports: Vec<ExportPage> = batch
                        .layouts
                        .iter()
                        .flatten()
                        .map(|l| orchestrator.export(l))
                        .collect();
                    write_partial(&exports, many, cli.output.as_deref())
                }
            };
            written.and_then(|_| batch.check())
        }
    };

    if cli.metrics {
        let snapshot = serde_json::to_string_pretty(&metrics.snapshot())?;
        eprintln!("{}", snapshot);
    }

    result
}

/// Layouts of one CLI invocation, `None` where a page failed
struct ProcessedPages {
    layouts: Vec<Option<PageLayout>>,
    failed: usize,
}

impl ProcessedPages {
    /// Fail the command once the surviving pages have been written
    fn check(&self) -> Result<()> {
        if self.failed > 0 {
            bail!("{} of {} pages failed", self.failed, self.layouts.len());
        }
        Ok(())
    }
}

/// Lay out every page, keeping input positions so later steps can pair
/// pages with their translation payloads
fn process_pages(orchestrator: &BatchOrchestrator, pages: Vec<PageDetections>) -> ProcessedPages {
    let batch = orchestrator.process_batch(pages);

    for result in batch.results.iter().filter(|r| !r.success) {
        error!(
            "Page {}: {}",
            result.index,
            result.error.as_deref().unwrap_or("unknown error")
        );
    }

    info!(
        "Laid out {}/{} pages in {:.2}ms",
        batch.successful, batch.total, batch.processing_time_ms
    );

    ProcessedPages {
        layouts: batch.results.into_iter().map(|r| r.layout).collect(),
        failed: batch.failed,
    }
}

/// Merge each layout with its translation payload.
///
/// A layout array pairs with a translation array by position; a single
/// layout takes the whole file as its payload. A file of the wrong shape
/// leaves every page untranslated.
fn merge_pages(
    orchestrator: &BatchOrchestrator,
    layouts: &[Option<PageLayout>],
    translation: &Path,
    many: bool,
) -> Result<Vec<MergedPage>> {
    let raw = fs::read_to_string(translation)
        .with_context(|| format!("Failed to read {}", translation.display()))?;

    let payloads: Vec<String> = if many {
        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(items) => items.iter().map(Value::to_string).collect(),
            Err(e) => {
                warn!("Translation file is not a page array: {}", e);
                Vec::new()
            }
        }
    } else {
        vec![raw]
    };

    Ok(layouts
        .iter()
        .enumerate()
        .filter_map(|(i, layout)| {
            let layout = layout.as_ref()?;
            let payload = payloads.get(i).map(String::as_str).unwrap_or("");
            Some(orchestrator.merge_raw(layout, payload).page)
        })
        .collect())
}

/// Read a single page object or an array of pages.
///
/// The shape is decided before deserializing the pages, so field errors
/// such as a reversed box reach the caller verbatim.
fn read_pages<T: DeserializeOwned>(path: &Path) -> Result<(Vec<T>, bool)> {
    let raw = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let value: Value =
        serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))?;

    let invalid = || format!("Invalid page data in {}", path.display());
    if value.is_array() {
        let pages = serde_json::from_value(value).with_context(invalid)?;
        Ok((pages, true))
    } else {
        let page = serde_json::from_value(value).with_context(invalid)?;
        Ok((vec![page], false))
    }
}

/// Write whatever survived; a lone page that failed writes nothing
fn write_partial<T: Serialize>(pages: &[T], many: bool, output: Option<&Path>) -> Result<()> {
    if pages.is_empty() && !many {
        return Ok(());
    }
    write_pages(pages, many, output)
}

/// Write a single page or the whole list, mirroring the input shape
fn write_pages<T: Serialize>(pages: &[T], many: bool, output: Option<&Path>) -> Result<()> {
    let json = match (many, pages) {
        (false, [page]) => serde_json::to_string_pretty(page)?,
        _ => serde_json::to_string_pretty(pages)?,
    };

    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}
