//! End-to-end `filter` pipeline: pick input → read → filter → pick output → write.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use hostfilter_shared::{FilterConfig, Result, validate_filter_config};

use crate::codec;
use crate::filter::{self, FilterStats};
use crate::picker::PathProvider;

/// Configuration for [`run_filter`].
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Marker, columns, and encodings.
    pub filter: FilterConfig,
    /// Destination used when the provider does not choose one.
    pub default_output: PathBuf,
}

/// Summary of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct FilterReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub stats: FilterStats,
    /// Hex SHA-256 of the bytes written.
    pub sha256: String,
    pub bytes_written: usize,
    #[serde(skip)]
    pub elapsed: Duration,
}

/// How a run ended without error.
#[derive(Debug)]
pub enum RunOutcome {
    /// No input was selected; nothing was read or written.
    Cancelled,
    /// The filtered table was written.
    Written(FilterReport),
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called when the pipeline completes.
    fn done(&self, report: &FilterReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn done(&self, _report: &FilterReport) {}
}

/// Run the full `filter` pipeline.
///
/// Every failure is terminal and leaves the destination untouched:
/// decoding/CSV problems are `Parse`, missing columns are `Schema`,
/// and an unwritable destination is `Write`.
#[instrument(skip_all, fields(marker = %config.filter.marker))]
pub fn run_filter(
    config: &RunConfig,
    paths: &dyn PathProvider,
    progress: &dyn ProgressReporter,
) -> Result<RunOutcome> {
    validate_filter_config(&config.filter)?;
    let input_encoding = codec::resolve_encoding(&config.filter.input_encoding)?;
    let output_encoding = codec::resolve_output_encoding(&config.filter.output_encoding)?;

    let Some(input) = paths.input_path() else {
        info!("no input selected");
        return Ok(RunOutcome::Cancelled);
    };

    let start = Instant::now();
    info!(input = %input.display(), "starting filter pipeline");

    // --- Phase 1: Load ---
    progress.phase("Reading CSV");
    let table = codec::read_table(&input, input_encoding)?;

    // --- Phase 2: Filter ---
    progress.phase("Filtering hosts");
    let outcome = filter::filter_hosts(&table, &config.filter.columns, &config.filter.marker)?;

    // --- Phase 3: Write ---
    let output = paths
        .output_path(&config.default_output)
        .unwrap_or_else(|| config.default_output.clone());

    progress.phase("Writing filtered CSV");
    let bytes = codec::write_table(&output, &outcome.table, output_encoding)?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);

    let report = FilterReport {
        input,
        output,
        stats: outcome.stats,
        sha256: format!("{:x}", hasher.finalize()),
        bytes_written: bytes.len(),
        elapsed: start.elapsed(),
    };

    info!(
        output = %report.output.display(),
        rows = report.stats.output_rows,
        bytes = report.bytes_written,
        "filtered CSV written"
    );
    progress.done(&report);

    Ok(RunOutcome::Written(report))
}
