//! Run orchestration
//!
//! A run walks the full lifecycle: crawl the seeds until quiescent, dump the
//! manifest, flatten it into a download queue under a fresh run root, then
//! drain that queue through the download pipeline.

use crate::config::Config;
use crate::crawler::{build_http_client, Crawler};
use crate::download::{DownloadPipeline, DownloadReport};
use crate::manifest::{flatten, Manifest};
use crate::output::{create_run_root, write_manifest};
use crate::HarvestError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio_util::sync::CancellationToken;

/// Exit status when every queued document downloaded
pub const EXIT_OK: u8 = 0;
/// Exit status for a fatal crawl or setup error
pub const EXIT_FATAL: u8 = 1;
/// Exit status when at least one document failed to download
pub const EXIT_DOWNLOAD_FAILURES: u8 = 2;
/// Exit status after an interrupt
pub const EXIT_INTERRUPTED: u8 = 130;

/// Options that shape a single run but do not belong in the config file
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Stop after the manifest has been written
    pub crawl_only: bool,
}

/// Everything a finished run produced
#[derive(Debug)]
pub struct RunSummary {
    /// The `downloads-<millis>` directory documents were written under
    pub run_root: PathBuf,
    pub manifest_path: PathBuf,
    pub manifest: Manifest,
    pub pages: usize,
    pub documents: usize,
    /// `None` when the run stopped after the crawl
    pub report: Option<DownloadReport>,
}

impl RunSummary {
    /// Process exit status for this run
    pub fn exit_status(&self) -> u8 {
        match &self.report {
            None => EXIT_OK,
            Some(report) if report.cancelled() > 0 => EXIT_INTERRUPTED,
            Some(report) if report.failed() > 0 => EXIT_DOWNLOAD_FAILURES,
            Some(_) => EXIT_OK,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }
}

/// Maps a fatal run error to its process exit status
pub fn exit_status_for_error(error: &HarvestError) -> u8 {
    match error {
        HarvestError::Cancelled => EXIT_INTERRUPTED,
        _ => EXIT_FATAL,
    }
}

/// Runs a complete harvest
///
/// The crawl gets a child of `cancel`, so a fatal crawl error tears down
/// only the crawl. Cancelling `cancel` itself stops both phases.
///
/// # Arguments
///
/// * `config` - Validated configuration; seeds are taken from `config.seeds`
/// * `options` - Per-run switches
/// * `cancel` - Token that interrupts the run
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run finished; individual downloads may still have failed
/// * `Err(HarvestError)` - The crawl aborted or the output tree could not be created
pub async fn run(
    config: &Config,
    options: RunOptions,
    cancel: CancellationToken,
) -> Result<RunSummary, HarvestError> {
    let run_root = create_run_root(Path::new(&config.output.root_dir))?;
    let manifest_path = PathBuf::from(&config.output.manifest_path);

    let client = build_http_client(&config.user_agent)?;
    let crawler = Crawler::new(&config.crawler, client.clone(), cancel.child_token());
    let manifest = crawler.crawl(&config.seeds).await?;

    let pages = manifest.page_count();
    let documents = manifest.document_count();
    tracing::info!(
        "Crawl quiescent: {} page(s), {} document(s)",
        pages,
        documents
    );

    write_manifest(&manifest, &manifest_path)?;

    if options.crawl_only {
        tracing::info!("Crawl only; skipping downloads");
        return Ok(RunSummary {
            run_root,
            manifest_path,
            manifest,
            pages,
            documents,
            report: None,
        });
    }

    let queue = flatten(&manifest, &run_root)?;
    let mut pipeline = DownloadPipeline::new(&config.download, client, cancel);
    let report = pipeline.start(queue).await;

    Ok(RunSummary {
        run_root,
        manifest_path,
        manifest,
        pages,
        documents,
        report: Some(report),
    })
}
