//! Download pipeline - drains the download queue
//!
//! The pipeline dequeues items in FIFO order and starts a new transfer only
//! when a slot frees up, so at most `concurrency` transfers are ever in flight
//! (one by default). A failed transfer is recorded and the pipeline moves on;
//! it terminates once the queue is empty and nothing is in flight.

use crate::config::DownloadConfig;
use crate::download::report::{DownloadOutcome, DownloadReport};
use crate::download::worker::{destination_for, download_one, unique_destination};
use crate::manifest::{DownloadItem, DownloadQueue};
use crate::state::PipelineState;
use crate::DownloadError;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use reqwest::Client;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sequential (or bounded-concurrency) downloader for a flattened manifest
pub struct DownloadPipeline {
    client: Client,
    concurrency: usize,
    timeout: Duration,
    cancel: CancellationToken,
    state: PipelineState,
    transitions: Vec<PipelineState>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
    /// Destinations handed out so far; no two items share a file
    claimed: HashSet<PathBuf>,
}

impl DownloadPipeline {
    /// Creates an idle pipeline
    ///
    /// # Arguments
    ///
    /// * `config` - Download concurrency and per-item timeout
    /// * `client` - HTTP client used for every transfer
    /// * `cancel` - Token that stops dequeuing and aborts in-flight transfers
    pub fn new(config: &DownloadConfig, client: Client, cancel: CancellationToken) -> Self {
        Self {
            client,
            concurrency: config.concurrency.max(1) as usize,
            timeout: Duration::from_secs(config.timeout_secs),
            cancel,
            state: PipelineState::Idle,
            transitions: vec![PipelineState::Idle],
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            claimed: HashSet::new(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Every state the pipeline has been in, starting with `Idle`
    pub fn transitions(&self) -> &[PipelineState] {
        &self.transitions
    }

    /// Highest number of transfers observed in flight at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::Acquire)
    }

    /// Drains `queue` to completion and returns one outcome per item
    ///
    /// Individual failures never stop the pipeline. When the cancellation
    /// token fires, in-flight transfers are aborted and every item still
    /// queued is reported as cancelled.
    pub async fn start(&mut self, mut queue: DownloadQueue) -> DownloadReport {
        tracing::info!("Beginning downloads ({})", queue.len());

        let mut report = DownloadReport::new();
        let mut running: FuturesUnordered<BoxFuture<'static, DownloadOutcome>> =
            FuturesUnordered::new();

        loop {
            self.trigger_next(&mut queue, &mut running, &mut report);
            if self.state.is_terminal() {
                break;
            }

            if let Some(outcome) = running.next().await {
                log_outcome(&outcome);
                report.record(outcome);
                self.transition(PipelineState::Idle);
            }
        }

        tracing::info!(
            "Downloads complete: {} succeeded, {} failed, {} cancelled",
            report.succeeded(),
            report.failed(),
            report.cancelled()
        );

        report
    }

    /// Fills free slots from the queue and moves to the matching state
    fn trigger_next(
        &mut self,
        queue: &mut DownloadQueue,
        running: &mut FuturesUnordered<BoxFuture<'static, DownloadOutcome>>,
        report: &mut DownloadReport,
    ) {
        if self.cancel.is_cancelled() && !queue.is_empty() {
            tracing::warn!("Cancelled with {} download(s) still queued", queue.len());
            while let Some(item) = queue.pop() {
                let destination = destination_for(&item).ok();
                report.record(DownloadOutcome::cancelled(item.location, destination));
            }
        }

        while running.len() < self.concurrency {
            let Some(item) = queue.pop() else {
                break;
            };
            match self.claim_destination(&item) {
                Ok(destination) => running.push(self.download(item, destination)),
                Err(e) => {
                    let outcome = DownloadOutcome::failed(item.location, None, e);
                    log_outcome(&outcome);
                    report.record(outcome);
                }
            }
        }

        let next = if running.is_empty() {
            PipelineState::Terminated
        } else if queue.is_empty() {
            PipelineState::Draining
        } else {
            PipelineState::Downloading
        };
        self.transition(next);
    }

    /// Reserves a destination for `item` that no earlier item has taken
    fn claim_destination(&mut self, item: &DownloadItem) -> Result<PathBuf, DownloadError> {
        let preferred = destination_for(item)?;
        let destination = unique_destination(&preferred, &self.claimed);
        if destination != preferred {
            tracing::warn!(
                "{} collides with an earlier document; saving as {}",
                item.location,
                destination.display()
            );
        }
        self.claimed.insert(destination.clone());
        Ok(destination)
    }

    /// Builds the future for one item, tracking the in-flight counter
    fn download(&self, item: DownloadItem, destination: PathBuf) -> BoxFuture<'static, DownloadOutcome> {
        let client = self.client.clone();
        let cancel = self.cancel.clone();
        let timeout = self.timeout;
        let in_flight = Arc::clone(&self.in_flight);
        let peak = Arc::clone(&self.peak_in_flight);

        async move {
            tracing::info!(
                "Triggering download: {} -> {}",
                item.location,
                item.directory.display()
            );

            let active = in_flight.fetch_add(1, Ordering::AcqRel) + 1;
            peak.fetch_max(active, Ordering::AcqRel);
            let result = download_one(&client, &item.location, &destination, timeout, &cancel).await;
            in_flight.fetch_sub(1, Ordering::AcqRel);

            match result {
                Ok(bytes) => DownloadOutcome::succeeded(item.location, destination, bytes),
                Err(DownloadError::Cancelled) => {
                    DownloadOutcome::cancelled(item.location, Some(destination))
                }
                Err(e) => DownloadOutcome::failed(item.location, Some(destination), e),
            }
        }
        .boxed()
    }

    fn transition(&mut self, next: PipelineState) {
        if self.state == next {
            return;
        }

        debug_assert!(
            self.state.can_transition_to(next),
            "illegal pipeline transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!("Download pipeline {} -> {}", self.state, next);

        self.state = next;
        self.transitions.push(next);
    }
}

fn log_outcome(outcome: &DownloadOutcome) {
    match (&outcome.error, &outcome.destination) {
        (None, Some(destination)) if outcome.status.is_success() => tracing::info!(
            "Downloaded {} ({} bytes) to {}",
            outcome.location,
            outcome.bytes,
            destination.display()
        ),
        (Some(error), _) => tracing::warn!("Download failed for {}: {}", outcome.location, error),
        _ => tracing::warn!("Download {} for {}", outcome.status, outcome.location),
    }
}
