//! Per-document download results

use crate::state::DownloadStatus;
use std::path::PathBuf;
use url::Url;

/// What happened to one queued document
#[derive(Debug, Clone)]
pub struct DownloadOutcome {
    pub location: Url,
    /// Where the file was (or would have been) written
    pub destination: Option<PathBuf>,
    pub status: DownloadStatus,
    pub bytes: u64,
    pub error: Option<String>,
}

impl DownloadOutcome {
    pub fn succeeded(location: Url, destination: PathBuf, bytes: u64) -> Self {
        Self {
            location,
            destination: Some(destination),
            status: DownloadStatus::Succeeded,
            bytes,
            error: None,
        }
    }

    pub fn failed(location: Url, destination: Option<PathBuf>, error: impl ToString) -> Self {
        Self {
            location,
            destination,
            status: DownloadStatus::Failed,
            bytes: 0,
            error: Some(error.to_string()),
        }
    }

    pub fn cancelled(location: Url, destination: Option<PathBuf>) -> Self {
        Self {
            location,
            destination,
            status: DownloadStatus::Cancelled,
            bytes: 0,
            error: None,
        }
    }
}

/// Summary of a drained download queue, one outcome per document
#[derive(Debug, Clone, Default)]
pub struct DownloadReport {
    outcomes: Vec<DownloadOutcome>,
}

impl DownloadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, outcome: DownloadOutcome) {
        self.outcomes.push(outcome);
    }

    pub fn outcomes(&self) -> &[DownloadOutcome] {
        &self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.count(DownloadStatus::Succeeded)
    }

    pub fn failed(&self) -> usize {
        self.count(DownloadStatus::Failed)
    }

    pub fn cancelled(&self) -> usize {
        self.count(DownloadStatus::Cancelled)
    }

    /// Total bytes written across successful downloads
    pub fn bytes_written(&self) -> u64 {
        self.outcomes.iter().map(|o| o.bytes).sum()
    }

    /// True when every document downloaded (vacuously true for an empty queue)
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.status.is_success())
    }

    /// Outcomes that did not succeed
    pub fn failures(&self) -> impl Iterator<Item = &DownloadOutcome> {
        self.outcomes.iter().filter(|o| !o.status.is_success())
    }

    fn count(&self, status: DownloadStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }
}
