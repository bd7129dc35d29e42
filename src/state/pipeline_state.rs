/// Download pipeline and per-document state definitions
///
/// This module defines the states the download pipeline moves through and the
/// terminal status recorded for every queued document.
use std::fmt;

/// Represents the current state of the download pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Nothing in flight; ready to dequeue the next item
    Idle,

    /// At least one item in flight and more are queued
    Downloading,

    /// Queue is empty but items are still in flight
    ///
    /// Starting the last queued item moves straight here instead of through
    /// `Downloading`, so a one-item queue goes `Idle -> Draining -> Idle ->
    /// Terminated`.
    Draining,

    /// Queue exhausted and nothing in flight; the run is complete
    Terminated,
}

impl PipelineState {
    /// Returns true if no further transitions can happen
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Checks whether moving from `self` to `next` is a legal transition
    ///
    /// Idle → Downloading | Draining | Terminated
    /// Downloading → Idle | Downloading | Draining
    /// Draining → Idle | Draining
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (*self, next),
            (Idle, Downloading)
                | (Idle, Draining)
                | (Idle, Terminated)
                | (Downloading, Idle)
                | (Downloading, Downloading)
                | (Downloading, Draining)
                | (Draining, Idle)
                | (Draining, Draining)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Downloading => "downloading",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal status of a single queued document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DownloadStatus {
    /// The whole body was written to disk
    Succeeded,

    /// The transfer failed (HTTP status, network, IO or timeout)
    Failed,

    /// The run was cancelled before or during the transfer
    Cancelled,
}

impl DownloadStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
