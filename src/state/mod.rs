//! State module for tracking download progress
//!
//! # Components
//!
//! - `PipelineState`: the download pipeline's state machine (idle, downloading, draining, terminated)
//! - `DownloadStatus`: the terminal status recorded for each queued document

mod pipeline_state;

// Re-export main types
pub use pipeline_state::{DownloadStatus, PipelineState};
