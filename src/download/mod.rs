//! Download module for fetching documents to disk
//!
//! - `DownloadPipeline`: drains a `DownloadQueue` with bounded concurrency
//! - `download_one`: streams a single document into its destination file
//! - `DownloadReport`: per-document outcomes for the final summary

mod pipeline;
mod report;
mod worker;

pub use pipeline::DownloadPipeline;
pub use report::{DownloadOutcome, DownloadReport};
pub use worker::{destination_for, download_one, partial_path, unique_destination};
