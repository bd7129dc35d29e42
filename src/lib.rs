//! Doc-Harvest: a hierarchical document harvester
//!
//! This crate crawls a set of seed pages, follows links to nested pages and
//! downloadable documents, builds a manifest tree named after page titles, and
//! downloads every document into a directory tree mirroring that manifest.

pub mod config;
pub mod crawler;
pub mod download;
pub mod manifest;
pub mod output;
pub mod runner;
pub mod state;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Doc-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch failed for {url}: {source}")]
    Fetch { url: String, source: reqwest::Error },

    #[error("Fetch for {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("HTML parse error for {url}: {message}")]
    Parse { url: String, message: String },

    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Manifest serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Run cancelled")]
    Cancelled,

    #[error("Crawl task failed: {0}")]
    Task(String),
}

/// Per-document download errors
///
/// These never abort the download pipeline; they are recorded in the
/// download report and the pipeline advances to the next item.
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP {status}")]
    Status { status: u16 },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Cancelled")]
    Cancelled,

    #[error("Cannot derive a file name from {0}")]
    InvalidFileName(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("URL has no path segment to derive a base from: {0}")]
    MissingBase(String),
}

/// Result type alias for Doc-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::Crawler;
pub use download::{DownloadPipeline, DownloadReport};
pub use manifest::{flatten, DownloadItem, DownloadQueue, Manifest, ManifestNode};
pub use runner::{run, RunOptions, RunSummary};
pub use state::{DownloadStatus, PipelineState};
pub use url::{classify_reference, ReferenceKind};
